#![warn(missing_docs)]

//! STEP (ISO 10303-21) B-rep import for the B-rep kernel.
//!
//! Reads the DATA section of a Part 21 file, keeps the entity types that make
//! up an advanced B-rep, and resolves them into [`Shell`](brep_kernel_geom::Shell)s
//! of faces, bounds and edges over shared curve and surface geometry.
//!
//! # Example
//!
//! ```no_run
//! use brep_kernel_step::{read_step, read_step_with_settings, ReadSettings};
//!
//! let shells = read_step("model.step").unwrap();
//! println!("{} faces", shells[0].faces.len());
//!
//! // Tolerate files without a shape representation
//! let settings = ReadSettings { require_root: false, ..Default::default() };
//! let shells = read_step_with_settings("parts.step", &settings).unwrap();
//! ```
//!
//! Lower-level pieces are public for callers that want the raw records:
//! [`load_records`] yields the id → record map, and [`StepReader`] resolves
//! single edges, curves or surfaces from it.

mod entities;
mod error;
mod fields;
mod lexer;
mod loader;
mod reader;
mod settings;

pub use entities::{
    curve_entity, is_supported, surface_entity, CurveEntity, SurfaceEntity, COMPLEX, ROOT,
    SOLID_BREP,
};
pub use error::StepError;
pub use fields::{decode, Field, Fields, Value};
pub use lexer::{LexError, Lexer, Token, DELIMITERS, QUOTES};
pub use loader::{load_records, load_str, Record, RecordMap};
pub use reader::{
    read_step, read_step_from_buffer, read_step_from_buffer_with_settings, read_step_from_reader,
    read_step_from_reader_with_settings, read_step_with_settings, StepReader,
};
pub use settings::ReadSettings;
