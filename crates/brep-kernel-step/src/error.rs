//! Error types for STEP decoding.

use brep_kernel_geom::GeomError;
use thiserror::Error;

/// Errors that can occur while reading a STEP file.
///
/// Every variant carries the record id (or, for loader failures, the source
/// line) needed to locate the offending text.
#[derive(Error, Debug)]
pub enum StepError {
    /// I/O error reading the input.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A DATA-section line that is not `#id = BODY`.
    #[error("Malformed record at line {line}: {message}")]
    Record {
        /// Line (1-indexed) where the logical record starts.
        line: usize,
        /// Error message.
        message: String,
    },

    /// Two whitelisted records share an id.
    #[error("Duplicate entity id #{0}")]
    DuplicateEntity(u64),

    /// Missing or mismatched punctuation, keyword or literal inside a record.
    #[error("Syntax error at entity #{entity_id}: {message}")]
    Syntax {
        /// Record being decoded.
        entity_id: u64,
        /// Error message.
        message: String,
    },

    /// A reference points at an id that was never loaded.
    #[error("Missing entity #{id}{}", .referenced_by.map(|r| format!(" (referenced by #{r})")).unwrap_or_default())]
    MissingEntity {
        /// The unresolved id.
        id: u64,
        /// The record holding the reference, if any.
        referenced_by: Option<u64>,
    },

    /// A `$` or `*` where a reference is required.
    #[error("Entity #{entity_id} leaves a required reference unset")]
    UnsetReference {
        /// Record holding the unset reference.
        entity_id: u64,
    },

    /// A face without exactly one outer bound.
    #[error("Face #{face_id} has {count} outer bounds, expected exactly one")]
    OuterBoundCount {
        /// Face record.
        face_id: u64,
        /// Outer bounds found.
        count: usize,
    },

    /// A record used as a curve is not a supported curve type.
    #[error("Entity #{entity_id} is not a supported curve: {keyword}")]
    UnsupportedCurve {
        /// Offending record.
        entity_id: u64,
        /// Its keyword.
        keyword: String,
    },

    /// A record used as a surface is not a supported surface type.
    #[error("Entity #{entity_id} is not a supported surface: {keyword}")]
    UnsupportedSurface {
        /// Offending record.
        entity_id: u64,
        /// Its keyword.
        keyword: String,
    },

    /// Geometry could not be constructed from decoded parameters.
    #[error("Invalid geometry at entity #{entity_id}: {source}")]
    Geometry {
        /// Record being constructed.
        entity_id: u64,
        /// Kernel error.
        #[source]
        source: GeomError,
    },

    /// Reference chain nested deeper than the configured limit.
    #[error("Reference depth limit {limit} exceeded at entity #{entity_id}")]
    DepthExceeded {
        /// Record that would exceed the limit.
        entity_id: u64,
        /// Configured limit.
        limit: usize,
    },

    /// A record (indirectly) references itself.
    #[error("Cyclic reference through entity #{0}")]
    CyclicReference(u64),

    /// The file contains no root shape representation.
    #[error("No ADVANCED_BREP_SHAPE_REPRESENTATION entity found")]
    NoRoot,

    /// Read settings failed validation.
    #[error("Invalid read settings: {0}")]
    InvalidSettings(String),
}

impl StepError {
    /// Create a syntax error.
    pub fn syntax(entity_id: u64, message: impl Into<String>) -> Self {
        Self::Syntax {
            entity_id,
            message: message.into(),
        }
    }

    /// Create a loader error.
    pub fn record(line: usize, message: impl Into<String>) -> Self {
        Self::Record {
            line,
            message: message.into(),
        }
    }

    /// Wrap a kernel error for the given record.
    pub fn geometry(entity_id: u64, source: GeomError) -> Self {
        Self::Geometry { entity_id, source }
    }
}
