//! Reader configuration.

use serde::{Deserialize, Serialize};

use crate::error::StepError;

/// Options controlling how a STEP file is resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadSettings {
    /// Maximum nesting of reference resolution (root → shell → face → … → point).
    pub max_depth: usize,
    /// Fail with [`StepError::NoRoot`] when no shape representation is present.
    /// When `false`, such a file reads as an empty shell list.
    pub require_root: bool,
}

impl Default for ReadSettings {
    fn default() -> Self {
        Self {
            max_depth: 32,
            require_root: true,
        }
    }
}

impl ReadSettings {
    /// Validate settings.
    pub fn validate(&self) -> Result<(), StepError> {
        if self.max_depth == 0 {
            return Err(StepError::InvalidSettings(
                "max_depth must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = ReadSettings::default();
        assert_eq!(settings.max_depth, 32);
        assert!(settings.require_root);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_zero_depth_rejected() {
        let settings = ReadSettings {
            max_depth: 0,
            ..Default::default()
        };
        assert!(matches!(settings.validate(), Err(StepError::InvalidSettings(_))));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: ReadSettings = serde_json::from_str(r#"{ "require_root": false }"#).unwrap();
        assert_eq!(settings.max_depth, 32);
        assert!(!settings.require_root);
    }

    #[test]
    fn test_json_roundtrip() {
        let settings = ReadSettings {
            max_depth: 8,
            require_root: false,
        };
        let json = serde_json::to_string(&settings).unwrap();
        let back: ReadSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, settings);
    }
}
