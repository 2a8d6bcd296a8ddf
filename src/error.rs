use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Invalid constraint in '{config}': {reason}")]
    InvalidConstraint { config: String, reason: String },

    #[error("Unsupported {group} representation in '{config}': {id}")]
    UnsupportedRepresentation { config: String, group: String, id: u32 },

    #[error("Contradictory constraints in '{config}': {reason}")]
    ContradictoryConstraints { config: String, reason: String },

    #[error("Duplicate fermion name: {0}")]
    DuplicateFermionName(String),

    #[error("Arithmetic domain error: {0}")]
    ArithmeticDomainError(String),

    #[error("Unknown rule '{name}'{}", suggestion_hint(.suggestion))]
    UnknownRule { name: String, suggestion: Option<String> },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ScanError {
    pub fn invalid(config: impl Into<String>, reason: impl Into<String>) -> Self {
        ScanError::InvalidConstraint {
            config: config.into(),
            reason: reason.into(),
        }
    }

    pub fn contradictory(config: impl Into<String>, reason: impl Into<String>) -> Self {
        ScanError::ContradictoryConstraints {
            config: config.into(),
            reason: reason.into(),
        }
    }

    /// Re-label a configuration-level error with the name of the
    /// configuration it came from. Other kinds pass through unchanged.
    pub fn for_config(self, name: &str) -> Self {
        match self {
            ScanError::InvalidConstraint { reason, .. } => ScanError::invalid(name, reason),
            ScanError::ContradictoryConstraints { reason, .. } => {
                ScanError::contradictory(name, reason)
            }
            ScanError::UnsupportedRepresentation { group, id, .. } => ScanError::UnsupportedRepresentation {
                config: name.to_string(),
                group,
                id,
            },
            other => other,
        }
    }

    /// Configuration errors are detected before any enumeration begins.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            ScanError::InvalidConstraint { .. }
                | ScanError::ContradictoryConstraints { .. }
                | ScanError::UnsupportedRepresentation { .. }
                | ScanError::UnknownRule { .. }
        )
    }
}

fn suggestion_hint(suggestion: &Option<String>) -> String {
    suggestion
        .as_ref()
        .map(|s| format!(" (did you mean '{}'?)", s))
        .unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, ScanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_config_relabels_configuration_errors() {
        let err = ScanError::invalid("hypercharge", "denominator must be positive").for_config("dark_sector");
        match err {
            ScanError::InvalidConstraint { config, reason } => {
                assert_eq!(config, "dark_sector");
                assert_eq!(reason, "denominator must be positive");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let err = ScanError::UnsupportedRepresentation {
            config: "representation".into(),
            group: "SU(3)".into(),
            id: 10,
        }
        .for_config("dark_sector");
        assert_eq!(err.to_string(), "Unsupported SU(3) representation in 'dark_sector': 10");

        let err = ScanError::DuplicateFermionName("Q_L".into()).for_config("dark_sector");
        assert!(matches!(err, ScanError::DuplicateFermionName(name) if name == "Q_L"));
    }

    #[test]
    fn test_unknown_rule_message_includes_suggestion() {
        let err = ScanError::UnknownRule {
            name: "vector_like_serch".into(),
            suggestion: Some("vector_like_search".into()),
        };
        assert_eq!(
            err.to_string(),
            "Unknown rule 'vector_like_serch' (did you mean 'vector_like_search'?)"
        );
        assert!(err.is_configuration_error());
    }
}
