use thiserror::Error;

#[derive(Error, Debug)]
pub enum EnrichError {
    /// An argument or field value had the wrong shape or type.
    #[error("Type error on '{parameter}': {message}")]
    Type { parameter: String, message: String },

    /// A correctly typed value failed a semantic rule.
    #[error("Validation error on '{field}': {message}. Invalid value: {value}")]
    Validation {
        field: String,
        message: String,
        value: String,
    },

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("CSV parsing failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid pattern: {0}")]
    Regex(#[from] regex::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl EnrichError {
    pub fn type_error(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Type {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    pub fn validation(
        field: impl Into<String>,
        message: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
            value: value.into(),
        }
    }

    pub fn is_type_error(&self) -> bool {
        matches!(self, Self::Type { .. })
    }

    pub fn is_validation_error(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

pub type Result<T> = std::result::Result<T, EnrichError>;
