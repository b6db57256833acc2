/// Convenience result type used across peakform.
pub type PeakformResult<T> = Result<T, PeakformError>;

/// Top-level error taxonomy used by descriptor, settings and rendering APIs.
#[derive(thiserror::Error, Debug)]
pub enum PeakformError {
    /// A descriptor was given more than one construction source.
    #[error("config conflict: {0}")]
    ConfigConflict(String),

    /// Unparsable or out-of-domain format descriptor field.
    #[error("malformed header: {0}")]
    MalformedHeader(String),

    /// Settings key that the schema does not declare.
    #[error("settings error: unknown field {field:?} for schema '{schema}'")]
    UnknownField {
        /// Schema the settings were validated against.
        schema: &'static str,
        /// Offending key.
        field: String,
    },

    /// Required settings key absent from the instance.
    #[error("settings error: missing required field {field:?} for schema '{schema}'")]
    MissingRequired {
        /// Schema the settings were validated against.
        schema: &'static str,
        /// Missing key.
        field: String,
    },

    /// Settings value that cannot be coerced to the declared kind.
    #[error("settings error: field {field:?} expected {expected}, got {value}")]
    TypeMismatch {
        /// Offending key.
        field: String,
        /// Declared kind.
        expected: &'static str,
        /// Value as supplied.
        value: String,
    },

    /// Integer settings value below the declared minimum.
    #[error("settings error: field {field:?} value {value} is lower than the allowed minimum ({min})")]
    BelowMinimum {
        /// Offending key.
        field: String,
        /// Coerced value.
        value: i64,
        /// Declared minimum.
        min: i64,
    },

    /// Integer settings value above the declared maximum.
    #[error("settings error: field {field:?} value {value} is higher than the allowed maximum ({max})")]
    AboveMaximum {
        /// Offending key.
        field: String,
        /// Coerced value.
        value: i64,
        /// Declared maximum.
        max: i64,
    },

    /// Settings value outside the declared allowed set.
    #[error("settings error: field {field:?} value {value} is not allowed, must be one of: {allowed}")]
    NotAllowed {
        /// Offending key.
        field: String,
        /// Coerced value.
        value: String,
        /// Comma-separated allowed values.
        allowed: String,
    },

    /// Colour selector outside the closed symbol set.
    #[error("unknown colour: {0:?}")]
    UnknownColour(String),

    /// Invalid API usage or request data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Frame source could not be opened or read.
    #[error("frame source error: {0}")]
    Source(String),

    /// Caller deadline expired before all columns were decimated.
    #[error("deadline exceeded after {completed} of {total} columns")]
    DeadlineExceeded {
        /// Columns finished before the deadline.
        completed: u32,
        /// Columns requested.
        total: u32,
    },

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PeakformError {
    /// Build a [`PeakformError::ConfigConflict`] value.
    pub fn config_conflict(msg: impl Into<String>) -> Self {
        Self::ConfigConflict(msg.into())
    }

    /// Build a [`PeakformError::MalformedHeader`] value.
    pub fn malformed_header(msg: impl Into<String>) -> Self {
        Self::MalformedHeader(msg.into())
    }

    /// Build a [`PeakformError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`PeakformError::Source`] value.
    pub fn frame_source(msg: impl Into<String>) -> Self {
        Self::Source(msg.into())
    }

    /// Whether this error came from settings schema validation.
    pub fn is_settings_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownField { .. }
                | Self::MissingRequired { .. }
                | Self::TypeMismatch { .. }
                | Self::BelowMinimum { .. }
                | Self::AboveMaximum { .. }
                | Self::NotAllowed { .. }
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
