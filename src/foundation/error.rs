/// Convenience result type used across trailplot.
pub type TrailResult<T> = Result<T, TrailError>;

/// Top-level error taxonomy used by pipeline APIs.
#[derive(thiserror::Error, Debug)]
pub enum TrailError {
    /// Invalid user-provided parameters or data.
    #[error("validation error: {0}")]
    Validation(String),

    /// A `(name, year)` filter matched no rows; the pipeline halts here.
    #[error("no matching data for storm '{name}' in {year}")]
    NoMatchingData {
        /// Requested storm name.
        name: String,
        /// Requested season year.
        year: i32,
    },

    /// Date components or input records that could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),

    /// Errors while rasterizing a frame.
    #[error("render error: {0}")]
    Render(String),

    /// Errors while encoding frames into an output file.
    #[error("encode error: {0}")]
    Encode(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TrailError {
    /// Build a [`TrailError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`TrailError::NoMatchingData`] value.
    pub fn no_matching_data(name: impl Into<String>, year: i32) -> Self {
        Self::NoMatchingData {
            name: name.into(),
            year,
        }
    }

    /// Build a [`TrailError::Parse`] value.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Build a [`TrailError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`TrailError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
