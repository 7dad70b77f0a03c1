/// A local field constraint was violated while constructing a value
/// (non-positive radius or thickness, negative angle, zero-length direction).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid argument: {0}")]
pub struct InvalidArgument(pub String);

impl InvalidArgument {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// Fail with [`InvalidArgument`] unless `value` is finite and strictly positive.
pub fn require_positive(what: &str, value: f64) -> Result<f64, InvalidArgument> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(InvalidArgument(format!("{what} must be > 0, got {value}")))
    }
}

/// Fail with [`InvalidArgument`] unless `value` is finite and not negative.
pub fn require_non_negative(what: &str, value: f64) -> Result<f64, InvalidArgument> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(InvalidArgument(format!("{what} must be >= 0, got {value}")))
    }
}

/// Fail with [`InvalidArgument`] unless `value` is finite.
pub fn require_finite(what: &str, value: f64) -> Result<f64, InvalidArgument> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(InvalidArgument(format!("{what} must be finite, got {value}")))
    }
}
