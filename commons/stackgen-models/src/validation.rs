use std::borrow::Cow;

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid CIDR block: {0}")]
    InvalidCidr(String),

    #[error("Address space {cidr} cannot hold {subnets} subnets")]
    AddressSpaceExhausted { cidr: String, subnets: usize },

    #[error("Invalid statistic: {0}")]
    InvalidStatistic(String),

    #[error("Validator error: {0}")]
    ValidatorError(#[from] validator::ValidationErrors),
}

/// Shorthand for the `validator` error type returned by custom and schema checks.
pub(crate) fn invalid(
    code: &'static str,
    message: impl Into<Cow<'static, str>>,
) -> validator::ValidationError {
    validator::ValidationError::new(code).with_message(message.into())
}
