//! Field validation shared by entity constructors.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{3,}$").expect("valid phone regex"));
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9+_.\-]+@[A-Za-z0-9]([A-Za-z0-9\-]*[A-Za-z0-9])?(\.[A-Za-z0-9]([A-Za-z0-9\-]*[A-Za-z0-9])?)*$")
        .expect("valid email regex")
});

/// Field-level validation failures for entity records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Identifier is blank after trim.
    BlankId,
    /// Name is blank after trim.
    BlankName,
    /// Address is blank after trim.
    BlankAddress,
    /// Phone must contain only digits, at least 3 of them.
    InvalidPhone(String),
    /// Email is not `local@domain`.
    InvalidEmail(String),
    /// Date is not ISO `yyyy-MM-dd`.
    InvalidDate(String),
    /// Status is neither `true`, `false` nor an ISO date.
    InvalidStatus(String),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankId => write!(f, "identifier must not be blank"),
            Self::BlankName => write!(f, "name must not be blank"),
            Self::BlankAddress => write!(f, "address must not be blank"),
            Self::InvalidPhone(value) => write!(
                f,
                "invalid phone `{value}`: phone numbers contain only digits and are at least 3 digits long"
            ),
            Self::InvalidEmail(value) => {
                write!(f, "invalid email `{value}`: expected local-part@domain")
            }
            Self::InvalidDate(value) => {
                write!(f, "invalid date `{value}`: expected yyyy-MM-dd")
            }
            Self::InvalidStatus(value) => write!(
                f,
                "invalid status `{value}`: expected `true`, `false` or a yyyy-MM-dd date"
            ),
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn require_non_blank(
    value: impl Into<String>,
    error: ValidationError,
) -> Result<String, ValidationError> {
    let value = value.into();
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(error);
    }
    Ok(trimmed.to_string())
}

pub(crate) fn validate_phone(value: impl Into<String>) -> Result<String, ValidationError> {
    let value = value.into();
    let trimmed = value.trim();
    if !PHONE_RE.is_match(trimmed) {
        return Err(ValidationError::InvalidPhone(trimmed.to_string()));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn validate_email(value: impl Into<String>) -> Result<String, ValidationError> {
    let value = value.into();
    let trimmed = value.trim();
    if !EMAIL_RE.is_match(trimmed) {
        return Err(ValidationError::InvalidEmail(trimmed.to_string()));
    }
    Ok(trimmed.to_string())
}
