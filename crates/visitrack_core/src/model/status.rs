//! Quarantine/infection status.

use super::validation::ValidationError;
use super::{format_date, parse_date};
use chrono::NaiveDate;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Boolean status with an optional start date.
///
/// Textual form: `false` is `Clear`, `true` is `Active` without a start
/// date, and a `yyyy-MM-dd` date is `Active` since that date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HealthStatus {
    #[default]
    Clear,
    Active { since: Option<NaiveDate> },
}

impl HealthStatus {
    /// Active status starting on `date`.
    pub fn since(date: NaiveDate) -> Self {
        Self::Active { since: Some(date) }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active { .. })
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Clear => None,
            Self::Active { since } => *since,
        }
    }
}

impl FromStr for HealthStatus {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "false" => Ok(Self::Clear),
            "true" => Ok(Self::Active { since: None }),
            _ => parse_date(trimmed)
                .map(Self::since)
                .map_err(|_| ValidationError::InvalidStatus(trimmed.to_string())),
        }
    }
}

impl Display for HealthStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Clear => f.write_str("false"),
            Self::Active { since: None } => f.write_str("true"),
            Self::Active { since: Some(date) } => f.write_str(&format_date(*date)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::HealthStatus;
    use chrono::NaiveDate;

    #[test]
    fn parses_all_textual_forms() {
        assert_eq!("false".parse::<HealthStatus>().unwrap(), HealthStatus::Clear);
        assert_eq!(
            " TRUE ".parse::<HealthStatus>().unwrap(),
            HealthStatus::Active { since: None }
        );
        let date = NaiveDate::from_ymd_opt(2020, 3, 4).unwrap();
        assert_eq!(
            "2020-03-04".parse::<HealthStatus>().unwrap(),
            HealthStatus::since(date)
        );
        assert!("maybe".parse::<HealthStatus>().is_err());
    }

    #[test]
    fn display_matches_parse_input() {
        for text in ["false", "true", "2021-12-31"] {
            let status: HealthStatus = text.parse().unwrap();
            assert_eq!(status.to_string(), text);
        }
    }
}
