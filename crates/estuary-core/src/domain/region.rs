use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Region identifier: the literal `GLOBAL` or an ISO-3166 alpha-2 code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RegionCode(String);

pub const GLOBAL: &str = "GLOBAL";

impl RegionCode {
    /// Parse and normalize a region code to uppercase.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let normalized = input.trim().to_ascii_uppercase();

        if normalized == GLOBAL {
            return Ok(Self(normalized));
        }

        let is_alpha2 =
            normalized.len() == 2 && normalized.chars().all(|ch| ch.is_ascii_alphabetic());
        if !is_alpha2 {
            return Err(ValidationError::InvalidRegionCode {
                value: input.to_owned(),
            });
        }

        Ok(Self(normalized))
    }

    pub fn is_global(&self) -> bool {
        self.0 == GLOBAL
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for RegionCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for RegionCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RegionCode> for String {
    fn from(value: RegionCode) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_normalizes_alpha2() {
        let code = RegionCode::parse(" hu ").expect("code should parse");
        assert_eq!(code.as_str(), "HU");
        assert!(!code.is_global());
    }

    #[test]
    fn accepts_the_global_literal() {
        let code = RegionCode::parse("global").expect("code should parse");
        assert!(code.is_global());
    }

    #[test]
    fn rejects_three_letter_codes() {
        assert!(matches!(
            RegionCode::parse("HUN"),
            Err(ValidationError::InvalidRegionCode { .. })
        ));
    }

    #[test]
    fn rejects_digits() {
        assert!(matches!(
            RegionCode::parse("H1"),
            Err(ValidationError::InvalidRegionCode { .. })
        ));
    }
}
