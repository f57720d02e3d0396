use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use crate::ValidationError;

const ISO_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
const LONG_FORM: &[BorrowedFormatItem<'static>] =
    format_description!("[day padding:none] [month repr:long] [year]");

/// Validated `YYYY-MM-DD` history key.
///
/// Ordering is calendar order: the canonical form sorts lexicographically, so
/// a `BTreeMap<IsoDate, _>` is always chronologically ascending with unique
/// keys.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IsoDate(String);

impl IsoDate {
    /// Parse a strict ISO date string.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        let date = Date::parse(trimmed, ISO_DATE).map_err(|_| ValidationError::InvalidDate {
            value: input.to_owned(),
        })?;
        Ok(Self::from_date(date))
    }

    /// Parse a long-form textual label such as `26 January 2023`.
    pub fn parse_long_form(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        let date = Date::parse(trimmed, LONG_FORM).map_err(|_| ValidationError::InvalidDate {
            value: input.to_owned(),
        })?;
        Ok(Self::from_date(date))
    }

    pub fn from_date(date: Date) -> Self {
        Self(
            date.format(ISO_DATE)
                .expect("ISO date description formats any calendar date"),
        )
    }

    /// Calendar date of a Unix timestamp, interpreted in UTC.
    pub fn from_unix_timestamp(ts: i64) -> Result<Self, ValidationError> {
        let odt = OffsetDateTime::from_unix_timestamp(ts).map_err(|_| {
            ValidationError::InvalidDate {
                value: ts.to_string(),
            }
        })?;
        Ok(Self::from_date(odt.date()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_date(&self) -> Date {
        Date::parse(&self.0, ISO_DATE).expect("canonical form round-trips")
    }
}

impl Display for IsoDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for IsoDate {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<IsoDate> for String {
    fn from(value: IsoDate) -> Self {
        value.0
    }
}
