use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// History column accepted by the ticker pipeline's projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Open,
    High,
    Low,
    Close,
    Volume,
    Dividends,
    StockSplits,
    ClosePct,
}

impl Column {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        match input.trim() {
            "Open" => Ok(Self::Open),
            "High" => Ok(Self::High),
            "Low" => Ok(Self::Low),
            "Close" => Ok(Self::Close),
            "Volume" => Ok(Self::Volume),
            "Dividends" => Ok(Self::Dividends),
            "Stock Splits" => Ok(Self::StockSplits),
            "Close%" => Ok(Self::ClosePct),
            other => Err(ValidationError::InvalidColumn {
                value: other.to_owned(),
            }),
        }
    }

    /// Output key, matching the upstream provider's column labels.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::High => "High",
            Self::Low => "Low",
            Self::Close => "Close",
            Self::Volume => "Volume",
            Self::Dividends => "Dividends",
            Self::StockSplits => "Stock Splits",
            Self::ClosePct => "Close%",
        }
    }

    /// Default projection used when the caller does not request columns.
    pub const fn default_projection() -> [Self; 3] {
        [Self::Close, Self::Volume, Self::ClosePct]
    }
}

impl Display for Column {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
