use thiserror::Error;

/// Domain-level validation failures raised while constructing typed values.
///
/// These are mapped onto the pipeline error taxonomy at the parameter-set
/// boundary: identifier errors become `InvalidReference`, allow-list errors
/// become `InvalidParameter`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("ticker symbol must not be empty")]
    EmptyTicker,

    #[error("ticker symbol length {len} exceeds maximum {max}")]
    TickerTooLong { len: usize, max: usize },

    #[error("ticker symbol contains invalid character '{ch}' at index {index}")]
    TickerInvalidChar { ch: char, index: usize },

    #[error("region code '{value}' must be GLOBAL or an ISO-3166 alpha-2 code")]
    InvalidRegionCode { value: String },

    #[error("'{value}' is not a valid ISO date (YYYY-MM-DD)")]
    InvalidDate { value: String },

    #[error("bad period value '{value}'; valid periods: 1d, 1wk, 1mo, 6mo, 1y, 5y, max")]
    InvalidPeriod { value: String },

    #[error(
        "bad column value '{value}'; valid columns: Open, High, Low, Close, Volume, Dividends, Stock Splits, Close%"
    )]
    InvalidColumn { value: String },
}
