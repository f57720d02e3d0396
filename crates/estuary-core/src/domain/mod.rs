//! Canonical domain types for estuary pipeline output.
//!
//! All types validate their invariants at construction time and serialize to
//! the stable output schema consumed by the query gateway: nested mappings
//! whose scalars are plain numbers or strings and whose date/time keys are
//! strings.

mod column;
mod date;
mod documents;
mod period;
mod region;
mod ticker;
mod value;

pub use column::Column;
pub use date::IsoDate;
pub use documents::{
    CityBlock, ConditionBlock, Coordinate, CounterDocument, Document, FieldRecord, SeriesDocument,
    WeatherDocument,
};
pub use period::Period;
pub use region::RegionCode;
pub use ticker::TickerSymbol;
pub use value::{pct_change, round2, Scalar, NOT_AVAILABLE};
