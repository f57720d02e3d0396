use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Source kind identifying one of the fixed, statically known pipelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Rate,
    Epidemic,
    Ticker,
    Weather,
}

impl SourceKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rate => "rate",
            Self::Epidemic => "epidemic",
            Self::Ticker => "ticker",
            Self::Weather => "weather",
        }
    }
}

impl Display for SourceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
