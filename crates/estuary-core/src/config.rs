use std::collections::BTreeMap;

/// Environment variable holding the OpenWeatherMap API key.
pub const OPENWEATHER_API_KEY_VAR: &str = "ESTUARY_OPENWEATHER_API_KEY";

/// Default per-call upstream timeout.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

const BUNDLED_REGION_PAGES: &str = include_str!("../assets/region_pages.json");

/// Immutable process-wide reference data and credentials, constructed once
/// and passed to adapters at construction time.
///
/// Adapters never reach for ambient global state; substituting a config (for
/// example a custom region table) is how tests exercise them.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// Timeout budget for a single upstream call, in milliseconds.
    pub timeout_ms: u64,
    /// OpenWeatherMap API key used by the weather adapter. Absence is kept
    /// explicit so a weather run can report the missing configuration
    /// instead of a misleading upstream rejection.
    pub openweather_api_key: Option<String>,
    /// Region code to upstream page-path token, for the epidemic adapter.
    pub region_pages: BTreeMap<String, String>,
}

impl SourceConfig {
    /// Config with the bundled region table and a key taken from the
    /// environment, when set.
    pub fn from_env() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            openweather_api_key: std::env::var(OPENWEATHER_API_KEY_VAR).ok(),
            region_pages: bundled_region_pages(),
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_openweather_api_key(mut self, key: impl Into<String>) -> Self {
        self.openweather_api_key = Some(key.into());
        self
    }

    pub fn with_region_pages(mut self, region_pages: BTreeMap<String, String>) -> Self {
        self.region_pages = region_pages;
        self
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

fn bundled_region_pages() -> BTreeMap<String, String> {
    serde_json::from_str(BUNDLED_REGION_PAGES).expect("bundled region table is valid JSON")
}
