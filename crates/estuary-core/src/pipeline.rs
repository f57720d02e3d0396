//! Pipeline contract and runner.
//!
//! Each source kind implements the same three-stage shape: extract a raw
//! upstream payload, transform it into a canonical document, load (an
//! identity pass-through reserved for future persistence). The runner
//! sequences the stages for one invocation and fails fast: an extraction
//! error aborts the run before the normalizer is ever invoked, and the first
//! failure is propagated verbatim.

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use time::{Date, Duration, OffsetDateTime};

use crate::domain::{Column, Coordinate, Document, Period, RegionCode, TickerSymbol};
use crate::source::SourceKind;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Pipeline-boundary error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EtlErrorKind {
    /// Network failure, timeout, non-2xx status, or empty payload.
    UpstreamUnavailable,
    /// The requested entity cannot be resolved to an upstream identifier.
    InvalidReference,
    /// Caller-supplied value outside a fixed allow-list.
    InvalidParameter,
    /// Response received but its shape does not match the expected document.
    UpstreamShape,
}

/// Structured error crossing every pipeline boundary.
///
/// Adapters raise `UpstreamUnavailable`/`InvalidReference`; normalizers raise
/// `InvalidParameter`/`UpstreamShape`. The runner never swallows or
/// downgrades a kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EtlError {
    kind: EtlErrorKind,
    message: String,
    retryable: bool,
}

impl EtlError {
    pub fn upstream_unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: EtlErrorKind::UpstreamUnavailable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn invalid_reference(message: impl Into<String>) -> Self {
        Self {
            kind: EtlErrorKind::InvalidReference,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self {
            kind: EtlErrorKind::InvalidParameter,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn upstream_shape(message: impl Into<String>) -> Self {
        Self {
            kind: EtlErrorKind::UpstreamShape,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> EtlErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            EtlErrorKind::UpstreamUnavailable => "etl.upstream_unavailable",
            EtlErrorKind::InvalidReference => "etl.invalid_reference",
            EtlErrorKind::InvalidParameter => "etl.invalid_parameter",
            EtlErrorKind::UpstreamShape => "etl.upstream_shape",
        }
    }
}

impl Display for EtlError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for EtlError {}

/// Source adapter + normalizer contract for one fixed pipeline.
///
/// `extract` performs the upstream calls; `transform` is pure (no I/O) and
/// deterministic given identical input; `load` defaults to the identity
/// pass-through and exists as an extension point for persistence.
pub trait Pipeline: Send + Sync {
    type Params: Send + Sync;
    type Raw: Send;

    fn kind(&self) -> SourceKind;

    fn extract<'a>(&'a self, params: &'a Self::Params)
        -> BoxFuture<'a, Result<Self::Raw, EtlError>>;

    fn transform(&self, raw: Self::Raw, params: &Self::Params) -> Result<Document, EtlError>;

    fn load(&self, document: Document) -> Result<Document, EtlError> {
        Ok(document)
    }
}

/// Run lifecycle for one pipeline invocation.
///
/// `Idle → Extracting → Transforming → Loaded` on success; any stage failure
/// moves to the terminal `Failed`. No retries, no cancellation once started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Idle,
    Extracting,
    Transforming,
    Loaded,
    Failed,
}

/// Single-use pipeline runner; one instance per invocation, no persisted
/// identity.
pub struct Runner<'a, P: Pipeline> {
    pipeline: &'a P,
    state: RunState,
}

impl<'a, P: Pipeline> Runner<'a, P> {
    pub fn new(pipeline: &'a P) -> Self {
        Self {
            pipeline,
            state: RunState::Idle,
        }
    }

    pub const fn state(&self) -> RunState {
        self.state
    }

    pub async fn run(&mut self, params: &P::Params) -> Result<Document, EtlError> {
        self.state = RunState::Extracting;
        let raw = match self.pipeline.extract(params).await {
            Ok(raw) => raw,
            Err(error) => {
                self.state = RunState::Failed;
                return Err(error);
            }
        };

        self.state = RunState::Transforming;
        let document = match self
            .pipeline
            .transform(raw, params)
            .and_then(|document| self.pipeline.load(document))
        {
            Ok(document) => document,
            Err(error) => {
                self.state = RunState::Failed;
                return Err(error);
            }
        };

        self.state = RunState::Loaded;
        Ok(document)
    }
}

/// Parameters for the rate pipeline: an inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateParams {
    pub from_date: Date,
    pub to_date: Date,
}

impl RateParams {
    /// Defaults to the trailing 365 days ending today when a bound is
    /// unspecified.
    pub fn new(from_date: Option<Date>, to_date: Option<Date>) -> Result<Self, EtlError> {
        let today = OffsetDateTime::now_utc().date();
        let to_date = to_date.unwrap_or(today);
        let from_date = from_date.unwrap_or_else(|| to_date - Duration::days(365));

        if from_date > to_date {
            return Err(EtlError::invalid_parameter(format!(
                "from_date {from_date} is after to_date {to_date}"
            )));
        }

        Ok(Self { from_date, to_date })
    }
}

/// Parameters for the epidemic pipeline: a validated region code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpidemicParams {
    pub region: RegionCode,
}

impl EpidemicParams {
    pub fn new(region: &str) -> Result<Self, EtlError> {
        let region =
            RegionCode::parse(region).map_err(|error| EtlError::invalid_reference(error.to_string()))?;
        Ok(Self { region })
    }
}

/// Parameters for the ticker pipeline: symbol plus optional period and
/// column projection, both checked against their fixed allow-lists before
/// any upstream call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickerParams {
    pub symbol: TickerSymbol,
    pub period: Option<Period>,
    pub columns: Vec<Column>,
}

impl TickerParams {
    pub fn new(
        symbol: &str,
        period: Option<&str>,
        columns: Option<&[String]>,
    ) -> Result<Self, EtlError> {
        let symbol = TickerSymbol::parse(symbol)
            .map_err(|error| EtlError::invalid_reference(error.to_string()))?;

        let period = period
            .map(Period::parse)
            .transpose()
            .map_err(|error| EtlError::invalid_parameter(error.to_string()))?;

        let columns = match columns {
            None => Column::default_projection().to_vec(),
            Some(raw) => raw
                .iter()
                .map(|name| Column::parse(name))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|error| EtlError::invalid_parameter(error.to_string()))?,
        };

        if columns.is_empty() {
            return Err(EtlError::invalid_parameter(
                "column projection must not be empty",
            ));
        }

        Ok(Self {
            symbol,
            period,
            columns,
        })
    }
}

/// Parameters for the weather pipeline: a coordinate pair or a city name,
/// never both required.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherParams {
    pub city: Option<String>,
    pub position: Option<Coordinate>,
}

impl WeatherParams {
    pub fn new(city: Option<String>, position: Option<Coordinate>) -> Result<Self, EtlError> {
        let city = city.map(|name| name.trim().to_owned()).filter(|name| !name.is_empty());

        if city.is_none() && position.is_none() {
            return Err(EtlError::invalid_parameter(
                "weather request needs a city name or a coordinate pair",
            ));
        }

        Ok(Self { city, position })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn rate_params_default_to_trailing_year() {
        let params = RateParams::new(None, None).expect("defaults are valid");
        assert_eq!(params.to_date - params.from_date, Duration::days(365));
    }

    #[test]
    fn rate_params_reject_inverted_range() {
        let error = RateParams::new(
            Some(date!(2023 - 02 - 01)),
            Some(date!(2023 - 01 - 01)),
        )
        .expect_err("inverted range must fail");
        assert_eq!(error.kind(), EtlErrorKind::InvalidParameter);
    }

    #[test]
    fn ticker_params_reject_bogus_column_before_any_fetch() {
        let error = TickerParams::new("AAPL", None, Some(&[String::from("Bogus")]))
            .expect_err("unknown column must fail");
        assert_eq!(error.kind(), EtlErrorKind::InvalidParameter);
        assert!(error.message().contains("Bogus"));
    }

    #[test]
    fn ticker_params_reject_bogus_period() {
        let error =
            TickerParams::new("AAPL", Some("2wk"), None).expect_err("unknown period must fail");
        assert_eq!(error.kind(), EtlErrorKind::InvalidParameter);
    }

    #[test]
    fn ticker_params_default_projection_is_close_volume_close_pct() {
        let params = TickerParams::new("aapl", Some("1wk"), None).expect("params are valid");
        assert_eq!(params.symbol.as_str(), "AAPL");
        assert_eq!(
            params.columns,
            vec![Column::Close, Column::Volume, Column::ClosePct]
        );
    }

    #[test]
    fn weather_params_require_city_or_position() {
        let error = WeatherParams::new(None, None).expect_err("empty request must fail");
        assert_eq!(error.kind(), EtlErrorKind::InvalidParameter);

        let params = WeatherParams::new(Some(String::from("  ")), Some(Coordinate::new(48.2, 16.3)))
            .expect("coordinate alone suffices");
        assert!(params.city.is_none());
        assert!(params.position.is_some());
    }

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(
            EtlError::upstream_unavailable("x").code(),
            "etl.upstream_unavailable"
        );
        assert_eq!(EtlError::invalid_reference("x").code(), "etl.invalid_reference");
        assert_eq!(EtlError::invalid_parameter("x").code(), "etl.invalid_parameter");
        assert_eq!(EtlError::upstream_shape("x").code(), "etl.upstream_shape");
        assert!(EtlError::upstream_unavailable("x").retryable());
        assert!(!EtlError::upstream_shape("x").retryable());
    }
}
