//! Query gateway over the four fixed pipelines.
//!
//! The engine owns one adapter per source kind and dispatches each request to
//! a fresh single-use [`Runner`]. It holds no mutable state between requests,
//! so concurrent runs never interact.

use std::sync::Arc;

use crate::adapters::{EpidemicAdapter, RateAdapter, TickerAdapter, WeatherAdapter};
use crate::config::SourceConfig;
use crate::domain::Document;
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::pipeline::{
    EpidemicParams, EtlError, Pipeline, RateParams, Runner, TickerParams, WeatherParams,
};
use crate::source::SourceKind;

/// One validated pipeline request, ready to run.
#[derive(Debug, Clone)]
pub enum PipelineRequest {
    Rate(RateParams),
    Epidemic(EpidemicParams),
    Ticker(TickerParams),
    Weather(WeatherParams),
}

impl PipelineRequest {
    pub const fn kind(&self) -> SourceKind {
        match self {
            Self::Rate(_) => SourceKind::Rate,
            Self::Epidemic(_) => SourceKind::Epidemic,
            Self::Ticker(_) => SourceKind::Ticker,
            Self::Weather(_) => SourceKind::Weather,
        }
    }
}

/// Facade bundling the four source pipelines behind one async entry point.
pub struct Engine {
    rate: RateAdapter,
    epidemic: EpidemicAdapter,
    ticker: TickerAdapter,
    weather: WeatherAdapter,
}

impl Engine {
    pub fn new(config: &SourceConfig, http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            rate: RateAdapter::new(config, Arc::clone(&http_client)),
            epidemic: EpidemicAdapter::new(config, Arc::clone(&http_client)),
            ticker: TickerAdapter::new(config, Arc::clone(&http_client)),
            weather: WeatherAdapter::new(config, http_client),
        }
    }

    /// Engine wired to the production reqwest transport.
    pub fn with_reqwest(config: &SourceConfig) -> Self {
        Self::new(config, Arc::new(ReqwestHttpClient::new()))
    }

    /// Run one request to completion on a fresh runner.
    pub async fn run(&self, request: PipelineRequest) -> Result<Document, EtlError> {
        match request {
            PipelineRequest::Rate(params) => run_one(&self.rate, &params).await,
            PipelineRequest::Epidemic(params) => run_one(&self.epidemic, &params).await,
            PipelineRequest::Ticker(params) => run_one(&self.ticker, &params).await,
            PipelineRequest::Weather(params) => run_one(&self.weather, &params).await,
        }
    }
}

async fn run_one<P: Pipeline>(pipeline: &P, params: &P::Params) -> Result<Document, EtlError> {
    Runner::new(pipeline).run(params).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_kind_matches_the_wrapped_params() {
        let request = PipelineRequest::Epidemic(
            EpidemicParams::new("HU").expect("valid region"),
        );
        assert_eq!(request.kind(), SourceKind::Epidemic);

        let request = PipelineRequest::Ticker(
            TickerParams::new("MSFT", None, None).expect("valid symbol"),
        );
        assert_eq!(request.kind(), SourceKind::Ticker);
    }
}
