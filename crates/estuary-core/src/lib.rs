//! # Estuary Core
//!
//! Core contracts and domain types for the Estuary data aggregation toolkit.
//!
//! ## Overview
//!
//! This crate provides the foundational components for Estuary:
//!
//! - **Canonical document models** for series, counter, and weather outputs
//! - **Source identifiers** for the four fixed upstream kinds
//! - **Pipeline trait** with the extract/transform/load stage contract
//! - **Single-use runner** sequencing one invocation through its stages
//! - **Source adapters** for the rate, epidemic, ticker, and weather upstreams
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Source adapters (rate table, epidemic counters, ticker, weather) |
//! | [`config`] | Source configuration and environment lookup |
//! | [`domain`] | Domain models (dates, scalars, documents, request vocabularies) |
//! | [`engine`] | Query gateway dispatching requests to pipelines |
//! | [`error`] | Input validation errors |
//! | [`http_client`] | HTTP client abstraction |
//! | [`pipeline`] | Pipeline contract, runner, and request parameters |
//! | [`source`] | Source kind identifiers |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use estuary_core::{Engine, PipelineRequest, SourceConfig, TickerParams};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SourceConfig::from_env();
//!     let engine = Engine::with_reqwest(&config);
//!
//!     let params = TickerParams::new("MSFT", Some("1mo"), None)?;
//!     let document = engine.run(PipelineRequest::Ticker(params)).await?;
//!
//!     println!("{}", serde_json::to_string_pretty(&document)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  CLI / Caller   │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │  Engine         │  one adapter per source kind
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Runner          │────▶│ Pipeline         │
//! │ (per request)   │     │ (extract/        │
//! └─────────────────┘     │  transform/load) │
//!          │              └────────┬─────────┘
//!          │                       │
//!          ▼                       ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Document        │     │ HTTP Client      │
//! │ (canonical)     │     │ (reqwest/mock)   │
//! └─────────────────┘     └──────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! All pipeline operations return `Result` types with structured errors:
//!
//! ```rust
//! use estuary_core::{EtlError, EtlErrorKind};
//!
//! fn handle_error(error: EtlError) {
//!     match error.kind() {
//!         EtlErrorKind::UpstreamUnavailable => {
//!             // Transient: the caller may retry
//!         }
//!         EtlErrorKind::InvalidReference => {
//!             // The requested entity does not exist upstream
//!         }
//!         EtlErrorKind::InvalidParameter => {
//!             // Report the rejected value to the user
//!         }
//!         EtlErrorKind::UpstreamShape => {
//!             // The upstream changed its layout
//!         }
//!     }
//! }
//! ```
//!
//! ## Security
//!
//! - API keys are read from environment variables only (never logged)
//! - Input validation on all request parameters before any network call

pub mod adapters;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod http_client;
pub mod pipeline;
pub mod source;

// Re-export commonly used types at crate root for convenience

// Adapter implementations
pub use adapters::{EpidemicAdapter, RateAdapter, TickerAdapter, WeatherAdapter, WeatherPayload};

// Configuration
pub use config::{SourceConfig, DEFAULT_TIMEOUT_MS, OPENWEATHER_API_KEY_VAR};

// Domain models
pub use domain::{
    CityBlock, Column, ConditionBlock, Coordinate, CounterDocument, Document, FieldRecord,
    IsoDate, Period, RegionCode, Scalar, SeriesDocument, TickerSymbol, WeatherDocument,
    NOT_AVAILABLE,
};

// Engine types
pub use engine::{Engine, PipelineRequest};

// Error types
pub use error::ValidationError;

// HTTP client types
pub use http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};

// Pipeline contract and parameters
pub use pipeline::{
    BoxFuture, EpidemicParams, EtlError, EtlErrorKind, Pipeline, RateParams, RunState, Runner,
    TickerParams, WeatherParams,
};

// Source identifiers
pub use source::SourceKind;
