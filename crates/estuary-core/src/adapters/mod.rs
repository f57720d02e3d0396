//! Source adapters and their normalizers, one module per source kind.
//!
//! Adapters own the upstream calls (extract) and the per-source pure
//! normalization (transform). Each holds an injected [`HttpClient`] and the
//! immutable [`SourceConfig`](crate::SourceConfig) slices it needs, so tests
//! can substitute both.

mod epidemic;
mod rate;
mod ticker;
mod weather;

pub use epidemic::EpidemicAdapter;
pub use rate::RateAdapter;
pub use ticker::TickerAdapter;
pub use weather::{WeatherAdapter, WeatherPayload};

use std::sync::Arc;

use crate::http_client::{HttpClient, HttpRequest};
use crate::pipeline::EtlError;
use crate::source::SourceKind;

/// Execute one upstream call and return a usable body.
///
/// Transport failure, non-2xx status, and an empty body all mean the same
/// thing at the pipeline boundary: the upstream gave us nothing to work
/// with.
pub(crate) async fn fetch_body(
    http_client: &Arc<dyn HttpClient>,
    request: HttpRequest,
    source: SourceKind,
) -> Result<String, EtlError> {
    let response = http_client.execute(request).await.map_err(|error| {
        if error.timed_out() {
            EtlError::upstream_unavailable(format!("{source} upstream timed out: {}", error.message()))
        } else {
            EtlError::upstream_unavailable(format!("{source} transport error: {}", error.message()))
        }
    })?;

    if !response.is_success() {
        return Err(EtlError::upstream_unavailable(format!(
            "{source} upstream returned status {}",
            response.status
        )));
    }

    if response.body.trim().is_empty() {
        return Err(EtlError::upstream_unavailable(format!(
            "{source} upstream returned an empty body"
        )));
    }

    Ok(response.body)
}
