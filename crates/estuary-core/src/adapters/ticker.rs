use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;

use crate::config::SourceConfig;
use crate::domain::{
    pct_change, round2, Column, Document, FieldRecord, IsoDate, Period, Scalar, SeriesDocument,
};
use crate::http_client::{HttpClient, HttpRequest};
use crate::pipeline::{BoxFuture, EtlError, Pipeline, TickerParams};
use crate::source::SourceKind;

const QUOTE_SUMMARY_ENDPOINT: &str = "https://query1.finance.yahoo.com/v10/finance/quoteSummary";
const CHART_ENDPOINT: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Raw payload of one ticker run: metadata and chart bodies, parsed during
/// transform.
#[derive(Debug, Clone)]
pub struct TickerPayload {
    pub meta: String,
    pub chart: String,
}

/// Financial-ticker adapter against the provider's quoteSummary and chart
/// endpoints.
///
/// Symbol existence is confirmed during extract by probing the metadata for
/// a present, non-empty short name; a missing name is `InvalidReference`,
/// not a soft "no data".
#[derive(Clone)]
pub struct TickerAdapter {
    http_client: Arc<dyn HttpClient>,
    timeout_ms: u64,
}

impl TickerAdapter {
    pub fn new(config: &SourceConfig, http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            timeout_ms: config.timeout_ms,
        }
    }
}

impl Pipeline for TickerAdapter {
    type Params = TickerParams;
    type Raw = TickerPayload;

    fn kind(&self) -> SourceKind {
        SourceKind::Ticker
    }

    fn extract<'a>(
        &'a self,
        params: &'a Self::Params,
    ) -> BoxFuture<'a, Result<Self::Raw, EtlError>> {
        Box::pin(async move {
            let symbol = params.symbol.as_str();

            let meta_url = format!(
                "{QUOTE_SUMMARY_ENDPOINT}/{}?modules=price%2CsummaryDetail%2CfinancialData",
                urlencoding::encode(symbol)
            );
            let request = HttpRequest::get(meta_url).with_timeout_ms(self.timeout_ms);
            let meta = super::fetch_body(&self.http_client, request, self.kind()).await?;
            ensure_symbol_exists(symbol, &meta)?;

            let range = params.period.unwrap_or(Period::OneWeek);
            let chart_url = format!(
                "{CHART_ENDPOINT}/{}?range={}&interval=1d&events=div%2Csplit",
                urlencoding::encode(symbol),
                range.as_str()
            );
            let request = HttpRequest::get(chart_url).with_timeout_ms(self.timeout_ms);
            let chart = super::fetch_body(&self.http_client, request, self.kind()).await?;

            Ok(TickerPayload { meta, chart })
        })
    }

    fn transform(&self, raw: Self::Raw, params: &Self::Params) -> Result<Document, EtlError> {
        let info = normalize_metadata(&raw.meta)?;
        let hist = normalize_history(&raw.chart, &params.columns)?;
        Ok(Document::Series(SeriesDocument::new(info, hist)))
    }
}

/// Confirmatory round-trip: only the upstream can tell whether a symbol
/// resolves, and it signals existence through the metadata short name.
fn ensure_symbol_exists(symbol: &str, meta_body: &str) -> Result<(), EtlError> {
    let value: serde_json::Value = serde_json::from_str(meta_body).map_err(|error| {
        EtlError::upstream_shape(format!("ticker metadata is not valid JSON: {error}"))
    })?;

    let short_name = value
        .pointer("/quoteSummary/result/0/price/shortName")
        .and_then(serde_json::Value::as_str)
        .unwrap_or("");
    if short_name.trim().is_empty() {
        return Err(EtlError::invalid_reference(format!(
            "ticker symbol '{symbol}' does not exist"
        )));
    }

    Ok(())
}

/// Build `info` from the fixed metadata subset plus the derived `change`
/// percentage.
fn normalize_metadata(meta_body: &str) -> Result<FieldRecord, EtlError> {
    let response: QuoteSummaryResponse = serde_json::from_str(meta_body).map_err(|error| {
        EtlError::upstream_shape(format!("ticker metadata does not match expected shape: {error}"))
    })?;

    let result = response
        .quote_summary
        .result
        .unwrap_or_default()
        .into_iter()
        .next()
        .ok_or_else(|| EtlError::upstream_shape("ticker metadata result is empty"))?;
    let price = result
        .price
        .ok_or_else(|| EtlError::upstream_shape("ticker metadata is missing the price module"))?;

    let current = price
        .regular_market_price
        .as_ref()
        .and_then(RawNumber::value)
        .ok_or_else(|| EtlError::upstream_shape("ticker metadata is missing regularMarketPrice"))?;
    let previous = result
        .summary_detail
        .as_ref()
        .and_then(|detail| detail.previous_close.as_ref())
        .or(price.regular_market_previous_close.as_ref())
        .and_then(RawNumber::value)
        .ok_or_else(|| EtlError::upstream_shape("ticker metadata is missing previousClose"))?;

    let mut info = FieldRecord::new();
    if let Some(detail) = result.summary_detail.as_ref() {
        if let Some(bid) = detail.bid.as_ref().and_then(RawNumber::value) {
            info.insert(String::from("bid"), Scalar::Number(bid));
        }
        if let Some(ask) = detail.ask.as_ref().and_then(RawNumber::value) {
            info.insert(String::from("ask"), Scalar::Number(ask));
        }
    }
    if let Some(current_price) = result
        .financial_data
        .as_ref()
        .and_then(|data| data.current_price.as_ref())
        .and_then(RawNumber::value)
    {
        info.insert(String::from("currentPrice"), Scalar::Number(current_price));
    }
    if let Some(short_name) = price.short_name.filter(|name| !name.is_empty()) {
        info.insert(String::from("shortName"), Scalar::Text(short_name));
    }
    if let Some(exchange) = price.exchange.filter(|name| !name.is_empty()) {
        info.insert(String::from("exchange"), Scalar::Text(exchange));
    }
    info.insert(String::from("regularMarketPrice"), Scalar::Number(current));
    info.insert(String::from("previousClose"), Scalar::Number(previous));
    info.insert(
        String::from("change"),
        Scalar::Number(pct_change(current, previous)),
    );

    Ok(info)
}

/// Reshape the chart time series into ISO-keyed ascending history and
/// project it onto the requested columns.
///
/// Closing prices are rounded to two decimals before the day-over-day
/// `Close%` is derived; the first row has no predecessor and carries the
/// explicit `N/A` marker.
fn normalize_history(
    chart_body: &str,
    columns: &[Column],
) -> Result<BTreeMap<IsoDate, FieldRecord>, EtlError> {
    let response: ChartResponse = serde_json::from_str(chart_body).map_err(|error| {
        EtlError::upstream_shape(format!("ticker chart does not match expected shape: {error}"))
    })?;

    let result = response
        .chart
        .result
        .unwrap_or_default()
        .into_iter()
        .next()
        .ok_or_else(|| EtlError::upstream_shape("ticker chart result is empty"))?;
    let timestamps = result
        .timestamp
        .ok_or_else(|| EtlError::upstream_shape("ticker chart has no timestamps"))?;
    let quote = result
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| EtlError::upstream_shape("ticker chart has no quote block"))?;

    let mut dividends: BTreeMap<IsoDate, f64> = BTreeMap::new();
    let mut splits: BTreeMap<IsoDate, f64> = BTreeMap::new();
    if let Some(events) = result.events {
        for event in events.dividends.unwrap_or_default().into_values() {
            if let Ok(date) = IsoDate::from_unix_timestamp(event.date) {
                dividends.insert(date, event.amount);
            }
        }
        for event in events.splits.unwrap_or_default().into_values() {
            if event.denominator != 0.0 {
                if let Ok(date) = IsoDate::from_unix_timestamp(event.date) {
                    splits.insert(date, event.numerator / event.denominator);
                }
            }
        }
    }

    struct Row {
        open: Option<f64>,
        high: Option<f64>,
        low: Option<f64>,
        close: Option<f64>,
        volume: Option<i64>,
    }

    // Rows without a close are kept with explicit markers; the BTreeMap
    // reindexes whatever order the upstream used to ascending unique ISO
    // dates.
    let mut rows: BTreeMap<IsoDate, Row> = BTreeMap::new();
    for (index, ts) in timestamps.iter().enumerate() {
        let date = IsoDate::from_unix_timestamp(*ts).map_err(|_| {
            EtlError::upstream_shape(format!("ticker chart timestamp {ts} is out of range"))
        })?;
        rows.insert(
            date,
            Row {
                open: quote.open.get(index).copied().flatten(),
                high: quote.high.get(index).copied().flatten(),
                low: quote.low.get(index).copied().flatten(),
                close: quote.close.get(index).copied().flatten().map(round2),
                volume: quote.volume.get(index).copied().flatten(),
            },
        );
    }
    if rows.is_empty() {
        return Err(EtlError::upstream_shape("ticker chart contained no usable rows"));
    }

    let mut hist = BTreeMap::new();
    // Close% pads over gaps: a row after a close-less day derives from the
    // last close actually observed.
    let mut previous_close: Option<f64> = None;
    for (date, row) in rows {
        let close_pct = match (row.close, previous_close) {
            (Some(current), Some(previous)) => Some(pct_change(current, previous)),
            _ => None,
        };
        let record: FieldRecord = columns
            .iter()
            .map(|column| {
                let value = match column {
                    Column::Open => optional_number(row.open),
                    Column::High => optional_number(row.high),
                    Column::Low => optional_number(row.low),
                    Column::Close => optional_number(row.close),
                    Column::Volume => row.volume.map(Scalar::Int).unwrap_or(Scalar::NotAvailable),
                    Column::Dividends => {
                        Scalar::Number(dividends.get(&date).copied().unwrap_or(0.0))
                    }
                    Column::StockSplits => {
                        Scalar::Number(splits.get(&date).copied().unwrap_or(0.0))
                    }
                    Column::ClosePct => {
                        close_pct.map(Scalar::Number).unwrap_or(Scalar::NotAvailable)
                    }
                };
                (column.as_str().to_owned(), value)
            })
            .collect();

        if row.close.is_some() {
            previous_close = row.close;
        }
        hist.insert(date, record);
    }

    Ok(hist)
}

fn optional_number(value: Option<f64>) -> Scalar {
    value.map(Scalar::Number).unwrap_or(Scalar::NotAvailable)
}

// Provider response structures. Numeric fields arrive wrapped in an object
// carrying the raw value plus display metadata.

#[derive(Debug, Clone, Deserialize)]
struct QuoteSummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummaryData,
}

#[derive(Debug, Clone, Deserialize)]
struct QuoteSummaryData {
    #[serde(default)]
    result: Option<Vec<QuoteSummaryResult>>,
}

#[derive(Debug, Clone, Deserialize)]
struct QuoteSummaryResult {
    #[serde(default)]
    price: Option<PriceModule>,
    #[serde(rename = "summaryDetail", default)]
    summary_detail: Option<SummaryDetailModule>,
    #[serde(rename = "financialData", default)]
    financial_data: Option<FinancialDataModule>,
}

#[derive(Debug, Clone, Deserialize)]
struct PriceModule {
    #[serde(rename = "shortName", default)]
    short_name: Option<String>,
    #[serde(default)]
    exchange: Option<String>,
    #[serde(rename = "regularMarketPrice", default)]
    regular_market_price: Option<RawNumber>,
    #[serde(rename = "regularMarketPreviousClose", default)]
    regular_market_previous_close: Option<RawNumber>,
}

#[derive(Debug, Clone, Deserialize)]
struct SummaryDetailModule {
    #[serde(default)]
    bid: Option<RawNumber>,
    #[serde(default)]
    ask: Option<RawNumber>,
    #[serde(rename = "previousClose", default)]
    previous_close: Option<RawNumber>,
}

#[derive(Debug, Clone, Deserialize)]
struct FinancialDataModule {
    #[serde(rename = "currentPrice", default)]
    current_price: Option<RawNumber>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawNumber {
    #[serde(default)]
    raw: Option<f64>,
}

impl RawNumber {
    fn value(&self) -> Option<f64> {
        self.raw.filter(|value| value.is_finite())
    }
}

#[derive(Debug, Clone, Deserialize)]
struct ChartResponse {
    chart: ChartData,
}

#[derive(Debug, Clone, Deserialize)]
struct ChartData {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    indicators: ChartIndicators,
    #[serde(default)]
    events: Option<ChartEvents>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChartIndicators {
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<i64>>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChartEvents {
    #[serde(default)]
    dividends: Option<BTreeMap<String, DividendEvent>>,
    #[serde(default)]
    splits: Option<BTreeMap<String, SplitEvent>>,
}

#[derive(Debug, Clone, Deserialize)]
struct DividendEvent {
    amount: f64,
    date: i64,
}

#[derive(Debug, Clone, Deserialize)]
struct SplitEvent {
    date: i64,
    numerator: f64,
    denominator: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::EtlErrorKind;

    const META: &str = r#"{
        "quoteSummary": {
            "result": [{
                "price": {
                    "shortName": "Apple Inc.",
                    "exchange": "NMS",
                    "regularMarketPrice": {"raw": 100.0},
                    "regularMarketPreviousClose": {"raw": 95.0}
                },
                "summaryDetail": {
                    "bid": {"raw": 99.9},
                    "ask": {"raw": 100.1},
                    "previousClose": {"raw": 95.0}
                },
                "financialData": {
                    "currentPrice": {"raw": 100.0}
                }
            }],
            "error": null
        }
    }"#;

    // 2023-01-02, 2023-01-03, 2023-01-04 at 14:30 UTC
    const CHART: &str = r#"{
        "chart": {
            "result": [{
                "timestamp": [1672669800, 1672756200, 1672842600],
                "indicators": {
                    "quote": [{
                        "open": [99.5, 100.2, 101.1],
                        "high": [100.9, 101.4, 102.3],
                        "low": [99.1, 99.8, 100.6],
                        "close": [100.004, 101.006, 100.501],
                        "volume": [50000, 52000, 48000]
                    }]
                }
            }],
            "error": null
        }
    }"#;

    #[test]
    fn metadata_derives_the_change_percentage() {
        let info = normalize_metadata(META).expect("metadata should normalize");
        assert_eq!(info.get("change"), Some(&Scalar::Number(5.26)));
        assert_eq!(info.get("shortName"), Some(&Scalar::text("Apple Inc.")));
        assert_eq!(info.get("regularMarketPrice"), Some(&Scalar::Number(100.0)));
        assert_eq!(info.get("previousClose"), Some(&Scalar::Number(95.0)));
    }

    #[test]
    fn metadata_without_previous_close_is_a_shape_error() {
        let body = r#"{
            "quoteSummary": {
                "result": [{
                    "price": {
                        "shortName": "Apple Inc.",
                        "regularMarketPrice": {"raw": 100.0}
                    }
                }]
            }
        }"#;
        let error = normalize_metadata(body).expect_err("missing previousClose must fail");
        assert_eq!(error.kind(), EtlErrorKind::UpstreamShape);
        assert!(error.message().contains("previousClose"));
    }

    #[test]
    fn history_keys_are_ascending_unique_iso_dates() {
        let columns = [Column::Close, Column::Volume, Column::ClosePct];
        let hist = normalize_history(CHART, &columns).expect("chart should normalize");

        let keys: Vec<_> = hist.keys().map(IsoDate::as_str).collect();
        assert_eq!(keys, ["2023-01-02", "2023-01-03", "2023-01-04"]);
    }

    #[test]
    fn first_close_pct_row_is_the_not_available_marker() {
        let columns = [Column::Close, Column::ClosePct];
        let hist = normalize_history(CHART, &columns).expect("chart should normalize");

        let mut rows = hist.values();
        let first = rows.next().expect("three rows");
        assert_eq!(first.get("Close%"), Some(&Scalar::NotAvailable));

        // round2(100 * (101.01/100.0 - 1)) over the rounded closes
        let second = rows.next().expect("three rows");
        assert_eq!(second.get("Close%"), Some(&Scalar::Number(1.01)));
        let third = rows.next().expect("three rows");
        assert_eq!(third.get("Close%"), Some(&Scalar::Number(-0.5)));
    }

    #[test]
    fn close_is_rounded_to_two_decimals() {
        let columns = [Column::Close];
        let hist = normalize_history(CHART, &columns).expect("chart should normalize");
        let first = hist.values().next().expect("rows present");
        assert_eq!(first.get("Close"), Some(&Scalar::Number(100.0)));
    }

    #[test]
    fn projection_only_emits_requested_columns() {
        let columns = [Column::Close];
        let hist = normalize_history(CHART, &columns).expect("chart should normalize");
        let first = hist.values().next().expect("rows present");
        assert_eq!(first.len(), 1);
        assert!(first.contains_key("Close"));
    }

    #[test]
    fn missing_short_name_means_the_symbol_does_not_exist() {
        let body = r#"{"quoteSummary": {"result": [{"price": {"shortName": ""}}]}}"#;
        let error = ensure_symbol_exists("NOPE", body).expect_err("empty name must fail");
        assert_eq!(error.kind(), EtlErrorKind::InvalidReference);
        assert!(error.message().contains("NOPE"));

        ensure_symbol_exists("AAPL", META).expect("present name passes");
    }

    #[test]
    fn chart_events_overlay_onto_their_dates_with_zero_default() {
        // Dividend on 2023-01-03, 4:1 split on 2023-01-02.
        let body = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1672669800, 1672756200],
                    "indicators": {
                        "quote": [{
                            "close": [100.0, 101.0],
                            "volume": [50000, 52000]
                        }]
                    },
                    "events": {
                        "dividends": {
                            "1672756200": {"amount": 0.24, "date": 1672756200}
                        },
                        "splits": {
                            "1672669800": {"date": 1672669800, "numerator": 4.0, "denominator": 1.0}
                        }
                    }
                }],
                "error": null
            }
        }"#;
        let columns = [Column::Dividends, Column::StockSplits];
        let hist = normalize_history(body, &columns).expect("chart should normalize");

        let mut rows = hist.iter();
        let (first_date, first) = rows.next().expect("two rows");
        assert_eq!(first_date.as_str(), "2023-01-02");
        assert_eq!(first.get("Dividends"), Some(&Scalar::Number(0.0)));
        assert_eq!(first.get("Stock Splits"), Some(&Scalar::Number(4.0)));

        let (second_date, second) = rows.next().expect("two rows");
        assert_eq!(second_date.as_str(), "2023-01-03");
        assert_eq!(second.get("Dividends"), Some(&Scalar::Number(0.24)));
        assert_eq!(second.get("Stock Splits"), Some(&Scalar::Number(0.0)));
    }

    #[test]
    fn close_less_row_is_kept_with_markers_and_close_pct_pads_over_it() {
        let body = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1672669800, 1672756200, 1672842600],
                    "indicators": {
                        "quote": [{
                            "close": [100.0, null, 102.0],
                            "volume": [50000, null, 48000]
                        }]
                    }
                }],
                "error": null
            }
        }"#;
        let columns = [Column::Close, Column::ClosePct];
        let hist = normalize_history(body, &columns).expect("chart should normalize");

        let mut rows = hist.values();
        rows.next().expect("three rows");
        let gap = rows.next().expect("three rows");
        assert_eq!(gap.get("Close"), Some(&Scalar::NotAvailable));
        assert_eq!(gap.get("Close%"), Some(&Scalar::NotAvailable));

        // The row after the gap derives from the last observed close.
        let after = rows.next().expect("three rows");
        assert_eq!(after.get("Close"), Some(&Scalar::Number(102.0)));
        assert_eq!(after.get("Close%"), Some(&Scalar::Number(2.0)));
    }

    #[test]
    fn empty_chart_is_a_shape_error() {
        let body = r#"{"chart": {"result": [], "error": null}}"#;
        let error =
            normalize_history(body, &[Column::Close]).expect_err("empty result must fail");
        assert_eq!(error.kind(), EtlErrorKind::UpstreamShape);
    }
}
