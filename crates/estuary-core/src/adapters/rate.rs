use std::collections::BTreeMap;
use std::sync::Arc;

use scraper::{Html, Selector};
use time::Date;

use crate::config::SourceConfig;
use crate::domain::{Document, FieldRecord, IsoDate, Scalar, SeriesDocument};
use crate::http_client::{HttpClient, HttpRequest};
use crate::pipeline::{BoxFuture, EtlError, Pipeline, RateParams};
use crate::source::SourceKind;

const RATE_ENDPOINT: &str = "https://www.mnb.hu/en/jegybanki_alapkamat_alakulasa";

/// Central-bank base-rate adapter scraping the MNB date-range table.
#[derive(Clone)]
pub struct RateAdapter {
    http_client: Arc<dyn HttpClient>,
    timeout_ms: u64,
}

impl RateAdapter {
    pub fn new(config: &SourceConfig, http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            timeout_ms: config.timeout_ms,
        }
    }
}

impl Pipeline for RateAdapter {
    type Params = RateParams;
    type Raw = String;

    fn kind(&self) -> SourceKind {
        SourceKind::Rate
    }

    fn extract<'a>(
        &'a self,
        params: &'a Self::Params,
    ) -> BoxFuture<'a, Result<Self::Raw, EtlError>> {
        Box::pin(async move {
            let request = HttpRequest::get(range_url(params.from_date, params.to_date))
                .with_timeout_ms(self.timeout_ms);
            super::fetch_body(&self.http_client, request, self.kind()).await
        })
    }

    fn transform(&self, raw: Self::Raw, _params: &Self::Params) -> Result<Document, EtlError> {
        normalize_rate_table(&raw)
    }
}

/// Upstream expects `datefrom`/`datetill` as `dd/mm/yyyy`, slash-encoded,
/// day and month zero-padded to two digits.
fn range_url(from_date: Date, to_date: Date) -> String {
    format!(
        "{RATE_ENDPOINT}?datefrom={:02}%2F{:02}%2F{}&datetill={:02}%2F{:02}%2F{}&order=0",
        from_date.day(),
        u8::from(from_date.month()),
        from_date.year(),
        to_date.day(),
        u8::from(to_date.month()),
        to_date.year()
    )
}

/// Parse the first HTML table into an `{info, hist}` document.
///
/// Date labels arrive long-form (`26 January 2023`) and possibly in reverse
/// chronological order; history is reindexed to ascending ISO keys and
/// `info` is the chronologically last row plus its date.
fn normalize_rate_table(html: &str) -> Result<Document, EtlError> {
    let page = Html::parse_document(html);
    let table_selector = Selector::parse("table").expect("static selector is valid");
    let header_selector = Selector::parse("th").expect("static selector is valid");
    let row_selector = Selector::parse("tr").expect("static selector is valid");
    let cell_selector = Selector::parse("td").expect("static selector is valid");

    let table = page
        .select(&table_selector)
        .next()
        .ok_or_else(|| EtlError::upstream_shape("rate page contains no data table"))?;

    let headers: Vec<String> = table
        .select(&header_selector)
        .map(|header| header.text().collect::<String>().trim().to_owned())
        .collect();
    if headers.len() < 2 {
        return Err(EtlError::upstream_shape(
            "rate table header needs a date column and at least one value column",
        ));
    }

    let mut hist: BTreeMap<IsoDate, FieldRecord> = BTreeMap::new();
    for row in table.select(&row_selector) {
        let cells: Vec<String> = row
            .select(&cell_selector)
            .map(|cell| cell.text().collect::<String>().trim().to_owned())
            .collect();
        if cells.is_empty() {
            // header row
            continue;
        }
        if cells.len() != headers.len() {
            return Err(EtlError::upstream_shape(format!(
                "rate table row has {} cells, expected {}",
                cells.len(),
                headers.len()
            )));
        }

        let date = IsoDate::parse_long_form(&cells[0]).map_err(|_| {
            EtlError::upstream_shape(format!("unparseable date label '{}'", cells[0]))
        })?;
        let record: FieldRecord = headers[1..]
            .iter()
            .zip(&cells[1..])
            .map(|(name, cell)| (name.clone(), parse_cell(cell)))
            .collect();
        hist.insert(date, record);
    }

    if hist.is_empty() {
        return Err(EtlError::upstream_shape("rate table contains no data rows"));
    }

    let (latest_date, latest_record) = hist
        .iter()
        .next_back()
        .map(|(date, record)| (date.clone(), record.clone()))
        .expect("history was just checked to be non-empty");
    let mut info = latest_record;
    info.insert(String::from("date"), Scalar::text(latest_date.as_str()));

    Ok(Document::Series(SeriesDocument::new(info, hist)))
}

fn parse_cell(cell: &str) -> Scalar {
    if cell.is_empty() {
        return Scalar::NotAvailable;
    }
    match cell.parse::<f64>() {
        Ok(value) => Scalar::Number(value),
        Err(_) => Scalar::text(cell),
    }
}
