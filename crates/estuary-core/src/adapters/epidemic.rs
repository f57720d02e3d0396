use std::collections::BTreeMap;
use std::sync::Arc;

use scraper::{Html, Selector};

use crate::config::SourceConfig;
use crate::domain::{CounterDocument, Document};
use crate::http_client::{HttpClient, HttpRequest};
use crate::pipeline::{BoxFuture, EpidemicParams, EtlError, Pipeline};
use crate::source::SourceKind;

const EPIDEMIC_ENDPOINT: &str = "https://www.worldometers.info/coronavirus/";

/// Title token of the aggregate page; its presence means no specific country
/// was resolved and the display name falls back to `GLOBAL`.
const GLOBAL_TITLE_TOKEN: &str = "COVID";

/// Epidemic-counter adapter scraping per-country worldometers pages.
///
/// Region codes resolve to page-path tokens through the reference table
/// carried by [`SourceConfig`]; codes absent from the table fail closed.
#[derive(Clone)]
pub struct EpidemicAdapter {
    http_client: Arc<dyn HttpClient>,
    timeout_ms: u64,
    region_pages: BTreeMap<String, String>,
}

impl EpidemicAdapter {
    pub fn new(config: &SourceConfig, http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            timeout_ms: config.timeout_ms,
            region_pages: config.region_pages.clone(),
        }
    }

    fn page_url(&self, params: &EpidemicParams) -> Result<String, EtlError> {
        if params.region.is_global() {
            return Ok(String::from(EPIDEMIC_ENDPOINT));
        }

        let slug = self.region_pages.get(params.region.as_str()).ok_or_else(|| {
            EtlError::invalid_reference(format!(
                "region code '{}' is not in the reference table",
                params.region
            ))
        })?;
        Ok(format!("{EPIDEMIC_ENDPOINT}country/{slug}/"))
    }
}

impl Pipeline for EpidemicAdapter {
    type Params = EpidemicParams;
    type Raw = String;

    fn kind(&self) -> SourceKind {
        SourceKind::Epidemic
    }

    fn extract<'a>(
        &'a self,
        params: &'a Self::Params,
    ) -> BoxFuture<'a, Result<Self::Raw, EtlError>> {
        Box::pin(async move {
            let request = HttpRequest::get(self.page_url(params)?).with_timeout_ms(self.timeout_ms);
            super::fetch_body(&self.http_client, request, self.kind()).await
        })
    }

    fn transform(&self, raw: Self::Raw, _params: &Self::Params) -> Result<Document, EtlError> {
        normalize_counters(&raw)
    }
}

/// Extract the three labeled counters and the page title's country token.
fn normalize_counters(html: &str) -> Result<Document, EtlError> {
    let page = Html::parse_document(html);
    let counter_selector =
        Selector::parse("div.maincounter-number span").expect("static selector is valid");
    let title_selector = Selector::parse("title").expect("static selector is valid");

    let counters: Vec<String> = page
        .select(&counter_selector)
        .map(|span| span.text().collect::<String>().trim().to_owned())
        .collect();
    if counters.len() < 3 {
        return Err(EtlError::upstream_shape(format!(
            "epidemic page has {} counter blocks, expected 3",
            counters.len()
        )));
    }

    let title = page
        .select(&title_selector)
        .next()
        .map(|node| node.text().collect::<String>())
        .ok_or_else(|| EtlError::upstream_shape("epidemic page has no title"))?;
    let token = title
        .split_whitespace()
        .next()
        .ok_or_else(|| EtlError::upstream_shape("epidemic page title is empty"))?;

    let country = if token == GLOBAL_TITLE_TOKEN {
        String::from("GLOBAL")
    } else {
        token.to_owned()
    };

    Ok(Document::Counters(CounterDocument {
        country,
        cases: counters[0].clone(),
        deaths: counters[1].clone(),
        recovered: counters[2].clone(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::EtlErrorKind;

    fn page(title: &str) -> String {
        format!(
            r#"<html><head><title>{title}</title></head><body>
              <div class="maincounter-number"><span>704,753,890 </span></div>
              <div class="maincounter-number"><span>7,010,681</span></div>
              <div class="maincounter-number"><span>675,619,811</span></div>
            </body></html>"#
        )
    }

    #[test]
    fn generic_title_falls_back_to_global() {
        let html = page("COVID Live - Coronavirus Statistics - Worldometer");
        let Document::Counters(counters) =
            normalize_counters(&html).expect("page should normalize")
        else {
            panic!("epidemic pipeline must produce a counter document");
        };

        assert_eq!(counters.country, "GLOBAL");
        assert_eq!(counters.cases, "704,753,890");
        assert_eq!(counters.deaths, "7,010,681");
        assert_eq!(counters.recovered, "675,619,811");
    }

    #[test]
    fn country_title_token_is_kept() {
        let html = page("France COVID - Coronavirus Statistics - Worldometer");
        let Document::Counters(counters) =
            normalize_counters(&html).expect("page should normalize")
        else {
            panic!("epidemic pipeline must produce a counter document");
        };
        assert_eq!(counters.country, "France");
    }

    #[test]
    fn missing_counters_are_a_shape_error() {
        let error = normalize_counters("<html><head><title>France</title></head></html>")
            .expect_err("page without counters must fail");
        assert_eq!(error.kind(), EtlErrorKind::UpstreamShape);
    }

    #[test]
    fn unknown_region_fails_closed_before_any_call() {
        let config = SourceConfig::from_env();
        let adapter = EpidemicAdapter::new(&config, Arc::new(crate::http_client::ReqwestHttpClient::new()));
        let params = EpidemicParams::new("ZZ").expect("syntactically valid code");

        let error = adapter.page_url(&params).expect_err("unknown code must fail");
        assert_eq!(error.kind(), EtlErrorKind::InvalidReference);
    }

    #[test]
    fn known_region_maps_to_country_page() {
        let config = SourceConfig::from_env();
        let adapter = EpidemicAdapter::new(&config, Arc::new(crate::http_client::ReqwestHttpClient::new()));

        let url = adapter
            .page_url(&EpidemicParams::new("HU").expect("valid code"))
            .expect("known code resolves");
        assert_eq!(url, "https://www.worldometers.info/coronavirus/country/hungary/");

        let url = adapter
            .page_url(&EpidemicParams::new("GLOBAL").expect("valid code"))
            .expect("global resolves");
        assert_eq!(url, "https://www.worldometers.info/coronavirus/");
    }

    #[test]
    fn substituted_region_table_overrides_the_bundled_one() {
        let mut table = BTreeMap::new();
        table.insert(String::from("XK"), String::from("kosovo"));
        let config = SourceConfig::from_env().with_region_pages(table);
        let adapter =
            EpidemicAdapter::new(&config, Arc::new(crate::http_client::ReqwestHttpClient::new()));

        let url = adapter
            .page_url(&EpidemicParams::new("XK").expect("valid code"))
            .expect("substituted code resolves");
        assert_eq!(url, "https://www.worldometers.info/coronavirus/country/kosovo/");

        let error = adapter
            .page_url(&EpidemicParams::new("HU").expect("valid code"))
            .expect_err("bundled entries are gone after substitution");
        assert_eq!(error.kind(), EtlErrorKind::InvalidReference);
    }
}
