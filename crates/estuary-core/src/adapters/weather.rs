use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;

use crate::config::SourceConfig;
use crate::domain::{CityBlock, ConditionBlock, Coordinate, Document, WeatherDocument};
use crate::http_client::{HttpClient, HttpRequest};
use crate::pipeline::{BoxFuture, EtlError, Pipeline, WeatherParams};
use crate::source::SourceKind;

const GEO_DIRECT_ENDPOINT: &str = "http://api.openweathermap.org/geo/1.0/direct";
const GEO_REVERSE_ENDPOINT: &str = "http://api.openweathermap.org/geo/1.0/reverse";
const CURRENT_ENDPOINT: &str = "https://api.openweathermap.org/data/2.5/weather";
const FORECAST_ENDPOINT: &str = "https://api.openweathermap.org/data/2.5/forecast";

/// Raw payload of one weather run: the resolved place plus the two condition
/// bodies, parsed during transform.
#[derive(Debug, Clone)]
pub struct WeatherPayload {
    pub city: String,
    pub position: Coordinate,
    pub current: String,
    pub forecast: String,
}

/// Weather adapter with geocoding fallback.
///
/// A city name resolves to a coordinate (first direct match), a bare
/// coordinate resolves to a `"<name>, <country>"` display name; the current
/// and forecast calls then share the resolved coordinate and must run
/// sequentially after it.
#[derive(Clone)]
pub struct WeatherAdapter {
    http_client: Arc<dyn HttpClient>,
    api_key: Option<String>,
    timeout_ms: u64,
}

impl WeatherAdapter {
    pub fn new(config: &SourceConfig, http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            api_key: config.openweather_api_key.clone(),
            timeout_ms: config.timeout_ms,
        }
    }

    fn api_key(&self) -> Result<&str, EtlError> {
        self.api_key.as_deref().ok_or_else(|| {
            EtlError::invalid_parameter(format!(
                "no weather API key configured; set {}",
                crate::config::OPENWEATHER_API_KEY_VAR
            ))
        })
    }

    async fn geocode_city(&self, api_key: &str, city: &str) -> Result<Coordinate, EtlError> {
        let request = HttpRequest::get(GEO_DIRECT_ENDPOINT)
            .with_query("q", city)
            .with_query("limit", "1")
            .with_query("appid", api_key)
            .with_timeout_ms(self.timeout_ms);
        let body = super::fetch_body(&self.http_client, request, self.kind()).await?;

        let matches: Vec<GeoMatch> = serde_json::from_str(&body).map_err(|error| {
            EtlError::upstream_shape(format!("geocoding response is not valid JSON: {error}"))
        })?;
        let first = matches.into_iter().next().ok_or_else(|| {
            EtlError::invalid_reference(format!("city '{city}' could not be geocoded"))
        })?;

        Ok(Coordinate::new(first.lat, first.lon))
    }

    async fn reverse_geocode(
        &self,
        api_key: &str,
        position: Coordinate,
    ) -> Result<String, EtlError> {
        let request = HttpRequest::get(GEO_REVERSE_ENDPOINT)
            .with_query("lat", position.lat.to_string())
            .with_query("lon", position.lon.to_string())
            .with_query("limit", "1")
            .with_query("appid", api_key)
            .with_timeout_ms(self.timeout_ms);
        let body = super::fetch_body(&self.http_client, request, self.kind()).await?;

        let matches: Vec<GeoMatch> = serde_json::from_str(&body).map_err(|error| {
            EtlError::upstream_shape(format!("reverse geocoding response is not valid JSON: {error}"))
        })?;
        let first = matches.into_iter().next().ok_or_else(|| {
            EtlError::invalid_reference(format!(
                "no place found at ({}, {})",
                position.lat, position.lon
            ))
        })?;

        Ok(format!("{}, {}", first.name, first.country))
    }

    async fn fetch_conditions(
        &self,
        api_key: &str,
        endpoint: &str,
        position: Coordinate,
    ) -> Result<String, EtlError> {
        let request = HttpRequest::get(endpoint)
            .with_query("lat", position.lat.to_string())
            .with_query("lon", position.lon.to_string())
            .with_query("units", "metric")
            .with_query("appid", api_key)
            .with_timeout_ms(self.timeout_ms);
        super::fetch_body(&self.http_client, request, self.kind()).await
    }
}

impl Pipeline for WeatherAdapter {
    type Params = WeatherParams;
    type Raw = WeatherPayload;

    fn kind(&self) -> SourceKind {
        SourceKind::Weather
    }

    fn extract<'a>(
        &'a self,
        params: &'a Self::Params,
    ) -> BoxFuture<'a, Result<Self::Raw, EtlError>> {
        Box::pin(async move {
            let api_key = self.api_key()?;

            let (position, city) = match (params.position, params.city.as_deref()) {
                (Some(position), _) => {
                    (position, self.reverse_geocode(api_key, position).await?)
                }
                (None, Some(city)) => (self.geocode_city(api_key, city).await?, city.to_owned()),
                (None, None) => {
                    // WeatherParams::new rejects this combination up front.
                    return Err(EtlError::invalid_parameter(
                        "weather request needs a city name or a coordinate pair",
                    ));
                }
            };

            let current = self
                .fetch_conditions(api_key, CURRENT_ENDPOINT, position)
                .await?;
            let forecast = self
                .fetch_conditions(api_key, FORECAST_ENDPOINT, position)
                .await?;

            Ok(WeatherPayload {
                city,
                position,
                current,
                forecast,
            })
        })
    }

    fn transform(&self, raw: Self::Raw, _params: &Self::Params) -> Result<Document, EtlError> {
        normalize_weather(raw)
    }
}

/// Split the raw payload into the four-block weather document.
fn normalize_weather(raw: WeatherPayload) -> Result<Document, EtlError> {
    let current: ConditionsResponse = serde_json::from_str(&raw.current).map_err(|error| {
        EtlError::upstream_shape(format!("current conditions do not match expected shape: {error}"))
    })?;
    let forecast: ForecastResponse = serde_json::from_str(&raw.forecast).map_err(|error| {
        EtlError::upstream_shape(format!("forecast does not match expected shape: {error}"))
    })?;

    let mut steps = BTreeMap::new();
    for entry in forecast.list {
        steps.insert(entry.dt_txt, condition_block(entry.main, entry.weather, entry.wind)?);
    }

    Ok(Document::Weather(WeatherDocument {
        city: CityBlock { city: raw.city },
        position: raw.position,
        current: condition_block(current.main, current.weather, current.wind)?,
        forecast: steps,
    }))
}

fn condition_block(
    main: MainReading,
    weather: Vec<WeatherCondition>,
    wind: WindReading,
) -> Result<ConditionBlock, EtlError> {
    let condition = weather
        .into_iter()
        .next()
        .ok_or_else(|| EtlError::upstream_shape("weather reading has no condition entry"))?;
    Ok(ConditionBlock {
        temp: main.temp,
        description: condition.description,
        wind: wind.speed,
    })
}

#[derive(Debug, Clone, Deserialize)]
struct GeoMatch {
    name: String,
    #[serde(default)]
    country: String,
    lat: f64,
    lon: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct ConditionsResponse {
    main: MainReading,
    weather: Vec<WeatherCondition>,
    wind: WindReading,
}

#[derive(Debug, Clone, Deserialize)]
struct ForecastResponse {
    list: Vec<ForecastEntry>,
}

#[derive(Debug, Clone, Deserialize)]
struct ForecastEntry {
    main: MainReading,
    weather: Vec<WeatherCondition>,
    wind: WindReading,
    dt_txt: String,
}

#[derive(Debug, Clone, Deserialize)]
struct MainReading {
    temp: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct WeatherCondition {
    description: String,
}

#[derive(Debug, Clone, Deserialize)]
struct WindReading {
    speed: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::EtlErrorKind;

    const CURRENT: &str = r#"{
        "main": {"temp": 21.4},
        "weather": [{"description": "scattered clouds"}],
        "wind": {"speed": 3.6}
    }"#;

    const FORECAST: &str = r#"{
        "list": [
            {
                "main": {"temp": 20.1},
                "weather": [{"description": "light rain"}],
                "wind": {"speed": 4.0},
                "dt_txt": "2023-06-01 12:00:00"
            },
            {
                "main": {"temp": 18.7},
                "weather": [{"description": "overcast clouds"}],
                "wind": {"speed": 5.2},
                "dt_txt": "2023-06-01 15:00:00"
            }
        ]
    }"#;

    fn payload() -> WeatherPayload {
        WeatherPayload {
            city: String::from("Vienna"),
            position: Coordinate::new(48.2, 16.3),
            current: String::from(CURRENT),
            forecast: String::from(FORECAST),
        }
    }

    #[test]
    fn payload_splits_into_four_blocks() {
        let Document::Weather(document) =
            normalize_weather(payload()).expect("payload should normalize")
        else {
            panic!("weather pipeline must produce a weather document");
        };

        assert_eq!(document.city.city, "Vienna");
        assert_eq!(document.position.lat, 48.2);
        assert_eq!(document.current.temp, 21.4);
        assert_eq!(document.current.description, "scattered clouds");
        assert_eq!(document.current.wind, 3.6);
    }

    #[test]
    fn forecast_steps_are_keyed_by_provider_timestamp_in_order() {
        let Document::Weather(document) =
            normalize_weather(payload()).expect("payload should normalize")
        else {
            panic!("weather pipeline must produce a weather document");
        };

        let keys: Vec<_> = document.forecast.keys().map(String::as_str).collect();
        assert_eq!(keys, ["2023-06-01 12:00:00", "2023-06-01 15:00:00"]);
        assert_eq!(document.forecast["2023-06-01 15:00:00"].temp, 18.7);
    }

    #[test]
    fn reading_without_condition_entry_is_a_shape_error() {
        let mut raw = payload();
        raw.current = String::from(r#"{"main": {"temp": 1.0}, "weather": [], "wind": {"speed": 1.0}}"#);

        let error = normalize_weather(raw).expect_err("empty condition list must fail");
        assert_eq!(error.kind(), EtlErrorKind::UpstreamShape);
    }

    #[test]
    fn malformed_forecast_is_a_shape_error() {
        let mut raw = payload();
        raw.forecast = String::from(r#"{"cod": "200"}"#);

        let error = normalize_weather(raw).expect_err("missing list must fail");
        assert_eq!(error.kind(), EtlErrorKind::UpstreamShape);
    }
}
