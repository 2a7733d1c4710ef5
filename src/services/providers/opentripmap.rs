/// OpenTripMap places API
///
/// Provides demographics and nearby points of interest for a city.
///
/// API Flow:
/// 1. Geoname: /{lang}/places/geoname?name={city} → population, timezone, lat/lon
/// 2. Radius: /{lang}/places/radius?lat=..&lon=.. → rated places around that point
///
/// The radius query needs the geoname coordinates; see
/// [`geoname_with_nearby`](super::geoname_with_nearby).
use reqwest::Client as HttpClient;
use serde::Deserialize;

use crate::{
    models::Geoname,
    services::providers::{ensure_success, PlacesService, SourceError, SourceResult},
};

const API_ENDPOINT: &str = "places";
const NEARBY_RADIUS_METERS: u32 = 1000;
const NEARBY_LIMIT: u32 = 10;
/// Minimum OpenTripMap popularity rate (1 to 3, 3 being most notable)
const NEARBY_MIN_RATE: u8 = 3;

#[derive(Debug, Deserialize)]
struct ApiGeoname {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
    #[serde(default)]
    population: Option<u64>,
    #[serde(default)]
    timezone: Option<String>,
}

impl TryFrom<ApiGeoname> for Geoname {
    type Error = SourceError;

    fn try_from(api: ApiGeoname) -> SourceResult<Self> {
        if let Some(status) = api.status.as_deref() {
            if status != "OK" {
                return Err(SourceError::Unavailable(format!(
                    "OpenTripMap geoname status {}",
                    status
                )));
            }
        }

        match (api.lat, api.lon) {
            (Some(latitude), Some(longitude)) => Ok(Geoname {
                population: api.population,
                timezone: api.timezone,
                latitude,
                longitude,
            }),
            _ => Err(SourceError::Unavailable(
                "OpenTripMap geoname missing coordinates".to_string(),
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiPlace {
    #[serde(default)]
    name: String,
}

/// Drops unnamed places and repeated names, keeping the API's order
fn distinct_names(places: Vec<ApiPlace>) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(places.len());
    for place in places {
        let name = place.name.trim();
        if !name.is_empty() && !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

#[derive(Clone)]
pub struct OpenTripMapClient {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

impl OpenTripMapClient {
    pub fn new(api_key: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
        }
    }

    fn endpoint(&self, language: &str, method: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.api_url.trim_end_matches('/'),
            language,
            API_ENDPOINT,
            method
        )
    }
}

#[async_trait::async_trait]
impl PlacesService for OpenTripMapClient {
    async fn geoname(&self, city: &str, language: &str) -> SourceResult<Geoname> {
        let response = self
            .http_client
            .get(self.endpoint(language, "geoname"))
            .query(&[("apikey", self.api_key.as_str()), ("name", city)])
            .send()
            .await?;

        let response = ensure_success(response, self.name()).await?;
        let api: ApiGeoname = response.json().await?;
        let geoname = Geoname::try_from(api)?;

        tracing::info!(
            city = %city,
            population = ?geoname.population,
            timezone = ?geoname.timezone,
            provider = "opentripmap",
            "Geoname fetched"
        );

        Ok(geoname)
    }

    async fn nearby(
        &self,
        latitude: f64,
        longitude: f64,
        language: &str,
    ) -> SourceResult<Vec<String>> {
        let response = self
            .http_client
            .get(self.endpoint(language, "radius"))
            .query(&[
                ("apikey", self.api_key.clone()),
                ("radius", NEARBY_RADIUS_METERS.to_string()),
                ("limit", NEARBY_LIMIT.to_string()),
                ("offset", "0".to_string()),
                ("lon", longitude.to_string()),
                ("lat", latitude.to_string()),
                ("rate", NEARBY_MIN_RATE.to_string()),
                ("format", "json".to_string()),
            ])
            .send()
            .await?;

        let response = ensure_success(response, self.name()).await?;
        let places: Vec<ApiPlace> = response.json().await?;
        let names = distinct_names(places);

        tracing::info!(
            latitude,
            longitude,
            places = names.len(),
            provider = "opentripmap",
            "Nearby places fetched"
        );

        Ok(names)
    }

    fn name(&self) -> &'static str {
        "opentripmap"
    }
}
