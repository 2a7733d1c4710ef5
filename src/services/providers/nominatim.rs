/// Nominatim (OpenStreetMap) geocoder
///
/// Uses the `/search` endpoint with `format=json&limit=1` and keeps the top
/// match. Nominatim's usage policy requires an identifying User-Agent.
use reqwest::Client as HttpClient;
use serde::Deserialize;

use crate::{
    models::Location,
    services::providers::{ensure_success, Geocoder, SourceError, SourceResult},
};

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    display_name: String,
    lat: String,
    lon: String,
}

impl TryFrom<NominatimPlace> for Location {
    type Error = SourceError;

    fn try_from(place: NominatimPlace) -> SourceResult<Self> {
        let parse = |value: &str, field: &str| {
            value.parse::<f64>().map_err(|_| {
                SourceError::Unavailable(format!("Nominatim returned invalid {}: {}", field, value))
            })
        };

        Ok(Location {
            latitude: parse(&place.lat, "latitude")?,
            longitude: parse(&place.lon, "longitude")?,
            address: place.display_name,
        })
    }
}

#[derive(Clone)]
pub struct NominatimGeocoder {
    http_client: HttpClient,
    api_url: String,
    user_agent: String,
}

impl NominatimGeocoder {
    pub fn new(api_url: String, user_agent: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_url,
            user_agent,
        }
    }
}

#[async_trait::async_trait]
impl Geocoder for NominatimGeocoder {
    async fn locate(&self, city: &str) -> SourceResult<Location> {
        let url = format!("{}/search", self.api_url.trim_end_matches('/'));
        let response = self
            .http_client
            .get(&url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .query(&[("q", city), ("format", "json"), ("limit", "1")])
            .send()
            .await?;

        let response = ensure_success(response, self.name()).await?;
        let places: Vec<NominatimPlace> = response.json().await?;

        let place = places.into_iter().next().ok_or_else(|| {
            SourceError::Unavailable(format!("Nominatim has no match for {}", city))
        })?;
        let location = Location::try_from(place)?;

        tracing::info!(
            city = %city,
            latitude = location.latitude,
            longitude = location.longitude,
            provider = "nominatim",
            "Geolocation fetched"
        );

        Ok(location)
    }

    fn name(&self) -> &'static str {
        "nominatim"
    }
}
