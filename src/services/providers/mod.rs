//! External city data sources
//!
//! Each remote source sits behind its own trait so the aggregation pipeline
//! can run them side by side and swap implementations in tests. Sources
//! make a single attempt per call; failures come back as `SourceError` and
//! are turned into absent profile fields by the pipeline, never raised.
use std::future::Future;
use std::time::Duration;

use crate::models::{Geoname, Location, PageSummary};

pub mod nominatim;
pub mod opentripmap;
pub mod wikipedia;

pub use nominatim::NominatimGeocoder;
pub use opentripmap::OpenTripMapClient;
pub use wikipedia::WikipediaClient;

/// Failure of a single external source
#[derive(thiserror::Error, Debug)]
pub enum SourceError {
    #[error("Source unavailable: {0}")]
    Unavailable(String),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Page not found: {0}")]
    PageNotFound(String),

    #[error("Skipped because {0} failed")]
    DependentFetchSkipped(&'static str),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),
}

pub type SourceResult<T> = Result<T, SourceError>;

/// Turns a non-success response into `SourceError::Unavailable`
pub(crate) async fn ensure_success(
    response: reqwest::Response,
    source: &str,
) -> SourceResult<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(SourceError::Unavailable(format!(
        "{} returned status {}: {}",
        source, status, body
    )))
}

/// Bounds a source call, reporting an elapsed timer as a source failure
pub(crate) async fn bounded<T>(
    timeout: Duration,
    call: impl Future<Output = SourceResult<T>>,
) -> SourceResult<T> {
    tokio::time::timeout(timeout, call)
        .await
        .unwrap_or(Err(SourceError::Timeout(timeout)))
}

/// Resolves a place name to coordinates
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Geocoder: Send + Sync {
    async fn locate(&self, city: &str) -> SourceResult<Location>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Looks up the encyclopedia page for a place
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Encyclopedia: Send + Sync {
    async fn lookup(&self, city: &str, language: &str) -> SourceResult<PageSummary>;

    fn name(&self) -> &'static str;
}

/// Outcome of the two-step geoname then radius query
#[derive(Debug)]
pub struct PlacesReport {
    pub geoname: SourceResult<Geoname>,
    pub nearby: SourceResult<Vec<String>>,
}

/// Demographics and points of interest around a place
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PlacesService: Send + Sync {
    /// Population, timezone and coordinates for a named place
    async fn geoname(&self, city: &str, language: &str) -> SourceResult<Geoname>;

    /// Names of rated places within a fixed radius of a point
    async fn nearby(
        &self,
        latitude: f64,
        longitude: f64,
        language: &str,
    ) -> SourceResult<Vec<String>>;

    fn name(&self) -> &'static str;
}

/// Fetches the geoname once, then queries around its coordinates.
///
/// Each step gets its own `timeout`. The radius query is not attempted
/// when the geoname step fails.
pub async fn geoname_with_nearby(
    places: &dyn PlacesService,
    city: &str,
    language: &str,
    timeout: Duration,
) -> PlacesReport {
    let geoname = bounded(timeout, places.geoname(city, language)).await;
    let nearby = match &geoname {
        Ok(g) => bounded(timeout, places.nearby(g.latitude, g.longitude, language)).await,
        Err(_) => Err(SourceError::DependentFetchSkipped("geoname lookup")),
    };
    PlacesReport { geoname, nearby }
}
