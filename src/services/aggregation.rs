use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::{
    config::Config,
    db::TravelLinkTable,
    error::{AppError, AppResult},
    models::{CityProfile, RawCollection},
    services::providers::{
        bounded, geoname_with_nearby, Encyclopedia, Geocoder, NominatimGeocoder,
        OpenTripMapClient, PlacesService, SourceResult, WikipediaClient,
    },
};

/// Separator substituted for spaces in image file names
const IMAGE_NAME_SEPARATOR: &str = "_";
const IMAGE_EXTENSION: &str = "jpg";

/// Handles to every city data source, immutable after construction
#[derive(Clone)]
pub struct Sources {
    pub geocoder: Arc<dyn Geocoder>,
    pub encyclopedia: Arc<dyn Encyclopedia>,
    pub places: Arc<dyn PlacesService>,
    pub travel_links: Arc<TravelLinkTable>,
}

impl Sources {
    /// Builds the production sources; fails if the curated table is unreadable
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let travel_links = TravelLinkTable::from_path(&config.travel_links_path)?;

        Ok(Self {
            geocoder: Arc::new(NominatimGeocoder::new(
                config.geocoder_url.clone(),
                config.geocoder_user_agent.clone(),
            )),
            encyclopedia: Arc::new(WikipediaClient::new(config.wikipedia_url.clone())),
            places: Arc::new(OpenTripMapClient::new(
                config.opentripmap_api_key.clone(),
                config.opentripmap_url.clone(),
            )),
            travel_links: Arc::new(travel_links),
        })
    }
}

/// Converts a source outcome into an optional value, logging failures
fn absorb<T>(city: &str, source: &str, what: &str, outcome: SourceResult<T>) -> Option<T> {
    match outcome {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(
                city = %city,
                source = %source,
                error = %e,
                "Failed to fetch {}",
                what
            );
            None
        }
    }
}

/// Gathers city facts from every source and merges them into a profile
#[derive(Clone)]
pub struct ProfileAggregator {
    sources: Sources,
    image_dir: PathBuf,
    source_timeout: Duration,
}

impl ProfileAggregator {
    pub fn new(sources: Sources, image_dir: impl Into<PathBuf>, source_timeout: Duration) -> Self {
        Self {
            sources,
            image_dir: image_dir.into(),
            source_timeout,
        }
    }

    /// Collects and organizes the profile of one city.
    ///
    /// Only a missing curated travel link fails the call; any other source
    /// failure leaves the matching fields empty.
    pub async fn aggregate(&self, city: &str, language: &str) -> AppResult<CityProfile> {
        if self.sources.travel_links.lookup(city).is_none() {
            return Err(AppError::CityNotInCuratedTable(city.to_string()));
        }

        let raw = self.collect(city, language).await;
        self.organize(raw)
    }

    /// Fetches every remote source concurrently without merging
    pub async fn collect(&self, city: &str, language: &str) -> RawCollection {
        tracing::info!(city = %city, language = %language, "Start: item collection");

        let timeout = self.source_timeout;
        let geocoder = self.sources.geocoder.as_ref();
        let encyclopedia = self.sources.encyclopedia.as_ref();
        let places = self.sources.places.as_ref();

        let (location, page, places_report) = tokio::join!(
            bounded(timeout, geocoder.locate(city)),
            bounded(timeout, encyclopedia.lookup(city, language)),
            geoname_with_nearby(places, city, language, timeout),
        );

        let raw = RawCollection {
            city: city.to_string(),
            language: language.to_string(),
            location: absorb(city, geocoder.name(), "geolocation", location),
            page: absorb(city, encyclopedia.name(), "encyclopedia page", page),
            geoname: absorb(city, places.name(), "geoname", places_report.geoname),
            nearby_places: absorb(city, places.name(), "nearby places", places_report.nearby),
            collected_at: Utc::now(),
        };

        tracing::info!(
            city = %city,
            location = raw.location.is_some(),
            page = raw.page.is_some(),
            geoname = raw.geoname.is_some(),
            nearby_places = raw.nearby_places.is_some(),
            "Item collection finished"
        );

        raw
    }

    /// Merges a raw collection into a profile, in fixed field order
    pub fn organize(&self, raw: RawCollection) -> AppResult<CityProfile> {
        let city = raw.city.as_str();
        tracing::info!(city = %city, "Start: data organization");

        let travel_link = self
            .sources
            .travel_links
            .lookup(city)
            .ok_or_else(|| AppError::CityNotInCuratedTable(city.to_string()))?
            .to_string();

        let (city_summary, wiki_url) = match raw.page {
            Some(page) => (Some(page.summary), Some(page.canonical_url)),
            None => (None, None),
        };

        let latitude = raw
            .location
            .as_ref()
            .map(|l| l.latitude)
            .or(raw.geoname.as_ref().map(|g| g.latitude));
        let longitude = raw
            .location
            .as_ref()
            .map(|l| l.longitude)
            .or(raw.geoname.as_ref().map(|g| g.longitude));

        let (population, timezone) = match raw.geoname {
            Some(geoname) => (geoname.population, geoname.timezone),
            None => (None, None),
        };

        let profile = CityProfile {
            city_summary,
            wiki_url,
            latitude,
            longitude,
            population,
            timezone,
            nearby_places: raw.nearby_places,
            travel_link,
            image_path: self.image_path(city),
        };

        tracing::info!(city = %city, "Organized data");
        tracing::debug!(
            city = %city,
            profile = %serde_json::to_string_pretty(&profile).unwrap_or_default(),
            "City profile"
        );

        Ok(profile)
    }

    /// Image location for a city, independent of any source
    pub fn image_path(&self, city: &str) -> String {
        let file_name = format!(
            "{}.{}",
            city.replace(' ', IMAGE_NAME_SEPARATOR),
            IMAGE_EXTENSION
        );
        self.image_dir.join(file_name).display().to_string()
    }
}
