use std::time::Duration;

use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// CSV file holding per-city category scores
    #[serde(default = "default_dataset_path")]
    pub dataset_path: String,

    /// JSON file mapping city name to a trip-planning link
    #[serde(default = "default_travel_links_path")]
    pub travel_links_path: String,

    /// Directory holding one image per city
    #[serde(default = "default_image_dir")]
    pub image_dir: String,

    /// Nominatim base URL
    #[serde(default = "default_geocoder_url")]
    pub geocoder_url: String,

    /// User-Agent sent to Nominatim (required by its usage policy)
    #[serde(default = "default_geocoder_user_agent")]
    pub geocoder_user_agent: String,

    /// Wikipedia base URL, `{lang}` is replaced by the requested language code
    #[serde(default = "default_wikipedia_url")]
    pub wikipedia_url: String,

    /// OpenTripMap API base URL
    #[serde(default = "default_opentripmap_url")]
    pub opentripmap_url: String,

    /// OpenTripMap API key
    pub opentripmap_api_key: String,

    /// Upper bound for each external source during profile aggregation
    #[serde(default = "default_source_timeout_secs")]
    pub source_timeout_secs: u64,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_dataset_path() -> String {
    "city_ranking.csv".to_string()
}

fn default_travel_links_path() -> String {
    "cities_tripadvisor.json".to_string()
}

fn default_image_dir() -> String {
    "cities".to_string()
}

fn default_geocoder_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

fn default_geocoder_user_agent() -> String {
    "destination-unveiler".to_string()
}

fn default_wikipedia_url() -> String {
    "https://{lang}.wikipedia.org".to_string()
}

fn default_opentripmap_url() -> String {
    "https://api.opentripmap.com/0.1".to_string()
}

fn default_source_timeout_secs() -> u64 {
    10
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn source_timeout(&self) -> Duration {
        Duration::from_secs(self.source_timeout_secs)
    }
}
