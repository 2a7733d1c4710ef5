use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

pub mod preferences;

pub use preferences::{PreferenceVector, Residence};

/// One category score of a city, with the rounded value used for comparison
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryScore {
    pub category: String,
    pub score: f64,
    pub rounded: u8,
}

impl CategoryScore {
    pub fn new(category: String, score: f64) -> Self {
        Self {
            category,
            score,
            rounded: round_score(score),
        }
    }
}

/// Rounds half to even, matching how the source dataset tooling rounds
fn round_score(score: f64) -> u8 {
    score.round_ties_even().clamp(0.0, 10.0) as u8
}

/// A city row from the reference dataset
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CityScoreRecord {
    pub name: String,
    pub country: String,
    /// Scores in dataset column order
    pub scores: Vec<CategoryScore>,
    pub total_score: Option<f64>,
}

impl CityScoreRecord {
    pub fn score(&self, category: &str) -> Option<f64> {
        self.find(category).map(|s| s.score)
    }

    pub fn rounded_score(&self, category: &str) -> Option<u8> {
        self.find(category).map(|s| s.rounded)
    }

    /// Label used in residence selection lists
    pub fn location_label(&self) -> String {
        format!("{}, {}", self.name, self.country)
    }

    fn find(&self, category: &str) -> Option<&CategoryScore> {
        self.scores.iter().find(|s| s.category == category)
    }
}

/// Qualitative band for a score over 10
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Poor,
    Average,
    AboveAverage,
    Good,
    Outstanding,
}

impl ScoreBand {
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s < 2.0 => ScoreBand::Poor,
            s if s < 4.0 => ScoreBand::Average,
            s if s < 6.0 => ScoreBand::AboveAverage,
            s if s < 8.0 => ScoreBand::Good,
            _ => ScoreBand::Outstanding,
        }
    }
}

impl Display for ScoreBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ScoreBand::Poor => "Poor",
            ScoreBand::Average => "Average",
            ScoreBand::AboveAverage => "Above Average",
            ScoreBand::Good => "Good",
            ScoreBand::Outstanding => "Outstanding",
        };
        write!(f, "{}", label)
    }
}

/// Where a city sits in the dataset ordering
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Standing {
    TopFive,
    TopTen,
    BottomFive,
}

impl Standing {
    pub fn message(&self) -> &'static str {
        match self {
            Standing::TopFive => {
                "It is actually one of the top 5 cities that has piqued millennials' interests."
            }
            Standing::TopTen => {
                "It is actually one of the top 10 cities that has piqued millennials' interests."
            }
            Standing::BottomFive => {
                "It is actually one of the least 5 cities that has piqued millennials' interests."
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoreBreakdown {
    pub category: String,
    /// Score rounded to one decimal place
    pub score: f64,
    pub band: ScoreBand,
}

/// Dataset-derived summary of a city shown next to its profile
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CityOverview {
    pub city: String,
    pub country: String,
    pub standing: Option<Standing>,
    pub breakdown: Vec<ScoreBreakdown>,
}

// ============================================================================
// External source payloads
// ============================================================================

/// Geocoder result
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Encyclopedia page summary
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PageSummary {
    pub summary: String,
    pub canonical_url: String,
}

/// Demographic record for a named place
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Geoname {
    pub population: Option<u64>,
    pub timezone: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

/// Unmerged output of every remote source for one city
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawCollection {
    pub city: String,
    pub language: String,
    pub location: Option<Location>,
    pub page: Option<PageSummary>,
    pub geoname: Option<Geoname>,
    pub nearby_places: Option<Vec<String>>,
    pub collected_at: DateTime<Utc>,
}

/// Consolidated city profile, fields serialize in merge order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CityProfile {
    pub city_summary: Option<String>,
    pub wiki_url: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub population: Option<u64>,
    pub timezone: Option<String>,
    pub nearby_places: Option<Vec<String>>,
    pub travel_link: String,
    pub image_path: String,
}

/// Ranking winner together with its overview and profile
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub city: String,
    pub overview: CityOverview,
    pub profile: CityProfile,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounding_is_half_to_even() {
        assert_eq!(CategoryScore::new("Tourism".into(), 7.5).rounded, 8);
        assert_eq!(CategoryScore::new("Tourism".into(), 6.5).rounded, 6);
        assert_eq!(CategoryScore::new("Tourism".into(), 6.51).rounded, 7);
        assert_eq!(CategoryScore::new("Tourism".into(), 0.4).rounded, 0);
        assert_eq!(CategoryScore::new("Tourism".into(), 10.0).rounded, 10);
    }

    #[test]
    fn test_score_band_boundaries() {
        assert_eq!(ScoreBand::from_score(0.0), ScoreBand::Poor);
        assert_eq!(ScoreBand::from_score(1.99), ScoreBand::Poor);
        assert_eq!(ScoreBand::from_score(2.0), ScoreBand::Average);
        assert_eq!(ScoreBand::from_score(5.5), ScoreBand::AboveAverage);
        assert_eq!(ScoreBand::from_score(7.9), ScoreBand::Good);
        assert_eq!(ScoreBand::from_score(8.0), ScoreBand::Outstanding);
        assert_eq!(ScoreBand::from_score(10.0), ScoreBand::Outstanding);
        assert_eq!(ScoreBand::AboveAverage.to_string(), "Above Average");
    }

    #[test]
    fn test_city_record_lookups() {
        let record = CityScoreRecord {
            name: "Lisbon".to_string(),
            country: "Portugal".to_string(),
            scores: vec![
                CategoryScore::new("Tourism".to_string(), 8.2),
                CategoryScore::new("Nightlife".to_string(), 5.6),
            ],
            total_score: None,
        };

        assert_eq!(record.score("Tourism"), Some(8.2));
        assert_eq!(record.rounded_score("Nightlife"), Some(6));
        assert_eq!(record.score("tourism"), None);
        assert_eq!(record.location_label(), "Lisbon, Portugal");
    }

    #[test]
    fn test_profile_serializes_fields_in_merge_order() {
        let profile = CityProfile {
            city_summary: None,
            wiki_url: None,
            latitude: None,
            longitude: None,
            population: None,
            timezone: None,
            nearby_places: None,
            travel_link: "https://example.test/lisbon".to_string(),
            image_path: "cities/Lisbon.jpg".to_string(),
        };

        let json = serde_json::to_string(&profile).unwrap();
        let keys = [
            "city_summary",
            "wiki_url",
            "latitude",
            "longitude",
            "population",
            "timezone",
            "nearby_places",
            "travel_link",
            "image_path",
        ];
        let positions: Vec<usize> = keys.iter().map(|k| json.find(k).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }
}
