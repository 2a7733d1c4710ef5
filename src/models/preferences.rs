use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Residence selection meaning "no specific residence"
pub const RESIDENCE_OTHER: &str = "Others";
/// Always-available fallback residence, never excluded from ranking
pub const RESIDENCE_FALLBACK_CITY: &str = "Baltimore";
/// Selection label offered for the fallback residence
pub const RESIDENCE_FALLBACK_LABEL: &str = "Baltimore, United States";

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 10;

/// User-weighted categories, in the order the user picked them
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PreferenceVector {
    categories: Vec<String>,
    ratings: Vec<u8>,
}

impl PreferenceVector {
    /// Creates a preference vector, validating ratings and category uniqueness
    ///
    /// Ratings arrive as wide integers so out-of-range input is reported
    /// here rather than failing deserialization.
    pub fn new(categories: Vec<String>, ratings: Vec<i64>) -> AppResult<Self> {
        if categories.len() != ratings.len() {
            return Err(AppError::InvalidInput(format!(
                "Expected {} ratings, got {}",
                categories.len(),
                ratings.len()
            )));
        }

        let ratings = ratings
            .into_iter()
            .map(|rating| {
                u8::try_from(rating)
                    .ok()
                    .filter(|r| (MIN_RATING..=MAX_RATING).contains(r))
                    .ok_or_else(|| {
                        AppError::InvalidInput(format!(
                            "Rating {} is outside {}..={}",
                            rating, MIN_RATING, MAX_RATING
                        ))
                    })
            })
            .collect::<AppResult<Vec<u8>>>()?;

        for (i, category) in categories.iter().enumerate() {
            if categories[..i].contains(category) {
                return Err(AppError::InvalidInput(format!(
                    "Category selected twice: {}",
                    category
                )));
            }
        }

        Ok(Self {
            categories,
            ratings,
        })
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn ratings(&self) -> &[u8] {
        &self.ratings
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// The user's current city, excluded from the candidate pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Residence {
    /// A sentinel was selected, nothing is excluded
    Unrestricted,
    City(String),
}

impl Residence {
    /// Parses a selection such as `"Lisbon"` or `"Lisbon, Portugal"`.
    ///
    /// Only the part before the first comma names the city; the name is
    /// otherwise used verbatim.
    pub fn from_selection(selection: &str) -> Self {
        let city = selection.split(',').next().unwrap_or(selection);
        if city == RESIDENCE_OTHER || city == RESIDENCE_FALLBACK_CITY {
            Residence::Unrestricted
        } else {
            Residence::City(city.to_string())
        }
    }

    pub fn excludes(&self, city: &str) -> bool {
        matches!(self, Residence::City(name) if name == city)
    }
}
