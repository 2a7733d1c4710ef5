use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use crate::error::{AppError, AppResult};

/// Pre-built mapping of city name to a trip-planning link
///
/// Every dataset city is expected to have an entry; a miss is a hard
/// failure for profile aggregation, not an absent field.
#[derive(Debug, Clone, Default)]
pub struct TravelLinkTable {
    links: HashMap<String, String>,
}

impl TravelLinkTable {
    /// Loads the table from a JSON object file
    pub fn from_path(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| {
            AppError::CuratedTable(format!("cannot open {}: {}", path.display(), e))
        })?;
        let table = Self::from_reader(file)?;

        tracing::info!(
            path = %path.display(),
            entries = table.links.len(),
            "Loaded curated travel-link table"
        );

        Ok(table)
    }

    pub fn from_reader(reader: impl Read) -> AppResult<Self> {
        let links: HashMap<String, String> = serde_json::from_reader(reader)
            .map_err(|e| AppError::CuratedTable(format!("invalid JSON: {}", e)))?;
        Ok(Self { links })
    }

    pub fn lookup(&self, city: &str) -> Option<&str> {
        self.links.get(city).map(String::as_str)
    }
}

impl FromIterator<(String, String)> for TravelLinkTable {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            links: iter.into_iter().collect(),
        }
    }
}
