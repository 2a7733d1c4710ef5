use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use crate::{
    error::{AppError, AppResult},
    models::{
        preferences::{RESIDENCE_FALLBACK_LABEL, RESIDENCE_OTHER},
        CategoryScore, CityOverview, CityScoreRecord, ScoreBand, ScoreBreakdown, Standing,
    },
};

const CITY_COLUMN: &str = "city";
const COUNTRY_COLUMN: &str = "country";
/// Aggregate column, kept on the record but never ranked on
const TOTAL_SCORE_COLUMN: &str = "Total Score";

/// Raw dataset headers and the category labels shown to users
const CATEGORY_LABELS: &[(&str, &str)] = &[
    ("Employment Score", "Employability"),
    ("Startup Score", "Startups"),
    ("Tourism Score", "Tourism"),
    ("Housing Score", "Housing"),
    ("Food Ranking", "Food"),
    ("Transport Score", "Public Transport"),
    ("Health Rank", "Public Health"),
    ("Internet Speed Score", "Internet"),
    ("University Score", "Universities"),
    ("Access to Contraceptive Score", "Contraception"),
    ("Gender Equality Score", "Gender Equality"),
    ("Immigration Tolerence", "Immigration Tolerence"),
    ("Personal Freedom and Choice", "Freedom"),
    ("LGBT friendly Score", "LGBTQ Friendliness"),
    ("Nightlife Score", "Nightlife"),
    ("Beer Ranking", "Beer"),
    ("Festival Ranking", "Festivals"),
];

const MIN_SCORE: f64 = 0.0;
const MAX_SCORE: f64 = 10.0;

fn category_label(header: &str) -> String {
    CATEGORY_LABELS
        .iter()
        .find(|(raw, _)| *raw == header)
        .map(|(_, label)| label.to_string())
        .unwrap_or_else(|| header.to_string())
}

/// Column layout after the city and country columns
enum ScoreColumn {
    Category(String),
    Total,
}

/// Read-only store of per-city category scores
///
/// Cities keep the row order of the backing file; ranking tie-breaks and
/// standings depend on it.
#[derive(Debug, Clone)]
pub struct Dataset {
    categories: Vec<String>,
    cities: Vec<CityScoreRecord>,
    index: HashMap<String, usize>,
}

impl Dataset {
    /// Loads the dataset from a CSV file
    pub fn from_path(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| {
            AppError::DatasetLoad(format!("cannot open {}: {}", path.display(), e))
        })?;
        let dataset = Self::from_reader(file)?;

        tracing::info!(
            path = %path.display(),
            cities = dataset.cities.len(),
            categories = dataset.categories.len(),
            "Loaded reference dataset"
        );

        Ok(dataset)
    }

    /// Parses CSV with a `city,country,<scores>...` header
    pub fn from_reader(reader: impl Read) -> AppResult<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::None)
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|e| AppError::DatasetLoad(format!("unreadable header: {}", e)))?
            .clone();

        if headers.get(0) != Some(CITY_COLUMN) || headers.get(1) != Some(COUNTRY_COLUMN) {
            return Err(AppError::DatasetLoad(format!(
                "header must start with '{}' and '{}'",
                CITY_COLUMN, COUNTRY_COLUMN
            )));
        }

        let columns: Vec<ScoreColumn> = headers
            .iter()
            .skip(2)
            .map(|h| {
                if h == TOTAL_SCORE_COLUMN {
                    ScoreColumn::Total
                } else {
                    ScoreColumn::Category(category_label(h))
                }
            })
            .collect();

        let categories: Vec<String> = columns
            .iter()
            .filter_map(|c| match c {
                ScoreColumn::Category(name) => Some(name.clone()),
                ScoreColumn::Total => None,
            })
            .collect();

        for (i, category) in categories.iter().enumerate() {
            if categories[..i].contains(category) {
                return Err(AppError::DatasetLoad(format!(
                    "duplicate category column: {}",
                    category
                )));
            }
        }

        let mut cities = Vec::new();
        let mut index = HashMap::new();

        for (row, result) in csv_reader.records().enumerate() {
            let line = row + 2;
            let record = result
                .map_err(|e| AppError::DatasetLoad(format!("malformed row {}: {}", line, e)))?;

            let name = record.get(0).unwrap_or_default().to_string();
            let country = record.get(1).unwrap_or_default().to_string();
            if name.is_empty() {
                return Err(AppError::DatasetLoad(format!(
                    "row {} has an empty city name",
                    line
                )));
            }

            let mut scores = Vec::with_capacity(categories.len());
            let mut total_score = None;

            for (column, raw) in columns.iter().zip(record.iter().skip(2)) {
                let value: f64 = raw.trim().parse().map_err(|_| {
                    AppError::DatasetLoad(format!(
                        "row {} ({}): '{}' is not a number",
                        line, name, raw
                    ))
                })?;

                match column {
                    ScoreColumn::Total => total_score = Some(value),
                    ScoreColumn::Category(category) => {
                        if !(MIN_SCORE..=MAX_SCORE).contains(&value) {
                            return Err(AppError::DatasetLoad(format!(
                                "row {} ({}): {} score {} outside {}..={}",
                                line, name, category, value, MIN_SCORE, MAX_SCORE
                            )));
                        }
                        scores.push(CategoryScore::new(category.clone(), value));
                    }
                }
            }

            if index.insert(name.clone(), cities.len()).is_some() {
                return Err(AppError::DatasetLoad(format!(
                    "duplicate city: {}",
                    name
                )));
            }

            cities.push(CityScoreRecord {
                name,
                country,
                scores,
                total_score,
            });
        }

        if cities.is_empty() {
            return Err(AppError::DatasetLoad("dataset has no cities".to_string()));
        }

        Ok(Self {
            categories,
            cities,
            index,
        })
    }

    /// All cities in dataset order
    pub fn all_cities(&self) -> &[CityScoreRecord] {
        &self.cities
    }

    /// Category labels in column order
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }

    pub fn get(&self, city: &str) -> Option<&CityScoreRecord> {
        self.index.get(city).map(|&i| &self.cities[i])
    }

    pub fn score_for(&self, city: &str, category: &str) -> Option<f64> {
        self.get(city).and_then(|r| r.score(category))
    }

    pub fn country_of(&self, city: &str) -> Option<&str> {
        self.get(city).map(|r| r.country.as_str())
    }

    /// Residence choices: "City, Country" sorted by country, then the sentinels
    pub fn residence_options(&self) -> Vec<String> {
        let mut records: Vec<&CityScoreRecord> = self.cities.iter().collect();
        records.sort_by(|a, b| a.country.cmp(&b.country));

        let mut options: Vec<String> = records.iter().map(|r| r.location_label()).collect();
        options.push(RESIDENCE_OTHER.to_string());
        options.push(RESIDENCE_FALLBACK_LABEL.to_string());
        options
    }

    /// Country, standing and per-category breakdown for a city
    pub fn overview(&self, city: &str) -> Option<CityOverview> {
        let position = *self.index.get(city)?;
        let record = &self.cities[position];

        let breakdown = record
            .scores
            .iter()
            .map(|s| ScoreBreakdown {
                category: s.category.clone(),
                score: (s.score * 10.0).round() / 10.0,
                band: ScoreBand::from_score(s.score),
            })
            .collect();

        Some(CityOverview {
            city: record.name.clone(),
            country: record.country.clone(),
            standing: self.standing(position),
            breakdown,
        })
    }

    fn standing(&self, position: usize) -> Option<Standing> {
        if position < 5 {
            Some(Standing::TopFive)
        } else if position < 10 {
            Some(Standing::TopTen)
        } else if position + 5 >= self.cities.len() {
            Some(Standing::BottomFive)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
city,country,Tourism Score,Nightlife Score,Total Score
Lisbon,Portugal,8.2,5.6,100
Porto,Portugal,6.5,7.4,90
Berlin,Germany,7.0,9.5,95
";

    fn sample() -> Dataset {
        Dataset::from_reader(SAMPLE.as_bytes()).unwrap()
    }

    fn numbered(count: usize) -> Dataset {
        let mut csv = String::from("city,country,Tourism Score\n");
        for i in 0..count {
            csv.push_str(&format!("City{},Country{},5\n", i, i % 3));
        }
        Dataset::from_reader(csv.as_bytes()).unwrap()
    }

    #[test]
    fn test_load_maps_category_labels() {
        let dataset = sample();
        assert_eq!(dataset.categories(), &["Tourism", "Nightlife"]);
        assert!(dataset.has_category("Tourism"));
        assert!(!dataset.has_category("Total Score"));
    }

    #[test]
    fn test_load_preserves_row_order_and_rounds() {
        let dataset = sample();
        let names: Vec<&str> = dataset.all_cities().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Lisbon", "Porto", "Berlin"]);

        let lisbon = dataset.get("Lisbon").unwrap();
        assert_eq!(lisbon.rounded_score("Tourism"), Some(8));
        assert_eq!(lisbon.rounded_score("Nightlife"), Some(6));
        assert_eq!(lisbon.total_score, Some(100.0));
        assert_eq!(dataset.get("Porto").unwrap().rounded_score("Tourism"), Some(6));
    }

    #[test]
    fn test_score_and_country_lookups() {
        let dataset = sample();
        assert_eq!(dataset.score_for("Berlin", "Nightlife"), Some(9.5));
        assert_eq!(dataset.score_for("Berlin", "Beer"), None);
        assert_eq!(dataset.score_for("berlin", "Nightlife"), None);
        assert_eq!(dataset.country_of("Porto"), Some("Portugal"));
        assert_eq!(dataset.country_of("Madrid"), None);
    }

    #[test]
    fn test_unknown_headers_keep_raw_name() {
        let csv = "city,country,Sunshine Hours\nLisbon,Portugal,9\n";
        let dataset = Dataset::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(dataset.categories(), &["Sunshine Hours"]);
    }

    #[test]
    fn test_missing_file_is_load_error() {
        let result = Dataset::from_path("/nonexistent/city_ranking.csv");
        assert!(matches!(result, Err(AppError::DatasetLoad(_))));
    }

    #[test]
    fn test_malformed_inputs_rejected() {
        let cases = [
            "name,country,Tourism Score\nLisbon,Portugal,8\n",
            "city,country,Tourism Score\nLisbon,Portugal,high\n",
            "city,country,Tourism Score\nLisbon,Portugal,11\n",
            "city,country,Tourism Score\nLisbon,Portugal,8\nLisbon,Portugal,7\n",
            "city,country,Tourism Score\nLisbon,Portugal\n",
            "city,country,Tourism Score\n",
        ];

        for csv in cases {
            let result = Dataset::from_reader(csv.as_bytes());
            assert!(
                matches!(result, Err(AppError::DatasetLoad(_))),
                "expected load error for {:?}",
                csv
            );
        }
    }

    #[test]
    fn test_residence_options_sorted_by_country_with_sentinels() {
        let dataset = sample();
        assert_eq!(
            dataset.residence_options(),
            vec![
                "Berlin, Germany",
                "Lisbon, Portugal",
                "Porto, Portugal",
                "Others",
                "Baltimore, United States",
            ]
        );
    }

    #[test]
    fn test_overview_breakdown() {
        let overview = sample().overview("Berlin").unwrap();
        assert_eq!(overview.country, "Germany");
        assert_eq!(overview.standing, Some(Standing::TopFive));
        assert_eq!(overview.breakdown.len(), 2);
        assert_eq!(overview.breakdown[1].category, "Nightlife");
        assert_eq!(overview.breakdown[1].score, 9.5);
        assert_eq!(overview.breakdown[1].band, ScoreBand::Outstanding);
        assert!(sample().overview("Madrid").is_none());
    }

    #[test]
    fn test_standing_tiers() {
        let dataset = numbered(20);
        assert_eq!(dataset.overview("City0").unwrap().standing, Some(Standing::TopFive));
        assert_eq!(dataset.overview("City7").unwrap().standing, Some(Standing::TopTen));
        assert_eq!(dataset.overview("City12").unwrap().standing, None);
        assert_eq!(
            dataset.overview("City15").unwrap().standing,
            Some(Standing::BottomFive)
        );
        assert_eq!(
            dataset.overview("City19").unwrap().standing,
            Some(Standing::BottomFive)
        );
    }
}
