use thiserror::Error;

use crate::{
    db::Dataset,
    models::{CityScoreRecord, PreferenceVector, Residence},
};

/// Error types for the ranking engine
#[derive(Debug, Error, PartialEq)]
pub enum RankingError {
    #[error("At least one category must be selected")]
    EmptyPreference,
    #[error("Unknown category: {0}")]
    UnknownCategory(String),
    #[error("No candidate cities remain after excluding the residence")]
    NoCandidates,
}

/// Cosine similarity, defined as 0 when either vector has zero norm
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

/// Exact cosine ordering for integer vectors sharing one user vector
///
/// The user norm is common to every candidate, so comparing
/// `dot / |c|` is enough; squaring keeps it in integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Alignment {
    dot: u64,
    norm_sq: u64,
}

impl Alignment {
    fn new(user: &[u8], candidate: &[u8]) -> Self {
        let dot: u64 = user
            .iter()
            .zip(candidate)
            .map(|(&u, &c)| u64::from(u) * u64::from(c))
            .sum();
        let norm_sq: u64 = candidate.iter().map(|&c| u64::from(c) * u64::from(c)).sum();

        // Zero norm scores as similarity 0
        if norm_sq == 0 {
            Self { dot: 0, norm_sq: 1 }
        } else {
            Self { dot, norm_sq }
        }
    }

    /// Strictly more similar than `other`
    fn beats(&self, other: &Self) -> bool {
        let lhs = u128::from(self.dot).pow(2) * u128::from(other.norm_sq);
        let rhs = u128::from(other.dot).pow(2) * u128::from(self.norm_sq);
        lhs > rhs
    }
}

/// Ranks dataset cities against a user's weighted preferences
pub struct Ranker<'a> {
    dataset: &'a Dataset,
}

impl<'a> Ranker<'a> {
    pub fn new(dataset: &'a Dataset) -> Self {
        Self { dataset }
    }

    /// Returns the city most similar to the preferences.
    ///
    /// Ties resolve to the earliest city in dataset order.
    pub fn rank(
        &self,
        preferences: &PreferenceVector,
        residence: &Residence,
    ) -> Result<&'a CityScoreRecord, RankingError> {
        if preferences.is_empty() {
            return Err(RankingError::EmptyPreference);
        }

        if let Some(unknown) = preferences
            .categories()
            .iter()
            .find(|c| !self.dataset.has_category(c))
        {
            return Err(RankingError::UnknownCategory(unknown.clone()));
        }

        let user = preferences.ratings();

        let mut best: Option<(&CityScoreRecord, Alignment)> = None;

        for city in self
            .dataset
            .all_cities()
            .iter()
            .filter(|c| !residence.excludes(&c.name))
        {
            let candidate = Self::sub_vector(city, preferences.categories())?;
            let alignment = Alignment::new(user, &candidate);

            tracing::trace!(
                city = %city.name,
                similarity = cosine_similarity(&as_floats(user), &as_floats(&candidate)),
                "Candidate scored"
            );

            match best {
                Some((_, top)) if !alignment.beats(&top) => {}
                _ => best = Some((city, alignment)),
            }
        }

        let (city, _) = best.ok_or(RankingError::NoCandidates)?;
        let candidate = Self::sub_vector(city, preferences.categories())?;
        let similarity = cosine_similarity(&as_floats(user), &as_floats(&candidate));

        tracing::info!(
            city = %city.name,
            similarity,
            categories = preferences.categories().len(),
            "Ranking completed"
        );

        Ok(city)
    }

    fn sub_vector(
        city: &CityScoreRecord,
        categories: &[String],
    ) -> Result<Vec<u8>, RankingError> {
        categories
            .iter()
            .map(|c| {
                city.rounded_score(c)
                    .ok_or_else(|| RankingError::UnknownCategory(c.clone()))
            })
            .collect()
    }
}

fn as_floats(values: &[u8]) -> Vec<f64> {
    values.iter().map(|&v| f64::from(v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
city,country,Tourism Score,Nightlife Score,Food Ranking
Berlin,Germany,3.0,9.0,5.0
Lisbon,Portugal,8.0,6.0,7.0
Porto,Portugal,6.0,8.0,7.0
Madrid,Spain,8.2,5.9,2.0
";

    fn dataset() -> Dataset {
        Dataset::from_reader(SAMPLE.as_bytes()).unwrap()
    }

    fn prefs(categories: &[&str], ratings: &[i64]) -> PreferenceVector {
        PreferenceVector::new(
            categories.iter().map(|c| c.to_string()).collect(),
            ratings.to_vec(),
        )
        .unwrap()
    }

    #[test]
    fn test_cosine_similarity_basics() {
        assert!((cosine_similarity(&[8.0, 6.0], &[8.0, 6.0]) - 1.0).abs() < 1e-12);
        assert!((cosine_similarity(&[4.0, 3.0], &[8.0, 6.0]) - 1.0).abs() < 1e-12);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[3.0, 4.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn test_perfect_alignment_wins() {
        let dataset = dataset();
        let ranker = Ranker::new(&dataset);
        let city = ranker
            .rank(
                &prefs(&["Tourism", "Nightlife"], &[8, 6]),
                &Residence::from_selection("Others"),
            )
            .unwrap();
        // Lisbon and Madrid both round to (8, 6); Lisbon comes first
        assert_eq!(city.name, "Lisbon");
    }

    #[test]
    fn test_residence_is_excluded() {
        let dataset = dataset();
        let ranker = Ranker::new(&dataset);
        let city = ranker
            .rank(
                &prefs(&["Tourism", "Nightlife"], &[8, 6]),
                &Residence::City("Lisbon".to_string()),
            )
            .unwrap();
        assert_eq!(city.name, "Madrid");
    }

    #[test]
    fn test_two_city_pool_exclusion() {
        let csv = "city,country,Tourism Score,Nightlife Score\n\
                   Lisbon,Portugal,6,8\n\
                   Porto,Portugal,6,8\n";
        let dataset = Dataset::from_reader(csv.as_bytes()).unwrap();
        let ranker = Ranker::new(&dataset);
        let preferences = prefs(&["Tourism", "Nightlife"], &[6, 8]);

        let unrestricted = ranker.rank(&preferences, &Residence::Unrestricted).unwrap();
        assert_eq!(unrestricted.name, "Lisbon");

        let excluded = ranker
            .rank(&preferences, &Residence::from_selection("Lisbon, Portugal"))
            .unwrap();
        assert_eq!(excluded.name, "Porto");
    }

    #[test]
    fn test_fallback_city_sentinel_excludes_nothing() {
        let csv = "city,country,Tourism Score\nBaltimore,United States,9\nPorto,Portugal,2\n";
        let dataset = Dataset::from_reader(csv.as_bytes()).unwrap();
        let ranker = Ranker::new(&dataset);
        let city = ranker
            .rank(
                &prefs(&["Tourism"], &[9]),
                &Residence::from_selection("Baltimore, United States"),
            )
            .unwrap();
        // Single category vectors all have similarity 1; first in order wins
        assert_eq!(city.name, "Baltimore");
    }

    #[test]
    fn test_scale_invariance() {
        let dataset = dataset();
        let ranker = Ranker::new(&dataset);
        let residence = Residence::Unrestricted;
        let base = ranker
            .rank(&prefs(&["Tourism", "Nightlife", "Food"], &[3, 5, 2]), &residence)
            .unwrap();
        let scaled = ranker
            .rank(&prefs(&["Tourism", "Nightlife", "Food"], &[6, 10, 4]), &residence)
            .unwrap();
        assert_eq!(base.name, scaled.name);
    }

    #[test]
    fn test_proportional_candidates_tie_in_dataset_order() {
        let csv = "city,country,Tourism Score,Nightlife Score\n\
                   Seven,A,7,7\n\
                   Three,B,3,3\n";
        let dataset = Dataset::from_reader(csv.as_bytes()).unwrap();
        let ranker = Ranker::new(&dataset);

        for ratings in [[1, 1], [3, 3], [7, 7], [10, 10]] {
            let city = ranker
                .rank(&prefs(&["Tourism", "Nightlife"], &ratings), &Residence::Unrestricted)
                .unwrap();
            assert_eq!(city.name, "Seven", "ratings {:?}", ratings);
        }
    }

    #[test]
    fn test_alignment_orders_like_cosine() {
        let user = [8, 6];
        let exact = Alignment::new(&user, &[4, 3]);
        let close = Alignment::new(&user, &[8, 5]);
        let zero = Alignment::new(&user, &[0, 0]);

        assert!(exact.beats(&close));
        assert!(!close.beats(&exact));
        assert!(!exact.beats(&Alignment::new(&user, &[8, 6])));
        assert!(close.beats(&zero));
        assert!(!zero.beats(&Alignment::new(&user, &[0, 0])));
    }

    #[test]
    fn test_tie_break_is_stable() {
        let dataset = dataset();
        let ranker = Ranker::new(&dataset);
        let preferences = prefs(&["Food"], &[7]);
        let first = ranker.rank(&preferences, &Residence::Unrestricted).unwrap();
        for _ in 0..10 {
            let again = ranker.rank(&preferences, &Residence::Unrestricted).unwrap();
            assert_eq!(again.name, first.name);
        }
        assert_eq!(first.name, "Berlin");
    }

    #[test]
    fn test_category_order_follows_preferences() {
        let dataset = dataset();
        let ranker = Ranker::new(&dataset);
        let city = ranker
            .rank(&prefs(&["Nightlife", "Tourism"], &[9, 3]), &Residence::Unrestricted)
            .unwrap();
        assert_eq!(city.name, "Berlin");
    }

    #[test]
    fn test_empty_preferences_rejected() {
        let dataset = dataset();
        let ranker = Ranker::new(&dataset);
        let result = ranker.rank(&prefs(&[], &[]), &Residence::Unrestricted);
        assert_eq!(result.unwrap_err(), RankingError::EmptyPreference);
    }

    #[test]
    fn test_unknown_category_rejected() {
        let dataset = dataset();
        let ranker = Ranker::new(&dataset);
        let result = ranker.rank(&prefs(&["Tourism", "Beaches"], &[5, 5]), &Residence::Unrestricted);
        assert_eq!(
            result.unwrap_err(),
            RankingError::UnknownCategory("Beaches".to_string())
        );
    }

    #[test]
    fn test_empty_pool_rejected() {
        let csv = "city,country,Tourism Score\nLisbon,Portugal,8\n";
        let dataset = Dataset::from_reader(csv.as_bytes()).unwrap();
        let ranker = Ranker::new(&dataset);
        let result = ranker.rank(&prefs(&["Tourism"], &[8]), &Residence::from_selection("Lisbon"));
        assert_eq!(result.unwrap_err(), RankingError::NoCandidates);
    }
}
