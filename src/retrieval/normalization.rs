//! Score normalization for keyword (BM25) results

use crate::retrieval::SearchResult;

/// Divide every score by the maximum score of the set
///
/// BM25 scores are unbounded; dividing by the maximum maps them onto [0, 1]
/// so they sit on the same scale as similarity scores. When the maximum is
/// not strictly positive the scores are left untouched.
pub fn normalize_by_max(results: &mut [SearchResult]) {
    let Some(max_score) = results
        .iter()
        .map(|r| r.score)
        .reduce(f32::max)
    else {
        return;
    };

    if max_score > 0.0 {
        for result in results.iter_mut() {
            result.score /= max_score;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(scores: &[f32]) -> Vec<SearchResult> {
        scores
            .iter()
            .enumerate()
            .map(|(i, s)| SearchResult::new(format!("d{}", i), 0, *s))
            .collect()
    }

    fn scores(results: &[SearchResult]) -> Vec<f32> {
        results.iter().map(|r| r.score).collect()
    }

    #[test]
    fn test_normalizes_to_unit_max() {
        let mut results = scored(&[12.0, 6.0, 0.0]);
        normalize_by_max(&mut results);
        assert_eq!(scores(&results), vec![1.0, 0.5, 0.0]);
    }

    #[test]
    fn test_scores_stay_within_unit_interval() {
        let mut results = scored(&[3.2, 17.5, 0.4, 9.9]);
        normalize_by_max(&mut results);

        assert!(results.iter().all(|r| (0.0..=1.0).contains(&r.score)));
        let max = results.iter().map(|r| r.score).fold(f32::MIN, f32::max);
        assert_eq!(max, 1.0);
    }

    #[test]
    fn test_non_positive_max_is_left_unscaled() {
        let mut results = scored(&[0.0, -1.5]);
        normalize_by_max(&mut results);
        assert_eq!(scores(&results), vec![0.0, -1.5]);
    }

    #[test]
    fn test_empty_set() {
        let mut results: Vec<SearchResult> = Vec::new();
        normalize_by_max(&mut results);
        assert!(results.is_empty());
    }
}
