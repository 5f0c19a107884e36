use crate::win_prob::expected_scores;

/// Apply one Elo update.
///
/// `outcome1`/`outcome2` are the realized (or simulated) results for each
/// side and must sum to 1. Each rating moves by `k * (outcome - expected)`.
/// Ratings are not clamped.
pub fn update_ratings(
    rating1: f64,
    rating2: f64,
    outcome1: f64,
    outcome2: f64,
    k: f64,
) -> (f64, f64) {
    let (expected1, expected2) = expected_scores(rating1, rating2);
    (
        rating1 + k * (outcome1 - expected1),
        rating2 + k * (outcome2 - expected2),
    )
}
