use crate::constants::ELO_SCALE;
use crate::team::Team;

/// Logistic expectation for a pair of ratings.
///
/// Returns `(expected1, expected2)` where
/// `expected1 = 10^(r1/400) / (10^(r1/400) + 10^(r2/400))` and
/// `expected2 = 1 - expected1`. Evaluated on the rating gap so that large
/// ratings cannot overflow the powers.
pub fn expected_scores(rating1: f64, rating2: f64) -> (f64, f64) {
    let expected1 = 1.0 / (1.0 + 10.0_f64.powf((rating2 - rating1) / ELO_SCALE));
    (expected1, 1.0 - expected1)
}

/// Probability of `team1` beating `team2` given their current ratings.
pub fn calculate_win_prob(team1: &Team, team2: &Team) -> f64 {
    expected_scores(team1.rating, team2.rating).0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::team::TeamId;

    #[test]
    fn test_equal_ratings_50_50() {
        let (e1, e2) = expected_scores(1500.0, 1500.0);
        assert_eq!(e1, 0.5);
        assert_eq!(e2, 0.5);

        let (e1, e2) = expected_scores(1832.7, 1832.7);
        assert_eq!(e1, 0.5);
        assert_eq!(e2, 0.5);
    }

    #[test]
    fn test_matches_power_form() {
        let (r1, r2) = (1520.0_f64, 1480.0_f64);
        let q1 = 10.0_f64.powf(r1 / 400.0);
        let q2 = 10.0_f64.powf(r2 / 400.0);
        let (e1, _) = expected_scores(r1, r2);
        assert!((e1 - q1 / (q1 + q2)).abs() < 1e-12);
        assert!((e1 - 0.5573).abs() < 1e-3);
    }

    #[test]
    fn test_400_points_is_ten_to_one() {
        let (e1, e2) = expected_scores(1900.0, 1500.0);
        assert!((e1 / e2 - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_probability_bounds() {
        let (e1, e2) = expected_scores(300_000.0, -300_000.0);
        assert!((0.0..=1.0).contains(&e1));
        assert!((0.0..=1.0).contains(&e2));
        assert!((e1 + e2 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_symmetric() {
        let strong = Team::new(TeamId(0), "froyotech", Some(1637.9));
        let weak = Team::new(TeamId(1), "Cat Noises", Some(1380.5));

        let p1 = calculate_win_prob(&strong, &weak);
        let p2 = calculate_win_prob(&weak, &strong);

        assert!(p1 > 0.8, "stronger team should be heavily favored");
        assert!((p1 + p2 - 1.0).abs() < 1e-10, "P(A beats B) + P(B beats A) should equal 1");
    }
}
