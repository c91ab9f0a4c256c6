//! Answer grading.
//!
//! One pure function per question type. None of them can fail: a malformed
//! or missing question is the controller's problem, not the grader's.
//!
//! | Question     | Outcomes           | Score                               |
//! |--------------|--------------------|-------------------------------------|
//! | zone         | CORRECT / WRONG    | `zone_points` or 0                  |
//! | intersection | PERFECT/OKAY/MISS  | `max(0, horizon - clamped_distance)`|
//! | address      | PERFECT/OKAY/MISS  | same, tighter tolerance band        |
//! | block        | PERFECT / WRONG    | `block_points` or 0                 |

use crate::geometry::{self, LatLng};

/// Result category of a graded answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::IsVariant)]
pub enum Outcome {
    #[display("CORRECT")]
    Correct,
    #[display("WRONG")]
    Wrong,
    #[display("PERFECT")]
    Perfect,
    #[display("OKAY")]
    Okay,
    #[display("MISS")]
    Miss,
}

impl Outcome {
    /// Whether the answer was fully right, which is what triggers auto-advance.
    #[must_use]
    pub fn is_success(self) -> bool {
        matches!(self, Self::Correct | Self::Perfect)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grade {
    pub outcome: Outcome,
    pub score_delta: u32,
    /// Meters off for point answers (after tolerance clamping), blocks off
    /// for block answers, `None` for zone answers.
    pub off_by: Option<u32>,
}

/// Grades a unit pick against the unit that owns the zone.
#[must_use]
pub fn grade_zone(selected_unit: &str, target_unit: &str, points: u32) -> Grade {
    if selected_unit == target_unit {
        Grade {
            outcome: Outcome::Correct,
            score_delta: points,
            off_by: None,
        }
    } else {
        Grade {
            outcome: Outcome::Wrong,
            score_delta: 0,
            off_by: None,
        }
    }
}

/// Grades a map click against a point target.
///
/// The distance is rounded to whole meters, and anything within
/// `tolerance_m` counts as a direct hit.
#[must_use]
pub fn grade_point(submitted: LatLng, target: LatLng, tolerance_m: u32, horizon_m: u32) -> Grade {
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let mut distance = geometry::distance_m(submitted, target).round() as u32;
    if distance <= tolerance_m {
        distance = 0;
    }
    let score_delta = horizon_m.saturating_sub(distance);
    let outcome = if distance == 0 {
        Outcome::Perfect
    } else if score_delta > 0 {
        Outcome::Okay
    } else {
        Outcome::Miss
    };
    Grade {
        outcome,
        score_delta,
        off_by: Some(distance),
    }
}

/// Grades a clicked block number against the asked one.
///
/// Binary: only the exact block scores. The difference is kept so the
/// presentation can say how many blocks off the answer was.
#[must_use]
pub fn grade_block(clicked: i64, target: i64, points: u32) -> Grade {
    let diff = u32::try_from(clicked.abs_diff(target)).unwrap_or(u32::MAX);
    if diff == 0 {
        Grade {
            outcome: Outcome::Perfect,
            score_delta: points,
            off_by: Some(0),
        }
    } else {
        Grade {
            outcome: Outcome::Wrong,
            score_delta: 0,
            off_by: Some(diff),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::destination;

    const TARGET: LatLng = LatLng::new(49.2800, -122.7900);

    fn at(distance_m: f64) -> LatLng {
        destination(TARGET, 60.0, distance_m)
    }

    #[test]
    fn test_zone_grading() {
        let right = grade_zone("E2", "E2", 1);
        assert_eq!(right.outcome, Outcome::Correct);
        assert_eq!(right.score_delta, 1);

        let wrong = grade_zone("E1", "E2", 1);
        assert_eq!(wrong.outcome, Outcome::Wrong);
        assert_eq!(wrong.score_delta, 0);
        assert_eq!(wrong.off_by, None);
    }

    #[test]
    fn test_intersection_within_tolerance_is_perfect() {
        let grade = grade_point(at(40.0), TARGET, 50, 500);
        assert_eq!(grade.outcome, Outcome::Perfect);
        assert_eq!(grade.off_by, Some(0));
        assert_eq!(grade.score_delta, 500);
    }

    #[test]
    fn test_address_tolerance_band() {
        let grade = grade_point(at(14.0), TARGET, 15, 500);
        assert_eq!(grade.outcome, Outcome::Perfect);
        assert_eq!(grade.score_delta, 500);

        // Outside the 15 m band, but the same click is perfect for an intersection.
        let grade = grade_point(at(40.0), TARGET, 15, 500);
        assert_eq!(grade.outcome, Outcome::Okay);
        assert_eq!(grade.off_by, Some(40));
        assert_eq!(grade.score_delta, 460);
    }

    #[test]
    fn test_tolerance_edge_is_inclusive_after_rounding() {
        for meters in [15.0, 15.4] {
            let grade = grade_point(at(meters), TARGET, 15, 500);
            assert_eq!(grade.outcome, Outcome::Perfect, "{meters} m");
            assert_eq!(grade.off_by, Some(0));
            assert_eq!(grade.score_delta, 500);
        }
        for meters in [15.6, 16.0] {
            let grade = grade_point(at(meters), TARGET, 15, 500);
            assert_eq!(grade.outcome, Outcome::Okay, "{meters} m");
            assert_eq!(grade.off_by, Some(16));
            assert_eq!(grade.score_delta, 484);
        }

        let grade = grade_point(at(50.0), TARGET, 50, 500);
        assert_eq!(grade.outcome, Outcome::Perfect);
        assert_eq!(grade.score_delta, 500);

        let grade = grade_point(at(51.0), TARGET, 50, 500);
        assert_eq!(grade.outcome, Outcome::Okay);
        assert_eq!(grade.off_by, Some(51));
        assert_eq!(grade.score_delta, 449);
    }

    #[test]
    fn test_partial_credit_is_linear() {
        for meters in [60u32, 120, 250, 499] {
            let grade = grade_point(at(f64::from(meters)), TARGET, 50, 500);
            assert_eq!(grade.outcome, Outcome::Okay, "{meters} m");
            assert_eq!(grade.off_by, Some(meters));
            assert_eq!(grade.score_delta, 500 - meters);
        }
    }

    #[test]
    fn test_beyond_horizon_is_miss() {
        for meters in [500.0, 501.0, 2500.0] {
            let grade = grade_point(at(meters), TARGET, 50, 500);
            assert_eq!(grade.outcome, Outcome::Miss, "{meters} m");
            assert_eq!(grade.score_delta, 0);
            assert!(grade.off_by.unwrap() >= 500);
        }
    }

    #[test]
    fn test_block_grading() {
        let grade = grade_block(100, 100, 1);
        assert_eq!(grade.outcome, Outcome::Perfect);
        assert_eq!(grade.score_delta, 1);

        let grade = grade_block(103, 100, 1);
        assert_eq!(grade.outcome, Outcome::Wrong);
        assert_eq!(grade.score_delta, 0);
        assert_eq!(grade.off_by, Some(3));

        let grade = grade_block(97, 100, 1);
        assert_eq!(grade.off_by, Some(3));
    }

    #[test]
    fn test_success_outcomes() {
        assert!(Outcome::Correct.is_success());
        assert!(Outcome::Perfect.is_success());
        assert!(!Outcome::Okay.is_success());
        assert!(!Outcome::Wrong.is_success());
        assert!(!Outcome::Miss.is_success());
    }
}
