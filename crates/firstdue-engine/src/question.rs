use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    bank::{DatasetKind, EmptyDatasetError, QuestionBank, filter_valid_blocks, pick_random},
    config::{FramingConfig, QuizConfig, ScoringConfig, TimingConfig},
    geometry::LatLng,
    grading::{self, Grade, Outcome},
    model::{Address, Block, Intersection, Zone},
    viewport::{self, Viewport},
};

/// What the session is currently doing.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::IsVariant,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Mode {
    /// Free browsing, nothing is asked or scored.
    #[default]
    #[display("EXPLORE")]
    Explore,
    #[display("ZONES")]
    QuizZones,
    #[display("INTXN")]
    QuizIntersections,
    #[display("BLOCKS")]
    QuizBlocks,
    #[display("ADDRESS")]
    QuizAddresses,
}

impl Mode {
    pub const ALL: [Self; 5] = [
        Self::Explore,
        Self::QuizZones,
        Self::QuizIntersections,
        Self::QuizBlocks,
        Self::QuizAddresses,
    ];

    /// Collection questions of this mode are drawn from.
    #[must_use]
    pub fn dataset(self) -> Option<DatasetKind> {
        match self {
            Self::Explore => None,
            Self::QuizZones => Some(DatasetKind::Zones),
            Self::QuizIntersections => Some(DatasetKind::Intersections),
            Self::QuizBlocks => Some(DatasetKind::Blocks),
            Self::QuizAddresses => Some(DatasetKind::Addresses),
        }
    }

    /// Mode after `self` in menu order, wrapping around.
    #[must_use]
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// Mode before `self` in menu order, wrapping around.
    #[must_use]
    pub fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|m| *m == self).unwrap_or(0)
    }

    /// Whether labels are shown right after selecting this mode. Intersection
    /// questions hide them since street labels give the answer away.
    #[must_use]
    pub fn shows_labels(self) -> bool {
        !self.is_quiz_intersections()
    }
}

/// An answer as submitted by the user.
#[derive(Debug, Clone, PartialEq, derive_more::IsVariant)]
pub enum Submission {
    /// A unit picked from the answer list (zone questions).
    Unit(String),
    /// A clicked map position (intersection and address questions).
    Point(LatLng),
    /// A clicked street segment (block questions).
    Block(Block),
}

/// The question being asked, with the record it was drawn from.
///
/// Each variant knows how to grade an answer, how the map should frame it,
/// and how long to wait before moving on after a success.
#[derive(Debug, Clone, PartialEq, derive_more::IsVariant)]
pub enum Question {
    Zone(Zone),
    Intersection(Intersection),
    Block(Block),
    Address(Address),
}

impl Question {
    /// Draws a random question for `mode`. Explore mode has no questions.
    pub fn draw<R>(
        mode: Mode,
        bank: &QuestionBank,
        rng: &mut R,
    ) -> Result<Option<Self>, EmptyDatasetError>
    where
        R: Rng + ?Sized,
    {
        let question = match mode {
            Mode::Explore => return Ok(None),
            Mode::QuizZones => Self::Zone(pick_random(DatasetKind::Zones, bank.zones(), rng)?.clone()),
            Mode::QuizIntersections => Self::Intersection(
                pick_random(DatasetKind::Intersections, bank.intersections(), rng)?.clone(),
            ),
            Mode::QuizBlocks => {
                let valid = filter_valid_blocks(bank.blocks());
                Self::Block((*pick_random(DatasetKind::Blocks, &valid, rng)?).clone())
            }
            Mode::QuizAddresses => {
                Self::Address(pick_random(DatasetKind::Addresses, bank.addresses(), rng)?.clone())
            }
        };
        Ok(Some(question))
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        match self {
            Self::Zone(_) => Mode::QuizZones,
            Self::Intersection(_) => Mode::QuizIntersections,
            Self::Block(_) => Mode::QuizBlocks,
            Self::Address(_) => Mode::QuizAddresses,
        }
    }

    /// Position to click for point questions.
    #[must_use]
    pub fn target_point(&self) -> Option<LatLng> {
        match self {
            Self::Intersection(i) => Some(i.position()),
            Self::Address(a) => Some(a.position()),
            Self::Zone(_) | Self::Block(_) => None,
        }
    }

    /// Grades `submission`, or returns `None` when it is not the kind of
    /// answer this question takes.
    #[must_use]
    pub fn grade(&self, submission: &Submission, scoring: &ScoringConfig) -> Option<Grade> {
        let grade = match (self, submission) {
            (Self::Zone(zone), Submission::Unit(unit)) => {
                grading::grade_zone(unit, zone.unit_id(), scoring.zone_points)
            }
            (Self::Intersection(target), Submission::Point(p)) => grading::grade_point(
                *p,
                target.position(),
                scoring.intersection_tolerance_m,
                scoring.point_horizon_m,
            ),
            (Self::Address(target), Submission::Point(p)) => grading::grade_point(
                *p,
                target.position(),
                scoring.address_tolerance_m,
                scoring.point_horizon_m,
            ),
            (Self::Block(target), Submission::Block(clicked)) => {
                grading::grade_block(clicked.block, target.block, scoring.block_points)
            }
            _ => return None,
        };
        Some(grade)
    }

    /// Delay before auto-advancing after a successful answer.
    #[must_use]
    pub fn advance_delay(&self, timing: &TimingConfig) -> Duration {
        match self {
            Self::Zone(_) => timing.zone_advance(),
            Self::Intersection(_) | Self::Address(_) => timing.point_advance(),
            Self::Block(_) => timing.block_advance(),
        }
    }

    /// Framing shown while the question is open.
    pub fn framing<R>(&self, bank: &QuestionBank, config: &FramingConfig, rng: &mut R) -> Option<Viewport>
    where
        R: Rng + ?Sized,
    {
        match self {
            Self::Zone(zone) => Some(viewport::frame_zone(zone, bank.zones(), config)),
            Self::Intersection(_) => None,
            Self::Block(block) => viewport::frame_street(block, bank.blocks(), config),
            Self::Address(address) => Some(viewport::frame_address(address.position(), config, rng)),
        }
    }

    /// Framing shown once the answer is graded. Only a wrong block answer
    /// re-frames, to put the two segments side by side.
    #[must_use]
    pub fn feedback_framing(
        &self,
        grade: &Grade,
        submission: &Submission,
        bank: &QuestionBank,
        config: &FramingConfig,
    ) -> Option<Viewport> {
        let (Self::Block(target), Submission::Block(clicked), Outcome::Wrong) =
            (self, submission, grade.outcome)
        else {
            return None;
        };
        let target = bank.find_block(&target.street, target.block).unwrap_or(target);
        viewport::frame_block_comparison(clicked, target, config)
    }

    /// Close-up framing for address questions.
    #[must_use]
    pub fn reveal_framing(&self, config: &QuizConfig) -> Option<Viewport> {
        match self {
            Self::Address(address) => Some(viewport::reveal_address(address.position(), &config.framing)),
            _ => None,
        }
    }
}
