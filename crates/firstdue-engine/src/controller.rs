use std::time::Duration;

use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;
use tracing::{debug, info, warn};

use crate::{
    bank::{Dataset, DatasetKind, DatasetStatus, LoadFailure, QuestionBank},
    config::{MapStyle, QuizConfig, QuizSeed},
    geometry::LatLng,
    grading::{Grade, Outcome},
    model::{Block, Zone},
    question::{Mode, Question, Submission},
    timer::{AdvanceTimer, TimerHandle},
    viewport::Viewport,
};

/// Why a submitted answer was not graded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::IsVariant)]
pub enum SubmitError {
    #[display("no question is being asked")]
    NoQuestion,
    #[display("question already answered")]
    AlreadyAnswered,
    #[display("answer does not fit a {mode} question")]
    Mismatch { mode: Mode },
}

/// Read-only view of the session, taken after every event to render.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<'a> {
    pub mode: Mode,
    pub score: u64,
    pub question: Option<&'a Question>,
    pub outcome: Option<Outcome>,
    pub submission: Option<&'a Submission>,
    pub off_by: Option<u32>,
    pub map_style: MapStyle,
    pub show_labels: bool,
    pub datasets: [(DatasetKind, &'a DatasetStatus); 4],
}

/// Owns a quiz session and is its only mutator.
///
/// The presentation layer turns user gestures into calls on the controller,
/// feeds it elapsed time through [`tick`](Self::tick), renders
/// [`snapshot`](Self::snapshot) and moves the map whenever
/// [`take_viewport`](Self::take_viewport) yields an instruction.
#[derive(Debug, Clone)]
pub struct QuizController {
    config: QuizConfig,
    bank: QuestionBank,
    seed: QuizSeed,
    rng: Pcg32,
    timer: AdvanceTimer,
    mode: Mode,
    question: Option<Question>,
    score: u64,
    grade: Option<Grade>,
    submission: Option<Submission>,
    map_style: MapStyle,
    show_labels: bool,
    viewport: Option<Viewport>,
}

impl QuizController {
    /// Starts a session in explore mode.
    #[must_use]
    pub fn new(config: QuizConfig, bank: QuestionBank) -> Self {
        let seed = config.seed.unwrap_or_else(|| rand::rng().random());
        info!(%seed, "starting quiz session");
        let mode = Mode::Explore;
        Self {
            rng: Pcg32::from_seed(seed.0),
            seed,
            map_style: config.styles.for_mode(mode),
            show_labels: mode.shows_labels(),
            config,
            bank,
            timer: AdvanceTimer::new(),
            mode,
            question: None,
            score: 0,
            grade: None,
            submission: None,
            viewport: None,
        }
    }

    #[must_use]
    pub fn config(&self) -> &QuizConfig {
        &self.config
    }

    #[must_use]
    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    /// Seed the session's random source was created from.
    #[must_use]
    pub fn seed(&self) -> QuizSeed {
        self.seed
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[must_use]
    pub fn score(&self) -> u64 {
        self.score
    }

    #[must_use]
    pub fn question(&self) -> Option<&Question> {
        self.question.as_ref()
    }

    #[must_use]
    pub fn grade(&self) -> Option<&Grade> {
        self.grade.as_ref()
    }

    #[must_use]
    pub fn outcome(&self) -> Option<Outcome> {
        self.grade.map(|g| g.outcome)
    }

    #[must_use]
    pub fn submission(&self) -> Option<&Submission> {
        self.submission.as_ref()
    }

    #[must_use]
    pub fn map_style(&self) -> MapStyle {
        self.map_style
    }

    #[must_use]
    pub fn show_labels(&self) -> bool {
        self.show_labels
    }

    /// Time left before the session moves on by itself.
    #[must_use]
    pub fn pending_advance(&self) -> Option<Duration> {
        self.timer.remaining()
    }

    /// Handle of the outstanding auto-advance.
    #[must_use]
    pub fn pending_advance_handle(&self) -> Option<TimerHandle> {
        self.timer.pending()
    }

    #[must_use]
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            mode: self.mode,
            score: self.score,
            question: self.question.as_ref(),
            outcome: self.outcome(),
            submission: self.submission.as_ref(),
            off_by: self.grade.and_then(|g| g.off_by),
            map_style: self.map_style,
            show_labels: self.show_labels,
            datasets: DatasetKind::ALL.map(|kind| (kind, self.bank.status(kind))),
        }
    }

    /// Latest framing instruction not yet applied to the map.
    pub fn take_viewport(&mut self) -> Option<Viewport> {
        self.viewport.take()
    }

    pub fn select_mode(&mut self, mode: Mode) {
        debug!(%mode, "mode selected");
        self.timer.cancel();
        self.mode = mode;
        self.score = 0;
        self.map_style = self.config.styles.for_mode(mode);
        self.show_labels = mode.shows_labels();
        self.draw_question();
    }

    pub fn submit_zone_choice(&mut self, unit_id: impl Into<String>) -> Result<Grade, SubmitError> {
        self.submit(Submission::Unit(unit_id.into()))
    }

    pub fn submit_map_click(&mut self, point: LatLng) -> Result<Grade, SubmitError> {
        self.submit(Submission::Point(point))
    }

    pub fn submit_block_click(&mut self, block: Block) -> Result<Grade, SubmitError> {
        self.submit(Submission::Block(block))
    }

    /// Moves to the next question once the current one is answered.
    /// Returns whether anything happened.
    pub fn request_next(&mut self) -> bool {
        if self.grade.is_none() {
            debug!("next ignored, current question is not answered");
            return false;
        }
        self.draw_question();
        true
    }

    /// Keyboard shortcut for [`request_next`](Self::request_next).
    pub fn key_advance(&mut self) -> bool {
        if self.mode.is_explore() {
            return false;
        }
        self.request_next()
    }

    /// Runs the auto-advance identified by `handle`, unless it has been
    /// cancelled or replaced in the meantime.
    pub fn advance_timer_fired(&mut self, handle: TimerHandle) -> bool {
        if !self.timer.fire(handle) {
            debug!(?handle, "stale auto-advance ignored");
            return false;
        }
        self.draw_question();
        true
    }

    /// Moves the logical clock forward, running the auto-advance when due.
    pub fn tick(&mut self, elapsed: Duration) {
        if let Some(handle) = self.timer.advance(elapsed) {
            debug!(?handle, "auto-advance");
            self.draw_question();
        }
    }

    /// Accepts the result of loading one collection.
    pub fn receive_dataset(&mut self, result: Result<Dataset, LoadFailure>) {
        let kind = match result {
            Ok(dataset) => {
                let kind = dataset.kind();
                info!(%kind, count = dataset.len(), "dataset loaded");
                self.bank.install(dataset);
                kind
            }
            Err(failure) => {
                warn!(kind = %failure.kind, message = %failure.message, "dataset failed to load");
                self.bank.mark_failed(failure);
                return;
            }
        };
        if self.mode.dataset() == Some(kind) && self.question.is_none() {
            self.draw_question();
        }
    }

    /// Flies to the exact address of an unanswered address question.
    pub fn reveal_address(&mut self) -> bool {
        if self.grade.is_some() {
            return false;
        }
        let Some(viewport) = self
            .question
            .as_ref()
            .and_then(|q| q.reveal_framing(&self.config))
        else {
            return false;
        };
        self.viewport = Some(viewport);
        true
    }

    pub fn toggle_map_style(&mut self) {
        self.map_style = self.map_style.toggled();
    }

    pub fn toggle_labels(&mut self) {
        self.show_labels = !self.show_labels;
    }

    /// Zone under `point`, for browsing the map.
    #[must_use]
    pub fn inspect(&self, point: LatLng) -> Option<&Zone> {
        self.bank.zone_at(point)
    }

    fn submit(&mut self, submission: Submission) -> Result<Grade, SubmitError> {
        let grade = self.grade_submission(&submission).inspect_err(|err| {
            debug!(mode = %self.mode, %err, "submission ignored");
        })?;
        let question = self.question.as_ref().ok_or(SubmitError::NoQuestion)?;

        self.score += u64::from(grade.score_delta);
        if grade.outcome.is_success() {
            let handle = self.timer.schedule(question.advance_delay(&self.config.timing));
            debug!(?handle, "auto-advance scheduled");
        }
        if let Some(viewport) =
            question.feedback_framing(&grade, &submission, &self.bank, &self.config.framing)
        {
            self.viewport = Some(viewport);
        }
        debug!(outcome = %grade.outcome, delta = grade.score_delta, score = self.score, "graded");
        self.grade = Some(grade);
        self.submission = Some(submission);
        Ok(grade)
    }

    fn grade_submission(&self, submission: &Submission) -> Result<Grade, SubmitError> {
        let question = self.question.as_ref().ok_or(SubmitError::NoQuestion)?;
        if self.grade.is_some() {
            return Err(SubmitError::AlreadyAnswered);
        }
        question
            .grade(submission, &self.config.scoring)
            .ok_or(SubmitError::Mismatch { mode: self.mode })
    }

    fn draw_question(&mut self) {
        self.timer.cancel();
        self.grade = None;
        self.submission = None;
        self.question = match Question::draw(self.mode, &self.bank, &mut self.rng) {
            Ok(question) => question,
            Err(err) => {
                debug!(mode = %self.mode, %err, "no question drawn");
                None
            }
        };
        self.viewport = self
            .question
            .as_ref()
            .and_then(|q| q.framing(&self.bank, &self.config.framing, &mut self.rng));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        geometry::{destination, distance_m},
        model::{
            Address, Intersection,
            fixtures::{block, square_zone},
        },
    };

    const TARGET: LatLng = LatLng::new(49.2800, -122.7900);

    fn config() -> QuizConfig {
        QuizConfig {
            seed: Some(QuizSeed::from_bytes([7; 16])),
            ..QuizConfig::default()
        }
    }

    fn zones() -> Dataset {
        Dataset::Zones(vec![square_zone("1", "E2", 49.27, -122.80, 0.02)])
    }

    fn intersections() -> Dataset {
        Dataset::Intersections(vec![Intersection {
            name: "Pinetree Way & Guildford Way".to_owned(),
            lat: TARGET.lat,
            lng: TARGET.lng,
        }])
    }

    fn addresses() -> Dataset {
        Dataset::Addresses(vec![Address {
            address: "3000 Guildford Way".to_owned(),
            lat: TARGET.lat,
            lng: TARGET.lng,
        }])
    }

    fn blocks() -> Dataset {
        Dataset::Blocks(vec![block("Main St", 100, 49.280), block("Main St", 0, 49.281)])
    }

    fn controller(datasets: impl IntoIterator<Item = Dataset>) -> QuizController {
        QuizController::new(config(), QuestionBank::with_datasets(datasets))
    }

    #[test]
    fn test_starts_in_explore() {
        let mut c = controller([zones()]);
        assert!(c.mode().is_explore());
        assert!(c.question().is_none());
        assert_eq!(c.map_style(), MapStyle::Grey);
        assert!(c.submit_zone_choice("E2").unwrap_err().is_no_question());
        assert!(!c.key_advance());
    }

    #[test]
    fn test_zone_correct_scores_and_schedules_advance() {
        let mut c = controller([zones()]);
        c.select_mode(Mode::QuizZones);
        assert!(c.question().unwrap().is_zone());
        assert_eq!(c.map_style(), MapStyle::Dark);
        assert!(c.take_viewport().unwrap().is_fit());

        let grade = c.submit_zone_choice("E2").unwrap();
        assert_eq!(grade.outcome, Outcome::Correct);
        assert_eq!(c.score(), 1);
        assert_eq!(c.pending_advance(), Some(Duration::from_millis(1000)));
    }

    #[test]
    fn test_zone_wrong_keeps_score() {
        let mut c = controller([zones()]);
        c.select_mode(Mode::QuizZones);
        let grade = c.submit_zone_choice("E1").unwrap();
        assert_eq!(grade.outcome, Outcome::Wrong);
        assert_eq!(c.score(), 0);
        assert_eq!(c.pending_advance(), None);
    }

    #[test]
    fn test_duplicate_submissions_are_ignored() {
        let mut c = controller([zones(), intersections()]);
        c.select_mode(Mode::QuizZones);
        c.submit_zone_choice("E2").unwrap();
        let before = c.clone();
        let err = c.submit_zone_choice("E1").unwrap_err();
        assert!(err.is_already_answered());
        assert_eq!(c.snapshot(), before.snapshot());
        assert_eq!(c.pending_advance_handle(), before.pending_advance_handle());
        assert!(c.pending_advance_handle().is_some());
        assert_eq!(c.score(), 1);

        c.select_mode(Mode::QuizIntersections);
        c.submit_map_click(destination(TARGET, 90.0, 200.0)).unwrap();
        let before = c.clone();
        assert!(c.submit_map_click(TARGET).unwrap_err().is_already_answered());
        assert_eq!(c.snapshot(), before.snapshot());
        assert_eq!(c.pending_advance_handle(), before.pending_advance_handle());
        assert_eq!(c.outcome(), Some(Outcome::Okay));
    }

    #[test]
    fn test_intersection_click_forty_meters_away_is_perfect() {
        let mut c = controller([intersections()]);
        c.select_mode(Mode::QuizIntersections);
        assert!(!c.show_labels());
        assert_eq!(c.take_viewport(), None);

        let click = destination(TARGET, 135.0, 40.0);
        let grade = c.submit_map_click(click).unwrap();
        assert_eq!(grade.outcome, Outcome::Perfect);
        assert_eq!(grade.off_by, Some(0));
        assert_eq!(c.score(), 500);
        assert_eq!(c.submission(), Some(&Submission::Point(click)));
        assert_eq!(c.pending_advance(), Some(Duration::from_millis(1000)));
    }

    #[test]
    fn test_address_grading_bands() {
        let mut c = controller([addresses()]);
        c.select_mode(Mode::QuizAddresses);
        let grade = c.submit_map_click(destination(TARGET, 0.0, 100.0)).unwrap();
        assert_eq!(grade.outcome, Outcome::Okay);
        assert_eq!(grade.score_delta, 400);
        assert_eq!(c.snapshot().off_by, Some(100));
        assert_eq!(c.pending_advance(), None);

        c.request_next();
        let grade = c.submit_map_click(destination(TARGET, 0.0, 800.0)).unwrap();
        assert_eq!(grade.outcome, Outcome::Miss);
        assert_eq!(c.score(), 400);
    }

    #[test]
    fn test_wrong_block_reports_difference_and_reframes() {
        let mut c = controller([blocks()]);
        c.select_mode(Mode::QuizBlocks);
        let Some(Question::Block(target)) = c.question() else {
            panic!("expected a block question");
        };
        assert_eq!(target.block, 100);
        assert!(c.take_viewport().is_some());

        let grade = c.submit_block_click(block("Main St", 103, 49.283)).unwrap();
        assert_eq!(grade.outcome, Outcome::Wrong);
        assert_eq!(grade.off_by, Some(3));
        assert_eq!(c.score(), 0);
        assert_eq!(c.pending_advance(), None);
        let Some(Viewport::Fit { max_zoom, .. }) = c.take_viewport() else {
            panic!("expected comparison framing");
        };
        assert_eq!(max_zoom, Some(17.0));
    }

    #[test]
    fn test_right_block_advances_after_delay() {
        let mut c = controller([blocks()]);
        c.select_mode(Mode::QuizBlocks);
        c.take_viewport();
        let grade = c.submit_block_click(block("Main St", 100, 49.280)).unwrap();
        assert_eq!(grade.outcome, Outcome::Perfect);
        assert_eq!(c.score(), 1);
        assert_eq!(c.take_viewport(), None);

        c.tick(Duration::from_millis(1499));
        assert_eq!(c.outcome(), Some(Outcome::Perfect));
        c.tick(Duration::from_millis(1));
        assert_eq!(c.outcome(), None);
        assert!(c.question().is_some());
        assert_eq!(c.score(), 1);
    }

    #[test]
    fn test_manual_next_cancels_auto_advance() {
        let mut c = controller([zones()]);
        c.select_mode(Mode::QuizZones);
        c.submit_zone_choice("E2").unwrap();
        let stale = c.pending_advance_handle().unwrap();

        assert!(c.request_next());
        assert_eq!(c.pending_advance(), None);
        c.submit_zone_choice("E1").unwrap();

        // Nothing may reset the wrong answer behind the user's back.
        c.tick(Duration::from_secs(5));
        assert!(!c.advance_timer_fired(stale));
        assert_eq!(c.outcome(), Some(Outcome::Wrong));
    }

    #[test]
    fn test_mode_switch_cancels_auto_advance() {
        let mut c = controller([zones(), intersections()]);
        c.select_mode(Mode::QuizZones);
        c.submit_zone_choice("E2").unwrap();
        c.select_mode(Mode::QuizIntersections);
        assert_eq!(c.score(), 0);
        assert_eq!(c.pending_advance(), None);

        c.submit_map_click(destination(TARGET, 0.0, 300.0)).unwrap();
        c.tick(Duration::from_secs(5));
        assert_eq!(c.outcome(), Some(Outcome::Okay));
    }

    #[test]
    fn test_timer_handle_fires_once() {
        let mut c = controller([zones()]);
        c.select_mode(Mode::QuizZones);
        c.submit_zone_choice("E2").unwrap();
        let handle = c.pending_advance_handle().unwrap();
        assert!(c.advance_timer_fired(handle));
        assert_eq!(c.outcome(), None);
        assert!(!c.advance_timer_fired(handle));
    }

    #[test]
    fn test_next_requires_an_answer() {
        let mut c = controller([zones()]);
        c.select_mode(Mode::QuizZones);
        assert!(!c.request_next());
        assert!(!c.key_advance());
        c.submit_zone_choice("E1").unwrap();
        assert!(c.key_advance());
        assert_eq!(c.outcome(), None);
    }

    #[test]
    fn test_empty_address_dataset_is_a_noop() {
        let mut c = controller([]);
        c.select_mode(Mode::QuizAddresses);
        assert!(c.mode().is_quiz_addresses());
        assert!(c.question().is_none());
        assert_eq!(c.take_viewport(), None);
        assert!(c.submit_map_click(TARGET).unwrap_err().is_no_question());
        assert!(!c.reveal_address());
    }

    #[test]
    fn test_late_dataset_draws_question() {
        let mut c = controller([]);
        c.select_mode(Mode::QuizAddresses);
        c.receive_dataset(Ok(intersections()));
        assert!(c.question().is_none());

        c.receive_dataset(Ok(addresses()));
        assert!(c.question().unwrap().is_address());
        assert!(c.take_viewport().is_some());
    }

    #[test]
    fn test_failed_dataset_is_reported() {
        let mut c = controller([]);
        c.receive_dataset(Err(LoadFailure {
            kind: DatasetKind::Blocks,
            message: "missing file".to_owned(),
        }));
        c.select_mode(Mode::QuizBlocks);
        let snapshot = c.snapshot();
        assert!(snapshot.question.is_none());
        assert_eq!(
            snapshot.datasets[2],
            (DatasetKind::Blocks, &DatasetStatus::Failed("missing file".to_owned()))
        );
        assert!(snapshot.datasets[0].1.is_pending());
    }

    #[test]
    fn test_address_framing_and_reveal() {
        let mut c = controller([addresses()]);
        c.select_mode(Mode::QuizAddresses);
        let Some(Viewport::Center { center, zoom }) = c.take_viewport() else {
            panic!("expected centered framing");
        };
        let offset = distance_m(center, TARGET);
        assert!((39.9..=150.1).contains(&offset), "offset {offset} m");
        assert!((zoom - 17.0).abs() < f64::EPSILON);

        assert!(c.reveal_address());
        assert_eq!(
            c.take_viewport(),
            Some(Viewport::Center {
                center: TARGET,
                zoom: 20.0
            })
        );

        c.submit_map_click(TARGET).unwrap();
        assert!(!c.reveal_address());
    }

    #[test]
    fn test_display_toggles_reset_on_mode_select() {
        let mut c = controller([zones()]);
        c.toggle_map_style();
        c.toggle_labels();
        assert_eq!(c.map_style(), MapStyle::Dark);
        assert!(!c.show_labels());

        c.select_mode(Mode::Explore);
        assert_eq!(c.map_style(), MapStyle::Grey);
        assert!(c.show_labels());
    }

    #[test]
    fn test_inspect_finds_zone() {
        let c = controller([zones()]);
        assert_eq!(c.inspect(LatLng::new(49.28, -122.79)).unwrap().unit_id(), "E2");
        assert!(c.inspect(LatLng::new(49.0, -122.79)).is_none());
    }

    #[test]
    fn test_same_seed_same_session() {
        let zones = || {
            Dataset::Zones(
                (0..20)
                    .map(|i| square_zone(&i.to_string(), "E1", 49.0 + f64::from(i) * 0.01, -122.8, 0.005))
                    .collect(),
            )
        };
        let mut a = controller([zones()]);
        let mut b = controller([zones()]);
        for _ in 0..10 {
            a.select_mode(Mode::QuizZones);
            b.select_mode(Mode::QuizZones);
            assert_eq!(a.question(), b.question());
        }
        assert_eq!(a.seed(), b.seed());
    }
}
