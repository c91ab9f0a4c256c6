use std::time::Duration;

use firstdue_engine::{DatasetStatus, Mode, Outcome, Question, Snapshot, Submission};
use ratatui::{
    prelude::{Buffer, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block as BlockWidget, BlockExt as _, Paragraph, Widget, Wrap},
};

use crate::view::widgets::{color, style};

/// Side panel: score, the current question, feedback and data status.
pub struct QuestionPanel<'a> {
    snapshot: &'a Snapshot<'a>,
    units: &'a [String],
    inspected: Option<&'a str>,
    pending_advance: Option<Duration>,
    block: Option<BlockWidget<'a>>,
}

impl<'a> QuestionPanel<'a> {
    pub fn new(snapshot: &'a Snapshot<'a>, units: &'a [String]) -> Self {
        Self {
            snapshot,
            units,
            inspected: None,
            pending_advance: None,
            block: None,
        }
    }

    pub fn inspected(self, inspected: Option<&'a str>) -> Self {
        Self { inspected, ..self }
    }

    pub fn pending_advance(self, pending_advance: Option<Duration>) -> Self {
        Self {
            pending_advance,
            ..self
        }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    fn lines(&self) -> Vec<Line<'a>> {
        let snapshot = self.snapshot;
        let mut lines = vec![
            Line::from(vec![
                Span::styled("FIRST DUE ", style::PROMPT),
                Span::styled("TRAINER", style::TITLE),
            ]),
            Line::from(vec![
                Span::styled(snapshot.mode.to_string(), style::ACCENT),
                Span::styled(
                    format!("  {} / {}", snapshot.map_style, labels(snapshot.show_labels)),
                    style::MUTED,
                ),
            ]),
        ];
        if !snapshot.mode.is_explore() {
            lines.push(Line::from(vec![
                Span::styled("SCORE ", style::HEADING),
                Span::styled(snapshot.score.to_string(), style::PROMPT),
            ]));
        }
        lines.push(Line::default());

        match snapshot.question {
            Some(question) => self.push_question(&mut lines, question),
            None if snapshot.mode.is_explore() => {
                lines.push(Line::styled("Click a zone to see its first-due unit.", style::MUTED));
                if let Some(inspected) = self.inspected {
                    lines.push(Line::styled(inspected, style::PROMPT));
                }
            }
            None => lines.push(Line::styled("Waiting for questions...", style::MUTED)),
        }

        lines.push(Line::default());
        for (kind, status) in snapshot.datasets {
            let line = match status {
                DatasetStatus::Pending => Line::styled(format!("{kind}: loading"), style::MUTED),
                DatasetStatus::Loaded(n) => Line::styled(format!("{kind}: {n}"), style::MUTED),
                DatasetStatus::Failed(_) => {
                    Line::styled(format!("could not load {kind}"), style::ERROR)
                }
            };
            lines.push(line);
        }
        lines
    }

    fn push_question(&self, lines: &mut Vec<Line<'a>>, question: &'a Question) {
        let snapshot = self.snapshot;
        match question {
            Question::Zone(zone) => {
                lines.push(Line::styled("FIRST DUE", style::HEADING));
                lines.push(Line::styled(format!("Zone {}", zone.zone_id()), style::PROMPT));
                for (i, unit) in self.units.iter().enumerate() {
                    let revealed = snapshot.outcome == Some(Outcome::Wrong) && unit == zone.unit_id();
                    let marker = if revealed {
                        Span::styled(" <", style::outcome(Outcome::Correct))
                    } else {
                        Span::raw("")
                    };
                    lines.push(Line::from(vec![
                        Span::styled(format!("{} ", i + 1), style::MUTED),
                        Span::styled(unit.as_str(), Style::new().fg(color::unit(unit))),
                        marker,
                    ]));
                }
            }
            Question::Intersection(intersection) => {
                lines.push(Line::styled("LOCATE", style::HEADING));
                lines.push(Line::styled(intersection.name.as_str(), style::PROMPT));
            }
            Question::Block(block) => {
                lines.push(Line::styled("FIND THE BLOCK", style::HEADING));
                lines.push(Line::styled(block.block.to_string(), style::ACCENT));
                lines.push(Line::styled(block.street.as_str(), style::PROMPT));
            }
            Question::Address(address) => {
                lines.push(Line::styled("FIND ADDRESS", style::HEADING));
                lines.push(Line::styled(address.address.as_str(), style::PROMPT));
            }
        }
        lines.push(Line::default());

        let Some(outcome) = snapshot.outcome else {
            lines.push(Line::styled(hint(snapshot.mode), style::MUTED));
            return;
        };
        lines.push(Line::styled(outcome.to_string(), style::outcome(outcome)));
        if let Some(detail) = feedback_detail(snapshot) {
            lines.push(Line::styled(detail, style::DEFAULT));
        }
        match self.pending_advance {
            Some(left) => lines.push(Line::styled(
                format!("next question in {:.1} s", left.as_secs_f64()),
                style::MUTED,
            )),
            None => lines.push(Line::styled("Enter for the next question", style::MUTED)),
        }
    }
}

fn labels(show: bool) -> &'static str {
    if show { "LABELS" } else { "NO LABELS" }
}

fn hint(mode: Mode) -> &'static str {
    match mode {
        Mode::QuizZones => "Pick the unit with its number key.",
        Mode::QuizIntersections => "Click the intersection.",
        Mode::QuizBlocks => "Click the road segment.",
        Mode::QuizAddresses => "Find the house. z zooms to the parcel.",
        Mode::Explore => "",
    }
}

/// How far off a graded answer was, when that is worth saying.
fn feedback_detail(snapshot: &Snapshot) -> Option<String> {
    let off_by = snapshot.off_by.filter(|d| *d > 0)?;
    match snapshot.submission? {
        Submission::Point(_) => Some(format!("off by {off_by} m")),
        Submission::Block(clicked) => Some(format!(
            "picked {}, {off_by} block{} off",
            clicked.block,
            if off_by == 1 { "" } else { "s" }
        )),
        Submission::Unit(_) => None,
    }
}

impl Widget for QuestionPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);
        Paragraph::new(self.lines())
            .wrap(Wrap { trim: true })
            .render(area, buf);
    }
}
