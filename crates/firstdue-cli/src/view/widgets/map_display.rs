use firstdue_engine::{
    Block, Camera, LatLng, MapStyle, Mode, Question, QuizController, ScreenSize, Snapshot,
    Submission, filter_by_street,
};
use ratatui::{
    prelude::{Buffer, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::Span,
    widgets::{
        Block as BlockWidget, BlockExt as _, Widget,
        canvas::{Canvas, Context, Line, Points},
    },
};

use crate::view::widgets::color;

/// Map pixels covered by one terminal cell. Cells are about twice as tall as
/// they are wide.
pub const CELL_PX: (f64, f64) = (8.0, 16.0);

/// Pixel size of a map drawn into `area`.
pub fn screen_size(area: Rect) -> ScreenSize {
    ScreenSize::new(
        f64::from(area.width) * CELL_PX.0,
        f64::from(area.height) * CELL_PX.1,
    )
}

/// Position under the center of the cell at `(column, row)`, for a map drawn
/// into `area`.
pub fn cell_to_point(camera: &Camera, area: Rect, column: u16, row: u16) -> LatLng {
    let x = (f64::from(column.saturating_sub(area.x)) + 0.5) * CELL_PX.0;
    let y = (f64::from(row.saturating_sub(area.y)) + 0.5) * CELL_PX.1;
    camera.unproject_screen(x, y, screen_size(area))
}

/// The map: zone outlines, street segments, answer pins and fire halls, seen
/// through a [`Camera`].
pub struct MapDisplay<'a> {
    controller: &'a QuizController,
    camera: &'a Camera,
    block: Option<BlockWidget<'a>>,
}

impl<'a> MapDisplay<'a> {
    pub fn new(controller: &'a QuizController, camera: &'a Camera) -> Self {
        Self {
            controller,
            camera,
            block: None,
        }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    fn paint(&self, ctx: &mut Context, snapshot: &Snapshot) {
        if snapshot.mode.is_explore() || snapshot.mode.is_quiz_zones() {
            self.paint_zones(ctx, snapshot);
            ctx.layer();
        }
        match snapshot.question {
            Some(Question::Block(target)) => self.paint_street(ctx, snapshot, target),
            Some(question) => paint_pins(ctx, snapshot, question),
            None => {}
        }
        ctx.layer();
        self.paint_stations(ctx, snapshot.show_labels);
    }

    fn paint_zones(&self, ctx: &mut Context, snapshot: &Snapshot) {
        let target = match snapshot.question {
            Some(Question::Zone(zone)) => Some(zone.zone_id()),
            _ => None,
        };
        for zone in self.controller.bank().zones() {
            let color = match snapshot.mode {
                Mode::Explore => color::unit(zone.unit_id()),
                _ if target == Some(zone.zone_id()) => color::CYAN,
                _ => color::DARK_SLATE,
            };
            draw_path(ctx, zone.outline(), color);
            if snapshot.show_labels && snapshot.mode.is_explore() {
                let center = zone.bounds().center();
                ctx.print(
                    center.lng,
                    center.lat,
                    Span::styled(zone.unit_id().to_owned(), Style::new().fg(color)),
                );
            }
        }
    }

    fn paint_street(&self, ctx: &mut Context, snapshot: &Snapshot, target: &Block) {
        let clicked = match snapshot.submission {
            Some(Submission::Block(b)) => Some(b.block),
            _ => None,
        };
        let answered = snapshot.outcome.is_some();
        for segment in filter_by_street(self.controller.bank().blocks(), &target.street) {
            let color = if !answered {
                color::SLATE
            } else if segment.block == target.block {
                color::GREEN
            } else if Some(segment.block) == clicked {
                color::RED
            } else {
                color::DARK_SLATE
            };
            draw_path(ctx, &segment.coordinates, color);
            if answered && let Some(start) = segment.coordinates.first() {
                ctx.print(
                    start.lng,
                    start.lat,
                    Span::styled(segment.block.to_string(), Style::new().fg(color)),
                );
            }
        }
    }

    fn paint_stations(&self, ctx: &mut Context, show_labels: bool) {
        let style = Style::new().fg(color::RED).add_modifier(Modifier::BOLD);
        for station in &self.controller.config().stations {
            let p = station.position;
            let label = if show_labels {
                format!("▲ {}", station.name)
            } else {
                "▲".to_owned()
            };
            ctx.print(p.lng, p.lat, Span::styled(label, style));
        }
    }
}

/// Submitted point, plus the target and a line to it when the answer was
/// not perfect.
fn paint_pins(ctx: &mut Context, snapshot: &Snapshot, question: &Question) {
    let (Some(Submission::Point(guess)), Some(outcome), Some(target)) =
        (snapshot.submission, snapshot.outcome, question.target_point())
    else {
        return;
    };
    if outcome.is_success() {
        draw_pin(ctx, *guess, color::GREEN);
        return;
    }
    ctx.draw(&Line::new(guess.lng, guess.lat, target.lng, target.lat, color::RED));
    draw_pin(ctx, target, color::GREEN);
    draw_pin(ctx, *guess, color::RED);
}

fn draw_pin(ctx: &mut Context, p: LatLng, color: Color) {
    ctx.draw(&Points {
        coords: &[(p.lng, p.lat)],
        color,
    });
    ctx.print(p.lng, p.lat, Span::styled("●", Style::new().fg(color)));
}

fn draw_path(ctx: &mut Context, path: &[LatLng], color: Color) {
    for pair in path.windows(2) {
        ctx.draw(&Line::new(pair[0].lng, pair[0].lat, pair[1].lng, pair[1].lat, color));
    }
}

impl Widget for MapDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);
        if area.is_empty() {
            return;
        }

        let snapshot = self.controller.snapshot();
        let background = match snapshot.map_style {
            MapStyle::Grey => color::GREY_MAP,
            MapStyle::Dark => color::DARK_MAP,
        };
        let bounds = self.camera.visible_bounds(screen_size(area));
        Canvas::default()
            .marker(Marker::Braille)
            .background_color(background)
            .x_bounds([bounds.south_west.lng, bounds.north_east.lng])
            .y_bounds([bounds.south_west.lat, bounds.north_east.lat])
            .paint(|ctx| self.paint(ctx, &snapshot))
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use firstdue_engine::{QuestionBank, QuizConfig};

    use super::*;

    #[test]
    fn test_center_cell_maps_to_camera_center() {
        let camera = Camera::new(LatLng::new(49.28, -122.80), 15.0);
        let area = Rect::new(10, 5, 41, 21);
        let p = cell_to_point(&camera, area, 30, 15);
        assert!((p.lat - 49.28).abs() < 1e-9);
        assert!((p.lng + 122.80).abs() < 1e-9);

        let corner = cell_to_point(&camera, area, 10, 5);
        assert!(corner.lat > p.lat && corner.lng < p.lng);
    }

    #[test]
    fn test_renders_without_data() {
        let controller = QuizController::new(QuizConfig::default(), QuestionBank::new());
        let camera = controller.config().home;
        let area = Rect::new(0, 0, 40, 12);
        let mut buf = Buffer::empty(area);
        MapDisplay::new(&controller, &camera)
            .block(BlockWidget::bordered())
            .render(area, &mut buf);
        assert_eq!(buf.cell((0, 0)).unwrap().symbol(), "┌");
    }
}
