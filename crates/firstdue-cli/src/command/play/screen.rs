use std::{
    sync::mpsc::{Receiver, TryRecvError},
    time::Duration,
};

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use firstdue_engine::{Camera, LatLng, Mode, Question, QuizController};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Position, Rect},
    text::Line,
    widgets::Block as BlockWidget,
};

use crate::{
    data::LoadResult,
    view::widgets::{
        KeyBinding, KeyBindingDisplay, MapDisplay, QuestionPanel, cell_to_point, screen_size,
        style,
    },
};

const PANEL_WIDTH: u16 = 38;
const ZOOM_STEP: f64 = 1.0;

const VIEW_BINDINGS: &[KeyBinding<'static>] = &[
    (&["s"], "Style"),
    (&["l"], "Labels"),
    (&["←↑↓→", "+/-", "h"], "Move"),
    (&["q"], "Quit"),
];

#[derive(Debug, Clone, Copy)]
struct ScreenLayout {
    map: Rect,
    panel: Rect,
    help: Rect,
}

impl ScreenLayout {
    fn new(area: Rect) -> Self {
        let [main, help] = Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(area);
        let [map, panel] =
            Layout::horizontal([Constraint::Fill(1), Constraint::Length(PANEL_WIDTH)]).areas(main);
        Self { map, panel, help }
    }

    /// Drawable part of the map, inside its border.
    fn map_inner(&self) -> Rect {
        map_block().inner(self.map)
    }
}

fn map_block() -> BlockWidget<'static> {
    BlockWidget::bordered()
}

/// The quiz: map on the left, question panel on the right, key legend below.
#[derive(Debug)]
pub struct QuizScreen {
    controller: QuizController,
    datasets: Option<Receiver<LoadResult>>,
    camera: Camera,
    layout: ScreenLayout,
    inspected: Option<String>,
    is_exiting: bool,
}

impl QuizScreen {
    pub fn new(controller: QuizController, datasets: Receiver<LoadResult>) -> Self {
        let camera = controller.config().home;
        Self {
            controller,
            datasets: Some(datasets),
            camera,
            layout: ScreenLayout::new(Rect::default()),
            inspected: None,
            is_exiting: false,
        }
    }

    pub fn controller(&self) -> &QuizController {
        &self.controller
    }

    pub fn is_exiting(&self) -> bool {
        self.is_exiting
    }

    pub fn resize(&mut self, area: Rect) {
        self.layout = ScreenLayout::new(area);
        self.sync_camera();
    }

    pub fn handle_event(&mut self, event: &Event) {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(width, height) => self.resize(Rect::new(0, 0, *width, *height)),
            _ => {}
        }
    }

    pub fn update(&mut self, elapsed: Duration) {
        self.drain_datasets();
        self.controller.tick(elapsed);
        self.sync_camera();
    }

    fn drain_datasets(&mut self) {
        let Some(rx) = &self.datasets else {
            return;
        };
        loop {
            match rx.try_recv() {
                Ok(result) => self.controller.receive_dataset(result),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.datasets = None;
                    break;
                }
            }
        }
    }

    fn sync_camera(&mut self) {
        if let Some(viewport) = self.controller.take_viewport() {
            self.camera = Camera::apply(&viewport, screen_size(self.layout.map_inner()));
        }
    }

    fn select_mode(&mut self, mode: Mode) {
        self.inspected = None;
        self.controller.select_mode(mode);
        self.sync_camera();
    }

    fn handle_key(&mut self, key: &KeyEvent) {
        let mode = self.controller.mode();
        match key.code {
            KeyCode::F(n @ 1..=5) => self.select_mode(Mode::ALL[usize::from(n - 1)]),
            KeyCode::Tab => self.select_mode(mode.next()),
            KeyCode::BackTab => self.select_mode(mode.previous()),
            KeyCode::Char(c @ '1'..='9') if mode.is_quiz_zones() => {
                let index = c.to_digit(10).map_or(0, |d| d as usize - 1);
                if let Some(unit) = self.controller.config().units.get(index).cloned() {
                    _ = self.controller.submit_zone_choice(unit);
                }
            }
            KeyCode::Enter | KeyCode::Char('n') => _ = self.controller.key_advance(),
            KeyCode::Char('z') => _ = self.controller.reveal_address(),
            KeyCode::Char('s') => self.controller.toggle_map_style(),
            KeyCode::Char('l') => self.controller.toggle_labels(),
            KeyCode::Char('h') => self.camera = self.controller.config().home,
            KeyCode::Char('+' | '=') => self.camera = self.camera.zoomed(ZOOM_STEP),
            KeyCode::Char('-') => self.camera = self.camera.zoomed(-ZOOM_STEP),
            KeyCode::Left | KeyCode::Right | KeyCode::Up | KeyCode::Down => self.pan(key.code),
            KeyCode::Char('q') | KeyCode::Esc => self.is_exiting = true,
            _ => {}
        }
        self.sync_camera();
    }

    /// Moves the map a quarter of its size.
    fn pan(&mut self, code: KeyCode) {
        let size = screen_size(self.layout.map_inner());
        let (dx, dy) = match code {
            KeyCode::Left => (-size.width / 4.0, 0.0),
            KeyCode::Right => (size.width / 4.0, 0.0),
            KeyCode::Up => (0.0, -size.height / 4.0),
            KeyCode::Down => (0.0, size.height / 4.0),
            _ => return,
        };
        self.camera = self.camera.panned(dx, dy);
    }

    fn handle_mouse(&mut self, mouse: &MouseEvent) {
        let area = self.layout.map_inner();
        if !area.contains(Position::new(mouse.column, mouse.row)) {
            return;
        }
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let point = cell_to_point(&self.camera, area, mouse.column, mouse.row);
                self.click(point);
            }
            MouseEventKind::ScrollUp => self.camera = self.camera.zoomed(ZOOM_STEP),
            MouseEventKind::ScrollDown => self.camera = self.camera.zoomed(-ZOOM_STEP),
            _ => {}
        }
        self.sync_camera();
    }

    fn click(&mut self, point: LatLng) {
        match self.controller.mode() {
            Mode::Explore => {
                self.inspected = self
                    .controller
                    .inspect(point)
                    .map(|zone| format!("Zone {} ({})", zone.zone_id(), zone.unit_id()));
            }
            Mode::QuizIntersections | Mode::QuizAddresses => {
                _ = self.controller.submit_map_click(point);
            }
            Mode::QuizBlocks => {
                let Some(Question::Block(target)) = self.controller.question() else {
                    return;
                };
                let nearest = self
                    .controller
                    .bank()
                    .nearest_on_street(&target.street, point)
                    .cloned();
                if let Some(segment) = nearest {
                    _ = self.controller.submit_block_click(segment);
                }
            }
            Mode::QuizZones => {}
        }
    }

    fn key_bindings(&self) -> Vec<KeyBinding<'static>> {
        let mut bindings: Vec<KeyBinding<'static>> = vec![(&["F1-F5", "Tab"], "Mode")];
        match self.controller.mode() {
            Mode::Explore => bindings.push((&["Click"], "Inspect")),
            Mode::QuizZones => bindings.push((&["1-9"], "Unit")),
            Mode::QuizIntersections | Mode::QuizBlocks => bindings.push((&["Click"], "Answer")),
            Mode::QuizAddresses => {
                bindings.push((&["Click"], "Answer"));
                bindings.push((&["z"], "Reveal"));
            }
        }
        if !self.controller.mode().is_explore() {
            bindings.push((&["Enter", "n"], "Next"));
        }
        bindings.extend_from_slice(VIEW_BINDINGS);
        bindings
    }

    pub fn draw(&self, frame: &mut Frame) {
        let layout = ScreenLayout::new(frame.area());

        frame.render_widget(
            MapDisplay::new(&self.controller, &self.camera).block(map_block()),
            layout.map,
        );

        let snapshot = self.controller.snapshot();
        let panel = QuestionPanel::new(&snapshot, &self.controller.config().units)
            .inspected(self.inspected.as_deref())
            .pending_advance(self.controller.pending_advance())
            .block(BlockWidget::bordered().title(Line::styled(" QUIZ ", style::TITLE)));
        frame.render_widget(panel, layout.panel);

        let bindings = self.key_bindings();
        frame.render_widget(KeyBindingDisplay::new(&bindings), layout.help);
    }
}
