use std::{sync::mpsc::Receiver, time::Duration};

use crossterm::event::Event;
use firstdue_engine::QuizController;
use ratatui::{Frame, layout::Rect};

use crate::{
    command::play::screen::QuizScreen,
    data::LoadResult,
    tui::{App, Tui},
};

const TICK_RATE: f64 = 20.0;
const FRAME_RATE: f64 = 30.0;

#[derive(Debug)]
pub struct PlayApp {
    screen: QuizScreen,
}

impl PlayApp {
    pub fn new(controller: QuizController, datasets: Receiver<LoadResult>) -> Self {
        Self {
            screen: QuizScreen::new(controller, datasets),
        }
    }

    pub fn score(&self) -> u64 {
        self.screen.controller().score()
    }
}

impl App for PlayApp {
    fn init(&mut self, tui: &mut Tui) {
        tui.set_tick_rate(TICK_RATE);
        tui.set_frame_rate(FRAME_RATE);
        let (width, height) = crossterm::terminal::size().unwrap_or((80, 24));
        self.screen.resize(Rect::new(0, 0, width, height));
    }

    fn should_exit(&self) -> bool {
        self.screen.is_exiting()
    }

    fn handle_event(&mut self, _tui: &mut Tui, event: Event) {
        self.screen.handle_event(&event);
    }

    fn draw(&self, frame: &mut Frame) {
        self.screen.draw(frame);
    }

    fn update(&mut self, _tui: &mut Tui, elapsed: Duration) {
        self.screen.update(elapsed);
    }
}
