//! Game logic of the first-due trainer: question bank, grading, map framing
//! and the controller that ties them into a quiz session.
//!
//! Nothing here touches a terminal, a file or a clock. The host feeds in data,
//! user events and elapsed time, and renders what comes back.

pub use self::{
    bank::*, camera::*, config::*, controller::*, geometry::*, grading::*, model::*, question::*,
    timer::*, viewport::*,
};

pub mod bank;
pub mod camera;
pub mod config;
pub mod controller;
pub mod geometry;
pub mod grading;
pub mod model;
pub mod question;
pub mod timer;
pub mod viewport;
