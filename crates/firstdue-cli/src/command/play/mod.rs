use std::path::PathBuf;

use anyhow::Context as _;
use firstdue_engine::{Mode, QuestionBank, QuizConfig, QuizController, QuizSeed, ZoneFraming};

use crate::{command::play::app::PlayApp, data, tui::Tui, util};

mod app;
mod screen;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    /// Directory holding zones.json, intersections.json, blocks.json and addresses.json
    #[clap(long, default_value = "./data")]
    data_dir: PathBuf,
    /// Quiz configuration file (JSON); missing fields keep their defaults
    #[clap(long)]
    config: Option<PathBuf>,
    /// Seed for question selection, as 32 hex digits
    #[clap(long)]
    seed: Option<QuizSeed>,
    /// Mode to start in
    #[clap(long, value_enum)]
    mode: Option<ModeArg>,
    /// How zone questions frame the map
    #[clap(long, value_enum)]
    zone_framing: Option<ZoneFramingArg>,
    /// Write logs to this file; nothing is logged otherwise
    #[clap(long)]
    log_file: Option<PathBuf>,
}

impl Default for PlayArg {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            config: None,
            seed: None,
            mode: None,
            zone_framing: None,
            log_file: None,
        }
    }
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum ModeArg {
    Explore,
    Zones,
    Intersections,
    Blocks,
    Addresses,
}

impl From<ModeArg> for Mode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Explore => Mode::Explore,
            ModeArg::Zones => Mode::QuizZones,
            ModeArg::Intersections => Mode::QuizIntersections,
            ModeArg::Blocks => Mode::QuizBlocks,
            ModeArg::Addresses => Mode::QuizAddresses,
        }
    }
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum ZoneFramingArg {
    AllZones,
    Target,
}

impl From<ZoneFramingArg> for ZoneFraming {
    fn from(arg: ZoneFramingArg) -> Self {
        match arg {
            ZoneFramingArg::AllZones => ZoneFraming::AllZones,
            ZoneFramingArg::Target => ZoneFraming::Target,
        }
    }
}

fn load_config(arg: &PlayArg) -> anyhow::Result<QuizConfig> {
    let mut config: QuizConfig = match &arg.config {
        Some(path) => util::read_json_file("quiz config", path)?,
        None => QuizConfig::default(),
    };
    if let Some(seed) = arg.seed {
        config.seed = Some(seed);
    }
    if let Some(framing) = arg.zone_framing {
        config.framing.zone_framing = framing.into();
    }
    Ok(config)
}

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    util::init_logging(arg.log_file.as_deref())?;
    let config = load_config(arg)?;

    let datasets = data::spawn_loader(arg.data_dir.clone())
        .context("Failed to start the dataset loader")?;
    let mut controller = QuizController::new(config, QuestionBank::new());
    if let Some(mode) = arg.mode {
        controller.select_mode(mode.into());
    }

    let mut app = PlayApp::new(controller, datasets);
    Tui::new().run(&mut app)?;

    tracing::info!(score = app.score(), "session ended");
    Ok(())
}
