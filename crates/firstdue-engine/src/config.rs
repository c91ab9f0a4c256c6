//! Tunable constants of a quiz session.
//!
//! [`QuizConfig`] is handed to the controller at construction and never
//! changes afterwards. It deserializes from JSON; any field left out keeps its
//! default value.

use std::{fmt, str::FromStr, time::Duration};

use rand::{
    Rng,
    distr::{Distribution, StandardUniform},
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{
    camera::Camera,
    geometry::LatLng,
    question::Mode,
    viewport::{Padding, ZoneFraming},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizConfig {
    pub scoring: ScoringConfig,
    pub timing: TimingConfig,
    pub framing: FramingConfig,
    pub styles: ModeStyles,
    /// Unit labels offered as answers in zone mode.
    pub units: Vec<String>,
    pub stations: Vec<Station>,
    /// Camera shown before any question frames the map.
    pub home: Camera,
    /// Seed for question selection and jitter; random when absent.
    pub seed: Option<QuizSeed>,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            scoring: ScoringConfig::default(),
            timing: TimingConfig::default(),
            framing: FramingConfig::default(),
            styles: ModeStyles::default(),
            units: ["E1", "E2", "E3", "Q5", "E4"].map(String::from).to_vec(),
            stations: vec![
                Station::new("Hall 1", 49.291_329, -122.791_614),
                Station::new("Hall 2", 49.262_235, -122.817_255),
                Station::new("Hall 3", 49.248_043, -122.865_665),
                Station::new("Hall 4", 49.295_213, -122.742_539),
            ],
            home: Camera::new(LatLng::new(49.28, -122.80), 12.0),
            seed: None,
        }
    }
}

/// Score values and tolerance bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub zone_points: u32,
    pub block_points: u32,
    /// Distance at which a point answer stops earning anything; also the
    /// score of a perfect point answer.
    pub point_horizon_m: u32,
    pub intersection_tolerance_m: u32,
    pub address_tolerance_m: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            zone_points: 1,
            block_points: 1,
            point_horizon_m: 500,
            intersection_tolerance_m: 50,
            address_tolerance_m: 15,
        }
    }
}

/// Auto-advance delays, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub zone_advance_ms: u64,
    pub point_advance_ms: u64,
    pub block_advance_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            zone_advance_ms: 1000,
            point_advance_ms: 1000,
            block_advance_ms: 1500,
        }
    }
}

impl TimingConfig {
    #[must_use]
    pub const fn zone_advance(&self) -> Duration {
        Duration::from_millis(self.zone_advance_ms)
    }

    #[must_use]
    pub const fn point_advance(&self) -> Duration {
        Duration::from_millis(self.point_advance_ms)
    }

    #[must_use]
    pub const fn block_advance(&self) -> Duration {
        Duration::from_millis(self.block_advance_ms)
    }
}

/// Viewport policy parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FramingConfig {
    pub zone_framing: ZoneFraming,
    pub zone_padding: Padding,
    /// Zoom used by [`ZoneFraming::Target`].
    pub zone_zoom: f64,
    pub street_padding: Padding,
    pub street_max_zoom: f64,
    pub comparison_padding: Padding,
    pub comparison_max_zoom: f64,
    pub address_zoom: f64,
    pub address_reveal_zoom: f64,
    pub jitter: JitterBand,
}

impl Default for FramingConfig {
    fn default() -> Self {
        Self {
            zone_framing: ZoneFraming::AllZones,
            zone_padding: Padding::uniform(50.0),
            zone_zoom: 14.0,
            street_padding: Padding::new((50.0, 50.0), (350.0, 50.0)),
            street_max_zoom: 16.0,
            comparison_padding: Padding::new((100.0, 100.0), (350.0, 100.0)),
            comparison_max_zoom: 17.0,
            address_zoom: 17.0,
            address_reveal_zoom: 20.0,
            jitter: JitterBand {
                min_m: 40.0,
                max_m: 150.0,
            },
        }
    }
}

/// Range of the random offset applied to address framing, in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JitterBand {
    pub min_m: f64,
    pub max_m: f64,
}

/// Basemap flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MapStyle {
    #[display("GREY")]
    Grey,
    #[display("DARK")]
    Dark,
}

impl MapStyle {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Grey => Self::Dark,
            Self::Dark => Self::Grey,
        }
    }
}

/// Map style applied when a mode is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModeStyles {
    pub explore: MapStyle,
    pub zones: MapStyle,
    pub intersections: MapStyle,
    pub blocks: MapStyle,
    pub addresses: MapStyle,
}

impl Default for ModeStyles {
    fn default() -> Self {
        Self {
            explore: MapStyle::Grey,
            zones: MapStyle::Dark,
            intersections: MapStyle::Grey,
            blocks: MapStyle::Grey,
            addresses: MapStyle::Grey,
        }
    }
}

impl ModeStyles {
    #[must_use]
    pub fn for_mode(&self, mode: Mode) -> MapStyle {
        match mode {
            Mode::Explore => self.explore,
            Mode::QuizZones => self.zones,
            Mode::QuizIntersections => self.intersections,
            Mode::QuizBlocks => self.blocks,
            Mode::QuizAddresses => self.addresses,
        }
    }
}

/// Fire hall drawn as a fixed landmark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub name: String,
    pub position: LatLng,
}

impl Station {
    fn new(name: &str, lat: f64, lng: f64) -> Self {
        Self {
            name: name.to_owned(),
            position: LatLng::new(lat, lng),
        }
    }
}

/// 128-bit seed for the session's random source.
///
/// Serialized as a 32-character hex string so it can be copied from a log
/// line into `--seed` or a config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizSeed(pub(crate) [u8; 16]);

impl QuizSeed {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("invalid hex seed: {reason}")]
pub struct ParseSeedError {
    #[error(not(source))]
    reason: String,
}

impl FromStr for QuizSeed {
    type Err = ParseSeedError;

    fn from_str(hex_str: &str) -> Result<Self, Self::Err> {
        if hex_str.len() != 32 {
            return Err(ParseSeedError {
                reason: format!("expected 32 characters, got {}", hex_str.len()),
            });
        }
        if let Some(c) = hex_str.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(ParseSeedError {
                reason: format!("{hex_str} (unexpected character {c:?})"),
            });
        }
        let num = u128::from_str_radix(hex_str, 16).map_err(|e| ParseSeedError {
            reason: format!("{hex_str} ({e})"),
        })?;
        Ok(Self(num.to_be_bytes()))
    }
}

impl fmt::Display for QuizSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", u128::from_be_bytes(self.0))
    }
}

impl Serialize for QuizSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for QuizSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        hex_str.parse().map_err(serde::de::Error::custom)
    }
}

impl Distribution<QuizSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> QuizSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        QuizSeed(seed)
    }
}
