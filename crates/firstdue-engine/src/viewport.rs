//! Viewport policy: where the map should look for each question.
//!
//! Policy functions are pure apart from the random source used for address
//! jitter. They produce a [`Viewport`] instruction; turning an instruction into
//! a concrete camera for a given screen is [`Camera::apply`](crate::Camera::apply).

use std::f64::consts::PI;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    bank::filter_by_street,
    config::{FramingConfig, JitterBand},
    geometry::{self, Bounds, LatLng},
    model::{Block, Zone},
};

/// Screen-space padding in pixels, `(x, y)` for each corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Padding {
    pub top_left: (f64, f64),
    pub bottom_right: (f64, f64),
}

impl Padding {
    #[must_use]
    pub const fn new(top_left: (f64, f64), bottom_right: (f64, f64)) -> Self {
        Self {
            top_left,
            bottom_right,
        }
    }

    #[must_use]
    pub const fn uniform(px: f64) -> Self {
        Self::new((px, px), (px, px))
    }

    #[must_use]
    pub fn horizontal(&self) -> f64 {
        self.top_left.0 + self.bottom_right.0
    }

    #[must_use]
    pub fn vertical(&self) -> f64 {
        self.top_left.1 + self.bottom_right.1
    }
}

/// Framing instruction for the map renderer.
#[derive(Debug, Clone, Copy, PartialEq, derive_more::IsVariant)]
pub enum Viewport {
    /// Look at `center` from a fixed zoom.
    Center { center: LatLng, zoom: f64 },
    /// Fit `bounds` inside the padded screen, never zooming past `max_zoom`.
    Fit {
        bounds: Bounds,
        padding: Padding,
        max_zoom: Option<f64>,
    },
}

/// How zone questions are framed. One variant is used for a whole session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ZoneFraming {
    /// Show every zone at once, so the user has to find the target in the city.
    #[default]
    AllZones,
    /// Fly to the target zone at a district-level zoom.
    Target,
}

#[must_use]
pub fn frame_zone(target: &Zone, zones: &[Zone], config: &FramingConfig) -> Viewport {
    match config.zone_framing {
        ZoneFraming::AllZones => {
            let bounds = zones
                .iter()
                .map(Zone::bounds)
                .fold(target.bounds(), Bounds::union);
            Viewport::Fit {
                bounds,
                padding: config.zone_padding,
                max_zoom: None,
            }
        }
        ZoneFraming::Target => Viewport::Center {
            center: target.bounds().center(),
            zoom: config.zone_zoom,
        },
    }
}

/// Fits every segment of the target's street, leaving room for the answer
/// panel on the right.
#[must_use]
pub fn frame_street(target: &Block, blocks: &[Block], config: &FramingConfig) -> Option<Viewport> {
    let points = filter_by_street(blocks, &target.street)
        .chain([target])
        .flat_map(|b| b.coordinates.iter().copied());
    let bounds = Bounds::from_points(points)?;
    Some(Viewport::Fit {
        bounds,
        padding: config.street_padding,
        max_zoom: Some(config.street_max_zoom),
    })
}

/// Frames the clicked and the correct block together after a wrong answer.
#[must_use]
pub fn frame_block_comparison(
    clicked: &Block,
    target: &Block,
    config: &FramingConfig,
) -> Option<Viewport> {
    let bounds = match (clicked.bounds(), target.bounds()) {
        (Some(a), Some(b)) => a.union(b),
        (Some(only), None) | (None, Some(only)) => only,
        (None, None) => return None,
    };
    Some(Viewport::Fit {
        bounds,
        padding: config.comparison_padding,
        max_zoom: Some(config.comparison_max_zoom),
    })
}

/// Centers near, never on, the address, at a zoom that still requires
/// searching for the house.
pub fn frame_address<R>(target: LatLng, config: &FramingConfig, rng: &mut R) -> Viewport
where
    R: Rng + ?Sized,
{
    Viewport::Center {
        center: jitter(target, config.jitter, rng),
        zoom: config.address_zoom,
    }
}

/// Close-up on the address itself ("zoom to parcel").
#[must_use]
pub fn reveal_address(target: LatLng, config: &FramingConfig) -> Viewport {
    Viewport::Center {
        center: target,
        zoom: config.address_reveal_zoom,
    }
}

/// Displaces `center` in a random direction by a random distance within `band`.
///
/// The distance is drawn from `[min_m, max_m]`; a band whose minimum is not
/// positive is lifted to one meter so the result never coincides with `center`.
pub fn jitter<R>(center: LatLng, band: JitterBand, rng: &mut R) -> LatLng
where
    R: Rng + ?Sized,
{
    let min_m = band.min_m.max(1.0);
    let max_m = band.max_m.max(min_m);
    let distance = if max_m > min_m {
        rng.random_range(min_m..=max_m)
    } else {
        min_m
    };
    let bearing = rng.random_range(0.0..2.0 * PI).to_degrees();
    geometry::destination(center, bearing, distance)
}
