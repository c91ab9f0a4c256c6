//! Web-mercator camera.
//!
//! Resolves [`Viewport`] instructions into a concrete center and zoom for a
//! screen of known pixel size, following the slippy-map conventions (256 px
//! tiles, integer zoom snapping when fitting bounds). Also maps screen pixels
//! back to coordinates, which is how a click on the rendered map becomes an
//! answer.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::{
    geometry::{Bounds, LatLng},
    viewport::{Padding, Viewport},
};

const TILE_SIZE: f64 = 256.0;
const MIN_ZOOM: f64 = 0.0;
pub const MAX_ZOOM: f64 = 22.0;

/// Screen size in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenSize {
    pub width: f64,
    pub height: f64,
}

impl ScreenSize {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub center: LatLng,
    pub zoom: f64,
}

/// Pixel position in the world plane at a given zoom.
#[derive(Debug, Clone, Copy, PartialEq)]
struct WorldPx {
    x: f64,
    y: f64,
}

fn world_size(zoom: f64) -> f64 {
    TILE_SIZE * zoom.exp2()
}

fn project(p: LatLng, zoom: f64) -> WorldPx {
    let size = world_size(zoom);
    let lat = p.lat.clamp(-85.051_128, 85.051_128).to_radians();
    WorldPx {
        x: (p.lng + 180.0) / 360.0 * size,
        y: (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * size,
    }
}

fn unproject(px: WorldPx, zoom: f64) -> LatLng {
    let size = world_size(zoom);
    let n = PI - 2.0 * PI * px.y / size;
    LatLng::new(n.sinh().atan().to_degrees(), px.x / size * 360.0 - 180.0)
}

impl Camera {
    #[must_use]
    pub const fn new(center: LatLng, zoom: f64) -> Self {
        Self { center, zoom }
    }

    /// Camera after following `viewport` on `screen`.
    #[must_use]
    pub fn apply(viewport: &Viewport, screen: ScreenSize) -> Self {
        match *viewport {
            Viewport::Center { center, zoom } => Self::new(center, zoom.clamp(MIN_ZOOM, MAX_ZOOM)),
            Viewport::Fit {
                bounds,
                padding,
                max_zoom,
            } => Self::fit(bounds, padding, max_zoom, screen),
        }
    }

    /// Largest integer zoom at which `bounds` fits inside the padded screen,
    /// capped at `max_zoom`.
    ///
    /// The center is shifted by half the difference between the bottom-right
    /// and the top-left padding, so the bounds end up centered in the
    /// unpadded part of the screen.
    #[must_use]
    pub fn fit(bounds: Bounds, padding: Padding, max_zoom: Option<f64>, screen: ScreenSize) -> Self {
        let max_zoom = max_zoom.unwrap_or(MAX_ZOOM).clamp(MIN_ZOOM, MAX_ZOOM);
        let avail_w = (screen.width - padding.horizontal()).max(1.0);
        let avail_h = (screen.height - padding.vertical()).max(1.0);

        let nw = project(LatLng::new(bounds.north_east.lat, bounds.south_west.lng), 0.0);
        let se = project(LatLng::new(bounds.south_west.lat, bounds.north_east.lng), 0.0);
        let span_w = se.x - nw.x;
        let span_h = se.y - nw.y;

        let zoom = if span_w <= 0.0 && span_h <= 0.0 {
            max_zoom
        } else {
            let scale_w = if span_w > 0.0 { avail_w / span_w } else { f64::INFINITY };
            let scale_h = if span_h > 0.0 { avail_h / span_h } else { f64::INFINITY };
            scale_w.min(scale_h).log2().floor().clamp(MIN_ZOOM, max_zoom)
        };

        let nw = project(LatLng::new(bounds.north_east.lat, bounds.south_west.lng), zoom);
        let se = project(LatLng::new(bounds.south_west.lat, bounds.north_east.lng), zoom);
        let center = WorldPx {
            x: f64::midpoint(nw.x, se.x) + (padding.bottom_right.0 - padding.top_left.0) / 2.0,
            y: f64::midpoint(nw.y, se.y) + (padding.bottom_right.1 - padding.top_left.1) / 2.0,
        };
        Self::new(unproject(center, zoom), zoom)
    }

    /// Camera moved by `(dx, dy)` screen pixels, positive towards the
    /// bottom-right.
    #[must_use]
    pub fn panned(&self, dx: f64, dy: f64) -> Self {
        let center = project(self.center, self.zoom);
        let center = unproject(
            WorldPx {
                x: center.x + dx,
                y: center.y + dy,
            },
            self.zoom,
        );
        Self::new(center, self.zoom)
    }

    /// Camera zoomed by `delta` levels around its center.
    #[must_use]
    pub fn zoomed(&self, delta: f64) -> Self {
        Self::new(self.center, (self.zoom + delta).clamp(MIN_ZOOM, MAX_ZOOM))
    }

    /// Coordinates under the screen pixel `(x, y)`, measured from the top-left
    /// corner.
    #[must_use]
    pub fn unproject_screen(&self, x: f64, y: f64, screen: ScreenSize) -> LatLng {
        let center = project(self.center, self.zoom);
        unproject(
            WorldPx {
                x: center.x + x - screen.width / 2.0,
                y: center.y + y - screen.height / 2.0,
            },
            self.zoom,
        )
    }

    /// Region visible on `screen`.
    #[must_use]
    pub fn visible_bounds(&self, screen: ScreenSize) -> Bounds {
        let north_west = self.unproject_screen(0.0, 0.0, screen);
        let south_east = self.unproject_screen(screen.width, screen.height, screen);
        Bounds {
            south_west: LatLng::new(south_east.lat, north_west.lng),
            north_east: LatLng::new(north_west.lat, south_east.lng),
        }
    }
}
