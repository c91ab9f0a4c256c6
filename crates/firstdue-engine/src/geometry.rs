//! Thin adapter over the [`geo`] crate.
//!
//! Everything the quiz needs from a geometry library goes through this module:
//!
//! - [`distance_m`] - great-circle distance in meters
//! - [`Bounds`] - axis-aligned bounding regions and their union
//! - [`destination`] - a point displaced by a bearing and a distance
//! - [`path_proximity`] - how close a click is to a polyline
//!
//! Point-in-polygon lives on [`Zone::contains`](crate::Zone::contains), which
//! wraps [`geo::Contains`].
//!
//! Coordinates are stored as `lat`/`lng` pairs; `geo` works in `x`/`y`, so the
//! conversion maps `x = lng` and `y = lat`.

use geo::{
    BoundingRect as _, Destination as _, Distance as _, Euclidean, Haversine, LineString,
    MultiPoint, Point, Rect,
};
use serde::{Deserialize, Serialize};

/// A geographic position in degrees.
///
/// Serialized as a `[lat, lng]` pair, the order used by the block dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl From<[f64; 2]> for LatLng {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Self { lat, lng }
    }
}

impl From<LatLng> for [f64; 2] {
    fn from(p: LatLng) -> Self {
        [p.lat, p.lng]
    }
}

impl From<LatLng> for Point<f64> {
    fn from(p: LatLng) -> Self {
        Point::new(p.lng, p.lat)
    }
}

impl From<Point<f64>> for LatLng {
    fn from(p: Point<f64>) -> Self {
        Self {
            lat: p.y(),
            lng: p.x(),
        }
    }
}

/// Great-circle distance between two positions, in meters.
#[must_use]
pub fn distance_m(from: LatLng, to: LatLng) -> f64 {
    Haversine.distance(Point::from(from), Point::from(to))
}

/// Position reached by travelling `distance_m` meters from `origin` along
/// `bearing_deg` (clockwise from north).
#[must_use]
pub fn destination(origin: LatLng, bearing_deg: f64, distance_m: f64) -> LatLng {
    Haversine
        .destination(Point::from(origin), bearing_deg, distance_m)
        .into()
}

/// Planar distance in degrees from `p` to the polyline `path`.
///
/// Only meaningful for ranking nearby candidates against each other. An empty
/// path is infinitely far away.
#[must_use]
pub fn path_proximity(p: LatLng, path: &[LatLng]) -> f64 {
    if path.is_empty() {
        return f64::INFINITY;
    }
    let line: LineString<f64> = path.iter().map(|&q| Point::from(q)).collect();
    Euclidean.distance(&Point::from(p), &line)
}

/// Minimal axis-aligned rectangle covering a set of positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl Bounds {
    /// Bounding region of `points`, or `None` when there are no points.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = LatLng>,
    {
        let points: MultiPoint<f64> = points.into_iter().map(Point::from).collect();
        points.bounding_rect().map(Self::from)
    }

    /// Smallest region covering both `self` and `other`.
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        Self {
            south_west: LatLng::new(
                self.south_west.lat.min(other.south_west.lat),
                self.south_west.lng.min(other.south_west.lng),
            ),
            north_east: LatLng::new(
                self.north_east.lat.max(other.north_east.lat),
                self.north_east.lng.max(other.north_east.lng),
            ),
        }
    }

    #[must_use]
    pub fn center(&self) -> LatLng {
        LatLng::new(
            f64::midpoint(self.south_west.lat, self.north_east.lat),
            f64::midpoint(self.south_west.lng, self.north_east.lng),
        )
    }

    #[must_use]
    pub fn contains(&self, p: LatLng) -> bool {
        (self.south_west.lat..=self.north_east.lat).contains(&p.lat)
            && (self.south_west.lng..=self.north_east.lng).contains(&p.lng)
    }
}

impl From<Rect<f64>> for Bounds {
    fn from(rect: Rect<f64>) -> Self {
        Self {
            south_west: LatLng::new(rect.min().y, rect.min().x),
            north_east: LatLng::new(rect.max().y, rect.max().x),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_of_one_millidegree_latitude() {
        let a = LatLng::new(49.2800, -122.7900);
        let b = LatLng::new(49.2810, -122.7900);
        let d = distance_m(a, b);
        // 0.001 degrees of latitude is about 111 m everywhere.
        assert!((110.0..112.5).contains(&d), "distance was {d}");
    }

    #[test]
    fn test_distance_to_self_is_zero() {
        let a = LatLng::new(49.2800, -122.7900);
        assert!(distance_m(a, a).abs() < 1e-9);
    }

    #[test]
    fn test_destination_travels_requested_distance() {
        let origin = LatLng::new(49.2800, -122.7900);
        for bearing in [0.0, 45.0, 90.0, 200.0, 315.0] {
            let p = destination(origin, bearing, 40.0);
            let d = distance_m(origin, p);
            assert!((d - 40.0).abs() < 0.01, "bearing {bearing}: {d}");
        }
    }

    #[test]
    fn test_path_proximity_ranks_closer_path_first() {
        let near = [LatLng::new(49.2800, -122.80), LatLng::new(49.2800, -122.79)];
        let far = [LatLng::new(49.2900, -122.80), LatLng::new(49.2900, -122.79)];
        let click = LatLng::new(49.2801, -122.795);
        assert!(path_proximity(click, &near) < path_proximity(click, &far));
        assert!(path_proximity(click, &[]).is_infinite());
    }

    #[test]
    fn test_bounds_from_points() {
        let bounds = Bounds::from_points([
            LatLng::new(49.0, -123.0),
            LatLng::new(49.5, -122.5),
            LatLng::new(49.2, -122.8),
        ])
        .unwrap();
        assert_eq!(bounds.south_west, LatLng::new(49.0, -123.0));
        assert_eq!(bounds.north_east, LatLng::new(49.5, -122.5));
        assert_eq!(bounds.center(), LatLng::new(49.25, -122.75));
    }

    #[test]
    fn test_bounds_from_no_points() {
        assert!(Bounds::from_points([]).is_none());
    }

    #[test]
    fn test_bounds_union_covers_both() {
        let a = Bounds::from_points([LatLng::new(49.0, -123.0), LatLng::new(49.1, -122.9)]).unwrap();
        let b = Bounds::from_points([LatLng::new(49.3, -122.7), LatLng::new(49.4, -122.6)]).unwrap();
        let u = a.union(b);
        for p in [a.south_west, a.north_east, b.south_west, b.north_east] {
            assert!(u.contains(p));
        }
        assert_eq!(u.south_west, LatLng::new(49.0, -123.0));
        assert_eq!(u.north_east, LatLng::new(49.4, -122.6));
    }

    #[test]
    fn test_latlng_serializes_as_lat_lng_pair() {
        let p: LatLng = serde_json::from_str("[49.28, -122.8]").unwrap();
        assert_eq!(p, LatLng::new(49.28, -122.8));
        assert_eq!(serde_json::to_string(&p).unwrap(), "[49.28,-122.8]");
    }
}
