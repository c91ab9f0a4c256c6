//! Question records as delivered by the datasets.
//!
//! All records are immutable once loaded. They deserialize straight from the
//! JSON files the trainer ships with:
//!
//! - zones: `{ "zone_id", "unit_id", "geometry": <GeoJSON Polygon> }`
//! - intersections: `{ "name", "lat", "lng" }`
//! - blocks: `{ "street", "block", "coordinates": [[lat, lng], ...] }`
//! - addresses: `{ "address", "lat", "lng" }`

use geo::{Contains as _, LineString, Point, Polygon};
use serde::{Deserialize, Deserializer, Serialize};

use crate::geometry::{Bounds, LatLng};

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("zone {zone_id} has {points} outline points, at least 3 are required")]
pub struct InvalidZoneError {
    zone_id: String,
    points: usize,
}

/// A first-due zone and the unit responsible for it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawZone")]
pub struct Zone {
    zone_id: String,
    unit_id: String,
    outline: Vec<LatLng>,
    polygon: Polygon<f64>,
}

impl Zone {
    pub fn new(
        zone_id: impl Into<String>,
        unit_id: impl Into<String>,
        outline: Vec<LatLng>,
    ) -> Result<Self, InvalidZoneError> {
        let zone_id = zone_id.into();
        if outline.len() < 3 {
            return Err(InvalidZoneError {
                zone_id,
                points: outline.len(),
            });
        }
        let exterior: LineString<f64> = outline.iter().copied().map(Point::from).collect();
        Ok(Self {
            zone_id,
            unit_id: unit_id.into(),
            polygon: Polygon::new(exterior, vec![]),
            outline,
        })
    }

    #[must_use]
    pub fn zone_id(&self) -> &str {
        &self.zone_id
    }

    #[must_use]
    pub fn unit_id(&self) -> &str {
        &self.unit_id
    }

    /// Outline ring of the zone.
    #[must_use]
    pub fn outline(&self) -> &[LatLng] {
        &self.outline
    }

    #[must_use]
    pub fn bounds(&self) -> Bounds {
        // `new` guarantees a non-empty outline
        Bounds::from_points(self.outline.iter().copied()).expect("zone outline is never empty")
    }

    /// Point-in-polygon test. Points on the boundary are not contained.
    #[must_use]
    pub fn contains(&self, p: LatLng) -> bool {
        self.polygon.contains(&Point::from(p))
    }
}

#[derive(Deserialize)]
struct RawZone {
    zone_id: Label,
    unit_id: String,
    geometry: RawPolygon,
}

#[derive(Deserialize)]
struct RawPolygon {
    /// GeoJSON rings; positions are `[lng, lat]`.
    coordinates: Vec<Vec<[f64; 2]>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Label {
    Text(String),
    Int(i64),
}

impl From<Label> for String {
    fn from(label: Label) -> Self {
        match label {
            Label::Text(text) => text,
            Label::Int(n) => n.to_string(),
        }
    }
}

impl TryFrom<RawZone> for Zone {
    type Error = InvalidZoneError;

    fn try_from(raw: RawZone) -> Result<Self, Self::Error> {
        let outline = raw
            .geometry
            .coordinates
            .into_iter()
            .next()
            .unwrap_or_default()
            .into_iter()
            .map(|[lng, lat]| LatLng::new(lat, lng))
            .collect();
        Zone::new(String::from(raw.zone_id), raw.unit_id, outline)
    }
}

/// A named street intersection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intersection {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

impl Intersection {
    #[must_use]
    pub fn position(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }
}

/// One block-long segment of a street.
///
/// `block` is the block-number identifier (e.g. the 1200 block), not a count.
/// Entries whose number is missing or not a positive number are kept in the
/// dataset but never asked; see [`filter_valid_blocks`](crate::filter_valid_blocks).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub street: String,
    #[serde(default, deserialize_with = "lenient_block_number")]
    pub block: i64,
    pub coordinates: Vec<LatLng>,
}

impl Block {
    #[must_use]
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(self.coordinates.iter().copied())
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.block > 0
    }
}

/// Accepts integers, integral floats and numeric strings; anything else
/// (including `null`) becomes `0`.
fn lenient_block_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawNumber {
        Int(i64),
        Float(f64),
        Text(String),
    }

    #[expect(clippy::cast_possible_truncation)]
    let number = match Option::<RawNumber>::deserialize(deserializer)? {
        Some(RawNumber::Int(n)) => n,
        Some(RawNumber::Float(f)) if f.is_finite() && f.fract() == 0.0 => f as i64,
        Some(RawNumber::Text(s)) => s.trim().parse().unwrap_or(0),
        Some(RawNumber::Float(_)) | None => 0,
    };
    Ok(number)
}

/// A street address with a house number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub address: String,
    pub lat: f64,
    pub lng: f64,
}

impl Address {
    #[must_use]
    pub fn position(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Axis-aligned square zone with its south-west corner at `(lat, lng)`.
    pub(crate) fn square_zone(zone_id: &str, unit_id: &str, lat: f64, lng: f64, size: f64) -> Zone {
        Zone::new(
            zone_id,
            unit_id,
            vec![
                LatLng::new(lat, lng),
                LatLng::new(lat, lng + size),
                LatLng::new(lat + size, lng + size),
                LatLng::new(lat + size, lng),
                LatLng::new(lat, lng),
            ],
        )
        .unwrap()
    }

    pub(crate) fn block(street: &str, block: i64, lat: f64) -> Block {
        Block {
            street: street.to_owned(),
            block,
            coordinates: vec![LatLng::new(lat, -122.80), LatLng::new(lat, -122.799)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{fixtures::square_zone, *};

    #[test]
    fn test_zone_from_geojson() {
        let json = r#"{
            "zone_id": 12,
            "unit_id": "E2",
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[-122.80, 49.27], [-122.78, 49.27], [-122.78, 49.29], [-122.80, 49.29], [-122.80, 49.27]]]
            }
        }"#;
        let zone: Zone = serde_json::from_str(json).unwrap();
        assert_eq!(zone.zone_id(), "12");
        assert_eq!(zone.unit_id(), "E2");
        assert_eq!(zone.outline()[0], LatLng::new(49.27, -122.80));
        assert!(zone.contains(LatLng::new(49.28, -122.79)));
        assert!(!zone.contains(LatLng::new(49.30, -122.79)));
    }

    #[test]
    fn test_zone_with_text_id() {
        let json = r#"{"zone_id": "7A", "unit_id": "Q5",
            "geometry": {"type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]]}}"#;
        let zone: Zone = serde_json::from_str(json).unwrap();
        assert_eq!(zone.zone_id(), "7A");
    }

    #[test]
    fn test_zone_without_outline_is_rejected() {
        let json = r#"{"zone_id": 1, "unit_id": "E1",
            "geometry": {"type": "Polygon", "coordinates": []}}"#;
        let err = serde_json::from_str::<Zone>(json).unwrap_err();
        assert!(err.to_string().contains("at least 3"));
    }

    #[test]
    fn test_zone_bounds() {
        let zone = square_zone("1", "E1", 49.0, -123.0, 0.5);
        let bounds = zone.bounds();
        assert_eq!(bounds.south_west, LatLng::new(49.0, -123.0));
        assert_eq!(bounds.north_east, LatLng::new(49.5, -122.5));
    }

    #[test]
    fn test_block_number_parsing() {
        let parse = |json: &str| serde_json::from_str::<Block>(json).unwrap().block;
        assert_eq!(parse(r#"{"street": "Main St", "block": 1200, "coordinates": []}"#), 1200);
        assert_eq!(parse(r#"{"street": "Main St", "block": 1200.0, "coordinates": []}"#), 1200);
        assert_eq!(parse(r#"{"street": "Main St", "block": "300", "coordinates": []}"#), 300);
        assert_eq!(parse(r#"{"street": "Main St", "block": "N/A", "coordinates": []}"#), 0);
        assert_eq!(parse(r#"{"street": "Main St", "block": null, "coordinates": []}"#), 0);
        assert_eq!(parse(r#"{"street": "Main St", "coordinates": []}"#), 0);
    }

    #[test]
    fn test_block_coordinates_are_lat_lng() {
        let block: Block = serde_json::from_str(
            r#"{"street": "Main St", "block": 100, "coordinates": [[49.28, -122.80], [49.28, -122.79]]}"#,
        )
        .unwrap();
        assert_eq!(block.coordinates[1], LatLng::new(49.28, -122.79));
        let bounds = block.bounds().unwrap();
        assert_eq!(bounds.north_east, LatLng::new(49.28, -122.79));
    }
}
