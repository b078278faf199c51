use geo_types::{Geometry, Point};
use serde::{Deserialize, Serialize};

/// Well-known id of WGS84 geographic coordinates.
pub const WGS84: u32 = 4326;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpatialReference {
    pub wkid: u32,
}

impl Default for SpatialReference {
    fn default() -> Self {
        Self { wkid: WGS84 }
    }
}

/// A tapped map location.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub spatial_reference: SpatialReference,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            spatial_reference: SpatialReference::default(),
        }
    }

    pub fn with_spatial_reference(mut self, wkid: u32) -> Self {
        self.spatial_reference = SpatialReference { wkid };
        self
    }
}

impl From<Coordinates> for Point<f64> {
    fn from(coordinates: Coordinates) -> Self {
        Point::new(coordinates.longitude, coordinates.latitude)
    }
}

impl From<Coordinates> for Geometry<f64> {
    fn from(coordinates: Coordinates) -> Self {
        Geometry::Point(coordinates.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_to_lon_lat_point() {
        let point: Point<f64> = Coordinates::new(32.0, -117.0).into();

        assert_eq!(point.x(), -117.0);
        assert_eq!(point.y(), 32.0);
    }

    #[test]
    fn spatial_reference_defaults_to_wgs84() {
        let coordinates: Coordinates =
            serde_json::from_str(r#"{"latitude": 32.7, "longitude": -117.1}"#).unwrap();

        assert_eq!(coordinates.spatial_reference.wkid, WGS84);
        assert_eq!(
            Coordinates::new(0.0, 0.0)
                .with_spatial_reference(3857)
                .spatial_reference
                .wkid,
            3857
        );
    }
}
