use geo_types::{Geometry, LineString};
use serde::{Deserialize, Serialize};

/// One maneuver of a solved route.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DirectionStep {
    pub text: String,
    pub geometry: Option<Geometry<f64>>,
    pub length_meters: f64,
    pub time_minutes: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SolvedRoute {
    pub name: String,
    pub total_time_minutes: f64,
    pub total_length_meters: f64,
    pub geometry: LineString<f64>,
    pub directions: Vec<DirectionStep>,
}

impl SolvedRoute {
    pub fn new(name: String, total_time_minutes: f64, total_length_meters: f64) -> Self {
        Self {
            name,
            total_time_minutes,
            total_length_meters,
            geometry: LineString::new(vec![]),
            directions: vec![],
        }
    }

    pub fn with_geometry(mut self, geometry: LineString<f64>) -> Self {
        self.geometry = geometry;
        self
    }

    pub fn with_directions(mut self, directions: Vec<DirectionStep>) -> Self {
        self.directions = directions;
        self
    }

    /// Attribute text shown next to an inspected route.
    pub fn callout_text(&self) -> String {
        format!(
            "Route Name = {}\nTotal Time = {} minutes\nTotal Length = {} meters",
            self.name,
            self.total_time_minutes.trunc() as i64,
            self.total_length_meters.trunc() as i64
        )
    }
}
