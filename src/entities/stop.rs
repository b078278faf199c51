use serde::{Deserialize, Serialize};

use crate::entities::Coordinates;
use crate::error::{capacity_exceeded_error, Error};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopRole {
    Origin,
    Destination,
    Waypoint,
}

impl StopRole {
    /// Role of the stop at `position` in visit order.
    pub fn for_position(position: usize) -> Self {
        match position {
            0 => Self::Origin,
            1 => Self::Destination,
            _ => Self::Waypoint,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub location: Coordinates,
    pub role: Option<StopRole>,
}

impl Stop {
    pub fn new(location: Coordinates, role: StopRole) -> Self {
        Self {
            location,
            role: Some(role),
        }
    }

    pub fn untagged(location: Coordinates) -> Self {
        Self {
            location,
            role: None,
        }
    }
}

/// Ordered stops of a route request. Insertion order is visit order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StopSequence {
    stops: Vec<Stop>,
    limit: Option<usize>,
}

impl StopSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bounded(limit: usize) -> Self {
        Self {
            stops: Vec::with_capacity(limit),
            limit: Some(limit),
        }
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn add_stop(&mut self, location: Coordinates) -> Result<&[Stop], Error> {
        if let Some(limit) = self.limit {
            if self.stops.len() >= limit {
                return Err(capacity_exceeded_error(limit));
            }
        }

        let role = StopRole::for_position(self.stops.len());
        self.stops.push(Stop::new(location, role));

        Ok(&self.stops)
    }

    pub fn clear(&mut self) {
        self.stops.clear();
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn origin(&self) -> Option<&Stop> {
        self.stops.first()
    }

    pub fn destination(&self) -> Option<&Stop> {
        self.stops.get(1)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Stop> {
        self.stops.iter()
    }

    pub fn as_slice(&self) -> &[Stop] {
        &self.stops
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_stops_by_position() {
        let mut stops = StopSequence::new();
        stops.add_stop(Coordinates::new(32.0, -117.0)).unwrap();
        stops.add_stop(Coordinates::new(32.1, -117.2)).unwrap();
        let all = stops.add_stop(Coordinates::new(32.2, -117.3)).unwrap();

        let roles: Vec<_> = all.iter().map(|stop| stop.role).collect();
        assert_eq!(
            roles,
            vec![
                Some(StopRole::Origin),
                Some(StopRole::Destination),
                Some(StopRole::Waypoint)
            ]
        );
        assert_eq!(stops.origin().unwrap().location, Coordinates::new(32.0, -117.0));
        assert_eq!(
            stops.destination().unwrap().location,
            Coordinates::new(32.1, -117.2)
        );
    }

    #[test]
    fn rejects_stops_past_the_limit() {
        let mut stops = StopSequence::bounded(2);
        stops.add_stop(Coordinates::new(32.0, -117.0)).unwrap();
        stops.add_stop(Coordinates::new(32.1, -117.2)).unwrap();

        let err = stops.add_stop(Coordinates::new(32.2, -117.3)).unwrap_err();

        assert!(err.is_capacity_exceeded());
        assert_eq!(stops.len(), 2);
    }

    #[test]
    fn clear_is_idempotent() {
        let mut stops = StopSequence::bounded(2);
        stops.add_stop(Coordinates::new(32.0, -117.0)).unwrap();

        stops.clear();
        stops.clear();

        assert!(stops.is_empty());
        assert_eq!(stops.len(), 0);
        assert_eq!(stops.limit(), Some(2));
    }
}
