use serde::{Deserialize, Serialize};

use crate::entities::{Coordinates, DirectionStep, SolvedRoute};
use crate::error::Error;

/// What the presentation layer is asked to show, in generation order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum DisplayEvent {
    OriginPlaced {
        location: Coordinates,
    },
    DestinationPlaced {
        location: Coordinates,
    },
    RouteReady {
        route: SolvedRoute,
    },
    RouteFailed {
        error: Error,
    },
    InspectRequested {
        location: Coordinates,
        route: SolvedRoute,
        callout: String,
    },
    DirectionSelected {
        index: usize,
        step: DirectionStep,
    },
    SessionReset,
}

impl DisplayEvent {
    pub fn name(&self) -> String {
        match self {
            Self::OriginPlaced { location: _ } => "origin_placed".into(),
            Self::DestinationPlaced { location: _ } => "destination_placed".into(),
            Self::RouteReady { route: _ } => "route_ready".into(),
            Self::RouteFailed { error: _ } => "route_failed".into(),
            Self::InspectRequested { .. } => "inspect_requested".into(),
            Self::DirectionSelected { index: _, step: _ } => "direction_selected".into(),
            Self::SessionReset => "session_reset".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_name_tag() {
        let event = DisplayEvent::OriginPlaced {
            location: Coordinates::new(32.0, -117.0),
        };

        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(value["name"], event.name());
        assert_eq!(value["location"]["latitude"], 32.0);
        assert_eq!(
            serde_json::to_value(DisplayEvent::SessionReset).unwrap()["name"],
            "session_reset"
        );
    }
}
