mod event;
mod location;
mod route;
mod stop;

pub use event::DisplayEvent;
pub use location::{Coordinates, SpatialReference, WGS84};
pub use route::{DirectionStep, SolvedRoute};
pub use stop::{Stop, StopRole, StopSequence};
