//! Domain types for the bike share engine.
//!
//! Values are validated at construction time, so code receiving them can
//! trust coordinates are in range and radii are non-negative.

mod area;
mod coordinate;
mod station;
mod system;

pub use area::{CircularArea, InvalidArea};
pub use coordinate::{Coordinate, InvalidCoordinate};
pub use station::{StationId, StationInformation, StationStatus};
pub use system::SystemId;
