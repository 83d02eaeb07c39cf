pub mod geo;
pub mod registry;

pub use crate::domain::model::{Coordinate, DistanceResult, LocationStatus, RegisterResult};
pub use crate::domain::ports::{MessageGenerator, WaitlistStore};
pub use crate::utils::error::Result;
pub use geo::GeoGate;
pub use registry::WaitlistRegistry;
