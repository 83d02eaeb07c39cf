use crate::domain::model::{Coordinate, DistanceResult, LocationStatus};

/// Statute miles.
pub const EARTH_RADIUS_MILES: f64 = 3958.8;

/// Cornell Tech, Bloomberg Center.
pub const HUB: Coordinate = Coordinate::new(40.75561135379217, -73.95600009323404);

pub const MAX_RANGE_MILES: f64 = 15.0;

/// Great-circle distance between two points, in miles.
///
/// Pure arithmetic: out-of-range or NaN input is not rejected and simply
/// propagates into the result.
pub fn haversine_miles(from: Coordinate, to: Coordinate) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let d_lat = (to.latitude - from.latitude).to_radians();
    let d_lon = (to.longitude - from.longitude).to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_MILES * c
}

/// Decides whether a visitor is inside the launch zone around the hub.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoGate {
    hub: Coordinate,
    radius_miles: f64,
}

impl GeoGate {
    pub fn new(hub: Coordinate, radius_miles: f64) -> Self {
        Self { hub, radius_miles }
    }

    pub fn hub(&self) -> Coordinate {
        self.hub
    }

    pub fn radius_miles(&self) -> f64 {
        self.radius_miles
    }

    /// The boundary itself counts as inside.
    pub fn is_within_range(&self, miles: f64) -> bool {
        miles <= self.radius_miles
    }

    pub fn distance_to(&self, point: Coordinate) -> DistanceResult {
        let miles = haversine_miles(self.hub, point);
        DistanceResult {
            miles,
            within_range: self.is_within_range(miles),
        }
    }

    /// `None` means the device gave us no fix; that is reported as out of
    /// range with no distance.
    pub fn classify(&self, point: Option<Coordinate>) -> LocationStatus {
        match point {
            Some(point) => self.distance_to(point).into(),
            None => LocationStatus::unknown(),
        }
    }
}

impl Default for GeoGate {
    fn default() -> Self {
        Self::new(HUB, MAX_RANGE_MILES)
    }
}
