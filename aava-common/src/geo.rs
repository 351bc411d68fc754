//! Great-circle distance

use crate::grid::Coordinate;

/// Mean Earth radius in metres
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Distance capability consumed by the validator
pub trait DistanceMeasure: Send + Sync {
    /// Distance in metres, or `None` when either side is absent
    fn distance_m(&self, a: Option<Coordinate>, b: Option<Coordinate>) -> Option<f64>;
}

/// Haversine distance on a spherical Earth
#[derive(Debug, Clone, Copy, Default)]
pub struct Haversine;

impl DistanceMeasure for Haversine {
    fn distance_m(&self, a: Option<Coordinate>, b: Option<Coordinate>) -> Option<f64> {
        Some(haversine_m(a?, b?))
    }
}

/// Haversine distance between two points in metres
pub fn haversine_m(a: Coordinate, b: Coordinate) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let d_phi = (b.lat - a.lat).to_radians();
    let d_lambda = (b.lon - a.lon).to_radians();

    let h = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_M * c
}
