use crate::config::{EmptyRoutePolicy, GeofenceConfig};
use crate::models::Coordinate;
use crate::utils::polyline;

/// Rectangular region check plus sampled route validation.
#[derive(Debug, Clone)]
pub struct GeofenceValidator {
    config: GeofenceConfig,
}

impl GeofenceValidator {
    pub fn new(config: GeofenceConfig) -> Self {
        Self { config }
    }

    pub fn is_in_region(&self, lat: f64, lng: f64) -> bool {
        let c = &self.config;
        (c.min_lat..=c.max_lat).contains(&lat) && (c.min_lng..=c.max_lng).contains(&lng)
    }

    pub fn contains(&self, coord: &Coordinate) -> bool {
        self.is_in_region(coord.lat, coord.lng)
    }

    /// Checks the first point, the last point and every Nth point in between,
    /// N = max(1, len / samples_per_route).
    pub fn validate_route(&self, encoded: &str) -> bool {
        let points = polyline::decode(encoded);
        self.validate_points(&points)
    }

    pub fn validate_points(&self, points: &[Coordinate]) -> bool {
        let (Some(first), Some(last)) = (points.first(), points.last()) else {
            log::warn!("Route decoded to no points");
            return self.config.empty_route_policy == EmptyRoutePolicy::Accept;
        };

        if !self.contains(first) || !self.contains(last) {
            return false;
        }

        let step = (points.len() / self.config.samples_per_route).max(1);
        points.iter().step_by(step).all(|p| self.contains(p))
    }
}
