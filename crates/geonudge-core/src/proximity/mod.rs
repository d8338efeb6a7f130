//! Proximity index: "is there a place of category C within radius R?"
//!
//! The nearest-place search itself is an external capability consumed
//! behind the [`ProximityIndex`] trait. Two implementations ship with the
//! crate: [`LocalPlaceIndex`] scans the place store, and
//! [`HttpProximityIndex`] talks to a remote lookup service with a bounded
//! timeout.

pub mod http;
pub mod local;

pub use http::HttpProximityIndex;
pub use local::LocalPlaceIndex;

use serde::{Deserialize, Serialize};

use crate::error::ProximityError;
use crate::task::Category;

/// A geographic point. Ephemeral input, never persisted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        GeoPoint { lat, lng }
    }

    /// Both coordinates are finite numbers (not NaN, not infinite).
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

/// A place returned by a proximity query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceHit {
    pub name: String,
    pub category: Category,
    /// Distance from the query point, whole meters.
    pub distance_m: u64,
    pub price_level: Option<i64>,
    pub rating: Option<f64>,
}

/// Every proximity backend implements this trait.
///
/// Implementations are read-only over their place data and stateless
/// between calls.
pub trait ProximityIndex {
    /// All places of `category` within `radius_m` meters of `point`,
    /// sorted by distance ascending.
    fn nearby(
        &self,
        category: Category,
        point: GeoPoint,
        radius_m: f64,
    ) -> Result<Vec<PlaceHit>, ProximityError>;

    /// Nearest place of `category` within `radius_m` meters of `point`,
    /// or `None`.
    fn nearest(
        &self,
        category: Category,
        point: GeoPoint,
        radius_m: f64,
    ) -> Result<Option<PlaceHit>, ProximityError> {
        Ok(self.nearby(category, point, radius_m)?.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finite_check_rejects_nan_and_infinity() {
        assert!(GeoPoint::new(52.52, 13.405).is_finite());
        assert!(!GeoPoint::new(f64::NAN, 13.405).is_finite());
        assert!(!GeoPoint::new(52.52, f64::INFINITY).is_finite());
        assert!(!GeoPoint::new(f64::NEG_INFINITY, 0.0).is_finite());
    }
}
