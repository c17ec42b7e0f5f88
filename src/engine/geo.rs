use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Mean Earth radius in meters (spherical approximation).
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// GPS accuracy ceiling in meters. Fixed constant, not admin-editable.
pub const MAX_ACCURACY_M: f64 = 200.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Coordinate {
    #[schema(example = -7.7598)]
    pub lat: f64,
    #[schema(example = 110.3953)]
    pub lng: f64,
}

/// Admin-configured work area. `max_accuracy_m` is always
/// [`MAX_ACCURACY_M`]; it rides along so the decision code never reaches
/// for the constant directly.
#[derive(Debug, Clone, Copy)]
pub struct AreaConfig {
    pub center: Coordinate,
    pub radius_m: f64,
    pub max_accuracy_m: f64,
}

/// A geolocation fix as submitted by the client.
#[derive(Debug, Clone, Copy)]
pub struct GeoFix {
    pub coord: Coordinate,
    pub accuracy_m: f64,
}

/// Outcome of checking one fix against the work area.
#[derive(Debug, Clone, Copy)]
pub struct GeoCheck {
    pub distance_m: f64,
    pub valid: bool,
}

/// Great-circle distance between two WGS-84 coordinates, in meters.
///
/// Haversine on a spherical Earth. Assumes finite input; callers reject
/// NaN/infinite degrees before getting here.
pub fn distance_meters(a: Coordinate, b: Coordinate) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let d_phi = (b.lat - a.lat).to_radians();
    let d_lambda = (b.lng - a.lng).to_radians();

    let h = (d_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

/// Location acceptance test. GPS accuracy is a confidence radius, not a
/// bias, so it widens the permitted radius rather than shrinking it.
pub fn is_location_valid(
    distance_m: f64,
    accuracy_m: f64,
    radius_m: f64,
    max_accuracy_m: f64,
) -> bool {
    accuracy_m <= max_accuracy_m && distance_m <= radius_m + accuracy_m
}

/// Measures one fix against the configured area.
pub fn check_fix(area: &AreaConfig, fix: &GeoFix) -> GeoCheck {
    let distance_m = distance_meters(area.center, fix.coord);
    GeoCheck {
        distance_m,
        valid: is_location_valid(distance_m, fix.accuracy_m, area.radius_m, area.max_accuracy_m),
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    ToSchema,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum LocationClass {
    InOffice,
    Remote,
}

impl LocationClass {
    pub fn from_valid(valid: bool) -> Self {
        if valid {
            LocationClass::InOffice
        } else {
            LocationClass::Remote
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OFFICE: Coordinate = Coordinate {
        lat: -7.7598,
        lng: 110.3953,
    };

    #[test]
    fn distance_to_self_is_zero() {
        assert_eq!(distance_meters(OFFICE, OFFICE), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let b = Coordinate {
            lat: -7.7640,
            lng: 110.4012,
        };
        let ab = distance_meters(OFFICE, b);
        let ba = distance_meters(b, OFFICE);
        assert!((ab - ba).abs() < 1e-9);
        assert!(ab > 0.0);
    }

    #[test]
    fn one_millidegree_of_latitude_is_about_111_m() {
        let b = Coordinate {
            lat: OFFICE.lat + 0.001,
            lng: OFFICE.lng,
        };
        let d = distance_meters(OFFICE, b);
        assert!((d - 111.2).abs() < 1.0, "expected ~111.2 m, got {d}");
    }

    #[test]
    fn accuracy_above_ceiling_is_never_valid() {
        // even standing dead center
        assert!(!is_location_valid(0.0, 250.0, 100.0, MAX_ACCURACY_M));
        assert!(!is_location_valid(0.0, MAX_ACCURACY_M + 0.1, 100.0, MAX_ACCURACY_M));
    }

    #[test]
    fn accuracy_margin_widens_the_radius() {
        // radius 100 m, accuracy 30 m: permitted up to 130 m
        assert!(is_location_valid(50.0, 30.0, 100.0, MAX_ACCURACY_M));
        assert!(is_location_valid(120.0, 30.0, 100.0, MAX_ACCURACY_M));
        assert!(is_location_valid(130.0, 30.0, 100.0, MAX_ACCURACY_M));
        assert!(!is_location_valid(150.0, 30.0, 100.0, MAX_ACCURACY_M));
    }

    #[test]
    fn check_fix_classifies_in_office_and_remote() {
        let area = AreaConfig {
            center: OFFICE,
            radius_m: 100.0,
            max_accuracy_m: MAX_ACCURACY_M,
        };

        let near = GeoFix {
            coord: Coordinate {
                lat: OFFICE.lat + 0.0005, // ~55 m north
                lng: OFFICE.lng,
            },
            accuracy_m: 30.0,
        };
        let checked = check_fix(&area, &near);
        assert!(checked.valid);
        assert_eq!(LocationClass::from_valid(checked.valid), LocationClass::InOffice);

        let far = GeoFix {
            coord: Coordinate {
                lat: OFFICE.lat + 0.01, // ~1.1 km north
                lng: OFFICE.lng,
            },
            accuracy_m: 30.0,
        };
        let checked = check_fix(&area, &far);
        assert!(!checked.valid);
        assert_eq!(LocationClass::from_valid(checked.valid), LocationClass::Remote);
    }
}
