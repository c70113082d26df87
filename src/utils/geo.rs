/// Mean Earth radius used for delivery distances
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Nigeria bounding box accepted for restaurant and delivery coordinates
pub const LAT_RANGE: (f64, f64) = (4.0, 14.0);
pub const LNG_RANGE: (f64, f64) = (2.0, 15.0);

/// Great-circle distance between two points in kilometres.
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lng2 - lng1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

pub fn within_nigeria(lat: f64, lng: f64) -> bool {
    (LAT_RANGE.0..=LAT_RANGE.1).contains(&lat) && (LNG_RANGE.0..=LNG_RANGE.1).contains(&lng)
}

/// Round to two decimals for display
pub fn round_km(km: f64) -> f64 {
    (km * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_distance() {
        assert!(haversine_km(9.082, 7.3986, 9.082, 7.3986).abs() < 1e-9);
    }

    #[test]
    fn test_abuja_to_lagos() {
        // roughly 525 km as the crow flies
        let d = haversine_km(9.0765, 7.3986, 6.5244, 3.3792);
        assert!((d - 525.0).abs() < 10.0, "got {d}");
    }

    #[test]
    fn test_one_degree_latitude() {
        let d = haversine_km(9.0, 7.0, 10.0, 7.0);
        assert!((d - 111.19).abs() < 0.1, "got {d}");
    }

    #[test]
    fn test_within_nigeria() {
        assert!(within_nigeria(9.082, 7.3986));
        assert!(!within_nigeria(51.5, -0.12));
        assert!(!within_nigeria(3.9, 7.0));
    }
}
