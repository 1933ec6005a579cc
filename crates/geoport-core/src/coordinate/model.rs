use crate::error::{GeoportError, Result};
use serde::{Deserialize, Serialize};

const LATITUDE_RANGE: std::ops::RangeInclusive<f64> = -90.0..=90.0;
const LONGITUDE_RANGE: std::ops::RangeInclusive<f64> = -180.0..=180.0;

/// A latitude/longitude pair that is always jointly valid.
///
/// The fields are private; the only ways to obtain a `Coordinate` are
/// [`validate`] and deserialization, both of which apply the same range
/// checks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate")]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct RawCoordinate {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = GeoportError;

    fn try_from(raw: RawCoordinate) -> Result<Self> {
        validate(raw.latitude, raw.longitude)
    }
}

impl Coordinate {
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Returns true when both axes differ by strictly less than `threshold` degrees.
    pub fn is_within(&self, other: &Coordinate, threshold: f64) -> bool {
        (self.latitude - other.latitude).abs() < threshold
            && (self.longitude - other.longitude).abs() < threshold
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Checks a latitude/longitude pair and builds a [`Coordinate`].
///
/// Fails with `InvalidCoordinate` when either value is NaN or infinite,
/// when latitude is outside [-90, 90], or when longitude is outside
/// [-180, 180]. Bounds are inclusive.
pub fn validate(latitude: f64, longitude: f64) -> Result<Coordinate> {
    if !latitude.is_finite() || !longitude.is_finite() {
        return Err(GeoportError::invalid_coordinate(format!(
            "latitude and longitude must be finite numbers (got {}, {})",
            latitude, longitude
        )));
    }
    if !LATITUDE_RANGE.contains(&latitude) {
        return Err(GeoportError::invalid_coordinate(format!(
            "latitude {} is outside [-90, 90]",
            latitude
        )));
    }
    if !LONGITUDE_RANGE.contains(&longitude) {
        return Err(GeoportError::invalid_coordinate(format!(
            "longitude {} is outside [-180, 180]",
            longitude
        )));
    }

    Ok(Coordinate {
        latitude,
        longitude,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_bounds_inclusive() {
        for (lat, lng) in [(90.0, 180.0), (-90.0, -180.0), (0.0, 0.0), (39.9042, 116.4074)] {
            let coordinate = validate(lat, lng).unwrap();
            assert_eq!(coordinate.latitude(), lat);
            assert_eq!(coordinate.longitude(), lng);
        }
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(matches!(
            validate(91.0, 0.0),
            Err(GeoportError::InvalidCoordinate(_))
        ));
        assert!(matches!(
            validate(-90.0001, 0.0),
            Err(GeoportError::InvalidCoordinate(_))
        ));
        assert!(matches!(
            validate(0.0, 180.5),
            Err(GeoportError::InvalidCoordinate(_))
        ));
        assert!(matches!(
            validate(0.0, -181.0),
            Err(GeoportError::InvalidCoordinate(_))
        ));
    }

    #[test]
    fn test_rejects_non_finite() {
        assert!(validate(f64::NAN, 0.0).is_err());
        assert!(validate(0.0, f64::INFINITY).is_err());
        assert!(validate(f64::NEG_INFINITY, f64::NAN).is_err());
    }

    #[test]
    fn test_proximity() {
        let a = validate(39.9042, 116.4074).unwrap();
        let b = validate(39.90425, 116.40745).unwrap();
        let c = validate(39.9052, 116.4074).unwrap();
        assert!(a.is_within(&b, 0.0001));
        assert!(!a.is_within(&c, 0.0001));
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Coordinate =
            serde_json::from_str(r#"{"latitude": 22.5431, "longitude": 114.0579}"#).unwrap();
        assert_eq!(ok.latitude(), 22.5431);

        let bad = serde_json::from_str::<Coordinate>(r#"{"latitude": 95.0, "longitude": 0.0}"#);
        assert!(bad.is_err());
    }
}
