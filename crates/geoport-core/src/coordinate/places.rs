use super::model::Coordinate;

/// Name recorded for coordinates that match no well-known place.
pub const CUSTOM_LOCATION_NAME: &str = "Custom Location";

/// Match tolerance in degrees, applied to both axes.
const PLACE_MATCH_THRESHOLD: f64 = 0.01;

struct KnownPlace {
    name: &'static str,
    latitude: f64,
    longitude: f64,
}

const KNOWN_PLACES: &[KnownPlace] = &[
    KnownPlace {
        name: "Beijing",
        latitude: 39.9042,
        longitude: 116.4074,
    },
    KnownPlace {
        name: "Shanghai",
        latitude: 31.2304,
        longitude: 121.4737,
    },
    KnownPlace {
        name: "Shenzhen",
        latitude: 22.5431,
        longitude: 114.0579,
    },
    KnownPlace {
        name: "Hong Kong",
        latitude: 22.3193,
        longitude: 114.1694,
    },
    KnownPlace {
        name: "New York",
        latitude: 40.7128,
        longitude: -74.0060,
    },
    KnownPlace {
        name: "London",
        latitude: 51.5074,
        longitude: -0.1278,
    },
    KnownPlace {
        name: "Tokyo",
        latitude: 35.6762,
        longitude: 139.6503,
    },
    KnownPlace {
        name: "Paris",
        latitude: 48.8566,
        longitude: 2.3522,
    },
];

/// Returns the name of the first known place within 0.01° of `coordinate`,
/// or [`CUSTOM_LOCATION_NAME`].
pub fn describe(coordinate: &Coordinate) -> &'static str {
    KNOWN_PLACES
        .iter()
        .find(|place| {
            (coordinate.latitude() - place.latitude).abs() < PLACE_MATCH_THRESHOLD
                && (coordinate.longitude() - place.longitude).abs() < PLACE_MATCH_THRESHOLD
        })
        .map(|place| place.name)
        .unwrap_or(CUSTOM_LOCATION_NAME)
}
