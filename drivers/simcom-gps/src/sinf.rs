//! Vendor GPS status sentence (`+CGPSINF`)
//!
//! Format: `+CGPSINF: status,lat,lon,alt,yyyymmddhhmmss.sss,fix_type,sats,...`
//!
//! Coordinates come as concatenated degrees and minutes (`DDMM.MMMMMM` /
//! `DDDMM.MMMMMM`) with no hemisphere indicator, so the sign is applied by a
//! [`HemispherePolicy`].

use core::fmt;

use libm::floor;
#[cfg(feature = "logging")]
use log::warn;

use crate::GpsTimestamp;

/// Line prefixes of the vendor sentence. An optional single space may follow.
pub const SINF_PREFIXES: [&str; 2] = ["+CGPSINF:", "SINF:"];

/// Maximum number of fields scanned from one sentence
pub const MAX_FIELDS: usize = 10;

/// Fields required before anything is taken from a sentence
pub const MIN_FIELDS: usize = 7;

/// Raw coordinate fields this short or shorter are treated as "no fix"
const MIN_COORDINATE_LEN: usize = 4;

/// Latitudes below this (and above zero) are assumed southern
pub const SOUTHERN_LATITUDE_LIMIT: f64 = 60.0;

/// Longitudes below this (and above zero) are assumed western
pub const WESTERN_LONGITUDE_LIMIT: f64 = 180.0;

const FIELD_STATUS: usize = 0;
const FIELD_LATITUDE: usize = 1;
const FIELD_LONGITUDE: usize = 2;
const FIELD_ALTITUDE: usize = 3;
const FIELD_DATETIME: usize = 4;
const FIELD_SATELLITES: usize = 6;

/// Sign convention for coordinates that carry no hemisphere indicator.
///
/// The modem reports unsigned magnitudes. The default policy assumes the
/// device operates in the southern and western hemispheres (South America),
/// which is a deployment assumption rather than something the sentence
/// encodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HemispherePolicy {
    /// Negate latitudes in (0, 60)
    pub southern: bool,
    /// Negate longitudes in (0, 180)
    pub western: bool,
}

impl HemispherePolicy {
    /// Southern + western hemisphere
    pub const SOUTH_WEST: Self = Self {
        southern: true,
        western: true,
    };

    /// Leave magnitudes unsigned
    pub const NONE: Self = Self {
        southern: false,
        western: false,
    };

    pub fn apply_latitude(&self, latitude: f64) -> f64 {
        if self.southern && latitude > 0.0 && latitude < SOUTHERN_LATITUDE_LIMIT {
            -latitude
        } else {
            latitude
        }
    }

    pub fn apply_longitude(&self, longitude: f64) -> f64 {
        if self.western && longitude > 0.0 && longitude < WESTERN_LONGITUDE_LIMIT {
            -longitude
        } else {
            longitude
        }
    }
}

impl Default for HemispherePolicy {
    fn default() -> Self {
        Self::SOUTH_WEST
    }
}

/// Errors from vendor sentence parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinfError {
    /// Line does not start with a vendor prefix
    NotSinf,
    /// Fewer than [`MIN_FIELDS`] fields
    Incomplete { fields: usize },
}

impl fmt::Display for SinfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinfError::NotSinf => write!(f, "not a +CGPSINF sentence"),
            SinfError::Incomplete { fields } => {
                write!(f, "incomplete sentence: {} of {} fields", fields, MIN_FIELDS)
            }
        }
    }
}

/// Comma-separated fields of one sentence.
///
/// Holds at most [`MAX_FIELDS`] slices into the input; anything past that is
/// never scanned. Missing fields read as empty strings.
#[derive(Debug, Clone, Copy)]
pub struct SinfFields<'a> {
    slots: [&'a str; MAX_FIELDS],
    len: usize,
}

impl<'a> SinfFields<'a> {
    pub fn split(body: &'a str) -> Self {
        let mut slots = [""; MAX_FIELDS];
        let mut len = 0;

        for (slot, field) in slots.iter_mut().zip(body.split(',')) {
            *slot = field.trim();
            len += 1;
        }

        Self { slots, len }
    }

    /// Number of fields present
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Field at `index`, or `""` when the sentence ended before it
    pub fn get(&self, index: usize) -> &'a str {
        if index < self.len {
            self.slots[index]
        } else {
            ""
        }
    }
}

/// Position part of a sentence that passed the validity gate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SinfPosition {
    pub status: u32,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: Option<f64>,
    pub timestamp: Option<GpsTimestamp>,
}

/// Result of parsing one complete sentence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SinfReport {
    /// Satellite count, always present (0 if unparseable)
    pub satellites: u32,
    /// Position, `None` when either coordinate failed the validity gate
    pub position: Option<SinfPosition>,
}

/// Remove the vendor prefix and the optional space after it
pub fn strip_prefix(line: &str) -> Option<&str> {
    SINF_PREFIXES
        .iter()
        .find_map(|prefix| line.strip_prefix(prefix))
        .map(|rest| rest.strip_prefix(' ').unwrap_or(rest))
}

/// Parse a vendor sentence.
///
/// # Errors
///
/// [`SinfError::NotSinf`] if the prefix is missing and
/// [`SinfError::Incomplete`] if fewer than seven fields are present. Invalid
/// coordinates are not an error: the report then carries only the
/// satellite count.
pub fn parse(line: &str, policy: &HemispherePolicy) -> Result<SinfReport, SinfError> {
    let body = strip_prefix(line).ok_or(SinfError::NotSinf)?;
    let fields = SinfFields::split(body);

    if fields.len() < MIN_FIELDS {
        return Err(SinfError::Incomplete {
            fields: fields.len(),
        });
    }

    let satellites = parse_count(fields.get(FIELD_SATELLITES));

    let latitude = parse_raw_coordinate(fields.get(FIELD_LATITUDE));
    let longitude = parse_raw_coordinate(fields.get(FIELD_LONGITUDE));

    let position = match (latitude, longitude) {
        (Some(lat_raw), Some(lon_raw)) => Some(SinfPosition {
            status: parse_count(fields.get(FIELD_STATUS)),
            latitude: policy.apply_latitude(convert_sinf_coordinate(lat_raw)),
            longitude: policy.apply_longitude(convert_sinf_coordinate(lon_raw)),
            altitude: parse_altitude(fields.get(FIELD_ALTITUDE)),
            timestamp: GpsTimestamp::parse(fields.get(FIELD_DATETIME)),
        }),
        _ => {
            #[cfg(feature = "logging")]
            warn!(
                "SINF without valid coordinates (lat='{}', lon='{}'), keeping last fix",
                fields.get(FIELD_LATITUDE),
                fields.get(FIELD_LONGITUDE)
            );
            None
        }
    };

    Ok(SinfReport {
        satellites,
        position,
    })
}

/// Convert `DDMM.MMMM` / `DDDMM.MMMM` to decimal degrees.
///
/// No sign is applied.
pub fn convert_sinf_coordinate(raw: f64) -> f64 {
    let degrees = floor(raw / 100.0);
    let minutes = raw - degrees * 100.0;
    degrees + minutes / 60.0
}

/// Raw coordinate value if the field looks like a real fix
///
/// `inf`/`NaN` spellings parse as floats and must not reach the fix.
fn parse_raw_coordinate(field: &str) -> Option<f64> {
    if field.len() <= MIN_COORDINATE_LEN {
        return None;
    }

    field
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value != 0.0)
}

fn parse_altitude(field: &str) -> Option<f64> {
    if field.is_empty() {
        return None;
    }
    field.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Leading decimal digits as an integer, 0 when there are none
fn parse_count(field: &str) -> u32 {
    let digits = field
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(field, |(idx, _)| &field[..idx]);

    digits.parse::<u32>().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE: &str =
        "SINF: 0,2336.925300,4634.237600,760.600000,20250610122555.000,0,12,1.055640,24.139999";

    #[test]
    fn test_convert_coordinate() {
        let lat = convert_sinf_coordinate(2336.9253);
        assert!((lat - 23.615421667).abs() < 1e-6);

        let lon = convert_sinf_coordinate(4634.2376);
        assert!((lon - 46.570626667).abs() < 1e-6);

        // Three-digit degrees
        let lon = convert_sinf_coordinate(12158.3416);
        assert!((lon - 121.97236).abs() < 1e-6);
    }

    #[test]
    fn test_convert_coordinate_monotonic() {
        let mut previous = -1.0;
        for degrees in 0..90 {
            for minutes in [0.0, 0.000001, 12.5, 30.25, 59.999999] {
                let raw = f64::from(degrees) * 100.0 + minutes;
                let value = convert_sinf_coordinate(raw);
                let expected = f64::from(degrees) + minutes / 60.0;
                assert!((value - expected).abs() < 1e-9, "wrong value at {}", raw);
                assert!(value > previous, "not monotonic at {}", raw);
                previous = value;
            }
        }
    }

    #[test]
    fn test_hemisphere_policy_bounds() {
        let policy = HemispherePolicy::default();
        assert_eq!(policy.apply_latitude(23.5), -23.5);
        assert_eq!(policy.apply_latitude(0.0), 0.0);
        assert_eq!(policy.apply_latitude(60.0), 60.0);
        assert_eq!(policy.apply_latitude(75.2), 75.2);
        assert_eq!(policy.apply_longitude(46.5), -46.5);
        assert_eq!(policy.apply_longitude(180.0), 180.0);
    }

    #[test]
    fn test_hemisphere_policy_disabled() {
        let policy = HemispherePolicy::NONE;
        assert_eq!(policy.apply_latitude(23.5), 23.5);
        assert_eq!(policy.apply_longitude(46.5), 46.5);
    }

    #[test]
    fn test_strip_prefix_variants() {
        assert_eq!(strip_prefix("SINF: 1,2"), Some("1,2"));
        assert_eq!(strip_prefix("SINF:1,2"), Some("1,2"));
        assert_eq!(strip_prefix("+CGPSINF: 1,2"), Some("1,2"));
        assert_eq!(strip_prefix("+CGPSINF:1,2"), Some("1,2"));
        assert_eq!(strip_prefix("sinf: 1,2"), None);
        assert_eq!(strip_prefix("$GPGSV,1"), None);
    }

    #[test]
    fn test_fields_bounded_and_padded() {
        let fields = SinfFields::split("a,b,,d");
        assert_eq!(fields.len(), 4);
        assert_eq!(fields.get(2), "");
        assert_eq!(fields.get(3), "d");
        assert_eq!(fields.get(9), "");

        let fields = SinfFields::split("0,1,2,3,4,5,6,7,8,9,10,11");
        assert_eq!(fields.len(), MAX_FIELDS);
        assert_eq!(fields.get(9), "9");
        assert_eq!(fields.get(10), "");

        let fields = SinfFields::split("");
        assert_eq!(fields.len(), 1);
    }

    #[test]
    fn test_parse_example_sentence() {
        let report = parse(EXAMPLE, &HemispherePolicy::default()).unwrap();
        assert_eq!(report.satellites, 12);

        let position = report.position.unwrap();
        assert_eq!(position.status, 0);
        assert!((position.latitude - (-23.615421)).abs() < 1e-5);
        assert!((position.longitude - (-46.570627)).abs() < 1e-5);
        assert!((position.altitude.unwrap() - 760.6).abs() < 1e-9);

        let ts = position.timestamp.unwrap();
        assert_eq!(ts.date().to_string(), "10/06/2025");
        assert_eq!(ts.time().to_string(), "12:25:55");
    }

    #[test]
    fn test_parse_incomplete() {
        let err = parse("SINF: 0,2336.925300,4634.237600,760.6,2025", &Default::default());
        assert_eq!(err, Err(SinfError::Incomplete { fields: 5 }));
    }

    #[test]
    fn test_parse_rejects_foreign_line() {
        assert_eq!(
            parse("$GPGGA,1,2,3", &Default::default()),
            Err(SinfError::NotSinf)
        );
    }

    #[test]
    fn test_no_fix_keeps_satellites() {
        let report = parse("+CGPSINF: 0,0.000000,0.000000,,,0,3", &Default::default()).unwrap();
        assert_eq!(report.satellites, 3);
        assert!(report.position.is_none());

        // Too short to be a coordinate
        let report = parse("SINF: 0,12.5,4634.2376,,,0,4", &Default::default()).unwrap();
        assert!(report.position.is_none());

        // Empty coordinate
        let report = parse("SINF: 1,,4634.2376,,,0,5", &Default::default()).unwrap();
        assert!(report.position.is_none());
        assert_eq!(report.satellites, 5);
    }

    #[test]
    fn test_non_finite_fields_rejected() {
        for line in [
            "SINF: 0,1e999,4634.237600,,,0,5",
            "SINF: 0,infinity,4634.237600,,,0,5",
            "SINF: 0,2336.925300,NaN00,,,0,5",
        ] {
            let report = parse(line, &Default::default()).unwrap();
            assert!(report.position.is_none(), "{}", line);
            assert_eq!(report.satellites, 5);
        }

        let report = parse("SINF: 0,2336.9253,4634.2376,inf,,0,8", &Default::default()).unwrap();
        assert!(report.position.unwrap().altitude.is_none());
    }

    #[test]
    fn test_optional_fields_absent() {
        let report = parse("SINF: 1,2336.9253,4634.2376,,2025061,0,8", &Default::default()).unwrap();
        let position = report.position.unwrap();
        assert!(position.altitude.is_none());
        assert!(position.timestamp.is_none());
        assert_eq!(position.status, 1);
    }

    #[test]
    fn test_parse_count_like_atoi() {
        assert_eq!(parse_count("12"), 12);
        assert_eq!(parse_count("07.0"), 7);
        assert_eq!(parse_count(""), 0);
        assert_eq!(parse_count("x3"), 0);
    }
}
