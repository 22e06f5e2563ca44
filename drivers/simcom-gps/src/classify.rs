//! Response classification
//!
//! Every line coming back from the modem goes to exactly one handler,
//! chosen by a case-sensitive prefix match. Lines matching neither family
//! are modem chatter (`OK`, echoes, `+CGPSSTATUS: ...`) and only logged.

#[cfg(feature = "logging")]
use log::{debug, warn};

use crate::nmea::{self, NMEA_PREFIXES};
use crate::sinf::{self, HemispherePolicy, SinfError, SINF_PREFIXES};
use crate::GpsState;

/// Which parser a line belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Vendor `+CGPSINF` / `SINF` status sentence
    Sinf,
    /// One of the recognized NMEA sentences
    Nmea,
    /// Anything else
    Unclassified,
}

/// What a dispatched line did to the GPS state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Valid fix stored
    FixUpdated { satellites: u32 },
    /// Sentence complete but coordinates invalid; only satellites stored
    SatellitesOnly { satellites: u32 },
    /// Sentence too short, nothing stored
    Incomplete { fields: usize },
    /// `$GPGSV` count adopted as the first known satellite count
    SatellitesAdopted { satellites: u32 },
    /// Recognized NMEA sentence with nothing to take from it
    NmeaIgnored,
    /// Not a GPS sentence
    Unclassified,
}

pub fn classify(line: &str) -> LineKind {
    if SINF_PREFIXES.iter().any(|prefix| line.starts_with(prefix)) {
        LineKind::Sinf
    } else if NMEA_PREFIXES.iter().any(|prefix| line.starts_with(prefix)) {
        LineKind::Nmea
    } else {
        LineKind::Unclassified
    }
}

/// Classify `line` and fold it into `state`.
///
/// Never fails: malformed sentences leave the state untouched and are
/// reported through the returned [`Dispatch`].
pub fn dispatch(line: &str, state: &mut GpsState, policy: &HemispherePolicy) -> Dispatch {
    match classify(line) {
        LineKind::Sinf => match sinf::parse(line, policy) {
            Ok(report) => {
                state.apply(&report);
                if report.position.is_some() {
                    Dispatch::FixUpdated {
                        satellites: report.satellites,
                    }
                } else {
                    Dispatch::SatellitesOnly {
                        satellites: report.satellites,
                    }
                }
            }
            Err(SinfError::Incomplete { fields }) => {
                #[cfg(feature = "logging")]
                warn!("Incomplete GPS sentence ({} fields): {}", fields, line);
                Dispatch::Incomplete { fields }
            }
            Err(SinfError::NotSinf) => Dispatch::Unclassified,
        },
        LineKind::Nmea => match nmea::satellites_in_view(line) {
            Some(satellites) if state.adopt_satellites(satellites) => {
                Dispatch::SatellitesAdopted { satellites }
            }
            _ => Dispatch::NmeaIgnored,
        },
        LineKind::Unclassified => {
            #[cfg(feature = "logging")]
            debug!("modem: {}", line);
            Dispatch::Unclassified
        }
    }
}
