//! NMEA sentences echoed by the modem
//!
//! Only the satellites-in-view count of `$GPGSV` is used, as a fallback
//! until the vendor sentence reports a count of its own.

/// Sentence prefixes accepted from the modem
pub const NMEA_PREFIXES: [&str; 4] = ["$GPGGA", "$GPGSA", "$GPGSV", "$GPRMC"];

/// Sentence carrying the satellites-in-view count
pub const SATELLITES_SENTENCE: &str = "$GPGSV";

/// Satellites in view from a `$GPGSV` sentence.
///
/// Format: `$GPGSV,total_msgs,msg_num,sats_in_view,...*cs`
///
/// Returns `None` unless the field after the third comma holds a positive
/// integer.
pub fn satellites_in_view(line: &str) -> Option<u32> {
    if !line.starts_with(SATELLITES_SENTENCE) {
        return None;
    }

    let mut rest = line;
    for _ in 0..3 {
        let comma = rest.find(',')?;
        rest = &rest[comma + 1..];
    }

    let end = rest.find(|c: char| c == ',' || c == '*').unwrap_or(rest.len());

    rest[..end]
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|count| *count > 0)
}
