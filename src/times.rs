//! Parsing and display of show start times.

use serde::Serializer;
use time::{Format, OffsetDateTime, PrimitiveDateTime, UtcOffset};

use crate::errors::BookingError;

/// Used on venue and artist pages.
pub const DETAIL_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Used in the list of all shows.
pub const LISTING_FORMAT: &str = "%m/%d/%Y";

/// Naive formats accepted from forms, tried in order. The second is
/// what browsers submit for `datetime-local` inputs.
const NAIVE_INPUT_FORMATS: &[&str] = &[DETAIL_FORMAT, "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

/// Parses a submitted start time. Times without an offset are taken to
/// be in UTC.
pub fn parse_start_time(value: &str) -> Result<OffsetDateTime, BookingError> {
    let value = value.trim();

    if let Ok(parsed) = OffsetDateTime::parse(value, Format::Rfc3339) {
        return Ok(parsed.to_offset(UtcOffset::UTC));
    }

    NAIVE_INPUT_FORMATS
        .iter()
        .find_map(|format| PrimitiveDateTime::parse(value, *format).ok())
        .map(PrimitiveDateTime::assume_utc)
        .ok_or_else(|| BookingError::InvalidStartTime(value.to_owned()))
}

pub fn format_detailed(time: &OffsetDateTime) -> String {
    time.to_offset(UtcOffset::UTC).format(DETAIL_FORMAT)
}

pub fn format_listing(time: &OffsetDateTime) -> String {
    time.to_offset(UtcOffset::UTC).format(LISTING_FORMAT)
}

/// Serializes a start time with [`DETAIL_FORMAT`].
pub fn serialize_detailed<S: Serializer>(time: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_detailed(time))
}

/// Serializes a start time with [`LISTING_FORMAT`].
pub fn serialize_listing<S: Serializer>(time: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_listing(time))
}
