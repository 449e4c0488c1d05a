use chrono::{DateTime, NaiveDateTime, Utc};

use crate::error::{Error, Result};

/// Added to an explicit start so the request can be processed before the window opens.
pub const PROCESSING_MARGIN_S: i64 = 10;

/// Length of the window generated when start or end is missing.
pub const GENERATED_WINDOW_S: i64 = 3600;

const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%:z", "%Y-%m-%dT%H:%M:%S%.f%:z"];
const NAIVE_FORMATS: [&str; 4] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"];

/// Parses an ISO 8601 date/time into UTC.
///
/// Accepts `Z` and `±hh:mm` offsets as well as timestamps without offset,
/// which are taken as UTC. Single-digit days and hours are tolerated.
pub fn parse_iso8601(name: &str, value: &str) -> Result<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }

    let with_offset = match value.strip_suffix('Z').or_else(|| value.strip_suffix('z')) {
        Some(stripped) => format!("{}+00:00", stripped),
        None => value.to_string(),
    };
    for format in OFFSET_FORMATS {
        if let Ok(parsed) = DateTime::parse_from_str(&with_offset, format) {
            return Ok(parsed.with_timezone(&Utc));
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(parsed.and_utc());
        }
    }

    Err(Error::invalid_attribute(name, format!("'{}' is not an ISO 8601 date/time", value)))
}

/// Turns optional start/end timestamps into epoch seconds.
///
/// An explicit start gets [`PROCESSING_MARGIN_S`] added. When either bound is
/// missing the whole window is generated: `now + 10 s` for one hour.
pub fn time_constraints(start_time: Option<&str>, end_time: Option<&str>, now_s: i64) -> Result<(i64, i64)> {
    let start_time = start_time.filter(|value| !value.trim().is_empty());
    let end_time = end_time.filter(|value| !value.trim().is_empty());

    match (start_time, end_time) {
        (Some(start), Some(end)) => {
            let start_s = parse_iso8601("start_time", start)?.timestamp() + PROCESSING_MARGIN_S;
            let end_s = parse_iso8601("end_time", end)?.timestamp();
            Ok((start_s, end_s))
        }
        (start, end) => {
            // A lone bound is still validated before the window is generated.
            if let Some(start) = start {
                parse_iso8601("start_time", start)?;
            }
            if let Some(end) = end {
                parse_iso8601("end_time", end)?;
            }

            let start_s = now_s + PROCESSING_MARGIN_S;
            log::debug!("Time window not fully specified, generating {}..{}", start_s, start_s + GENERATED_WINDOW_S);
            Ok((start_s, start_s + GENERATED_WINDOW_S))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;

    #[test]
    fn parses_offsets_and_zulu() {
        let zulu = parse_iso8601("t", "2016-09-01T08:32:10Z").unwrap();
        let plus_two = parse_iso8601("t", "2016-09-01T10:32:10+02:00").unwrap();
        let minus_one = parse_iso8601("t", "2016-09-01T07:32:10-01:00").unwrap();

        assert_eq!(zulu, plus_two);
        assert_eq!(zulu, minus_one);
        assert_eq!(zulu.timestamp(), 1_472_718_730);
    }

    #[test]
    fn tolerates_single_digit_fields_and_naive_times() {
        let loose = parse_iso8601("t", "2016-09-1T8:32:10+02:00").unwrap();
        assert_eq!(loose, parse_iso8601("t", "2016-09-01T06:32:10Z").unwrap());

        let naive = parse_iso8601("t", "2016-09-01T06:32:10").unwrap();
        assert_eq!(naive, loose);
    }

    #[test]
    fn rejects_garbage() {
        let err = parse_iso8601("start_time", "tomorrow").unwrap_err();
        assert!(matches!(err, Error::InvalidAttribute { ref name, .. } if name == "start_time"));
    }

    #[test]
    fn explicit_window_adds_processing_margin_to_start() {
        let (start, end) = time_constraints(Some("2030-01-01T00:00:00Z"), Some("2030-01-02T00:00:00Z"), NOW).unwrap();

        let expected_start = parse_iso8601("t", "2030-01-01T00:00:00Z").unwrap().timestamp();
        assert_eq!(start, expected_start + PROCESSING_MARGIN_S);
        assert_eq!(end, expected_start + 24 * 3600);
    }

    #[test]
    fn missing_bound_generates_one_hour_window() {
        for (start, end) in [(None, None), (Some("2030-01-01T00:00:00Z"), None), (None, Some("2030-01-01T00:00:00Z")), (Some(""), Some(" "))] {
            let window = time_constraints(start, end, NOW).unwrap();
            assert_eq!(window, (NOW + 10, NOW + 10 + 3600));
        }
    }

    #[test]
    fn invalid_lone_bound_is_reported() {
        assert!(time_constraints(Some("not a date"), None, NOW).is_err());
    }
}
