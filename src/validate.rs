use crate::types::{RawPointRow, ValidPoint};
use std::fmt;

pub const DEFAULT_DESCRIPTION: &str = "N/A";

/// Why a row produced no marker. Rejections are expected in real data and are not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    MissingLatitude,
    MissingLongitude,
    InvalidLatitude,
    InvalidLongitude,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Rejection::MissingLatitude => "latitude is missing",
            Rejection::MissingLongitude => "longitude is missing",
            Rejection::InvalidLatitude => "latitude is not a number",
            Rejection::InvalidLongitude => "longitude is not a number",
        };
        f.write_str(reason)
    }
}

pub fn validate(row: &RawPointRow) -> Result<ValidPoint, Rejection> {
    let lat_text = non_empty(&row.latitude).ok_or(Rejection::MissingLatitude)?;
    let lon_text = non_empty(&row.longitude).ok_or(Rejection::MissingLongitude)?;

    let lat = parse_coordinate(lat_text).ok_or(Rejection::InvalidLatitude)?;
    let lon = parse_coordinate(lon_text).ok_or(Rejection::InvalidLongitude)?;

    let description = non_empty(&row.location_desc)
        .unwrap_or(DEFAULT_DESCRIPTION)
        .to_string();

    Ok(ValidPoint { lat, lon, description })
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Leading-prefix parse: `"43.9N"` reads as 43.9, text with no leading number is rejected.
/// "NaN" and "inf" are never taken, and overflow to infinity is rejected.
fn parse_coordinate(text: &str) -> Option<f64> {
    let prefix = numeric_prefix(text.trim_start());
    if prefix.is_empty() {
        return None;
    }
    prefix.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// The longest leading `[+-]digits[.digits][(e|E)[+-]digits]` run, or "" if it has no digits.
fn numeric_prefix(text: &str) -> &str {
    let bytes = text.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let int_end = digits_from(end);
    let mut mantissa_digits = int_end - end;
    end = int_end;

    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        mantissa_digits += frac_end - end - 1;
        if mantissa_digits > 0 {
            end = frac_end;
        }
    }
    if mantissa_digits == 0 {
        return "";
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }

    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(lat: Option<&str>, lon: Option<&str>, desc: Option<&str>) -> RawPointRow {
        RawPointRow {
            latitude: lat.map(str::to_string),
            longitude: lon.map(str::to_string),
            location_desc: desc.map(str::to_string),
        }
    }

    #[test]
    fn numeric_rows_are_accepted() {
        let cases = [("43.9", "-78.86"), ("0", "0"), ("-90", "180"), (" 43.91 ", "\t-78.8"), ("4.39e1", "-7.886E1")];
        for (lat, lon) in cases {
            let point = validate(&row(Some(lat), Some(lon), Some("Spot"))).unwrap();
            assert_eq!(point.lat, lat.trim().parse::<f64>().unwrap());
            assert_eq!(point.lon, lon.trim().parse::<f64>().unwrap());
            assert_eq!(point.description, "Spot");
        }
    }

    #[test]
    fn trailing_text_after_a_number_is_ignored() {
        let cases = [
            ("43.9N", 43.9),
            ("-78.86 W", -78.86),
            ("1e", 1.0),
            ("1.5e+", 1.5),
            ("+.5x", 0.5),
            ("12.", 12.0),
            ("  -3.25deg", -3.25),
        ];
        for (text, expected) in cases {
            let point = validate(&row(Some(text), Some(text), None)).unwrap();
            assert_eq!(point.lat, expected, "{:?}", text);
            assert_eq!(point.lon, expected, "{:?}", text);
        }
    }

    #[test]
    fn missing_fields_are_rejected_before_parsing() {
        assert_eq!(validate(&row(None, Some("-78.8"), None)), Err(Rejection::MissingLatitude));
        assert_eq!(validate(&row(Some(""), Some("-78.8"), None)), Err(Rejection::MissingLatitude));
        assert_eq!(validate(&row(Some("43.9"), None, None)), Err(Rejection::MissingLongitude));
        assert_eq!(validate(&row(Some("43.9"), Some(""), None)), Err(Rejection::MissingLongitude));
        // latitude is checked first even if it would also fail to parse
        assert_eq!(validate(&row(Some("abc"), Some(""), None)), Err(Rejection::MissingLongitude));
    }

    #[test]
    fn non_numeric_text_is_rejected() {
        assert_eq!(validate(&row(Some("abc"), Some("-78.8"), None)), Err(Rejection::InvalidLatitude));
        assert_eq!(validate(&row(Some("43.9"), Some("west"), None)), Err(Rejection::InvalidLongitude));
        assert_eq!(validate(&row(Some("   "), Some("-78.8"), None)), Err(Rejection::InvalidLatitude));
        assert_eq!(validate(&row(Some("NaN"), Some("-78.8"), None)), Err(Rejection::InvalidLatitude));
        assert_eq!(validate(&row(Some("43.9"), Some("inf"), None)), Err(Rejection::InvalidLongitude));
        assert_eq!(validate(&row(Some("."), Some("-78.8"), None)), Err(Rejection::InvalidLatitude));
        assert_eq!(validate(&row(Some("-"), Some("-78.8"), None)), Err(Rejection::InvalidLatitude));
        assert_eq!(validate(&row(Some("43.9"), Some("e5"), None)), Err(Rejection::InvalidLongitude));
        // overflow to infinity is not a coordinate
        assert_eq!(validate(&row(Some("1e400"), Some("-78.8"), None)), Err(Rejection::InvalidLatitude));
    }

    #[test]
    fn description_defaults_when_absent_or_empty() {
        let absent = validate(&row(Some("43.9"), Some("-78.86"), None)).unwrap();
        assert_eq!(absent.description, DEFAULT_DESCRIPTION);

        let empty = validate(&row(Some("43.9"), Some("-78.86"), Some(""))).unwrap();
        assert_eq!(empty.description, "N/A");
    }

    #[test]
    fn rejection_messages() {
        assert_eq!(Rejection::InvalidLatitude.to_string(), "latitude is not a number");
        assert_eq!(Rejection::MissingLongitude.to_string(), "longitude is missing");
    }
}
