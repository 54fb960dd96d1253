/// Embedded GPS tag extraction
///
/// First strategy of the location resolver: read GPSLatitude/GPSLongitude
/// (plus their hemisphere refs) straight out of the image bytes. Anything
/// short of a complete, well-formed pair — no EXIF segment, missing tags,
/// zero denominators, out-of-range values — is "not found", never an error,
/// so the resolver can fall through to the device fix.

use exif::{In, Tag, Value};
use std::io::Cursor;

use crate::state::data::Coordinate;

/// Extract a GPS coordinate from encoded image bytes
pub fn gps_from_bytes(bytes: &[u8]) -> Option<Coordinate> {
    let mut cursor = Cursor::new(bytes);
    let reader = exif::Reader::new().read_from_container(&mut cursor).ok()?;

    let lat = read_axis(&reader, Tag::GPSLatitude, Tag::GPSLatitudeRef, 90.0)?;
    let lng = read_axis(&reader, Tag::GPSLongitude, Tag::GPSLongitudeRef, 180.0)?;

    Some(Coordinate::new(lat, lng))
}

/// Read one axis (latitude or longitude) as signed decimal degrees
fn read_axis(reader: &exif::Exif, value_tag: Tag, ref_tag: Tag, limit: f64) -> Option<f64> {
    let dms = match &reader.get_field(value_tag, In::PRIMARY)?.value {
        Value::Rational(parts) if parts.len() >= 3 => {
            [parts[0].to_f64(), parts[1].to_f64(), parts[2].to_f64()]
        }
        _ => return None,
    };

    let hemisphere = match &reader.get_field(ref_tag, In::PRIMARY)?.value {
        Value::Ascii(strings) => *strings.first()?.first()? as char,
        _ => return None,
    };

    let degrees = dms_to_decimal(dms, hemisphere)?;
    // Reject values outside the valid range for this axis
    if degrees.abs() > limit {
        return None;
    }
    Some(degrees)
}

/// Convert a degrees/minutes/seconds triplet plus hemisphere into signed
/// decimal degrees. Returns None on non-finite parts (e.g. a zero
/// denominator in the source rational) or an unknown hemisphere letter.
fn dms_to_decimal(dms: [f64; 3], hemisphere: char) -> Option<f64> {
    if dms.iter().any(|part| !part.is_finite() || *part < 0.0) {
        return None;
    }

    let decimal = dms[0] + dms[1] / 60.0 + dms[2] / 3600.0;

    match hemisphere.to_ascii_uppercase() {
        'N' | 'E' => Some(decimal),
        'S' | 'W' => Some(-decimal),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dms_conversion() {
        // 26° 27' 9" N = 26.4525
        let lat = dms_to_decimal([26.0, 27.0, 9.0], 'N').unwrap();
        assert!((lat - 26.4525).abs() < 1e-9);

        // Southern/western hemispheres are negative
        let lat = dms_to_decimal([26.0, 27.0, 9.0], 'S').unwrap();
        assert!((lat + 26.4525).abs() < 1e-9);
        let lng = dms_to_decimal([87.0, 16.0, 18.48], 'W').unwrap();
        assert!((lng + 87.2718).abs() < 1e-9);
    }

    #[test]
    fn test_dms_rejects_bad_input() {
        assert_eq!(dms_to_decimal([f64::INFINITY, 0.0, 0.0], 'N'), None);
        assert_eq!(dms_to_decimal([f64::NAN, 0.0, 0.0], 'N'), None);
        assert_eq!(dms_to_decimal([26.0, 27.0, 9.0], 'X'), None);
        assert_eq!(dms_to_decimal([-5.0, 0.0, 0.0], 'N'), None);
    }

    #[test]
    fn test_garbage_bytes_are_not_found() {
        assert_eq!(gps_from_bytes(b"definitely not an image"), None);
        assert_eq!(gps_from_bytes(&[]), None);
    }

    #[test]
    fn test_jpeg_without_exif_is_not_found() {
        // Minimal JPEG: SOI + EOI, no APP1 segment
        assert_eq!(gps_from_bytes(&[0xFF, 0xD8, 0xFF, 0xD9]), None);
    }

    #[test]
    fn test_extracts_gps_from_tiff_with_gps_ifd() {
        let bytes = crate::location::test_support::tiff_with_gps(
            ([26, 1], [27, 1], [9, 1], b'N'),
            ([87, 1], [16, 1], [1848, 100], b'E'),
        );

        let coord = gps_from_bytes(&bytes).expect("GPS tags should parse");
        assert!((coord.lat - 26.4525).abs() < 1e-6);
        assert!((coord.lng - 87.2718).abs() < 1e-6);
    }

    #[test]
    fn test_zero_denominator_is_not_found() {
        let bytes = crate::location::test_support::tiff_with_gps(
            ([26, 0], [27, 1], [9, 1], b'N'),
            ([87, 1], [16, 1], [1848, 100], b'E'),
        );
        assert_eq!(gps_from_bytes(&bytes), None);
    }
}
