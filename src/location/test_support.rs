/// Hand-built TIFF fixtures for exercising the EXIF strategy
///
/// Real geotagged photos are too heavy for the test suite, so these helpers
/// assemble a minimal little-endian TIFF whose IFD0 points at a GPS IFD with
/// latitude/longitude rationals and hemisphere refs.

type Axis = ([u32; 2], [u32; 2], [u32; 2], u8);

/// Build a TIFF byte buffer carrying the given GPS latitude/longitude.
///
/// Each axis is (degrees, minutes, seconds) as numerator/denominator pairs,
/// plus the hemisphere ref byte (b'N'/b'S'/b'E'/b'W').
pub fn tiff_with_gps(lat: Axis, lng: Axis) -> Vec<u8> {
    // Fixed layout:
    //   8: IFD0 (1 entry: GPSInfo pointer) -> 26
    //  26: GPS IFD (4 entries)             -> rational data at 80 and 104
    const GPS_IFD_OFFSET: u32 = 26;
    const LAT_DATA_OFFSET: u32 = 80;
    const LNG_DATA_OFFSET: u32 = 104;

    let mut out = Vec::with_capacity(128);

    // TIFF header, little endian
    out.extend_from_slice(b"II");
    push_u16(&mut out, 42);
    push_u32(&mut out, 8); // IFD0 offset

    // IFD0: a single GPSInfo (0x8825) entry pointing at the GPS IFD
    push_u16(&mut out, 1);
    push_u16(&mut out, 0x8825);
    push_u16(&mut out, 4); // LONG
    push_u32(&mut out, 1);
    push_u32(&mut out, GPS_IFD_OFFSET);
    push_u32(&mut out, 0); // no next IFD

    // GPS IFD: LatitudeRef, Latitude, LongitudeRef, Longitude
    push_u16(&mut out, 4);
    push_ascii_entry(&mut out, 0x0001, lat.3);
    push_rational_entry(&mut out, 0x0002, LAT_DATA_OFFSET);
    push_ascii_entry(&mut out, 0x0003, lng.3);
    push_rational_entry(&mut out, 0x0004, LNG_DATA_OFFSET);
    push_u32(&mut out, 0); // no next IFD

    // Rational payloads (3 x num/den per axis)
    for pair in [lat.0, lat.1, lat.2, lng.0, lng.1, lng.2] {
        push_u32(&mut out, pair[0]);
        push_u32(&mut out, pair[1]);
    }

    debug_assert_eq!(out.len(), 128);
    out
}

/// ASCII entry with the 2-byte value ("N\0" etc.) stored inline
fn push_ascii_entry(out: &mut Vec<u8>, tag: u16, hemisphere: u8) {
    push_u16(out, tag);
    push_u16(out, 2); // ASCII
    push_u32(out, 2);
    out.extend_from_slice(&[hemisphere, 0, 0, 0]);
}

/// RATIONAL entry whose 3-element payload lives at `data_offset`
fn push_rational_entry(out: &mut Vec<u8>, tag: u16, data_offset: u32) {
    push_u16(out, tag);
    push_u16(out, 5); // RATIONAL
    push_u32(out, 3);
    push_u32(out, data_offset);
}

fn push_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn push_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}
