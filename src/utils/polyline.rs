//! Encoded polyline format (5 decimal places, zig-zag deltas in 5-bit ASCII chunks).

use crate::models::Coordinate;

const PRECISION: f64 = 1e5;
const CHUNK_BITS: u32 = 5;
const CHUNK_MASK: i64 = 0x1f;
const CONTINUATION: i64 = 0x20;
const ASCII_OFFSET: u8 = 63;

/// Decodes a polyline. Truncated or overflowing input yields the coordinates decoded so far.
pub fn decode(encoded: &str) -> Vec<Coordinate> {
    let bytes = encoded.as_bytes();
    let mut coords = Vec::new();
    let mut index = 0;
    let mut lat: i64 = 0;
    let mut lng: i64 = 0;

    while index < bytes.len() {
        let Some(d_lat) = next_value(bytes, &mut index) else {
            break;
        };
        let Some(d_lng) = next_value(bytes, &mut index) else {
            break;
        };
        let (Some(next_lat), Some(next_lng)) = (lat.checked_add(d_lat), lng.checked_add(d_lng))
        else {
            break;
        };
        lat = next_lat;
        lng = next_lng;
        coords.push(Coordinate::new(lat as f64 / PRECISION, lng as f64 / PRECISION));
    }

    coords
}

/// Reads one zig-zag value. `None` when the stream ends mid-value.
fn next_value(bytes: &[u8], index: &mut usize) -> Option<i64> {
    let mut result: i64 = 0;
    let mut shift: u32 = 0;

    loop {
        let byte = *bytes.get(*index)?;
        *index += 1;
        // Bytes below the alphabet are garbage; treat them as end of stream.
        let chunk = i64::from(byte.checked_sub(ASCII_OFFSET)?);
        if shift >= 60 {
            return None;
        }
        result |= (chunk & CHUNK_MASK) << shift;
        shift += CHUNK_BITS;
        if chunk & CONTINUATION == 0 {
            break;
        }
    }

    Some(if result & 1 != 0 {
        !(result >> 1)
    } else {
        result >> 1
    })
}

pub fn encode(coords: &[Coordinate]) -> String {
    let mut out = String::new();
    let mut prev_lat: i64 = 0;
    let mut prev_lng: i64 = 0;

    for c in coords {
        let lat = (c.lat * PRECISION).round() as i64;
        let lng = (c.lng * PRECISION).round() as i64;
        push_value(&mut out, lat - prev_lat);
        push_value(&mut out, lng - prev_lng);
        prev_lat = lat;
        prev_lng = lng;
    }

    out
}

fn push_value(out: &mut String, value: i64) {
    let mut v = if value < 0 { !(value << 1) } else { value << 1 };
    while v >= CONTINUATION {
        out.push(((CONTINUATION | (v & CHUNK_MASK)) as u8 + ASCII_OFFSET) as char);
        v >>= CHUNK_BITS;
    }
    out.push((v as u8 + ASCII_OFFSET) as char);
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // Reference route from the published algorithm description.
    const REFERENCE: &str = "_p~iF~ps|U_ulLnnqC_mqNvxq`@";

    fn assert_close(a: &[Coordinate], b: &[Coordinate]) {
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b) {
            assert!((x.lat - y.lat).abs() < 1e-5, "{x:?} vs {y:?}");
            assert!((x.lng - y.lng).abs() < 1e-5, "{x:?} vs {y:?}");
        }
    }

    #[test]
    fn test_decode_reference() {
        let coords = decode(REFERENCE);
        assert_close(
            &coords,
            &[
                Coordinate::new(38.5, -120.2),
                Coordinate::new(40.7, -120.95),
                Coordinate::new(43.252, -126.453),
            ],
        );
    }

    #[test]
    fn test_encode_reference() {
        let coords = vec![
            Coordinate::new(38.5, -120.2),
            Coordinate::new(40.7, -120.95),
            Coordinate::new(43.252, -126.453),
        ];
        assert_eq!(encode(&coords), REFERENCE);
    }

    #[test]
    fn test_empty() {
        assert!(decode("").is_empty());
        assert_eq!(encode(&[]), "");
    }

    #[test]
    fn test_truncated_input_keeps_prefix() {
        // Drop the final byte: the last longitude has a dangling continuation chunk.
        let truncated = &REFERENCE[..REFERENCE.len() - 1];
        let coords = decode(truncated);
        assert_eq!(coords.len(), 2);
        assert!((coords[1].lat - 40.7).abs() < 1e-5);

        // Latitude present but longitude missing entirely.
        assert_eq!(decode("_p~iF").len(), 0);
        // Lone continuation byte.
        assert!(decode("_").is_empty());
    }

    #[test]
    fn test_garbage_bytes_do_not_panic() {
        assert!(decode("\u{1}\u{2}").is_empty());
        let _ = decode("~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~");
    }

    #[test]
    fn test_accumulated_overflow_stops_decoding() {
        // Each group is a 12-chunk delta of -2^59; the 17th pair overflows i64.
        let encoded = ("~".repeat(11) + "^").repeat(40);
        let coords = decode(&encoded);
        assert_eq!(coords.len(), 16);
    }

    proptest! {
        #[test]
        fn prop_round_trip(points in prop::collection::vec((-90.0f64..90.0, -180.0f64..180.0), 0..50)) {
            let coords: Vec<Coordinate> = points
                .iter()
                .map(|(lat, lng)| Coordinate::new(
                    (lat * PRECISION).round() / PRECISION,
                    (lng * PRECISION).round() / PRECISION,
                ))
                .collect();
            let decoded = decode(&encode(&coords));
            prop_assert_eq!(decoded.len(), coords.len());
            for (a, b) in decoded.iter().zip(&coords) {
                prop_assert!((a.lat - b.lat).abs() < 1e-5);
                prop_assert!((a.lng - b.lng).abs() < 1e-5);
            }
        }
    }
}
