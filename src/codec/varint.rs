//! Base-128 variable length unsigned integers, least significant group first.
//!
//! Every byte carries 7 bits of payload; the high bit is set when more bytes
//! follow. This is the same layout as protobuf's unsigned varints.
use super::{Error, Result};

use byteorder::{ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};

/// Write `n` to `w`, returning the number of bytes written.
pub fn write_varint<W: Write>(w: &mut W, mut n: u64) -> io::Result<usize> {
    let mut written = 0;
    loop {
        let mut byte = (n & 0x7f) as u8;
        n >>= 7;
        if n != 0 {
            byte |= 0x80;
        }
        w.write_u8(byte)?;
        written += 1;
        if n == 0 {
            return Ok(written);
        }
    }
}

/// Read one varint belonging to `field`, consuming exactly the bytes it occupies.
///
/// Values are accumulated into a `u64`, so any encoding carrying more than 64
/// bits is `VarintTooLong`. That includes zero-padded forms such as ten `0x80`
/// bytes followed by `0x00`, which an arbitrary-precision reader accepts as 0.
pub fn read_varint<R: Read>(r: &mut R, field: &'static str) -> Result<u64> {
    let mut n = 0u64;
    let mut shift = 0u32;
    loop {
        let byte = r.read_u8().map_err(|e| Error::from_read(field, e))?;
        let group = u64::from(byte & 0x7f);
        // Only one payload bit is left for the tenth byte
        if shift >= 64 || (shift == 63 && group > 1) {
            return Err(Error::VarintTooLong(field));
        }
        n |= group << shift;
        if byte & 0x80 == 0 {
            return Ok(n);
        }
        shift += 7;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn encode(n: u64) -> Vec<u8> {
        let mut buf = Vec::with_capacity(10);
        write_varint(&mut buf, n).unwrap();
        buf
    }

    /// Decode from the front of `buf`, advancing it past the consumed bytes
    fn decode(buf: &mut &[u8]) -> Result<u64> {
        read_varint(buf, "varint")
    }

    const SAMPLES: &[u64] = &[
        0,
        1,
        2,
        127,
        128,
        129,
        255,
        256,
        1000,
        4096,
        33556677889900,
        8823088,
        u32::MAX as u64,
        u64::MAX - 1,
        u64::MAX,
    ];

    #[test]
    fn zero_is_one_byte() {
        assert_eq!(encode(0), vec![0]);
        assert_eq!(encode(127), vec![0x7f]);
        assert_eq!(encode(128), vec![0x80, 0x01]);
        assert_eq!(encode(300), vec![0xac, 0x02]);
        assert_eq!(encode(u64::MAX).len(), 10);
    }

    #[test]
    fn round_trip_samples() {
        for &n in SAMPLES {
            let buf = encode(n);
            let mut rest = buf.as_slice();
            assert_eq!(decode(&mut rest).unwrap(), n, "sample {n}");
            assert!(rest.is_empty(), "sample {n} left bytes behind");
        }
    }

    #[test]
    fn round_trip_stream() {
        // xorshift, so the sweep is reproducible
        let mut state = 0x2545_f491_4f6c_dd1du64;
        let mut values: Vec<u64> = SAMPLES.to_vec();
        for _ in 0..40000 {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            values.push(state % 100_000_000_000_000_000);
        }

        let mut buf = Vec::new();
        for &n in &values {
            write_varint(&mut buf, n).unwrap();
        }
        let mut rest = buf.as_slice();
        for (i, &n) in values.iter().enumerate() {
            assert_eq!(decode(&mut rest).unwrap(), n, "{i}-th sample differs");
        }
        assert!(rest.is_empty(), "expected to reach the end of the stream");
    }

    #[test]
    fn truncated() {
        let mut rest: &[u8] = &[0x80];
        assert!(matches!(decode(&mut rest), Err(Error::Truncated(_))));
        let mut rest: &[u8] = &[];
        assert!(matches!(decode(&mut rest), Err(Error::Truncated(_))));
        let mut full = encode(u64::MAX);
        full.pop();
        assert!(matches!(decode(&mut full.as_slice()), Err(Error::Truncated(_))));
    }

    #[test]
    fn too_long() {
        let mut rest: &[u8] = &[0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x02];
        assert!(matches!(decode(&mut rest), Err(Error::VarintTooLong(_))));
        let mut rest: &[u8] = &[0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x00];
        assert!(matches!(decode(&mut rest), Err(Error::VarintTooLong(_))));
    }
}
