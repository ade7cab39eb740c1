use crate::codec::{Error, Result};

pub const MD5_LEN: usize = 16;
pub const SHA256_LEN: usize = 32;

pub type Md5Sum = [u8; MD5_LEN];
pub type Sha256Sum = [u8; SHA256_LEN];

/// Decode the hex form of checksum `field` into exactly `N` bytes.
pub fn from_hex<const N: usize>(field: &'static str, s: &str) -> Result<[u8; N]> {
    let bytes =
        hex::decode(s).map_err(|e| Error::Grammar(format!("bad hex in {field}: {e}")))?;
    let len = bytes.len();
    bytes.try_into().map_err(|_| Error::SizeMismatch {
        field,
        expected: N,
        actual: len,
    })
}

/// Lowercase hex, two characters per byte
pub fn to_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn hex_checksums() {
        let md5: Md5Sum = from_hex("md5sum", "00112233445566778899aabbccddeeff").unwrap();
        assert_eq!(md5[15], 0xff);
        assert_eq!(to_hex(&md5), "00112233445566778899aabbccddeeff");
        // Uppercase is accepted on input, output is always lowercase
        let md5: Md5Sum = from_hex("md5sum", "00112233445566778899AABBCCDDEEFF").unwrap();
        assert_eq!(to_hex(&md5).len(), 32);
    }

    #[test]
    fn bad_checksums() {
        assert!(matches!(
            from_hex::<SHA256_LEN>("sha256sum", "0011"),
            Err(Error::SizeMismatch {
                expected: 32,
                actual: 2,
                ..
            })
        ));
        assert!(matches!(
            from_hex::<MD5_LEN>("md5sum", "not hex at all"),
            Err(Error::Grammar(_))
        ));
    }
}
