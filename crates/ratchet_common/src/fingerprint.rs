//! Fingerprints embedded in digest-qualified output names.

use std::fmt;

/// The XXH3-128 fingerprint of an artifact's bytes.
///
/// It is rendered as 32 lowercase hex characters, most significant byte
/// first, and spliced into the published filename by
/// [`digest_path`](crate::digest_path). Any change to the bytes moves the
/// artifact to a new path.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fingerprint(u128);

impl Fingerprint {
    /// Fingerprints `bytes`.
    pub fn of(bytes: &[u8]) -> Self {
        Self(xxhash_rust::xxh3::xxh3_128(bytes))
    }

    /// The 32-character lowercase hex form.
    pub fn to_hex(self) -> String {
        hex::encode(self.0.to_be_bytes())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", &self.to_hex()[..8])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_bytes_same_fingerprint() {
        assert_eq!(Fingerprint::of(b"var a = 1;"), Fingerprint::of(b"var a = 1;"));
        assert_ne!(
            Fingerprint::of(b"body { color: red }"),
            Fingerprint::of(b"body { color: blue }")
        );
    }

    #[test]
    fn hex_is_big_endian_and_padded() {
        let fp = Fingerprint(0xab);
        assert_eq!(fp.to_hex(), format!("{}ab", "0".repeat(30)));
        assert_eq!(fp.to_string(), fp.to_hex());
    }

    #[test]
    fn hex_is_32_lowercase_chars() {
        let s = Fingerprint::of(b"test").to_hex();
        assert_eq!(s.len(), 32);
        assert!(s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')));
    }

    #[test]
    fn debug_shows_prefix() {
        let fp = Fingerprint::of(b"test");
        assert_eq!(format!("{fp:?}"), format!("Fingerprint({})", &fp.to_hex()[..8]));
    }
}
