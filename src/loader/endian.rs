//! Host and file byte order

use serde::Serialize;

/// How multi-byte values in a GGUF file relate to the host byte order.
///
/// Set once while parsing the header and never changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ByteOrder {
    /// File values are stored in the host's byte order
    Native,
    /// File values must be byte-swapped on read
    Swapped,
}

/// A concrete byte order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Endian {
    Little,
    Big,
}

impl Endian {
    /// The other byte order
    pub fn flip(self) -> Self {
        match self {
            Endian::Little => Endian::Big,
            Endian::Big => Endian::Little,
        }
    }
}

impl std::fmt::Display for Endian {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Endian::Little => write!(f, "LITTLE"),
            Endian::Big => write!(f, "BIG"),
        }
    }
}

/// Probe the host byte order at runtime.
///
/// A known multi-byte value whose native layout equals its little-endian
/// layout means the host is little-endian.
pub fn host_endian() -> Endian {
    if 1u32.to_ne_bytes() == 1u32.to_le_bytes() {
        Endian::Little
    } else {
        Endian::Big
    }
}

/// Resolve `(host, file)` byte orders from the reader's byte order flag.
pub fn resolve_endianness(byte_order: ByteOrder) -> (Endian, Endian) {
    let host = host_endian();
    let file = match byte_order {
        ByteOrder::Native => host,
        ByteOrder::Swapped => host.flip(),
    };
    (host, file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_endian_matches_target() {
        let expected = if cfg!(target_endian = "little") {
            Endian::Little
        } else {
            Endian::Big
        };
        assert_eq!(host_endian(), expected);
    }

    #[test]
    fn test_native_file_matches_host() {
        let (host, file) = resolve_endianness(ByteOrder::Native);
        assert_eq!(host, host_endian());
        assert_eq!(file, host);
    }

    #[test]
    fn test_swapped_file_is_opposite() {
        let (host, file) = resolve_endianness(ByteOrder::Swapped);
        assert_eq!(host, host_endian());
        assert_ne!(file, host);
        assert_eq!(file, host.flip());
    }

    #[test]
    fn test_display() {
        assert_eq!(Endian::Little.to_string(), "LITTLE");
        assert_eq!(Endian::Big.to_string(), "BIG");
        assert_eq!(serde_json::to_string(&Endian::Big).unwrap(), "\"BIG\"");
    }
}
