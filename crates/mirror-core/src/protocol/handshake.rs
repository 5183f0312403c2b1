//! Device-info handshake written once to the peer right after accept.
//!
//! ```text
//! [name:64, UTF-8, NUL-padded][width:2][height:2]
//! ```

use serde::{Deserialize, Serialize};

use crate::protocol::events::Size;

/// Width of the NUL-padded device name field.
pub const DEVICE_NAME_FIELD_LENGTH: usize = 64;

/// Total size of the encoded handshake.
pub const DEVICE_INFO_LENGTH: usize = DEVICE_NAME_FIELD_LENGTH + 4;

/// What the peer needs to know before it starts sending events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Human-readable device name.  Truncated on the wire.
    pub name: String,
    /// Video frame size the peer should report coordinates against.
    pub frame_size: Size,
}

impl DeviceInfo {
    pub fn new(name: impl Into<String>, frame_size: Size) -> Self {
        Self {
            name: name.into(),
            frame_size,
        }
    }

    /// Serialises the handshake.
    ///
    /// The name keeps at most 63 bytes so the field always ends in a NUL, and
    /// is cut on a character boundary.
    pub fn encode(&self) -> [u8; DEVICE_INFO_LENGTH] {
        let mut out = [0u8; DEVICE_INFO_LENGTH];
        let name = truncate_utf8(&self.name, DEVICE_NAME_FIELD_LENGTH - 1);
        out[..name.len()].copy_from_slice(name.as_bytes());
        out[DEVICE_NAME_FIELD_LENGTH..DEVICE_NAME_FIELD_LENGTH + 2]
            .copy_from_slice(&self.frame_size.width.to_be_bytes());
        out[DEVICE_NAME_FIELD_LENGTH + 2..].copy_from_slice(&self.frame_size.height.to_be_bytes());
        out
    }
}

/// Longest prefix of `s` that is at most `max_bytes` long and valid UTF-8.
fn truncate_utf8(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_short_name_is_nul_padded() {
        let info = DeviceInfo::new("Pixel 7", Size::new(1080, 2400));

        let bytes = info.encode();

        assert_eq!(&bytes[..7], b"Pixel 7");
        assert!(bytes[7..64].iter().all(|&b| b == 0));
        assert_eq!(&bytes[64..], &[0x04, 0x38, 0x09, 0x60]);
    }

    #[test]
    fn test_encode_long_name_keeps_a_terminating_nul() {
        let info = DeviceInfo::new("n".repeat(100), Size::new(1, 2));

        let bytes = info.encode();

        assert!(bytes[..63].iter().all(|&b| b == b'n'));
        assert_eq!(bytes[63], 0);
    }

    #[test]
    fn test_truncation_never_splits_a_character() {
        // 62 ASCII bytes followed by a two-byte character straddling the limit.
        let name = format!("{}é", "a".repeat(62));
        let info = DeviceInfo::new(name, Size::default());

        let bytes = info.encode();

        assert_eq!(bytes[61], b'a');
        assert_eq!(bytes[62], 0);
        assert!(std::str::from_utf8(&bytes[..62]).is_ok());
    }
}
