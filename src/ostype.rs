use std::fmt;
use std::str::FromStr;

/// A Macintosh OSType (also known as a ResType), used in ICNS files to
/// identify the role of each record.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct OSType(pub [u8; 4]);

impl OSType {
    /// Returns the raw bytes of the tag.
    pub fn bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl fmt::Display for OSType {
    fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
        for &byte in &self.0 {
            write!(out, "{}", char::from(byte))?;
        }
        Ok(())
    }
}

impl FromStr for OSType {
    type Err = String;

    fn from_str(input: &str) -> Result<OSType, String> {
        let bytes = input.as_bytes();
        if bytes.len() != 4 {
            return Err(format!("OSType string must be 4 bytes (was {})", bytes.len()));
        }
        let mut raw = [0u8; 4];
        raw.copy_from_slice(bytes);
        Ok(OSType(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ostype_to_and_from_str() {
        let ostype = OSType::from_str("ic10").expect("failed to parse OSType");
        assert_eq!(ostype, OSType(*b"ic10"));
        assert_eq!(ostype.to_string(), "ic10");
    }

    #[test]
    fn ostype_from_str_failure() {
        assert_eq!(
            OSType::from_str("ic1"),
            Err("OSType string must be 4 bytes (was 3)".to_string())
        );
        assert_eq!(
            OSType::from_str("ic100"),
            Err("OSType string must be 4 bytes (was 5)".to_string())
        );
    }
}
