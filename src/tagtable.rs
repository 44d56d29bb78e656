use crate::ostype::OSType;

/// Default mapping from square pixel dimension to ICNS record tag.
///
/// 32x32 maps to `il32`, the format's 32x32 type; `is32` is 16x16 only.
const DEFAULT_TAGS: [(u32, [u8; 4]); 7] = [
    (16, *b"is32"),
    (32, *b"il32"),
    (64, *b"ih32"),
    (128, *b"it32"),
    (256, *b"ic08"),
    (512, *b"ic09"),
    (1024, *b"ic10"),
];

/// Lookup table from tile pixel dimensions to the ICNS record tag that
/// carries them.  Dimensions absent from the table have no tag.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TagTable {
    entries: Vec<((u32, u32), OSType)>,
}

impl TagTable {
    /// Creates a table with no entries.
    pub fn empty() -> TagTable {
        TagTable { entries: Vec::new() }
    }

    /// Returns the tag for a tile of the given pixel dimensions, if any.
    pub fn lookup(&self, width: u32, height: u32) -> Option<OSType> {
        self.entries
            .iter()
            .find(|&&(dims, _)| dims == (width, height))
            .map(|&(_, ostype)| ostype)
    }

    /// Maps `width`x`height` tiles to `ostype`, replacing any existing
    /// entry for those dimensions.
    pub fn set(&mut self, width: u32, height: u32, ostype: OSType) {
        match self.entries.iter_mut().find(|(dims, _)| *dims == (width, height)) {
            Some(entry) => entry.1 = ostype,
            None => self.entries.push(((width, height), ostype)),
        }
    }

    /// Removes the entry for `width`x`height` tiles, if present.
    pub fn remove(&mut self, width: u32, height: u32) {
        self.entries.retain(|(dims, _)| *dims != (width, height));
    }

    /// Returns the table entries in insertion order.
    pub fn entries(&self) -> &[((u32, u32), OSType)] {
        &self.entries
    }
}

impl Default for TagTable {
    fn default() -> TagTable {
        TagTable {
            entries: DEFAULT_TAGS
                .iter()
                .map(|&(dim, tag)| ((dim, dim), OSType(tag)))
                .collect(),
        }
    }
}
