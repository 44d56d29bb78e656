use std::collections::BTreeSet;
use std::fmt;

/// The logical sizes (in points) of a complete icon bundle.
pub const DEFAULT_ICON_SIZES: [u32; 8] = [16, 32, 48, 64, 128, 256, 512, 1024];

/// Largest logical icon size a catalog accepts.
pub const MAX_ICON_SIZE: u32 = 4096;

/// Pixel density multiplier of a tile.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Scale {
    /// Standard density.
    One,
    /// 2x "retina" density.
    Two,
}

impl Scale {
    /// Every scale a catalog expands into, in production order.
    pub const ALL: [Scale; 2] = [Scale::One, Scale::Two];

    /// Returns the pixel multiplier for this scale.
    pub fn factor(self) -> u32 {
        match self {
            Scale::One => 1,
            Scale::Two => 2,
        }
    }

    /// Returns the file name suffix used for this scale (`""` or `"@2x"`).
    pub fn suffix(self) -> &'static str {
        match self {
            Scale::One => "",
            Scale::Two => "@2x",
        }
    }
}

/// One `(size, scale)` pair that must be rasterized.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct TileSpec {
    /// Logical icon size in points.
    pub size: u32,
    /// Density of the tile.
    pub scale: Scale,
}

impl TileSpec {
    /// Returns the edge length of the square tile, in pixels.
    ///
    /// # Examples
    /// ```
    /// use iconbundle::{Scale, TileSpec};
    /// assert_eq!(TileSpec { size: 16, scale: Scale::One }.pixel_dimension(), 16);
    /// assert_eq!(TileSpec { size: 16, scale: Scale::Two }.pixel_dimension(), 32);
    /// ```
    pub fn pixel_dimension(self) -> u32 {
        self.size * self.scale.factor()
    }

    /// Returns the file name under which this tile is persisted, e.g.
    /// `icon_16.png` or `icon_16@2x.png`.
    pub fn file_name(self) -> String {
        format!("icon_{}{}.png", self.size, self.scale.suffix())
    }
}

impl fmt::Display for TileSpec {
    fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
        write!(out, "{}{}", self.size, self.scale.suffix())
    }
}

/// The set of logical icon sizes a bundle must cover.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SizeCatalog {
    sizes: BTreeSet<u32>,
}

impl SizeCatalog {
    /// Creates a catalog from the given sizes.  Duplicates collapse and
    /// sizes outside `1..=MAX_ICON_SIZE` are ignored.
    pub fn new<I: IntoIterator<Item = u32>>(sizes: I) -> SizeCatalog {
        SizeCatalog {
            sizes: sizes
                .into_iter()
                .filter(|size| (1..=MAX_ICON_SIZE).contains(size))
                .collect(),
        }
    }

    /// Returns the number of logical sizes in the catalog.
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    /// Returns true if the catalog has no sizes.
    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// Returns the logical sizes in ascending order.
    pub fn sizes(&self) -> Vec<u32> {
        self.sizes.iter().copied().collect()
    }

    /// Expands the catalog into every `(size, scale)` pair, smallest size
    /// first and 1x before 2x.  This is the order tiles are produced in.
    pub fn tile_specs(&self) -> Vec<TileSpec> {
        self.sizes
            .iter()
            .flat_map(|&size| {
                Scale::ALL.iter().map(move |&scale| TileSpec { size, scale })
            })
            .collect()
    }
}

impl Default for SizeCatalog {
    fn default() -> SizeCatalog {
        SizeCatalog::new(DEFAULT_ICON_SIZES)
    }
}
