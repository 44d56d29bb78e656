//! Bundle configuration, loaded from an optional TOML file.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub use crate::catalog::MAX_ICON_SIZE;

use crate::catalog::{SizeCatalog, DEFAULT_ICON_SIZES};
use crate::container::{MacContainerEncoder, UnsupportedPolicy};
use crate::error::{Error, IoContext, Result};
use crate::ostype::OSType;
use crate::tagtable::TagTable;

/// How a batch reacts to a source image that fails.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum BatchPolicy {
    /// Report the failure and carry on with the remaining images.
    #[default]
    Continue,
    /// Stop at the first failed image.
    FailFast,
}

/// Everything that shapes one run.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct BundleConfig {
    /// Logical icon sizes, each rendered at 1x and 2x.
    pub sizes: Vec<u32>,
    /// Resolution handed to the renderer.
    pub dpi: f32,
    /// Policy for tiles without an `.icns` tag.
    pub unsupported_tiles: UnsupportedPolicy,
    /// Policy for failed source images.
    pub batch: BatchPolicy,
    /// Whether the PNG tiles are written next to the containers.
    pub write_tiles: bool,
    /// Tag table overrides keyed by pixel dimension; `"none"` removes an
    /// entry.
    pub mac_tags: BTreeMap<String, String>,
    /// Sizes placed in the `.ico`; defaults to the catalog sizes.
    pub windows_sizes: Option<Vec<u32>>,
    /// Load system fonts so SVG text renders.
    pub system_fonts: bool,
}

impl Default for BundleConfig {
    fn default() -> BundleConfig {
        BundleConfig {
            sizes: DEFAULT_ICON_SIZES.to_vec(),
            dpi: 144.0,
            unsupported_tiles: UnsupportedPolicy::default(),
            batch: BatchPolicy::default(),
            write_tiles: true,
            mac_tags: BTreeMap::new(),
            windows_sizes: None,
            system_fonts: false,
        }
    }
}

impl BundleConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml(text: &str) -> Result<BundleConfig> {
        let config: BundleConfig =
            toml::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<BundleConfig> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .io_context(format_args!("reading {}", path.display()))?;
        BundleConfig::from_toml(&text)
    }

    /// Checks value ranges and tag overrides.
    pub fn validate(&self) -> Result<()> {
        if self.sizes.is_empty() {
            return Err(Error::Config("sizes must not be empty".to_string()));
        }
        if let Some(&size) = self.sizes.iter().find(|&&s| s == 0 || s > MAX_ICON_SIZE) {
            let msg = format!("size {} is outside 1..={}", size, MAX_ICON_SIZE);
            return Err(Error::Config(msg));
        }
        if !(self.dpi > 0.0 && self.dpi.is_finite()) {
            let msg = format!("dpi must be positive (was {})", self.dpi);
            return Err(Error::Config(msg));
        }
        self.tag_table().map(|_| ())
    }

    /// Returns the catalog described by `sizes`.
    pub fn catalog(&self) -> SizeCatalog {
        SizeCatalog::new(self.sizes.iter().copied())
    }

    /// Returns the sizes to place in the `.ico`.
    pub fn windows_sizes(&self) -> Vec<u32> {
        match &self.windows_sizes {
            Some(sizes) => sizes.clone(),
            None => self.catalog().sizes(),
        }
    }

    /// Returns the default tag table with `mac_tags` applied.
    pub fn tag_table(&self) -> Result<TagTable> {
        let mut table = TagTable::default();
        for (dimension, tag) in &self.mac_tags {
            let dimension: u32 = dimension.parse().map_err(|_| {
                Error::Config(format!(
                    "mac_tags key '{}' is not a pixel dimension",
                    dimension
                ))
            })?;
            if tag == "none" {
                table.remove(dimension, dimension);
            } else {
                let ostype: OSType = tag.parse().map_err(|e| {
                    Error::Config(format!("mac_tags.{}: {}", dimension, e))
                })?;
                table.set(dimension, dimension, ostype);
            }
        }
        Ok(table)
    }

    /// Returns an `.icns` encoder configured from this bundle.
    pub fn mac_encoder(&self) -> Result<MacContainerEncoder> {
        let table = self.tag_table()?;
        Ok(MacContainerEncoder::new(table, self.unsupported_tiles))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_default() {
        let config = BundleConfig::from_toml("").unwrap();
        assert_eq!(config, BundleConfig::default());
        assert_eq!(config.catalog().len(), 8);
        assert_eq!(config.windows_sizes(), DEFAULT_ICON_SIZES.to_vec());
    }

    #[test]
    fn full_document() {
        let config = BundleConfig::from_toml(
            r#"
            sizes = [16, 32]
            dpi = 96.0
            unsupported_tiles = "error"
            batch = "fail-fast"
            write_tiles = false
            windows_sizes = [16]

            [mac_tags]
            32 = "ic11"
            64 = "none"
            "#,
        )
        .unwrap();
        assert_eq!(config.sizes, vec![16, 32]);
        assert_eq!(config.unsupported_tiles, UnsupportedPolicy::Error);
        assert_eq!(config.batch, BatchPolicy::FailFast);
        assert!(!config.write_tiles);
        assert_eq!(config.windows_sizes(), vec![16]);
        let table = config.tag_table().unwrap();
        assert_eq!(table.lookup(32, 32), Some(OSType(*b"ic11")));
        assert_eq!(table.lookup(64, 64), None);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(BundleConfig::from_toml("sizes = []").is_err());
        assert!(BundleConfig::from_toml("sizes = [0]").is_err());
        assert!(BundleConfig::from_toml("dpi = 0.0").is_err());
        assert!(BundleConfig::from_toml("unknown = 1").is_err());
        assert!(BundleConfig::from_toml("[mac_tags]\nabc = \"ic08\"").is_err());
        assert!(BundleConfig::from_toml("[mac_tags]\n32 = \"toolong\"").is_err());
    }
}
