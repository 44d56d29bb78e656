use ico::{IconDir, IconDirEntry, IconImage, ResourceType};
use std::io::Write;
use tracing::{debug, warn};

use crate::catalog::Scale;
use crate::error::{Error, IoContext, Result};
use crate::pixels::decode_png_rgba;
use crate::tile::RasterTile;

/// Largest edge length an ICO directory entry can describe.
pub const MAX_ICO_DIMENSION: u32 = 256;

/// Assembles raster tiles into a Windows icon file.
pub trait WindowsContainerBuilder {
    /// Writes an icon containing one image per entry of `sizes`, taken
    /// from `tiles`.
    fn build(&self, tiles: &[RasterTile], sizes: &[u32], writer: &mut dyn Write) -> Result<()>;
}

/// Builds `.ico` files with the `ico` crate.
///
/// Each requested size uses the tile whose pixel dimensions equal it,
/// preferring 1x tiles, so the choice never depends on compressed byte
/// size.
#[derive(Clone, Copy, Debug, Default)]
pub struct IcoBuilder;

impl IcoBuilder {
    fn select<'a>(tiles: &'a [RasterTile], size: u32) -> Option<&'a RasterTile> {
        let matching = |tile: &&RasterTile| {
            tile.pixel_width() == size && tile.pixel_height() == size
        };
        tiles
            .iter()
            .filter(matching)
            .find(|tile| tile.spec().scale == Scale::One)
            .or_else(|| tiles.iter().find(matching))
    }
}

impl WindowsContainerBuilder for IcoBuilder {
    fn build(&self, tiles: &[RasterTile], sizes: &[u32], writer: &mut dyn Write) -> Result<()> {
        let mut icon_dir = IconDir::new(ResourceType::Icon);
        for &size in sizes {
            if size > MAX_ICO_DIMENSION {
                debug!(size, "too large for .ico, skipping");
                continue;
            }
            let tile = match IcoBuilder::select(tiles, size) {
                Some(tile) => tile,
                None => {
                    warn!(size, "no {}x{} tile for .ico", size, size);
                    continue;
                }
            };
            let rgba = decode_png_rgba(tile.data())
                .io_context(format_args!("decoding {} tile", tile.spec()))?;
            let image = IconImage::from_rgba_data(rgba.width, rgba.height, rgba.data);
            let entry = IconDirEntry::encode(&image).io_context(format_args!(
                "encoding {}x{} ico entry",
                size, size
            ))?;
            icon_dir.add_entry(entry);
        }
        if icon_dir.entries().is_empty() {
            return Err(Error::NoWindowsImages { sizes: sizes.to_vec() });
        }
        icon_dir.write(writer).io_context("writing .ico data")
    }
}
