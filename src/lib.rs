//! Library for turning one SVG image into a multi-resolution icon bundle:
//! PNG tiles, a Windows `.ico` file and a macOS `.icns` file.
//!
//! The `.icns` encoder is implemented here; rasterization is done by
//! [resvg](https://docs.rs/resvg) and the `.ico` file by the
//! [ico](https://docs.rs/ico) crate.  See
//! https://en.wikipedia.org/wiki/Apple_Icon_Image_format for more
//! information about the ICNS file format.
//!
//! ```
//! use iconbundle::{MacContainerEncoder, RasterTile, Scale, TileSpec};
//!
//! let tile = RasterTile::new(TileSpec { size: 128, scale: Scale::One }, vec![1, 2, 3]);
//! let container = MacContainerEncoder::default().encode(&[tile]).unwrap();
//! assert_eq!(container.to_bytes().unwrap(),
//!            b"icns\0\0\0\x13it32\0\0\0\x0b\x01\x02\x03".to_vec());
//! ```

#![warn(missing_docs)]

mod catalog;
pub mod config;
mod container;
mod error;
mod ostype;
pub mod pipeline;
mod pixels;
mod record;
pub mod render;
mod tagtable;
mod tile;
mod windows;

pub use catalog::{Scale, SizeCatalog, TileSpec, DEFAULT_ICON_SIZES};
pub use config::{BatchPolicy, BundleConfig};
pub use container::{MacContainerEncoder, MacIconContainer, UnsupportedPolicy};
pub use error::{Error, ProcessError, Result, Stage};
pub use ostype::OSType;
pub use pipeline::{BatchReport, IconSet, Orchestrator};
pub use pixels::{decode_png_rgba, RgbaImage};
pub use record::IconRecord;
pub use render::{RasterProducer, ResvgRenderer, VectorSource};
pub use tagtable::TagTable;
pub use tile::{png_dimensions, RasterTile};
pub use windows::{IcoBuilder, WindowsContainerBuilder, MAX_ICO_DIMENSION};
