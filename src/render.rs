//! Rasterization of vector sources into PNG tiles.

use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{Error, IoContext, Result};

/// A vector image loaded into memory.
#[derive(Clone, Debug)]
pub struct VectorSource {
    path: PathBuf,
    data: Vec<u8>,
}

impl VectorSource {
    /// Wraps already-loaded SVG data.  `path` is used for messages and to
    /// resolve relative references inside the document.
    pub fn new<P: Into<PathBuf>>(path: P, data: Vec<u8>) -> VectorSource {
        VectorSource { path: path.into(), data }
    }

    /// Reads an SVG file from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<VectorSource> {
        let path = path.as_ref();
        let data = fs::read(path).io_context(format_args!("reading {}", path.display()))?;
        Ok(VectorSource::new(path, data))
    }

    /// Returns the path the source was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the raw SVG bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the file stem, used to name the output directory.
    pub fn name(&self) -> String {
        output_name(&self.path)
    }
}

/// Returns the output directory name for a source at `path`: its file
/// stem, or `icon` if it has none.
pub fn output_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "icon".to_string())
}

/// Produces an encoded raster image of a vector source at an exact pixel
/// size.
pub trait RasterProducer {
    /// Renders `source` into a `pixel_width`x`pixel_height` PNG.
    fn render(
        &self,
        source: &VectorSource,
        pixel_width: u32,
        pixel_height: u32,
        dpi: f32,
    ) -> Result<Vec<u8>>;
}

/// Renders SVG with resvg, stretching the document to fill the tile.
pub struct ResvgRenderer {
    fontdb: Arc<usvg::fontdb::Database>,
}

impl ResvgRenderer {
    /// Creates a renderer with no fonts loaded; text in the SVG will not
    /// be drawn.
    pub fn new() -> ResvgRenderer {
        ResvgRenderer {
            fontdb: Arc::new(usvg::fontdb::Database::new()),
        }
    }

    /// Creates a renderer that can draw text using the system's fonts.
    pub fn with_system_fonts() -> ResvgRenderer {
        let mut fontdb = usvg::fontdb::Database::new();
        fontdb.load_system_fonts();
        ResvgRenderer { fontdb: Arc::new(fontdb) }
    }
}

impl Default for ResvgRenderer {
    fn default() -> ResvgRenderer {
        ResvgRenderer::new()
    }
}

impl RasterProducer for ResvgRenderer {
    fn render(
        &self,
        source: &VectorSource,
        pixel_width: u32,
        pixel_height: u32,
        dpi: f32,
    ) -> Result<Vec<u8>> {
        let fail = |reason: String| Error::Render {
            width: pixel_width,
            height: pixel_height,
            reason,
        };

        let options = usvg::Options {
            dpi,
            resources_dir: source.path().parent().map(Path::to_path_buf),
            fontdb: Arc::clone(&self.fontdb),
            ..usvg::Options::default()
        };
        let tree = usvg::Tree::from_data(source.data(), &options)
            .map_err(|e| fail(e.to_string()))?;

        let mut pixmap = Pixmap::new(pixel_width, pixel_height)
            .ok_or_else(|| fail("cannot allocate pixmap".to_string()))?;
        let size = tree.size();
        let transform = Transform::from_scale(
            pixel_width as f32 / size.width(),
            pixel_height as f32 / size.height(),
        );
        resvg::render(&tree, transform, &mut pixmap.as_mut());
        pixmap.encode_png().map_err(|e| fail(e.to_string()))
    }
}
