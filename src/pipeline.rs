//! Per-image pipeline: catalog expansion, rasterization, both containers,
//! and persistence of every artifact.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{info, info_span, warn};

use crate::config::{BatchPolicy, BundleConfig};
use crate::container::{MacContainerEncoder, MacIconContainer};
use crate::error::{Error, IoContext, ProcessError, Result, Stage};
use crate::render::{output_name, RasterProducer, ResvgRenderer, VectorSource};
use crate::tile::RasterTile;
use crate::windows::{IcoBuilder, WindowsContainerBuilder};

/// File name of the Windows container inside an icon set directory.
pub const ICO_FILE_NAME: &str = "icon.ico";
/// File name of the macOS container inside an icon set directory.
pub const ICNS_FILE_NAME: &str = "icon.icns";

/// The artifacts written for one source image.
#[derive(Clone, Debug)]
pub struct IconSet {
    /// Directory holding every artifact.
    pub output_dir: PathBuf,
    /// Persisted PNG tiles, in catalog order.  Empty if tiles are not kept.
    pub tiles: Vec<PathBuf>,
    /// Path of the `.ico` file.
    pub ico: PathBuf,
    /// Path of the `.icns` file.
    pub icns: PathBuf,
    /// Number of records in the `.icns` file.
    pub icns_records: usize,
}

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Icon sets that were written completely.
    pub succeeded: Vec<IconSet>,
    /// Images whose pipeline failed.
    pub failed: Vec<ProcessError>,
    /// Images never attempted because an earlier one failed in fail-fast
    /// mode.
    pub skipped: Vec<PathBuf>,
}

impl BatchReport {
    /// Returns true if every source image produced an icon set.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && self.skipped.is_empty()
    }
}

/// Runs the icon pipeline for source images.
pub struct Orchestrator<R = ResvgRenderer, B = IcoBuilder> {
    config: BundleConfig,
    renderer: R,
    windows: B,
    mac: MacContainerEncoder,
}

impl Orchestrator {
    /// Creates an orchestrator that renders with resvg and writes `.ico`
    /// files with the `ico` crate.
    pub fn new(config: BundleConfig) -> Result<Orchestrator> {
        let renderer = if config.system_fonts {
            ResvgRenderer::with_system_fonts()
        } else {
            ResvgRenderer::new()
        };
        Orchestrator::with_parts(config, renderer, IcoBuilder)
    }
}

impl<R: RasterProducer, B: WindowsContainerBuilder> Orchestrator<R, B> {
    /// Creates an orchestrator from explicit collaborators.
    pub fn with_parts(
        config: BundleConfig,
        renderer: R,
        windows: B,
    ) -> Result<Orchestrator<R, B>> {
        config.validate()?;
        let mac = config.mac_encoder()?;
        Ok(Orchestrator {
            config,
            renderer,
            windows,
            mac,
        })
    }

    /// Returns the configuration in use.
    pub fn config(&self) -> &BundleConfig {
        &self.config
    }

    /// Renders one tile per catalog entry.  Fails on the first tile the
    /// renderer cannot produce at exactly the requested size.
    pub fn render_tiles(&self, source: &VectorSource) -> Result<Vec<RasterTile>> {
        let specs = self.config.catalog().tile_specs();
        let mut tiles = Vec::with_capacity(specs.len());
        for spec in specs {
            let dimension = spec.pixel_dimension();
            let data = self
                .renderer
                .render(source, dimension, dimension, self.config.dpi)?;
            let tile = RasterTile::from_png(spec.size, spec.scale, data).map_err(|e| {
                Error::Render {
                    width: dimension,
                    height: dimension,
                    reason: format!("renderer output is not a PNG: {}", e),
                }
            })?;
            let (width, height) = (tile.pixel_width(), tile.pixel_height());
            if (width, height) != (dimension, dimension) {
                return Err(Error::Render {
                    width: dimension,
                    height: dimension,
                    reason: format!("renderer produced {}x{}", width, height),
                });
            }
            tiles.push(tile);
        }
        Ok(tiles)
    }

    /// Builds and writes the icon set for one source image into
    /// `output_root/<source stem>/`.  Both containers are fully built
    /// before anything is written, and each file only appears once it is
    /// complete.
    pub fn process(
        &self,
        source_path: &Path,
        output_root: &Path,
    ) -> std::result::Result<IconSet, ProcessError> {
        let _span = info_span!("icon", source = %source_path.display()).entered();
        let fail = move |stage: Stage| {
            move |error: Error| ProcessError {
                source_path: source_path.to_path_buf(),
                stage,
                error,
            }
        };

        let source = VectorSource::load(source_path).map_err(fail(Stage::Load))?;
        let tiles = self.render_tiles(&source).map_err(fail(Stage::Render))?;

        let mut ico_data = Vec::new();
        self.windows
            .build(&tiles, &self.config.windows_sizes(), &mut ico_data)
            .map_err(fail(Stage::WindowsContainer))?;
        let container = self.mac.encode(&tiles).map_err(fail(Stage::MacContainer))?;

        let output_dir = output_root.join(source.name());
        self.persist(&output_dir, &tiles, &ico_data, &container)
            .map_err(fail(Stage::Persist))
    }

    fn persist(
        &self,
        output_dir: &Path,
        tiles: &[RasterTile],
        ico_data: &[u8],
        container: &MacIconContainer,
    ) -> Result<IconSet> {
        fs::create_dir_all(output_dir)
            .io_context(format_args!("creating {}", output_dir.display()))?;

        let mut tile_paths = Vec::new();
        if self.config.write_tiles {
            for tile in tiles {
                let path = write_atomic(output_dir, &tile.spec().file_name(), |out| {
                    out.write_all(tile.data())
                })?;
                tile_paths.push(path);
            }
            info!("Created {} PNG tiles in '{}'", tile_paths.len(), output_dir.display());
        }

        let ico = write_atomic(output_dir, ICO_FILE_NAME, |out| out.write_all(ico_data))?;
        info!("Created '{}' (Windows)", ico.display());

        let icns = write_atomic(output_dir, ICNS_FILE_NAME, |out| container.write(out))?;
        info!("Created '{}' (macOS, {} records)", icns.display(), container.records.len());

        Ok(IconSet {
            output_dir: output_dir.to_path_buf(),
            tiles: tile_paths,
            ico,
            icns,
            icns_records: container.records.len(),
        })
    }

    /// Processes every source image in order.  A failed image is recorded
    /// and, unless the batch policy is fail-fast, does not stop the rest.
    ///
    /// Each output directory belongs to the first source that maps to it;
    /// a later source with the same file stem fails at the persist stage
    /// without touching the earlier icon set.
    pub fn run_batch(&self, sources: &[PathBuf], output_root: &Path) -> BatchReport {
        let mut report = BatchReport::default();
        let mut claimed: HashMap<String, PathBuf> = HashMap::new();
        for (index, source) in sources.iter().enumerate() {
            info!("Processing {}...", source.display());
            let name = output_name(source);
            let result = match claimed.get(&name).cloned() {
                Some(first) => Err(ProcessError {
                    source_path: source.clone(),
                    stage: Stage::Persist,
                    error: Error::OutputCollision { name, first },
                }),
                None => {
                    claimed.insert(name, source.clone());
                    self.process(source, output_root)
                }
            };
            match result {
                Ok(icon_set) => report.succeeded.push(icon_set),
                Err(err) => {
                    warn!("{}", err);
                    report.failed.push(err);
                    if self.config.batch == BatchPolicy::FailFast {
                        report.skipped.extend_from_slice(&sources[index + 1..]);
                        break;
                    }
                }
            }
        }
        report
    }
}

/// Writes `file_name` in `dir` through a temporary file that is renamed
/// into place only after `fill` succeeds and the data is flushed to disk.
fn write_atomic<F>(dir: &Path, file_name: &str, fill: F) -> Result<PathBuf>
where
    F: FnOnce(&mut BufWriter<&mut File>) -> std::io::Result<()>,
{
    let target = dir.join(file_name);
    let mut temp = NamedTempFile::new_in(dir)
        .io_context(format_args!("creating temporary file in {}", dir.display()))?;
    {
        let mut out = BufWriter::new(temp.as_file_mut());
        fill(&mut out)
            .and_then(|()| out.flush())
            .io_context(format_args!("writing {}", target.display()))?;
    }
    temp.as_file()
        .sync_all()
        .io_context(format_args!("syncing {}", target.display()))?;
    temp.persist(&target)
        .map_err(|e| e.error)
        .io_context(format_args!("finalizing {}", target.display()))?;
    Ok(target)
}
