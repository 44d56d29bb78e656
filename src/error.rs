use std::fmt;
use std::io;
use std::path::PathBuf;

/// Errors produced while building an icon bundle.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The vector source could not be rasterized at the requested size.
    #[error("failed to render {width}x{height} tile: {reason}")]
    Render {
        /// Requested pixel width.
        width: u32,
        /// Requested pixel height.
        height: u32,
        /// What the renderer reported.
        reason: String,
    },

    /// A tile has no macOS icon type and the policy forbids skipping it.
    #[error("no macOS icon type for a {width}x{height} tile")]
    UnsupportedDimension {
        /// Pixel width of the rejected tile.
        width: u32,
        /// Pixel height of the rejected tile.
        height: u32,
    },

    /// Reading or writing a file failed.
    #[error("{context}: {source}")]
    Io {
        /// What was being done when the error happened.
        context: String,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The configuration is invalid.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// None of the requested Windows icon sizes had a matching tile.
    #[error("no tile matches any requested .ico size {sizes:?}")]
    NoWindowsImages {
        /// The sizes that were requested.
        sizes: Vec<u32>,
    },

    /// Two sources in one batch would write to the same output directory.
    #[error("output directory '{name}' is already used by {}", .first.display())]
    OutputCollision {
        /// The shared output directory name.
        name: String,
        /// The earlier source that claimed it.
        first: PathBuf,
    },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Attaches a description of the failed operation to an I/O error.
pub(crate) trait IoContext<T> {
    fn io_context<C: fmt::Display>(self, context: C) -> Result<T>;
}

impl<T> IoContext<T> for io::Result<T> {
    fn io_context<C: fmt::Display>(self, context: C) -> Result<T> {
        self.map_err(|source| Error::Io {
            context: context.to_string(),
            source,
        })
    }
}

/// The step of the per-image pipeline that failed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Stage {
    /// Reading the vector source.
    Load,
    /// Rasterizing tiles.
    Render,
    /// Building the `.ico` file.
    WindowsContainer,
    /// Building the `.icns` file.
    MacContainer,
    /// Writing artifacts to the output directory.
    Persist,
}

impl fmt::Display for Stage {
    fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Stage::Load => "load",
            Stage::Render => "render",
            Stage::WindowsContainer => "windows container",
            Stage::MacContainer => "mac container",
            Stage::Persist => "persist",
        };
        out.write_str(name)
    }
}

/// A failure that aborted the pipeline for one source image.
#[derive(Debug, thiserror::Error)]
#[error("{}: {stage} failed: {error}", .source_path.display())]
pub struct ProcessError {
    /// The source image being processed.
    pub source_path: PathBuf,
    /// The step that failed.
    pub stage: Stage,
    /// What went wrong.
    #[source]
    pub error: Error,
}
