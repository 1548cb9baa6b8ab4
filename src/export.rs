//! Build sessions and the backend they hand finished drawings to

use std::path::PathBuf;

use log::{info, warn};
use thiserror::Error;

use crate::config::{positive, ConfigError};
use crate::layout::{Drawing, LayoutError, Session, SessionConfig};

/// Options passed through to the backend on export
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    /// Skip the background fill
    pub transparent: bool,
    /// Output resolution, pixels per inch
    pub dpi: f64,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            transparent: false,
            dpi: 300.0,
        }
    }
}

impl ExportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transparent(mut self, transparent: bool) -> Self {
        self.transparent = transparent;
        self
    }

    pub fn with_dpi(mut self, dpi: f64) -> Self {
        self.dpi = dpi;
        self
    }

    /// The dpi must be finite and positive
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("export.dpi", self.dpi)
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that end a build
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Receives the element log when a build session closes
pub trait Backend {
    /// Write out a successfully built drawing
    fn export(&mut self, drawing: &Drawing, options: &ExportOptions) -> Result<(), ExportError>;

    /// Called instead of `export` when the build failed. Whatever was placed
    /// before the failure is passed along; the default discards it.
    fn abandon(&mut self, _drawing: &Drawing, _error: &LayoutError) {}
}

/// Run a build session.
///
/// The closure places elements on a fresh [`Session`]. When it returns, the
/// log is handed to the backend on every path: `export` on success, `abandon`
/// on a layout error. The resolved drawing is returned to the caller.
///
/// An invalid unit or dpi fails before the session opens; the backend is not
/// called at all.
pub fn build<B, F>(
    backend: &mut B,
    config: SessionConfig,
    options: &ExportOptions,
    f: F,
) -> Result<Drawing, BuildError>
where
    B: Backend + ?Sized,
    F: FnOnce(&mut Session) -> Result<(), LayoutError>,
{
    options.validate()?;
    let mut session = Session::new(config)?;
    let result = f(&mut session);
    let drawing = session.into_drawing();

    match result {
        Ok(()) => {
            info!(elements = drawing.elements.len(); "Exporting drawing");
            backend.export(&drawing, options)?;
            Ok(drawing)
        }
        Err(err) => {
            warn!(index = err.index(), placed = drawing.elements.len(); "Build abandoned: {err}");
            backend.abandon(&drawing, &err);
            Err(err.into())
        }
    }
}
