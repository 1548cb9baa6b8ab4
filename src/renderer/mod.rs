//! SVG backend for finished drawings
//!
//! [`render_svg`] turns a resolved [`Drawing`] into an SVG document. The
//! backends below plug that into a build session: [`SvgFile`] writes the
//! document to disk on export, [`SvgBuffer`] keeps it in memory.

pub mod config;
pub mod svg;

use std::path::PathBuf;

use log::info;

pub use config::SvgConfig;
pub use svg::render_svg;

use crate::export::{Backend, ExportError, ExportOptions};
use crate::layout::Drawing;

/// Writes the drawing to a file when the session exports
#[derive(Debug, Clone)]
pub struct SvgFile {
    pub path: PathBuf,
    pub config: SvgConfig,
}

impl SvgFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            config: SvgConfig::default(),
        }
    }

    pub fn with_config(mut self, config: SvgConfig) -> Self {
        self.config = config;
        self
    }
}

impl Backend for SvgFile {
    fn export(&mut self, drawing: &Drawing, options: &ExportOptions) -> Result<(), ExportError> {
        let svg = render_svg(drawing, &self.config, options);
        std::fs::write(&self.path, svg).map_err(|source| ExportError::Io {
            path: self.path.clone(),
            source,
        })?;
        info!(path:? = self.path, elements = drawing.elements.len(); "Wrote SVG");
        Ok(())
    }

    // A failed build leaves any existing file untouched
}

/// Keeps the rendered document in memory
#[derive(Debug, Clone, Default)]
pub struct SvgBuffer {
    pub config: SvgConfig,
    pub svg: Option<String>,
}

impl SvgBuffer {
    pub fn new(config: SvgConfig) -> Self {
        Self { config, svg: None }
    }

    /// Take the rendered document, if the session exported one
    pub fn take(&mut self) -> Option<String> {
        self.svg.take()
    }
}

impl Backend for SvgBuffer {
    fn export(&mut self, drawing: &Drawing, options: &ExportOptions) -> Result<(), ExportError> {
        self.svg = Some(render_svg(drawing, &self.config, options));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{build, BuildError};
    use crate::layout::{LayoutError, PlaceCommand, SessionConfig};
    use crate::parser::ast::{ElementKind, PointExpr};

    #[test]
    fn test_file_written_on_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.svg");
        let mut backend = SvgFile::new(&path);

        build(&mut backend, SessionConfig::default(), &ExportOptions::default(), |s| {
            s.place(&PlaceCommand::new(ElementKind::Resistor).right())?;
            Ok(())
        })
        .unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("sch-resistor"));
    }

    #[test]
    fn test_no_file_on_failed_build() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.svg");
        let mut backend = SvgFile::new(&path);

        let result = build(&mut backend, SessionConfig::default(), &ExportOptions::default(), |s| {
            s.place(&PlaceCommand::new(ElementKind::Resistor).right())?;
            s.place(&PlaceCommand::new(ElementKind::Line).at(PointExpr::nth(0, "gate")))?;
            Ok(())
        });

        assert!(matches!(
            result,
            Err(BuildError::Layout(LayoutError::UnresolvedAnchor { .. }))
        ));
        assert!(!path.exists());
    }

    #[test]
    fn test_io_error_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.svg");
        let mut backend = SvgFile::new(&path);

        let result = build(&mut backend, SessionConfig::default(), &ExportOptions::default(), |s| {
            s.place(&PlaceCommand::new(ElementKind::Line))?;
            Ok(())
        });

        assert!(matches!(result, Err(BuildError::Export(ExportError::Io { .. }))));
    }

    #[test]
    fn test_buffer_backend() {
        let mut backend = SvgBuffer::default();
        build(&mut backend, SessionConfig::default(), &ExportOptions::default(), |s| {
            s.place(&PlaceCommand::new(ElementKind::Capacitor).down())?;
            Ok(())
        })
        .unwrap();

        let svg = backend.take().unwrap();
        assert!(svg.contains("sch-capacitor"));
        assert!(backend.take().is_none());
    }
}
