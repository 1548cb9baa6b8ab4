//! Schemline - a layout engine for schematic drawings
//!
//! Elements are placed one command at a time, each anchored on the terminals
//! of elements already placed. A closed build hands the resolved drawing to a
//! backend, which here writes SVG.
//!
//! # Example
//!
//! ```rust
//! use schemline::render;
//!
//! let svg = render("V1 = source_v up label \"5 V\"\nresistor right\nline down").unwrap();
//! assert!(svg.contains("<svg"));
//! assert!(svg.contains("5 V"));
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod layout;
pub mod parser;
pub mod renderer;
pub mod script;

use std::path::Path;

pub use config::{Config, ConfigError};
pub use error::ParseError;
pub use export::{build, Backend, BuildError, ExportError, ExportOptions};
pub use layout::{Drawing, LayoutError, PlaceCommand, Session, SessionConfig};
pub use parser::{parse, Document, Span};
pub use renderer::{render_svg, SvgBuffer, SvgConfig, SvgFile};
pub use script::Script;

use thiserror::Error;

/// Errors that can occur during the render pipeline
#[derive(Debug, Error)]
pub enum RenderError {
    /// Error during parsing or script validation
    #[error("parse errors: {}", format_parse_errors(.0))]
    Parse(Vec<ParseError>),

    /// Rejected configuration values
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Error during layout or export; `span` locates the failing statement
    #[error("{error}")]
    Build {
        #[source]
        error: BuildError,
        span: Option<Span>,
    },
}

impl From<Vec<ParseError>> for RenderError {
    fn from(errors: Vec<ParseError>) -> Self {
        RenderError::Parse(errors)
    }
}

fn format_parse_errors(errors: &[ParseError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl RenderError {
    /// Format the error as ariadne reports against the script source
    pub fn format(&self, source: &str, filename: &str) -> String {
        match self {
            RenderError::Parse(errors) => errors
                .iter()
                .map(|e| e.format(source, filename))
                .collect::<Vec<_>>()
                .join("\n"),
            RenderError::Build {
                error: BuildError::Layout(err),
                span: Some(span),
            } => {
                let help = err
                    .suggestions()
                    .map(|names| format!("did you mean {}?", quoted_list(names)));
                error::format_report(
                    source,
                    filename,
                    span.clone(),
                    &err.to_string(),
                    "this statement cannot be placed",
                    help,
                )
            }
            RenderError::Config(error) => format!("{}: {}", filename, error),
            RenderError::Build { error, .. } => format!("{}: {}", filename, error),
        }
    }
}

fn quoted_list(names: &[String]) -> String {
    names
        .iter()
        .map(|n| format!("'{}'", n))
        .collect::<Vec<_>>()
        .join(" or ")
}

/// Render script source to SVG with the default configuration
pub fn render(source: &str) -> Result<String, RenderError> {
    render_with_config(source, &Config::default())
}

/// Render script source to SVG with a custom configuration
///
/// # Example
///
/// ```rust
/// use schemline::{render_with_config, Config};
///
/// let config: Config = "[style]\nstroke = \"#303030\"".parse().unwrap();
/// let svg = render_with_config("resistor right", &config).unwrap();
/// assert!(svg.contains("#303030"));
/// ```
pub fn render_with_config(source: &str, config: &Config) -> Result<String, RenderError> {
    let mut backend = SvgBuffer::new(config.svg());
    run_script(source, config, &mut backend)?;
    Ok(backend.take().unwrap_or_default())
}

/// Render script source straight to an SVG file
///
/// The file is only written when the whole script builds.
pub fn render_to_file(source: &str, path: &Path, config: &Config) -> Result<Drawing, RenderError> {
    let mut backend = SvgFile::new(path).with_config(config.svg());
    run_script(source, config, &mut backend)
}

fn run_script<B: Backend + ?Sized>(
    source: &str,
    config: &Config,
    backend: &mut B,
) -> Result<Drawing, RenderError> {
    config.validate()?;
    let script = Script::parse(source)?;
    build(
        backend,
        config.session(),
        &config.export_options(),
        |session| script.run(session),
    )
    .map_err(|error| {
        let span = match &error {
            BuildError::Layout(err) => script.span_of(err.index()),
            BuildError::Config(_) | BuildError::Export(_) => None,
        };
        RenderError::Build { error, span }
    })
}
