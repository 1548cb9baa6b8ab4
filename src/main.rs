//! Schemline CLI
//!
//! Usage:
//!   schemline [OPTIONS] <SCRIPT>
//!
//! Options:
//!   -o, --output <FILE>      Output SVG path (defaults to the script path with .svg)
//!   -c, --config <FILE>      Configuration file (TOML format)
//!       --dpi <N>            Output resolution
//!       --transparent        Skip the background fill
//!       --log-level <LEVEL>  Log level (default: warn)
//!   -g, --grammar            Show script language reference
//!   -h, --help               Print help

use std::fs;
use std::path::PathBuf;
use std::process;
use std::str::FromStr;

use clap::Parser;
use log::{debug, error, info, LevelFilter};

use schemline::{render_to_file, Config};

#[derive(Debug, Parser)]
#[command(name = "schemline")]
#[command(about = "Lay out and draw circuit schematics from a placement script")]
struct Cli {
    /// Script file
    #[arg(required_unless_present = "grammar")]
    input: Option<PathBuf>,

    /// Output SVG path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Configuration file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output resolution in dots per inch
    #[arg(long)]
    dpi: Option<f64>,

    /// Skip the background fill
    #[arg(long)]
    transparent: bool,

    /// Log level: off, error, warn, info, debug, trace
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Show script language reference
    #[arg(short, long)]
    grammar: bool,
}

fn main() {
    let cli = Cli::parse();

    let log_level = LevelFilter::from_str(&cli.log_level).unwrap_or_else(|_| {
        eprintln!("Invalid log level: {}. Using 'warn' instead.", cli.log_level);
        LevelFilter::Warn
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    debug!(cli:?; "Parsed arguments");

    if cli.grammar {
        print_grammar();
        return;
    }

    let Some(input) = cli.input.as_ref() else {
        eprintln!("Error: no script given");
        process::exit(2);
    };

    let mut config = match &cli.config {
        Some(path) => match Config::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                process::exit(1);
            }
        },
        None => Config::default(),
    };

    // Flags win over the file
    if let Some(dpi) = cli.dpi {
        config.export.dpi = dpi;
    }
    if cli.transparent {
        config.export.transparent = true;
    }
    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    let source = match fs::read_to_string(input) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", input.display(), e);
            process::exit(1);
        }
    };

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| input.with_extension("svg"));
    info!(input:? = input, output:? = output; "Building drawing");

    let filename = input.display().to_string();
    match render_to_file(&source, &output, &config) {
        Ok(drawing) => {
            info!(elements = drawing.elements.len(); "Completed successfully");
        }
        Err(e) => {
            error!("Build failed: {e}");
            eprintln!("{}", e.format(&source, &filename));
            process::exit(1);
        }
    }
}

fn print_grammar() {
    println!(
        r#"SCHEMLINE SCRIPT LANGUAGE
=========================

One statement per line. Comments: // line, /* block */

STATEMENTS
----------
unit <number>                  Default length of two-terminal elements
push / pop                     Save / restore current point and direction
[name =] <kind> [settings] <placement>...

KINDS
-----
line resistor capacitor inductor       Two-terminal, default length = unit
source_v source_i source_sin source_square
nfet pfet                              Terminals: drain source gate center [bulk]
dot ground label                       Markers, placed at a single point

PLACEMENT
---------
up | down | left | right       Direction (theta 90, 270, 180, 0)
theta <degrees>                Explicit direction
length <number>                Override the unit
at <point>                     Start (or anchor) at a point
chain                          Start at the previous element's end (default)
to <point>                     End exactly at a point
tox <point> / toy <point>      Run until x / y matches the point
anchor <terminal>              Which terminal sits on the start point
reverse / flip                 Mirror along / across the element axis
dot / idot [open: true]        Junction dot at the end / start
label "text" [loc: top, ofst: 0.1]
label ("+", "v", "-")          Spread label along the element

POINTS
------
(x, y)   here   R1.end   last.start   #0.center   mid(a, b)
a + b    a - b    a * 2    a / 2    (a)

SETTINGS
--------
bulk: true        Transistors draw the bulk terminal
open: true        Open dot marker
color: red        Stroke color
lw: 0.08          Line width

EXAMPLE
-------
V1 = source_v up label "5 V"
R1 = resistor right label "1 k$\Omega$"
C1 = capacitor down label "1 $\mu$F"
line to V1.start"#
    );
}
