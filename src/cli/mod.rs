//! CLI Module
//!
//! Command-line interface for inspecting and compositing artboard documents.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::filters::{CurveChannel, CurvePoint};

/// Artboard - non-destructive adjustment layer compositor
#[derive(Parser, Debug)]
#[command(name = "artboard")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Engine configuration file (JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Composite a document and print each raster layer's filter chain
    #[command(name = "composite")]
    Composite {
        /// Path to the document
        document: PathBuf,

        /// Print the chains as JSON
        #[arg(long)]
        json: bool,
    },

    /// List a document's layers bottom to top
    #[command(name = "inspect")]
    Inspect {
        /// Path to the document
        document: PathBuf,
    },

    /// Print the lookup table for a tone curve
    #[command(name = "lut")]
    Lut {
        /// Control point as `x,y` in [0, 1]; repeatable
        #[arg(short, long = "point", value_parser = parse_point)]
        points: Vec<CurvePoint>,

        /// Channel the curve applies to
        #[arg(long, default_value = "rgb")]
        channel: CurveChannel,

        /// Blend factor against the identity
        #[arg(long, default_value_t = 1.0)]
        intensity: f32,
    },

    /// Validate every document in a directory
    #[command(name = "check")]
    Check {
        /// Directory to scan for `.json` documents
        dir: PathBuf,
    },
}

/// Parse `x,y` into a curve point
pub fn parse_point(value: &str) -> Result<CurvePoint, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected 'x,y', got '{}'", value))?;
    let x: f32 = x.trim().parse().map_err(|_| format!("invalid x in '{}'", value))?;
    let y: f32 = y.trim().parse().map_err(|_| format!("invalid y in '{}'", value))?;
    Ok(CurvePoint::new(x, y))
}
