//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::path::Path;

use log::{info, warn};
use serde_json::json;
use walkdir::WalkDir;

use crate::config::EngineConfig;
use crate::engine::{Compositor, RecordingTarget};
use crate::error::{ArtboardError, Result};
use crate::filters::{apply_lut, build_lut, CurveChannel, CurvePoint, FilterOp};
use crate::layers::{Document, Layer};

/// Load a document, composite it and print every raster layer's chain.
pub fn composite(path: &Path, config: EngineConfig, as_json: bool) -> Result<()> {
    info!("Compositing document: {}", path.display());

    let stack = Document::load(path)?.into_stack()?;
    let mut compositor = Compositor::with_config(RecordingTarget::new(), config).with_stack(stack);
    compositor.mount();
    compositor.tick();

    let target = compositor.target();
    let rasters: Vec<_> = compositor
        .stack()
        .raster_layers()
        .map(|(index, raster)| {
            let chain = target.chain_for(raster.id()).unwrap_or_default();
            (index, raster, chain)
        })
        .collect();

    if as_json {
        let out: Vec<_> = rasters
            .iter()
            .map(|(index, raster, chain)| {
                json!({
                    "index": index,
                    "id": raster.id(),
                    "name": raster.name(),
                    "filter_chain": chain,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    for (index, raster, chain) in rasters {
        println!("[{}] {}: {}", index, raster.name(), format_chain(chain));
    }
    Ok(())
}

/// Print the layers of a document bottom to top.
pub fn inspect(path: &Path) -> Result<()> {
    info!("Inspecting document: {}", path.display());

    let document = Document::load(path)?;
    println!("Document v{} saved {}", document.version, document.saved_at);

    let stack = document.into_stack()?;
    if stack.is_empty() {
        println!("  (no layers)");
        return Ok(());
    }

    for (index, layer) in stack.iter().enumerate() {
        let visibility = if layer.is_visible() { " " } else { "H" };
        match layer {
            Layer::Raster(raster) => println!(
                "  {:>3} {} raster     {:<24} base: {}",
                index,
                visibility,
                raster.name(),
                format_chain(raster.ground_truth())
            ),
            Layer::Adjustment(adjustment) => println!(
                "  {:>3} {} adjustment {:<24} {} @ {:.0}%",
                index,
                visibility,
                adjustment.name(),
                adjustment.settings().kind_name(),
                adjustment.intensity() * 100.0
            ),
        }
    }
    Ok(())
}

/// Print the 256-entry table for a curve, 16 entries per row.
pub fn lut(points: &[CurvePoint], channel: CurveChannel, intensity: f32) -> Result<()> {
    let table = build_lut(points);
    println!(
        "Curve on '{}' with {} control points at intensity {:.2}",
        channel,
        points.len(),
        intensity
    );
    if table.is_identity() {
        println!("(identity)");
    }

    let values: Vec<u8> = (0..=255u8).map(|v| apply_lut(&table, v, intensity)).collect();
    for (row, chunk) in values.chunks(16).enumerate() {
        let line: Vec<String> = chunk.iter().map(|v| format!("{:>3}", v)).collect();
        println!("{:>3}: {}", row * 16, line.join(" "));
    }
    Ok(())
}

/// Validate every `.json` document under `dir`.
pub fn check(dir: &Path) -> Result<()> {
    if !dir.exists() {
        return Err(ArtboardError::FileNotFound {
            path: dir.to_path_buf(),
        });
    }

    let mut checked = 0usize;
    let mut failed = 0usize;

    for entry in WalkDir::new(dir).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().map_or(true, |ext| ext != "json") {
            continue;
        }

        checked += 1;
        match Document::load(path).and_then(Document::into_stack) {
            Ok(stack) => println!("OK    {} ({} layers)", path.display(), stack.len()),
            Err(e) => {
                failed += 1;
                warn!("{}: {}", path.display(), e);
                println!("FAIL  {} [{}] {}", path.display(), e.error_code(), e);
            }
        }
    }

    println!("{} documents checked, {} failed", checked, failed);
    if failed > 0 {
        return Err(ArtboardError::invalid_document(format!(
            "{} of {} documents failed validation",
            failed, checked
        )));
    }
    Ok(())
}

fn format_chain(chain: &[FilterOp]) -> String {
    if chain.is_empty() {
        return "(none)".to_string();
    }
    chain
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}
