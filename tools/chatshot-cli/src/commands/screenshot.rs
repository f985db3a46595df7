//! Export a PNG screenshot.

use std::path::PathBuf;

use chatshot_common::config::AppConfig;

use super::{load_conversation, orchestrator};

pub async fn run(
    path: PathBuf,
    output: PathBuf,
    scale: Option<u32>,
    mut config: AppConfig,
) -> anyhow::Result<()> {
    println!("Capturing screenshot of: {}", path.display());

    let conversation = load_conversation(&path)?;
    if let Some(scale) = scale {
        config.export.still_scale = scale;
    }
    println!("  Scale: {}x", config.export.still_scale);

    let orchestrator = orchestrator(config)?;
    let artifact = orchestrator.export_still(&conversation).await.map_err(|e| {
        println!("\nScreenshot failed: {e}");
        e
    })?;

    let written = artifact.write_to(&output)?;
    println!(
        "\nScreenshot saved: {} ({}x{})",
        written.display(),
        artifact.width,
        artifact.height
    );

    Ok(())
}
