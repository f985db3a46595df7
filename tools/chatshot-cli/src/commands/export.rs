//! Export an animated GIF.

use std::path::PathBuf;

use chatshot_common::config::AppConfig;
use chatshot_common::error::ChatshotError;

use super::{load_conversation, orchestrator};

pub async fn run(
    path: PathBuf,
    output: PathBuf,
    scale: Option<u32>,
    mut config: AppConfig,
) -> anyhow::Result<()> {
    println!("Exporting animation for: {}", path.display());

    let conversation = load_conversation(&path)?;
    if let Some(scale) = scale {
        config.export.resolution_scale = scale;
    }

    println!("  Messages: {}", conversation.len());
    println!(
        "  Frame hold: {}s",
        conversation.timing.frame_hold.secs()
    );
    println!("  Scale: {}x", config.export.resolution_scale);

    let orchestrator = orchestrator(config)?;
    match orchestrator.run_export(&conversation).await {
        Ok(artifact) => {
            let written = artifact.write_to(&output)?;
            println!(
                "\nExport complete: {} ({}x{}, {} frames, {} KiB)",
                written.display(),
                artifact.width,
                artifact.height,
                artifact.frame_count,
                artifact.bytes.len() / 1024
            );
            Ok(())
        }
        Err(ChatshotError::EmptyConversation) => {
            println!();
            anyhow::bail!("Nothing to animate: the conversation has no messages")
        }
        Err(e) => {
            println!("\nExport failed: {e}");
            Err(e.into())
        }
    }
}
