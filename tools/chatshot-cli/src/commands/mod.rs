pub mod check;
pub mod export;
pub mod info;
pub mod init;
pub mod screenshot;
pub mod validate;

use std::io::Write;
use std::path::Path;

use chatshot_chat_model::Conversation;
use chatshot_common::config::AppConfig;
use chatshot_render_engine::{ExportOrchestrator, ExportProgress};

pub(crate) fn load_conversation(path: &Path) -> anyhow::Result<Conversation> {
    Conversation::load(path).map_err(|e| anyhow::anyhow!("Failed to load conversation: {e}"))
}

/// Orchestrator that prints progress on a single terminal line.
pub(crate) fn orchestrator(config: AppConfig) -> anyhow::Result<ExportOrchestrator> {
    config
        .export
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid export settings: {e}"))?;

    Ok(
        ExportOrchestrator::new(config.export, config.assets).on_progress(Box::new(
            |p: ExportProgress| {
                print!(
                    "\r  Progress: {:>5.1}%  {:<32}",
                    p.fraction * 100.0,
                    p.label
                );
                let _ = std::io::stdout().flush();
            },
        )),
    )
}
