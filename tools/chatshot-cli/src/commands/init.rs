//! Write a starter conversation document.

use std::path::PathBuf;

use chatshot_chat_model::Conversation;

pub fn run(path: PathBuf, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    let conversation = Conversation::sample();
    conversation
        .save(&path)
        .map_err(|e| anyhow::anyhow!("Failed to write conversation: {e}"))?;

    println!("Created conversation at {}", path.display());
    println!("  Assistant: {}", conversation.assistant_name);
    println!("  Messages: {}", conversation.len());
    println!();
    println!("Edit the file, then run:");
    println!("  chatshot screenshot {}", path.display());
    println!("  chatshot export {}", path.display());

    Ok(())
}
