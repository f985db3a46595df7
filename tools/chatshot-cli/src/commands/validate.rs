//! Validate a conversation document.

use std::path::PathBuf;

use super::load_conversation;

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    println!("Validating conversation at: {}", path.display());

    let conversation = load_conversation(&path)?;
    println!("  Assistant: {}", conversation.assistant_name);
    println!("  Messages: {}", conversation.len());

    let errors = conversation.validate();
    if errors.is_empty() {
        println!("\nConversation is valid.");
        if conversation.is_empty() {
            println!("Note: an empty conversation can be screenshotted but not animated.");
        }
    } else {
        println!("\nValidation issues:");
        for error in &errors {
            println!("  - {error}");
        }
        println!("\n{} issue(s) found.", errors.len());
    }

    Ok(())
}
