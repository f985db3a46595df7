//! Show conversation information.

use std::path::PathBuf;

use chatshot_chat_model::{Background, Sender};

use super::load_conversation;

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    let c = load_conversation(&path)?;
    let (assistant, user) = c.sender_counts();

    println!("Conversation: {}", path.display());
    println!("  Version: {}", c.version);
    println!("  Assistant: {}", c.assistant_name);
    match &c.avatar {
        Some(avatar) => println!("  Avatar: {}", avatar.display()),
        None => println!("  Avatar: (placeholder)"),
    }
    println!();

    println!("Messages: {} ({assistant} assistant, {user} user)", c.len());
    for (i, m) in c.messages().iter().enumerate() {
        let who = match m.sender() {
            Sender::Assistant => "assistant",
            Sender::User => "user",
        };
        let first_line = m.lines().next().unwrap_or_default();
        let more = if m.lines().count() > 1 { " …" } else { "" };
        println!("  {:>3}. [{who:<9}] {first_line}{more}", i + 1);
    }
    println!();

    println!("Style:");
    println!("  Header: {}", c.header_color);
    println!("  Input bar: {}", c.input_bar_color);
    match &c.background {
        Background::Solid(color) => println!("  Background: {color}"),
        Background::Preset(name) => println!("  Background: preset {name}"),
        Background::Image(p) => println!("  Background: image {}", p.display()),
    }
    println!(
        "  Bubbles: assistant {} on {}, user {} on {}",
        c.bubbles.assistant_text, c.bubbles.assistant_fill, c.bubbles.user_text, c.bubbles.user_fill
    );
    println!("  Font size: {}pt", c.font_size.pt());
    println!("  Clock: {}", c.clock.label());
    println!();

    println!("Animation:");
    println!("  Reveal delay: {}s", c.timing.reveal_delay.secs());
    println!("  Frame hold: {}s", c.timing.frame_hold.secs());
    println!(
        "  Length: {} frame(s), {}s per loop",
        c.len(),
        c.len() as u64 * u64::from(c.timing.frame_hold.secs())
    );

    Ok(())
}
