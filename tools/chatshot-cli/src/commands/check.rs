//! Check fonts, presets and effective configuration.

use chatshot_chat_model::BACKGROUND_IMAGE_PRESETS;
use chatshot_common::config::{config_file_path, AppConfig};

pub fn run(config: &AppConfig) -> anyhow::Result<()> {
    println!("Chatshot System Check");
    println!("{}", "=".repeat(50));

    let config_path = config_file_path();
    if config_path.exists() {
        println!("[OK] Config: {}", config_path.display());
    } else {
        println!("[--] Config: {} (not found, using defaults)", config_path.display());
    }

    let font_ok = match config.assets.resolve_font() {
        Some(font) if font.exists() => {
            println!("[OK] Font: {}", font.display());
            true
        }
        Some(font) => {
            println!("[FAIL] Font: {} does not exist", font.display());
            false
        }
        None => {
            println!("[FAIL] Font: none of the candidate fonts were found");
            for candidate in &config.assets.font_candidates {
                println!("       tried {}", candidate.display());
            }
            false
        }
    };

    let presets_dir = &config.assets.presets_dir;
    let available: Vec<&str> = BACKGROUND_IMAGE_PRESETS
        .iter()
        .copied()
        .filter(|name| config.assets.preset_path(name).exists())
        .collect();
    if available.len() == BACKGROUND_IMAGE_PRESETS.len() {
        println!("[OK] Background presets: {}", presets_dir.display());
    } else {
        println!(
            "[WARN] Background presets: {}/{} found in {}",
            available.len(),
            BACKGROUND_IMAGE_PRESETS.len(),
            presets_dir.display()
        );
    }

    println!();
    println!("Export settings:");
    let export = &config.export;
    println!("  Animation scale: {}x", export.resolution_scale);
    println!("  Screenshot scale: {}x", export.still_scale);
    println!("  GIF quality: {} (1 = best, 30 = fastest)", export.gif_quality);
    println!("  Reveal pacing factor: {}", export.reveal_pacing_factor);
    println!("  Scroll settle: {}ms", export.scroll_settle_ms);
    println!("  Asset timeout: {}s", export.asset_timeout_secs);
    println!("  Capture weight: {}", export.capture_weight);
    match export.validate() {
        Ok(()) => println!("[OK] Export settings valid"),
        Err(e) => println!("[FAIL] Export settings: {e}"),
    }

    println!();
    if font_ok {
        println!("Chatshot is ready.");
    } else {
        println!("No usable font. Set assets.font_path in the config or pass --font.");
    }

    Ok(())
}
