//! # Export
//!
//! Plain-text renderings of a [`ContentPackage`] and clipboard copy.
//!
//! The clipboard is reached with an OSC 52 escape sequence, which most
//! modern terminals (and tmux with `set-clipboard on`) forward to the system
//! clipboard, including over SSH.

use crate::generator::ContentPackage;
use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::fmt::Write as _;
use std::io::Write;

const SEPARATOR: &str = "-------------------------";

/// Full package as plain text: titles, then every segment with its points and links
pub fn format_package_text(package: &ContentPackage) -> String {
    let mut out = String::new();

    out.push_str("Title Suggestions:\n");
    for title in &package.titles {
        let _ = writeln!(out, "- {}", title);
    }
    let _ = write!(out, "\n{}\n\n", SEPARATOR);

    out.push_str("Script/Outline:\n\n");
    for segment in &package.script {
        let _ = write!(out, "## {}\n\n", segment.segment_title);

        out.push_str("Talking Points:\n");
        for point in &segment.talking_points {
            let _ = writeln!(out, "- {}", point);
        }

        out.push_str("\nMedia Links:\n");
        for link in &segment.media_links {
            let _ = writeln!(out, "- {}: {}", link.description, link.url);
        }

        let _ = write!(out, "\n{}\n\n", SEPARATOR);
    }

    out
}

/// Media link URLs, one per line. `None` when the package has no links.
pub fn format_media_links(package: &ContentPackage) -> Option<String> {
    let urls: Vec<&str> = package
        .script
        .iter()
        .flat_map(|s| &s.media_links)
        .map(|link| link.url.as_str())
        .collect();

    if urls.is_empty() {
        None
    } else {
        Some(urls.join("\n"))
    }
}

/// OSC 52 "set clipboard" sequence for `text`
pub fn osc52_sequence(text: &str) -> String {
    format!("\x1b]52;c;{}\x07", STANDARD.encode(text))
}

/// Copy `text` to the system clipboard through the terminal
pub fn copy_to_clipboard(out: &mut (impl Write + ?Sized), text: &str) -> Result<()> {
    out.write_all(osc52_sequence(text).as_bytes())
        .context("Failed to write clipboard sequence")?;
    out.flush().context("Failed to flush clipboard sequence")?;
    Ok(())
}
