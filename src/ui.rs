// UI layer: the terminal flow behind the binary. Collects the items (from
// arguments and the clipboard), finds an API key, runs the uploads behind a
// spinner and prints the results.

use crate::api::Uploader;
use crate::clipboard::Clipboard;
use crate::config::Args;
use anyhow::{bail, Context, Result};
use crossterm::tty::IsTty;
use dialoguer::{Confirm, Password};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

const KEY_FILE_NAME: &str = ".ptpimg_api_key";

/// Run one invocation of the uploader. Returns the uploaded URLs after they
/// have been printed.
pub fn run(args: &Args, clipboard: &dyn Clipboard) -> Result<Vec<String>> {
    let images = collect_images(args, clipboard)?;
    if images.is_empty() {
        bail!("Nothing to upload");
    }

    let api_key = resolve_api_key(args)?;
    let uploader = Uploader::new(args.uploader_config(api_key))
        .context("Failed to build HTTP client")?;

    // indicatif hides the spinner by itself when stderr is not a terminal.
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(format!("Uploading {} image(s)...", images.len()));
    spinner.enable_steady_tick(Duration::from_millis(100));
    let result = uploader.upload(&images);
    spinner.finish_and_clear();
    let image_urls = result?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for line in render(&image_urls, args.bbcode) {
        writeln!(out, "{}", line)?;
    }

    if !args.dont_copy && clipboard.is_available() {
        if let Err(e) = clipboard.copy(&image_urls.join("\n")) {
            log::warn!("Failed to copy URLs to clipboard: {}", e);
        }
    }

    if !args.nobell && stdout.is_tty() {
        out.write_all(b"\x07")?;
    }
    out.flush()?;

    Ok(image_urls)
}

/// Positional items first, then the clipboard content when `--clip` is set.
pub fn collect_images(args: &Args, clipboard: &dyn Clipboard) -> Result<Vec<String>> {
    let mut images = args.images.clone();
    if args.clip {
        if !clipboard.is_available() {
            bail!("--clip was given but no clipboard is available");
        }
        let pasted = clipboard.paste().context("Failed to read clipboard")?;
        images.push(pasted);
    }
    Ok(images)
}

/// Wrap each URL in `[img]` tags when BBCode output is requested.
pub fn render(image_urls: &[String], bbcode: bool) -> Vec<String> {
    image_urls
        .iter()
        .map(|url| {
            if bbcode {
                format!("[img]{}[/img]", url)
            } else {
                url.clone()
            }
        })
        .collect()
}

/// Find the API key: command line or environment, then the saved key file,
/// then an interactive prompt.
pub fn resolve_api_key(args: &Args) -> Result<String> {
    let key_file = key_path();
    let interactive = io::stdin().is_tty();
    let key = resolve_api_key_from(args.api_key.as_deref(), &key_file, interactive)?;

    if args.save_key {
        persist_key(&key_file, &key)?;
    }
    Ok(key)
}

fn resolve_api_key_from(flag: Option<&str>, key_file: &Path, interactive: bool) -> Result<String> {
    if let Some(key) = flag.map(str::trim).filter(|k| !k.is_empty()) {
        return Ok(key.to_string());
    }

    match load_key(key_file) {
        Ok(key) => return Ok(key),
        Err(e) => log::debug!("No saved API key at {}: {}", key_file.display(), e),
    }

    if !interactive {
        bail!("Please specify an API key");
    }

    let key: String = Password::new().with_prompt("PTPImg API key").interact()?;
    let key = key.trim().to_string();
    if key.is_empty() {
        bail!("Please specify an API key");
    }
    if Confirm::new()
        .with_prompt("Save the API key for later runs?")
        .default(false)
        .interact()?
    {
        persist_key(key_file, &key)?;
    }
    Ok(key)
}

/// Key file in the user's home directory.
fn key_path() -> PathBuf {
    let dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    dir.join(KEY_FILE_NAME)
}

fn persist_key(path: &Path, key: &str) -> Result<()> {
    std::fs::write(path, key)
        .with_context(|| format!("Failed to save API key to {}", path.display()))?;
    log::info!("Saved API key to {}", path.display());
    Ok(())
}

fn load_key(path: &Path) -> Result<String> {
    let data = std::fs::read_to_string(path)?;
    let key = data.trim();
    if key.is_empty() {
        bail!("key file is empty");
    }
    Ok(key.to_string())
}
