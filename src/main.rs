// Entrypoint for the CLI application.
// - Keeps `main` small: parse arguments, set up logging, pick a clipboard
//   and hand everything to the UI flow.
// - Returns `anyhow::Result` so any failure is printed and exits non-zero.

use clap::Parser;
use ptpimg_uploader::{clipboard, config::Args, ui};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // RUST_LOG overrides the level chosen with -v.
    env_logger::Builder::new()
        .filter_level(args.log_level())
        .parse_default_env()
        .init();

    let clipboard = clipboard::detect();
    ui::run(&args, clipboard.as_ref())?;
    Ok(())
}
