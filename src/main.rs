//! diagram-preview - render and live-preview diagram sources.

use anyhow::Result;
use clap::{ColorChoice, Parser};

use diagram_preview::cli::{self, Cli, Commands};
use diagram_preview::config::PreviewConfig;
use diagram_preview::logger;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    if let Commands::Backends = cli.command {
        cli::backends::print_table();
        return Ok(());
    }

    let config = PreviewConfig::load(cli.config.as_deref())?;

    match &cli.command {
        Commands::Render {
            file,
            output,
            format,
        } => cli::render::render_file(file, output, *format, config),
        Commands::Watch { file, output } => cli::watch::watch_file(file, output, config),
        Commands::Check => cli::check::check_tools(&config),
        Commands::Backends => Ok(()),
    }
}
