// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use view_synthesis::app::AppModel;
use view_synthesis::constants::ui;
use view_synthesis::i18n;

mod cli;

#[derive(Parser)]
#[command(name = "view-synthesis")]
#[command(about = "Front-end for a depth-image-based view synthesis renderer")]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a job without opening the window
    Render {
        #[command(flatten)]
        job: cli::JobArgs,

        #[command(flatten)]
        renderer: cli::RendererArgs,

        /// Print the render report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate a job and print the renderer command lines
    Check {
        #[command(flatten)]
        job: cli::JobArgs,

        #[command(flatten)]
        renderer: cli::RendererArgs,

        /// Print the job and command lines as JSON
        #[arg(long)]
        json: bool,
    },

    /// Remove input lines left in the renderer configurations by an interrupted run
    Clean {
        /// Renderer installation directory (default: the one from the settings)
        #[arg(long)]
        renderer_dir: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=view_synthesis=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Render {
            job,
            renderer,
            json,
        }) => cli::render(job, renderer, json),
        Some(Commands::Check {
            job,
            renderer,
            json,
        }) => cli::check(job, renderer, json),
        Some(Commands::Clean { renderer_dir }) => cli::clean(renderer_dir),
        None => run_gui(),
    }
}

fn run_gui() -> Result<(), Box<dyn std::error::Error>> {
    // Get the system's preferred languages.
    let requested_languages = i18n_embed::DesktopLanguageRequester::requested_languages();

    // Enable localizations to be applied.
    i18n::init(&requested_languages);

    // Settings for configuring the application window and iced runtime.
    let settings = cosmic::app::Settings::default().size_limits(
        cosmic::iced::Limits::NONE
            .min_width(ui::MIN_WINDOW_WIDTH)
            .min_height(ui::MIN_WINDOW_HEIGHT),
    );

    // Starts the application's event loop with `()` as the application's flags.
    cosmic::app::run::<AppModel>(settings, ())?;

    Ok(())
}
