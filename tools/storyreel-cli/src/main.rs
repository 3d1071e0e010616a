//! storyreel CLI: turn still images and a caption script into a video.
//!
//! Usage:
//!   storyreel render --images <FILES...>   Render one job
//!   storyreel check                        Check engine and speech service
//!   storyreel captions <TEXT> --duration   Print a compiled caption document
//!   storyreel init-config                  Write the default config file

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use storyreel_common::config::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "storyreel",
    about = "Image slideshows with animated captions and narration",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file to use instead of the standard location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render images into a single video
    Render {
        /// Ordered input images
        #[arg(long, num_args = 1.., required = true)]
        images: Vec<PathBuf>,

        /// Caption script, one line per image
        #[arg(long)]
        script: Option<PathBuf>,

        /// Where to place the final video
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Aspect ratio: 16:9, 9:16, or 1:1
        #[arg(long, default_value = "16:9")]
        aspect: String,

        /// Quality tier: preview or final
        #[arg(long, default_value = "final")]
        quality: String,

        /// Colour grade: none, warm, cool, vivid, mono, cinematic, vintage
        #[arg(long, default_value = "none")]
        grade: String,

        /// Caption highlight colour (palette name or hex)
        #[arg(long, default_value = "yellow")]
        text_color: String,

        /// Font file or family key (sans, serif, mono)
        #[arg(long)]
        font: Option<String>,

        /// Caption reveal effect
        #[arg(long, default_value = "per-word")]
        effect: String,

        /// Synthesize narration from the captions
        #[arg(long)]
        narrate: bool,

        /// Narration voice
        #[arg(long, requires = "narrate")]
        voice: Option<String>,

        /// Background music, looped under the whole video
        #[arg(long)]
        music: Option<PathBuf>,

        /// Reject scripts whose line count differs from the image count
        #[arg(long)]
        strict: bool,

        /// Use a static text overlay instead of subtitle rendering
        #[arg(long)]
        drawtext: bool,
    },

    /// Report engine location and speech-service liveness
    Check,

    /// Print the caption document compiled for one line of text
    Captions {
        /// Caption text
        text: String,

        /// Scene duration in seconds
        #[arg(long)]
        duration: f64,

        /// Caption reveal effect
        #[arg(long, default_value = "per-word")]
        effect: String,

        /// Aspect ratio: 16:9, 9:16, or 1:1
        #[arg(long, default_value = "16:9")]
        aspect: String,

        /// Quality tier: preview or final
        #[arg(long, default_value = "final")]
        quality: String,
    },

    /// Write the default config file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => {
            let mut config = AppConfig::load_from(path);
            config.apply_env_overrides();
            config
        }
        None => AppConfig::load(),
    };
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    storyreel_common::logging::init_logging(&config.logging);

    match cli.command {
        Commands::Render {
            images,
            script,
            output,
            aspect,
            quality,
            grade,
            text_color,
            font,
            effect,
            narrate,
            voice,
            music,
            strict,
            drawtext,
        } => {
            let args = commands::render::RenderArgs {
                images,
                script,
                output,
                aspect,
                quality,
                grade,
                text_color,
                font,
                effect,
                narrate,
                voice,
                music,
                strict,
                drawtext,
            };
            commands::render::run(&config, args).await
        }
        Commands::Check => commands::check::run(&config).await,
        Commands::Captions {
            text,
            duration,
            effect,
            aspect,
            quality,
        } => commands::captions::run(text, duration, effect, aspect, quality),
        Commands::InitConfig { force } => commands::init_config::run(cli.config, force),
    }
}
