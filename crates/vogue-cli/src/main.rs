use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use vogue_infrastructure::VoguePaths;

mod commands;

#[derive(Parser)]
#[command(name = "vogue")]
#[command(about = "Vogue - AI outfit critique and virtual try-on", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Use this directory instead of the platform config directory
    #[arg(long, global = true, value_name = "DIR")]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Critique the outfit in a photo
    Analyze {
        /// Photo of the person
        photo: PathBuf,
    },
    /// Render the person in a new outfit and save the result
    TryOn(TryOnArgs),
    /// List the quick-pick style presets
    Presets,
    /// Interactive styling session
    Shell,
}

#[derive(Args)]
struct TryOnArgs {
    /// Photo of the person
    photo: PathBuf,

    #[command(flatten)]
    outfit: OutfitArgs,

    /// Where to save the generated image (defaults to `output_file` in config.toml)
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,
}

/// Exactly one way of describing the outfit.
#[derive(Args)]
#[group(required = true, multiple = false)]
struct OutfitArgs {
    /// Free-text description of the outfit
    #[arg(short, long)]
    prompt: Option<String>,

    /// Preset number as listed by `vogue presets`
    #[arg(long, value_name = "N")]
    preset: Option<usize>,

    /// Photo of a garment to try on
    #[arg(short, long, value_name = "PATH")]
    garment: Option<PathBuf>,
}

impl OutfitArgs {
    fn into_outfit(self) -> commands::try_on::Outfit {
        use commands::try_on::Outfit;
        match (self.prompt, self.preset, self.garment) {
            (_, _, Some(path)) => Outfit::Garment(path),
            (_, Some(number), _) => Outfit::Preset(number),
            (Some(text), _, _) => Outfit::Prompt(text),
            (None, None, None) => Outfit::Prompt(String::new()),
        }
    }
}

/// Installs the global subscriber. Logs go to a daily rolling file in the
/// logs directory, or to stderr when that directory is unavailable.
fn setup_logging(paths: &VoguePaths, debug: bool) -> Option<WorkerGuard> {
    let level = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let logs_dir = paths
        .logs_dir()
        .ok()
        .filter(|dir| std::fs::create_dir_all(dir).is_ok());

    match logs_dir {
        Some(dir) => {
            let file_appender = tracing_appender::rolling::daily(dir, "vogue.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_writer(non_blocking)
                        .with_ansi(false)
                        .with_target(true)
                        .with_line_number(true),
                )
                .with(filter)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr))
                .with(filter)
                .init();
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let paths = VoguePaths::new(cli.config_dir.as_deref());
    let _guard = setup_logging(&paths, cli.debug);

    match cli.command {
        Commands::Analyze { photo } => commands::analyze::run(&paths, &photo).await?,
        Commands::TryOn(args) => {
            commands::try_on::run(
                &paths,
                &args.photo,
                args.outfit.into_outfit(),
                args.output.as_deref(),
            )
            .await?
        }
        Commands::Presets => commands::presets::run(),
        Commands::Shell => commands::shell::run(&paths).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use commands::try_on::Outfit;

    #[test]
    fn test_try_on_requires_exactly_one_outfit() {
        assert!(Cli::try_parse_from(["vogue", "try-on", "me.jpg"]).is_err());
        assert!(
            Cli::try_parse_from(["vogue", "try-on", "me.jpg", "--prompt", "x", "--preset", "1"])
                .is_err()
        );
    }

    #[test]
    fn test_try_on_parses_garment() {
        let cli = Cli::try_parse_from([
            "vogue", "try-on", "me.jpg", "--garment", "coat.png", "-o", "out.png",
        ])
        .unwrap();
        let Commands::TryOn(args) = cli.command else {
            panic!("expected try-on");
        };
        assert_eq!(args.output, Some(PathBuf::from("out.png")));
        assert!(matches!(
            args.outfit.into_outfit(),
            Outfit::Garment(path) if path == PathBuf::from("coat.png")
        ));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["vogue", "presets", "--debug", "--config-dir", "/tmp/v"])
            .unwrap();
        assert!(cli.debug);
        assert_eq!(cli.config_dir, Some(PathBuf::from("/tmp/v")));
    }
}
