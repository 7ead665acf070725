mod generate_cmd;
mod history_cmd;
mod scan_cmd;

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use qrstudio::codec::{BORDER_RANGE, HexColor, MODULE_SIZE_RANGE};
use qrstudio::config::StudioConfig;
use qrstudio::history::Backend;
use qrstudio::logging;

#[derive(Parser)]
#[command(
    name = "qrstudio",
    version,
    about = "Scan, generate and manage QR codes"
)]
struct Cli {
    /// Directory holding generated images and the history log
    #[arg(long, global = true)]
    store_dir: Option<PathBuf>,

    /// History backend: text (qr_data.txt) or sqlite (history.db)
    #[arg(long, global = true, value_parser = parse_backend)]
    backend: Option<Backend>,

    /// Show debug diagnostics on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a QR code from an image file or a captured frame on stdin
    Scan {
        /// Image to scan (PNG or JPEG)
        #[arg(required_unless_present = "stdin", conflicts_with = "stdin")]
        image: Option<PathBuf>,
        /// Read the image bytes from stdin
        #[arg(long)]
        stdin: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate a QR code and record it in the history
    Generate {
        /// Text or URL to encode
        #[arg(conflicts_with_all = ["image", "video"])]
        text: Option<String>,
        /// Encode the file name of an image (png, jpg, jpeg)
        #[arg(long, conflicts_with = "video")]
        image: Option<PathBuf>,
        /// Encode the file name of a video (mp4, mov, avi)
        #[arg(long)]
        video: Option<PathBuf>,
        /// Module colour, e.g. "#000000"
        #[arg(long, value_parser = parse_color)]
        color: Option<HexColor>,
        /// Background colour, e.g. "#FFFFFF"
        #[arg(long, value_parser = parse_color)]
        background: Option<HexColor>,
        /// Pixel size of one module (5-20)
        #[arg(long, value_parser = parse_module_size)]
        size: Option<u32>,
        /// Border width in modules (1-10)
        #[arg(long, value_parser = parse_border)]
        border: Option<u32>,
        /// Also write the PNG to this path
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Browse and manage generated codes
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum HistoryAction {
    /// List generated codes in creation order
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one code's payload and image path
    Show {
        /// Identifier (image file name) of the code
        identifier: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a code's record and image
    Delete {
        /// Identifier (image file name) of the code
        identifier: String,
    },
    /// Report records without images and images without records
    Check,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
}

fn parse_backend(s: &str) -> Result<Backend, String> {
    Backend::parse(s).ok_or_else(|| format!("unknown backend {s:?} (expected text or sqlite)"))
}

fn parse_color(s: &str) -> Result<HexColor, String> {
    s.parse::<HexColor>().map_err(|e| e.to_string())
}

fn parse_in_range(s: &str, range: &std::ops::RangeInclusive<u32>) -> Result<u32, String> {
    let value: u32 = s.parse().map_err(|_| format!("{s:?} is not a number"))?;
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(format!(
            "{value} is outside {}..={}",
            range.start(),
            range.end()
        ))
    }
}

fn parse_module_size(s: &str) -> Result<u32, String> {
    parse_in_range(s, &MODULE_SIZE_RANGE)
}

fn parse_border(s: &str) -> Result<u32, String> {
    parse_in_range(s, &BORDER_RANGE)
}

/// Effective configuration: files and environment, then global flags.
fn resolve_config(cli: &Cli) -> anyhow::Result<StudioConfig> {
    let cwd = std::env::current_dir().context("cannot determine working directory")?;
    let mut config = StudioConfig::load(&cwd)?;
    if let Some(dir) = &cli.store_dir {
        config.store_dir.clone_from(dir);
    }
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }
    Ok(config)
}

fn cmd_config_show(config: &StudioConfig) -> i32 {
    match config.to_toml() {
        Ok(rendered) => {
            print!("{rendered}");
            0
        }
        Err(e) => {
            eprintln!("[qrstudio] error: {e:#}");
            1
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<i32> {
    let code = match &cli.command {
        Commands::Scan { image, json, .. } => scan_cmd::cmd_scan(image.as_deref(), *json),
        Commands::Generate {
            text,
            image,
            video,
            color,
            background,
            size,
            border,
            output,
            json,
        } => {
            let args = generate_cmd::GenerateArgs {
                text: text.as_deref(),
                image: image.as_deref(),
                video: video.as_deref(),
                color: *color,
                background: *background,
                size: *size,
                border: *border,
                output: output.as_deref(),
                json: *json,
            };
            generate_cmd::cmd_generate(&resolve_config(cli)?, &args)
        }
        Commands::History { action } => {
            let config = resolve_config(cli)?;
            match action {
                HistoryAction::List { json } => history_cmd::cmd_history_list(&config, *json),
                HistoryAction::Show { identifier, json } => {
                    history_cmd::cmd_history_show(&config, identifier, *json)
                }
                HistoryAction::Delete { identifier } => {
                    history_cmd::cmd_history_delete(&config, identifier)
                }
                HistoryAction::Check => history_cmd::cmd_history_check(&config),
            }
        }
        Commands::Config {
            action: ConfigAction::Show,
        } => cmd_config_show(&resolve_config(cli)?),
    };
    Ok(code)
}

fn main() {
    let cli = Cli::parse();
    if !logging::init(cli.verbose) {
        eprintln!("[qrstudio] warning: a log subscriber is already installed");
    }
    let exit_code = run(&cli).unwrap_or_else(|e| {
        eprintln!("[qrstudio] error: {e:#}");
        1
    });
    std::process::exit(exit_code);
}
