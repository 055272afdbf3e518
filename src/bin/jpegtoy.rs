//! `jpegtoy` CLI: a thin collaborator around the library's four entry
//! points (spec §6). Grounded on the `clap` derive shape of
//! `rad-medica-jpegexp-rs/src/bin/jpegexp.rs`.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use jpegtoy::{decode_bmp, decode_jpeg, encode_bmp, encode_jpeg, EncoderOptions, Image};

#[derive(Parser)]
#[command(name = "jpegtoy")]
#[command(about = "A baseline/progressive JPEG and BMP codec", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode an image and report its dimensions.
    Render { path: PathBuf },
    /// Decode `input`, then re-encode it as `format`.
    Convert {
        input: PathBuf,
        format: OutputFormat,
        out_path: Option<PathBuf>,
    },
}

#[derive(Copy, Clone, ValueEnum)]
enum OutputFormat {
    Bmp,
    Jpeg,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Render { path } => render(&path),
        Commands::Convert { input, format, out_path } => convert(&input, format, out_path),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("jpegtoy: {message}");
            ExitCode::FAILURE
        }
    }
}

fn load(path: &Path) -> Result<Image, String> {
    let is_jpeg = matches!(path.extension().and_then(|e| e.to_str()), Some("jpg") | Some("jpeg"));
    if is_jpeg {
        decode_jpeg(path).map_err(|e| e.to_string())
    } else {
        decode_bmp(path).map_err(|e| e.to_string())
    }
}

fn render(path: &Path) -> Result<(), String> {
    let image = load(path)?;
    println!("{}x{} ({} bytes)", image.width, image.height, image.data.len());
    Ok(())
}

fn convert(input: &Path, format: OutputFormat, out_path: Option<PathBuf>) -> Result<(), String> {
    let image = load(input)?;
    let extension = match format {
        OutputFormat::Bmp => "bmp",
        OutputFormat::Jpeg => "jpeg",
    };
    let out_path = out_path.unwrap_or_else(|| input.with_extension(extension));

    match format {
        OutputFormat::Bmp => encode_bmp(&image, &out_path).map_err(|e| e.to_string()),
        OutputFormat::Jpeg => encode_jpeg(&image, &out_path, &EncoderOptions::default()).map_err(|e| e.to_string()),
    }
}
