// Command line interface module
// Handles parsing of command line arguments and stdin input

use crate::bridge::{Platform, DEFAULT_CAMERA_COMMAND};
use crate::image_loader::format_from_extension;
use crate::palette::{Palette, DEFAULT_COLORS};
use anyhow::{bail, Context, Result};
use clap::Parser;
use image::ImageFormat;
use std::io::{self, Read};
use std::path::PathBuf;

/// snapaint - take a photo, filter it and paint over it
#[derive(Parser, Debug)]
#[command(name = "snapaint")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Image to start with (can also be provided via stdin pipe)
    #[arg(value_name = "IMAGE")]
    pub image_path: Option<PathBuf>,

    /// Run with device capabilities (camera and gallery)
    #[arg(long, env = "APP")]
    pub native: bool,

    /// Comma-separated paint colors, in swatch order
    #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_COLORS.iter().map(|s| s.to_string()).collect::<Vec<_>>())]
    pub palette: Vec<String>,

    /// Directory photos are saved to (default: <Pictures>/snapaint)
    #[arg(long, value_name = "DIR")]
    pub gallery_dir: Option<PathBuf>,

    /// Gallery image format: png, jpg, webp, bmp, tiff
    #[arg(long, default_value = "png", value_parser = parse_format)]
    pub gallery_format: ImageFormat,

    /// Camera program and arguments; {output}, {height}, {quality} and
    /// {camera} are substituted. {camera} is 1 (front) and, if that run
    /// fails, 0 for single-camera devices
    #[arg(long, num_args = 1.., allow_hyphen_values = true, value_name = "ARG")]
    pub camera_command: Option<Vec<String>>,

    /// Image used instead of the camera when running without --native
    #[arg(long, value_name = "IMAGE")]
    pub placeholder: Option<PathBuf>,
}

/// Parsed arguments with resolved image source
#[derive(Debug)]
pub struct ParsedArgs {
    pub image_path: Option<PathBuf>,
    pub image_data: Option<Vec<u8>>,
    pub platform: Platform,
    pub palette: Palette,
    pub gallery_dir: PathBuf,
    pub gallery_format: ImageFormat,
    pub camera_command: Vec<String>,
    pub placeholder: Option<PathBuf>,
}

/// Parse a gallery format name
fn parse_format(s: &str) -> Result<ImageFormat, String> {
    format_from_extension(s)
        .filter(|f| f.can_write())
        .ok_or_else(|| format!("Unsupported gallery format: {}", s))
}

/// Check if stdin has data available (is a pipe)
fn stdin_has_data() -> bool {
    !atty::is(atty::Stream::Stdin)
}

/// Read image data from stdin
fn read_stdin() -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    io::stdin().read_to_end(&mut buffer)?;
    Ok(buffer)
}

fn default_gallery_dir() -> PathBuf {
    dirs::picture_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("snapaint")
}

/// Validate parsed arguments. Stdin data, if any, is passed in by the caller.
fn resolve(args: Args, stdin_data: Option<Vec<u8>>) -> Result<ParsedArgs> {
    let palette = Palette::from_names(&args.palette).context("Invalid --palette")?;

    let camera_command = args
        .camera_command
        .unwrap_or_else(|| DEFAULT_CAMERA_COMMAND.iter().map(|s| s.to_string()).collect());
    if camera_command.is_empty() {
        bail!("--camera-command needs at least a program name");
    }

    if let Some(ref data) = stdin_data {
        if data.is_empty() {
            bail!("No data received from stdin");
        }
    }

    Ok(ParsedArgs {
        image_path: args.image_path,
        image_data: stdin_data,
        platform: Platform::from_flag(args.native),
        palette,
        gallery_dir: args.gallery_dir.unwrap_or_else(default_gallery_dir),
        gallery_format: args.gallery_format,
        camera_command,
        placeholder: args.placeholder,
    })
}

/// Parse command line arguments and handle stdin input
pub fn parse_args() -> Result<ParsedArgs> {
    let args = Args::parse();

    // An image path wins over stdin; starting without any image is fine
    let stdin_data = if args.image_path.is_none() && stdin_has_data() {
        Some(read_stdin()?)
    } else {
        None
    };

    resolve(args, stdin_data)
}
