// snapaint - A photo capture, filter and finger-paint screen for Wayland
// Takes or loads a photo, applies filter presets, paints over it and saves to the gallery

mod app;
mod bridge;
mod canvas;
mod cli;
mod filters;
mod image_loader;
mod notice;
mod overlay;
mod paint;
mod palette;
mod text;
mod wayland;

use crate::app::AppController;
use crate::bridge::{DeviceBridge, NativeBridge, NoDevice, Platform};
use anyhow::{Context, Result};
use log::info;

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Parse command line arguments
    let args = cli::parse_args()?;

    info!(
        "Starting snapaint ({:?}) with image: {:?}, palette of {} colors",
        args.platform,
        args.image_path,
        args.palette.len()
    );

    let initial = match (&args.image_path, &args.image_data) {
        (Some(path), _) => Some(image_loader::load_path(path)?),
        (None, Some(data)) => Some(image_loader::load_from_bytes(data).context("Failed to decode image from stdin")?),
        (None, None) => None,
    };
    if let Some(ref image) = initial {
        info!("Image loaded: {}x{} pixels", image.width(), image.height());
    }

    let placeholder = match args.placeholder {
        Some(ref path) => image_loader::load_path(path).context("Failed to load placeholder image")?,
        None => image_loader::placeholder_image(),
    };

    let bridge: Box<dyn DeviceBridge> = match args.platform {
        Platform::Native => {
            info!(
                "Camera: {:?}, gallery: {} ({:?})",
                args.camera_command,
                args.gallery_dir.display(),
                args.gallery_format
            );
            Box::new(NativeBridge::new(args.camera_command, args.gallery_dir, args.gallery_format))
        }
        Platform::Browser => Box::new(NoDevice),
    };

    let mut controller = AppController::new(args.palette, args.platform, bridge, placeholder);
    if let Some(image) = initial {
        controller = controller.with_initial_image(image);
    }

    wayland::run(controller)
}
