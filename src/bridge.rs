// Device bridge module
// Camera capture and gallery save, completed asynchronously over oneshot channels

use crate::image_loader::{self, ImageData};
use chrono::Local;
use futures::channel::oneshot;
use image::{DynamicImage, ImageFormat, RgbaImage};
use log::{debug, error, info, warn};
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::process::{Command, ExitStatus};
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{Context, Poll};
use std::thread;
use thiserror::Error;

/// Where the app is running. Device capabilities only exist in the native shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Native,
    Browser,
}

impl Platform {
    pub fn from_flag(native: bool) -> Self {
        if native {
            Platform::Native
        } else {
            Platform::Browser
        }
    }

    pub fn is_native(self) -> bool {
        self == Platform::Native
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraDirection {
    Front,
    Back,
}

/// Camera request parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraConfig {
    pub correct_orientation: bool,
    /// JPEG quality, 0-100
    pub quality: u8,
    /// Height the returned photo is scaled to
    pub target_height: u32,
    pub direction: CameraDirection,
}

impl CameraConfig {
    /// The fixed configuration used by the capture button
    pub fn for_canvas_height(target_height: u32) -> Self {
        Self {
            correct_orientation: true,
            quality: 100,
            target_height,
            direction: CameraDirection::Front,
        }
    }
}

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("device capability is not available on this platform")]
    Unavailable,
    #[error("no camera command configured")]
    NoCameraCommand,
    #[error("failed to run camera command `{program}`: {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("camera command exited with {0}")]
    CameraExit(ExitStatus),
    #[error("failed to load captured photo: {0}")]
    Decode(String),
    #[error("failed to prepare gallery directory {path}: {source}")]
    GalleryDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write gallery image: {0}")]
    Encode(#[from] image::ImageError),
    #[error("failed to start worker thread: {0}")]
    Worker(#[source] io::Error),
    #[error("request was dropped before it completed")]
    Abandoned,
}

/// State of a pending request when polled
#[derive(Debug, PartialEq, Eq)]
pub enum Completion<T> {
    Waiting,
    Done(T),
    /// The sender went away without answering
    Abandoned,
}

/// Result of a device request that completes later. Also a `Future`.
#[derive(Debug)]
pub struct Pending<T> {
    rx: oneshot::Receiver<T>,
}

impl<T> Pending<T> {
    /// A request plus the sender that completes it
    pub fn channel() -> (oneshot::Sender<T>, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self { rx })
    }

    /// An already-completed request
    pub fn ready(value: T) -> Self {
        let (tx, pending) = Self::channel();
        // The receiver is alive, send cannot fail
        let _ = tx.send(value);
        pending
    }

    /// Non-blocking check, used from the UI loop
    pub fn try_complete(&mut self) -> Completion<T> {
        match self.rx.try_recv() {
            Ok(Some(value)) => Completion::Done(value),
            Ok(None) => Completion::Waiting,
            Err(oneshot::Canceled) => Completion::Abandoned,
        }
    }
}

impl<T> Future for Pending<T> {
    type Output = Result<T, oneshot::Canceled>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx)
    }
}

pub type CaptureRequest = Pending<Result<ImageData, BridgeError>>;
pub type SaveRequest = Pending<Result<PathBuf, BridgeError>>;

/// Camera and gallery capabilities of the host device
pub trait DeviceBridge {
    /// Take a photo
    fn get_picture(&mut self, config: &CameraConfig) -> CaptureRequest;

    /// Store an image in the device gallery, returning where it went
    fn save_image_data_to_library(&mut self, image: RgbaImage) -> SaveRequest;
}

impl<B: DeviceBridge + ?Sized> DeviceBridge for Box<B> {
    fn get_picture(&mut self, config: &CameraConfig) -> CaptureRequest {
        (**self).get_picture(config)
    }

    fn save_image_data_to_library(&mut self, image: RgbaImage) -> SaveRequest {
        (**self).save_image_data_to_library(image)
    }
}

/// Bridge for hosts without a camera or gallery. Every request fails.
#[derive(Debug, Default)]
pub struct NoDevice;

impl DeviceBridge for NoDevice {
    fn get_picture(&mut self, _config: &CameraConfig) -> CaptureRequest {
        Pending::ready(Err(BridgeError::Unavailable))
    }

    fn save_image_data_to_library(&mut self, _image: RgbaImage) -> SaveRequest {
        Pending::ready(Err(BridgeError::Unavailable))
    }
}

/// Default camera command (Raspberry Pi / libcamera devices)
pub const DEFAULT_CAMERA_COMMAND: &[&str] = &[
    "libcamera-still",
    "--nopreview",
    "--camera",
    "{camera}",
    "--height",
    "{height}",
    "--quality",
    "{quality}",
    "--output",
    "{output}",
];

static CAPTURE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Bridge backed by an external camera program and a gallery directory.
/// Requests run on worker threads.
#[derive(Debug, Clone)]
pub struct NativeBridge {
    camera_command: Vec<String>,
    gallery_dir: PathBuf,
    gallery_format: ImageFormat,
}

impl NativeBridge {
    pub fn new(camera_command: Vec<String>, gallery_dir: PathBuf, gallery_format: ImageFormat) -> Self {
        Self {
            camera_command,
            gallery_dir,
            gallery_format,
        }
    }

    /// Substitute `{output}`, `{height}`, `{quality}` and `{camera}` in the command
    fn expand_command(&self, config: &CameraConfig, output: &Path, camera: &str) -> Vec<String> {
        self.camera_command
            .iter()
            .map(|arg| {
                arg.replace("{output}", &output.to_string_lossy())
                    .replace("{height}", &config.target_height.to_string())
                    .replace("{quality}", &config.quality.to_string())
                    .replace("{camera}", camera)
            })
            .collect()
    }

    /// Commands to try in order. Single-camera devices only have index 0,
    /// so a front camera request falls back to it.
    fn capture_commands(&self, config: &CameraConfig, output: &Path) -> Vec<Vec<String>> {
        let cameras: &[&str] = match config.direction {
            CameraDirection::Back => &["0"],
            CameraDirection::Front => &["1", "0"],
        };
        if !self.camera_command.iter().any(|arg| arg.contains("{camera}")) {
            return vec![self.expand_command(config, output, cameras[0])];
        }
        cameras
            .iter()
            .map(|camera| self.expand_command(config, output, camera))
            .collect()
    }
}

impl DeviceBridge for NativeBridge {
    fn get_picture(&mut self, config: &CameraConfig) -> CaptureRequest {
        let seq = CAPTURE_COUNTER.fetch_add(1, Ordering::Relaxed);
        let output = std::env::temp_dir().join(format!(
            "snapaint-capture-{}-{}.img",
            std::process::id(),
            seq
        ));
        let commands = self.capture_commands(config, &output);
        let config = *config;

        let (tx, pending) = Pending::channel();
        let spawned = thread::Builder::new()
            .name("camera".to_string())
            .spawn(move || {
                let result = capture_with_fallback(&commands, &output, &config);
                let _ = std::fs::remove_file(&output);
                if let Err(e) = &result {
                    error!("Camera capture failed: {}", e);
                }
                let _ = tx.send(result);
            });

        match spawned {
            Ok(_) => pending,
            Err(e) => Pending::ready(Err(BridgeError::Worker(e))),
        }
    }

    fn save_image_data_to_library(&mut self, image: RgbaImage) -> SaveRequest {
        let dir = self.gallery_dir.clone();
        let format = self.gallery_format;

        let (tx, pending) = Pending::channel();
        let spawned = thread::Builder::new()
            .name("gallery".to_string())
            .spawn(move || {
                let result = write_to_gallery(&dir, format, image);
                if let Err(e) = &result {
                    error!("Gallery save failed: {}", e);
                }
                let _ = tx.send(result);
            });

        match spawned {
            Ok(_) => pending,
            Err(e) => Pending::ready(Err(BridgeError::Worker(e))),
        }
    }
}

fn capture_with_fallback(commands: &[Vec<String>], output: &Path, config: &CameraConfig) -> Result<ImageData, BridgeError> {
    let mut result = Err(BridgeError::NoCameraCommand);
    for (i, command) in commands.iter().enumerate() {
        result = run_capture(command, output, config);
        match &result {
            Err(BridgeError::CameraExit(status)) if i + 1 < commands.len() => {
                warn!("Camera command exited with {}, trying next camera", status);
            }
            _ => break,
        }
    }
    result
}

fn run_capture(command: &[String], output: &Path, config: &CameraConfig) -> Result<ImageData, BridgeError> {
    let (program, args) = command.split_first().ok_or(BridgeError::NoCameraCommand)?;
    info!("Running camera command: {}", command.join(" "));

    let status = Command::new(program)
        .args(args)
        .status()
        .map_err(|source| BridgeError::Launch {
            program: program.clone(),
            source,
        })?;
    if !status.success() {
        return Err(BridgeError::CameraExit(status));
    }

    let data = std::fs::read(output).map_err(|e| BridgeError::Decode(e.to_string()))?;
    let image = image_loader::decode(&data, config.correct_orientation)
        .map_err(|e| BridgeError::Decode(format!("{:#}", e)))?;
    debug!("Captured photo {}x{}", image.width(), image.height());

    Ok(image_loader::scale_to_height(image, config.target_height))
}

fn write_to_gallery(dir: &Path, format: ImageFormat, image: RgbaImage) -> Result<PathBuf, BridgeError> {
    std::fs::create_dir_all(dir).map_err(|source| BridgeError::GalleryDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let ext = format.extensions_str().first().copied().unwrap_or("png");
    let name = format!("snapaint-{}.{}", Local::now().format("%Y%m%d-%H%M%S-%3f"), ext);
    let path = dir.join(name);

    let image = DynamicImage::ImageRgba8(image);
    match format {
        // No alpha channel in JPEG
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(image.to_rgb8()).save_with_format(&path, format)?,
        _ => image.save_with_format(&path, format)?,
    }

    info!("Saved image to {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use image::Rgba;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("snapaint-test-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn pending_reports_each_state() {
        let (tx, mut pending) = Pending::<u32>::channel();
        assert_eq!(pending.try_complete(), Completion::Waiting);
        tx.send(7).unwrap();
        assert_eq!(pending.try_complete(), Completion::Done(7));

        let (tx, mut dropped) = Pending::<u32>::channel();
        drop(tx);
        assert_eq!(dropped.try_complete(), Completion::Abandoned);

        assert_eq!(block_on(Pending::ready(3)), Ok(3));
    }

    #[test]
    fn no_device_fails_everything() {
        let mut bridge = NoDevice;
        let capture = block_on(bridge.get_picture(&CameraConfig::for_canvas_height(100))).unwrap();
        assert!(matches!(capture, Err(BridgeError::Unavailable)));
        let save = block_on(bridge.save_image_data_to_library(RgbaImage::new(1, 1))).unwrap();
        assert!(matches!(save, Err(BridgeError::Unavailable)));
    }

    #[test]
    fn capture_config_is_fixed() {
        let config = CameraConfig::for_canvas_height(720);
        assert!(config.correct_orientation);
        assert_eq!(config.quality, 100);
        assert_eq!(config.target_height, 720);
        assert_eq!(config.direction, CameraDirection::Front);
    }

    #[test]
    fn expands_command_placeholders() {
        let bridge = NativeBridge::new(
            DEFAULT_CAMERA_COMMAND.iter().map(|s| s.to_string()).collect(),
            PathBuf::from("/tmp"),
            ImageFormat::Png,
        );
        let commands = bridge.capture_commands(&CameraConfig::for_canvas_height(480), Path::new("/tmp/out.img"));
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[1][3], "0");
        let cmd = &commands[0];
        assert_eq!(cmd[3], "1");
        assert_eq!(cmd[5], "480");
        assert_eq!(cmd[7], "100");
        assert_eq!(cmd[9], "/tmp/out.img");
    }

    #[cfg(unix)]
    #[test]
    fn capture_runs_command_and_scales_result() {
        let dir = scratch_dir("capture");
        std::fs::create_dir_all(&dir).unwrap();
        let src = dir.join("photo.png");
        RgbaImage::from_pixel(40, 20, Rgba([0, 0, 255, 255])).save(&src).unwrap();

        let mut bridge = NativeBridge::new(
            vec!["cp".to_string(), src.to_string_lossy().into_owned(), "{output}".to_string()],
            dir.clone(),
            ImageFormat::Png,
        );
        let photo = block_on(bridge.get_picture(&CameraConfig::for_canvas_height(10)))
            .unwrap()
            .unwrap();
        assert_eq!((photo.width(), photo.height()), (20, 10));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn commands_without_camera_placeholder_run_once() {
        let bridge = NativeBridge::new(vec!["snap".to_string(), "{output}".to_string()], PathBuf::from("/tmp"), ImageFormat::Png);
        let commands = bridge.capture_commands(&CameraConfig::for_canvas_height(10), Path::new("/tmp/o.img"));
        assert_eq!(commands, vec![vec!["snap".to_string(), "/tmp/o.img".to_string()]]);
    }

    #[cfg(unix)]
    #[test]
    fn front_camera_falls_back_to_first_camera() {
        let dir = scratch_dir("fallback");
        std::fs::create_dir_all(&dir).unwrap();
        let src = dir.join("photo.png");
        RgbaImage::from_pixel(30, 10, Rgba([0, 255, 0, 255])).save(&src).unwrap();

        // Only camera 0 exists
        let script = format!("test \"$0\" = 0 && cp '{}' \"$1\"", src.display());
        let mut bridge = NativeBridge::new(
            vec!["sh".to_string(), "-c".to_string(), script, "{camera}".to_string(), "{output}".to_string()],
            dir.clone(),
            ImageFormat::Png,
        );
        let photo = block_on(bridge.get_picture(&CameraConfig::for_canvas_height(10)))
            .unwrap()
            .unwrap();
        assert_eq!((photo.width(), photo.height()), (30, 10));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[cfg(unix)]
    #[test]
    fn failing_camera_command_is_an_error() {
        let mut bridge = NativeBridge::new(vec!["false".to_string()], scratch_dir("false"), ImageFormat::Png);
        let result = block_on(bridge.get_picture(&CameraConfig::for_canvas_height(10))).unwrap();
        assert!(matches!(result, Err(BridgeError::CameraExit(_))));
    }

    #[test]
    fn missing_camera_program_is_a_launch_error() {
        let mut bridge = NativeBridge::new(
            vec!["snapaint-no-such-camera-program".to_string()],
            scratch_dir("missing"),
            ImageFormat::Png,
        );
        let result = block_on(bridge.get_picture(&CameraConfig::for_canvas_height(10))).unwrap();
        assert!(matches!(result, Err(BridgeError::Launch { .. })));
    }

    #[test]
    fn gallery_save_writes_a_file() {
        let dir = scratch_dir("gallery");
        let mut bridge = NativeBridge::new(Vec::new(), dir.clone(), ImageFormat::Jpeg);
        let path = block_on(bridge.save_image_data_to_library(RgbaImage::from_pixel(3, 2, Rgba([1, 2, 3, 255]))))
            .unwrap()
            .unwrap();
        assert!(path.starts_with(&dir));
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("jpg"));
        assert!(path.exists());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
