//! File adapters: mapping JSON, SVG and PNG diagrams.

use crate::error::{MapError, Result};
use crate::mapping::MappingStore;
use crate::overlay;
use crate::profile::DeviceProfile;
use crossbeam_channel::Sender;
use image::imageops::{self, FilterType};
use image::{ImageFormat, Rgba, RgbaImage};
use std::path::{Path, PathBuf};
use std::thread;

pub const MAPPING_EXTENSION: &str = "ftcpadmap";

/// Window background behind the diagram, hsl(240 10% 3.9%)
pub const BACKDROP: Rgba<u8> = Rgba([9, 9, 11, 255]);

/// "Logitech F310 2026-01-31_14-05-09.ftcpadmap"
pub fn default_file_name(device: &str, extension: &str, now: chrono::NaiveDateTime) -> String {
    format!("{} {}.{}", device, now.format("%Y-%m-%d_%H-%M-%S"), extension)
}

pub fn export_json(store: &MappingStore, path: &Path) -> Result<()> {
    let json = store.to_json()?;
    std::fs::write(path, json)?;
    log::info!("Exported mapping to {:?}", path);
    Ok(())
}

/// Read a mapping file and merge it into `store`
pub fn import_json(store: &mut MappingStore, path: &Path) -> Result<usize> {
    let text = std::fs::read_to_string(path)?;
    let applied = store.deserialize(&text)?;
    log::info!("Imported {} items from {:?}", applied, path);
    Ok(applied)
}

pub fn export_svg(
    profile: &DeviceProfile,
    store: &MappingStore,
    image_href: &str,
    path: &Path,
) -> Result<()> {
    let primitives = overlay::render(profile, store);
    std::fs::write(path, overlay::to_svg(profile, &primitives, image_href))?;
    log::info!("Exported diagram to {:?}", path);
    Ok(())
}

pub fn load_background(path: &Path) -> Result<RgbaImage> {
    let image = image::open(path)
        .map_err(|e| MapError::Resource(format!("Gamepad image {} unavailable: {}", path.display(), e)))?;
    Ok(image.to_rgba8())
}

/// Region of a captured frame, in physical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    /// From an egui rect in points
    pub fn from_points(rect: egui::Rect, pixels_per_point: f32) -> Self {
        let scale = |v: f32| (v * pixels_per_point).max(0.0).round() as u32;
        Self {
            x: scale(rect.min.x),
            y: scale(rect.min.y),
            width: scale(rect.width()),
            height: scale(rect.height()),
        }
    }
}

/// Where to draw the diagram for a capture, in points. Covers exactly
/// `native` physical pixels from the top-left of `screen`, shrunk with the
/// same aspect only when the screen is smaller than that.
pub fn capture_rect(screen: egui::Rect, pixels_per_point: f32, native: (u32, u32)) -> egui::Rect {
    let size = egui::vec2(native.0 as f32, native.1 as f32) / pixels_per_point.max(f32::EPSILON);
    let fit = (screen.width() / size.x).min(screen.height() / size.y).min(1.0);
    egui::Rect::from_min_size(screen.min, size * fit)
}

pub fn color_image_to_rgba(image: &egui::ColorImage) -> Result<RgbaImage> {
    let [width, height] = image.size;
    let bytes: Vec<u8> = image
        .pixels
        .iter()
        .flat_map(|c| c.to_srgba_unmultiplied())
        .collect();
    RgbaImage::from_raw(width as u32, height as u32, bytes)
        .ok_or_else(|| MapError::Resource("Screen capture has an unexpected size".to_string()))
}

/// Crop `region` out of a captured frame, resample it to `size` and flatten
/// it onto the opaque backdrop.
pub fn flatten_capture(frame: &RgbaImage, region: PixelRect, size: (u32, u32)) -> Result<RgbaImage> {
    let x = region.x.min(frame.width());
    let y = region.y.min(frame.height());
    let width = region.width.min(frame.width() - x);
    let height = region.height.min(frame.height() - y);
    if width == 0 || height == 0 || size.0 == 0 || size.1 == 0 {
        return Err(MapError::Resource("Diagram is not visible on screen".to_string()));
    }

    let cropped = imageops::crop_imm(frame, x, y, width, height).to_image();
    let resized = imageops::resize(&cropped, size.0, size.1, FilterType::Triangle);

    let mut flat = RgbaImage::from_pixel(size.0, size.1, BACKDROP);
    imageops::overlay(&mut flat, &resized, 0, 0);
    for pixel in flat.pixels_mut() {
        pixel.0[3] = 255;
    }
    Ok(flat)
}

pub fn save_png(image: &RgbaImage, path: &Path) -> anyhow::Result<PathBuf> {
    image.save_with_format(path, ImageFormat::Png)?;
    log::info!("Saved PNG to {:?}", path);
    Ok(path.to_path_buf())
}

/// Result of a background save
pub enum SaveResult {
    Png(anyhow::Result<PathBuf>),
}

/// Encode and write on a worker thread so the UI keeps polling
pub fn spawn_png_save(image: RgbaImage, path: PathBuf, sender: Sender<SaveResult>) {
    thread::spawn(move || {
        let result = save_png(&image, &path);
        let _ = sender.send(SaveResult::Png(result));
    });
}
