//! OCR 图像预处理

use std::path::Path;

use image::{imageops, GrayImage};
use log::debug;

use super::OcrError;

/// 灰度强度范围的中点，低于它按暗色主题处理
const INTENSITY_MIDPOINT: f64 = 128.0;

/// 加载帧图像并做完整预处理：灰度 -> 极性归一 -> Otsu 二值化 -> 2 倍放大
pub fn prepare_image(frame_path: &Path) -> Result<GrayImage, OcrError> {
    let img = image::open(frame_path)?;
    let mut gray = img.to_luma8();

    // 暗色主题翻转成浅底深字，识别引擎对这种极性更稳
    if is_dark_theme(&gray) {
        debug!("dark theme detected, inverting polarity");
        imageops::invert(&mut gray);
    }

    let threshold = otsu_threshold(&gray);
    binarize(&mut gray, threshold);

    // 2 倍三次插值放大，改善小字号识别
    let (width, height) = gray.dimensions();
    let upscaled = imageops::resize(
        &gray,
        width * 2,
        height * 2,
        imageops::FilterType::CatmullRom,
    );

    Ok(upscaled)
}

pub fn mean_intensity(img: &GrayImage) -> f64 {
    let pixel_count = img.width() as u64 * img.height() as u64;
    if pixel_count == 0 {
        return 0.0;
    }
    let sum: u64 = img.pixels().map(|p| p.0[0] as u64).sum();
    sum as f64 / pixel_count as f64
}

pub fn is_dark_theme(img: &GrayImage) -> bool {
    mean_intensity(img) < INTENSITY_MIDPOINT
}

/// Otsu 全局阈值：最大化前景/背景的类间方差，无需手工调参
pub fn otsu_threshold(img: &GrayImage) -> u8 {
    let mut histogram = [0u64; 256];
    for pixel in img.pixels() {
        histogram[pixel.0[0] as usize] += 1;
    }

    let total = img.width() as u64 * img.height() as u64;
    if total == 0 {
        return 0;
    }

    let sum_all: f64 = histogram
        .iter()
        .enumerate()
        .map(|(value, &count)| value as f64 * count as f64)
        .sum();

    let mut sum_background = 0.0;
    let mut weight_background = 0u64;
    let mut best_threshold = 0u8;
    let mut best_variance = 0.0f64;

    for t in 0..256usize {
        weight_background += histogram[t];
        if weight_background == 0 {
            continue;
        }
        let weight_foreground = total - weight_background;
        if weight_foreground == 0 {
            break;
        }

        sum_background += t as f64 * histogram[t] as f64;
        let mean_background = sum_background / weight_background as f64;
        let mean_foreground = (sum_all - sum_background) / weight_foreground as f64;

        let diff = mean_background - mean_foreground;
        let variance = weight_background as f64 * weight_foreground as f64 * diff * diff;
        if variance > best_variance {
            best_variance = variance;
            best_threshold = t as u8;
        }
    }

    best_threshold
}

/// 二值化：大于阈值置 255，否则置 0
pub fn binarize(img: &mut GrayImage, threshold: u8) {
    for pixel in img.pixels_mut() {
        pixel.0[0] = if pixel.0[0] > threshold { 255 } else { 0 };
    }
}
