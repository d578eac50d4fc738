//! OCR 归一化 - 帧图像到清理后代码文本
//!
//! 流水线分三层：
//! 1. preprocess - 灰度、暗色主题翻转、Otsu 二值化、2 倍放大
//! 2. engine - tesseract 识别（单文本块、最准模式、保留词间空白）
//! 3. repair - 确定性文本修复规则（关键字大小写、运算符间距、空行折叠）

pub mod engine;
pub mod preprocess;
pub mod repair;

use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("could not load image: {0}")]
    Image(#[from] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("text recognition failed: {0}")]
    Engine(String),
}

/// 识别帧图像里的代码并做确定性修复
pub fn recognize(frame_path: &Path) -> Result<String, OcrError> {
    let prepared = preprocess::prepare_image(frame_path)?;
    let raw_text = engine::recognize_text(&prepared)?;
    Ok(repair::repair(&raw_text))
}
