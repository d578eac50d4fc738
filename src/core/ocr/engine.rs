//! tesseract 识别引擎封装
//!
//! 预处理后的图像落到临时文件，tesseract 子进程从 stdout 带回文本。
//! 配置固定为：psm 6（单个均匀文本块）、oem 3（最准模式）、
//! 保留词间空白、关闭表格结构检测。

use std::process::Command;

use image::GrayImage;

use super::OcrError;

const TESSERACT_ARGS: [&str; 8] = [
    "--psm",
    "6",
    "--oem",
    "3",
    "-c",
    "preserve_interword_spaces=1",
    "-c",
    "textord_tabfind_find_tables=0",
];

/// 对预处理好的图像跑一次识别，返回原始文本
pub fn recognize_text(image: &GrayImage) -> Result<String, OcrError> {
    let tmp = tempfile::Builder::new()
        .prefix("ocrroo_frame_")
        .suffix(".png")
        .tempfile()?;
    image.save_with_format(tmp.path(), image::ImageFormat::Png)?;

    let output = Command::new("tesseract")
        .arg(tmp.path())
        .arg("stdout")
        .args(TESSERACT_ARGS)
        .output()
        .map_err(|e| OcrError::Engine(format!("failed to run tesseract: {}", e)))?;

    if !output.status.success() {
        return Err(OcrError::Engine(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
