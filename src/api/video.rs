//! 面向 HTTP 层的三个操作：时长查询 / 按时间戳取帧 / 原始视频定位
//!
//! 这里不绑定任何 web 框架，返回可序列化的模型，错误全部是结构化 Result，
//! 由上层自行映射状态码。

use std::fs;
use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::{info, warn};
use thiserror::Error;

use crate::api::models::video::{FrameExtractionInfo, VideoDurationInfo, VideoSource};
use crate::core::ai::CodeCleaner;
use crate::core::ocr;
use crate::core::timestamp::{format_seconds, parse_timestamp, TimestampError};
use crate::core::video::{extract_frame, probe_video, VideoError};

/// 媒体配置：固定的视频文件名 + 媒体根目录（都来自配置，不由用户输入）
#[derive(Debug, Clone)]
pub struct MediaConfig {
    pub media_root: PathBuf,
    pub video_filename: String,
}

impl MediaConfig {
    pub fn new(media_root: impl Into<PathBuf>, video_filename: impl Into<String>) -> Self {
        Self {
            media_root: media_root.into(),
            video_filename: video_filename.into(),
        }
    }

    pub fn video_path(&self) -> PathBuf {
        self.media_root.join(&self.video_filename)
    }
}

#[derive(Debug, Error)]
pub enum FrameRequestError {
    #[error("invalid timestamp format: {0}")]
    Timestamp(#[from] TimestampError),
    #[error(transparent)]
    Video(#[from] VideoError),
}

/// 查询视频时长及帧率信息
pub fn get_video_duration(config: &MediaConfig) -> Result<VideoDurationInfo, VideoError> {
    let video_path = config.video_path();
    if !video_path.exists() {
        return Err(VideoError::NotFound(video_path));
    }

    let metadata = probe_video(&video_path)?;
    let duration = metadata.duration();
    let (hours, minutes, seconds) = split_duration(duration);

    Ok(VideoDurationInfo {
        video_filename: config.video_filename.clone(),
        duration_hours: hours,
        duration_minutes: minutes,
        duration_seconds: seconds,
        duration_formatted: format_seconds(duration),
        fps: metadata.fps,
        total_frames: metadata.frame_count,
    })
}

/// 按时间戳取帧：解析 -> 缓存提取 -> base64 载荷 -> OCR -> 可选 AI 清理
///
/// OCR 失败不终止请求，帧图像照常返回，错误文本嵌入载荷；
/// AI 不可用时 formatted_code 回退为原始 OCR 文本。
pub fn get_frame_at_timestamp(
    config: &MediaConfig,
    timestamp: &str,
    cleaner: &CodeCleaner,
) -> Result<FrameExtractionInfo, FrameRequestError> {
    let timestamp_seconds = parse_timestamp(timestamp)?;
    let frame = extract_frame(
        &config.media_root,
        &config.video_filename,
        timestamp_seconds,
        timestamp,
    )?;

    let image_bytes = fs::read(&frame.frame_path).map_err(VideoError::from)?;
    let frame_data = format!("data:image/png;base64,{}", STANDARD.encode(&image_bytes));

    let (extracted_code, formatted_code, ai_requests_remaining, ai_request_reset) =
        match ocr::recognize(&frame.frame_path) {
            Ok(text) => match cleaner.clean_or_none(&text) {
                Some(outcome) => (
                    text,
                    outcome.cleaned_code,
                    outcome.requests_remaining,
                    outcome.reset_time,
                ),
                None => (text.clone(), text, None, None),
            },
            Err(e) => {
                warn!("OCR failed for {}: {}", frame.frame_path.display(), e);
                let message = format!("OCR error: {}", e);
                (message.clone(), message, None, None)
            }
        };

    info!(
        "frame request served: {} at {} (cache_hit={})",
        config.video_filename, timestamp, frame.cache_hit
    );

    Ok(FrameExtractionInfo {
        video_filename: config.video_filename.clone(),
        timestamp: timestamp.to_string(),
        timestamp_seconds,
        frame_filename: frame.frame_filename,
        frame_path: frame.frame_path.display().to_string(),
        frame_data,
        extracted_code,
        formatted_code,
        ai_requests_remaining,
        ai_request_reset,
    })
}

/// 原始视频定位，供上层做 Range 流式下发
pub fn resolve_video(config: &MediaConfig) -> Result<VideoSource, VideoError> {
    let path = config.video_path();
    if !path.exists() {
        return Err(VideoError::NotFound(path));
    }
    Ok(VideoSource {
        content_type: content_type_for(&path),
        path,
    })
}

fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("mp4") | Some("m4v") => "video/mp4",
        Some("webm") => "video/webm",
        Some("mov") => "video/quicktime",
        _ => "application/octet-stream",
    }
}

/// 秒数拆成 (时, 分, 秒)，与 HH:MM:SS 格式化一致
fn split_duration(duration_seconds: f64) -> (u32, u32, u32) {
    let total = duration_seconds.max(0.0) as u64;
    (
        (total / 3600) as u32,
        ((total % 3600) / 60) as u32,
        (total % 60) as u32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    #[test]
    fn test_media_config_video_path() {
        let config = MediaConfig::new("/media", "sample.mp4");
        assert_eq!(config.video_path(), Path::new("/media/sample.mp4"));
    }

    #[test]
    fn test_split_duration() {
        assert_eq!(split_duration(10.0), (0, 0, 10));
        assert_eq!(split_duration(3723.5), (1, 2, 3));
        assert_eq!(split_duration(0.0), (0, 0, 0));
    }

    #[test]
    fn test_content_type_for_extension() {
        assert_eq!(content_type_for(Path::new("a.mp4")), "video/mp4");
        assert_eq!(content_type_for(Path::new("a.webm")), "video/webm");
        assert_eq!(
            content_type_for(Path::new("a.bin")),
            "application/octet-stream"
        );
    }

    #[test]
    fn test_duration_of_missing_video() {
        let media_root = tempfile::tempdir().unwrap();
        let config = MediaConfig::new(media_root.path(), "missing.mp4");
        assert!(matches!(
            get_video_duration(&config),
            Err(VideoError::NotFound(_))
        ));
    }

    #[test]
    fn test_frame_request_rejects_bad_timestamp() {
        let media_root = tempfile::tempdir().unwrap();
        let config = MediaConfig::new(media_root.path(), "sample.mp4");
        let cleaner = CodeCleaner::new(None);
        let result = get_frame_at_timestamp(&config, "90:00", &cleaner);
        assert!(matches!(result, Err(FrameRequestError::Timestamp(_))));
    }

    #[test]
    fn test_frame_request_missing_video() {
        let media_root = tempfile::tempdir().unwrap();
        let config = MediaConfig::new(media_root.path(), "sample.mp4");
        let cleaner = CodeCleaner::new(None);
        let result = get_frame_at_timestamp(&config, "00:05", &cleaner);
        assert!(matches!(
            result,
            Err(FrameRequestError::Video(VideoError::NotFound(_)))
        ));
    }

    #[test]
    fn test_frame_request_serves_cached_artifact() {
        // 预置缓存帧：即使视频缺失、AI 凭证缺失，请求也要成功并带回载荷
        let media_root = tempfile::tempdir().unwrap();
        let frames_dir = media_root.path().join("frames");
        fs::create_dir_all(&frames_dir).unwrap();
        GrayImage::from_pixel(32, 32, Luma([255u8]))
            .save(frames_dir.join("sample.mp4_frame_at_00_05.png"))
            .unwrap();

        let config = MediaConfig::new(media_root.path(), "sample.mp4");
        let cleaner = CodeCleaner::new(None);
        let info = get_frame_at_timestamp(&config, "00:05", &cleaner).unwrap();

        assert_eq!(info.frame_filename, "sample.mp4_frame_at_00_05.png");
        assert_eq!(info.timestamp_seconds, 5.0);
        assert!(info.frame_data.starts_with("data:image/png;base64,"));
        // AI 不可用时 formatted 必须等于 extracted（OCR 成功或失败都一样）
        assert_eq!(info.extracted_code, info.formatted_code);
        assert!(info.ai_requests_remaining.is_none());
        assert!(info.ai_request_reset.is_none());
    }

    #[test]
    fn test_resolve_video() {
        let media_root = tempfile::tempdir().unwrap();
        fs::write(media_root.path().join("sample.mp4"), b"fake video").unwrap();
        let config = MediaConfig::new(media_root.path(), "sample.mp4");

        let source = resolve_video(&config).unwrap();
        assert_eq!(source.content_type, "video/mp4");
        assert!(source.path.ends_with("sample.mp4"));

        let missing = MediaConfig::new(media_root.path(), "other.mp4");
        assert!(matches!(
            resolve_video(&missing),
            Err(VideoError::NotFound(_))
        ));
    }
}
