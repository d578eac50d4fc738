use std::path::PathBuf;

use serde::Serialize;

/// 时长查询响应
#[derive(Debug, Clone, Serialize)]
pub struct VideoDurationInfo {
    pub video_filename: String,
    pub duration_hours: u32,
    pub duration_minutes: u32,
    pub duration_seconds: u32,
    /// HH:MM:SS
    pub duration_formatted: String,
    pub fps: f64,
    pub total_frames: u64,
}

/// 帧提取响应
#[derive(Debug, Clone, Serialize)]
pub struct FrameExtractionInfo {
    pub video_filename: String,
    /// 请求里的原始时间戳文本
    pub timestamp: String,
    pub timestamp_seconds: f64,
    pub frame_filename: String,
    pub frame_path: String,
    /// data URL 形式的 base64 PNG
    pub frame_data: String,
    /// 原始 OCR 文本；识别失败时是错误说明（部分成功）
    pub extracted_code: String,
    /// AI 清理后的文本，AI 不可用时回退为原始文本
    pub formatted_code: String,
    pub ai_requests_remaining: Option<i64>,
    pub ai_request_reset: Option<String>,
}

/// 原始视频定位信息，字节流 / Range 由上层 HTTP 框架处理
#[derive(Debug, Clone)]
pub struct VideoSource {
    pub path: PathBuf,
    pub content_type: &'static str,
}
