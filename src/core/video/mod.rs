//! 视频探测与单帧提取
//!
//! 拆分为两层：
//! 1. probe - ffprobe 读取帧数 / 帧率，推导视频时长
//! 2. extractor - 以 (视频文件名, 原始时间戳) 为键的磁盘帧缓存 + ffmpeg 单帧解码

pub mod extractor;
pub mod probe;

use std::path::PathBuf;
use thiserror::Error;

pub use extractor::{extract_frame, ExtractedFrame, FrameCache};
pub use probe::{probe_video, VideoMetadata};

#[derive(Debug, Error)]
pub enum VideoError {
    #[error("video file not found: {0}")]
    NotFound(PathBuf),
    #[error("failed to probe video: {0}")]
    ProbeFailed(String),
    #[error("timestamp {requested:.2}s exceeds video duration {duration:.2}s")]
    TimestampOutOfRange { requested: f64, duration: f64 },
    #[error("failed to decode frame: {0}")]
    DecodeFailed(String),
    #[error("failed to write frame: {0}")]
    WriteFailed(#[from] std::io::Error),
}
