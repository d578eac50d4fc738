//! 磁盘帧缓存 + ffmpeg 单帧解码
//!
//! 缓存键是 (视频文件名, 原始时间戳文本)，命中时完全不碰视频文件。
//! 并发请求同一个未缓存时间戳会重复解码并覆盖写入，
//! 两边产物相同，属于可接受的幂等竞争，不加锁。

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::{debug, info};

use super::{probe::probe_video, VideoError};

/// 帧缓存目录及缓存键到路径的映射
///
/// 路径约定: `<media_root>/frames/<视频文件名>_frame_at_<时间戳冒号替换为下划线>.png`
pub struct FrameCache {
    frames_dir: PathBuf,
}

impl FrameCache {
    pub fn new(media_root: &Path) -> Self {
        Self {
            frames_dir: media_root.join("frames"),
        }
    }

    /// 缓存键对应的文件名，冒号替换为下划线保证文件系统安全
    pub fn frame_filename(video_filename: &str, original_timestamp: &str) -> String {
        format!(
            "{}_frame_at_{}.png",
            video_filename,
            original_timestamp.replace(':', "_")
        )
    }

    pub fn artifact_path(&self, video_filename: &str, original_timestamp: &str) -> PathBuf {
        self.frames_dir
            .join(Self::frame_filename(video_filename, original_timestamp))
    }

    pub fn contains(&self, video_filename: &str, original_timestamp: &str) -> bool {
        self.artifact_path(video_filename, original_timestamp)
            .exists()
    }

    pub fn frames_dir(&self) -> &Path {
        &self.frames_dir
    }
}

/// 提取结果
#[derive(Debug, Clone)]
pub struct ExtractedFrame {
    pub frame_path: PathBuf,
    pub frame_filename: String,
    /// 本次是否直接命中缓存（未发生解码）
    pub cache_hit: bool,
}

/// 在指定时间戳提取一帧并落盘缓存
///
/// 已缓存时立即返回；否则探测视频时长、校验时间戳范围、
/// ffmpeg 定位解码一帧（按解码器粒度就近取帧）、写入 PNG。
pub fn extract_frame(
    media_root: &Path,
    video_filename: &str,
    timestamp_seconds: f64,
    original_timestamp: &str,
) -> Result<ExtractedFrame, VideoError> {
    let cache = FrameCache::new(media_root);
    let frame_filename = FrameCache::frame_filename(video_filename, original_timestamp);
    let frame_path = cache.artifact_path(video_filename, original_timestamp);

    if frame_path.exists() {
        debug!("frame cache hit: {}", frame_path.display());
        return Ok(ExtractedFrame {
            frame_path,
            frame_filename,
            cache_hit: true,
        });
    }

    let video_path = media_root.join(video_filename);
    if !video_path.exists() {
        return Err(VideoError::NotFound(video_path));
    }

    let metadata = probe_video(&video_path)?;
    ensure_within_duration(timestamp_seconds, metadata.duration())?;

    let png_bytes = decode_frame_png(&video_path, timestamp_seconds)?;

    fs::create_dir_all(cache.frames_dir())?;
    fs::write(&frame_path, &png_bytes)?;

    info!(
        "🎬 extracted frame at {:.2}s -> {}",
        timestamp_seconds,
        frame_path.display()
    );

    Ok(ExtractedFrame {
        frame_path,
        frame_filename,
        cache_hit: false,
    })
}

/// 严格大于时长才算越界，恰好等于时长允许
fn ensure_within_duration(timestamp_seconds: f64, duration: f64) -> Result<(), VideoError> {
    if timestamp_seconds > duration {
        Err(VideoError::TimestampOutOfRange {
            requested: timestamp_seconds,
            duration,
        })
    } else {
        Ok(())
    }
}

/// ffmpeg 定位到时间戳解码一帧，PNG 字节流从 stdout 带回
fn decode_frame_png(video_path: &Path, timestamp_seconds: f64) -> Result<Vec<u8>, VideoError> {
    let output = Command::new("ffmpeg")
        .arg("-v")
        .arg("error")
        .arg("-ss")
        .arg(format!("{}", timestamp_seconds))
        .arg("-i")
        .arg(video_path)
        .arg("-frames:v")
        .arg("1")
        .arg("-f")
        .arg("image2pipe")
        .arg("-vcodec")
        .arg("png")
        .arg("-")
        .output()
        .map_err(|e| VideoError::DecodeFailed(format!("failed to run ffmpeg: {}", e)))?;

    if !output.status.success() {
        return Err(VideoError::DecodeFailed(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }

    if output.stdout.is_empty() {
        return Err(VideoError::DecodeFailed(format!(
            "no frame returned at {:.2}s",
            timestamp_seconds
        )));
    }

    Ok(output.stdout)
}
