//! ffprobe 元数据探测

use std::path::Path;
use std::process::Command;

use log::debug;
use serde::Deserialize;

use super::VideoError;

/// 视频元数据（只保留时长推导需要的字段）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoMetadata {
    pub fps: f64,
    pub frame_count: u64,
}

impl VideoMetadata {
    /// 时长 = 帧数 / 帧率，帧率非正时返回 0
    pub fn duration(&self) -> f64 {
        if self.fps > 0.0 {
            self.frame_count as f64 / self.fps
        } else {
            0.0
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    nb_frames: Option<String>,
    r_frame_rate: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

/// 调用 ffprobe 读取第一条视频流的帧数和帧率
pub fn probe_video(video_path: &Path) -> Result<VideoMetadata, VideoError> {
    let output = Command::new("ffprobe")
        .arg("-v")
        .arg("error")
        .arg("-select_streams")
        .arg("v:0")
        .arg("-show_entries")
        .arg("stream=nb_frames,r_frame_rate")
        .arg("-show_entries")
        .arg("format=duration")
        .arg("-of")
        .arg("json")
        .arg(video_path)
        .output()
        .map_err(|e| VideoError::ProbeFailed(format!("failed to run ffprobe: {}", e)))?;

    if !output.status.success() {
        return Err(VideoError::ProbeFailed(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }

    let probe: ProbeOutput = serde_json::from_slice(&output.stdout)
        .map_err(|e| VideoError::ProbeFailed(format!("unexpected ffprobe output: {}", e)))?;

    let stream = probe
        .streams
        .first()
        .ok_or_else(|| VideoError::ProbeFailed("no video stream found".to_string()))?;

    let fps = stream
        .r_frame_rate
        .as_deref()
        .map(parse_frame_rate)
        .unwrap_or(0.0);

    // 某些容器（如部分 mkv）没有 nb_frames，退化为 时长 * 帧率
    let frame_count = match stream.nb_frames.as_deref().and_then(|n| n.parse().ok()) {
        Some(count) => count,
        None => {
            let container_duration = probe
                .format
                .and_then(|f| f.duration)
                .and_then(|d| d.parse::<f64>().ok())
                .unwrap_or(0.0);
            (container_duration * fps).round() as u64
        }
    };

    let metadata = VideoMetadata { fps, frame_count };
    debug!(
        "probed {}: fps={:.3} frames={} duration={:.2}s",
        video_path.display(),
        metadata.fps,
        metadata.frame_count,
        metadata.duration()
    );

    Ok(metadata)
}

/// 解析 ffprobe 的分数形式帧率，如 "30/1"、"30000/1001"
fn parse_frame_rate(raw: &str) -> f64 {
    let mut parts = raw.splitn(2, '/');
    let numerator: f64 = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0.0);
    let denominator: f64 = parts.next().and_then(|p| p.parse().ok()).unwrap_or(1.0);

    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}
