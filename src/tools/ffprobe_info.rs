use crate::component::media_summary::{FormatInfo, MediaInfo, MediaProbe, StreamInfo};
use anyhow::{Context, Result};
use log::{debug, warn};
use serde::Deserialize;
use std::path::Path;
use std::process::Command;

#[derive(Deserialize)]
struct FfprobeOutput {
    format: Option<RawFormat>,
    streams: Option<Vec<RawStream>>,
}

#[derive(Deserialize)]
struct RawFormat {
    size: Option<String>,
    duration: Option<String>,
}

#[derive(Deserialize)]
struct RawStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

/// 使用 ffprobe 執行檔的媒體探測器
#[derive(Debug, Clone, Default)]
pub struct FfprobeMediaProbe;

impl FfprobeMediaProbe {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl MediaProbe for FfprobeMediaProbe {
    fn probe(&self, path: &Path) -> Result<Option<MediaInfo>> {
        let output = Command::new("ffprobe")
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(path)
            .output()
            .with_context(|| format!("無法執行 ffprobe: {}", path.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!("ffprobe 無法解析 {}: {}", path.display(), stderr.trim());
            return Ok(None);
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let info = parse_ffprobe_json(&stdout)?;
        debug!(
            "ffprobe {}: {} 個串流",
            path.display(),
            info.streams.len()
        );
        Ok(Some(info))
    }
}

/// 解析 ffprobe 的 JSON 輸出
///
/// ffprobe 以字串輸出 `size` 與 `duration`，無法解析的數值視為缺少
pub fn parse_ffprobe_json(json: &str) -> Result<MediaInfo> {
    let probe: FfprobeOutput = serde_json::from_str(json).context("無法解析 ffprobe 輸出")?;

    let streams = probe
        .streams
        .unwrap_or_default()
        .into_iter()
        .map(|s| StreamInfo {
            codec_type: s.codec_type.unwrap_or_default(),
            width: s.width,
            height: s.height,
        })
        .collect();

    let format = probe.format.map(|f| FormatInfo {
        size: f.size.and_then(|v| v.trim().parse::<u64>().ok()),
        duration: f
            .duration
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|d| d.is_finite()),
    });

    Ok(MediaInfo { streams, format })
}
