use super::media_info::MediaProbe;
use crate::error::{SummaryError, SummaryResult};
use crate::tools::{format_file_size, timecode_from_seconds};
use log::debug;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

/// 媒體摘要
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaSummary {
    pub name: String,
    /// `<大小>   <寬> * <高>   <時間碼>`
    pub details: String,
    pub duration: f64,
    pub duration_fmt: String,
}

/// 媒體摘要產生器
pub struct MediaSummaryBuilder {
    probe: Arc<dyn MediaProbe>,
}

impl MediaSummaryBuilder {
    pub fn new(probe: Arc<dyn MediaProbe>) -> Self {
        Self { probe }
    }

    /// 探測媒體並產生摘要
    ///
    /// 缺少的欄位各自回傳不同錯誤，不使用預設值；大小為 0 或長度不大於 0 視同缺少
    pub fn build(&self, path: &Path) -> SummaryResult<MediaSummary> {
        let label = path.display().to_string();

        let info = self
            .probe
            .probe(path)
            .map_err(SummaryError::Probe)?
            .ok_or_else(|| SummaryError::MissingMediaInfo(label.clone()))?;
        let format = info
            .format
            .as_ref()
            .ok_or_else(|| SummaryError::MissingMediaInfo(label.clone()))?;

        let video_stream = info
            .video_stream()
            .ok_or_else(|| SummaryError::MissingVideoStream(label.clone()))?;
        let size = format
            .size
            .filter(|&size| size > 0)
            .ok_or_else(|| SummaryError::MissingSize(label.clone()))?;
        let duration = format
            .duration
            .filter(|d| d.is_finite() && *d > 0.0)
            .ok_or_else(|| SummaryError::MissingDuration(label.clone()))?;

        let (width, height) = video_stream
            .width
            .zip(video_stream.height)
            .ok_or_else(|| SummaryError::MissingResolution(label.clone()))?;

        let duration_fmt = timecode_from_seconds(duration);
        let details = format!(
            "{}   {} * {}   {}",
            format_file_size(size),
            width,
            height,
            duration_fmt
        );
        debug!("媒體摘要 {label}: {details}");

        Ok(MediaSummary {
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
            details,
            duration,
            duration_fmt,
        })
    }
}
