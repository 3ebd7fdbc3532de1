use anyhow::Result;
use std::path::Path;

/// 單一串流資訊
#[derive(Debug, Clone, PartialEq)]
pub struct StreamInfo {
    pub codec_type: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// 容器資訊
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormatInfo {
    /// 檔案大小（位元組）
    pub size: Option<u64>,
    /// 影片長度（秒）
    pub duration: Option<f64>,
}

/// 媒體探測結果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaInfo {
    pub streams: Vec<StreamInfo>,
    pub format: Option<FormatInfo>,
}

impl MediaInfo {
    /// 第一個視訊串流
    #[must_use]
    pub fn video_stream(&self) -> Option<&StreamInfo> {
        self.streams.iter().find(|s| s.codec_type == "video")
    }
}

/// 媒體探測器
///
/// `Ok(None)` 表示檔案無法解析（不支援或損毀）
pub trait MediaProbe: Send + Sync {
    fn probe(&self, path: &Path) -> Result<Option<MediaInfo>>;
}
