//! 錯誤型別
//!
//! 每個元件各自一組錯誤，呼叫端可依種類顯示不同訊息

use std::path::PathBuf;
use std::time::Duration;

pub type PosterResult<T> = Result<T, PosterError>;
pub type SummaryResult<T> = Result<T, SummaryError>;
pub type ExportResult<T> = Result<T, ExportError>;

/// 海報生成錯誤
///
/// 需要 `Clone`：合併請求時，同一個結果會交給所有等待者
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PosterError {
    #[error("不支援的網格類型: {0}（只支援 3 或 4）")]
    InvalidGridType(u32),

    #[error("影片長度無效: {0}")]
    InvalidDuration(f64),

    #[error("無法產生縮圖: {0}")]
    MissingThumbnail(String),

    #[error("縮圖請求失敗: {0}")]
    Request(String),

    #[error("縮圖解碼失敗: {0}")]
    DecodeFailure(String),

    #[error("縮圖解碼逾時（{0:?}）")]
    DecodeTimeout(Duration),

    #[error("操作已取消")]
    Cancelled,

    #[error("格子編碼失敗: {0}")]
    Encode(String),
}

impl PosterError {
    pub fn request(msg: impl Into<String>) -> Self {
        Self::Request(msg.into())
    }

    pub fn decode_failure(msg: impl Into<String>) -> Self {
        Self::DecodeFailure(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }
}

/// 媒體摘要錯誤
#[derive(thiserror::Error, Debug)]
pub enum SummaryError {
    #[error("找不到媒體資訊: {0}")]
    MissingMediaInfo(String),

    #[error("找不到視訊串流: {0}")]
    MissingVideoStream(String),

    #[error("無法取得影片解析度: {0}")]
    MissingResolution(String),

    #[error("媒體資訊缺少檔案大小: {0}")]
    MissingSize(String),

    #[error("媒體資訊缺少影片長度: {0}")]
    MissingDuration(String),

    #[error("媒體探測失敗")]
    Probe(#[source] anyhow::Error),
}

/// 匯出錯誤
#[derive(thiserror::Error, Debug)]
pub enum ExportError {
    #[error("畫面轉換失敗")]
    Render(#[source] anyhow::Error),

    #[error("圖片資料無效: {0}")]
    InvalidPayload(String),

    #[error("無法寫入 {}", path.display())]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ExportError {
    pub fn io_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IoWrite {
            path: path.into(),
            source,
        }
    }
}
