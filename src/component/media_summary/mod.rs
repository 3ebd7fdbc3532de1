//! 媒體摘要元件
//!
//! 探測檔案大小、解析度與長度，組成一行文字說明

mod main;
mod media_info;

pub use main::{MediaSummary, MediaSummaryBuilder};
pub use media_info::{FormatInfo, MediaInfo, MediaProbe, StreamInfo};
