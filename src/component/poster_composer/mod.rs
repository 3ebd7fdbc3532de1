//! 海報合成元件
//!
//! 將外部產生的縮圖拼接圖切割為 3x3 或 4x4 的獨立格子圖片：
//! A. 計算取樣間隔
//! B. 請求縮圖拼接圖
//! C. 有限時間內解碼
//! D. 依列優先切割並編碼

mod main;
mod sampling;
mod service;
mod sprite_loader;
mod sprite_sheet;

pub use main::{Poster, PosterComposer, slice_sprite_sheet};
pub use sampling::{GridType, PosterRequest, SamplingPlan};
pub use service::{DEFAULT_MAX_CONCURRENT, PosterService};
pub use sprite_loader::{DEFAULT_DECODE_TIMEOUT, load_sprite_sheet, load_sprite_sheet_holding};
pub use sprite_sheet::{ImageFileDecoder, RasterDecoder, SpriteSheetPath, SpriteSheetRequester};
