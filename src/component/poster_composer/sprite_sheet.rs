use super::sampling::GridType;
use anyhow::{Context, Result};
use image::DynamicImage;
use std::path::{Path, PathBuf};

/// 縮圖拼接圖的位置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteSheetPath {
    pub img_path: PathBuf,
}

/// 縮圖拼接圖產生器
///
/// `Ok(None)` 表示擷取不到任何畫面，呼叫端視為致命錯誤且不重試
pub trait SpriteSheetRequester: Send + Sync {
    fn request(
        &self,
        source: &Path,
        interval: u64,
        width: u32,
        grid: GridType,
    ) -> Result<Option<SpriteSheetPath>>;
}

/// 圖片解碼器
pub trait RasterDecoder: Send + Sync {
    fn decode(&self, path: &Path) -> Result<DynamicImage>;
}

/// 從檔案讀取並依內容判斷格式的解碼器
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageFileDecoder;

impl RasterDecoder for ImageFileDecoder {
    fn decode(&self, path: &Path) -> Result<DynamicImage> {
        image::ImageReader::open(path)
            .with_context(|| format!("無法開啟縮圖: {}", path.display()))?
            .with_guessed_format()
            .with_context(|| format!("無法判斷縮圖格式: {}", path.display()))?
            .decode()
            .with_context(|| format!("無法解碼縮圖: {}", path.display()))
    }
}
