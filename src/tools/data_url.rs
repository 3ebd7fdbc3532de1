//! PNG data URI 編碼與解碼

use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{ImageFormat, RgbaImage};
use regex::Regex;
use std::io::Cursor;
use std::sync::LazyLock;

pub const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

static DATA_URL_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^data:image/\w+;base64,").expect("Invalid data url regex")
});

/// 將圖片編碼為 PNG data URI
pub fn encode_png_data_url(image: &RgbaImage) -> Result<String> {
    let mut buf = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .context("PNG 編碼失敗")?;
    Ok(format!("{PNG_DATA_URL_PREFIX}{}", STANDARD.encode(&buf)))
}

/// 去除 `data:image/<fmt>;base64,` 前綴並解碼為原始位元組
///
/// 沒有前綴時，整段字串視為 base64 內容
pub fn decode_data_url(data_url: &str) -> Result<Vec<u8>> {
    let payload = DATA_URL_HEADER.replace(data_url, "");
    STANDARD
        .decode(payload.trim().as_bytes())
        .context("base64 解碼失敗")
}
