use super::path_validator::ensure_directory_exists;
use crate::component::poster_composer::{GridType, SpriteSheetPath, SpriteSheetRequester};
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempPath;

/// 以 ffmpeg 產生縮圖拼接圖
///
/// 每 `interval` 秒取一張，縮放為固定寬度後以 `n x (n + 1)` 排列成一張圖。
/// 產生的檔案放在快取資料夾，相同參數的請求直接重用。
#[derive(Debug, Clone)]
pub struct FfmpegSpriteSheetRequester {
    cache_dir: PathBuf,
}

impl FfmpegSpriteSheetRequester {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    /// 快取檔名：來源路徑雜湊 + 檔名 + 網格 + 間隔
    #[must_use]
    pub fn output_path(&self, source: &Path, interval: u64, width: u32, grid: GridType) -> PathBuf {
        let digest = blake3::hash(source.to_string_lossy().as_bytes()).to_hex();
        let stem = source
            .file_stem()
            .map_or_else(|| "video".to_string(), |s| s.to_string_lossy().to_string());
        self.cache_dir.join(format!(
            "{}_{}_{grid}_{interval}s_{width}w.png",
            &digest.as_str()[..16],
            stem
        ))
    }
}

impl SpriteSheetRequester for FfmpegSpriteSheetRequester {
    fn request(
        &self,
        source: &Path,
        interval: u64,
        width: u32,
        grid: GridType,
    ) -> Result<Option<SpriteSheetPath>> {
        ensure_directory_exists(&self.cache_dir)?;

        let output_path = self.output_path(source, interval, width, grid);
        if output_path.exists() {
            debug!("重用縮圖拼接圖: {}", output_path.display());
            return Ok(Some(SpriteSheetPath {
                img_path: output_path,
            }));
        }

        // 先寫入暫存檔，成功後才改名，中斷的 ffmpeg 不會留下殘缺的快取
        let temp_path = tempfile::Builder::new()
            .prefix(".sprite_")
            .suffix(".png")
            .tempfile_in(&self.cache_dir)
            .with_context(|| format!("無法建立暫存檔: {}", self.cache_dir.display()))?
            .into_temp_path();

        let args = build_ffmpeg_args(source, interval, width, grid, &temp_path);
        debug!("執行: ffmpeg {}", args.join(" "));

        let output = Command::new("ffmpeg")
            .args(&args)
            .output()
            .with_context(|| format!("無法執行 ffmpeg 產生縮圖拼接圖: {}", source.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!("ffmpeg 產生縮圖拼接圖失敗 {}: {}", source.display(), stderr.trim());
            return Ok(None);
        }

        finalize_sheet(temp_path, &output_path)
    }
}

/// 將 ffmpeg 輸出的暫存檔移到快取位置；空檔視為未產生
fn finalize_sheet(temp_path: TempPath, output_path: &Path) -> Result<Option<SpriteSheetPath>> {
    let written = std::fs::metadata(&temp_path).map_or(0, |m| m.len());
    if written == 0 {
        warn!("縮圖拼接圖未建立: {}", output_path.display());
        return Ok(None);
    }

    temp_path
        .persist(output_path)
        .with_context(|| format!("無法寫入縮圖拼接圖: {}", output_path.display()))?;

    info!("縮圖拼接圖已建立: {}", output_path.display());
    Ok(Some(SpriteSheetPath {
        img_path: output_path.to_path_buf(),
    }))
}

/// `fps=1/<間隔>,scale=<寬>:-2,tile=<n>x<n+1>`
fn build_tile_filter(interval: u64, width: u32, grid: GridType) -> String {
    format!(
        "fps=1/{},scale={}:-2,tile={}x{}",
        interval.max(1),
        width,
        grid.size(),
        grid.sheet_rows()
    )
}

fn build_ffmpeg_args(
    source: &Path,
    interval: u64,
    width: u32,
    grid: GridType,
    output_path: &Path,
) -> Vec<String> {
    vec![
        "-hide_banner".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        "-i".to_string(),
        source.to_string_lossy().to_string(),
        "-an".to_string(),
        "-sn".to_string(),
        "-dn".to_string(),
        "-vf".to_string(),
        build_tile_filter(interval, width, grid),
        "-frames:v".to_string(),
        "1".to_string(),
        "-update".to_string(),
        "1".to_string(),
        "-y".to_string(),
        output_path.to_string_lossy().to_string(),
    ]
}
