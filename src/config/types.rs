use crate::component::poster_composer::{DEFAULT_DECODE_TIMEOUT, DEFAULT_MAX_CONCURRENT, GridType};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const MAX_RECENT_PATHS: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileTypeTable {
    #[serde(rename = "VIDEO_FILE")]
    pub video_file: Vec<String>,
}

impl FileTypeTable {
    #[must_use]
    pub fn video_extensions_set(&self) -> HashSet<String> {
        self.video_file
            .iter()
            .map(|ext| ext.to_lowercase())
            .collect()
    }

    #[must_use]
    pub fn is_video_file(&self, path: &Path) -> bool {
        Self::has_extension_in(path, &self.video_extensions_set())
    }

    /// `extensions` 需為小寫且含前導 `.`
    #[must_use]
    pub fn has_extension_in(path: &Path, extensions: &HashSet<String>) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| extensions.contains(&format!(".{}", ext.to_lowercase())))
    }
}

/// 海報相關設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PosterSettings {
    pub default_grid: GridType,
    /// 解碼等待上限（秒）
    pub decode_timeout_secs: u64,
    /// 同時進行的海報合成數量上限
    pub max_concurrent: usize,
    /// 縮圖拼接圖快取資料夾，未設定時使用系統暫存資料夾
    pub sprite_cache_dir: Option<PathBuf>,
}

impl Default for PosterSettings {
    fn default() -> Self {
        Self {
            default_grid: GridType::Three,
            decode_timeout_secs: DEFAULT_DECODE_TIMEOUT.as_secs(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            sprite_cache_dir: None,
        }
    }
}

impl PosterSettings {
    #[must_use]
    pub fn decode_timeout(&self) -> Duration {
        Duration::from_secs(self.decode_timeout_secs.max(1))
    }

    #[must_use]
    pub fn sprite_cache_dir(&self) -> PathBuf {
        self.sprite_cache_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("video_poster_sprites"))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    pub poster: PosterSettings,
    pub recent_paths: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub file_type_table: FileTypeTable,
    pub settings: UserSettings,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_video_file_ignores_case() {
        let table = FileTypeTable {
            video_file: vec![".mp4".to_string(), ".MKV".to_string()],
        };
        assert!(table.is_video_file(Path::new("/a/b.MP4")));
        assert!(table.is_video_file(Path::new("c.mkv")));
        assert!(!table.is_video_file(Path::new("c.txt")));
        assert!(!table.is_video_file(Path::new("mp4")));
    }

    #[test]
    fn test_partial_settings_use_defaults() {
        let settings: UserSettings =
            serde_json::from_str(r#"{"poster": {"default_grid": 4}}"#).unwrap();
        assert_eq!(settings.poster.default_grid, GridType::Four);
        assert_eq!(settings.poster.max_concurrent, DEFAULT_MAX_CONCURRENT);
        assert!(settings.recent_paths.is_empty());
    }

    #[test]
    fn test_invalid_grid_in_settings_is_rejected() {
        let result = serde_json::from_str::<UserSettings>(r#"{"poster": {"default_grid": 5}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_timeout_has_floor() {
        let settings = PosterSettings {
            decode_timeout_secs: 0,
            ..PosterSettings::default()
        };
        assert_eq!(settings.decode_timeout(), Duration::from_secs(1));
    }
}
