use crate::config::FileTypeTable;
use anyhow::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFileInfo {
    pub path: PathBuf,
    pub size: u64,
}

/// 掃描資料夾內的影片檔案，依檔案大小排序（由小到大）
pub fn scan_video_files(
    directory: &Path,
    file_type_table: &FileTypeTable,
) -> Result<Vec<VideoFileInfo>> {
    let video_extensions = file_type_table.video_extensions_set();

    let mut video_files: Vec<VideoFileInfo> = WalkDir::new(directory)
        .follow_links(false)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| FileTypeTable::has_extension_in(entry.path(), &video_extensions))
        .filter_map(|entry| {
            let metadata = entry.metadata().ok()?;
            Some(VideoFileInfo {
                path: entry.into_path(),
                size: metadata.len(),
            })
        })
        .collect();

    video_files.sort_by(|a, b| a.size.cmp(&b.size).then_with(|| a.path.cmp(&b.path)));
    Ok(video_files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn table() -> FileTypeTable {
        FileTypeTable {
            video_file: vec![".mp4".to_string(), ".MKV".to_string()],
        }
    }

    #[test]
    fn test_scan_filters_and_sorts_by_size() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("big.mp4"), vec![0u8; 300]).unwrap();
        std::fs::write(dir.path().join("small.MP4"), vec![0u8; 10]).unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub").join("mid.mkv"), vec![0u8; 100]).unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"hello").unwrap();

        let files = scan_video_files(dir.path(), &table()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|f| f.path.file_name().unwrap().to_string_lossy().to_string())
            .collect();

        assert_eq!(names, vec!["small.MP4", "mid.mkv", "big.mp4"]);
        assert_eq!(files[0].size, 10);
    }

    #[test]
    fn test_scan_empty_directory() {
        let dir = TempDir::new().unwrap();
        assert!(scan_video_files(dir.path(), &table()).unwrap().is_empty());
    }
}
