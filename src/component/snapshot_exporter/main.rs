use crate::error::{ExportError, ExportResult};
use crate::tools::decode_data_url;
use anyhow::Result;
use log::{debug, info};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use tempfile::NamedTempFile;

/// 可轉換為圖片的畫面區塊
pub trait Renderable {
    /// 轉換為圖片 data URI（例如 `data:image/png;base64,...`）
    fn render_data_url(&self) -> Result<String>;
}

/// 待寫入的圖片
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedSnapshot {
    pub bytes: Vec<u8>,
    pub path: PathBuf,
}

impl ExportedSnapshot {
    /// 去除 data URI 前綴並解碼
    pub fn from_data_url(data_url: &str, path: impl Into<PathBuf>) -> ExportResult<Self> {
        let bytes =
            decode_data_url(data_url).map_err(|e| ExportError::InvalidPayload(format!("{e:#}")))?;
        if bytes.is_empty() {
            return Err(ExportError::InvalidPayload("圖片資料為空".to_string()));
        }
        Ok(Self {
            bytes,
            path: path.into(),
        })
    }

    /// 先寫入同目錄的暫存檔，成功後再改名為目標檔案
    ///
    /// 失敗時暫存檔會被刪除，不會留下不完整的檔案
    pub fn write(self) -> ExportResult<PathBuf> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut temp = NamedTempFile::new_in(&dir).map_err(|e| ExportError::io_write(&self.path, e))?;
        temp.write_all(&self.bytes)
            .and_then(|()| temp.as_file().sync_all())
            .map_err(|e| ExportError::io_write(&self.path, e))?;
        temp.persist(&self.path)
            .map_err(|e| ExportError::io_write(&self.path, e.error))?;

        info!("已匯出圖片: {} ({} bytes)", self.path.display(), self.bytes.len());
        Ok(self.path)
    }
}

/// 將畫面區塊轉為圖片並寫入檔案
pub fn export_snapshot(element: &dyn Renderable, save_path: &Path) -> ExportResult<PathBuf> {
    snapshot(element, save_path)?.write()
}

/// 與 [`export_snapshot`] 相同，但檔案寫入在背景執行緒進行
///
/// 畫面轉換仍在呼叫端執行緒完成
pub fn export_in_background(
    element: &dyn Renderable,
    save_path: &Path,
) -> ExportResult<JoinHandle<ExportResult<PathBuf>>> {
    let snapshot = snapshot(element, save_path)?;
    Ok(thread::spawn(move || snapshot.write()))
}

fn snapshot(element: &dyn Renderable, save_path: &Path) -> ExportResult<ExportedSnapshot> {
    let data_url = element.render_data_url().map_err(ExportError::Render)?;
    debug!("畫面已轉換，準備寫入 {}", save_path.display());
    ExportedSnapshot::from_data_url(&data_url, save_path)
}
