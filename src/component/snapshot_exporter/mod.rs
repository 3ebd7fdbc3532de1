//! 畫面匯出元件
//!
//! 將畫面區塊轉為圖片後寫入檔案，寫入採暫存檔加改名

mod main;
mod poster_board;

pub use main::{ExportedSnapshot, Renderable, export_in_background, export_snapshot};
pub use poster_board::PosterBoard;
