//! 批次海報生成元件
//!
//! 掃描資料夾內的影片，為每部影片產生海報圖片

mod main;

pub use main::{GenerationResult, PosterGenerator, poster_output_path};
