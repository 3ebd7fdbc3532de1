//! 功能元件模組
//!
//! 每個子模組實現一個獨立的功能，包含主要邏輯和專用工具

pub mod media_summary;
pub mod poster_composer;
pub mod poster_generator;
pub mod snapshot_exporter;

pub use media_summary::MediaSummaryBuilder;
pub use poster_composer::{PosterComposer, PosterService};
pub use poster_generator::PosterGenerator;
