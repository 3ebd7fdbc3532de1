use crate::component::media_summary::{MediaSummary, MediaSummaryBuilder};
use crate::component::poster_composer::{GridType, PosterComposer, PosterRequest, PosterService};
use crate::component::snapshot_exporter::{PosterBoard, export_snapshot};
use crate::config::Config;
use crate::tools::{
    FfmpegSpriteSheetRequester, FfprobeMediaProbe, VideoFileInfo, ensure_directory_exists,
    scan_video_files, validate_directory_exists, validate_file_exists,
};
use anyhow::{Context, Result};
use console::style;
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 海報生成結果
#[derive(Debug, Default, PartialEq, Eq)]
pub struct GenerationResult {
    pub total_videos: usize,
    pub successful: usize,
    pub failed: usize,
    pub skipped: usize,
}

enum VideoOutcome {
    Created,
    Skipped,
    Failed,
}

/// 批次海報生成器
///
/// 每個影片：
/// A. 取得媒體摘要（ffprobe）
/// B. 產生縮圖拼接圖並切割為海報格子
/// C. 重新拼成一張圖並匯出為 `<檔名>_poster.png`
pub struct PosterGenerator {
    config: Config,
    shutdown_signal: Arc<AtomicBool>,
    summary_builder: MediaSummaryBuilder,
    poster_service: PosterService,
}

impl PosterGenerator {
    pub fn new(config: Config, shutdown_signal: Arc<AtomicBool>) -> Self {
        let poster_settings = &config.settings.poster;
        let composer = PosterComposer::new(Arc::new(FfmpegSpriteSheetRequester::new(
            poster_settings.sprite_cache_dir(),
        )))
        .with_decode_timeout(poster_settings.decode_timeout());
        let poster_service = PosterService::new(composer, poster_settings.max_concurrent);

        Self {
            summary_builder: MediaSummaryBuilder::new(Arc::new(FfprobeMediaProbe::new())),
            poster_service,
            config,
            shutdown_signal,
        }
    }

    /// 回傳本次使用的影片資料夾路徑
    pub fn run(&self) -> Result<String> {
        println!("{}", style("=== 影片海報生成 ===").cyan().bold());

        let input_path = self.prompt_input_dir()?;
        let input_dir = PathBuf::from(&input_path);
        validate_directory_exists(&input_dir)?;

        let output_path = self.prompt_path("請輸入海報輸出資料夾路徑")?;
        let output_dir = PathBuf::from(&output_path);
        ensure_directory_exists(&output_dir)?;

        println!("{}", style("掃描影片檔案中...").dim());
        let video_files = scan_video_files(&input_dir, &self.config.file_type_table)?;

        if video_files.is_empty() {
            println!("{}", style("找不到任何影片檔案").yellow());
            return Ok(input_path);
        }

        println!(
            "{}",
            style(format!(
                "找到 {} 個影片檔案，使用 {} 網格",
                video_files.len(),
                self.config.settings.poster.default_grid
            ))
            .green()
        );

        let result = self.process_videos(
            &video_files,
            &output_dir,
            self.config.settings.poster.default_grid,
        );
        self.print_summary(&result);

        Ok(input_path)
    }

    /// 以最近使用的資料夾作為預設值
    fn prompt_input_dir(&self) -> Result<String> {
        let mut input = Input::<String>::new().with_prompt("請輸入影片資料夾路徑");
        if let Some(recent) = self.config.settings.recent_paths.first() {
            input = input.default(recent.clone());
        }
        let path = input.interact_text()?;
        Ok(path.trim().to_string())
    }

    fn prompt_path(&self, prompt: &str) -> Result<String> {
        let path: String = Input::new().with_prompt(prompt).interact_text()?;
        Ok(path.trim().to_string())
    }

    /// 平行處理所有影片，每部影片的海報合成受 `PosterService` 的並行上限約束
    pub fn process_videos(
        &self,
        videos: &[VideoFileInfo],
        output_dir: &Path,
        grid: GridType,
    ) -> GenerationResult {
        let progress_bar = ProgressBar::new(videos.len() as u64);
        progress_bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
                .expect("Invalid progress bar template")
                .progress_chars("#>-"),
        );
        progress_bar.set_message("生成海報中...");

        let outcomes: Vec<VideoOutcome> = videos
            .par_iter()
            .map(|video| {
                let outcome = self.process_single_video(&video.path, output_dir, grid);
                progress_bar.inc(1);
                outcome
            })
            .collect();

        progress_bar.finish_with_message("完成");

        let mut result = GenerationResult {
            total_videos: videos.len(),
            ..GenerationResult::default()
        };
        for outcome in outcomes {
            match outcome {
                VideoOutcome::Created => result.successful += 1,
                VideoOutcome::Skipped => result.skipped += 1,
                VideoOutcome::Failed => result.failed += 1,
            }
        }
        result
    }

    fn process_single_video(&self, video_path: &Path, output_dir: &Path, grid: GridType) -> VideoOutcome {
        if self.shutdown_signal.load(Ordering::SeqCst) {
            return VideoOutcome::Skipped;
        }

        let output_path = poster_output_path(video_path, output_dir);
        if output_path.exists() {
            info!("海報已存在，跳過: {}", output_path.display());
            return VideoOutcome::Skipped;
        }

        match self.generate_poster(video_path, &output_path, grid) {
            Ok(summary) => {
                info!("{}: {}", summary.name, summary.details);
                VideoOutcome::Created
            }
            Err(e) => {
                error!("處理影片失敗 {}: {e:#}", video_path.display());
                VideoOutcome::Failed
            }
        }
    }

    /// 產生單一影片的海報並匯出
    pub fn generate_poster(
        &self,
        video_path: &Path,
        output_path: &Path,
        grid: GridType,
    ) -> Result<MediaSummary> {
        let summary = self
            .summary_builder
            .build(video_path)
            .with_context(|| format!("無法讀取媒體資訊: {}", video_path.display()))?;

        let request = PosterRequest::new(video_path, summary.duration, grid.size())?;
        let poster = self
            .poster_service
            .get_poster(&request, &self.shutdown_signal)
            .with_context(|| format!("海報合成失敗: {}", video_path.display()))?;

        export_snapshot(&PosterBoard::new(&poster).with_gap(4), output_path)?;
        Ok(summary)
    }

    /// 顯示單一影片的媒體摘要
    pub fn show_media_summary(&self) -> Result<()> {
        let path = PathBuf::from(self.prompt_path("請輸入影片檔案路徑")?);
        validate_file_exists(&path)?;
        match self.summary_builder.build(&path) {
            Ok(summary) => {
                println!("  {}", style(&summary.name).bold());
                println!("  {}", summary.details);
            }
            Err(e) => {
                warn!("媒體摘要失敗 {}: {e}", path.display());
                println!("  {} {}", style("✗").red(), e);
            }
        }
        Ok(())
    }

    fn print_summary(&self, result: &GenerationResult) {
        println!();
        println!("{}", style("=== 海報生成摘要 ===").cyan().bold());
        println!("  總計: {} 個影片", result.total_videos);
        println!("  成功: {} 個", style(result.successful).green());

        if result.skipped > 0 {
            println!("  跳過: {} 個", style(result.skipped).yellow());
        }

        if result.failed > 0 {
            println!("  失敗: {} 個", style(result.failed).red());
        }

        info!(
            "海報生成完成 - 成功: {}, 跳過: {}, 失敗: {}",
            result.successful, result.skipped, result.failed
        );
    }
}

#[must_use]
pub fn poster_output_path(video_path: &Path, output_dir: &Path) -> PathBuf {
    let video_name = video_path
        .file_stem()
        .map_or_else(|| "video".to_string(), |s| s.to_string_lossy().to_string());
    output_dir.join(format!("{video_name}_poster.png"))
}
