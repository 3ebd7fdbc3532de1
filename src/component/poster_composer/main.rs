use super::sampling::{GridType, PosterRequest, SamplingPlan};
use super::sprite_loader::{DEFAULT_DECODE_TIMEOUT, load_sprite_sheet_holding};
use super::sprite_sheet::{ImageFileDecoder, RasterDecoder, SpriteSheetRequester};
use crate::error::{PosterError, PosterResult};
use crate::tools::encode_png_data_url;
use image::{DynamicImage, Rgba, RgbaImage, imageops};
use log::{debug, info};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// 海報：依列優先排列的格子圖片（PNG data URI）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Poster {
    pub grid: GridType,
    pub cell_width: u32,
    pub cell_height: u32,
    pub cells: Vec<String>,
}

impl Poster {
    /// 第 `row` 列第 `col` 欄的格子
    #[must_use]
    pub fn cell(&self, row: u32, col: u32) -> Option<&str> {
        let n = self.grid.size();
        if row >= n || col >= n {
            return None;
        }
        self.cells.get((row * n + col) as usize).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// 海報合成器
///
/// 流程：
/// 1. 計算取樣間隔與格子寬度
/// 2. 請求縮圖拼接圖
/// 3. 有限時間內解碼拼接圖
/// 4. 切割為 n x n 格並各自編碼
pub struct PosterComposer {
    requester: Arc<dyn SpriteSheetRequester>,
    decoder: Arc<dyn RasterDecoder>,
    decode_timeout: Duration,
}

impl PosterComposer {
    pub fn new(requester: Arc<dyn SpriteSheetRequester>) -> Self {
        Self {
            requester,
            decoder: Arc::new(ImageFileDecoder),
            decode_timeout: DEFAULT_DECODE_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_decoder(mut self, decoder: Arc<dyn RasterDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    #[must_use]
    pub const fn with_decode_timeout(mut self, timeout: Duration) -> Self {
        self.decode_timeout = timeout;
        self
    }

    pub fn compose(&self, request: &PosterRequest, cancel_signal: &AtomicBool) -> PosterResult<Poster> {
        self.compose_holding(request, cancel_signal, ())
    }

    /// 合成海報，`hold` 交給解碼執行緒持有直到解碼結束
    pub fn compose_holding<H: Send + 'static>(
        &self,
        request: &PosterRequest,
        cancel_signal: &AtomicBool,
        hold: H,
    ) -> PosterResult<Poster> {
        let plan = SamplingPlan::new(request.duration, request.grid)?;
        info!(
            "生成 {} 海報: {} (間隔 {}s, 寬度 {}px)",
            request.grid,
            request.source_path.display(),
            plan.interval,
            plan.cell_width
        );

        let sheet = self
            .requester
            .request(
                &request.source_path,
                plan.interval,
                plan.cell_width,
                request.grid,
            )
            .map_err(|e| PosterError::request(format!("{e:#}")))?
            .ok_or_else(|| {
                PosterError::MissingThumbnail(request.source_path.display().to_string())
            })?;

        let raster = load_sprite_sheet_holding(
            Arc::clone(&self.decoder),
            &sheet.img_path,
            self.decode_timeout,
            cancel_signal,
            hold,
        )?;

        slice_sprite_sheet(&raster, request.grid, plan.cell_width, cancel_signal)
    }
}

/// 將拼接圖切割為 n x n 格
///
/// 格子高度為 `總高度 / (n + 1)`，寬度固定。同一塊畫布在每格之間重設後重複使用，
/// 每格畫完立即編碼，取得的是當下內容的複本。超出拼接圖範圍的部分保持透明。
pub fn slice_sprite_sheet(
    sheet: &DynamicImage,
    grid: GridType,
    cell_width: u32,
    cancel_signal: &AtomicBool,
) -> PosterResult<Poster> {
    let sheet = sheet.to_rgba8();
    let cell_height = sheet.height() / grid.sheet_rows();
    if cell_width == 0 || cell_height == 0 {
        return Err(PosterError::decode_failure(format!(
            "縮圖尺寸過小: {}x{}",
            sheet.width(),
            sheet.height()
        )));
    }

    debug!(
        "切割 {}x{} 拼接圖，格子 {}x{}",
        sheet.width(),
        sheet.height(),
        cell_width,
        cell_height
    );

    let n = grid.size();
    let mut surface = RgbaImage::new(cell_width, cell_height);
    let mut cells = Vec::with_capacity(grid.cell_count());

    for row in 0..n {
        for col in 0..n {
            if cancel_signal.load(Ordering::SeqCst) {
                return Err(PosterError::Cancelled);
            }

            draw_cell(&mut surface, &sheet, col * cell_width, row * cell_height);
            let encoded =
                encode_png_data_url(&surface).map_err(|e| PosterError::encode(format!("{e:#}")))?;
            cells.push(encoded);
        }
    }

    Ok(Poster {
        grid,
        cell_width,
        cell_height,
        cells,
    })
}

fn draw_cell(surface: &mut RgbaImage, sheet: &RgbaImage, x: u32, y: u32) {
    surface
        .pixels_mut()
        .for_each(|px| *px = Rgba([0, 0, 0, 0]));

    let region = imageops::crop_imm(sheet, x, y, surface.width(), surface.height()).to_image();
    imageops::replace(surface, &region, 0, 0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::decode_data_url;

    fn cell_color(row: u32, col: u32) -> Rgba<u8> {
        Rgba([(row * 40) as u8, (col * 40) as u8, 200, 255])
    }

    /// 每格填入依位置區分的顏色，並多一列作為底部保留列
    fn build_sheet(grid: GridType, cell_height: u32) -> DynamicImage {
        let n = grid.size();
        let width = grid.cell_width() * n;
        let height = cell_height * grid.sheet_rows();
        let sheet = RgbaImage::from_fn(width, height, |x, y| {
            let row = y / cell_height;
            let col = x / grid.cell_width();
            if row >= n {
                Rgba([255, 255, 255, 255])
            } else {
                cell_color(row, col)
            }
        });
        DynamicImage::ImageRgba8(sheet)
    }

    fn decode_cell(url: &str) -> RgbaImage {
        let bytes = decode_data_url(url).unwrap();
        image::load_from_memory(&bytes).unwrap().to_rgba8()
    }

    #[test]
    fn test_slice_produces_row_major_cells() {
        for grid in [GridType::Three, GridType::Four] {
            let sheet = build_sheet(grid, 20);
            let cancel = AtomicBool::new(false);
            let poster = slice_sprite_sheet(&sheet, grid, grid.cell_width(), &cancel).unwrap();

            assert_eq!(poster.len(), grid.cell_count());
            assert_eq!(poster.cell_height, 20);

            let n = grid.size();
            for (k, url) in poster.cells.iter().enumerate() {
                let (row, col) = (k as u32 / n, k as u32 % n);
                let cell = decode_cell(url);
                assert_eq!(cell.dimensions(), (grid.cell_width(), 20));
                assert_eq!(cell.get_pixel(0, 0), &cell_color(row, col));
                assert_eq!(cell.get_pixel(grid.cell_width() - 1, 19), &cell_color(row, col));
                assert_eq!(poster.cell(row, col), Some(url.as_str()));
            }
        }
    }

    #[test]
    fn test_cell_height_drops_remainder() {
        let sheet = DynamicImage::new_rgba8(380 * 3, 4 * 25 + 3);
        let cancel = AtomicBool::new(false);
        let poster = slice_sprite_sheet(&sheet, GridType::Three, 380, &cancel).unwrap();
        assert_eq!(poster.cell_height, 25);
    }

    #[test]
    fn test_narrow_sheet_leaves_cells_transparent() {
        // 只有一欄寬的拼接圖：第二、三欄超出範圍
        let sheet = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            380,
            40,
            Rgba([9, 9, 9, 255]),
        ));
        let cancel = AtomicBool::new(false);
        let poster = slice_sprite_sheet(&sheet, GridType::Three, 380, &cancel).unwrap();

        assert_eq!(decode_cell(&poster.cells[0]).get_pixel(0, 0), &Rgba([9, 9, 9, 255]));
        assert_eq!(decode_cell(&poster.cells[1]).get_pixel(0, 0), &Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_too_short_sheet_is_rejected() {
        let sheet = DynamicImage::new_rgba8(380 * 3, 3);
        let cancel = AtomicBool::new(false);
        let err = slice_sprite_sheet(&sheet, GridType::Three, 380, &cancel).unwrap_err();
        assert!(matches!(err, PosterError::DecodeFailure(_)));
    }

    #[test]
    fn test_slice_honors_cancel() {
        let sheet = build_sheet(GridType::Three, 10);
        let cancel = AtomicBool::new(true);
        let err = slice_sprite_sheet(&sheet, GridType::Three, 380, &cancel).unwrap_err();
        assert_eq!(err, PosterError::Cancelled);
    }

    #[test]
    fn test_poster_cell_out_of_range() {
        let poster = Poster {
            grid: GridType::Three,
            cell_width: 380,
            cell_height: 10,
            cells: vec![String::new(); 9],
        };
        assert!(poster.cell(3, 0).is_none());
        assert!(poster.cell(0, 3).is_none());
        assert!(poster.cell(2, 2).is_some());
    }
}
