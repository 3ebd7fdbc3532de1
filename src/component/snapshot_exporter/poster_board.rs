use super::main::Renderable;
use crate::component::poster_composer::Poster;
use crate::tools::{decode_data_url, encode_png_data_url};
use anyhow::{Context, Result};
use image::{Rgba, RgbaImage, imageops};

/// 將海報格子重新拼成一張圖，供匯出使用
pub struct PosterBoard<'a> {
    poster: &'a Poster,
    gap: u32,
    background: Rgba<u8>,
}

impl<'a> PosterBoard<'a> {
    #[must_use]
    pub const fn new(poster: &'a Poster) -> Self {
        Self {
            poster,
            gap: 0,
            background: Rgba([0, 0, 0, 255]),
        }
    }

    /// 格子之間及外框的間距（像素）
    #[must_use]
    pub const fn with_gap(mut self, gap: u32) -> Self {
        self.gap = gap;
        self
    }

    #[must_use]
    pub const fn with_background(mut self, background: Rgba<u8>) -> Self {
        self.background = background;
        self
    }

    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        let n = self.poster.grid.size();
        (
            n * self.poster.cell_width + (n + 1) * self.gap,
            n * self.poster.cell_height + (n + 1) * self.gap,
        )
    }

    pub fn render(&self) -> Result<RgbaImage> {
        let (width, height) = self.dimensions();
        let mut board = RgbaImage::from_pixel(width, height, self.background);
        let n = self.poster.grid.size();

        for (index, url) in self.poster.cells.iter().enumerate() {
            let (row, col) = (index as u32 / n, index as u32 % n);
            let bytes = decode_data_url(url)?;
            let cell = image::load_from_memory(&bytes)
                .with_context(|| format!("無法解碼第 {index} 格"))?
                .to_rgba8();

            let x = self.gap + col * (self.poster.cell_width + self.gap);
            let y = self.gap + row * (self.poster.cell_height + self.gap);
            imageops::overlay(&mut board, &cell, i64::from(x), i64::from(y));
        }

        Ok(board)
    }
}

impl Renderable for PosterBoard<'_> {
    fn render_data_url(&self) -> Result<String> {
        encode_png_data_url(&self.render()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::poster_composer::GridType;

    fn solid_poster(grid: GridType, cell_width: u32, cell_height: u32) -> Poster {
        let cells = (0..grid.cell_count())
            .map(|i| {
                let color = Rgba([i as u8 * 10, 0, 0, 255]);
                encode_png_data_url(&RgbaImage::from_pixel(cell_width, cell_height, color)).unwrap()
            })
            .collect();
        Poster {
            grid,
            cell_width,
            cell_height,
            cells,
        }
    }

    #[test]
    fn test_board_layout_without_gap() {
        let poster = solid_poster(GridType::Three, 4, 2);
        let board = PosterBoard::new(&poster).render().unwrap();

        assert_eq!(board.dimensions(), (12, 6));
        assert_eq!(board.get_pixel(0, 0), &Rgba([0, 0, 0, 255]));
        // 第 1 列第 2 欄 = 第 5 格
        assert_eq!(board.get_pixel(9, 3), &Rgba([50, 0, 0, 255]));
    }

    #[test]
    fn test_board_layout_with_gap() {
        let poster = solid_poster(GridType::Four, 3, 3);
        let board = PosterBoard::new(&poster)
            .with_gap(1)
            .with_background(Rgba([255, 255, 255, 255]))
            .render()
            .unwrap();

        assert_eq!(board.dimensions(), (17, 17));
        assert_eq!(board.get_pixel(0, 0), &Rgba([255, 255, 255, 255]));
        assert_eq!(board.get_pixel(1, 1), &Rgba([0, 0, 0, 255]));
        assert_eq!(board.get_pixel(4, 1), &Rgba([255, 255, 255, 255]));
        assert_eq!(board.get_pixel(5, 1), &Rgba([10, 0, 0, 255]));
    }

    #[test]
    fn test_board_rejects_corrupt_cell() {
        let mut poster = solid_poster(GridType::Three, 2, 2);
        poster.cells[4] = "data:image/png;base64,AQID".to_string();
        assert!(PosterBoard::new(&poster).render().is_err());
    }
}
