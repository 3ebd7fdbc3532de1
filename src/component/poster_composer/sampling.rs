use crate::error::{PosterError, PosterResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// 海報網格類型（只支援 3x3 與 4x4）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum GridType {
    #[default]
    Three,
    Four,
}

impl GridType {
    /// 每列（每欄）的格子數
    #[must_use]
    pub const fn size(self) -> u32 {
        match self {
            Self::Three => 3,
            Self::Four => 4,
        }
    }

    #[must_use]
    pub const fn cell_count(self) -> usize {
        (self.size() * self.size()) as usize
    }

    /// 固定的格子寬度，與影片解析度無關
    #[must_use]
    pub const fn cell_width(self) -> u32 {
        match self {
            Self::Three => 380,
            Self::Four => 288,
        }
    }

    /// 縮圖拼接圖的列數，比網格多一列
    #[must_use]
    pub const fn sheet_rows(self) -> u32 {
        self.size() + 1
    }
}

impl TryFrom<u32> for GridType {
    type Error = PosterError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            3 => Ok(Self::Three),
            4 => Ok(Self::Four),
            other => Err(PosterError::InvalidGridType(other)),
        }
    }
}

impl From<GridType> for u32 {
    fn from(grid: GridType) -> Self {
        grid.size()
    }
}

impl fmt::Display for GridType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{0}x{0}", self.size())
    }
}

/// 取樣計畫：由影片長度與網格類型推導
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingPlan {
    /// 取樣間隔（秒）
    pub interval: u64,
    pub cell_width: u32,
}

impl SamplingPlan {
    /// `interval = ceil(duration / (n^2 + 1))`
    ///
    /// 多保留一個取樣位置，最後一格不會剛好落在檔案結尾
    pub fn new(duration: f64, grid: GridType) -> PosterResult<Self> {
        validate_duration(duration)?;
        let slots = f64::from(grid.size() * grid.size() + 1);
        Ok(Self {
            interval: (duration / slots).ceil() as u64,
            cell_width: grid.cell_width(),
        })
    }
}

fn validate_duration(duration: f64) -> PosterResult<()> {
    if duration.is_finite() && duration > 0.0 {
        Ok(())
    } else {
        Err(PosterError::InvalidDuration(duration))
    }
}

/// 海報請求
#[derive(Debug, Clone, PartialEq)]
pub struct PosterRequest {
    pub source_path: PathBuf,
    pub duration: f64,
    pub grid: GridType,
}

impl PosterRequest {
    pub fn new(source_path: impl AsRef<Path>, duration: f64, grid: u32) -> PosterResult<Self> {
        let grid = GridType::try_from(grid)?;
        validate_duration(duration)?;
        Ok(Self {
            source_path: source_path.as_ref().to_path_buf(),
            duration,
            grid,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_rounds_up() {
        assert_eq!(SamplingPlan::new(119.0, GridType::Three).unwrap().interval, 12);
        assert_eq!(SamplingPlan::new(119.0, GridType::Four).unwrap().interval, 7);
        assert_eq!(SamplingPlan::new(100.0, GridType::Three).unwrap().interval, 10);
    }

    #[test]
    fn test_short_video_interval_is_at_least_one() {
        assert_eq!(SamplingPlan::new(0.5, GridType::Four).unwrap().interval, 1);
    }

    #[test]
    fn test_cell_width_is_fixed_per_grid() {
        assert_eq!(SamplingPlan::new(100.0, GridType::Three).unwrap().cell_width, 380);
        assert_eq!(SamplingPlan::new(100.0, GridType::Four).unwrap().cell_width, 288);
    }

    #[test]
    fn test_invalid_duration() {
        for duration in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                SamplingPlan::new(duration, GridType::Three),
                Err(PosterError::InvalidDuration(_))
            ));
        }
    }

    #[test]
    fn test_grid_type_conversion() {
        assert_eq!(GridType::try_from(3).unwrap(), GridType::Three);
        assert_eq!(GridType::try_from(4).unwrap(), GridType::Four);
        assert_eq!(GridType::try_from(5), Err(PosterError::InvalidGridType(5)));
        assert_eq!(GridType::Four.cell_count(), 16);
        assert_eq!(GridType::Three.sheet_rows(), 4);
        assert_eq!(GridType::Four.to_string(), "4x4");
    }

    #[test]
    fn test_grid_type_serde() {
        assert_eq!(serde_json::to_string(&GridType::Four).unwrap(), "4");
        let grid: GridType = serde_json::from_str("3").unwrap();
        assert_eq!(grid, GridType::Three);
        assert!(serde_json::from_str::<GridType>("2").is_err());
    }

    #[test]
    fn test_poster_request_validation() {
        let request = PosterRequest::new("/videos/a.mp4", 100.0, 3).unwrap();
        assert_eq!(request.grid, GridType::Three);
        assert!(PosterRequest::new("/videos/a.mp4", 100.0, 2).is_err());
        assert!(PosterRequest::new("/videos/a.mp4", 0.0, 3).is_err());
    }
}
