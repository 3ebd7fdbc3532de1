//! 非同步載入縮圖拼接圖
//!
//! 解碼在獨立執行緒進行，呼叫端以有限時間等待結果，並在等待期間檢查取消信號。
//! 逾時後解碼執行緒不會被中止，但其結果會被丟棄。

use super::sprite_sheet::RasterDecoder;
use crate::error::{PosterError, PosterResult};
use image::DynamicImage;
use log::{debug, warn};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

/// 預設解碼等待上限
pub const DEFAULT_DECODE_TIMEOUT: Duration = Duration::from_secs(10);

/// 檢查取消信號的間隔
const POLL_INTERVAL: Duration = Duration::from_millis(50);

pub fn load_sprite_sheet(
    decoder: Arc<dyn RasterDecoder>,
    path: &Path,
    timeout: Duration,
    cancel_signal: &AtomicBool,
) -> PosterResult<DynamicImage> {
    load_sprite_sheet_holding(decoder, path, timeout, cancel_signal, ())
}

/// 同 [`load_sprite_sheet`]，`hold` 由解碼執行緒持有到解碼實際結束為止
///
/// 呼叫端逾時或取消後仍不會提早釋放，可用來讓並行上限涵蓋被放棄的解碼。
pub fn load_sprite_sheet_holding<H: Send + 'static>(
    decoder: Arc<dyn RasterDecoder>,
    path: &Path,
    timeout: Duration,
    cancel_signal: &AtomicBool,
    hold: H,
) -> PosterResult<DynamicImage> {
    let (tx, rx) = mpsc::channel();
    let owned_path = path.to_path_buf();

    thread::Builder::new()
        .name("sprite-decode".to_string())
        .spawn(move || {
            let result = decoder.decode(&owned_path);
            drop(hold);
            // 接收端可能已因逾時或取消而離開
            let _ = tx.send(result);
        })
        .map_err(|e| PosterError::decode_failure(format!("無法啟動解碼執行緒: {e}")))?;

    let deadline = Instant::now() + timeout;
    loop {
        if cancel_signal.load(Ordering::SeqCst) {
            warn!("收到取消信號，放棄解碼: {}", path.display());
            return Err(PosterError::Cancelled);
        }

        let now = Instant::now();
        if now >= deadline {
            warn!("縮圖解碼逾時 ({timeout:?}): {}", path.display());
            return Err(PosterError::DecodeTimeout(timeout));
        }

        match rx.recv_timeout((deadline - now).min(POLL_INTERVAL)) {
            Ok(Ok(image)) => {
                debug!(
                    "縮圖已解碼 {}x{}: {}",
                    image.width(),
                    image.height(),
                    path.display()
                );
                return Ok(image);
            }
            Ok(Err(e)) => return Err(PosterError::decode_failure(format!("{e:#}"))),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                return Err(PosterError::decode_failure("解碼執行緒意外結束"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, bail};

    struct FixedDecoder {
        delay: Duration,
        fail: bool,
    }

    impl RasterDecoder for FixedDecoder {
        fn decode(&self, _path: &Path) -> Result<DynamicImage> {
            thread::sleep(self.delay);
            if self.fail {
                bail!("corrupt data");
            }
            Ok(DynamicImage::new_rgba8(2, 2))
        }
    }

    struct PanickingDecoder;

    impl RasterDecoder for PanickingDecoder {
        fn decode(&self, _path: &Path) -> Result<DynamicImage> {
            panic!("decoder crashed");
        }
    }

    fn decoder(delay_ms: u64, fail: bool) -> Arc<dyn RasterDecoder> {
        Arc::new(FixedDecoder {
            delay: Duration::from_millis(delay_ms),
            fail,
        })
    }

    #[test]
    fn test_load_success() {
        let cancel = AtomicBool::new(false);
        let image =
            load_sprite_sheet(decoder(0, false), Path::new("a.png"), Duration::from_secs(2), &cancel)
                .unwrap();
        assert_eq!(image.width(), 2);
    }

    #[test]
    fn test_load_failure_is_reported() {
        let cancel = AtomicBool::new(false);
        let err =
            load_sprite_sheet(decoder(0, true), Path::new("a.png"), Duration::from_secs(2), &cancel)
                .unwrap_err();
        assert!(matches!(err, PosterError::DecodeFailure(msg) if msg.contains("corrupt")));
    }

    #[test]
    fn test_load_times_out() {
        let cancel = AtomicBool::new(false);
        let timeout = Duration::from_millis(60);
        let started = Instant::now();
        let err = load_sprite_sheet(decoder(1_000, false), Path::new("a.png"), timeout, &cancel)
            .unwrap_err();
        assert_eq!(err, PosterError::DecodeTimeout(timeout));
        assert!(started.elapsed() < Duration::from_millis(900));
    }

    #[test]
    fn test_load_honors_cancel() {
        let cancel = AtomicBool::new(true);
        let err =
            load_sprite_sheet(decoder(1_000, false), Path::new("a.png"), Duration::from_secs(5), &cancel)
                .unwrap_err();
        assert_eq!(err, PosterError::Cancelled);
    }

    #[test]
    fn test_abandoned_decode_keeps_hold_until_finished() {
        let cancel = AtomicBool::new(false);
        let hold = Arc::new(());
        let err = load_sprite_sheet_holding(
            decoder(400, false),
            Path::new("a.png"),
            Duration::from_millis(50),
            &cancel,
            Arc::clone(&hold),
        )
        .unwrap_err();

        assert!(matches!(err, PosterError::DecodeTimeout(_)));
        assert_eq!(Arc::strong_count(&hold), 2);

        let deadline = Instant::now() + Duration::from_secs(3);
        while Arc::strong_count(&hold) > 1 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(20));
        }
        assert_eq!(Arc::strong_count(&hold), 1);
    }

    #[test]
    fn test_decoder_panic_becomes_failure() {
        let cancel = AtomicBool::new(false);
        let err = load_sprite_sheet(
            Arc::new(PanickingDecoder),
            Path::new("a.png"),
            Duration::from_secs(2),
            &cancel,
        )
        .unwrap_err();
        assert!(matches!(err, PosterError::DecodeFailure(_)));
    }
}
