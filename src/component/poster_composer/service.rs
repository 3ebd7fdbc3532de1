//! 海報服務
//!
//! 同一個 (來源, 網格, 長度) 同時只會有一個合成在進行，其他請求等待並共用結果；
//! 不同來源的合成數量受 `max_concurrent` 限制，被放棄但仍在執行的解碼也計入。

use super::main::{Poster, PosterComposer};
use super::sampling::{GridType, PosterRequest};
use crate::error::{PosterError, PosterResult};
use log::{debug, warn};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

const WAIT_SLICE: Duration = Duration::from_millis(50);

pub const DEFAULT_MAX_CONCURRENT: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PosterKey {
    source: PathBuf,
    grid: GridType,
    duration_bits: u64,
}

impl From<&PosterRequest> for PosterKey {
    fn from(request: &PosterRequest) -> Self {
        Self {
            source: request.source_path.clone(),
            grid: request.grid,
            duration_bits: request.duration.to_bits(),
        }
    }
}

type SharedOutcome = PosterResult<Arc<Poster>>;

#[derive(Default)]
enum Slot {
    #[default]
    Pending,
    Ready(SharedOutcome),
    /// 領頭請求被取消，等待中的請求需自行重試
    Abandoned,
}

#[derive(Default)]
struct InFlight {
    slot: Mutex<Slot>,
    ready: Condvar,
}

impl InFlight {
    fn publish(&self, slot: Slot) {
        *lock(&self.slot) = slot;
        self.ready.notify_all();
    }

    /// 回傳 `None` 表示領頭請求已放棄
    fn wait(&self, cancel_signal: &AtomicBool) -> Option<SharedOutcome> {
        let mut slot = lock(&self.slot);
        loop {
            match &*slot {
                Slot::Ready(result) => return Some(result.clone()),
                Slot::Abandoned => return None,
                Slot::Pending => {}
            }
            if cancel_signal.load(Ordering::SeqCst) {
                return Some(Err(PosterError::Cancelled));
            }
            slot = self
                .ready
                .wait_timeout(slot, WAIT_SLICE)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }
}

/// 領頭請求的收尾：移除進行中紀錄並發布結果
///
/// 合成途中 panic 時由 `Drop` 發布錯誤，避免等待中的請求永遠不會結束。
struct LeaderGuard<'a> {
    in_flight: &'a Mutex<HashMap<PosterKey, Arc<InFlight>>>,
    key: PosterKey,
    entry: Arc<InFlight>,
    finished: bool,
}

impl LeaderGuard<'_> {
    fn finish(mut self, slot: Slot) {
        self.release(slot);
    }

    fn release(&mut self, slot: Slot) {
        self.finished = true;
        lock(self.in_flight).remove(&self.key);
        self.entry.publish(slot);
    }
}

impl Drop for LeaderGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            warn!("海報合成異常中止: {}", self.key.source.display());
            self.release(Slot::Ready(Err(PosterError::request("海報合成異常中止"))));
        }
    }
}

enum Role<'a> {
    Leader(LeaderGuard<'a>),
    Follower(Arc<InFlight>),
}

/// 計數閘門，限制同時進行的合成數量
struct ConcurrencyGate {
    active: Mutex<usize>,
    released: Condvar,
    limit: usize,
}

/// 閘門名額，最後一個持有者釋放時歸還
struct GatePermit {
    gate: Arc<ConcurrencyGate>,
}

impl ConcurrencyGate {
    fn new(limit: usize) -> Self {
        Self {
            active: Mutex::new(0),
            released: Condvar::new(),
            limit: limit.max(1),
        }
    }

    fn acquire(gate: &Arc<Self>, cancel_signal: &AtomicBool) -> PosterResult<GatePermit> {
        let mut active = lock(&gate.active);
        while *active >= gate.limit {
            if cancel_signal.load(Ordering::SeqCst) {
                return Err(PosterError::Cancelled);
            }
            active = gate
                .released
                .wait_timeout(active, WAIT_SLICE)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        *active += 1;
        Ok(GatePermit {
            gate: Arc::clone(gate),
        })
    }
}

impl Drop for GatePermit {
    fn drop(&mut self) {
        *lock(&self.gate.active) -= 1;
        self.gate.released.notify_one();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct PosterService {
    composer: PosterComposer,
    in_flight: Mutex<HashMap<PosterKey, Arc<InFlight>>>,
    gate: Arc<ConcurrencyGate>,
}

impl PosterService {
    pub fn new(composer: PosterComposer, max_concurrent: usize) -> Self {
        Self {
            composer,
            in_flight: Mutex::new(HashMap::new()),
            gate: Arc::new(ConcurrencyGate::new(max_concurrent)),
        }
    }

    /// 取得海報；相同請求正在進行時直接等待其結果
    ///
    /// 等待中的領頭請求若被取消，本請求會重新排入，不受對方取消影響。
    pub fn get_poster(&self, request: &PosterRequest, cancel_signal: &AtomicBool) -> SharedOutcome {
        let key = PosterKey::from(request);

        loop {
            if cancel_signal.load(Ordering::SeqCst) {
                return Err(PosterError::Cancelled);
            }

            match self.join(&key) {
                Role::Leader(guard) => return self.lead(request, cancel_signal, guard),
                Role::Follower(entry) => {
                    debug!("合併相同的海報請求: {}", request.source_path.display());
                    if let Some(outcome) = entry.wait(cancel_signal) {
                        return outcome;
                    }
                    debug!("先前的請求已取消，重新請求: {}", request.source_path.display());
                }
            }
        }
    }

    fn join(&self, key: &PosterKey) -> Role<'_> {
        let mut in_flight = lock(&self.in_flight);
        if let Some(entry) = in_flight.get(key) {
            return Role::Follower(Arc::clone(entry));
        }

        let entry = Arc::new(InFlight::default());
        in_flight.insert(key.clone(), Arc::clone(&entry));
        Role::Leader(LeaderGuard {
            in_flight: &self.in_flight,
            key: key.clone(),
            entry,
            finished: false,
        })
    }

    fn lead(
        &self,
        request: &PosterRequest,
        cancel_signal: &AtomicBool,
        guard: LeaderGuard<'_>,
    ) -> SharedOutcome {
        let outcome = ConcurrencyGate::acquire(&self.gate, cancel_signal)
            .and_then(|permit| {
                // 名額由本執行緒與解碼執行緒共同持有，兩者都結束才歸還
                let permit = Arc::new(permit);
                self.composer
                    .compose_holding(request, cancel_signal, Arc::clone(&permit))
            })
            .map(Arc::new);

        let slot = match &outcome {
            Err(PosterError::Cancelled) => Slot::Abandoned,
            _ => Slot::Ready(outcome.clone()),
        };
        guard.finish(slot);
        outcome
    }

    #[cfg(test)]
    fn in_flight_count(&self) -> usize {
        lock(&self.in_flight).len()
    }
}
