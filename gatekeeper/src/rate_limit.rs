// External imports
use ethers::core::types::Address;

// Standard library imports
use std::collections::HashMap;
use std::sync::RwLock;

// Third party imports
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

/// Giới hạn mềm theo cửa sổ trượt: mỗi ví chỉ được tạo một số token
/// trong một cửa sổ thời gian. Độc lập với giới hạn trọn đời của ledger.
/// Orchestrator sở hữu instance này, không có trạng thái toàn cục.
#[derive(Debug)]
pub struct RollingWindowLimiter {
    limit: u64,
    window: Duration,
    store: RwLock<HashMap<Address, Vec<DateTime<Utc>>>>,
}

impl RollingWindowLimiter {
    /// Tạo limiter mới
    pub fn new(limit: u64, window: Duration) -> Self {
        Self {
            limit,
            window,
            store: RwLock::new(HashMap::new()),
        }
    }

    /// Limiter cho cửa sổ 7 ngày
    pub fn weekly(limit: u64) -> Self {
        Self::new(limit, Duration::days(7))
    }

    /// Kiểm tra ví còn trong hạn mức không, đồng thời loại các
    /// timestamp đã rơi ra ngoài cửa sổ
    pub fn check(&self, wallet: Address) -> bool {
        let cutoff = Utc::now() - self.window;

        let mut store = match self.store.try_write() {
            Ok(store) => store,
            Err(_) => {
                warn!("Không thể lấy write lock cho rate limit store");
                // Fallback an toàn khi không lấy được lock
                return true;
            }
        };

        match store.get_mut(&wallet) {
            Some(timestamps) => {
                timestamps.retain(|at| *at >= cutoff);
                (timestamps.len() as u64) < self.limit
            }
            None => true,
        }
    }

    /// Ghi nhận một lần tạo token thành công
    pub fn note_creation(&self, wallet: Address) {
        self.note_creation_at(wallet, Utc::now());
    }

    fn note_creation_at(&self, wallet: Address, at: DateTime<Utc>) {
        let mut store = match self.store.try_write() {
            Ok(store) => store,
            Err(_) => {
                warn!("Không thể lấy write lock cho rate limit store trong note_creation");
                return;
            }
        };
        store.entry(wallet).or_default().push(at);
    }

    /// Loại các entry đã hết hạn toàn bộ cửa sổ
    pub fn cleanup(&self) {
        let cutoff = Utc::now() - self.window;

        let mut store = match self.store.try_write() {
            Ok(store) => store,
            Err(_) => {
                warn!("Không thể lấy write lock cho rate limit store trong cleanup");
                return;
            }
        };

        store.retain(|_, timestamps| {
            timestamps.retain(|at| *at >= cutoff);
            !timestamps.is_empty()
        });

        debug!("Còn {} ví trong rate limit store sau khi dọn dẹp", store.len());
    }
}
