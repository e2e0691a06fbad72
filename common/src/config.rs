// Standard library imports
use std::time::Duration;

// Third party imports
use serde::{Deserialize, Serialize};

/// Cấu hình gate, được tầng bootstrap bên ngoài validate rồi inject
/// một lần khi khởi động process
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateConfig {
    /// Ngưỡng nghi vấn similarity của logo
    pub similarity_threshold: f64,
    /// Ngưỡng nghi vấn spam của tên token
    pub spam_detection_score: f64,
    /// Giới hạn trọn đời số token mỗi ví, ledger enforce
    pub max_tokens_per_wallet: u64,
    /// Giới hạn mềm theo cửa sổ 7 ngày, gatekeeper enforce
    pub weekly_creation_limit: u64,
    /// Điểm tổng hợp từ ngưỡng này trở lên bị đánh dấu nghi vấn
    pub suspicion_threshold: f64,
    /// Điểm tổng hợp từ ngưỡng này trở lên bị từ chối
    pub high_risk_threshold: f64,
    /// Timeout cho mỗi remote call
    pub provider_timeout: Duration,
    /// Số giao dịch tối thiểu để cộng điểm xác minh
    pub min_transaction_count: u64,
    /// Tuổi ví tối thiểu (ngày) để cộng điểm xác minh
    pub min_wallet_age_days: i64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.8,
            spam_detection_score: 0.7,
            max_tokens_per_wallet: 5,
            weekly_creation_limit: 3,
            suspicion_threshold: 0.3,
            high_risk_threshold: 0.5,
            provider_timeout: Duration::from_secs(5),
            min_transaction_count: 10,
            min_wallet_age_days: 180,
        }
    }
}
