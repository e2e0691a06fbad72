// Standard library imports

// Third party imports
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Kẹp giá trị vào khoảng [0,1]
pub fn clamp01(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

/// Kiểm tra điểm có nằm trong [0,1] không
pub fn is_unit_interval(value: f64) -> bool {
    value.is_finite() && (0.0..=1.0).contains(&value)
}

/// Tạo ID token mới
pub fn new_token_id() -> Uuid {
    Uuid::new_v4()
}

/// Tuổi của ví theo ngày tính từ lần thấy đầu tiên
pub fn wallet_age_days(first_seen_at: DateTime<Utc>) -> i64 {
    (Utc::now() - first_seen_at).num_days()
}
