// Standard library imports

// Third party imports
use thiserror::Error;
use anyhow::Result;

/// Lỗi validate ứng viên token, bị từ chối trước khi chạy bất kỳ evaluator nào
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationFailure {
    /// Tên token ngoài khoảng 3-30 ký tự
    #[error("Invalid token name length: {0} (expected 3-30 characters)")]
    NameLength(usize),
    /// Symbol không phải 3-5 chữ hoa ASCII
    #[error("Invalid symbol format: {0} (expected 3-5 uppercase letters)")]
    SymbolFormat(String),
    /// Tổng cung ngoài khoảng cho phép
    #[error("Total supply out of range: {0} (expected 1..=1000000000)")]
    SupplyRange(u64),
    /// Thiếu logo
    #[error("Missing logo reference")]
    MissingLogo,
}

/// Lỗi của gate pipeline
#[derive(Debug, Error)]
pub enum GateError {
    /// Ứng viên không hợp lệ
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationFailure),
    /// Ví chưa được xác minh đầy đủ
    #[error("Wallet not verified: {0}")]
    NotVerified(String),
    /// Vượt giới hạn tạo token theo tuần
    #[error("Rate limited: {0}")]
    RateLimited(String),
    /// Điểm rủi ro tổng hợp vượt ngưỡng
    #[error("High risk token rejected: score {0}")]
    HighRisk(f64),
    /// Vượt giới hạn tạo token trọn đời
    #[error("Creation limit exceeded: {current}/{cap}")]
    LimitExceeded { current: u64, cap: u64 },
    /// Aggregator gặp lỗi nội bộ, fail-closed
    #[error("Detection unavailable: {0}")]
    DetectionUnavailable(String),
    /// Lỗi tầng lưu trữ
    #[error("Ledger error: {0}")]
    Ledger(String),
    /// Lỗi khác
    #[error("Other error: {0}")]
    Other(String),
}

/// Kiểu kết quả chung của gate
pub type GateResult<T> = Result<T, GateError>;

impl GateError {
    /// Mã lý do ổn định trả về cho caller
    pub fn reason_code(&self) -> &'static str {
        match self {
            GateError::Validation(_) => "VALIDATION_FAILURE",
            GateError::NotVerified(_) => "NOT_VERIFIED",
            GateError::RateLimited(_) => "RATE_LIMITED",
            GateError::HighRisk(_) => "HIGH_RISK",
            GateError::LimitExceeded { .. } => "LIMIT_EXCEEDED",
            GateError::DetectionUnavailable(_) => "DETECTION_UNAVAILABLE",
            GateError::Ledger(_) => "LEDGER_ERROR",
            GateError::Other(_) => "INTERNAL_ERROR",
        }
    }
}
