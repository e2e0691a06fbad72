// Third party imports
use thiserror::Error;

/// Lỗi của tầng ledger
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Vượt giới hạn tạo token trọn đời của ví
    #[error("Maximum token creation limit reached: {current}/{cap}")]
    LimitExceeded { current: u64, cap: u64 },
    /// Không tìm thấy ví
    #[error("Wallet not found: {0}")]
    WalletNotFound(String),
    /// Lỗi lưu trữ
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Kiểu kết quả của ledger
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Module tests
#[cfg(test)]
mod tests {
    use super::*;

    /// Test LedgerError display
    #[test]
    fn test_ledger_error() {
        let error = LedgerError::LimitExceeded { current: 5, cap: 5 };
        assert_eq!(
            error.to_string(),
            "Maximum token creation limit reached: 5/5"
        );
    }
}
