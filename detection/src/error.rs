// Third party imports
use thiserror::Error;

/// Lỗi tầng detection. Không bao giờ vượt qua ranh giới evaluator:
/// mỗi evaluator tự xử lý bằng điểm fallback của nó.
#[derive(Debug, Error)]
pub enum DetectionError {
    /// Provider không phản hồi hoặc trả lỗi transport
    #[error("Lỗi provider không phản hồi ({provider}): {reason}")]
    ProviderUnavailable { provider: String, reason: String },

    /// Quá thời gian chờ provider
    #[error("Lỗi timeout khi gọi provider ({provider})")]
    Timeout { provider: String },

    /// Phản hồi không đúng định dạng mong đợi
    #[error("Lỗi phản hồi không hợp lệ từ provider ({provider}): {reason}")]
    InvalidResponse { provider: String, reason: String },
}

/// Kiểu kết quả của tầng detection
pub type DetectionResult<T> = Result<T, DetectionError>;

// Phân loại lỗi reqwest về taxonomy của detection
pub fn classify_transport_error(provider: &str, error: reqwest::Error) -> DetectionError {
    if error.is_timeout() {
        DetectionError::Timeout {
            provider: provider.to_string(),
        }
    } else if error.is_decode() {
        DetectionError::InvalidResponse {
            provider: provider.to_string(),
            reason: error.to_string(),
        }
    } else {
        DetectionError::ProviderUnavailable {
            provider: provider.to_string(),
            reason: error.to_string(),
        }
    }
}
