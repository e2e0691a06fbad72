// External imports
use ethers::core::types::Address;

// Standard library imports
use std::collections::HashMap;

// Third party imports
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Internal imports
use crate::error::ValidationFailure;

/// Giới hạn tổng cung tối đa của một token
pub const MAX_TOTAL_SUPPLY: u64 = 1_000_000_000;

/// Ứng viên token do người dùng gửi lên, bất biến sau khi submit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenCandidate {
    /// Tên token (3-30 ký tự)
    pub name: String,
    /// Symbol (3-5 chữ hoa)
    pub symbol: String,
    /// Tổng cung (1..=1e9)
    pub total_supply: u64,
    /// URL logo trên object storage
    pub logo_url: String,
    /// Ví của người tạo
    pub creator_wallet: Address,
}

impl TokenCandidate {
    /// Kiểm tra tính hợp lệ của ứng viên trước khi chạy pipeline
    pub fn validate(&self) -> Result<(), ValidationFailure> {
        let name_len = self.name.chars().count();
        if name_len < 3 || name_len > 30 {
            return Err(ValidationFailure::NameLength(name_len));
        }
        let symbol_len = self.symbol.chars().count();
        if symbol_len < 3
            || symbol_len > 5
            || !self.symbol.chars().all(|c| c.is_ascii_uppercase())
        {
            return Err(ValidationFailure::SymbolFormat(self.symbol.clone()));
        }
        if self.total_supply < 1 || self.total_supply > MAX_TOTAL_SUPPLY {
            return Err(ValidationFailure::SupplyRange(self.total_supply));
        }
        if self.logo_url.trim().is_empty() {
            return Err(ValidationFailure::MissingLogo);
        }
        Ok(())
    }
}

/// Nguồn phát sinh tín hiệu rủi ro
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalSource {
    /// Phát hiện logo giả mạo
    LogoFraud,
    /// Phát hiện spam trong tên
    NameSpam,
    /// Kiểm tra symbol hợp lệ
    SymbolValidity,
}

/// Chính sách thay thế khi provider không phản hồi
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FallbackPolicy {
    /// Giả định rủi ro tối đa khi lỗi
    FailClosed,
    /// Giả định an toàn khi lỗi, chỉ dùng cho các check tư vấn
    FailOpen,
}

/// Tín hiệu rủi ro, tạo mới cho mỗi lần đánh giá, không cache
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskSignal {
    /// Nguồn tín hiệu
    pub source: SignalSource,
    /// Điểm trong [0,1]
    pub score: f64,
    /// Trọng số trong aggregator
    pub weight: f64,
    /// Chính sách fallback của evaluator
    pub fallback_policy: FallbackPolicy,
    /// Đã thay bằng điểm fallback do provider lỗi
    pub degraded: bool,
}

/// Kết quả đánh giá rủi ro tổng hợp cho một ứng viên
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub logo_score: f64,
    pub name_score: f64,
    pub symbol_score: f64,
    /// Điểm tổng hợp trong [0,1]
    pub overall_score: f64,
    /// Vượt ngưỡng rủi ro cao
    pub is_high_risk: bool,
    /// Thời điểm đánh giá
    pub evaluated_at: DateTime<Utc>,
}

/// Nguồn xác minh danh tính, tập đóng
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdentitySource {
    /// Worldcoin proof-of-personhood
    Worldcoin,
    /// Civic identity pass
    Civic,
    /// Lịch sử giao dịch on-chain
    TransactionHistory,
}

impl IdentitySource {
    /// Tất cả các nguồn xác minh
    pub const ALL: [IdentitySource; 3] = [
        IdentitySource::Worldcoin,
        IdentitySource::Civic,
        IdentitySource::TransactionHistory,
    ];

    /// Tên nguồn dùng cho log
    pub fn as_str(&self) -> &'static str {
        match self {
            IdentitySource::Worldcoin => "worldcoin",
            IdentitySource::Civic => "civic",
            IdentitySource::TransactionHistory => "transaction_history",
        }
    }
}

/// Danh tính ví, tính lại mỗi lần xác minh, bản lưu được upsert theo địa chỉ
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletIdentity {
    /// Địa chỉ ví
    pub wallet_address: Address,
    /// Kết quả xác minh theo từng nguồn
    pub per_source_verified: HashMap<IdentitySource, bool>,
    /// Điểm xác minh có trọng số trong [0,1]
    pub verification_score: f64,
    /// Đạt xác minh nghiêm ngặt (AND cả ba nguồn)
    pub is_verified_strict: bool,
    /// Lần xác minh gần nhất
    pub last_verified_at: DateTime<Utc>,
}

/// Bản ghi token đã được chấp nhận, ghi đúng một lần, không sửa đổi
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreationRecord {
    /// ID token
    pub token_id: Uuid,
    /// Ví người tạo
    pub creator_wallet: Address,
    pub name: String,
    pub symbol: String,
    pub total_supply: u64,
    /// Điểm rủi ro tại thời điểm tạo
    pub fraud_score: f64,
    /// Điểm rủi ro dưới ngưỡng nghi vấn
    pub is_verified: bool,
    /// Thời điểm tạo
    pub created_at: DateTime<Utc>,
}

/// Bản ghi audit fraud, append-only, một dòng cho mỗi ứng viên được đánh giá
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FraudLog {
    pub wallet_address: Address,
    pub token_name: String,
    pub similarity_score: f64,
    pub spam_score: f64,
    pub is_suspicious: bool,
    pub created_at: DateTime<Utc>,
}

/// Mức rủi ro tổng hợp của một ví
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

/// Tóm tắt rủi ro của ví dựa trên các fraud log gần nhất
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletRiskSummary {
    /// Số token bị đánh dấu nghi vấn
    pub suspicious_tokens: u32,
    /// Điểm similarity trung bình
    pub average_similarity_score: f64,
    /// Mức rủi ro
    pub risk_level: RiskLevel,
}

/// Quyết định của gate trả về cho caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateDecision {
    /// Cho phép tạo token
    pub allowed: bool,
    /// Mã lý do ổn định
    pub reason_code: String,
    /// Kết quả đánh giá rủi ro nếu đã chạy đến bước đó
    pub assessment: Option<RiskAssessment>,
    /// Bản ghi token nếu được chấp nhận
    pub record: Option<CreationRecord>,
}

impl GateDecision {
    /// Quyết định chấp nhận
    pub fn allowed(assessment: RiskAssessment, record: CreationRecord) -> Self {
        Self {
            allowed: true,
            reason_code: "ALLOWED".to_string(),
            assessment: Some(assessment),
            record: Some(record),
        }
    }

    /// Quyết định từ chối
    pub fn rejected(reason_code: &str, assessment: Option<RiskAssessment>) -> Self {
        Self {
            allowed: false,
            reason_code: reason_code.to_string(),
            assessment,
            record: None,
        }
    }
}
