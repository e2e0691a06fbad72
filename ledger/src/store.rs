// External imports
use ethers::core::types::Address;

// Standard library imports
use std::collections::HashMap;
use std::sync::Arc;

// Third party imports
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{info, warn};

// Internal imports
use crate::error::{LedgerError, LedgerResult};
use mintguard_common::config::GateConfig;
use mintguard_common::types::{
    CreationRecord, FraudLog, RiskAssessment, RiskLevel, TokenCandidate, WalletIdentity,
    WalletRiskSummary,
};
use mintguard_common::utils::new_token_id;

/// Số fraud log gần nhất dùng để tóm tắt rủi ro của một ví
const RISK_SUMMARY_WINDOW: usize = 10;

/// Ledger ghi nhận token đã tạo và fraud log, enforce giới hạn trọn đời
/// tại thời điểm ghi. Đây là tài nguyên chia sẻ duy nhất của pipeline.
#[async_trait]
pub trait CreationLedger: Send + Sync + 'static {
    /// Ghi nhận token mới trong một giao dịch: đếm, kiểm tra giới hạn,
    /// ghi CreationRecord và FraudLog. Thất bại thì không ghi gì.
    async fn record_token_creation(
        &self,
        candidate: &TokenCandidate,
        assessment: &RiskAssessment,
    ) -> LedgerResult<CreationRecord>;

    /// Số token ví đã tạo trọn đời
    async fn creation_count(&self, creator: Address) -> LedgerResult<u64>;

    /// Số token ví đã tạo từ thời điểm cho trước
    async fn creations_since(
        &self,
        creator: Address,
        since: DateTime<Utc>,
    ) -> LedgerResult<u64>;

    /// Ghi một fraud log độc lập (ứng viên bị từ chối vì rủi ro cao)
    async fn append_fraud_log(&self, log: FraudLog) -> LedgerResult<()>;

    /// Upsert danh tính ví theo địa chỉ
    async fn upsert_wallet(&self, identity: WalletIdentity) -> LedgerResult<()>;

    /// Lấy danh tính ví đã lưu
    async fn get_wallet(&self, address: Address) -> LedgerResult<Option<WalletIdentity>>;

    /// Các fraud log gần nhất của một ví, mới nhất trước
    async fn fraud_logs(&self, address: Address, limit: usize) -> LedgerResult<Vec<FraudLog>>;

    /// Tóm tắt rủi ro của ví từ các fraud log gần nhất
    async fn wallet_risk_summary(&self, address: Address) -> LedgerResult<WalletRiskSummary>;
}

/// Trạng thái trong bộ nhớ của ledger
#[derive(Debug, Default)]
struct LedgerState {
    records: Vec<CreationRecord>,
    fraud_logs: Vec<FraudLog>,
    wallets: HashMap<Address, WalletIdentity>,
}

/// Ledger trong bộ nhớ. Toàn bộ trạng thái nằm sau một mutex duy nhất
/// nên chuỗi đếm-kiểm-ghi của record_token_creation là một vùng nguyên
/// tử: hai request cùng ví ở count = cap-1 thì đúng một request thắng.
/// Một backend quan hệ sẽ cài cùng trait này bằng giao dịch serializable.
#[derive(Debug, Clone)]
pub struct MemoryLedger {
    inner: Arc<Mutex<LedgerState>>,
    config: GateConfig,
}

impl MemoryLedger {
    /// Tạo ledger mới
    pub fn new(config: GateConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(LedgerState::default())),
            config,
        }
    }
}

#[async_trait]
impl CreationLedger for MemoryLedger {
    async fn record_token_creation(
        &self,
        candidate: &TokenCandidate,
        assessment: &RiskAssessment,
    ) -> LedgerResult<CreationRecord> {
        // Giao dịch: đếm và ghi dưới cùng một guard
        let mut state = self.inner.lock().await;

        let current = state
            .records
            .iter()
            .filter(|record| record.creator_wallet == candidate.creator_wallet)
            .count() as u64;

        if current >= self.config.max_tokens_per_wallet {
            warn!(
                wallet = ?candidate.creator_wallet,
                current,
                cap = self.config.max_tokens_per_wallet,
                "Từ chối ghi: ví đã chạm giới hạn trọn đời"
            );
            return Err(LedgerError::LimitExceeded {
                current,
                cap: self.config.max_tokens_per_wallet,
            });
        }

        let now = Utc::now();
        let record = CreationRecord {
            token_id: new_token_id(),
            creator_wallet: candidate.creator_wallet,
            name: candidate.name.clone(),
            symbol: candidate.symbol.clone(),
            total_supply: candidate.total_supply,
            fraud_score: assessment.overall_score,
            is_verified: assessment.overall_score < self.config.suspicion_threshold,
            created_at: now,
        };
        state.records.push(record.clone());

        state.fraud_logs.push(FraudLog {
            wallet_address: candidate.creator_wallet,
            token_name: candidate.name.clone(),
            similarity_score: assessment.logo_score,
            spam_score: assessment.name_score,
            is_suspicious: assessment.overall_score >= self.config.suspicion_threshold,
            created_at: now,
        });

        info!(
            wallet = ?candidate.creator_wallet,
            token_id = %record.token_id,
            fraud_score = record.fraud_score,
            "Đã ghi nhận token mới"
        );

        Ok(record)
    }

    async fn creation_count(&self, creator: Address) -> LedgerResult<u64> {
        let state = self.inner.lock().await;
        Ok(state
            .records
            .iter()
            .filter(|record| record.creator_wallet == creator)
            .count() as u64)
    }

    async fn creations_since(
        &self,
        creator: Address,
        since: DateTime<Utc>,
    ) -> LedgerResult<u64> {
        let state = self.inner.lock().await;
        Ok(state
            .records
            .iter()
            .filter(|record| record.creator_wallet == creator && record.created_at >= since)
            .count() as u64)
    }

    async fn append_fraud_log(&self, log: FraudLog) -> LedgerResult<()> {
        let mut state = self.inner.lock().await;
        state.fraud_logs.push(log);
        Ok(())
    }

    async fn upsert_wallet(&self, identity: WalletIdentity) -> LedgerResult<()> {
        let mut state = self.inner.lock().await;
        state.wallets.insert(identity.wallet_address, identity);
        Ok(())
    }

    async fn get_wallet(&self, address: Address) -> LedgerResult<Option<WalletIdentity>> {
        let state = self.inner.lock().await;
        Ok(state.wallets.get(&address).cloned())
    }

    async fn fraud_logs(&self, address: Address, limit: usize) -> LedgerResult<Vec<FraudLog>> {
        let state = self.inner.lock().await;
        Ok(state
            .fraud_logs
            .iter()
            .rev()
            .filter(|log| log.wallet_address == address)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn wallet_risk_summary(&self, address: Address) -> LedgerResult<WalletRiskSummary> {
        let logs = self.fraud_logs(address, RISK_SUMMARY_WINDOW).await?;

        let suspicious_count = logs.iter().filter(|log| log.is_suspicious).count() as u32;
        let average_similarity_score = if logs.is_empty() {
            0.0
        } else {
            logs.iter().map(|log| log.similarity_score).sum::<f64>() / logs.len() as f64
        };

        let risk_level = if suspicious_count > 3 {
            RiskLevel::High
        } else if suspicious_count > 1 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        };

        Ok(WalletRiskSummary {
            suspicious_tokens: suspicious_count,
            average_similarity_score,
            risk_level,
        })
    }
}
