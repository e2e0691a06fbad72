// External imports
use ethers::core::types::Address;

// Standard library imports
use std::sync::Arc;

// Third party imports
use chrono::{Duration, Utc};
use tracing::{error, info, warn};

// Internal imports
use crate::rate_limit::RollingWindowLimiter;
use mintguard_common::config::GateConfig;
use mintguard_common::error::{GateError, GateResult};
use mintguard_common::types::{FraudLog, GateDecision, TokenCandidate, WalletIdentity, WalletRiskSummary};
use mintguard_detection::risk::RiskAggregator;
use mintguard_detection::verification::VerificationAggregator;
use mintguard_ledger::error::LedgerError;
use mintguard_ledger::store::CreationLedger;

/// Orchestrator của pipeline tạo token. Sở hữu các service được inject
/// một lần khi khởi động: xác minh ví, đánh giá rủi ro, ledger và
/// limiter theo tuần. Mỗi bước từ chối thì các bước sau không chạy.
pub struct TokenGate {
    verification: Arc<VerificationAggregator>,
    risk: Arc<RiskAggregator>,
    ledger: Arc<dyn CreationLedger>,
    limiter: RollingWindowLimiter,
    config: GateConfig,
}

impl TokenGate {
    /// Tạo gate mới
    pub fn new(
        verification: Arc<VerificationAggregator>,
        risk: Arc<RiskAggregator>,
        ledger: Arc<dyn CreationLedger>,
        config: GateConfig,
    ) -> Self {
        let limiter = RollingWindowLimiter::weekly(config.weekly_creation_limit);
        Self {
            verification,
            risk,
            ledger,
            limiter,
            config,
        }
    }

    /// Xử lý một ứng viên token, trả về quyết định có cấu trúc.
    /// Trình tự: validate, xác minh nghiêm ngặt, hạn mức tuần,
    /// đánh giá rủi ro, ghi ledger.
    pub async fn process(&self, candidate: &TokenCandidate) -> GateDecision {
        // (0) Validate trước khi chạy bất kỳ evaluator nào
        if let Err(failure) = candidate.validate() {
            info!(token_name = %candidate.name, error = %failure, "Từ chối ứng viên không hợp lệ");
            return GateDecision::rejected(
                GateError::Validation(failure).reason_code(),
                None,
            );
        }
        let creator = candidate.creator_wallet;

        // (a) Xác minh ví nghiêm ngặt
        let identity = self.verification.verify_wallet(creator).await;
        // Bản lưu được cập nhật mỗi lần xác minh; lỗi upsert không chặn request
        if let Err(e) = self.ledger.upsert_wallet(identity.clone()).await {
            warn!(wallet = ?creator, error = %e, "Không upsert được danh tính ví");
        }
        if !identity.is_verified_strict {
            info!(wallet = ?creator, "Từ chối: ví chưa đạt xác minh nghiêm ngặt");
            return GateDecision::rejected(
                GateError::NotVerified(format!("{:?}", creator)).reason_code(),
                None,
            );
        }

        // (b) Hạn mức tuần, độc lập với giới hạn trọn đời của ledger
        if let Err(e) = self.check_weekly_quota(creator).await {
            info!(wallet = ?creator, error = %e, "Từ chối: vượt hạn mức tuần");
            return GateDecision::rejected(e.reason_code(), None);
        }

        // (c) Đánh giá rủi ro
        let assessment = match self.assess_guarded(candidate).await {
            Ok(assessment) => assessment,
            Err(e) => {
                error!(token_name = %candidate.name, error = %e, "Aggregator lỗi nội bộ, fail-closed");
                return GateDecision::rejected(e.reason_code(), None);
            }
        };
        if assessment.is_high_risk {
            // Ứng viên bị từ chối vì rủi ro vẫn để lại dấu vết audit
            let log = FraudLog {
                wallet_address: creator,
                token_name: candidate.name.clone(),
                similarity_score: assessment.logo_score,
                spam_score: assessment.name_score,
                is_suspicious: true,
                created_at: Utc::now(),
            };
            if let Err(e) = self.ledger.append_fraud_log(log).await {
                warn!(wallet = ?creator, error = %e, "Không ghi được fraud log");
            }
            info!(
                wallet = ?creator,
                overall_score = assessment.overall_score,
                "Từ chối: rủi ro cao"
            );
            return GateDecision::rejected(
                GateError::HighRisk(assessment.overall_score).reason_code(),
                Some(assessment),
            );
        }

        // (d) Ghi ledger, giới hạn trọn đời enforce trong giao dịch
        match self.ledger.record_token_creation(candidate, &assessment).await {
            Ok(record) => {
                self.limiter.note_creation(creator);
                info!(
                    wallet = ?creator,
                    token_id = %record.token_id,
                    "Chấp nhận tạo token"
                );
                GateDecision::allowed(assessment, record)
            }
            Err(LedgerError::LimitExceeded { current, cap }) => {
                info!(wallet = ?creator, current, cap, "Từ chối: vượt giới hạn trọn đời");
                GateDecision::rejected(
                    GateError::LimitExceeded { current, cap }.reason_code(),
                    Some(assessment),
                )
            }
            Err(e) => {
                error!(wallet = ?creator, error = %e, "Lỗi ledger khi ghi token");
                GateDecision::rejected(
                    GateError::Ledger(e.to_string()).reason_code(),
                    Some(assessment),
                )
            }
        }
    }

    /// Đường đăng ký ví: tính lại danh tính với điểm cộng dồn và
    /// upsert bản lưu. Không dùng policy nghiêm ngặt.
    pub async fn register_wallet(&self, address: Address) -> GateResult<WalletIdentity> {
        let identity = self.verification.verify_wallet(address).await;
        self.ledger
            .upsert_wallet(identity.clone())
            .await
            .map_err(|e| GateError::Ledger(e.to_string()))?;
        Ok(identity)
    }

    /// Tóm tắt rủi ro của ví cho đường audit
    pub async fn wallet_risk(&self, address: Address) -> GateResult<WalletRiskSummary> {
        self.ledger
            .wallet_risk_summary(address)
            .await
            .map_err(|e| GateError::Ledger(e.to_string()))
    }

    // Hạn mức tuần: kiểm tra cả cửa sổ trong bộ nhớ lẫn số bản ghi
    // trong ledger, để restart process không reset hạn mức
    async fn check_weekly_quota(&self, creator: Address) -> GateResult<()> {
        if !self.limiter.check(creator) {
            return Err(GateError::RateLimited(format!(
                "max {} per week",
                self.config.weekly_creation_limit
            )));
        }

        let week_ago = Utc::now() - Duration::days(7);
        let recent = self
            .ledger
            .creations_since(creator, week_ago)
            .await
            .map_err(|e| GateError::Ledger(e.to_string()))?;
        if recent >= self.config.weekly_creation_limit {
            return Err(GateError::RateLimited(format!(
                "max {} per week",
                self.config.weekly_creation_limit
            )));
        }
        Ok(())
    }

    // Chạy đánh giá trong task riêng: panic bất ngờ trong aggregator
    // trở thành từ chối "detection unavailable" thay vì sập request
    async fn assess_guarded(
        &self,
        candidate: &TokenCandidate,
    ) -> GateResult<mintguard_common::types::RiskAssessment> {
        let risk = Arc::clone(&self.risk);
        let candidate = candidate.clone();
        tokio::spawn(async move { risk.assess(&candidate).await })
            .await
            .map_err(|e| GateError::DetectionUnavailable(e.to_string()))
    }
}
