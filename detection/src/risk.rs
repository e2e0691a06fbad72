// Third party imports
use chrono::Utc;
use tracing::info;

// Internal imports
use crate::evaluators::{LogoFraudEvaluator, NameSpamEvaluator, SymbolValidityEvaluator};
use mintguard_common::config::GateConfig;
use mintguard_common::types::{RiskAssessment, TokenCandidate};
use mintguard_common::utils::clamp01;

/// Kết hợp ba điểm thành phần thành điểm tổng hợp.
/// Symbol là điểm validity (cao hơn = tốt hơn) nhưng vẫn được cộng
/// thẳng vào tổng rủi ro theo đúng hành vi quan sát được của hệ thống.
fn combine_scores(logo: f64, name: f64, symbol: f64) -> f64 {
    clamp01(logo * 0.4 + name * 0.4 + symbol * 0.2)
}

/// Aggregator rủi ro: chạy ba evaluator song song rồi tính điểm tổng hợp.
/// Một lượt duy nhất cho mỗi ứng viên, không retry.
pub struct RiskAggregator {
    logo: LogoFraudEvaluator,
    name: NameSpamEvaluator,
    symbol: SymbolValidityEvaluator,
    config: GateConfig,
}

impl RiskAggregator {
    /// Tạo aggregator mới
    pub fn new(
        logo: LogoFraudEvaluator,
        name: NameSpamEvaluator,
        symbol: SymbolValidityEvaluator,
        config: GateConfig,
    ) -> Self {
        Self {
            logo,
            name,
            symbol,
            config,
        }
    }

    /// Đánh giá rủi ro của một ứng viên. Các evaluator đều đảm bảo
    /// fallback nên hàm này không thất bại vì lỗi provider.
    pub async fn assess(&self, candidate: &TokenCandidate) -> RiskAssessment {
        // Chờ tất cả các evaluator hoàn thành
        let (logo, name, symbol) = tokio::join!(
            self.logo.evaluate(&candidate.logo_url),
            self.name.evaluate(&candidate.name),
            self.symbol.evaluate(&candidate.symbol),
        );

        debug_assert!((logo.weight + name.weight + symbol.weight - 1.0).abs() < 1e-9);

        let overall_score = combine_scores(logo.score, name.score, symbol.score);
        let is_high_risk = overall_score >= self.config.high_risk_threshold;

        info!(
            token_name = %candidate.name,
            logo_score = logo.score,
            name_score = name.score,
            symbol_score = symbol.score,
            overall_score,
            is_high_risk,
            "Đã đánh giá rủi ro ứng viên"
        );

        RiskAssessment {
            logo_score: logo.score,
            name_score: name.score,
            symbol_score: symbol.score,
            overall_score,
            is_high_risk,
            evaluated_at: Utc::now(),
        }
    }
}
