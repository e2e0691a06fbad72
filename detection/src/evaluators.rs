// Standard library imports
use std::sync::Arc;

// Third party imports
use tracing::warn;

// Internal imports
use crate::providers::{
    ContentModerationProvider, EmbeddingProvider, SpamModerationProvider, ToxicityProvider,
    VisionProvider,
};
use mintguard_common::types::{FallbackPolicy, RiskSignal, SignalSource};
use mintguard_common::utils::clamp01;

/// Điểm fallback khi evaluator fraud không gọi được provider: rủi ro tối đa
pub const FALLBACK_MAX_RISK: f64 = 1.0;

/// Các symbol bị cấm đăng ký
pub const RESERVED_SYMBOLS: [&str; 3] = ["BTC", "ETH", "USDT"];

/// Trọng số của từng nguồn tín hiệu trong điểm tổng hợp
pub fn signal_weight(source: SignalSource) -> f64 {
    match source {
        SignalSource::LogoFraud => 0.4,
        SignalSource::NameSpam => 0.4,
        SignalSource::SymbolValidity => 0.2,
    }
}

/// Kết quả của một check tư vấn theo ngưỡng, không tham gia gating
#[derive(Debug, Clone)]
pub struct AdvisoryCheck {
    /// Vượt ngưỡng nghi vấn
    pub flagged: bool,
    /// Điểm quan sát được, None nếu provider không phản hồi
    pub score: Option<f64>,
}

/// Evaluator phát hiện logo giả mạo, kết hợp ba sub-provider.
/// Fail-closed: bất kỳ sub-call nào lỗi thì trả về rủi ro tối đa.
pub struct LogoFraudEvaluator {
    embedding: Arc<dyn EmbeddingProvider>,
    vision: Arc<dyn VisionProvider>,
    moderation: Arc<dyn ContentModerationProvider>,
}

// Trọng số các sub-signal của logo
const EMBEDDING_WEIGHT: f64 = 0.4;
const VISION_WEIGHT: f64 = 0.3;
const CONTENT_MODERATION_WEIGHT: f64 = 0.3;

impl LogoFraudEvaluator {
    /// Tạo evaluator mới
    pub fn new(
        embedding: Arc<dyn EmbeddingProvider>,
        vision: Arc<dyn VisionProvider>,
        moderation: Arc<dyn ContentModerationProvider>,
    ) -> Self {
        Self {
            embedding,
            vision,
            moderation,
        }
    }

    /// Đánh giá logo, không bao giờ trả lỗi ra ngoài
    pub async fn evaluate(&self, logo_url: &str) -> RiskSignal {
        // Ba sub-call chạy song song, lỗi của call này không hủy call kia
        let (embedding, vision, moderation) = tokio::join!(
            self.embedding.logo_similarity(logo_url),
            self.vision.logo_risk(logo_url),
            self.moderation.moderation_risk(logo_url),
        );

        let mut degraded = false;
        let embedding = match embedding {
            Ok(score) => clamp01(score),
            Err(e) => {
                warn!(logo_url, error = %e, "Sub-call embedding thất bại");
                degraded = true;
                0.0
            }
        };
        let vision = match vision {
            Ok(score) => clamp01(score),
            Err(e) => {
                warn!(logo_url, error = %e, "Sub-call vision thất bại");
                degraded = true;
                0.0
            }
        };
        let moderation = match moderation {
            Ok(score) => clamp01(score),
            Err(e) => {
                warn!(logo_url, error = %e, "Sub-call content moderation thất bại");
                degraded = true;
                0.0
            }
        };

        let score = if degraded {
            warn!(
                logo_url,
                substituted_score = FALLBACK_MAX_RISK,
                "Logo fraud evaluator fail-closed với điểm fallback"
            );
            FALLBACK_MAX_RISK
        } else {
            clamp01(
                embedding * EMBEDDING_WEIGHT
                    + vision * VISION_WEIGHT
                    + moderation * CONTENT_MODERATION_WEIGHT,
            )
        };

        RiskSignal {
            source: SignalSource::LogoFraud,
            score,
            weight: signal_weight(SignalSource::LogoFraud),
            fallback_policy: FallbackPolicy::FailClosed,
            degraded,
        }
    }

    /// Check tư vấn: logo có vượt ngưỡng similarity không.
    /// Fail-open khi provider lỗi, chỉ phục vụ đường audit.
    pub async fn is_logo_suspicious(&self, logo_url: &str, threshold: f64) -> AdvisoryCheck {
        match self.embedding.logo_similarity(logo_url).await {
            Ok(score) => AdvisoryCheck {
                flagged: score > threshold,
                score: Some(score),
            },
            Err(e) => {
                warn!(logo_url, error = %e, "Check similarity tư vấn thất bại, coi như không nghi vấn");
                AdvisoryCheck {
                    flagged: false,
                    score: None,
                }
            }
        }
    }
}

/// Evaluator phát hiện spam trong tên token.
/// Fail-closed: bất kỳ sub-call nào lỗi thì trả về rủi ro tối đa.
pub struct NameSpamEvaluator {
    moderation: Arc<dyn SpamModerationProvider>,
    toxicity: Arc<dyn ToxicityProvider>,
}

// Trọng số các sub-signal của tên
const SPAM_WEIGHT: f64 = 0.6;
const TOXICITY_WEIGHT: f64 = 0.4;

impl NameSpamEvaluator {
    /// Tạo evaluator mới
    pub fn new(
        moderation: Arc<dyn SpamModerationProvider>,
        toxicity: Arc<dyn ToxicityProvider>,
    ) -> Self {
        Self {
            moderation,
            toxicity,
        }
    }

    /// Đánh giá tên token, không bao giờ trả lỗi ra ngoài
    pub async fn evaluate(&self, token_name: &str) -> RiskSignal {
        let (spam, toxicity) = tokio::join!(
            self.moderation.spam_probability(token_name),
            self.toxicity.toxicity(token_name),
        );

        let mut degraded = false;
        let spam = match spam {
            Ok(score) => clamp01(score),
            Err(e) => {
                warn!(token_name, error = %e, "Sub-call spam moderation thất bại");
                degraded = true;
                0.0
            }
        };
        let toxicity = match toxicity {
            Ok(score) => clamp01(score),
            Err(e) => {
                warn!(token_name, error = %e, "Sub-call toxicity thất bại");
                degraded = true;
                0.0
            }
        };

        let score = if degraded {
            warn!(
                token_name,
                substituted_score = FALLBACK_MAX_RISK,
                "Name spam evaluator fail-closed với điểm fallback"
            );
            FALLBACK_MAX_RISK
        } else {
            clamp01(spam * SPAM_WEIGHT + toxicity * TOXICITY_WEIGHT)
        };

        RiskSignal {
            source: SignalSource::NameSpam,
            score,
            weight: signal_weight(SignalSource::NameSpam),
            fallback_policy: FallbackPolicy::FailClosed,
            degraded,
        }
    }

    /// Check tư vấn: tên có vượt ngưỡng spam không. Fail-open khi provider lỗi.
    pub async fn is_name_spam(&self, token_name: &str, threshold: f64) -> AdvisoryCheck {
        match self.moderation.spam_probability(token_name).await {
            Ok(score) => AdvisoryCheck {
                flagged: score > threshold,
                score: Some(score),
            },
            Err(e) => {
                warn!(token_name, error = %e, "Check spam tư vấn thất bại, coi như không nghi vấn");
                AdvisoryCheck {
                    flagged: false,
                    score: None,
                }
            }
        }
    }
}

/// Evaluator kiểm tra symbol, thuần logic, không gọi mạng.
/// Điểm là validity: cao hơn nghĩa là tốt hơn.
#[derive(Debug, Clone, Default)]
pub struct SymbolValidityEvaluator;

impl SymbolValidityEvaluator {
    /// Tạo evaluator mới
    pub fn new() -> Self {
        Self
    }

    /// Chấm điểm validity của symbol
    pub async fn evaluate(&self, symbol: &str) -> RiskSignal {
        let mut score = 1.0_f64;

        let len = symbol.chars().count();
        if !(3..=5).contains(&len) {
            score -= 0.3;
        }
        if RESERVED_SYMBOLS.contains(&symbol) {
            score -= 0.5;
        }

        RiskSignal {
            source: SignalSource::SymbolValidity,
            score: score.max(0.0),
            weight: signal_weight(SignalSource::SymbolValidity),
            fallback_policy: FallbackPolicy::FailClosed,
            degraded: false,
        }
    }
}

/// Module tests
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DetectionError, DetectionResult};
    use async_trait::async_trait;

    struct ConstEmbedding(f64);
    #[async_trait]
    impl EmbeddingProvider for ConstEmbedding {
        async fn logo_similarity(&self, _logo_url: &str) -> DetectionResult<f64> {
            Ok(self.0)
        }
    }

    struct DownEmbedding;
    #[async_trait]
    impl EmbeddingProvider for DownEmbedding {
        async fn logo_similarity(&self, _logo_url: &str) -> DetectionResult<f64> {
            Err(DetectionError::Timeout {
                provider: "embedding".to_string(),
            })
        }
    }

    struct ConstVision(f64);
    #[async_trait]
    impl VisionProvider for ConstVision {
        async fn logo_risk(&self, _logo_url: &str) -> DetectionResult<f64> {
            Ok(self.0)
        }
    }

    struct ConstContentModeration(f64);
    #[async_trait]
    impl ContentModerationProvider for ConstContentModeration {
        async fn moderation_risk(&self, _logo_url: &str) -> DetectionResult<f64> {
            Ok(self.0)
        }
    }

    struct DownContentModeration;
    #[async_trait]
    impl ContentModerationProvider for DownContentModeration {
        async fn moderation_risk(&self, _logo_url: &str) -> DetectionResult<f64> {
            Err(DetectionError::ProviderUnavailable {
                provider: "content_moderation".to_string(),
                reason: "connection refused".to_string(),
            })
        }
    }

    struct ConstSpam(f64);
    #[async_trait]
    impl SpamModerationProvider for ConstSpam {
        async fn spam_probability(&self, _token_name: &str) -> DetectionResult<f64> {
            Ok(self.0)
        }
    }

    struct DownSpam;
    #[async_trait]
    impl SpamModerationProvider for DownSpam {
        async fn spam_probability(&self, _token_name: &str) -> DetectionResult<f64> {
            Err(DetectionError::Timeout {
                provider: "spam_moderation".to_string(),
            })
        }
    }

    struct ConstToxicity(f64);
    #[async_trait]
    impl ToxicityProvider for ConstToxicity {
        async fn toxicity(&self, _token_name: &str) -> DetectionResult<f64> {
            Ok(self.0)
        }
    }

    fn logo_evaluator(e: f64, v: f64, m: f64) -> LogoFraudEvaluator {
        LogoFraudEvaluator::new(
            Arc::new(ConstEmbedding(e)),
            Arc::new(ConstVision(v)),
            Arc::new(ConstContentModeration(m)),
        )
    }

    /// Test logo evaluator kết hợp trọng số
    #[tokio::test]
    async fn test_logo_weighted_combination() {
        let signal = logo_evaluator(0.5, 0.2, 0.1).evaluate("logo.png").await;
        assert!((signal.score - 0.29).abs() < 1e-9);
        assert_eq!(signal.source, SignalSource::LogoFraud);
        assert_eq!(signal.weight, 0.4);
        assert!(!signal.degraded);
    }

    /// Test sub-signal bị clip vào [0,1] trước khi kết hợp
    #[tokio::test]
    async fn test_logo_sub_signal_clipped() {
        let signal = logo_evaluator(1.5, -0.2, 0.0).evaluate("logo.png").await;
        // 0.4*1.0 + 0.3*0.0 + 0.3*0.0
        assert!((signal.score - 0.4).abs() < 1e-9);
    }

    /// Test fail-closed: một sub-call lỗi thì trả về đúng 1.0
    #[tokio::test]
    async fn test_logo_fail_closed() {
        let evaluator = LogoFraudEvaluator::new(
            Arc::new(DownEmbedding),
            Arc::new(ConstVision(0.0)),
            Arc::new(ConstContentModeration(0.0)),
        );
        let signal = evaluator.evaluate("logo.png").await;
        assert_eq!(signal.score, 1.0);
        assert!(signal.degraded);

        let evaluator = LogoFraudEvaluator::new(
            Arc::new(ConstEmbedding(0.1)),
            Arc::new(ConstVision(0.1)),
            Arc::new(DownContentModeration),
        );
        let signal = evaluator.evaluate("logo.png").await;
        assert_eq!(signal.score, 1.0);
    }

    /// Test name evaluator kết hợp trọng số
    #[tokio::test]
    async fn test_name_weighted_combination() {
        let evaluator =
            NameSpamEvaluator::new(Arc::new(ConstSpam(0.5)), Arc::new(ConstToxicity(0.25)));
        let signal = evaluator.evaluate("Moon Token").await;
        // 0.6*0.5 + 0.4*0.25
        assert!((signal.score - 0.4).abs() < 1e-9);
        assert_eq!(signal.source, SignalSource::NameSpam);
    }

    /// Test name evaluator fail-closed
    #[tokio::test]
    async fn test_name_fail_closed() {
        let evaluator = NameSpamEvaluator::new(Arc::new(DownSpam), Arc::new(ConstToxicity(0.0)));
        let signal = evaluator.evaluate("Moon Token").await;
        assert_eq!(signal.score, 1.0);
        assert!(signal.degraded);
    }

    /// Test điểm validity của symbol
    #[tokio::test]
    async fn test_symbol_validity() {
        let evaluator = SymbolValidityEvaluator::new();

        // Symbol bị cấm, độ dài hợp lệ
        let signal = evaluator.evaluate("BTC").await;
        assert!((signal.score - 0.5).abs() < 1e-9);

        // Không bị cấm, độ dài sai
        let signal = evaluator.evaluate("AB").await;
        assert!((signal.score - 0.7).abs() < 1e-9);

        // Hợp lệ hoàn toàn
        let signal = evaluator.evaluate("XYZAB").await;
        assert!((signal.score - 1.0).abs() < 1e-9);

        // USDT bị cấm
        let signal = evaluator.evaluate("USDT").await;
        assert!((signal.score - 0.5).abs() < 1e-9);
    }

    /// Test check tư vấn fail-open
    #[tokio::test]
    async fn test_advisory_checks_fail_open() {
        let evaluator = LogoFraudEvaluator::new(
            Arc::new(DownEmbedding),
            Arc::new(ConstVision(0.0)),
            Arc::new(ConstContentModeration(0.0)),
        );
        let check = evaluator.is_logo_suspicious("logo.png", 0.8).await;
        assert!(!check.flagged);
        assert!(check.score.is_none());

        let evaluator = NameSpamEvaluator::new(Arc::new(DownSpam), Arc::new(ConstToxicity(0.0)));
        let check = evaluator.is_name_spam("Moon Token", 0.7).await;
        assert!(!check.flagged);
    }

    /// Test check tư vấn theo ngưỡng
    #[tokio::test]
    async fn test_advisory_threshold() {
        let evaluator = logo_evaluator(0.9, 0.0, 0.0);
        let check = evaluator.is_logo_suspicious("logo.png", 0.8).await;
        assert!(check.flagged);
        assert_eq!(check.score, Some(0.9));

        let check = evaluator.is_logo_suspicious("logo.png", 0.95).await;
        assert!(!check.flagged);
    }

    /// Test tổng trọng số các nguồn bằng 1
    #[test]
    fn test_signal_weights_sum_to_one() {
        let total = signal_weight(SignalSource::LogoFraud)
            + signal_weight(SignalSource::NameSpam)
            + signal_weight(SignalSource::SymbolValidity);
        assert!((total - 1.0).abs() < 1e-9);
    }
}
