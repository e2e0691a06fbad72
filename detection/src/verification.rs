// External imports
use ethers::core::types::Address;

// Standard library imports
use std::collections::HashMap;
use std::sync::Arc;

// Third party imports
use chrono::{DateTime, Utc};
use tracing::{info, warn};

// Internal imports
use crate::providers::{AttestationProvider, TransactionHistoryProvider};
use mintguard_common::config::GateConfig;
use mintguard_common::types::{IdentitySource, WalletIdentity};
use mintguard_common::utils::wallet_age_days;

/// Số giao dịch tối thiểu để nguồn lịch sử được tính là đã xác minh
/// trong policy nghiêm ngặt
const STRICT_MIN_TRANSACTIONS: u64 = 5;

// Trọng số của điểm xác minh cộng dồn
const WORLDCOIN_SCORE_WEIGHT: f64 = 0.4;
const CIVIC_SCORE_WEIGHT: f64 = 0.3;
const HISTORY_SCORE_WEIGHT: f64 = 0.2;
const WALLET_AGE_SCORE_WEIGHT: f64 = 0.1;

/// Kết quả quan sát được từ ba nguồn xác minh, đầu vào cho cả hai policy
#[derive(Debug, Clone, Default)]
pub struct VerificationChecks {
    /// Worldcoin xác nhận
    pub worldcoin_verified: bool,
    /// Civic xác nhận
    pub civic_verified: bool,
    /// Số giao dịch, None nếu provider không phản hồi
    pub transaction_count: Option<u64>,
    /// Giao dịch đầu tiên của ví, None nếu chưa có hoặc provider lỗi
    pub first_seen_at: Option<DateTime<Utc>>,
}

/// Aggregator xác minh danh tính ví. Hai policy tách biệt và không
/// được gộp: xác minh nghiêm ngặt (AND cả ba nguồn) phục vụ gate tạo
/// token, điểm cộng dồn phục vụ đăng ký ví.
pub struct VerificationAggregator {
    worldcoin: Arc<dyn AttestationProvider>,
    civic: Arc<dyn AttestationProvider>,
    history: Arc<dyn TransactionHistoryProvider>,
    config: GateConfig,
}

impl VerificationAggregator {
    /// Tạo aggregator mới
    pub fn new(
        worldcoin: Arc<dyn AttestationProvider>,
        civic: Arc<dyn AttestationProvider>,
        history: Arc<dyn TransactionHistoryProvider>,
        config: GateConfig,
    ) -> Self {
        Self {
            worldcoin,
            civic,
            history,
            config,
        }
    }

    /// Gọi cả ba nguồn song song. Provider lỗi được ghi nhận là chưa
    /// xác minh, không hủy các nguồn còn lại.
    pub async fn collect_checks(&self, address: Address) -> VerificationChecks {
        let (worldcoin, civic, history) = tokio::join!(
            self.worldcoin.verify(address),
            self.civic.verify(address),
            self.history.history(address),
        );

        let worldcoin_verified = match worldcoin {
            Ok(verdict) => verdict.verified,
            Err(e) => {
                warn!(wallet = ?address, source = "worldcoin", error = %e,
                    "Nguồn xác minh không phản hồi, coi như chưa xác minh");
                false
            }
        };
        let civic_verified = match civic {
            Ok(verdict) => verdict.verified,
            Err(e) => {
                warn!(wallet = ?address, source = "civic", error = %e,
                    "Nguồn xác minh không phản hồi, coi như chưa xác minh");
                false
            }
        };
        let (transaction_count, first_seen_at) = match history {
            Ok(history) => (Some(history.transaction_count), history.first_seen_at),
            Err(e) => {
                warn!(wallet = ?address, source = "transaction_history", error = %e,
                    "Nguồn xác minh không phản hồi, coi như chưa xác minh");
                (None, None)
            }
        };

        VerificationChecks {
            worldcoin_verified,
            civic_verified,
            transaction_count,
            first_seen_at,
        }
    }

    /// Policy nghiêm ngặt: AND của cả ba nguồn. Một nguồn từ chối hoặc
    /// không phản hồi là đủ để chặn xác minh.
    pub async fn verify_wallet(&self, address: Address) -> WalletIdentity {
        let checks = self.collect_checks(address).await;

        let history_verified = checks
            .transaction_count
            .map_or(false, |count| count > STRICT_MIN_TRANSACTIONS);

        let mut per_source_verified = HashMap::new();
        per_source_verified.insert(IdentitySource::Worldcoin, checks.worldcoin_verified);
        per_source_verified.insert(IdentitySource::Civic, checks.civic_verified);
        per_source_verified.insert(IdentitySource::TransactionHistory, history_verified);

        let is_verified_strict =
            checks.worldcoin_verified && checks.civic_verified && history_verified;
        let verification_score = self.calculate_verification_score(&checks);

        info!(
            wallet = ?address,
            is_verified_strict,
            verification_score,
            "Đã xác minh ví"
        );

        WalletIdentity {
            wallet_address: address,
            per_source_verified,
            verification_score,
            is_verified_strict,
            last_verified_at: Utc::now(),
        }
    }

    /// Policy cộng dồn: điểm xác minh có trọng số, độc lập với policy
    /// nghiêm ngặt, dùng cho đường đăng ký ví.
    pub fn calculate_verification_score(&self, checks: &VerificationChecks) -> f64 {
        let mut score = 0.0;

        if checks.worldcoin_verified {
            score += WORLDCOIN_SCORE_WEIGHT;
        }
        if checks.civic_verified {
            score += CIVIC_SCORE_WEIGHT;
        }
        if checks
            .transaction_count
            .map_or(false, |count| count > self.config.min_transaction_count)
        {
            score += HISTORY_SCORE_WEIGHT;
        }
        if checks
            .first_seen_at
            .map_or(false, |first_seen| {
                wallet_age_days(first_seen) > self.config.min_wallet_age_days
            })
        {
            score += WALLET_AGE_SCORE_WEIGHT;
        }

        score.min(1.0)
    }
}

/// Module tests
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DetectionError, DetectionResult};
    use crate::providers::{AttestationVerdict, WalletHistory};
    use async_trait::async_trait;
    use chrono::Duration;

    struct ConstAttestation {
        source: IdentitySource,
        verified: bool,
    }

    #[async_trait]
    impl AttestationProvider for ConstAttestation {
        fn source(&self) -> IdentitySource {
            self.source
        }

        async fn verify(&self, _address: Address) -> DetectionResult<AttestationVerdict> {
            Ok(AttestationVerdict {
                verified: self.verified,
                metadata: serde_json::Value::Null,
            })
        }
    }

    struct DownAttestation {
        source: IdentitySource,
    }

    #[async_trait]
    impl AttestationProvider for DownAttestation {
        fn source(&self) -> IdentitySource {
            self.source
        }

        async fn verify(&self, _address: Address) -> DetectionResult<AttestationVerdict> {
            Err(DetectionError::Timeout {
                provider: self.source.as_str().to_string(),
            })
        }
    }

    struct ConstHistory {
        count: u64,
        age_days: i64,
    }

    #[async_trait]
    impl TransactionHistoryProvider for ConstHistory {
        async fn history(&self, _address: Address) -> DetectionResult<WalletHistory> {
            Ok(WalletHistory {
                transaction_count: self.count,
                first_seen_at: Some(Utc::now() - Duration::days(self.age_days)),
            })
        }
    }

    struct DownHistory;

    #[async_trait]
    impl TransactionHistoryProvider for DownHistory {
        async fn history(&self, _address: Address) -> DetectionResult<WalletHistory> {
            Err(DetectionError::ProviderUnavailable {
                provider: "transaction_history".to_string(),
                reason: "connection refused".to_string(),
            })
        }
    }

    fn worldcoin(verified: bool) -> Arc<dyn AttestationProvider> {
        Arc::new(ConstAttestation {
            source: IdentitySource::Worldcoin,
            verified,
        })
    }

    fn civic(verified: bool) -> Arc<dyn AttestationProvider> {
        Arc::new(ConstAttestation {
            source: IdentitySource::Civic,
            verified,
        })
    }

    /// Test xác minh nghiêm ngặt khi cả ba nguồn đạt
    #[tokio::test]
    async fn test_verify_wallet_all_verified() {
        let aggregator = VerificationAggregator::new(
            worldcoin(true),
            civic(true),
            Arc::new(ConstHistory {
                count: 20,
                age_days: 365,
            }),
            GateConfig::default(),
        );
        let identity = aggregator.verify_wallet(Address::zero()).await;
        assert!(identity.is_verified_strict);
        assert_eq!(identity.per_source_verified.len(), 3);
        assert_eq!(
            identity.per_source_verified[&IdentitySource::TransactionHistory],
            true
        );
        assert!((identity.verification_score - 1.0).abs() < 1e-9);
    }

    /// Test một nguồn từ chối là đủ để chặn xác minh nghiêm ngặt
    #[tokio::test]
    async fn test_verify_wallet_one_negative_blocks() {
        let aggregator = VerificationAggregator::new(
            worldcoin(true),
            civic(false),
            Arc::new(ConstHistory {
                count: 20,
                age_days: 365,
            }),
            GateConfig::default(),
        );
        let identity = aggregator.verify_wallet(Address::zero()).await;
        assert!(!identity.is_verified_strict);
        assert_eq!(identity.per_source_verified[&IdentitySource::Civic], false);
    }

    /// Test nguồn không phản hồi bị tính là chưa xác minh
    #[tokio::test]
    async fn test_verify_wallet_unreachable_blocks() {
        let aggregator = VerificationAggregator::new(
            Arc::new(DownAttestation {
                source: IdentitySource::Worldcoin,
            }),
            civic(true),
            Arc::new(ConstHistory {
                count: 20,
                age_days: 365,
            }),
            GateConfig::default(),
        );
        let identity = aggregator.verify_wallet(Address::zero()).await;
        assert!(!identity.is_verified_strict);
        assert_eq!(
            identity.per_source_verified[&IdentitySource::Worldcoin],
            false
        );
        // Các nguồn còn lại vẫn được ghi nhận bình thường
        assert_eq!(identity.per_source_verified[&IdentitySource::Civic], true);
    }

    /// Test lịch sử giao dịch quá mỏng không đạt policy nghiêm ngặt
    #[tokio::test]
    async fn test_verify_wallet_thin_history() {
        let aggregator = VerificationAggregator::new(
            worldcoin(true),
            civic(true),
            Arc::new(ConstHistory {
                count: 5,
                age_days: 365,
            }),
            GateConfig::default(),
        );
        let identity = aggregator.verify_wallet(Address::zero()).await;
        assert!(!identity.is_verified_strict);
    }

    /// Test provider lịch sử sập không hủy các nguồn còn lại
    #[tokio::test]
    async fn test_history_down_isolated() {
        let aggregator = VerificationAggregator::new(
            worldcoin(true),
            civic(true),
            Arc::new(DownHistory),
            GateConfig::default(),
        );
        let identity = aggregator.verify_wallet(Address::zero()).await;
        assert!(!identity.is_verified_strict);
        assert_eq!(identity.per_source_verified[&IdentitySource::Worldcoin], true);
        assert_eq!(identity.per_source_verified[&IdentitySource::Civic], true);
    }

    /// Test điểm cộng dồn từng phần
    #[tokio::test]
    async fn test_verification_score_partial() {
        let aggregator = VerificationAggregator::new(
            worldcoin(false),
            civic(true),
            Arc::new(ConstHistory {
                count: 12,
                age_days: 10,
            }),
            GateConfig::default(),
        );
        let checks = aggregator.collect_checks(Address::zero()).await;
        // 0.3 (civic) + 0.2 (count > 10), tuổi ví chưa đủ
        let score = aggregator.calculate_verification_score(&checks);
        assert!((score - 0.5).abs() < 1e-9);
    }

    /// Test biên của điểm cộng dồn: count và tuổi ví phải vượt ngưỡng chặt
    #[tokio::test]
    async fn test_verification_score_boundaries() {
        let aggregator = VerificationAggregator::new(
            worldcoin(false),
            civic(false),
            Arc::new(ConstHistory {
                count: 10,
                age_days: 180,
            }),
            GateConfig::default(),
        );
        let checks = aggregator.collect_checks(Address::zero()).await;
        // count = 10 không vượt 10, tuổi 180 không vượt 180
        let score = aggregator.calculate_verification_score(&checks);
        assert_eq!(score, 0.0);
    }

    /// Test điểm cộng dồn bị chặn trên tại 1
    #[test]
    fn test_verification_score_capped() {
        let aggregator = VerificationAggregator::new(
            worldcoin(true),
            civic(true),
            Arc::new(ConstHistory {
                count: 100,
                age_days: 1000,
            }),
            GateConfig::default(),
        );
        let checks = VerificationChecks {
            worldcoin_verified: true,
            civic_verified: true,
            transaction_count: Some(100),
            first_seen_at: Some(Utc::now() - Duration::days(1000)),
        };
        let score = aggregator.calculate_verification_score(&checks);
        assert!(score <= 1.0);
        assert!((score - 1.0).abs() < 1e-9);
    }
}
