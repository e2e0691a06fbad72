// Module exports
pub mod error;
pub mod evaluators;
pub mod providers;
pub mod risk;
pub mod verification;

// Re-export các component chính
pub use error::{DetectionError, DetectionResult};
pub use evaluators::{
    AdvisoryCheck,
    LogoFraudEvaluator,
    NameSpamEvaluator,
    SymbolValidityEvaluator,
};
pub use providers::{
    AttestationProvider,
    AttestationVerdict,
    ContentModerationProvider,
    EmbeddingProvider,
    SpamModerationProvider,
    ToxicityProvider,
    TransactionHistoryProvider,
    VisionProvider,
    WalletHistory,
};
pub use risk::RiskAggregator;
pub use verification::{VerificationAggregator, VerificationChecks};
