// Re-exports for common crate
pub mod prelude {
    // External types
    pub use ethers::core::types::Address;

    // Common modules
    pub use crate::config;
    pub use crate::error;
    pub use crate::types;
    pub use crate::utils;

    // Re-export error types
    pub use crate::error::*;
}

// Modules paths - tất cả các module trong src
pub mod config;
pub mod error;
pub mod logger;
pub mod types;
pub mod utils;

// Re-exports
pub use config::GateConfig;
pub use error::{GateError, GateResult, ValidationFailure};
pub use types::{
    CreationRecord,
    FraudLog,
    GateDecision,
    RiskAssessment,
    RiskSignal,
    TokenCandidate,
    WalletIdentity,
};
pub use utils::*;
