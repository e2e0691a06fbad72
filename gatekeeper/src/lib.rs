// Module exports
pub mod gate;
pub mod rate_limit;

// Re-export các component chính
pub use gate::TokenGate;
pub use rate_limit::RollingWindowLimiter;

// Re-export từ các crate thành phần
pub use mintguard_common::config::GateConfig;
pub use mintguard_common::types::{GateDecision, TokenCandidate};
