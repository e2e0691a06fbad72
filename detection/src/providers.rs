// External imports
use ethers::core::types::Address;

// Standard library imports
use std::time::Duration;

// Third party imports
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use serde_json::json;

// Internal imports
use crate::error::{classify_transport_error, DetectionError, DetectionResult};
use mintguard_common::types::IdentitySource;

/// Kết luận của một provider xác minh danh tính
#[derive(Debug, Clone)]
pub struct AttestationVerdict {
    /// Provider xác nhận danh tính
    pub verified: bool,
    /// Metadata kèm theo của provider (humanity score, level, ...)
    pub metadata: serde_json::Value,
}

/// Lịch sử giao dịch của một ví
#[derive(Debug, Clone)]
pub struct WalletHistory {
    /// Số giao dịch đã thấy
    pub transaction_count: u64,
    /// Thời điểm giao dịch đầu tiên, None nếu ví chưa có giao dịch
    pub first_seen_at: Option<DateTime<Utc>>,
}

/// Provider tính điểm similarity của logo so với tập logo giả mạo đã biết
#[async_trait]
pub trait EmbeddingProvider: Send + Sync + 'static {
    /// Điểm similarity trong [0,1]
    async fn logo_similarity(&self, logo_url: &str) -> DetectionResult<f64>;
}

/// Provider phân tích rủi ro hình ảnh logo
#[async_trait]
pub trait VisionProvider: Send + Sync + 'static {
    /// Điểm rủi ro trong [0,1]
    async fn logo_risk(&self, logo_url: &str) -> DetectionResult<f64>;
}

/// Provider kiểm duyệt nội dung hình ảnh
#[async_trait]
pub trait ContentModerationProvider: Send + Sync + 'static {
    /// Điểm rủi ro trong [0,1]
    async fn moderation_risk(&self, logo_url: &str) -> DetectionResult<f64>;
}

/// Provider kiểm duyệt spam cho tên token
#[async_trait]
pub trait SpamModerationProvider: Send + Sync + 'static {
    /// Xác suất spam trong [0,1]
    async fn spam_probability(&self, token_name: &str) -> DetectionResult<f64>;
}

/// Provider chấm điểm toxicity cho tên token
#[async_trait]
pub trait ToxicityProvider: Send + Sync + 'static {
    /// Điểm toxicity trong [0,1]
    async fn toxicity(&self, token_name: &str) -> DetectionResult<f64>;
}

/// Provider xác minh danh tính ví
#[async_trait]
pub trait AttestationProvider: Send + Sync + 'static {
    /// Nguồn xác minh tương ứng
    fn source(&self) -> IdentitySource;

    /// Xác minh địa chỉ ví
    async fn verify(&self, address: Address) -> DetectionResult<AttestationVerdict>;
}

/// Provider truy vấn lịch sử giao dịch
#[async_trait]
pub trait TransactionHistoryProvider: Send + Sync + 'static {
    /// Lấy lịch sử giao dịch của ví
    async fn history(&self, address: Address) -> DetectionResult<WalletHistory>;
}

// ---------------------------------------------------------------------------
// HTTP clients
// ---------------------------------------------------------------------------

/// Client HTTP dùng chung cho các provider chấm điểm:
/// POST {"input": ...} và đọc về một trường điểm số
#[derive(Debug, Clone)]
struct ScoreClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct ScoreResponse {
    score: f64,
}

impl ScoreClient {
    fn new(base_url: String, api_key: String, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            api_key,
            timeout,
        }
    }

    async fn fetch_score(&self, provider: &str, path: &str, input: &str) -> DetectionResult<f64> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&json!({ "input": input }))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| classify_transport_error(provider, e))?
            .error_for_status()
            .map_err(|e| classify_transport_error(provider, e))?;

        let body: ScoreResponse = response
            .json()
            .await
            .map_err(|e| DetectionError::InvalidResponse {
                provider: provider.to_string(),
                reason: e.to_string(),
            })?;
        Ok(body.score)
    }
}

/// Client similarity embedding cho logo
#[derive(Debug, Clone)]
pub struct EmbeddingSimilarityClient {
    inner: ScoreClient,
}

impl EmbeddingSimilarityClient {
    pub fn new(base_url: String, api_key: String, timeout: Duration) -> Self {
        Self {
            inner: ScoreClient::new(base_url, api_key, timeout),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for EmbeddingSimilarityClient {
    async fn logo_similarity(&self, logo_url: &str) -> DetectionResult<f64> {
        self.inner
            .fetch_score("embedding", "v1/embeddings/similarity", logo_url)
            .await
    }
}

/// Client phân tích rủi ro hình ảnh
#[derive(Debug, Clone)]
pub struct VisionRiskClient {
    inner: ScoreClient,
}

impl VisionRiskClient {
    pub fn new(base_url: String, api_key: String, timeout: Duration) -> Self {
        Self {
            inner: ScoreClient::new(base_url, api_key, timeout),
        }
    }
}

#[async_trait]
impl VisionProvider for VisionRiskClient {
    async fn logo_risk(&self, logo_url: &str) -> DetectionResult<f64> {
        self.inner
            .fetch_score("vision", "v1/images/annotate", logo_url)
            .await
    }
}

/// Client kiểm duyệt nội dung hình ảnh
#[derive(Debug, Clone)]
pub struct ContentModerationClient {
    inner: ScoreClient,
}

impl ContentModerationClient {
    pub fn new(base_url: String, api_key: String, timeout: Duration) -> Self {
        Self {
            inner: ScoreClient::new(base_url, api_key, timeout),
        }
    }
}

#[async_trait]
impl ContentModerationProvider for ContentModerationClient {
    async fn moderation_risk(&self, logo_url: &str) -> DetectionResult<f64> {
        self.inner
            .fetch_score("content_moderation", "contentmoderator/moderate/v1.0/ProcessImage", logo_url)
            .await
    }
}

/// Client kiểm duyệt spam cho tên token
#[derive(Debug, Clone)]
pub struct SpamModerationClient {
    inner: ScoreClient,
}

impl SpamModerationClient {
    pub fn new(base_url: String, api_key: String, timeout: Duration) -> Self {
        Self {
            inner: ScoreClient::new(base_url, api_key, timeout),
        }
    }
}

#[async_trait]
impl SpamModerationProvider for SpamModerationClient {
    async fn spam_probability(&self, token_name: &str) -> DetectionResult<f64> {
        self.inner
            .fetch_score("spam_moderation", "v1/moderations", token_name)
            .await
    }
}

/// Client chấm điểm toxicity
#[derive(Debug, Clone)]
pub struct ToxicityClient {
    inner: ScoreClient,
}

impl ToxicityClient {
    pub fn new(base_url: String, api_key: String, timeout: Duration) -> Self {
        Self {
            inner: ScoreClient::new(base_url, api_key, timeout),
        }
    }
}

#[async_trait]
impl ToxicityProvider for ToxicityClient {
    async fn toxicity(&self, token_name: &str) -> DetectionResult<f64> {
        self.inner
            .fetch_score("toxicity", "v1alpha1/comments:analyze", token_name)
            .await
    }
}

/// Client xác minh Worldcoin
#[derive(Debug, Clone)]
pub struct WorldcoinClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WorldcoinResponse {
    verified: bool,
    #[serde(default)]
    humanity_score: Option<f64>,
}

impl WorldcoinClient {
    pub fn new(base_url: String, api_key: String, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            api_key,
            timeout,
        }
    }
}

#[async_trait]
impl AttestationProvider for WorldcoinClient {
    fn source(&self) -> IdentitySource {
        IdentitySource::Worldcoin
    }

    async fn verify(&self, address: Address) -> DetectionResult<AttestationVerdict> {
        let url = format!("{}/api/v1/verify", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&json!({
                "walletAddress": format!("{:?}", address),
                "apiKey": self.api_key,
            }))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| classify_transport_error("worldcoin", e))?
            .error_for_status()
            .map_err(|e| classify_transport_error("worldcoin", e))?;

        let body: WorldcoinResponse = response
            .json()
            .await
            .map_err(|e| DetectionError::InvalidResponse {
                provider: "worldcoin".to_string(),
                reason: e.to_string(),
            })?;

        Ok(AttestationVerdict {
            verified: body.verified,
            metadata: json!({ "humanity_score": body.humanity_score }),
        })
    }
}

/// Client xác minh Civic
#[derive(Debug, Clone)]
pub struct CivicClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CivicResponse {
    is_verified: bool,
    #[serde(default)]
    level: Option<String>,
}

impl CivicClient {
    pub fn new(base_url: String, api_key: String, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            api_key,
            timeout,
        }
    }
}

#[async_trait]
impl AttestationProvider for CivicClient {
    fn source(&self) -> IdentitySource {
        IdentitySource::Civic
    }

    async fn verify(&self, address: Address) -> DetectionResult<AttestationVerdict> {
        let url = format!("{}/wallet-verification", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("walletAddress", format!("{:?}", address)),
                ("apiKey", self.api_key.clone()),
            ])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| classify_transport_error("civic", e))?
            .error_for_status()
            .map_err(|e| classify_transport_error("civic", e))?;

        let body: CivicResponse = response
            .json()
            .await
            .map_err(|e| DetectionError::InvalidResponse {
                provider: "civic".to_string(),
                reason: e.to_string(),
            })?;

        Ok(AttestationVerdict {
            verified: body.is_verified,
            metadata: json!({ "level": body.level }),
        })
    }
}

/// Client lịch sử giao dịch kiểu Etherscan
#[derive(Debug, Clone)]
pub struct EtherscanHistoryClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct EtherscanResponse {
    result: Vec<EtherscanTx>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EtherscanTx {
    time_stamp: String,
}

impl EtherscanHistoryClient {
    pub fn new(base_url: String, api_key: String, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            api_key,
            timeout,
        }
    }
}

#[async_trait]
impl TransactionHistoryProvider for EtherscanHistoryClient {
    async fn history(&self, address: Address) -> DetectionResult<WalletHistory> {
        let url = format!("{}/api", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("module", "account".to_string()),
                ("action", "txlist".to_string()),
                ("address", format!("{:?}", address)),
                ("startblock", "0".to_string()),
                ("endblock", "99999999".to_string()),
                ("sort", "asc".to_string()),
                ("apikey", self.api_key.clone()),
            ])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| classify_transport_error("transaction_history", e))?
            .error_for_status()
            .map_err(|e| classify_transport_error("transaction_history", e))?;

        let body: EtherscanResponse = response
            .json()
            .await
            .map_err(|e| DetectionError::InvalidResponse {
                provider: "transaction_history".to_string(),
                reason: e.to_string(),
            })?;

        // Danh sách trả về theo thứ tự tăng dần, phần tử đầu là giao dịch đầu tiên
        let first_seen_at = body.result.first().and_then(|tx| {
            tx.time_stamp
                .parse::<i64>()
                .ok()
                .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
        });

        Ok(WalletHistory {
            transaction_count: body.result.len() as u64,
            first_seen_at,
        })
    }
}
