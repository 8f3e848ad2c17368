//! HTTP Client with Connection Pooling
//!
//! Provides a global HTTP client with:
//! - Connection pooling for better performance
//! - Built-in rate limiting per domain
//!
//! The submission module is the only production consumer; keeping the
//! client global means repeated proof submissions reuse one connection.

use reqwest::blocking::Client;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};
use std::time::{Duration, Instant};

use crate::error::{PipelineError, PipelineResult};
use crate::log_warn;

/// Global HTTP client instance - lazy initialized
static GLOBAL_CLIENT: OnceLock<Arc<HttpClientPool>> = OnceLock::new();

/// Token bucket state for one domain
struct Bucket {
    tokens: f64,
    max_tokens: f64,
    last_refill: Instant,
    refill_period: Duration,
    tokens_per_refill: f64,
}

/// Per-domain token bucket rate limiter
///
/// Buckets are created lazily on first request. Refills happen in
/// whole-period increments, capped at `max_tokens`.
struct RateLimiter {
    buckets: HashMap<String, Bucket>,
    default_rate: u32,
    default_period: Duration,
}

impl RateLimiter {
    fn new(rate: u32, period_seconds: u64) -> Self {
        Self {
            buckets: HashMap::new(),
            default_rate: rate,
            default_period: Duration::from_secs(period_seconds),
        }
    }

    /// Check whether a request to `key` is allowed, consuming a token if so
    fn check(&mut self, key: &str) -> bool {
        let rate = self.default_rate;
        let period = self.default_period;

        let bucket = self.buckets.entry(key.to_string()).or_insert_with(|| Bucket {
            tokens: rate as f64,
            max_tokens: rate as f64,
            last_refill: Instant::now(),
            refill_period: period,
            tokens_per_refill: rate as f64,
        });

        let elapsed = bucket.last_refill.elapsed();
        if elapsed >= bucket.refill_period {
            let periods = (elapsed.as_secs_f64() / bucket.refill_period.as_secs_f64()).floor();
            bucket.tokens =
                (bucket.tokens + periods * bucket.tokens_per_refill).min(bucket.max_tokens);
            bucket.last_refill += bucket.refill_period.mul_f64(periods);
        }

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

/// HTTP Client Pool with connection reuse
pub struct HttpClientPool {
    /// Default client for general use
    default_client: Client,
    /// Rate limiter per domain
    rate_limiter: Mutex<RateLimiter>,
}

impl HttpClientPool {
    /// Create a new HTTP client pool
    fn new() -> PipelineResult<Self> {
        let default_client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(5)
            .tcp_keepalive(Duration::from_secs(60))
            .tcp_nodelay(true)
            .user_agent("Eip712Proof/0.1")
            .build()
            .map_err(|e| PipelineError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            default_client,
            rate_limiter: Mutex::new(RateLimiter::new(10, 1)), // 10 req/sec default
        })
    }

    /// Get the default HTTP client
    pub fn client(&self) -> &Client {
        &self.default_client
    }

    /// Make a GET request with rate limiting
    pub fn get(&self, url: &str) -> PipelineResult<reqwest::blocking::Response> {
        self.check_rate_limit(url)?;

        self.default_client
            .get(url)
            .send()
            .map_err(|e| PipelineError::network(format!("GET request failed: {}", e)))
    }

    /// Make a GET request with one extra header, e.g. an API key
    pub fn get_with_header(
        &self,
        url: &str,
        header_name: &str,
        header_value: &str,
    ) -> PipelineResult<reqwest::blocking::Response> {
        self.check_rate_limit(url)?;

        self.default_client
            .get(url)
            .header(header_name, header_value)
            .send()
            .map_err(|e| PipelineError::network(format!("GET request failed: {}", e)))
    }

    /// Make a POST request with rate limiting
    pub fn post_json<T: serde::Serialize>(
        &self,
        url: &str,
        body: &T,
    ) -> PipelineResult<reqwest::blocking::Response> {
        self.check_rate_limit(url)?;

        self.default_client
            .post(url)
            .json(body)
            .send()
            .map_err(|e| PipelineError::network(format!("POST request failed: {}", e)))
    }

    /// Make a POST request with one extra header, e.g. an API key
    pub fn post_json_with_header<T: serde::Serialize>(
        &self,
        url: &str,
        body: &T,
        header_name: &str,
        header_value: &str,
    ) -> PipelineResult<reqwest::blocking::Response> {
        self.check_rate_limit(url)?;

        self.default_client
            .post(url)
            .header(header_name, header_value)
            .json(body)
            .send()
            .map_err(|e| PipelineError::network(format!("POST request failed: {}", e)))
    }

    /// Check rate limit for a domain
    fn check_rate_limit(&self, url: &str) -> PipelineResult<()> {
        let domain = extract_domain(url);
        let mut limiter = self
            .rate_limiter
            .lock()
            .map_err(|_| PipelineError::internal("Rate limiter lock poisoned"))?;

        if !limiter.check(&domain) {
            log_warn!("http", "Rate limit exceeded", domain = domain);
            return Err(PipelineError::rate_limited(format!(
                "Rate limit exceeded for {}",
                domain
            )));
        }
        Ok(())
    }
}

/// Get the global HTTP client pool
pub fn get_client_pool() -> &'static Arc<HttpClientPool> {
    GLOBAL_CLIENT.get_or_init(|| {
        // HttpClientPool::new() only fails if TLS initialization fails
        Arc::new(HttpClientPool::new().expect("HTTP client pool initialization failed - check TLS configuration"))
    })
}

/// Make a rate-limited GET request
pub fn get(url: &str) -> PipelineResult<reqwest::blocking::Response> {
    get_client_pool().get(url)
}

/// Make a rate-limited POST request with JSON body
pub fn post_json<T: serde::Serialize>(
    url: &str,
    body: &T,
) -> PipelineResult<reqwest::blocking::Response> {
    get_client_pool().post_json(url, body)
}

/// Extract domain from URL for rate limiting
fn extract_domain(url: &str) -> String {
    url.trim_start_matches("https://")
        .trim_start_matches("http://")
        .split('/')
        .next()
        .unwrap_or(url)
        .to_string()
}
