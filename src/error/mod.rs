// src/error/mod.rs
use log::{debug, error, info, warn};
use rand::Rng;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::time::sleep;

#[derive(Debug, Clone, Error)]
pub enum AppError {
    /// Missing or malformed configuration
    #[error("Config Error: {0}")]
    ConfigError(String),

    /// Network/connectivity issues talking to an upstream API
    #[error("Network Error: {0}")]
    NetworkError(String),

    /// Upstream request timed out
    #[error("Timeout Error: {0}")]
    TimeoutError(String),

    /// Upstream API answered with a non-success status
    #[error("Upstream Error ({status}): {message}")]
    Upstream { status: u16, message: String },

    /// Requested resource does not exist
    #[error("Not Found: {0}")]
    NotFound(String),

    /// Request payload failed validation
    #[error("Validation Error: {0}")]
    Validation(String),

    /// Missing or invalid credentials
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bearer token is past its expiry
    #[error("Token expired")]
    TokenExpired,

    /// Authenticated user may not touch the resource
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Unique constraint clash (duplicate email, ...)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// SQLite errors
    #[error("Storage Error: {0}")]
    StorageError(String),

    /// Cache/Redis errors
    #[error("Cache Error: {0}")]
    CacheError(String),

    /// Parsing errors for upstream payloads
    #[error("Parse Error: {0}")]
    ParseError(String),

    #[error("Circuit breaker is open, operation blocked")]
    CircuitBreakerOpen,

    /// Anything else that should surface as a 500
    #[error("Internal Error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::ParseError(format!("JSON serialization/deserialization error: {}", err))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::TimeoutError(err.to_string())
        } else if let Some(status) = err.status() {
            AppError::Upstream {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else if err.is_decode() {
            AppError::ParseError(err.to_string())
        } else {
            AppError::NetworkError(err.to_string())
        }
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(err: rusqlite::Error) -> Self {
        AppError::StorageError(err.to_string())
    }
}

impl From<redis::RedisError> for AppError {
    fn from(err: redis::RedisError) -> Self {
        AppError::CacheError(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::TokenExpired,
            _ => AppError::Unauthorized(err.to_string()),
        }
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal(format!("Blocking task failed: {}", err))
    }
}

impl AppError {
    /// Determines if an error is recoverable through retry
    pub fn is_recoverable(&self) -> bool {
        match self {
            AppError::NetworkError(_) => true,
            AppError::TimeoutError(_) => true,
            AppError::Upstream { status, .. } => is_transient_status(*status),
            AppError::CacheError(_) => true, // Redis might recover
            AppError::CircuitBreakerOpen => false, // Wait for the breaker to close
            AppError::ConfigError(_) => false,
            AppError::NotFound(_) => false,
            AppError::Validation(_) => false,
            AppError::Unauthorized(_) => false,
            AppError::TokenExpired => false,
            AppError::Forbidden(_) => false,
            AppError::Conflict(_) => false,
            AppError::StorageError(_) => false,
            AppError::ParseError(_) => false, // Data format issues aren't recoverable
            AppError::Internal(_) => false,
        }
    }

    /// Determines if an upstream call should be retried immediately
    pub fn should_retry(&self) -> bool {
        self.is_recoverable()
            && matches!(
                self,
                AppError::NetworkError(_) | AppError::TimeoutError(_) | AppError::Upstream { .. }
            )
    }
}

/// 5xx, 408 Request Timeout and 429 Too Many Requests are worth another try.
pub fn is_transient_status(status: u16) -> bool {
    status >= 500 || status == 408 || status == 429
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum CircuitBreakerState {
    Closed,   // Normal operation
    Open,     // Blocking all requests
    HalfOpen, // Testing if service recovered
}

#[derive(Debug)]
struct BreakerInner {
    failure_count: u32,
    last_failure_time: Option<Instant>,
    state: CircuitBreakerState,
    trial_in_flight: bool,
}

/// Circuit breaker for protecting against cascading upstream failures.
///
/// Shared between concurrent requests; the state lives behind a short-lived
/// lock that is never held across an await point.
#[derive(Debug)]
pub struct CircuitBreaker {
    failure_threshold: u32,
    recovery_timeout: Duration,
    inner: Mutex<BreakerInner>,
}

impl CircuitBreaker {
    pub fn new(failure_threshold: u32, recovery_timeout: Duration) -> Self {
        Self {
            failure_threshold: failure_threshold.max(1),
            recovery_timeout,
            inner: Mutex::new(BreakerInner {
                failure_count: 0,
                last_failure_time: None,
                state: CircuitBreakerState::Closed,
                trial_in_flight: false,
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BreakerInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    #[cfg(test)]
    pub(crate) fn is_open(&self) -> bool {
        let inner = self.lock();
        match inner.state {
            CircuitBreakerState::Open => inner
                .last_failure_time
                .map(|last_failure| last_failure.elapsed() < self.recovery_timeout)
                .unwrap_or(false),
            _ => false,
        }
    }

    /// Decide whether a call may go through, moving Open -> HalfOpen once the
    /// recovery timeout has passed. Only one trial call is let through while
    /// half-open.
    pub fn try_acquire(&self) -> bool {
        let mut inner = self.lock();
        match inner.state {
            CircuitBreakerState::Closed => true,
            CircuitBreakerState::Open => {
                let recovered = inner
                    .last_failure_time
                    .map(|last_failure| last_failure.elapsed() >= self.recovery_timeout)
                    .unwrap_or(true);
                if recovered {
                    inner.state = CircuitBreakerState::HalfOpen;
                    inner.trial_in_flight = true;
                    info!("Circuit breaker: Transitioning to HalfOpen for testing");
                    true
                } else {
                    false
                }
            }
            CircuitBreakerState::HalfOpen => {
                if inner.trial_in_flight {
                    false
                } else {
                    inner.trial_in_flight = true;
                    true
                }
            }
        }
    }

    pub fn record_success(&self) {
        let mut inner = self.lock();
        if inner.state != CircuitBreakerState::Closed {
            info!("Circuit breaker: Success recorded, state reset to Closed");
        }
        inner.failure_count = 0;
        inner.state = CircuitBreakerState::Closed;
        inner.trial_in_flight = false;
    }

    pub fn record_failure(&self) {
        let mut inner = self.lock();
        inner.failure_count += 1;
        inner.last_failure_time = Some(Instant::now());
        inner.trial_in_flight = false;

        if inner.state == CircuitBreakerState::HalfOpen
            || inner.failure_count >= self.failure_threshold
        {
            if inner.state != CircuitBreakerState::Open {
                warn!(
                    "Circuit breaker: OPENED after {} failures",
                    inner.failure_count
                );
            }
            inner.state = CircuitBreakerState::Open;
        } else {
            debug!(
                "Circuit breaker: Failure recorded ({}/{})",
                inner.failure_count, self.failure_threshold
            );
        }
    }

    /// Run one call through the breaker. Only transient failures count
    /// against it; a 404 still proves the upstream is alive.
    pub async fn execute<F, T>(&self, operation: F) -> Result<T>
    where
        F: std::future::Future<Output = Result<T>>,
    {
        if !self.try_acquire() {
            return Err(AppError::CircuitBreakerOpen);
        }

        let mut slot = TrialSlot {
            breaker: self,
            settled: false,
        };
        let outcome = operation.await;
        slot.settled = true;

        match outcome {
            Ok(result) => {
                self.record_success();
                Ok(result)
            }
            Err(e) => {
                if e.should_retry() {
                    self.record_failure();
                } else {
                    self.record_success();
                }
                Err(e)
            }
        }
    }

    /// Give the half-open trial back without judging the upstream.
    fn release_trial(&self) {
        let mut inner = self.lock();
        if inner.trial_in_flight {
            debug!("Circuit breaker: Trial call abandoned, slot released");
            inner.trial_in_flight = false;
        }
    }
}

/// Held across the awaited call so a dropped future frees the half-open slot.
struct TrialSlot<'a> {
    breaker: &'a CircuitBreaker,
    settled: bool,
}

impl Drop for TrialSlot<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.breaker.release_trial();
        }
    }
}

/// Retry policy with exponential backoff
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub jitter_percent: f64, // 0.0 - 1.0
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            jitter_percent: 0.1,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            max_delay,
            jitter_percent: 0.1,
        }
    }

    pub fn without_jitter(mut self) -> Self {
        self.jitter_percent = 0.0;
        self
    }

    /// Delay before retry number `attempt` (1-based): base * 2^attempt, capped.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::from_millis(0);
        }

        let factor = 2_u128.saturating_pow(attempt);
        let delay_ms = self.base_delay.as_millis().saturating_mul(factor);
        let mut delay = Duration::from_millis(delay_ms.min(self.max_delay.as_millis()) as u64);

        if self.jitter_percent > 0.0 {
            let random_value: f64 = rand::thread_rng().gen();
            let jitter_factor = 1.0 + (random_value - 0.5) * 2.0 * self.jitter_percent;
            delay = Duration::from_millis((delay.as_millis() as f64 * jitter_factor) as u64);
        }

        debug!("Retry attempt {}: delay = {:?}", attempt, delay);
        delay
    }

    /// Execute operation with retry logic
    pub async fn execute<F, T, Fut>(&self, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => {
                    if attempt > 0 {
                        info!("Operation succeeded after {} retries", attempt);
                    }
                    return Ok(result);
                }
                Err(e) if !e.should_retry() => {
                    if attempt > 0 {
                        warn!("Non-retryable error on attempt {}: {}", attempt + 1, e);
                    }
                    return Err(e);
                }
                Err(e) if attempt >= self.max_retries => {
                    error!("All {} attempts failed: {}", attempt + 1, e);
                    return Err(e);
                }
                Err(e) => {
                    attempt += 1;
                    let delay = self.delay_for_attempt(attempt);
                    warn!(
                        "Attempt {} failed: {} (retrying in {:?})",
                        attempt, e, delay
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
