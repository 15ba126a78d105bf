//! Composable error-handling strategies.
//!
//! Strategies are advisory observers: they decide whether to react to a
//! raised error (log it, notify someone, schedule a retry) but never own
//! it. A [`CompositeStrategy`] fans a single error out to every matching
//! child, and a [`StrategyChain`] surfaces wholly-unmatched errors as
//! unhandled.

use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::Rng;

use super::conversions::TendrilError;

/// Severity attached to a raised error at report time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Fatal,
}

/// A raised error plus the context strategies dispatch on.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    /// The classified error
    pub error: TendrilError,
    /// Severity flagged by the raiser
    pub severity: Severity,
    /// When the error was reported
    pub timestamp: DateTime<Utc>,
}

impl ErrorReport {
    /// Report an error at normal severity.
    pub fn new(error: impl Into<TendrilError>) -> Self {
        Self {
            error: error.into(),
            severity: Severity::Error,
            timestamp: Utc::now(),
        }
    }

    /// Report an error flagged as fatal.
    pub fn fatal(error: impl Into<TendrilError>) -> Self {
        Self {
            error: error.into(),
            severity: Severity::Fatal,
            timestamp: Utc::now(),
        }
    }

    /// Stable machine-readable code of the underlying error.
    pub fn code(&self) -> &'static str {
        self.error.code()
    }

    /// Whether the underlying error is a transient condition.
    pub fn is_transient(&self) -> bool {
        self.error.is_transient()
    }
}

/// A policy deciding whether and how to react to a raised error.
#[async_trait]
pub trait ErrorStrategy: Send + Sync {
    /// Whether this strategy wants to react to the report.
    fn should_handle(&self, report: &ErrorReport) -> bool;

    /// React to the report. Purely advisory: the error is not consumed.
    async fn handle(&self, report: &ErrorReport);
}

/// Strategy that records full error detail for every report.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogStrategy;

impl LogStrategy {
    pub fn new() -> Self {
        LogStrategy
    }
}

#[async_trait]
impl ErrorStrategy for LogStrategy {
    fn should_handle(&self, _report: &ErrorReport) -> bool {
        true
    }

    async fn handle(&self, report: &ErrorReport) {
        tracing::error!(
            code = report.code(),
            severity = ?report.severity,
            timestamp = %report.timestamp,
            "{}",
            report.error
        );
    }
}

/// Side-effect sink for fatal-error notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, report: &ErrorReport);
}

/// Strategy that dispatches a notification for fatal errors only.
pub struct NotifyStrategy {
    notifier: Arc<dyn Notifier>,
}

impl NotifyStrategy {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }
}

#[async_trait]
impl ErrorStrategy for NotifyStrategy {
    fn should_handle(&self, report: &ErrorReport) -> bool {
        report.severity == Severity::Fatal
    }

    async fn handle(&self, report: &ErrorReport) {
        tracing::error!(
            code = report.code(),
            severity = ?Severity::Fatal,
            "{}",
            report.error
        );
        self.notifier.notify(report).await;
    }
}

/// Backoff schedule for [`RetryStrategy`].
#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    /// Maximum number of `handle` invocations before giving up
    pub max_retries: u32,
    /// First-attempt backoff delay
    pub base_delay: Duration,
    /// Upper bound on the exponential backoff
    pub max_delay: Duration,
    /// Jitter is drawn uniformly from `0..max_jitter`
    pub max_jitter: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(10_000),
            max_jitter: Duration::from_millis(1000),
        }
    }
}

type RetryOperation = Box<
    dyn Fn() -> Pin<Box<dyn Future<Output = Result<(), TendrilError>> + Send>> + Send + Sync,
>;

/// Strategy that retries transient failures with exponential backoff.
///
/// Stateful: the attempt counter and registered operation persist across
/// `handle` calls for one logical operation. Call [`RetryStrategy::reset`]
/// before reusing the instance for an unrelated error sequence, or create
/// a fresh instance per operation — the strategy is not safe for
/// interleaved independent retry sequences.
pub struct RetryStrategy {
    config: RetryConfig,
    attempts: AtomicU32,
    operation: Mutex<Option<RetryOperation>>,
}

impl RetryStrategy {
    /// Create a retry strategy with the default backoff schedule.
    pub fn new(max_retries: u32) -> Self {
        Self::with_config(RetryConfig {
            max_retries,
            ..RetryConfig::default()
        })
    }

    /// Create a retry strategy with a custom backoff schedule.
    pub fn with_config(config: RetryConfig) -> Self {
        Self {
            config,
            attempts: AtomicU32::new(0),
            operation: Mutex::new(None),
        }
    }

    /// Register the operation to re-invoke after each backoff wait.
    pub fn set_operation<F, Fut>(&self, operation: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), TendrilError>> + Send + 'static,
    {
        let mut slot = self.operation.lock().expect("retry operation lock");
        *slot = Some(Box::new(move || Box::pin(operation())));
    }

    /// Number of `handle` invocations since the last reset.
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Clear the attempt counter and detach the registered operation.
    pub fn reset(&self) {
        self.attempts.store(0, Ordering::SeqCst);
        let mut slot = self.operation.lock().expect("retry operation lock");
        *slot = None;
    }

    fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        let base = self
            .config
            .base_delay
            .saturating_mul(1u32 << exponent)
            .min(self.config.max_delay);
        let jitter_ms = self.config.max_jitter.as_millis() as u64;
        if jitter_ms == 0 {
            return base;
        }
        base + Duration::from_millis(rand::rng().random_range(0..jitter_ms))
    }

    fn take_operation(&self) -> Option<RetryOperation> {
        // Taken out of the slot for the duration of the call so the lock
        // is not held across an await point.
        self.operation.lock().expect("retry operation lock").take()
    }

    fn put_operation(&self, operation: RetryOperation) {
        let mut slot = self.operation.lock().expect("retry operation lock");
        *slot = Some(operation);
    }
}

#[async_trait]
impl ErrorStrategy for RetryStrategy {
    fn should_handle(&self, report: &ErrorReport) -> bool {
        report.is_transient() && self.attempts() < self.config.max_retries
    }

    async fn handle(&self, report: &ErrorReport) {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::warn!(
            code = report.code(),
            attempt,
            max_retries = self.config.max_retries,
            "Retry attempt {}/{}",
            attempt,
            self.config.max_retries
        );

        if attempt >= self.config.max_retries {
            tracing::error!(
                code = report.code(),
                attempt,
                "Retries exhausted: {}",
                report.error
            );
            return;
        }

        let Some(operation) = self.take_operation() else {
            tracing::error!("No operation registered for retry strategy");
            return;
        };

        let delay = self.backoff_delay(attempt);
        tracing::info!(delay_ms = delay.as_millis() as u64, "Waiting before retry");
        tokio::time::sleep(delay).await;

        if let Err(err) = operation().await {
            tracing::warn!(code = err.code(), "Retried operation failed: {}", err);
        }
        self.put_operation(operation);
    }
}

/// Strategy that fans a report out to every matching child.
#[derive(Default)]
pub struct CompositeStrategy {
    strategies: Vec<Arc<dyn ErrorStrategy>>,
}

impl CompositeStrategy {
    pub fn new() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }

    /// Append a child strategy using the builder pattern.
    pub fn with_strategy(mut self, strategy: Arc<dyn ErrorStrategy>) -> Self {
        self.strategies.push(strategy);
        self
    }

    /// Append a child strategy.
    pub fn add_strategy(&mut self, strategy: Arc<dyn ErrorStrategy>) {
        self.strategies.push(strategy);
    }
}

#[async_trait]
impl ErrorStrategy for CompositeStrategy {
    fn should_handle(&self, report: &ErrorReport) -> bool {
        self.strategies.iter().any(|s| s.should_handle(report))
    }

    async fn handle(&self, report: &ErrorReport) {
        // Every matching child reacts, not just the first: one error may
        // be logged, notified, and retried in a single dispatch.
        for strategy in &self.strategies {
            if strategy.should_handle(report) {
                strategy.handle(report).await;
            }
        }
    }
}

/// Entry point routing raised errors through a composite strategy.
#[derive(Default)]
pub struct StrategyChain {
    composite: CompositeStrategy,
}

impl StrategyChain {
    pub fn new() -> Self {
        Self {
            composite: CompositeStrategy::new(),
        }
    }

    /// Append a strategy using the builder pattern.
    pub fn with_strategy(mut self, strategy: Arc<dyn ErrorStrategy>) -> Self {
        self.composite.add_strategy(strategy);
        self
    }

    /// Route a report through the chain.
    ///
    /// Returns `true` if at least one strategy handled it. Unmatched
    /// reports are surfaced as unhandled rather than swallowed.
    pub async fn dispatch(&self, report: &ErrorReport) -> bool {
        if self.composite.should_handle(report) {
            self.composite.handle(report).await;
            true
        } else {
            tracing::error!(
                code = report.code(),
                severity = ?report.severity,
                "Unhandled error: {}",
                report.error
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BackendError;

    fn transient_report() -> ErrorReport {
        ErrorReport::new(BackendError::network("connection reset"))
    }

    fn quick_retry(max_retries: u32) -> RetryStrategy {
        RetryStrategy::with_config(RetryConfig {
            max_retries,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(4),
            max_jitter: Duration::from_millis(1),
        })
    }

    struct CountingStrategy {
        handled: AtomicU32,
    }

    impl CountingStrategy {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                handled: AtomicU32::new(0),
            })
        }
    }

    #[async_trait]
    impl ErrorStrategy for CountingStrategy {
        fn should_handle(&self, _report: &ErrorReport) -> bool {
            true
        }

        async fn handle(&self, _report: &ErrorReport) {
            self.handled.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct CountingNotifier {
        notified: AtomicU32,
    }

    #[async_trait]
    impl Notifier for CountingNotifier {
        async fn notify(&self, _report: &ErrorReport) {
            self.notified.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn log_strategy_handles_everything() {
        let report = ErrorReport::new(BackendError::execution("boom"));
        assert!(LogStrategy::new().should_handle(&report));
    }

    #[test]
    fn notify_strategy_handles_only_fatal() {
        let notifier = Arc::new(CountingNotifier {
            notified: AtomicU32::new(0),
        });
        let strategy = NotifyStrategy::new(notifier);

        assert!(!strategy.should_handle(&transient_report()));
        assert!(strategy.should_handle(&ErrorReport::fatal(BackendError::execution("boom"))));
    }

    #[tokio::test]
    async fn retry_strategy_counts_attempts_and_stops_at_max() {
        let strategy = quick_retry(3);
        let invoked = Arc::new(AtomicU32::new(0));
        let invoked_clone = Arc::clone(&invoked);
        strategy.set_operation(move || {
            let invoked = Arc::clone(&invoked_clone);
            async move {
                invoked.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        });

        let report = transient_report();

        strategy.handle(&report).await;
        assert_eq!(strategy.attempts(), 1);
        strategy.handle(&report).await;
        assert_eq!(strategy.attempts(), 2);

        // Third invocation reaches max_retries: terminal log, no retry.
        strategy.handle(&report).await;
        assert_eq!(strategy.attempts(), 3);
        assert_eq!(invoked.load(Ordering::SeqCst), 2);

        // Counter at max means the strategy no longer volunteers.
        assert!(!strategy.should_handle(&report));
    }

    #[tokio::test]
    async fn retry_strategy_ignores_non_transient_errors() {
        let strategy = quick_retry(3);
        let report = ErrorReport::new(BackendError::execution("bad response"));
        assert!(!strategy.should_handle(&report));
    }

    #[tokio::test]
    async fn retry_reset_clears_state() {
        let strategy = quick_retry(2);
        strategy.set_operation(|| async { Ok(()) });

        strategy.handle(&transient_report()).await;
        assert_eq!(strategy.attempts(), 1);

        strategy.reset();
        assert_eq!(strategy.attempts(), 0);
        assert!(strategy.take_operation().is_none());
    }

    #[tokio::test]
    async fn composite_fans_out_to_all_matching_children() {
        let log_like = CountingStrategy::new();
        let retry = Arc::new(quick_retry(3));
        retry.set_operation(|| async { Ok(()) });

        let composite = CompositeStrategy::new()
            .with_strategy(log_like.clone() as Arc<dyn ErrorStrategy>)
            .with_strategy(retry.clone() as Arc<dyn ErrorStrategy>);

        let report = transient_report();
        assert!(composite.should_handle(&report));
        composite.handle(&report).await;

        assert_eq!(log_like.handled.load(Ordering::SeqCst), 1);
        assert_eq!(retry.attempts(), 1);
    }

    #[tokio::test]
    async fn chain_reports_unmatched_errors_as_unhandled() {
        let retry = Arc::new(quick_retry(3));
        let chain = StrategyChain::new().with_strategy(retry as Arc<dyn ErrorStrategy>);

        // Non-transient error matches no strategy.
        let report = ErrorReport::new(BackendError::execution("bad response"));
        assert!(!chain.dispatch(&report).await);

        let handled = chain.dispatch(&transient_report()).await;
        assert!(handled);
    }
}
