// Flow Control Module
//
// Network flow control, rate limiting, circuit breaking, and connection pooling
//
// TODO: CONSOLIDATION NEEDED - RateLimiter Implementation #5 of 6
// See src/api/rest/types.rs for full consolidation analysis.
// RECOMMENDATION: Migrate rate limiting logic to unified src/common/rate_limiter.rs
// Keep protocol-specific flow control features separate.
// See: diagrams/06_network_api_flow.md - Issue #4.2

use std::collections::HashMap;

// ============================================================================
// Flow Control
// ============================================================================

pub struct FlowControlManager {
    window_size: usize,
    permits_issued: u64,
    permits_returned: u64,
}

impl FlowControlManager {
    pub fn new(window_size: usize) -> Self {
        Self {
            window_size,
            permits_issued: 0,
            permits_returned: 0,
        }
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn set_window_size(&mut self, size: usize) {
        self.window_size = size;
    }

    pub fn available_permits(&self) -> usize {
        let outstanding = self.permits_issued.saturating_sub(self.permits_returned) as usize;
        self.window_size.saturating_sub(outstanding)
    }

    pub fn acquire_permit(&mut self) -> Option<FlowControlPermit> {
        if self.available_permits() > 0 {
            self.permits_issued += 1;
            Some(FlowControlPermit)
        } else {
            None
        }
    }

    pub fn return_permit(&mut self, _permit: FlowControlPermit) {
        self.permits_returned += 1;
    }

    pub fn stats(&self) -> FlowControlStats {
        FlowControlStats {
            permits_issued: self.permits_issued,
            permits_returned: self.permits_returned,
        }
    }
}

pub struct FlowControlPermit;

#[derive(Debug, Clone)]
pub struct FlowControlStats {
    pub permits_issued: u64,
    pub permits_returned: u64,
}

// ============================================================================
// Circuit Breaker
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

pub struct CircuitBreaker {
    state: CircuitState,
    failures: u64,
    successes: u64,
    failure_threshold: u64,
    success_threshold: u64,
}

impl CircuitBreaker {
    pub fn new() -> Self {
        Self::with_thresholds(5, 2)
    }

    pub fn with_thresholds(failure_threshold: u64, success_threshold: u64) -> Self {
        Self {
            state: CircuitState::Closed,
            failures: 0,
            successes: 0,
            failure_threshold,
            success_threshold,
        }
    }

    pub fn state(&self) -> CircuitState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == CircuitState::Open
    }

    pub fn record_success(&mut self) {
        self.successes += 1;
        self.failures = 0;

        match self.state {
            CircuitState::HalfOpen => {
                if self.successes >= self.success_threshold {
                    self.state = CircuitState::Closed;
                    self.successes = 0;
                }
            }
            _ => {}
        }
    }

    pub fn record_failure(&mut self) {
        self.failures += 1;
        self.successes = 0;

        if self.failures >= self.failure_threshold {
            self.state = CircuitState::Open;
        }
    }

    pub fn attempt_reset(&mut self) {
        if self.state == CircuitState::Open {
            self.state = CircuitState::HalfOpen;
            self.failures = 0;
            self.successes = 0;
        }
    }

    pub fn stats(&self) -> CircuitBreakerStats {
        CircuitBreakerStats {
            state: self.state,
            failures: self.failures,
        }
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct CircuitBreakerStats {
    pub state: CircuitState,
    pub failures: u64,
}

// ============================================================================
// Rate Limiter
// ============================================================================

pub struct RateLimiter {
    rate: u64,
    requests_allowed: u64,
    requests_denied: u64,
}

impl RateLimiter {
    pub fn new(rate: u64) -> Self {
        Self {
            rate,
            requests_allowed: 0,
            requests_denied: 0,
        }
    }

    pub fn rate(&self) -> u64 {
        self.rate
    }

    pub fn set_rate(&mut self, rate: u64) {
        self.rate = rate;
    }

    pub fn check_rate(&mut self) -> bool {
        // Simplified rate limiting - in production would use token bucket or leaky bucket
        if self.requests_allowed < self.rate {
            self.requests_allowed += 1;
            true
        } else {
            self.requests_denied += 1;
            false
        }
    }

    pub fn reset(&mut self) {
        self.requests_allowed = 0;
    }

    pub fn stats(&self) -> RateLimiterStats {
        RateLimiterStats {
            requests_allowed: self.requests_allowed,
            requests_denied: self.requests_denied,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RateLimiterStats {
    pub requests_allowed: u64,
    pub requests_denied: u64,
}

// ============================================================================
// Connection Pool
// ============================================================================

// TODO: CONSOLIDATION NEEDED - ConnectionPool Implementation #3 of 4
// This ConnectionPool duplicates connection pooling logic from src/pool/connection_pool.rs.
// RECOMMENDATION: Either delegate to main pool or implement ConnectionPool<T> trait.
// See src/pool/connection_pool.rs for full consolidation analysis.
// See: diagrams/06_network_api_flow.md - Issue #4.3

pub struct ConnectionPool {
    max_connections: usize,
    active_connections: usize,
    idle_connections: usize,
    total_checkouts: u64,
    total_returns: u64,
}

impl ConnectionPool {
    pub fn new(max_connections: usize) -> Self {
        Self {
            max_connections,
            active_connections: 0,
            idle_connections: 0,
            total_checkouts: 0,
            total_returns: 0,
        }
    }

    pub fn checkout(&mut self) -> Option<PooledConnection> {
        if self.idle_connections > 0 {
            self.idle_connections -= 1;
            self.active_connections += 1;
            self.total_checkouts += 1;
            Some(PooledConnection)
        } else if self.active_connections < self.max_connections {
            self.active_connections += 1;
            self.total_checkouts += 1;
            Some(PooledConnection)
        } else {
            None
        }
    }

    pub fn checkin(&mut self, _connection: PooledConnection) {
        if self.active_connections > 0 {
            self.active_connections -= 1;
            self.idle_connections += 1;
            self.total_returns += 1;
        }
    }

    pub fn stats(&self) -> ConnectionPoolStats {
        ConnectionPoolStats {
            active: self.active_connections,
            idle: self.idle_connections,
        }
    }

    pub fn metrics(&self) -> PoolMetrics {
        PoolMetrics {
            total_checkouts: self.total_checkouts,
            total_returns: self.total_returns,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConnectionPoolStats {
    pub active: usize,
    pub idle: usize,
}

#[derive(Debug, Clone)]
pub struct PoolMetrics {
    pub total_checkouts: u64,
    pub total_returns: u64,
}

pub struct PooledConnection;

// ============================================================================
// Load Balancer
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadBalancingStrategy {
    RoundRobin,
    LeastConnections,
    Random,
}

pub struct ProtocolLoadBalancer {
    strategy: LoadBalancingStrategy,
    backends: Vec<BackendNode>,
    current_index: usize,
    total_requests: u64,
}

impl ProtocolLoadBalancer {
    pub fn new(strategy: LoadBalancingStrategy) -> Self {
        Self {
            strategy,
            backends: Vec::new(),
            current_index: 0,
            total_requests: 0,
        }
    }

    pub fn add_backend(&mut self, node: BackendNode) {
        self.backends.push(node);
    }

    pub fn remove_backend(&mut self, node_id: &str) -> Option<BackendNode> {
        if let Some(pos) = self.backends.iter().position(|n| n.id == node_id) {
            Some(self.backends.remove(pos))
        } else {
            None
        }
    }

    pub fn select_backend(&mut self) -> Option<&BackendNode> {
        if self.backends.is_empty() {
            return None;
        }

        self.total_requests += 1;

        match self.strategy {
            LoadBalancingStrategy::RoundRobin => {
                let node = &self.backends[self.current_index];
                self.current_index = (self.current_index + 1) % self.backends.len();
                Some(node)
            }
            LoadBalancingStrategy::LeastConnections => {
                // Simplified - would track per-backend connection counts in production
                self.backends.first()
            }
            LoadBalancingStrategy::Random => {
                use std::collections::hash_map::RandomState;
                use std::hash::{BuildHasher, Hash, Hasher};

                let mut hasher = RandomState::new().build_hasher();
                self.total_requests.hash(&mut hasher);
                let index = (hasher.finish() as usize) % self.backends.len();
                Some(&self.backends[index])
            }
        }
    }

    pub fn stats(&self) -> LoadBalancerStats {
        LoadBalancerStats {
            total_requests: self.total_requests,
            backend_count: self.backends.len(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BackendNode {
    pub id: String,
    pub address: String,
}

#[derive(Debug, Clone)]
pub struct LoadBalancerStats {
    pub total_requests: u64,
    pub backend_count: usize,
}

// ============================================================================
// Metrics Aggregator
// ============================================================================

pub struct ProtocolMetricsAggregator {
    total_requests: u64,
    total_errors: u64,
}

impl ProtocolMetricsAggregator {
    pub fn new() -> Self {
        Self {
            total_requests: 0,
            total_errors: 0,
        }
    }

    pub fn record_request(&mut self) {
        self.total_requests += 1;
    }

    pub fn record_error(&mut self) {
        self.total_errors += 1;
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            timestamp: std::time::SystemTime::now(),
        }
    }

    pub fn aggregate_stats(&self) -> AggregateStats {
        AggregateStats {
            total_requests: self.total_requests,
            total_errors: self.total_errors,
        }
    }
}

impl Default for ProtocolMetricsAggregator {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub timestamp: std::time::SystemTime,
}

#[derive(Debug, Clone)]
pub struct AggregateStats {
    pub total_requests: u64,
    pub total_errors: u64,
}
