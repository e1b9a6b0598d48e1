// Continuous Queries (CQ)
//
// Implements continuous query processing with incremental view maintenance,
// checkpointing, state management, and query optimization for streaming data.

use super::{Event, Watermark};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use std::time::SystemTime;

/// Continuous Query identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CQId(pub String);

impl CQId {
    pub fn new(id: impl Into<String>) -> Self {
        CQId(id.into())
    }
}

impl fmt::Display for CQId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Continuous Query state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CQState {
    Created,
    Starting,
    Running,
    Paused,
    Stopping,
    Stopped,
    Failed,
}

/// Continuous Query definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContinuousQuery {
    /// Query ID
    pub id: CQId,

    /// Query name
    pub name: String,

    /// Query SQL or expression
    pub query: String,

    /// Source streams
    pub sources: Vec<String>,

    /// Sink configuration
    pub sink: SinkConfig,

    /// Query configuration
    pub config: CQConfig,

    /// Checkpoint configuration
    pub checkpoint: CheckpointConfig,
}

impl ContinuousQuery {
    pub fn new(id: impl Into<String>, name: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            id: CQId::new(id.into()),
            name: name.into(),
            query: query.into(),
            sources: Vec::new(),
            sink: SinkConfig::default(),
            config: CQConfig::default(),
            checkpoint: CheckpointConfig::default(),
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.sources.push(source.into());
        self
    }

    pub fn with_sink(mut self, sink: SinkConfig) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_config(mut self, config: CQConfig) -> Self {
        self.config = config;
        self
    }
}

/// Continuous Query configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CQConfig {
    /// Parallelism level
    pub parallelism: usize,

    /// Buffer size
    pub buffer_size: usize,

    /// Batch size for processing
    pub batch_size: usize,

    /// Enable incremental processing
    pub incremental: bool,

    /// Enable query optimization
    pub optimize: bool,

    /// Materialized view refresh strategy
    pub refresh_strategy: RefreshStrategy,
}

impl Default for CQConfig {
    fn default() -> Self {
        Self {
            parallelism: 1,
            buffer_size: 10000,
            batch_size: 100,
            incremental: true,
            optimize: true,
            refresh_strategy: RefreshStrategy::OnUpdate,
        }
    }
}

/// Materialized view refresh strategy
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum RefreshStrategy {
    /// Refresh on every update (incremental)
    OnUpdate,

    /// Refresh at fixed intervals
    Interval(Duration),

    /// Refresh on demand
    OnDemand,

    /// Refresh on watermark
    OnWatermark,
}

/// Sink configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    pub sink_type: SinkType,
    pub properties: HashMap<String, String>,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            sink_type: SinkType::Memory,
            properties: HashMap::new(),
        }
    }
}

/// Sink type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SinkType {
    Memory,
    Stream(String),
    Table(String),
    File(String),
    Custom(String),
}

/// Checkpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointConfig {
    /// Checkpoint interval
    pub interval: Duration,

    /// Checkpoint directory
    pub directory: String,

    /// Enable incremental checkpoints
    pub incremental: bool,

    /// Number of checkpoints to retain
    pub retain_count: usize,

    /// Checkpoint timeout
    pub timeout: Duration,
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            directory: "/tmp/rustydb/checkpoints".to_string(),
            incremental: true,
            retain_count: 3,
            timeout: Duration::from_secs(300),
        }
    }
}

/// Continuous Query executor
pub struct CQExecutor {
    /// Query definition
    query: Arc<ContinuousQuery>,

    /// Current state
    state: Arc<RwLock<CQState>>,

    /// Execution state
    execution_state: Arc<RwLock<ExecutionState>>,

    /// Materialized view
    materialized_view: Arc<RwLock<MaterializedView>>,

    /// Checkpoint manager
    checkpoint_manager: RwLock<CheckpointManager>,

    /// Query optimizer
    _optimizer: QueryOptimizer,

    /// Metrics
    metrics: Arc<RwLock<CQMetrics>>,
}

impl CQExecutor {
    pub fn new(query: ContinuousQuery) -> Result<Self> {
        let checkpoint_manager = CheckpointManager::new(query.checkpoint.clone())?;

        Ok(Self {
            query: Arc::new(query.clone()),
            state: Arc::new(RwLock::new(CQState::Created)),
            execution_state: Arc::new(RwLock::new(ExecutionState::new())),
            materialized_view: Arc::new(RwLock::new(MaterializedView::new(query.id.clone()))),
            checkpoint_manager: RwLock::new(checkpoint_manager),
            _optimizer: QueryOptimizer::new(query.config.clone()),
            metrics: Arc::new(RwLock::new(CQMetrics::default())),
        })
    }

    /// Start the continuous query
    pub fn start(&self) -> Result<()> {
        let mut state = self.state.write().unwrap();
        *state = CQState::Starting;
        drop(state);

        // Restore from checkpoint if available
        if let Some(checkpoint) = self
            .checkpoint_manager
            .read()
            .unwrap()
            .latest_checkpoint()?
        {
            self.restore_from_checkpoint(checkpoint)?;
        }

        let mut state = self.state.write().unwrap();
        *state = CQState::Running;

        Ok(())
    }

    /// Stop the continuous query
    pub fn stop(&self) -> Result<()> {
        let mut state = self.state.write().unwrap();
        *state = CQState::Stopping;
        drop(state);

        // Create final checkpoint
        self.create_checkpoint()?;

        let mut state = self.state.write().unwrap();
        *state = CQState::Stopped;

        Ok(())
    }

    /// Pause the continuous query
    pub fn pause(&self) -> Result<()> {
        let mut state = self.state.write().unwrap();
        *state = CQState::Paused;
        Ok(())
    }

    /// Resume the continuous query
    pub fn resume(&self) -> Result<()> {
        let mut state = self.state.write().unwrap();
        *state = CQState::Running;
        Ok(())
    }

    /// Process an event
    pub fn process_event(&self, event: Event) -> Result<Vec<Event>> {
        let state = self.state.read().unwrap();
        if *state != CQState::Running {
            return Ok(vec![]);
        }
        drop(state);

        let start = SystemTime::now();

        // Update execution state
        let mut exec_state = self.execution_state.write().unwrap();
        exec_state.add_event(event.clone());
        drop(exec_state);

        // Apply query logic
        let results = self.apply_query_logic(event)?;

        // Update materialized view
        if self.query.config.incremental {
            let mut view = self.materialized_view.write().unwrap();
            for result in &results {
                view.update(result.clone())?;
            }
        }

        // Update metrics
        let mut metrics = self.metrics.write().unwrap();
        metrics.events_processed += 1;
        if let Ok(elapsed) = SystemTime::now().duration_since(start) {
            metrics.record_latency(elapsed);
        }

        // Check if checkpoint is needed
        if self.should_checkpoint() {
            self.create_checkpoint()?;
        }

        Ok(results)
    }

    fn apply_query_logic(&self, event: Event) -> Result<Vec<Event>> {
        // Simplified query execution
        // In a real implementation, this would parse and execute the SQL query
        let mut result = Event::new("query.result");
        result = result.with_source(self.query.name.clone());

        // Copy payload from source event
        for (key, value) in &event.payload {
            result = result.with_payload(key.clone(), value.clone());
        }

        Ok(vec![result])
    }

    fn should_checkpoint(&self) -> bool {
        let exec_state = self.execution_state.read().unwrap();
        if let Ok(elapsed) = SystemTime::now().duration_since(exec_state.last_checkpoint) {
            elapsed >= self.query.checkpoint.interval
        } else {
            false
        }
    }

    /// Create a checkpoint
    pub fn create_checkpoint(&self) -> Result<()> {
        let exec_state = self.execution_state.read().unwrap();
        let view = self.materialized_view.read().unwrap();

        let checkpoint = Checkpoint {
            query_id: self.query.id.clone(),
            version: exec_state.checkpoint_version + 1,
            timestamp: SystemTime::now(),
            execution_state: exec_state.clone(),
            view_snapshot: view.snapshot(),
        };

        self.checkpoint_manager
            .write()
            .unwrap()
            .save_checkpoint(checkpoint)?;

        // Update checkpoint timestamp
        let mut exec_state = self.execution_state.write().unwrap();
        exec_state.last_checkpoint = SystemTime::now();
        exec_state.checkpoint_version += 1;

        Ok(())
    }

    fn restore_from_checkpoint(&self, checkpoint: Checkpoint) -> Result<()> {
        let mut exec_state = self.execution_state.write().unwrap();
        *exec_state = checkpoint.execution_state;

        let mut view = self.materialized_view.write().unwrap();
        view.restore(checkpoint.view_snapshot)?;

        Ok(())
    }

    /// Get the materialized view
    pub fn get_view(&self) -> Vec<Event> {
        let view = self.materialized_view.read().unwrap();
        view.get_all()
    }

    /// Query the materialized view
    pub fn query_view(&self, predicate: impl Fn(&Event) -> bool) -> Vec<Event> {
        let view = self.materialized_view.read().unwrap();
        view.query(predicate)
    }

    /// Get query metrics
    pub fn metrics(&self) -> CQMetrics {
        self.metrics.read().unwrap().clone()
    }

    /// Get current state
    pub fn get_state(&self) -> CQState {
        *self.state.read().unwrap()
    }
}

/// Execution state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionState {
    /// Events processed
    events_processed: u64,

    /// Current watermark
    watermark: Option<Watermark>,

    /// Last checkpoint time
    last_checkpoint: SystemTime,

    /// Checkpoint version
    checkpoint_version: u64,

    /// Buffered events
    buffer: VecDeque<Event>,
}

impl ExecutionState {
    fn new() -> Self {
        Self {
            events_processed: 0,
            watermark: None,
            last_checkpoint: SystemTime::now(),
            checkpoint_version: 0,
            buffer: VecDeque::new(),
        }
    }

    fn add_event(&mut self, event: Event) {
        self.events_processed += 1;
        self.buffer.push_back(event);

        // Limit buffer size
        while self.buffer.len() > 10000 {
            self.buffer.pop_front();
        }
    }
}

/// Materialized view
struct MaterializedView {
    _query_id: CQId,
    data: BTreeMap<u64, Event>,
    _index: HashMap<String, Vec<u64>>, // field -> event IDs
    next_id: u64,
}

impl MaterializedView {
    fn new(query_id: CQId) -> Self {
        Self {
            _query_id: query_id,
            data: BTreeMap::new(),
            _index: HashMap::new(),
            next_id: 0,
        }
    }

    fn update(&mut self, event: Event) -> Result<()> {
        let id = self.next_id;
        self.next_id += 1;

        // Index by payload fields
        for (field, value) in &event.payload {
            if let Some(s) = value.as_str() {
                self._index
                    .entry(format!("{}:{}", field, s))
                    .or_insert_with(Vec::new)
                    .push(id);
            }
        }

        self.data.insert(id, event);
        Ok(())
    }

    fn get_all(&self) -> Vec<Event> {
        self.data.values().cloned().collect()
    }

    fn query(&self, predicate: impl Fn(&Event) -> bool) -> Vec<Event> {
        self.data
            .values()
            .filter(|e| predicate(e))
            .cloned()
            .collect()
    }

    fn snapshot(&self) -> ViewSnapshot {
        ViewSnapshot {
            data: self.data.clone(),
            next_id: self.next_id,
        }
    }

    fn restore(&mut self, snapshot: ViewSnapshot) -> Result<()> {
        self.data = snapshot.data;
        self.next_id = snapshot.next_id;

        // Rebuild index
        self._index.clear();
        for (&id, event) in &self.data {
            for (field, value) in &event.payload {
                if let Some(s) = value.as_str() {
                    self._index
                        .entry(format!("{}:{}", field, s))
                        .or_insert_with(Vec::new)
                        .push(id);
                }
            }
        }

        Ok(())
    }
}

/// View snapshot for checkpointing
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ViewSnapshot {
    data: BTreeMap<u64, Event>,
    next_id: u64,
}

/// Checkpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    query_id: CQId,
    version: u64,
    timestamp: SystemTime,
    execution_state: ExecutionState,
    view_snapshot: ViewSnapshot,
}

/// Checkpoint manager
struct CheckpointManager {
    config: CheckpointConfig,
    checkpoints: BTreeMap<u64, Checkpoint>,
}

impl CheckpointManager {
    fn new(config: CheckpointConfig) -> Result<Self> {
        Ok(Self {
            config,
            checkpoints: BTreeMap::new(),
        })
    }

    fn save_checkpoint(&mut self, checkpoint: Checkpoint) -> Result<()> {
        let version = checkpoint.version;
        self.checkpoints.insert(version, checkpoint);

        // Retain only the configured number of checkpoints
        while self.checkpoints.len() > self.config.retain_count {
            if let Some((&oldest, _)) = self.checkpoints.iter().next() {
                self.checkpoints.remove(&oldest);
            }
        }

        Ok(())
    }

    fn latest_checkpoint(&self) -> Result<Option<Checkpoint>> {
        Ok(self.checkpoints.values().last().cloned())
    }

    #[allow(dead_code)]
    fn get_checkpoint(&self, version: u64) -> Option<&Checkpoint> {
        self.checkpoints.get(&version)
    }
}

/// Query optimizer
struct QueryOptimizer {
    _config: CQConfig,
    optimizations: Vec<OptimizationRule>,
}

impl QueryOptimizer {
    fn new(config: CQConfig) -> Self {
        let mut optimizations = Vec::new();

        if config.optimize {
            optimizations.push(OptimizationRule::FilterPushdown);
            optimizations.push(OptimizationRule::ProjectionPruning);
            optimizations.push(OptimizationRule::PredicatePushdown);
        }

        Self {
            _config: config,
            optimizations,
        }
    }

    #[allow(dead_code)]
    fn optimize(&self, query: &str) -> Result<OptimizedQuery> {
        // Simplified optimization
        // In a real implementation, this would parse and optimize the query plan
        Ok(OptimizedQuery {
            _original: query.to_string(),
            _optimized: query.to_string(),
            _rules_applied: self.optimizations.clone(),
        })
    }
}

/// Optimization rule
#[derive(Debug, Clone, Serialize, Deserialize)]
enum OptimizationRule {
    FilterPushdown,
    ProjectionPruning,
    PredicatePushdown,
    JoinReordering,
    AggregationPushdown,
}

/// Optimized query
#[derive(Debug, Clone)]
struct OptimizedQuery {
    _original: String,
    _optimized: String,
    _rules_applied: Vec<OptimizationRule>,
}

/// Continuous Query metrics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CQMetrics {
    /// Total events processed
    pub events_processed: u64,

    /// Events per second
    pub throughput: f64,

    /// Average latency in milliseconds
    pub avg_latency_ms: f64,

    /// P95 latency in milliseconds
    pub p95_latency_ms: f64,

    /// P99 latency in milliseconds
    pub p99_latency_ms: f64,

    /// Checkpoint count
    pub checkpoint_count: u64,

    /// Last checkpoint time
    pub last_checkpoint: Option<SystemTime>,

    /// View size
    pub view_size: usize,
}

impl CQMetrics {
    fn record_latency(&mut self, latency: Duration) {
        let latency_ms = latency.as_millis() as f64;
        // Simplified: in production, use a proper histogram
        self.avg_latency_ms = (self.avg_latency_ms * 0.9) + (latency_ms * 0.1);
        self.p95_latency_ms = self.p95_latency_ms.max(latency_ms);
        self.p99_latency_ms = self.p99_latency_ms.max(latency_ms);
    }
}

/// Continuous Query manager
pub struct CQManager {
    queries: Arc<RwLock<HashMap<CQId, Arc<CQExecutor>>>>,
}

impl CQManager {
    pub fn new() -> Self {
        Self {
            queries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register a continuous query
    pub fn register_query(&self, query: ContinuousQuery) -> Result<CQId> {
        let executor = Arc::new(CQExecutor::new(query.clone())?);

        let mut queries = self.queries.write().unwrap();
        queries.insert(query.id.clone(), executor);

        Ok(query.id)
    }

    /// Start a continuous query
    pub fn start_query(&self, id: &CQId) -> Result<()> {
        let queries = self.queries.read().unwrap();
        if let Some(executor) = queries.get(id) {
            executor.start()?;
        }
        Ok(())
    }

    /// Stop a continuous query
    pub fn stop_query(&self, id: &CQId) -> Result<()> {
        let queries = self.queries.read().unwrap();
        if let Some(executor) = queries.get(id) {
            executor.stop()?;
        }
        Ok(())
    }

    /// Get query executor
    pub fn get_executor(&self, id: &CQId) -> Option<Arc<CQExecutor>> {
        let queries = self.queries.read().unwrap();
        queries.get(id).cloned()
    }

    /// List all queries
    pub fn list_queries(&self) -> Vec<CQId> {
        let queries = self.queries.read().unwrap();
        queries.keys().cloned().collect()
    }

    /// Remove a query
    pub fn remove_query(&self, id: &CQId) -> Result<()> {
        let mut queries = self.queries.write().unwrap();
        queries.remove(id);
        Ok(())
    }
}

impl Default for CQManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_continuous_query_creation() {
        let cq = ContinuousQuery::new("cq1", "test_query", "SELECT * FROM events")
            .with_source("stream1");

        assert_eq!(cq.id.0, "cq1");
        assert_eq!(cq.sources.len(), 1);
    }

    #[test]
    fn test_cq_executor() {
        let cq = ContinuousQuery::new("cq1", "test_query", "SELECT * FROM events");
        let executor = CQExecutor::new(cq).unwrap();

        executor.start().unwrap();
        assert_eq!(executor.get_state(), CQState::Running);

        let event = Event::new("test").with_payload("value", 42i64);
        let results = executor.process_event(event).unwrap();

        assert!(!results.is_empty());

        executor.stop().unwrap();
        assert_eq!(executor.get_state(), CQState::Stopped);
    }

    #[test]
    fn test_cq_manager() {
        let manager = CQManager::new();

        let cq = ContinuousQuery::new("cq1", "test_query", "SELECT * FROM events");
        let id = manager.register_query(cq).unwrap();

        manager.start_query(&id).unwrap();

        let executor = manager.get_executor(&id).unwrap();
        assert_eq!(executor.get_state(), CQState::Running);

        manager.stop_query(&id).unwrap();
    }

    #[test]
    fn test_materialized_view() {
        let mut view = MaterializedView::new(CQId::new("test"));

        let event1 = Event::new("test").with_payload("id", "123");
        let event2 = Event::new("test").with_payload("id", "456");

        view.update(event1).unwrap();
        view.update(event2).unwrap();

        assert_eq!(view.get_all().len(), 2);

        let filtered = view.query(|e| {
            e.get_payload("id")
                .and_then(|v| v.as_str())
                .map(|s| s == "123")
                .unwrap_or(false)
        });

        assert_eq!(filtered.len(), 1);
    }

    #[test]
    fn test_checkpoint() {
        let cq = ContinuousQuery::new("cq1", "test_query", "SELECT * FROM events");
        let executor = CQExecutor::new(cq).unwrap();

        executor.start().unwrap();

        let event = Event::new("test").with_payload("value", 42i64);
        executor.process_event(event).unwrap();

        executor.create_checkpoint().unwrap();

        let metrics = executor.metrics();
        assert!(metrics.events_processed > 0);
    }
}
