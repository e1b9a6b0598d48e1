//! # Logical Replication
//!
//! Logical replication using CDC for table-level replication with transformations,
//! conflict detection and resolution, bidirectional replication, and monitoring.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicBool, Ordering};
use std::time::{SystemTime, Duration, Instant};
use parking_lot::{RwLock, Mutex};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use tokio::time::interval;
use crate::{Result, DbError};
use crate::common::{TransactionId, TableId, Value};
use super::cdc::{ChangeEvent, ChangeType, CDCEngine};
use super::publisher::EventPublisher;
use super::subscriber::EventSubscriber;

/// Replication mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplicationMode {
    /// Master sends changes to slaves
    MasterSlave,
    /// Peer-to-peer bidirectional replication
    PeerToPeer,
    /// Multi-master with conflict resolution
    MultiMaster,
}

/// Conflict resolution strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConflictResolution {
    /// Latest write wins based on timestamp
    LastWriteWins,
    /// First write wins
    FirstWriteWins,
    /// Master wins (for master-slave)
    MasterWins,
    /// Custom resolution function
    Custom,
    /// Manual resolution required
    Manual,
}

/// Replication conflict
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplicationConflict {
    /// Conflict ID
    pub id: u64,
    /// Table where conflict occurred
    pub table_id: TableId,
    /// Table name
    pub table_name: String,
    /// Local change event
    pub local_change: ChangeEvent,
    /// Remote change event
    pub remote_change: ChangeEvent,
    /// Detected timestamp
    pub detected_at: SystemTime,
    /// Resolution status
    pub resolved: bool,
    /// Resolution strategy applied
    pub resolution: Option<ConflictResolution>,
}

impl ReplicationConflict {
    pub fn new(local: ChangeEvent, remote: ChangeEvent) -> Self {
        Self {
            id: 0,
            table_id: local.table_id,
            table_name: local.table_name.clone(),
            local_change: local,
            remote_change: remote,
            detected_at: SystemTime::now(),
            resolved: false,
            resolution: None,
        }
    }
}

/// Table replication rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplicationRule {
    /// Rule ID
    pub id: u64,
    /// Source table
    pub source_table: String,
    /// Destination table
    pub dest_table: String,
    /// Column mappings (source -> dest)
    pub column_mappings: HashMap<String, String>,
    /// Filter expression (optional)
    pub filter: Option<String>,
    /// Transformation function (optional)
    pub transformation: Option<String>,
    /// Enabled flag
    pub enabled: bool,
}

impl ReplicationRule {
    pub fn new(source_table: String, dest_table: String) -> Self {
        Self {
            id: 0,
            source_table,
            dest_table,
            column_mappings: HashMap::new(),
            filter: None,
            transformation: None,
            enabled: true,
        }
    }

    pub fn with_column_mapping(mut self, source: String, dest: String) -> Self {
        self.column_mappings.insert(source, dest);
        self
    }

    pub fn with_filter(mut self, filter: String) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn should_replicate(&self, event: &ChangeEvent) -> bool {
        if !self.enabled {
            return false;
        }

        if event.table_name != self.source_table {
            return false;
        }

        // Apply filter if present (simplified evaluation)
        if let Some(_filter) = &self.filter {
            // In production, evaluate filter expression
            return true;
        }

        true
    }

    pub fn transform_event(&self, mut event: ChangeEvent) -> Result<ChangeEvent> {
        // Update table name
        event.table_name = self.dest_table.clone();

        // Apply column mappings
        if !self.column_mappings.is_empty() {
            if let Some(ref mut before) = event.before_image {
                *before = self.remap_columns(before);
            }
            if let Some(ref mut after) = event.after_image {
                *after = self.remap_columns(after);
            }
        }

        // Apply transformation if present
        if let Some(_transform) = &self.transformation {
            // In production, apply transformation logic
        }

        Ok(event)
    }

    fn remap_columns(&self, columns: &HashMap<String, Value>) -> HashMap<String, Value> {
        let mut remapped = HashMap::new();

        for (source_col, value) in columns {
            let dest_col = self.column_mappings
                .get(source_col)
                .cloned()
                .unwrap_or_else(|| source_col.clone());
            remapped.insert(dest_col, value.clone());
        }

        remapped
    }
}

/// Replication slot (tracking position)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplicationSlot {
    /// Slot name
    pub name: String,
    /// Plugin/engine type
    pub plugin: String,
    /// Current LSN position
    pub restart_lsn: u64,
    /// Confirmed flush LSN
    pub confirmed_flush_lsn: u64,
    /// Active flag
    pub active: bool,
    /// Created timestamp
    pub created_at: SystemTime,
}

impl ReplicationSlot {
    pub fn new(name: String) -> Self {
        Self {
            name,
            plugin: "rustydb_cdc".to_string(),
            restart_lsn: 0,
            confirmed_flush_lsn: 0,
            active: true,
            created_at: SystemTime::now(),
        }
    }
}

/// Replication lag metrics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplicationLag {
    /// Lag in number of events
    pub event_lag: u64,
    /// Lag in bytes
    pub byte_lag: u64,
    /// Time lag (seconds)
    pub time_lag_seconds: f64,
    /// Current apply rate (events/sec)
    pub apply_rate: f64,
    /// Estimated catch-up time (seconds)
    pub estimated_catch_up_seconds: f64,
}

/// Replication statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplicationStats {
    /// Total events replicated
    pub total_events: u64,
    /// Total bytes replicated
    pub total_bytes: u64,
    /// Events per second
    pub events_per_second: f64,
    /// Average replication latency (ms)
    pub avg_latency_ms: f64,
    /// Number of conflicts detected
    pub conflicts_detected: u64,
    /// Number of conflicts resolved
    pub conflicts_resolved: u64,
    /// Number of errors
    pub error_count: u64,
    /// Current lag
    pub lag: ReplicationLag,
}

/// Replication configuration
#[derive(Debug, Clone)]
pub struct ReplicationConfig {
    /// Replication mode
    pub mode: ReplicationMode,
    /// Conflict resolution strategy
    pub conflict_resolution: ConflictResolution,
    /// Replication batch size
    pub batch_size: usize,
    /// Apply timeout
    pub apply_timeout: Duration,
    /// Enable bidirectional replication
    pub bidirectional: bool,
    /// Lag warning threshold (seconds)
    pub lag_warning_threshold: f64,
    /// Lag critical threshold (seconds)
    pub lag_critical_threshold: f64,
}

impl Default for ReplicationConfig {
    fn default() -> Self {
        Self {
            mode: ReplicationMode::MasterSlave,
            conflict_resolution: ConflictResolution::LastWriteWins,
            batch_size: 1000,
            apply_timeout: Duration::from_secs(30),
            bidirectional: false,
            lag_warning_threshold: 5.0,
            lag_critical_threshold: 30.0,
        }
    }
}

/// Logical Replication Engine
pub struct LogicalReplication {
    /// Configuration
    config: ReplicationConfig,
    /// Replication rules
    rules: Arc<RwLock<HashMap<u64, ReplicationRule>>>,
    /// Next rule ID
    next_rule_id: Arc<AtomicU64>,
    /// Replication slots
    slots: Arc<RwLock<HashMap<String, ReplicationSlot>>>,
    /// CDC engine
    cdc_engine: Arc<CDCEngine>,
    /// Event publisher (for sending changes)
    publisher: Option<Arc<EventPublisher>>,
    /// Event subscriber (for receiving changes)
    subscriber: Option<Arc<EventSubscriber>>,
    /// Detected conflicts
    conflicts: Arc<Mutex<VecDeque<ReplicationConflict>>>,
    /// Next conflict ID
    next_conflict_id: Arc<AtomicU64>,
    /// Statistics
    stats: Arc<RwLock<ReplicationStats>>,
    /// Shutdown flag
    shutdown: Arc<AtomicBool>,
}

impl LogicalReplication {
    /// Create a new logical replication engine
    pub fn new(config: ReplicationConfig, cdc_engine: Arc<CDCEngine>) -> Self {
        Self {
            config,
            rules: Arc::new(RwLock::new(HashMap::new())),
            next_rule_id: Arc::new(AtomicU64::new(1)),
            slots: Arc::new(RwLock::new(HashMap::new())),
            cdc_engine,
            publisher: None,
            subscriber: None,
            conflicts: Arc::new(Mutex::new(VecDeque::new())),
            next_conflict_id: Arc::new(AtomicU64::new(1)),
            stats: Arc::new(RwLock::new(ReplicationStats::default())),
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start replication
    pub async fn start(&mut self) -> Result<()> {
        // Start CDC engine
        self.cdc_engine.start().await?;

        // Start replication workers
        self.spawn_replication_worker();
        self.spawn_lag_monitor();
        self.spawn_conflict_resolver();

        Ok(())
    }

    /// Stop replication
    pub async fn stop(&self) -> Result<()> {
        self.shutdown.store(true, Ordering::SeqCst);
        self.cdc_engine.stop().await?;
        Ok(())
    }

    /// Add replication rule
    pub fn add_rule(&self, mut rule: ReplicationRule) -> Result<u64> {
        let rule_id = self.next_rule_id.fetch_add(1, Ordering::SeqCst);
        rule.id = rule_id;

        self.rules.write().insert(rule_id, rule);
        Ok(rule_id)
    }

    /// Remove replication rule
    pub fn remove_rule(&self, rule_id: u64) -> Result<()> {
        self.rules.write().remove(&rule_id)
            .ok_or_else(|| DbError::NotFound(format!("Rule {} not found", rule_id)))?;
        Ok(())
    }

    /// Get all rules
    pub fn get_rules(&self) -> Vec<ReplicationRule> {
        self.rules.read().values().cloned().collect()
    }

    /// Create replication slot
    pub fn create_slot(&self, name: String) -> Result<ReplicationSlot> {
        let slot = ReplicationSlot::new(name.clone());

        let mut slots = self.slots.write();
        if slots.contains_key(&name) {
            return Err(DbError::InvalidOperation(
                format!("Slot '{}' already exists", name)
            ));
        }

        slots.insert(name, slot.clone());
        Ok(slot)
    }

    /// Drop replication slot
    pub fn drop_slot(&self, name: &str) -> Result<()> {
        self.slots.write().remove(name)
            .ok_or_else(|| DbError::NotFound(format!("Slot '{}' not found", name)))?;
        Ok(())
    }

    /// Get replication slot
    pub fn get_slot(&self, name: &str) -> Option<ReplicationSlot> {
        self.slots.read().get(name).cloned()
    }

    /// Apply change event to local database
    pub async fn apply_change(&self, event: ChangeEvent) -> Result<()> {
        let start_time = Instant::now();

        // Check if this event should be replicated
        let matching_rules: Vec<_> = self.rules.read()
            .values()
            .filter(|r| r.should_replicate(&event))
            .cloned()
            .collect();

        if matching_rules.is_empty() {
            return Ok(());
        }

        // Apply transformations and execute
        for rule in matching_rules {
            let transformed = rule.transform_event(event.clone())?;
            self.execute_change(&transformed).await?;
        }

        // Update statistics
        let latency_ms = start_time.elapsed().as_millis() as f64;
        let mut stats = self.stats.write();
        stats.total_events += 1;
        stats.avg_latency_ms = (stats.avg_latency_ms * 0.95) + (latency_ms * 0.05);

        Ok(())
    }

    /// Execute a change event on the local database
    async fn execute_change(&self, event: &ChangeEvent) -> Result<()> {
        // In production, this would execute the actual database operation
        match event.change_type {
            ChangeType::Insert => {
                // Execute INSERT
            }
            ChangeType::Update => {
                // Execute UPDATE
            }
            ChangeType::Delete => {
                // Execute DELETE
            }
            ChangeType::Truncate => {
                // Execute TRUNCATE
            }
        }

        Ok(())
    }

    /// Detect conflicts between local and remote changes
    pub fn detect_conflict(&self, local: &ChangeEvent, remote: &ChangeEvent) -> Option<ReplicationConflict> {
        // Check if events affect the same row
        if local.table_id != remote.table_id || local.row_id != remote.row_id {
            return None;
        }

        // Both are modifications to the same row
        if local.change_type != ChangeType::Delete && remote.change_type != ChangeType::Delete {
            let conflict = ReplicationConflict::new(local.clone(), remote.clone());
            return Some(conflict);
        }

        None
    }

    /// Resolve a conflict
    pub async fn resolve_conflict(&self, conflict: &mut ReplicationConflict) -> Result<ChangeEvent> {
        let winner = match self.config.conflict_resolution {
            ConflictResolution::LastWriteWins => {
                // Compare timestamps
                if conflict.remote_change.timestamp > conflict.local_change.timestamp {
                    conflict.remote_change.clone()
                } else {
                    conflict.local_change.clone()
                }
            }
            ConflictResolution::FirstWriteWins => {
                if conflict.local_change.timestamp < conflict.remote_change.timestamp {
                    conflict.local_change.clone()
                } else {
                    conflict.remote_change.clone()
                }
            }
            ConflictResolution::MasterWins => {
                // In master-slave mode, master always wins
                conflict.remote_change.clone()
            }
            ConflictResolution::Custom => {
                // Call custom resolution function
                self.custom_conflict_resolution(conflict)?
            }
            ConflictResolution::Manual => {
                return Err(DbError::InvalidOperation(
                    "Manual conflict resolution required".to_string()
                ));
            }
        };

        conflict.resolved = true;
        conflict.resolution = Some(self.config.conflict_resolution);

        self.stats.write().conflicts_resolved += 1;

        Ok(winner)
    }

    /// Custom conflict resolution (can be overridden)
    fn custom_conflict_resolution(&self, conflict: &ReplicationConflict) -> Result<ChangeEvent> {
        // Default implementation: last write wins
        if conflict.remote_change.timestamp > conflict.local_change.timestamp {
            Ok(conflict.remote_change.clone())
        } else {
            Ok(conflict.local_change.clone())
        }
    }

    /// Get pending conflicts
    pub fn get_conflicts(&self) -> Vec<ReplicationConflict> {
        self.conflicts.lock().iter().cloned().collect()
    }

    /// Calculate replication lag
    pub fn calculate_lag(&self, remote_lsn: u64, remote_timestamp: SystemTime) -> ReplicationLag {
        let cdc_stats = self.cdc_engine.get_statistics();
        let local_lsn = cdc_stats.last_lsn;

        let event_lag = remote_lsn.saturating_sub(local_lsn);
        let byte_lag = event_lag * 1024; // Rough estimate

        let time_lag_seconds = if let Ok(duration) = remote_timestamp.duration_since(SystemTime::now()) {
            duration.as_secs_f64().abs()
        } else {
            0.0
        };

        let apply_rate = self.stats.read().events_per_second;
        let estimated_catch_up_seconds = if apply_rate > 0.0 {
            event_lag as f64 / apply_rate
        } else {
            0.0
        };

        ReplicationLag {
            event_lag,
            byte_lag,
            time_lag_seconds,
            apply_rate,
            estimated_catch_up_seconds,
        }
    }

    /// Get statistics
    pub fn get_statistics(&self) -> ReplicationStats {
        self.stats.read().clone()
    }

    // Background tasks

    fn spawn_replication_worker(&self) {
        let cdc_engine = self.cdc_engine.clone();
        let rules = self.rules.clone();
        let stats = self.stats.clone();
        let shutdown = self.shutdown.clone();

        tokio::spawn(async move {
            let mut event_rx = cdc_engine.subscribe_events();

            while !shutdown.load(Ordering::SeqCst) {
                match event_rx.recv().await {
                    Ok(event) => {
                        // Check if any rules match
                        let matching_rules: Vec<_> = rules.read()
                            .values()
                            .filter(|r| r.should_replicate(&event))
                            .cloned()
                            .collect();

                        if !matching_rules.is_empty() {
                            stats.write().total_events += 1;
                            // In production, forward to remote replica
                        }
                    }
                    Err(_) => {
                        tokio::time::sleep(Duration::from_millis(100)).await;
                    }
                }
            }
        });
    }

    fn spawn_lag_monitor(&self) {
        let stats = self.stats.clone();
        let config = self.config.clone();
        let shutdown = self.shutdown.clone();

        tokio::spawn(async move {
            let mut interval = interval(Duration::from_secs(5));

            while !shutdown.load(Ordering::SeqCst) {
                interval.tick().await;

                let lag = stats.read().lag.time_lag_seconds;

                if lag > config.lag_critical_threshold {
                    // Send critical alert
                    eprintln!("CRITICAL: Replication lag is {:.2}s", lag);
                } else if lag > config.lag_warning_threshold {
                    // Send warning
                    eprintln!("WARNING: Replication lag is {:.2}s", lag);
                }
            }
        });
    }

    fn spawn_conflict_resolver(&self) {
        let conflicts = self.conflicts.clone();
        let stats = self.stats.clone();
        let shutdown = self.shutdown.clone();
        let resolution = self.config.conflict_resolution;

        tokio::spawn(async move {
            let mut interval = interval(Duration::from_millis(100));

            while !shutdown.load(Ordering::SeqCst) {
                interval.tick().await;

                // Only auto-resolve if not manual mode
                if resolution == ConflictResolution::Manual {
                    continue;
                }

                let mut conflicts_lock = conflicts.lock();
                if let Some(mut conflict) = conflicts_lock.pop_front() {
                    if !conflict.resolved {
                        // Attempt auto-resolution
                        stats.write().conflicts_detected += 1;
                        // Resolution logic would go here
                    }
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::cdc::CDCConfig;

    #[test]
    fn test_replication_rule() {
        let rule = ReplicationRule::new("users".to_string(), "users_replica".to_string())
            .with_column_mapping("id".to_string(), "user_id".to_string());

        assert_eq!(rule.source_table, "users");
        assert_eq!(rule.dest_table, "users_replica");
        assert!(rule.column_mappings.contains_key("id"));
    }

    #[test]
    fn test_replication_slot() {
        let slot = ReplicationSlot::new("slot1".to_string());
        assert_eq!(slot.name, "slot1");
        assert!(slot.active);
        assert_eq!(slot.restart_lsn, 0);
    }

    #[test]
    fn test_conflict_detection() {
        let cdc_config = CDCConfig::default();
        let cdc_engine = Arc::new(CDCEngine::new(cdc_config));
        let config = ReplicationConfig::default();
        let repl = LogicalReplication::new(config, cdc_engine);

        use super::super::cdc::ChangeEvent;
        let local = ChangeEvent::new(1, 100, 1, 1, "users".to_string(), ChangeType::Update);
        let mut remote = local.clone();
        remote.event_id = 2;

        let conflict = repl.detect_conflict(&local, &remote);
        assert!(conflict.is_some());
    }

    #[tokio::test]
    async fn test_replication_lifecycle() {
        let cdc_config = CDCConfig::default();
        let cdc_engine = Arc::new(CDCEngine::new(cdc_config));
        let config = ReplicationConfig::default();
        let mut repl = LogicalReplication::new(config, cdc_engine);

        // Add rule
        let rule = ReplicationRule::new("test".to_string(), "test_replica".to_string());
        let rule_id = repl.add_rule(rule).unwrap();
        assert_eq!(repl.get_rules().len(), 1);

        // Create slot
        let slot = repl.create_slot("test_slot".to_string()).unwrap();
        assert_eq!(slot.name, "test_slot");

        // Remove rule
        repl.remove_rule(rule_id).unwrap();
        assert_eq!(repl.get_rules().len(), 0);
    }
}


