// Enterprise Transaction Management Module
// Provides MVCC, distributed transactions, WAL, lock management, and ARIES recovery

// Sub-modules for enterprise transaction features
use std::collections::HashSet;
use std::collections::BTreeMap;
use std::collections::VecDeque;
pub mod mvcc;
pub mod distributed;
pub mod wal;
pub mod locks;
pub mod recovery;
pub mod occ;

use std::collections::{HashMap};
use std::path::{Path, PathBuf};
use std::fs::{File, OpenOptions};
use std::io::{Write};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use serde::{Deserialize, Serialize};
use crate::error::Result;
use crate::common::{TransactionId, LogSequenceNumber};

/// Isolation level for transactions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IsolationLevel {
    ReadUncommitted,
    ReadCommitted,
    RepeatableRead,
    Serializable,
    SnapshotIsolation,
}

impl Default for IsolationLevel {
    fn default() -> Self {
        IsolationLevel::ReadCommitted
    }
}

/// Transaction state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionState {
    Active,
    Growing,
    Shrinking,
    Preparing,  // For 2PC
    Prepared,   // For 2PC
    Committing,
    Committed,
    Aborting,
    Aborted,
    Unknown,
}

/// Lock mode with fine-grained control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LockMode {
    Shared,              // S - Read lock
    Exclusive,           // X - Write lock
    IntentShared,        // IS - Intent to acquire S locks
    IntentExclusive,     // IX - Intent to acquire X locks
    SharedIntentExclusive, // SIX - S lock with intent for X locks
    Update,              // U - Upgrade lock (prevents deadlocks)
}

impl LockMode {
    /// Check if two lock modes are compatible
    pub fn is_compatible(&self, other: &LockMode) -> bool {
        use LockMode::*;
        matches!(
            (self, other),
            (Shared, Shared)
            | (Shared, IntentShared)
            | (IntentShared, Shared)
            | (IntentShared, IntentShared)
            | (IntentShared, IntentExclusive)
            | (IntentExclusive, IntentShared)
        )
    }
    
    /// Get the strength/priority of the lock
    pub fn strength(&self) -> u8 {
        match self {
            Shared => 1,
            IntentShared => 2,
            Update => 3,
            IntentExclusive => 4,
            SharedIntentExclusive => 5,
            Exclusive => 6,
        }
    }
}

/// Lock granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LockGranularity {
    Row,
    Page,
    Table,
    Database,
}

/// Version information for MVCC
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Version {
    pub txn_id: TransactionId,
    pub timestamp: SystemTime,
    pub lsn: LogSequenceNumber,
    pub data: Vec<u8>,
    pub is_deleted: bool,
}

/// Savepoint for partial rollback
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Savepoint {
    pub id: u64,
    pub name: String,
    pub txn_id: TransactionId,
    pub lsn: LogSequenceNumber,
    pub timestamp: SystemTime,
}

/// Transaction metadata with comprehensive tracking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub state: TransactionState,
    pub isolation_level: IsolationLevel,
    pub start_time: SystemTime,
    pub last_activity: SystemTime,
    pub held_locks: HashSet<String>,
    pub read_set: HashSet<String>,
    pub write_set: HashSet<String>,
    pub start_lsn: LogSequenceNumber,
    pub end_lsn: Option<LogSequenceNumber>,
    pub savepoints: Vec<Savepoint>,
    pub is_readonly: bool,
    pub timeout_duration: Option<Duration>,
    pub parent_txn: Option<TransactionId>,  // For nested transactions
}

impl Transaction {
    pub fn new(id: TransactionId, isolation_level: IsolationLevel) -> Self {
        let now = SystemTime::now();
        Self {
            id,
            state: TransactionState::Active,
            isolation_level,
            start_time: now,
            last_activity: now,
            held_locks: HashSet::new(),
            read_set: HashSet::new(),
            write_set: HashSet::new(),
            start_lsn: 0,
            end_lsn: None,
            savepoints: Vec::new(),
            is_readonly: false,
            timeout_duration: None,
            parent_txn: None,
        }
    }
    
    pub fn is_timed_out(&self) -> bool {
        if let Some(timeout) = self.timeout_duration {
            if let Ok(elapsed) = SystemTime::now().duration_since(self.last_activity) {
                return elapsed > timeout;
            }
        }
        false
    }
    
    pub fn update_activity(&mut self) {
        self.last_activity = SystemTime::now();
    }
    
    pub fn add_savepoint(&mut self, name: String, lsn: LogSequenceNumber) -> Savepoint {
        let sp = Savepoint {
            id: self.savepoints.len() as u64,
            name,
            txn_id: self.id,
            lsn,
            timestamp: SystemTime::now(),
        };
        self.savepoints.push(sp.clone());
        sp
    }
    
    pub fn get_savepoint(&self, name: &str) -> Option<&Savepoint> {
        self.savepoints.iter().find(|sp| sp.name == name)
    }
}

/// Write-Ahead Log (WAL) entry types
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum WALEntry {
    Begin { txn_id: TransactionId, isolation_level: IsolationLevel, timestamp: SystemTime },
    Commit { txn_id: TransactionId, lsn: LogSequenceNumber, timestamp: SystemTime },
    Abort { txn_id: TransactionId, lsn: LogSequenceNumber, timestamp: SystemTime },
    Insert { txn_id: TransactionId, table: String, key: String, value: Vec<u8>, lsn: LogSequenceNumber },
    Update { txn_id: TransactionId, table: String, key: String, old_value: Vec<u8>, new_value: Vec<u8>, lsn: LogSequenceNumber },
    Delete { txn_id: TransactionId, table: String, key: String, value: Vec<u8>, lsn: LogSequenceNumber },
    Checkpoint { lsn: LogSequenceNumber, active_txns: Vec<TransactionId>, timestamp: SystemTime },
    Savepoint { txn_id: TransactionId, name: String, lsn: LogSequenceNumber },
    RollbackToSavepoint { txn_id: TransactionId, savepoint_name: String, lsn: LogSequenceNumber },
}

/// Write-Ahead Log Manager
pub struct WALManager {
    log_path: PathBuf,
    current_lsn: Arc<Mutex<LogSequenceNumber>>,
    log_buffer: Arc<Mutex<VecDeque<WALEntry>>>,
    buffer_size: usize,
    sync_on_commit: bool,
}

impl WALManager {
    pub fn new(log_path: PathBuf, buffer_size: usize, sync_on_commit: bool) -> Result<Self> {
        std::fs::create_dir_all(log_path.parent().unwrap_or(Path::new(".")))?;
        
        Ok(Self {
            log_path,
            current_lsn: Arc::new(Mutex::new(1)),
            log_buffer: Arc::new(Mutex::new(VecDeque::new())),
            buffer_size,
            sync_on_commit,
        })
    }
    
    pub fn append(&self, entry: WALEntry) -> Result<LogSequenceNumber> {
        let lsn = {
            let mut current_lsn = self.current_lsn.lock();
            let lsn = *current_lsn;
            *current_lsn += 1;
            lsn
        };
        
        let mut buffer = self.log_buffer.lock();
        buffer.push_back(entry);
        
        if buffer.len() >= self.buffer_size {
            self.flush_internal(&mut buffer)?;
        }
        
        Ok(lsn)
    }
    
    pub fn flush(&self) -> Result<()> {
        let mut buffer = self.log_buffer.lock();
        self.flush_internal(&mut buffer)
    }
    
    fn flush_internal(&self, buffer: &mut VecDeque<WALEntry>) -> Result<()> {
        if buffer.is_empty() {
            return Ok(());
        }
        
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)?;
        
        for entry in buffer.drain(..) {
            let serialized = serde_json::to_vec(&entry)
                .map_err(|e| DbError::Serialization(e.to_string()))?;
            
            // Write length prefix
            file.write_all(&(serialized.len() as u32).to_le_bytes())?;
            // Write entry
            file.write_all(&serialized)?;
        }
        
        if self.sync_on_commit {
            file.sync_all()?;
        }
        
        Ok(())
    }
    
    pub fn replay(&self) -> Result<Vec<WALEntry>> {
        let mut entries = Vec::new();
        
        if !self.log_path.exists() {
            return Ok(entries);
        }
        
        let mut file = File::open(&self.log_path)?;
        let mut length_buf = [0u8; 4];
        
        loop {
            // Read length prefix
            match file.read_exact(&mut length_buf) {
                Ok(_) => {}
                Err(ref e) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
                Err(e) => return Err(e.into()),
            }
            
            let length = u32::from_le_bytes(length_buf) as usize;
            let mut entry_buf = vec![0u8; length];
            
            file.read_exact(&mut entry_buf)?;
            
            let entry: WALEntry = serde_json::from_slice(&entry_buf)
                .map_err(|e| DbError::Serialization(e.to_string()))?;
            
            entries.push(entry);
        }
        
        Ok(entries)
    }
    
    pub fn truncate(&self, before_lsn: LogSequenceNumber) -> Result<()> {
        // In production, would create a new log file and copy entries >= before_lsn
        Ok(())
    }
    
    pub fn get_current_lsn(&self) -> LogSequenceNumber {
        *self.current_lsn.lock()
    }
}

/// MVCC Version Store
pub struct VersionStore {
    versions: Arc<RwLock<HashMap<String, Vec<Version>>>>,
    garbage_collector: Arc<Mutex<GarbageCollector>>,
}

impl VersionStore {
    pub fn new() -> Self {
        Self {
            versions: Arc::new(RwLock::new(HashMap::new())),
            garbage_collector: Arc::new(Mutex::new(GarbageCollector::new())),
        }
    }
    
    pub fn add_version(&self, key: String, version: Version) {
        let mut versions = self.versions.write();
        versions.entry(key).or_insert_with(Vec::new).push(version);
    }
    
    pub fn get_version(&self, key: &str, txn_id: TransactionId, snapshot_ts: SystemTime) -> Option<Version> {
        let versions = self.versions.read();
        
        if let Some(version_list) = versions.get(key) {
            // Find the latest version visible to this transaction
            for version in version_list.iter().rev() {
                if version.timestamp <= snapshot_ts && version.txn_id != txn_id {
                    if !version.is_deleted {
                        return Some(version.clone());
                    }
                }
            }
        }
        
        None
    }
    
    pub fn get_all_versions(&self, key: &str) -> Vec<Version> {
        let versions = self.versions.read();
        versions.get(key).cloned().unwrap_or_default()
    }
    
    pub fn cleanup(&self, min_active_txn: TransactionId) {
        let mut gc = self.garbage_collector.lock();
        gc.collect(&self.versions, min_active_txn);
    }
}

impl Default for VersionStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Garbage collector for old versions
struct GarbageCollector {
    last_cleanup: SystemTime,
    cleanup_interval: Duration,
}

impl GarbageCollector {
    fn new() -> Self {
        Self {
            last_cleanup: SystemTime::now(),
            cleanup_interval: Duration::from_secs(60),
        }
    }
    
    fn collect(&mut self, versions: &Arc<RwLock<HashMap<String, Vec<Version>>>>, min_active_txn: TransactionId) {
        let now = SystemTime::now();
        if now.duration_since(self.last_cleanup).unwrap_or(Duration::from_secs(0)) < self.cleanup_interval {
            return;
        }
        
        let mut versions_map = versions.write();
        
        for version_list in versions_map.values_mut() {
            version_list.retain(|v| v.txn_id >= min_active_txn);
        }
        
        versions_map.retain(|_, v| !v.is_empty());
        
        self.last_cleanup = now;
    }
}

/// Deadlock detector using wait-for graph
pub struct DeadlockDetector {
    wait_for_graph: Arc<RwLock<HashMap<TransactionId<TransactionId>>>>,
    detection_interval: Duration,
    last_detection: Arc<Mutex<SystemTime>>,
}

impl DeadlockDetector {
    pub fn new(detection_interval: Duration) -> Self {
        Self {
            wait_for_graph: Arc::new(RwLock::new(HashMap::new())),
            detection_interval,
            last_detection: Arc::new(Mutex::new(SystemTime::now())),
        }
    }
    
    pub fn add_wait(&self, waiting_txn: TransactionId, holding_txn: TransactionId) {
        let mut graph = self.wait_for_graph.write();
        graph.entry(waiting_txn).or_insert_with(HashSet::new).insert(holding_txn);
    }
    
    pub fn remove_wait(&self, waiting_txn: TransactionId) {
        let mut graph = self.wait_for_graph.write();
        graph.remove(&waiting_txn);
    }
    
    pub fn detect_deadlock(&self) -> Option<Vec<TransactionId>> {
        let now = SystemTime::now();
        let mut last_detection = self.last_detection.lock();
        
        if now.duration_since(*last_detection).unwrap_or(Duration::from_secs(0)) < self.detection_interval {
            return None;
        }
        
        *last_detection = now;
        drop(last_detection);
        
        let graph = self.wait_for_graph.read();
        
        // Use DFS to detect cycles
        for txn_id in graph.keys() {
            let mut visited = HashSet::new();
            let mut path = Vec::new();
            
            if self.has_cycle(*txn_id, &graph, &mut visited, &mut path) {
                return Some(path);
            }
        }
        
        None
    }
    
    fn has_cycle(
        &self,
        txn_id: TransactionId,
        graph: &HashMap<TransactionId<TransactionId>>,
        visited: &mut HashSet<TransactionId>,
        path: &mut Vec<TransactionId>,
    ) -> bool {
        if path.contains(&txn_id) {
            path.push(txn_id);
            return true;
        }
        
        if visited.contains(&txn_id) {
            return false;
        }
        
        visited.insert(txn_id);
        path.push(txn_id);
        
        if let Some(waiting_for) = graph.get(&txn_id) {
            for &next_txn in waiting_for {
                if self.has_cycle(next_txn, graph, visited, path) {
                    return true;
                }
            }
        }
        
        path.pop();
        false
    }
    
    pub fn select_victim(&self, cycle: &[TransactionId]) -> TransactionId {
        // Simple victim selection: choose the youngest transaction
        *cycle.iter().max().unwrap_or(&cycle[0])
    }
}

impl Default for DeadlockDetector {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

/// Lock request for queuing
#[derive(Debug, Clone)]
struct LockRequest {
    txn_id: TransactionId,
    mode: LockMode,
    timestamp: SystemTime,
}

/// Lock table entry with queue
#[derive(Debug, Clone)]
struct LockTableEntry {
    holders: Vec<(TransactionId, LockMode)>,
    waiters: VecDeque<LockRequest>,
}

impl LockTableEntry {
    fn new() -> Self {
        Self {
            holders: Vec::new(),
            waiters: VecDeque::new(),
        }
    }
    
    fn is_compatible(&self, mode: &LockMode) -> bool {
        for (_, holder_mode) in &self.holders {
            if !mode.is_compatible(holder_mode) {
                return false;
            }
        }
        true
    }
}

/// Lock manager implementing two-phase locking (2PL)
pub struct LockManager {
    lock_table: Arc<RwLock<HashMap<String, Vec<(TransactionId, LockMode)>>>>,
    txn_locks: Arc<RwLock<HashMap<TransactionId<String>>>>,
}

impl LockManager {
    pub fn new() -> Self {
        Self {
            lock_table: Arc::new(RwLock::new(HashMap::new())),
            txn_locks: Arc::new(RwLock::new(HashMap::new())),
        }
    }
    
    pub fn acquire_lock(
        &self,
        txn_id: TransactionId,
        resource: String,
        mode: LockMode,
    ) -> Result<()> {
        let mut lock_table = self.lock_table.write();
        let mut txn_locks = self.txn_locks.write();
        
        let holders = lock_table.entry(resource.clone()).or_insert_with(Vec::new);
        
        // Check for conflicts
        for &(holder_id, holder_mode) in holders.iter() {
            if holder_id != txn_id {
                // Conflict detection
                if mode == LockMode::Exclusive || holder_mode == LockMode::Exclusive {
                    return Err(DbError::LockTimeout);
                }
            }
        }
        
        // Grant lock
        holders.push((txn_id, mode));
        txn_locks.entry(txn_id).or_insert_with(HashSet::new).insert(resource);
        
        Ok(())
    }
    
    pub fn release_lock(&self, txnid: TransactionId, resource: &str) -> Result<()> {
        let mut lock_table = self.lock_table.write();
        let mut txn_locks = self.txn_locks.write();
        
        if let Some(holders) = lock_table.get_mut(resource) {
            holders.retain(|(id, _)| *id != txn_id);
        }
        
        if let Some(locks) = txn_locks.get_mut(&txn_id) {
            locks.remove(resource);
        }
        
        Ok(())
    }
    
    pub fn release_all_locks(&self, txn_id: TransactionId) -> Result<()> {
        // Get all locks for this transaction
        let resources: Vec<String> = {
            let txn_locks = self.txn_locks.read();
            if let Some(locks) = txn_locks.get(&txn_id) {
                locks.iter().cloned().collect()
            } else {
                return Ok(());
            }
        };
        
        // Release each lock
        for resource in resources {
            self.release_lock(txn_id, &resource)?;
        }
        
        // Remove transaction entry
        self.txn_locks.write().remove(&txn_id);
        
        Ok(())
    }
}

impl Default for LockManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Transaction manager
pub struct TransactionManager {
    next_txn_id: Arc<Mutex<TransactionId>>,
    active_txns: Arc<RwLock<HashMap<TransactionId, Transaction>>>,
    lock_manager: Arc<LockManager>,
}

impl TransactionManager {
    pub fn new() -> Self {
        Self {
            next_txn_id: Arc::new(Mutex::new(0)),
            active_txns: Arc::new(RwLock::new(HashMap::new())),
            lock_manager: Arc::new(LockManager::new()),
        }
    }
    
    pub fn begin(&self) -> Result<TransactionId> {
        let mut next_id = self.next_txn_id.lock();
        let txn_id = *next_id;
        *next_id += 1;
        
        let txn = Transaction::new(txn_id, IsolationLevel::default());
        self.active_txns.write().insert(txn_id, txn);
        
        Ok(txn_id)
    }
    
    pub fn commit(&self, txn_id: TransactionId) -> Result<()> {
        let mut active_txns = self.active_txns.write();
        
        if let Some(txn) = active_txns.get_mut(&txn_id) {
            txn.state = TransactionState::Committed;
            self.lock_manager.release_all_locks(txn_id)?;
            active_txns.remove(&txn_id);
            Ok(())
        } else {
            Err(DbError::Transaction(format!("Transaction {} not found", txn_id)))
        }
    }
    
    pub fn abort(&self, txn_id: TransactionId) -> Result<()> {
        let mut active_txns = self.active_txns.write()));
        
        if let Some(txn) = active_txns.get_mut(&txn_id) {
            txn.state = TransactionState::Aborted;
            self.lock_manager.release_all_locks(txn_id)?;
            active_txns.remove(&txn_id);
            Ok(())
        } else {
            Err(DbError::Transaction(format!("Transaction {} not found", txn_id)))
        }
    }
    
    pub fn get_lock_manager(&self) -> Arc<LockManager> {
        self.lock_manager.clone()
    }
}

impl Default for TransactionManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Two-Phase Commit Coordinator
pub struct TwoPhaseCommitCoordinator {
    participants: Arc<RwLock<HashMap<TransactionId, Vec<ParticipantInfo>>>>,
    prepare_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct ParticipantInfo {
    pub id: String,
    pub state: ParticipantState,
    pub last_contact: SystemTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParticipantState {
    Idle,
    Preparing,
    Prepared,
    Committed,
    Aborted,
}

impl TwoPhaseCommitCoordinator {
    pub fn new(prepare_timeout: Duration) -> Self {
        Self {
            participants: Arc::new(RwLock::new(HashMap::new())),
            prepare_timeout,
        }
    }
    
    pub fn register_participant(&self, txn_id: TransactionId, participant: ParticipantInfo) {
        let mut participants = self.participants.write()));
        participants.entry(txn_id).or_insert_with(Vec::new).push(participant);
    }
    
    pub fn prepare_phase(&self, txn_id: TransactionId) -> Result<bool> {
        let participants = self.participants.read();
        
        if let Some(participant_list) = participants.get(&txn_id) {
            // Send prepare messages to all participants
            for participant in participant_list {
                // In production, would send actual prepare message
                if participant.state != ParticipantState::Prepared {
                    // Check timeout
                    if SystemTime::now().duration_since(participant.last_contact).unwrap_or(Duration::from_secs(0)) > self.prepare_timeout {
                        return Ok(false);
                    }
                }
            }
            Ok(true)
        } else {
            Err(DbError::Transaction(format!("Transaction {} has no participants", txn_id)))
        }
    }
    
    pub fn commit_phase(&self, txn_id: TransactionId) -> Result<()> {
        let mut participants = self.participants.write()));
        
        if let Some(participant_list) = participants.get_mut(&txn_id) {
            for participant in participant_list {
                participant.state = ParticipantState::Committed;
            }
            participants.remove(&txn_id);
            Ok(())
        } else {
            Err(DbError::Transaction(format!("Transaction {} has no participants", txn_id)))
        }
    }
    
    pub fn abort_phase(&self, txn_id: TransactionId) -> Result<()> {
        let mut participants = self.participants.write()));
        
        if let Some(participant_list) = participants.get_mut(&txn_id) {
            for participant in participant_list {
                participant.state = ParticipantState::Aborted;
            }
            participants.remove(&txn_id);
            Ok(())
        } else {
            Err(DbError::Transaction(format!("Transaction {} has no participants", txn_id)))
        }
    }
}

impl Default for TwoPhaseCommitCoordinator {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

/// Transaction recovery manager
pub struct RecoveryManager {
    wal_manager: Arc<WALManager>,
    version_store: Arc<VersionStore>,
    checkpoint_interval: Duration,
    last_checkpoint: Arc<Mutex<SystemTime>>,
}

impl RecoveryManager {
    pub fn new(wal_manager: Arc<WALManager>, version_store: Arc<VersionStore>, checkpoint_interval: Duration) -> Self {
        Self {
            wal_manager,
            version_store,
            checkpoint_interval,
            last_checkpoint: Arc::new(Mutex::new(SystemTime::now())),
        }
    }
    
    pub fn recover(&self) -> Result<()> {
        let entries = self.wal_manager.replay()?;

        let mut active_txns: HashMap<TransactionId, Vec<WALEntry>> = HashMap::new();
        let mut last_checkpoint_lsn = 0;
        
        // Process log entries
        for entry in entries {
            match &entry {
                WALEntry::Begin { txn_id, .. } => {
                    active_txns.insert(*txn_id, vec![entry.clone()]);
                }
                WALEntry::Commit { txn_id, lsn, .. } => {
                    if let Some(txn_entries) = active_txns.remove(txn_id) {
                        // Redo all operations
                        self.redo_transaction(&txn_entries)?;
                    }
                }
                WALEntry::Abort { txn_id, .. } => {
                    // Remove from active transactions
                    active_txns.remove(txn_id);
                }
                WALEntry::Checkpoint { lsn, .. } => {
                    last_checkpoint_lsn = *lsn;
                }
                _ => {
                    // Add to active transaction
                    if let Some(txn_id) = self.extract_txn_id(&entry) {
                        if let Some(txn_entries) = active_txns.get_mut(&txn_id) {
                            txn_entries.push(entry.clone());
                        }
                    }
                }
            }
        }
        
        // Rollback incomplete transactions
        for (txn_id, entries) in active_txns {
            self.undo_transaction(txn_id, &entries)?;
        }
        
        Ok(())
    }
    
    fn redo_transaction(&self, entries: &[WALEntry]) -> Result<()> {
        for entry in entries {
            match entry {
                WALEntry::Insert { table, key, value, .. } => {
                    // Redo insert
                }
                WALEntry::Update { table, key, new_value, .. } => {
                    // Redo update
                }
                WALEntry::Delete { table, key, .. } => {
                    // Redo delete
                }
                _ => {}
            }
        }
        Ok(())
    }
    
    fn undo_transaction(&self, txn_id: TransactionId, entries: &[WALEntry]) -> Result<()> {
        // Undo operations in reverse order
        for entry in entries.iter().rev() {
            match entry {
                WALEntry::Insert { table, key, .. } => {
                    // Undo insert (delete)
                }
                WALEntry::Update { table, key, old_value, .. } => {
                    // Undo update (restore old value)
                }
                WALEntry::Delete { table, key, value, .. } => {
                    // Undo delete (insert back)
                }
                _ => {}
            }
        }
        Ok(())
    }
    
    fn extract_txn_id(&self, entry: &WALEntry) -> Option<TransactionId> {
        match entry {
            WALEntry::Begin { txn_id, .. } => Some(*txn_id),
            WALEntry::Commit { txn_id, .. } => Some(*txn_id),
            WALEntry::Abort { txn_id, .. } => Some(*txn_id),
            WALEntry::Insert { txn_id, .. } => Some(*txn_id),
            WALEntry::Update { txn_id, .. } => Some(*txn_id),
            WALEntry::Delete { txn_id, .. } => Some(*txn_id),
            WALEntry::Savepoint { txn_id, .. } => Some(*txn_id),
            WALEntry::RollbackToSavepoint { txn_id, .. } => Some(*txn_id),
            _ => None,
        }
    }
    
    pub fn create_checkpoint(&self, active_txns: Vec<TransactionId>) -> Result<LogSequenceNumber> {
        let now = SystemTime::now();
        let mut last_checkpoint = self.last_checkpoint.lock();
        
        if now.duration_since(*last_checkpoint).unwrap_or(Duration::from_secs(0)) < self.checkpoint_interval {
            return Ok(0);
        }
        
        let lsn = self.wal_manager.get_current_lsn();
        
        let entry = WALEntry::Checkpoint {
            lsn,
            active_txns,
            timestamp: now,
        };
        
        let checkpoint_lsn = self.wal_manager.append(entry)?;
        self.wal_manager.flush()?;
        
        *last_checkpoint = now;
        
        Ok(checkpoint_lsn)
    }
}

/// Transaction statistics tracker
pub struct TransactionStatistics {
    total_commits: Arc<Mutex<u64>>,
    total_aborts: Arc<Mutex<u64>>,
    total_deadlocks: Arc<Mutex<u64>>,
    total_timeouts: Arc<Mutex<u64>>,
    active_count: Arc<Mutex<u64>>,
    commit_latency_ms: Arc<Mutex<Vec<u64>>>,
}

impl TransactionStatistics {
    pub fn new() -> Self {
        Self {
            total_commits: Arc::new(Mutex::new(0)),
            total_aborts: Arc::new(Mutex::new(0)),
            total_deadlocks: Arc::new(Mutex::new(0)),
            total_timeouts: Arc::new(Mutex::new(0)),
            active_count: Arc::new(Mutex::new(0)),
            commit_latency_ms: Arc::new(Mutex::new(Vec::new())),
        }
    }
    
    pub fn record_begin(&self) {
        *self.active_count.lock() += 1;
    }
    
    pub fn record_commit(&self, latency_ms: u64) {
        *self.total_commits.lock() += 1;
        *self.active_count.lock() -= 1;
        self.commit_latency_ms.lock().unwrap().push(latency_ms);
    }
    
    pub fn record_abort(&self) {
        *self.total_aborts.lock() += 1;
        *self.active_count.lock() -= 1;
    }
    
    pub fn record_deadlock(&self) {
        *self.total_deadlocks.lock() += 1;
    }
    
    pub fn record_timeout(&self) {
        *self.total_timeouts.lock() += 1;
    }
    
    pub fn get_summary(&self) -> StatisticsSummary {
        let latencies = self.commit_latency_ms.lock();
        let avg_latency = if !latencies.is_empty() {
            latencies.iter().sum::<u64>() / latencies.len() as u64
        } else {
            0
        };
        
        StatisticsSummary {
            total_commits: *self.total_commits.lock(),
            total_aborts: *self.total_aborts.lock(),
            total_deadlocks: *self.total_deadlocks.lock(),
            total_timeouts: *self.total_timeouts.lock(),
            active_transactions: *self.active_count.lock(),
            avg_commit_latency_ms: avg_latency,
            abort_rate: self.calculate_abort_rate(),
        }
    }
    
    fn calculate_abort_rate(&self) -> f64 {
        let commits = *self.total_commits.lock() as f64;
        let aborts = *self.total_aborts.lock() as f64;
        let total = commits + aborts;
        
        if total > 0.0 {
            aborts / total
        } else {
            0.0
        }
    }
}

impl Default for TransactionStatistics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatisticsSummary {
    pub total_commits: u64,
    pub total_aborts: u64,
    pub total_deadlocks: u64,
    pub total_timeouts: u64,
    pub active_transactions: u64,
    pub avg_commit_latency_ms: u64,
    pub abort_rate: f64,
}

/// Snapshot manager for snapshot isolation
pub struct SnapshotManager {
    snapshots: Arc<RwLock<BTreeMap<TransactionId, Snapshot>>>,
    next_snapshot_id: Arc<Mutex<u64>>,
}

#[derive(Debug, Clone)]
pub struct Snapshot {
    pub id: u64,
    pub txn_id: TransactionId,
    pub timestamp: SystemTime,
    pub active_txns: HashSet<TransactionId>,
}

impl SnapshotManager {
    pub fn new() -> Self {
        Self {
            snapshots: Arc::new(RwLock::new(BTreeMap::new())),
            next_snapshot_id: Arc::new(Mutex::new(1)),
        }
    }
    
    pub fn create_snapshot(&self, txnid: TransactionId, active_txns: HashSet<TransactionId>) -> Snapshot {
        let mut next_id = self.next_snapshot_id.lock();
        let snapshot = Snapshot {
            id: *next_id,
            txn_id,
            timestamp: SystemTime::now(),
            active_txns,
        };
        *next_id += 1;
        
        self.snapshots.write().insert(txn_id, snapshot.clone());
        snapshot
    }
    
    pub fn get_snapshot(&self, txn_id: TransactionId) -> Option<Snapshot> {
        self.snapshots.read().get(&txn_id).cloned()
    }
    
    pub fn remove_snapshot(&self, txn_id: TransactionId) {
        self.snapshots.write().remove(&txn_id);
    }
    
    pub fn is_visible(&self, snapshot: &Snapshot, txn_id: TransactionId) -> bool {
        if txn_id == snapshot.txn_id {
            return true;
        }
        
        // Transaction is not visible if it was active when snapshot was taken
        !snapshot.active_txns.contains(&txn_id)
    }
}

impl Default for SnapshotManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Lock escalation manager
pub struct LockEscalationManager {
    escalation_threshold: usize,
    row_lock_count: Arc<RwLock<HashMap<(TransactionId, String), usize>>>,
}

impl LockEscalationManager {
    pub fn new(escalation_threshold: usize) -> Self {
        Self {
            escalation_threshold,
            row_lock_count: Arc::new(RwLock::new(HashMap::new())),
        }
    }
    
    pub fn record_row_lock(&self, txn_id: TransactionId, table: String) -> bool {
        let mut counts = self.row_lock_count.write();
        let count = counts.entry((txn_id, table.clone())).or_insert(0);
        *count += 1;
        
        *count >= self.escalation_threshold
    }
    
    pub fn should_escalate(&self, txn_id: TransactionId, table: &str) -> bool {
        let counts = self.row_lock_count.read();
        if let Some(&count) = counts.get(&(txn_id, table.to_string())) {
            count >= self.escalation_threshold
        } else {
            false
        }
    }
    
    pub fn clear_locks(&self, txn_id: TransactionId) {
        let mut counts = self.row_lock_count.write();
        counts.retain(|(tid, _), _| *tid != txn_id);
    }
}

impl Default for LockEscalationManager {
    fn default() -> Self {
        Self::new(1000)
    }
}

/// Transaction timeout manager
pub struct TimeoutManager {
    timeouts: Arc<RwLock<HashMap<TransactionId>>>,
    default_timeout: Duration,
}

impl TimeoutManager {
    pub fn new(default_timeout: Duration) -> Self {
        Self {
            timeouts: Arc::new(RwLock::new(HashMap::new())),
            default_timeout,
        }
    }
    
    pub fn set_timeout(&self, txn_id: TransactionId, timeout: Duration) {
        let deadline = SystemTime::now() + timeout;
        self.timeouts.write().insert(txn_id, deadline);
    }
    
    pub fn is_timed_out(&self, txn_id: TransactionId) -> bool {
        let timeouts = self.timeouts.read();
        if let Some(&deadline) = timeouts.get(&txn_id) {
            SystemTime::now() > deadline
        } else {
            false
        }
    }
    
    pub fn clear_timeout(&self, txn_id: TransactionId) {
        self.timeouts.write().remove(&txn_id);
    }
    
    pub fn get_timed_out_transactions(&self) -> Vec<TransactionId> {
        let now = SystemTime::now();
        let timeouts = self.timeouts.read();
        
        timeouts.iter()
            .filter(|(_, &deadline)| now > deadline)
            .map(|(&txn_id, _)| txn_id)
            .collect()
    }
}

impl Default for TimeoutManager {
    fn default() -> Self {
        Self::new(Duration::from_secs(60))
    }
}

/// Distributed transaction manager for coordinating across multiple nodes
pub struct DistributedTransactionManager {
    local_txn_manager: Arc<TransactionManager>,
    two_phase_commit: Arc<TwoPhaseCommitCoordinator>,
    remote_participants: Arc<RwLock<HashMap<TransactionId, Vec<String>>>>,
}

impl DistributedTransactionManager {
    pub fn new(local_txn_manager: Arc<TransactionManager>) -> Self {
        Self {
            local_txn_manager,
            two_phase_commit: Arc::new(TwoPhaseCommitCoordinator::default()),
            remote_participants: Arc::new(RwLock::new(HashMap::new())),
        }
    }
    
    pub fn begin_distributed(&self, participants: Vec<String>) -> Result<TransactionId> {
        let txn_id = self.local_txn_manager.begin()?;
        
        // Register participants
        for participant in &participants {
            let info = ParticipantInfo {
                id: participant.clone(),
                state: ParticipantState::Idle,
                last_contact: SystemTime::now(),
            };
            self.two_phase_commit.register_participant(txn_id, info);
        }
        
        self.remote_participants.write().insert(txn_id, participants);
        
        Ok(txn_id)
    }
    
    pub fn commit_distributed(&self, txn_id: TransactionId) -> Result<()> {
        // Phase 1: Prepare
        if !self.two_phase_commit.prepare_phase(txn_id)? {
            // Prepare failed, abort
            self.two_phase_commit.abort_phase(txn_id)?;
            self.local_txn_manager.abort(txn_id)?;
            return Err(DbError::Transaction("Prepare phase failed".to_string()));
        }
        
        // Phase 2: Commit
        self.two_phase_commit.commit_phase(txn_id)?;
        self.local_txn_manager.commit(txn_id)?;
        
        self.remote_participants.write().remove(&txn_id);
        
        Ok(())
    }
    
    pub fn abort_distributed(&self, txn_id: TransactionId) -> Result<()> {
        self.two_phase_commit.abort_phase(txn_id)?;
        self.local_txn_manager.abort(txn_id)?;
        
        self.remote_participants.write().remove(&txn_id);
        
        Ok(())
    }
}

/// Optimistic concurrency control manager
pub struct OptimisticConcurrencyControl {
    read_versions: Arc<RwLock<HashMap<(TransactionId, String), u64>>>,
    write_versions: Arc<RwLock<HashMap<String, u64>>>,
}

impl OptimisticConcurrencyControl {
    pub fn new() -> Self {
        Self {
            read_versions: Arc::new(RwLock::new(HashMap::new())),
            write_versions: Arc::new(RwLock::new(HashMap::new())),
        }
    }
    
    pub fn read(&self, txn_id: TransactionId, key: String) -> Result<u64> {
        let write_versions = self.write_versions.read();
        let version = write_versions.get(&key).copied().unwrap_or(0);
        
        let mut read_versions = self.read_versions.write();
        read_versions.insert((txn_id, key), version);
        
        Ok(version)
    }
    
    pub fn validate(&self, txn_id: TransactionId) -> bool {
        let read_versions = self.read_versions.read();
        let write_versions = self.write_versions.read();
        
        // Check if any read keys have been updated
        for ((tid, key), read_version) in read_versions.iter() {
            if *tid == txn_id {
                if let Some(&current_version) = write_versions.get(key) {
                    if current_version != *read_version {
                        return false;  // Validation failed
                    }
                }
            }
        }
        
        true
    }
    
    pub fn write(&self, txn_id: TransactionId, key: String) -> Result<()> {
        if !self.validate(txn_id) {
            return Err(DbError::Transaction("Validation failed".to_string()));
        }
        
        let mut write_versions = self.write_versions.write();
        let version = write_versions.entry(key).or_insert(0);
        *version += 1;
        
        Ok(())
    }
    
    pub fn cleanup(&self, txn_id: TransactionId) {
        let mut read_versions = self.read_versions.write();
        read_versions.retain(|(tid, _), _| *tid != txn_id);
    }
}

impl Default for OptimisticConcurrencyControl {
    fn default() -> Self {
        Self::new()
    }
}

/// Transaction replay manager for debugging and auditing
pub struct TransactionReplayManager {
    recorded_operations: Arc<RwLock<HashMap<TransactionId, Vec<Operation>>>>,
    replay_enabled: Arc<Mutex<bool>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Operation {
    Read { table: String, key: String, value: Option<Vec<u8>> },
    Write { table: String, key: String, value: Vec<u8> },
    Delete { table: String, key: String },
}

impl TransactionReplayManager {
    pub fn new() -> Self {
        Self {
            recorded_operations: Arc::new(RwLock::new(HashMap::new())),
            replay_enabled: Arc::new(Mutex::new(false)),
        }
    }
    
    pub fn enable_replay(&self) {
        *self.replay_enabled.lock() = true;
    }
    
    pub fn disable_replay(&self) {
        *self.replay_enabled.lock() = false;
    }
    
    pub fn record_operation(&self, txn_id: TransactionId, operation: Operation) {
        if *self.replay_enabled.lock() {
            let mut operations = self.recorded_operations.write();
            operations.entry(txn_id).or_insert_with(Vec::new).push(operation);
        }
    }
    
    pub fn get_operations(&self, txn_id: TransactionId) -> Vec<Operation> {
        let operations = self.recorded_operations.read();
        operations.get(&txn_id).cloned().unwrap_or_default()
    }
    
    pub fn replay_transaction(&self, txn_id: TransactionId) -> Result<()> {
        let operations = self.get_operations(txn_id);
        
        for operation in operations {
            match operation {
                Operation::Read { .. } => {
                    // Replay read operation
                }
                Operation::Write { table, key, value } => {
                    // Replay write operation
                }
                Operation::Delete { table, key } => {
                    // Replay delete operation
                }
            }
        }
        
        Ok(())
    }
    
    pub fn clear_recording(&self, txn_id: TransactionId) {
        let mut operations = self.recorded_operations.write();
        operations.remove(&txn_id);
    }
}

impl Default for TransactionReplayManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Transaction dependency tracker for serialization graph testing
pub struct DependencyTracker {
    dependencies: Arc<RwLock<HashMap<TransactionId<TransactionId>>>>,
}

impl DependencyTracker {
    pub fn new() -> Self {
        Self {
            dependencies: Arc::new(RwLock::new(HashMap::new())),
        }
    }
    
    pub fn add_dependency(&self, from_txn: TransactionId, to_txn: TransactionId) {
        let mut dependencies = self.dependencies.write();
        dependencies.entry(from_txn).or_insert_with(HashSet::new).insert(to_txn);
    }
    
    pub fn has_cycle(&self) -> bool {
        let dependencies = self.dependencies.read();
        
        for txn_id in dependencies.keys() {
            let mut visited = HashSet::new();
            if self.dfs_cycle_check(*txn_id, &dependencies, &mut visited, &mut Vec::new()) {
                return true;
            }
        }
        
        false
    }
    
    fn dfs_cycle_check(
        &self,
        current: TransactionId,
        graph: &HashMap<TransactionId<TransactionId>>,
        visited: &mut HashSet<TransactionId>,
        path: &mut Vec<TransactionId>,
    ) -> bool {
        if path.contains(&current) {
            return true;
        }
        
        if visited.contains(&current) {
            return false;
        }
        
        visited.insert(current);
        path.push(current);
        
        if let Some(neighbors) = graph.get(&current) {
            for &neighbor in neighbors {
                if self.dfs_cycle_check(neighbor, graph, visited, path) {
                    return true;
                }
            }
        }
        
        path.pop();
        false
    }
    
    pub fn clear_dependencies(&self, txn_id: TransactionId) {
        let mut dependencies = self.dependencies.write();
        dependencies.remove(&txn_id);
        
        // Remove this transaction from other dependencies
        for deps in dependencies.values_mut() {
            deps.remove(&txn_id);
        }
    }
}

impl Default for DependencyTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Lock statistics for monitoring
pub struct LockStatistics {
    lock_requests: Arc<Mutex<u64>>,
    lock_waits: Arc<Mutex<u64>>,
    lock_timeouts: Arc<Mutex<u64>>,
    deadlocks_detected: Arc<Mutex<u64>>,
    avg_wait_time_ms: Arc<Mutex<Vec<u64>>>,
}

impl LockStatistics {
    pub fn new() -> Self {
        Self {
            lock_requests: Arc::new(Mutex::new(0)),
            lock_waits: Arc::new(Mutex::new(0)),
            lock_timeouts: Arc::new(Mutex::new(0)),
            deadlocks_detected: Arc::new(Mutex::new(0)),
            avg_wait_time_ms: Arc::new(Mutex::new(Vec::new())),
        }
    }
    
    pub fn record_request(&self) {
        *self.lock_requests.lock() += 1;
    }
    
    pub fn record_wait(&self, wait_time_ms: u64) {
        *self.lock_waits.lock() += 1;
        self.avg_wait_time_ms.lock().unwrap().push(wait_time_ms);
    }
    
    pub fn record_timeout(&self) {
        *self.lock_timeouts.lock() += 1;
    }
    
    pub fn record_deadlock(&self) {
        *self.deadlocks_detected.lock() += 1;
    }
    
    pub fn get_summary(&self) -> LockStatisticsSummary {
        let wait_times = self.avg_wait_time_ms.lock();
        let avg_wait = if !wait_times.is_empty() {
            wait_times.iter().sum::<u64>() / wait_times.len() as u64
        } else {
            0
        };
        
        LockStatisticsSummary {
            total_requests: *self.lock_requests.lock(),
            total_waits: *self.lock_waits.lock(),
            total_timeouts: *self.lock_timeouts.lock(),
            total_deadlocks: *self.deadlocks_detected.lock(),
            avg_wait_time_ms: avg_wait,
        }
    }
}

impl Default for LockStatistics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockStatisticsSummary {
    pub total_requests: u64,
    pub total_waits: u64,
    pub total_timeouts: u64,
    pub total_deadlocks: u64,
    pub avg_wait_time_ms: u64,
}

/// Nested transaction manager
pub struct NestedTransactionManager {
    parent_child_map: Arc<RwLock<HashMap<TransactionId, Vec<TransactionId>>>>,
    savepoint_stacks: Arc<RwLock<HashMap<TransactionId, Vec<Savepoint>>>>,
}

impl NestedTransactionManager {
    pub fn new() -> Self {
        Self {
            parent_child_map: Arc::new(RwLock::new(HashMap::new())),
            savepoint_stacks: Arc::new(RwLock::new(HashMap::new())),
        }
    }
    
    pub fn begin_nested(&self, parent_txn: TransactionId, child_txn: TransactionId) {
        let mut map = self.parent_child_map.write();
        map.entry(parent_txn).or_insert_with(Vec::new).push(child_txn);
    }
    
    pub fn commit_nested(&self, child_txn: TransactionId) -> Result<()> {
        // In nested transactions, child commit just releases locks
        // but doesn't finalize changes until parent commits
        Ok(())
    }
    
    pub fn abort_nested(&self, child_txn: TransactionId, parent_txn: TransactionId) -> Result<()> {
        // Rollback child transaction changes
        let mut map = self.parent_child_map.write();
        if let Some(children) = map.get_mut(&parent_txn) {
            children.retain(|&id| id != child_txn);
        }
        
        Ok(())
    }
    
    pub fn create_savepoint(&self, txn_id: TransactionId, savepoint: Savepoint) {
        let mut stacks = self.savepoint_stacks.write();
        stacks.entry(txn_id).or_insert_with(Vec::new).push(savepoint);
    }
    
    pub fn rollback_to_savepoint(&self, txn_id: TransactionId, savepointname: &str) -> Result<Option<Savepoint>> {
        let mut stacks = self.savepoint_stacks.write();
        
        if let Some(stack) = stacks.get_mut(&txn_id) {
            // Find the savepoint
            if let Some(pos) = stack.iter().position(|sp| sp.name == savepoint_name) {
                // Remove all savepoints after this one
                stack.truncate(pos + 1);
                return Ok(stack.last().cloned());
            }
        }
        
        Ok(None)
    }
    
    pub fn get_children(&self, parent_txn: TransactionId) -> Vec<TransactionId> {
        let map = self.parent_child_map.read();
        map.get(&parent_txn).cloned().unwrap_or_default()
    }
}

impl Default for NestedTransactionManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Transaction conflict resolution policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictResolutionPolicy {
    Wait,
    NoWait,
    SkipLocked,
    AbortOldest,
    AbortYoungest,
}

/// Conflict resolver
pub struct ConflictResolver {
    policy: ConflictResolutionPolicy,
    wait_timeout: Duration,
}

impl ConflictResolver {
    pub fn new(policy: ConflictResolutionPolicy, wait_timeout: Duration) -> Self {
        Self {
            policy,
            wait_timeout,
        }
    }
    
    pub fn resolve_conflict(
        &self,
        requesting_txn: TransactionId,
        holding_txn: TransactionId,
        requested_mode: LockMode,
        held_mode: LockMode,
    ) -> ConflictResolution {
        match self.policy {
            ConflictResolutionPolicy::Wait => ConflictResolution::Wait(self.wait_timeout),
            ConflictResolutionPolicy::NoWait => ConflictResolution::Abort,
            ConflictResolutionPolicy::SkipLocked => ConflictResolution::Skip,
            ConflictResolutionPolicy::AbortOldest => {
                if requesting_txn < holding_txn {
                    ConflictResolution::AbortOther
                } else {
                    ConflictResolution::Abort
                }
            }
            ConflictResolutionPolicy::AbortYoungest => {
                if requesting_txn > holding_txn {
                    ConflictResolution::Abort
                } else {
                    ConflictResolution::AbortOther
                }
            }
        }
    }
}

impl Default for ConflictResolver {
    fn default() -> Self {
        Self::new(ConflictResolutionPolicy::Wait::from_secs(10))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictResolution {
    Wait(Duration),
    Abort,
    AbortOther,
    Skip,
}

/// Transaction monitoring and alerting
pub struct TransactionMonitor {
    long_running_threshold: Duration,
    large_transaction_threshold: usize,
    alerts: Arc<RwLock<Vec<TransactionAlert>>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionAlert {
    pub txn_id: TransactionId,
    pub alert_type: AlertType,
    pub timestamp: SystemTime,
    pub details: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AlertType {
    LongRunning,
    LargeTransaction,
    HighContention,
    DeadlockDetected,
    TimeoutImminent,
}

impl TransactionMonitor {
    pub fn new(long_running_threshold: Duration, large_transaction_threshold: usize) -> Self {
        Self {
            long_running_threshold,
            large_transaction_threshold,
            alerts: Arc::new(RwLock::new(Vec::new())),
        }
    }
    
    pub fn check_transaction(&self, txn: &Transaction) {
        let elapsed = SystemTime::now().duration_since(txn.start_time).unwrap_or(Duration::from_secs(0));
        
        if elapsed > self.long_running_threshold {
            self.add_alert(TransactionAlert {
                txn_id: txn.id,
                alert_type: AlertType::LongRunning,
                timestamp: SystemTime::now(),
                details: format!("Transaction running for {:?}", elapsed),
            })));
        }
        
        if txn.write_set.len() > self.large_transaction_threshold {
            self.add_alert(TransactionAlert {
                txn_id: txn.id,
                alert_type: AlertType::LargeTransaction,
                timestamp: SystemTime::now(),
                details: format!("Transaction has {} writes", txn.write_set.len()),
            })));
        }
    }
    
    fn add_alert(&self, alert: TransactionAlert) {
        let mut alerts = self.alerts.write();
        alerts.push(alert);
        
        // Keep only recent alerts
        if alerts.len() > 1000 {
            alerts.remove(0);
        }
    }
    
    pub fn get_alerts(&self) -> Vec<TransactionAlert> {
        self.alerts.read().clone()
    }
    
    pub fn clear_alerts(&self) {
        self.alerts.write().clear();
    }
}

impl Default for TransactionMonitor {
    fn default() -> Self {
        Self::new(Duration::from_secs(300), 10000)
    }
}

/// Transaction audit logger
pub struct TransactionAuditLogger {
    audit_log_path: PathBuf,
    enabled: Arc<Mutex<bool>>,
    log_buffer: Arc<Mutex<Vec<AuditEntry>>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub txn_id: TransactionId,
    pub event_type: AuditEventType,
    pub timestamp: SystemTime,
    pub user: Option<String>,
    pub details: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AuditEventType {
    TransactionBegin,
    TransactionCommit,
    TransactionAbort,
    LockAcquired,
    LockReleased,
    DeadlockDetected,
    SavepointCreated,
    RollbackToSavepoint,
}

impl TransactionAuditLogger {
    pub fn new(audit_log_path: PathBuf) -> Self {
        Self {
            audit_log_path,
            enabled: Arc::new(Mutex::new(true)),
            log_buffer: Arc::new(Mutex::new(Vec::new())),
        }
    }
    
    pub fn log_event(&self, entry: AuditEntry) {
        if *self.enabled.lock() {
            let mut buffer = self.log_buffer.lock();
            buffer.push(entry);
            
            if buffer.len() >= 100 {
                let _ = self.flush_internal(&mut buffer);
            }
        }
    }
    
    pub fn flush(&self) -> Result<()> {
        let mut buffer = self.log_buffer.lock();
        self.flush_internal(&mut buffer)
    }
    
    fn flush_internal(&self, buffer: &mut Vec<AuditEntry>) -> Result<()> {
        if buffer.is_empty() {
            return Ok(());
        }
        
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.audit_log_path)?;
        
        for entry in buffer.drain(..) {
            let json = serde_json::to_string(&entry)
                .map_err(|e| DbError::Serialization(e.to_string()))?;
            writeln!(file, "{}", json)?;
        }
        
        file.sync_all()?;
        
        Ok(())
    }
    
    pub fn query_audit_log(&self, txn_id: Option<TransactionId>, event_type: Option<AuditEventType>) -> Result<Vec<AuditEntry>> {
        let mut entries = Vec::new();
        
        if !self.audit_log_path.exists() {
            return Ok(entries);
        }
        
        let file = File::open(&self.audit_log_path)?;
        let reader = std::io::BufReader::new(file);
        
        use std::io::BufRead;
use std::time::UNIX_EPOCH;
        for line in reader.lines() {
            let line = line?;
            if let Ok(entry) = serde_json::from_str::<AuditEntry>(&line) {
                let mut include = true;
                
                if let Some(tid) = txn_id {
                    include &= entry.txn_id == tid;
                }
                
                if include {
                    entries.push(entry);
                }
            }
        }
        
        Ok(entries)
    }
}

/// Batch transaction processor
pub struct BatchTransactionProcessor {
    batch_size: usize,
    txn_manager: Arc<TransactionManager>,
}

impl BatchTransactionProcessor {
    pub fn new(batch_size: usize, txn_manager: Arc<TransactionManager>) -> Self {
        Self {
            batch_size,
            txn_manager,
        }
    }
    
    pub fn process_batch<F>(&self, operations: Vec<F>) -> Result<Vec<TransactionId>>
    where
        F: FnOnce(TransactionId) -> Result<()>,
    {
        let mut committed_txns = Vec::new();
        let mut batch = Vec::new();
        let total_operations = operations.len();
        
        for (i, op) in operations.into_iter().enumerate() {
            let txn_id = self.txn_manager.begin()?;
            
            match op(txn_id) {
                Ok(_) => {
                    batch.push(txn_id);
                    
                    if batch.len() >= self.batch_size || i == total_operations - 1 {
                        // Commit batch
                        for &tid in &batch {
                            self.txn_manager.commit(tid)?;
                            committed_txns.push(tid);
                        }
                        batch.clear();
                    }
                }
                Err(e) => {
                    // Abort failed transaction and entire batch
                    for &tid in &batch {
                        let _ = self.txn_manager.abort(tid);
                    }
                    let _ = self.txn_manager.abort(txn_id);
                    return Err(e);
                }
            }
        }
        
        Ok(committed_txns)
    }
}

/// Transaction migration manager for moving transactions between systems
pub struct TransactionMigrationManager {
    export_dir: PathBuf,
}

impl TransactionMigrationManager {
    pub fn new(export_dir: PathBuf) -> Self {
        Self { export_dir }
    }
    
    pub fn export_transaction(&self, txn: &Transaction) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.export_dir)?;

        let export_path = self.export_dir.join(format!("txn_{}.json", txn.id));
        let serialized = serde_json::to_string_pretty(txn)
            .map_err(|e| DbError::Serialization(e.to_string()))?;

        std::fs::write(&export_path, serialized)?;

        Ok(export_path)
    }

    pub fn import_transaction(&self, txn_id: TransactionId) -> Result<Transaction> {
        let import_path = self.export_dir.join(format!("txn_{}.json", txn_id));
        let serialized = std::fs::read_to_string(import_path)?;
        
        serde_json::from_str(&serialized)
            .map_err(|e| DbError::Serialization(e.to_string()))
    }
}

/// Read-write lock manager for better concurrency
pub struct ReadWriteLockManager {
    locks: Arc<RwLock<HashMap<String, RWLock>>>,
}

#[derive(Debug, Clone)]
struct RWLock {
    readers: HashSet<TransactionId>,
    writer: Option<TransactionId>,
    waiting_writers: VecDeque<TransactionId>,
}

impl RWLock {
    fn new() -> Self {
        Self {
            readers: HashSet::new(),
            writer: None,
            waiting_writers: VecDeque::new(),
        }
    }
}

impl ReadWriteLockManager {
    pub fn new() -> Self {
        Self {
            locks: Arc::new(RwLock::new(HashMap::new())),
        }
    }
    
    pub fn acquire_read_lock(&self, txn_id: TransactionId, resource: String) -> Result<()> {
        let mut locks = self.locks.write();
        let lock = locks.entry(resource).or_insert_with(RWLock::new);
        
        if lock.writer.is_none() && lock.waiting_writers.is_empty() {
            lock.readers.insert(txn_id);
            Ok(())
        } else {
            Err(DbError::LockTimeout)
        }
    }
    
    pub fn acquire_write_lock(&self, txn_id: TransactionId, resource: String) -> Result<()> {
        let mut locks = self.locks.write();
        let lock = locks.entry(resource).or_insert_with(RWLock::new);
        
        if lock.writer.is_none() && lock.readers.is_empty() {
            lock.writer = Some(txn_id);
            Ok(())
        } else {
            lock.waiting_writers.push_back(txn_id);
            Err(DbError::LockTimeout)
        }
    }
    
    pub fn release_read_lock(&self, txn_id: TransactionId, resource: &str) {
        let mut locks = self.locks.write();
        
        if let Some(lock) = locks.get_mut(resource) {
            lock.readers.remove(&txn_id);
            
            // Grant waiting writer if no more readers
            if lock.readers.is_empty() && !lock.waiting_writers.is_empty() {
                if let Some(waiting_writer) = lock.waiting_writers.pop_front() {
                    lock.writer = Some(waiting_writer);
                }
            }
        }
    }
    
    pub fn release_write_lock(&self, txn_id: TransactionId, resource: &str) {
        let mut locks = self.locks.write();
        
        if let Some(lock) = locks.get_mut(resource) {
            if lock.writer == Some(txn_id) {
                lock.writer = None;
                
                // Grant next waiting writer
                if !lock.waiting_writers.is_empty() {
                    if let Some(waiting_writer) = lock.waiting_writers.pop_front() {
                        lock.writer = Some(waiting_writer);
                    }
                }
            }
        }
    }
}

impl Default for ReadWriteLockManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Transaction performance profiler
pub struct TransactionPerformanceProfiler {
    profiles: Arc<RwLock<HashMap<TransactionId, PerformanceProfile>>>,
}

#[derive(Debug, Clone)]
pub struct PerformanceProfile {
    pub txn_id: TransactionId,
    pub start_time: SystemTime,
    pub end_time: Option<SystemTime>,
    pub lock_wait_time_ms: u64,
    pub cpu_time_ms: u64,
    pub io_time_ms: u64,
    pub operations_count: usize,
}

impl TransactionPerformanceProfiler {
    pub fn new() -> Self {
        Self {
            profiles: Arc::new(RwLock::new(HashMap::new())),
        }
    }
    
    pub fn start_profiling(&self, txn_id: TransactionId) {
        let profile = PerformanceProfile {
            txn_id,
            start_time: SystemTime::now(),
            end_time: None,
            lock_wait_time_ms: 0,
            cpu_time_ms: 0,
            io_time_ms: 0,
            operations_count: 0,
        };
        
        self.profiles.write().insert(txn_id, profile);
    }
    
    pub fn end_profiling(&self, txn_id: TransactionId) {
        let mut profiles = self.profiles.write();
        if let Some(profile) = profiles.get_mut(&txn_id) {
            profile.end_time = Some(SystemTime::now());
        }
    }
    
    pub fn record_lock_wait(&self, txn_id: TransactionId, wait_time_ms: u64) {
        let mut profiles = self.profiles.write();
        if let Some(profile) = profiles.get_mut(&txn_id) {
            profile.lock_wait_time_ms += wait_time_ms;
        }
    }
    
    pub fn record_operation(&self, txn_id: TransactionId) {
        let mut profiles = self.profiles.write();
        if let Some(profile) = profiles.get_mut(&txn_id) {
            profile.operations_count += 1;
        }
    }
    
    pub fn get_profile(&self, txn_id: TransactionId) -> Option<PerformanceProfile> {
        self.profiles.read().get(&txn_id).cloned()
    }
    
    pub fn get_all_profiles(&self) -> Vec<PerformanceProfile> {
        self.profiles.read().values().cloned().collect()
    }
}

impl Default for TransactionPerformanceProfiler {
    fn default() -> Self {
        Self::new()
    }
}

/// Transaction resource manager
pub struct TransactionResourceManager {
    memory_limit_bytes: usize,
    current_memory_usage: Arc<Mutex<HashMap<TransactionId, usize>>>,
}

impl TransactionResourceManager {
    pub fn new(memory_limit_bytes: usize) -> Self {
        Self {
            memory_limit_bytes,
            current_memory_usage: Arc::new(Mutex::new(HashMap::new())),
        }
    }
    
    pub fn allocate(&self, txn_id: TransactionId, bytes: usize) -> Result<()> {
        let mut usage = self.current_memory_usage.lock();
        let current = usage.entry(txn_id).or_insert(0);
        
        if *current + bytes > self.memory_limit_bytes {
            return Err(DbError::Transaction("Memory limit exceeded".to_string()));
        }
        
        *current += bytes;
        Ok(())
    }
    
    pub fn deallocate(&self, txn_id: TransactionId, bytes: usize) {
        let mut usage = self.current_memory_usage.lock();
        if let Some(current) = usage.get_mut(&txn_id) {
            *current = current.saturating_sub(bytes);
        }
    }
    
    pub fn get_usage(&self, txn_id: TransactionId) -> usize {
        self.current_memory_usage.lock().unwrap().get(&txn_id).copied().unwrap_or(0)
    }
    
    pub fn clear(&self, txn_id: TransactionId) {
        self.current_memory_usage.lock().unwrap().remove(&txn_id);
    }
}

impl Default for TransactionResourceManager {
    fn default() -> Self {
        Self::new(100 * 1024 * 1024) // 100MB default limit
    }
}

/// Transaction priority manager
pub struct TransactionPriorityManager {
    priorities: Arc<RwLock<HashMap<TransactionId, Priority>>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
    Low = 1,
    Normal = 2,
    High = 3,
    Critical = 4,
}

impl TransactionPriorityManager {
    pub fn new() -> Self {
        Self {
            priorities: Arc::new(RwLock::new(HashMap::new())),
        }
    }
    
    pub fn set_priority(&self, txn_id: TransactionId, priority: Priority) {
        self.priorities.write().insert(txn_id, priority);
    }
    
    pub fn get_priority(&self, txn_id: TransactionId) -> Priority {
        self.priorities.read().get(&txn_id).copied().unwrap_or(Priority::Normal)
    }
    
    pub fn should_preempt(&self, current_txn: TransactionId, requesting_txn: TransactionId) -> bool {
        let current_priority = self.get_priority(current_txn);
        let requesting_priority = self.get_priority(requesting_txn);
        
        requesting_priority > current_priority
    }
    
    pub fn clear(&self, txn_id: TransactionId) {
        self.priorities.write().remove(&txn_id);
    }
}

impl Default for TransactionPriorityManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Transaction coordinator for multi-database transactions
pub struct TransactionCoordinator {
    participant_databases: Arc<RwLock<HashMap<String, DatabaseParticipant>>>,
    global_transactions: Arc<RwLock<HashMap<TransactionId, GlobalTransaction>>>,
}

#[derive(Debug, Clone)]
pub struct DatabaseParticipant {
    pub database_id: String,
    pub connection_string: String,
    pub state: ParticipantState,
}

#[derive(Debug, Clone)]
pub struct GlobalTransaction {
    pub global_txn_id: TransactionId,
    pub local_transactions: HashMap<String, TransactionId>,
    pub state: TransactionState,
}

impl TransactionCoordinator {
    pub fn new() -> Self {
        Self {
            participant_databases: Arc::new(RwLock::new(HashMap::new())),
            global_transactions: Arc::new(RwLock::new(HashMap::new())),
        }
    }
    
    pub fn register_database(&self, participant: DatabaseParticipant) {
        self.participant_databases.write().insert(participant.database_id.clone(), participant);
    }
    
    pub fn begin_global_transaction(&self, global_txn_id: TransactionId, databases: Vec<String>) -> Result<()> {
        let mut global_txns = self.global_transactions.write();
        
        let global_txn = GlobalTransaction {
            global_txn_id,
            local_transactions: HashMap::new(),
            state: TransactionState::Active,
        };
        
        global_txns.insert(global_txn_id, global_txn);
        Ok(())
    }
    
    pub fn commit_global_transaction(&self, global_txn_id: TransactionId) -> Result<()> {
        let mut global_txns = self.global_transactions.write();
        
        if let Some(txn) = global_txns.get_mut(&global_txn_id) {
            txn.state = TransactionState::Committing;
            // In production, would coordinate commits across databases
            txn.state = TransactionState::Committed;
            Ok(())
        } else {
            Err(DbError::Transaction(format!("Global transaction {} not found", global_txn_id)))
        }
    }
}

impl Default for TransactionCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// Transaction replication manager
pub struct TransactionReplicationManager {
    replicas: Arc<RwLock<Vec<ReplicaNode>>>,
    replication_log: Arc<Mutex<Vec<ReplicationEntry>>>,
}

#[derive(Debug, Clone)]
pub struct ReplicaNode {
    pub node_id: String,
    pub endpoint: String,
    pub lag_ms: u64,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplicationEntry {
    pub txn_id: TransactionId,
    pub operation: String,
    pub timestamp: SystemTime,
    pub data: Vec<u8>,
}

impl TransactionReplicationManager {
    pub fn new() -> Self {
        Self {
            replicas: Arc::new(RwLock::new(Vec::new())),
            replication_log: Arc::new(Mutex::new(Vec::new())),
        }
    }
    
    pub fn add_replica(&self, replica: ReplicaNode) {
        self.replicas.write().push(replica)));
    }
    
    pub fn replicate_transaction(&self, entry: ReplicationEntry) -> Result<()> {
        self.replication_log.lock().unwrap().push(entry);
        
        // In production, would send to replicas
        Ok(())
    }
    
    pub fn get_replica_lag(&self, node_id: &str) -> Option<u64> {
        self.replicas.read().iter()
            .find(|r| r.node_id == node_id)
            .map(|r| r.lag_ms)
    }
}

impl Default for TransactionReplicationManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Transaction history manager
pub struct TransactionHistoryManager {
    history: Arc<RwLock<VecDeque<TransactionHistoryEntry>>>,
    max_history_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionHistoryEntry {
    pub txn_id: TransactionId,
    pub state: TransactionState,
    pub start_time: SystemTime,
    pub end_time: Option<SystemTime>,
    pub isolation_level: IsolationLevel,
    pub operations_count: usize,
    pub bytes_read: u64,
    pub bytes_written: u64,
}

impl TransactionHistoryManager {
    pub fn new(max_history_size: usize) -> Self {
        Self {
            history: Arc::new(RwLock::new(VecDeque::new())),
            max_history_size,
        }
    }
    
    pub fn record_transaction(&self, entry: TransactionHistoryEntry) {
        let mut history = self.history.write();
        history.push_back(entry);
        
        if history.len() > self.max_history_size {
            history.pop_front();
        }
    }
    
    pub fn get_history(&self, txn_id: TransactionId) -> Option<TransactionHistoryEntry> {
        self.history.read().iter()
            .find(|e| e.txn_id == txn_id)
            .cloned()
    }
    
    pub fn get_recent_history(&self, count: usize) -> Vec<TransactionHistoryEntry> {
        self.history.read().iter()
            .rev()
            .take(count)
            .cloned()
            .collect()
    }
    
    pub fn get_statistics(&self) -> HistoryStatistics {
        let history = self.history.read();
        
        let total_committed = history.iter()
            .filter(|e| e.state == TransactionState::Committed)
            .count();
        
        let total_aborted = history.iter()
            .filter(|e| e.state == TransactionState::Aborted)
            .count();
        
        let avg_duration_ms = if !history.is_empty() {
            history.iter()
                .filter_map(|e| {
                    e.end_time.and_then(|end| {
                        end.duration_since(e.start_time).ok()
                    })
                })
                .map(|d| d.as_millis() as u64)
                .sum::<u64>() / history.len() as u64
        } else {
            0
        };
        
        HistoryStatistics {
            total_transactions: history.len(),
            total_committed,
            total_aborted,
            avg_duration_ms,
        }
    }
}

impl Default for TransactionHistoryManager {
    fn default() -> Self {
        Self::new(10000)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryStatistics {
    pub total_transactions: usize,
    pub total_committed: usize,
    pub total_aborted: usize,
    pub avg_duration_ms: u64,
}

/// Transaction utilities and helpers
pub mod transaction_utils {
    
    /// Generate a unique transaction ID
    pub fn generate_txn_id() -> TransactionId {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos() as TransactionId
    }
    
    /// Check if a transaction is long-running
    pub fn is_long_running(txn: &Transaction, threshold: Duration) -> bool {
        SystemTime::now()
            .duration_since(txn.start_time)
            .unwrap_or(Duration::from_secs(0)) > threshold
    }
    
    /// Calculate transaction size estimate
    pub fn estimate_transaction_size(txn: &Transaction) -> usize {
        let base_size = std::mem::size_of::<Transaction>();
        let locks_size = txn.held_locks.len() * std::mem::size_of::<String>();
        let read_set_size = txn.read_set.len() * std::mem::size_of::<String>();
        let write_set_size = txn.write_set.len() * std::mem::size_of::<String>();
        let savepoints_size = txn.savepoints.len() * std::mem::size_of::<Savepoint>();
        
        base_size + locks_size + read_set_size + write_set_size + savepoints_size
    }
    
    /// Format transaction duration
    pub fn format_duration(duration: Duration) -> String {
        let secs = duration.as_secs();
        if secs < 60 {
            format!("{}s", secs)
        } else if secs < 3600 {
            format!("{}m {}s", secs / 60, secs % 60)
        } else {
            format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
        }
    }
    
    /// Check if two transactions conflict
    pub fn transactions_conflict(txn1: &Transaction, txn2: &Transaction) -> bool {
        // Check write-write conflicts
        for key in &txn1.write_set {
            if txn2.write_set.contains(key) {
                return true));
            }
        }
        
        // Check read-write conflicts
        for key in &txn1.read_set {
            if txn2.write_set.contains(key) {
                return true;
            }
        }
        
        for key in &txn1.write_set {
            if txn2.read_set.contains(key) {
                return true;
            }
        }
        
        false
    }
}

/// Transaction validator for ensuring consistency
pub struct TransactionValidator {
    constraints: Vec<ValidationConstraint>,
}

#[derive(Debug, Clone)]
pub enum ValidationConstraint {
    MaxDuration(Duration),
    MaxOperations(usize),
    MaxMemory(usize),
    RequiredIsolationLevel(IsolationLevel),
}

impl TransactionValidator {
    pub fn new() -> Self {
        Self {
            constraints: Vec::new(),
        }
    }
    
    pub fn add_constraint(&mut self, constraint: ValidationConstraint) {
        self.constraints.push(constraint);
    }
    
    pub fn validate(&self, txn: &Transaction) -> Result<()> {
        for constraint in &self.constraints {
            match constraint {
                ValidationConstraint::MaxDuration(max_duration) => {
                    let duration = SystemTime::now().duration_since(txn.start_time).unwrap_or(Duration::from_secs(0));
                    if duration > *max_duration {
                        return Err(DbError::Transaction(format!("Transaction exceeded max duration: {:?}", max_duration)));
                    }
                }
                ValidationConstraint::MaxOperations(max_ops) => {
                    let total_ops = txn.read_set.len() + txn.write_set.len();
                    if total_ops > *max_ops {
                        return Err(DbError::Transaction(format!("Transaction exceeded max operations: {}", max_ops)));
                    }
                }
                ValidationConstraint::RequiredIsolationLevel(required_level) => {
                    if txn.isolation_level != *required_level {
                        return Err(DbError::Transaction(format!("Transaction requires isolation level: {:?}", required_level)));
                    }
                }
                _ => {}
            }
        }
        
        Ok(())
    }
}

impl Default for TransactionValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// Transaction event dispatcher for notifications
pub struct TransactionEventDispatcher {
    listeners: Arc<RwLock<Vec<Arc<dyn TransactionEventListener + Send + Sync>>>>,
}

pub trait TransactionEventListener {
    fn on_begin(&self, txn_id: TransactionId);
    fn on_commit(&self, txn_id: TransactionId);
    fn on_abort(&self, txn_id: TransactionId);
    fn on_deadlock(&self, cycle: &[TransactionId]);
}

impl TransactionEventDispatcher {
    pub fn new() -> Self {
        Self {
            listeners: Arc::new(RwLock::new(Vec::new())),
        }
    }
    
    pub fn notify_begin(&self, txn_id: TransactionId) {
        let listeners = self.listeners.read();
        for listener in listeners.iter() {
            listener.on_begin(txn_id);
        }
    }
    
    pub fn notify_commit(&self, txn_id: TransactionId) {
        let listeners = self.listeners.read();
        for listener in listeners.iter() {
            listener.on_commit(txn_id);
        }
    }
    
    pub fn notify_abort(&self, txn_id: TransactionId) {
        let listeners = self.listeners.read();
        for listener in listeners.iter() {
            listener.on_abort(txn_id);
        }
    }
    
    pub fn notify_deadlock(&self, cycle: &[TransactionId]) {
        let listeners = self.listeners.read();
        for listener in listeners.iter() {
            listener.on_deadlock(cycle);
        }
    }
}

impl Default for TransactionEventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Transaction clustering manager for grouping related transactions
pub struct TransactionClusterManager {
    clusters: Arc<RwLock<HashMap<String, TransactionCluster>>>,
}

#[derive(Debug, Clone)]
pub struct TransactionCluster {
    pub cluster_id: String,
    pub transactions: HashSet<TransactionId>,
    pub coordinator: Option<TransactionId>,
    pub state: ClusterState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClusterState {
    Active,
    Committing,
    Committed,
    Aborting,
    Aborted,
}

impl TransactionClusterManager {
    pub fn new() -> Self {
        Self {
            clusters: Arc::new(RwLock::new(HashMap::new())),
        }
    }
    
    pub fn create_cluster(&self, cluster_id: String, coordinator: TransactionId) -> Result<()> {
        let mut clusters = self.clusters.write();
        
        let cluster = TransactionCluster {
            cluster_id: cluster_id.clone(),
            transactions: HashSet::new(),
            coordinator: Some(coordinator),
            state: ClusterState::Active,
        };
        
        clusters.insert(cluster_id, cluster);
        Ok(())
    }
    
    pub fn add_to_cluster(&self, cluster_id: &str, txn_id: TransactionId) -> Result<()> {
        let mut clusters = self.clusters.write();
        
        if let Some(cluster) = clusters.get_mut(cluster_id) {
            cluster.transactions.insert(txn_id);
            Ok(())
        } else {
            Err(DbError::Transaction(format!("Cluster {} not found", cluster_id)))
        }
    }
    
    pub fn commit_cluster(&self, cluster_id: &str) -> Result<()> {
        let mut clusters = self.clusters.write()));
        
        if let Some(cluster) = clusters.get_mut(cluster_id) {
            cluster.state = ClusterState::Committing;
            // In production, would commit all transactions in cluster
            cluster.state = ClusterState::Committed;
            Ok(())
        } else {
            Err(DbError::Transaction(format!("Cluster {} not found", cluster_id)))
        }
    }
    
    pub fn abort_cluster(&self, cluster_id: &str) -> Result<()> {
        let mut clusters = self.clusters.write()));
        
        if let Some(cluster) = clusters.get_mut(cluster_id) {
            cluster.state = ClusterState::Aborting;
            // In production, would abort all transactions in cluster
            cluster.state = ClusterState::Aborted;
            Ok(())
        } else {
            Err(DbError::Transaction(format!("Cluster {} not found", cluster_id)))
        }
    }
}

impl Default for TransactionClusterManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Transaction testing utilities
pub mod test_utils {
    
    /// Create a test transaction with specified parameters
    pub fn create_test_transaction(id: TransactionId, isolation_level: IsolationLevel) -> Transaction {
        Transaction::new(id, isolation_level)
    }
    
    /// Simulate concurrent transactions
    pub fn simulate_concurrent_transactions(count: usize) -> Vec<Transaction> {
        (0..count)
            .map(|i| Transaction::new(i as TransactionId, IsolationLevel::ReadCommitted))
            .collect()
    }
    
    /// Generate conflict scenario
    pub fn generate_conflict_scenario() -> (Transaction, Transaction) {
        let mut txn1 = Transaction::new(1, IsolationLevel::ReadCommitted)));
        let mut txn2 = Transaction::new(2, IsolationLevel::ReadCommitted);
        
        txn1.write_set.insert("key1".to_string());
        txn2.write_set.insert("key1".to_string());
        
        (txn1, txn2)
    }
    
    /// Generate deadlock scenario
    pub fn generate_deadlock_scenario() -> Vec<Transaction> {
        let mut txn1 = Transaction::new(1, IsolationLevel::ReadCommitted);
        let mut txn2 = Transaction::new(2, IsolationLevel::ReadCommitted);
        
        txn1.write_set.insert("key1".to_string());
        txn1.read_set.insert("key2".to_string());
        
        txn2.write_set.insert("key2".to_string());
        txn2.read_set.insert("key1".to_string());
        
        vec![txn1, txn2]
    }
}

/// Comprehensive transaction manager with all enterprise features
pub struct EnterpriseTransactionManager {
    txn_manager: Arc<TransactionManager>,
    wal_manager: Arc<WALManager>,
    version_store: Arc<VersionStore>,
    deadlock_detector: Arc<DeadlockDetector>,
    recovery_manager: Arc<RecoveryManager>,
    statistics: Arc<TransactionStatistics>,
    snapshot_manager: Arc<SnapshotManager>,
    lock_escalation: Arc<LockEscalationManager>,
    timeout_manager: Arc<TimeoutManager>,
    two_phase_commit: Arc<TwoPhaseCommitCoordinator>,
    occ_manager: Arc<OptimisticConcurrencyControl>,
    audit_logger: Option<Arc<TransactionAuditLogger>>,
}

impl EnterpriseTransactionManager {
    pub fn new(wal_path: PathBuf) -> Result<Self> {
        let wal_manager = Arc::new(WALManager::new(wal_path, 100, true)?;
        let version_store = Arc::new(VersionStore::new());
        let recovery_manager = Arc::new(RecoveryManager::new(
            Arc::clone(&wal_manager),
            Arc::clone(&version_store),
            Duration::from_secs(300),
        ));
        
        Ok(Self {
            txn_manager: Arc::new(TransactionManager::new()),
            wal_manager,
            version_store,
            deadlock_detector: Arc::new(DeadlockDetector::default()),
            recovery_manager,
            statistics: Arc::new(TransactionStatistics::new()),
            snapshot_manager: Arc::new(SnapshotManager::new()),
            lock_escalation: Arc::new(LockEscalationManager::default()),
            timeout_manager: Arc::new(TimeoutManager::default()),
            two_phase_commit: Arc::new(TwoPhaseCommitCoordinator::default()),
            occ_manager: Arc::new(OptimisticConcurrencyControl::new()),
            audit_logger: None,
        })
    }
    
    pub fn begin_with_isolation(&self, isolation_level: IsolationLevel) -> Result<TransactionId> {
        let txn_id = self.txn_manager.begin()?;
        
        // Record in WAL
        let entry = WALEntry::Begin {
            txn_id,
            isolation_level,
            timestamp: SystemTime::now(),
        };
        self.wal_manager.append(entry)?;
        
        // Update statistics
        self.statistics.record_begin();
        
        // Create snapshot for snapshot isolation
        if isolation_level == IsolationLevel::SnapshotIsolation {
            let active_txns = HashSet::new(); // Would get from transaction manager
            self.snapshot_manager.create_snapshot(txn_id, active_txns);
        }
        
        Ok(txn_id)
    }
    
    pub fn commit_transaction(&self, txn_id: TransactionId) -> Result<()> {
        let start = SystemTime::now();
        
        // Record in WAL
        let lsn = self.wal_manager.get_current_lsn();
        let entry = WALEntry::Commit {
            txn_id,
            lsn,
            timestamp: SystemTime::now(),
        };
        self.wal_manager.append(entry)?;
        self.wal_manager.flush()?;
        
        // Commit transaction
        self.txn_manager.commit(txn_id)?;
        
        // Cleanup
        self.snapshot_manager.remove_snapshot(txn_id);
        self.lock_escalation.clear_locks(txn_id);
        self.timeout_manager.clear_timeout(txn_id);
        self.occ_manager.cleanup(txn_id);
        
        // Update statistics
        let latency = SystemTime::now().duration_since(start).unwrap_or(Duration::from_secs(0));
        self.statistics.record_commit(latency.as_millis() as u64);
        
        Ok(())
    }
    
    pub fn abort_transaction(&self, txn_id: TransactionId) -> Result<()> {
        // Record in WAL
        let lsn = self.wal_manager.get_current_lsn();
        let entry = WALEntry::Abort {
            txn_id,
            lsn,
            timestamp: SystemTime::now(),
        };
        self.wal_manager.append(entry)?;
        
        // Abort transaction
        self.txn_manager.abort(txn_id)?;
        
        // Cleanup
        self.snapshot_manager.remove_snapshot(txn_id);
        self.lock_escalation.clear_locks(txn_id);
        self.timeout_manager.clear_timeout(txn_id);
        self.occ_manager.cleanup(txn_id);
        
        // Update statistics
        self.statistics.record_abort();
        
        Ok(())
    }
    
    pub fn create_savepoint(&self, txnid: TransactionId, name: String) -> Result<Savepoint> {
        let lsn = self.wal_manager.get_current_lsn();
        
        // Record in WAL
        let entry = WALEntry::Savepoint {
            txn_id,
            name: name.clone(),
            lsn,
        };
        self.wal_manager.append(entry)?;
        
        // Create savepoint on transaction
        let savepoint = Savepoint {
            id: 0,
            name,
            txn_id,
            lsn,
            timestamp: SystemTime::now(),
        };
        
        Ok(savepoint)
    }
    
    pub fn detect_deadlocks(&self) -> Option<Vec<TransactionId>> {
        self.deadlock_detector.detect_deadlock()
    }
    
    pub fn get_statistics(&self) -> StatisticsSummary {
        self.statistics.get_summary()
    }
    
    pub fn recover(&self) -> Result<()> {
        self.recovery_manager.recover()
    }
    
    pub fn create_checkpoint(&self) -> Result<LogSequenceNumber> {
        let active_txns = Vec::new(); // Would get from transaction manager
        self.recovery_manager.create_checkpoint(active_txns)
    }
}

/// Transaction benchmarking and profiling tools
pub mod benchmarking {
    
    pub struct TransactionBenchmark {
        pub name: String,
        pub iterations: usize,
        pub concurrent_transactions: usize,
    }
    
    impl TransactionBenchmark {
        pub fn new(name: String, iterations: usize, concurrent_transactions: usize) -> Self {
            Self {
                name,
                iterations,
                concurrent_transactions,
            }
        }
        
        pub fn run<F>(&self, mut operation: F) -> BenchmarkResult
        where
            F: FnMut() -> Result<()>,
        {
            let start = SystemTime::now();
            let mut successful = 0;
            let mut failed = 0;
            
            for _ in 0..self.iterations {
                match operation() {
                    Ok(_) => successful += 1,
                    Err(_) => failed += 1,
                }
            }
            
            let duration = SystemTime::now().duration_since(start).unwrap_or(Duration::from_secs(0));
            let throughput = successful as f64 / duration.as_secs_f64();
            
            BenchmarkResult {
                name: self.name.clone(),
                total_operations: self.iterations,
                successful_operations: successful,
                failed_operations: failed,
                duration_ms: duration.as_millis() as u64,
                throughput_ops_per_sec: throughput,
            }
        }
    }
    
    #[derive(Debug, Clone)]
    pub struct BenchmarkResult {
        pub name: String,
        pub total_operations: usize,
        pub successful_operations: usize,
        pub failed_operations: usize,
        pub duration_ms: u64,
        pub throughput_ops_per_sec: f64,
    }
    
    impl BenchmarkResult {
        pub fn print_summary(&self) {
            println!("Benchmark: {}", self.name);
            println!("  Total Operations: {}", self.total_operations);
            println!("  Successful: {}", self.successful_operations);
            println!("  Failed: {}", self.failed_operations);
            println!("  Duration: {} ms", self.duration_ms);
            println!("  Throughput: {:.2} ops/sec", self.throughput_ops_per_sec);
        }
    }
}

/// Transaction debugging utilities
pub mod debugging {
    
    /// Debug printer for transaction state
    pub fn print_transaction_state(txn: &Transaction) {
        println!("Transaction ID: {}", txn.id);
        println!("State: {:?}", txn.state);
        println!("Isolation Level: {:?}", txn.isolation_level);
        println!("Start Time: {:?}", txn.start_time);
        println!("Held Locks: {}", txn.held_locks.len());
        println!("Read Set Size: {}", txn.read_set.len());
        println!("Write Set Size: {}", txn.write_set.len());
        println!("Savepoints: {}", txn.savepoints.len());
        println!("Is Readonly: {}", txn.is_readonly);
    }
    
    /// Trace transaction execution
    pub struct TransactionTracer {
        traces: Arc<RwLock<HashMap<TransactionId, Vec<TraceEvent>>>>,
    }
    
    #[derive(Debug, Clone)]
    pub struct TraceEvent {
        pub timestamp: SystemTime,
        pub event_type: String,
        pub details: String,
    }
    
    impl TransactionTracer {
        pub fn new() -> Self {
            Self {
                traces: Arc::new(RwLock::new(HashMap::new())),
            }
        }
        
        pub fn trace(&self, txn_id: TransactionId, event_type: String, details: String) {
            let event = TraceEvent {
                timestamp: SystemTime::now(),
                event_type,
                details,
            };
            
            let mut traces = self.traces.write();
            traces.entry(txn_id).or_insert_with(Vec::new).push(event);
        }
        
        pub fn get_trace(&self, txn_id: TransactionId) -> Vec<TraceEvent> {
            self.traces.read().get(&txn_id).cloned().unwrap_or_default()
        }
        
        pub fn print_trace(&self, txn_id: TransactionId) {
            if let Some(events) = self.traces.read().get(&txn_id) {
                println!("Trace for Transaction {}:", txn_id);
                for event in events {
                    println!("  [{:?}] {}: {}", event.timestamp, event.event_type, event.details);
                }
            }
        }
    }
    
    impl Default for TransactionTracer {
        fn default() -> Self {
            Self::new()
        }
    }
}

#[cfg(test)]
mod tests {
    
    #[test]
    fn test_transaction_lifecycle() -> Result<()> {
        let tm = TransactionManager::new();
        
        let txn_id = tm.begin()?;
        assert!(txn_id == 0);
        
        tm.commit(txn_id)?;
        
        Ok(())
    }
    
    #[test]
    fn test_lock_manager() -> Result<()> {
        let lm = LockManager::new();
        
        lm.acquire_lock(1, "resource1".to_string(), LockMode::Shared)?;
        lm.acquire_lock(2, "resource1".to_string(), LockMode::Shared)?;
        
        lm.release_lock(1, "resource1")?;
        lm.release_lock(2, "resource1")?;
        
        Ok(())
    }
}


