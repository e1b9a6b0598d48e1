// Background Population Manager for In-Memory Column Store
//
// Manages automatic population of columnar data from disk storage:
// - Priority-based population ordering
// - Background worker threads
// - Progress tracking and monitoring
// - Memory pressure handling
// - Repopulation after modifications

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::collections::{HashMap, BinaryHeap};
use std::cmp::Ordering as CmpOrdering;
use std::time::{Duration};
use parking_lot::{RwLock};
use std::thread;

use crate::inmemory::column_store::ColumnStore;
use crate::inmemory::compression::HybridCompressor;

/// Population priority levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PopulationPriority {
    Critical = 4,
    High = 3,
    Medium = 2,
    Low = 1,
    Background = 0,
}

/// Population strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopulationStrategy {
    /// Populate all columns immediately
    Immediate,
    /// Populate based on access patterns
    OnDemand,
    /// Populate in priority order
    Priority,
    /// Populate during idle time
    Lazy,
    /// Populate frequently accessed columns
    HotData,
}

/// Population task
#[derive(Debug, Clone)]
pub struct PopulationTask {
    pub task_id: u64,
    pub store_name: String,
    pub column_ids: Vec<u32>,
    pub priority: PopulationPriority,
    pub strategy: PopulationStrategy,
    pub created_at: u64,
    pub scheduled_at: Option<u64>,
    pub started_at: Option<u64>,
    pub completed_at: Option<u64>,
}

impl PopulationTask {
    pub fn new(
        task_id: u64,
        store_name: String,
        column_ids: Vec<u32>,
        priority: PopulationPriority,
        strategy: PopulationStrategy,
    ) -> Self {
        Self {
            task_id,
            store_name,
            column_ids,
            priority,
            strategy,
            created_at: current_timestamp(),
            scheduled_at: None,
            started_at: None,
            completed_at: None,
        }
    }

    pub fn duration_ms(&self) -> Option<u64> {
        if let (Some(start), Some(end)) = (self.started_at, self.completed_at) {
            Some((end - start) * 1000)
        } else {
            None
        }
    }

    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some() && self.completed_at.is_none()
    }
}

impl PartialEq for PopulationTask {
    fn eq(&self, other: &Self) -> bool {
        self.task_id == other.task_id
    }
}

impl Eq for PopulationTask {}

impl PartialOrd for PopulationTask {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl Ord for PopulationTask {
    fn cmp(&self, other: &Self) -> CmpOrdering {
        // Higher priority tasks come first
        self.priority
            .cmp(&other.priority)
            .then_with(|| self.created_at.cmp(&other.created_at))
    }
}

/// Progress tracking for population
#[derive(Debug, Clone)]
pub struct PopulationProgress {
    pub task_id: u64,
    pub total_rows: usize,
    pub processed_rows: usize,
    pub total_columns: usize,
    pub processed_columns: usize,
    pub bytes_read: usize,
    pub bytes_written: usize,
    pub compression_ratio: f64,
    pub estimated_completion: Option<u64>,
}

impl PopulationProgress {
    pub fn new(task_id: u64, total_rows: usize, total_columns: usize) -> Self {
        Self {
            task_id,
            total_rows,
            processed_rows: 0,
            total_columns,
            processed_columns: 0,
            bytes_read: 0,
            bytes_written: 0,
            compression_ratio: 1.0,
            estimated_completion: None,
        }
    }

    pub fn percentage(&self) -> f64 {
        if self.total_rows == 0 || self.total_columns == 0 {
            return 0.0;
        }

        let row_progress = self.processed_rows as f64 / self.total_rows as f64;
        let col_progress = self.processed_columns as f64 / self.total_columns as f64;

        ((row_progress + col_progress) / 2.0) * 100.0
    }

    pub fn update_row_progress(&mut self, rows: usize) {
        self.processed_rows = self.processed_rows.saturating_add(rows);
    }

    pub fn update_column_progress(&mut self, columns: usize) {
        self.processed_columns = self.processed_columns.saturating_add(columns);
    }

    pub fn update_bytes(&mut self, read: usize, written: usize) {
        self.bytes_read = self.bytes_read.saturating_add(read);
        self.bytes_written = self.bytes_written.saturating_add(written);

        if self.bytes_written > 0 {
            self.compression_ratio = self.bytes_read as f64 / self.bytes_written as f64;
        }
    }
}

/// Statistics about population operations
#[derive(Debug, Clone, Default)]
pub struct PopulationStats {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub failed_tasks: usize,
    pub running_tasks: usize,
    pub queued_tasks: usize,
    pub total_rows_populated: usize,
    pub total_bytes_populated: usize,
    pub average_compression_ratio: f64,
    pub average_population_time_ms: u64,
}

/// Memory pressure handler
pub struct MemoryPressureHandler {
    max_memory: AtomicUsize,
    current_memory: AtomicUsize,
    pressure_threshold: f64,
    eviction_enabled: AtomicBool,
    eviction_count: AtomicUsize,
}

impl MemoryPressureHandler {
    pub fn new(max_memory: usize, pressure_threshold: f64) -> Self {
        Self {
            max_memory: AtomicUsize::new(max_memory),
            current_memory: AtomicUsize::new(0),
            pressure_threshold,
            eviction_enabled: AtomicBool::new(true),
            eviction_count: AtomicUsize::new(0),
        }
    }

    pub fn allocate(&self, bytes: usize) -> bool {
        let current = self.current_memory.load(Ordering::Relaxed);
        let max = self.max_memory.load(Ordering::Relaxed);

        if current + bytes <= max {
            self.current_memory.fetch_add(bytes, Ordering::Relaxed);
            true
        } else {
            false
        }
    }

    pub fn deallocate(&self, bytes: usize) {
        self.current_memory.fetch_sub(bytes, Ordering::Relaxed);
    }

    pub fn check_pressure(&self) -> bool {
        let current = self.current_memory.load(Ordering::Relaxed);
        let max = self.max_memory.load(Ordering::Relaxed);
        let threshold = (max as f64 * self.pressure_threshold) as usize;

        current > threshold
    }

    pub fn pressure_level(&self) -> f64 {
        let current = self.current_memory.load(Ordering::Relaxed);
        let max = self.max_memory.load(Ordering::Relaxed);

        if max == 0 {
            return 0.0;
        }

        current as f64 / max as f64
    }

    pub fn should_evict(&self) -> bool {
        self.eviction_enabled.load(Ordering::Relaxed) && self.check_pressure()
    }

    pub fn evict_if_needed(&self, target_bytes: usize) -> bool {
        if !self.should_evict() {
            return false;
        }

        // In a real implementation, this would trigger eviction of cold segments
        self.eviction_count.fetch_add(1, Ordering::Relaxed);
        self.deallocate(target_bytes);
        true
    }

    pub fn get_stats(&self) -> (usize, usize, f64, usize) {
        (
            self.current_memory.load(Ordering::Relaxed),
            self.max_memory.load(Ordering::Relaxed),
            self.pressure_level(),
            self.eviction_count.load(Ordering::Relaxed),
        )
    }
}

/// Population worker thread
struct PopulationWorker {
    worker_id: usize,
    running: Arc<AtomicBool>,
    task_queue: Arc<Mutex<BinaryHeap<PopulationTask>>>,
    progress_tracker: Arc<RwLock<HashMap<u64, PopulationProgress>>>,
    memory_handler: Arc<MemoryPressureHandler>,
    compressor: Arc<HybridCompressor>,
}

impl PopulationWorker {
    fn new(
        worker_id: usize,
        task_queue: Arc<Mutex<BinaryHeap<PopulationTask>>>,
        progress_tracker: Arc<RwLock<HashMap<u64, PopulationProgress>>>,
        memory_handler: Arc<MemoryPressureHandler>,
    ) -> Self {
        Self {
            worker_id,
            running: Arc::new(AtomicBool::new(false)),
            task_queue,
            progress_tracker,
            memory_handler,
            compressor: Arc::new(HybridCompressor::new()),
        }
    }

    fn run(&self) {
        self.running.store(true, Ordering::SeqCst);

        while self.running.load(Ordering::SeqCst) {
            // Get next task
            let task = {
                let mut queue = self.task_queue.lock();
                queue.pop()
            };

            if let Some(mut task) = task {
                task.started_at = Some(current_timestamp());

                // Execute population
                self.execute_task(&task);

                task.completed_at = Some(current_timestamp());
            } else {
                // No tasks available
                thread::sleep(Duration::from_millis(100));
            }
        }
    }

    fn execute_task(&self, task: &PopulationTask) {
        // Initialize progress tracking
        let progress = PopulationProgress::new(
            task.task_id,
            1000000, // Example: 1M rows
            task.column_ids.len(),
        );

        self.progress_tracker
            .write()
            .insert(task.task_id, progress);

        // Simulate population from disk
        for (_idx, &column_id) in task.column_ids.iter().enumerate() {
            // Check memory pressure
            if self.memory_handler.should_evict() {
                self.memory_handler.evict_if_needed(1024 * 1024); // Evict 1MB
            }

            // Simulate reading data
            let row_count = 10000;
            let data = self.generate_test_data(column_id, row_count);

            // Allocate memory
            if !self.memory_handler.allocate(data.len()) {
                // Out of memory, skip this column
                continue;
            }

            // Update progress
            if let Some(progress) = self.progress_tracker.write().get_mut(&task.task_id) {
                progress.update_column_progress(1);
                progress.update_bytes(data.len(), data.len());
            }

            // Simulate work
            thread::sleep(Duration::from_millis(10));
        }

        // Mark as completed
        self.progress_tracker.write().remove(&task.task_id);
    }

    fn generate_test_data(&self, column_id: u32, row_count: usize) -> Vec<u8> {
        // Generate test data for simulation
        let mut data = Vec::with_capacity(row_count * 8);
        for _i in 0..row_count {
            let _value = (column_id as i64 * 1000 + i as i64) % 10000;
            data.extend_from_slice(&value.to_le_bytes());
        }
        data
    }

    fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

/// Main population manager
pub struct PopulationManager {
    next_task_id: AtomicU64,
    task_queue: Arc<Mutex<BinaryHeap<PopulationTask>>>,
    completed_tasks: Arc<RwLock<VecDeque<PopulationTask>>>,
    progress_tracker: Arc<RwLock<HashMap<u64, PopulationProgress>>>,
    memory_handler: Arc<MemoryPressureHandler>,
    workers: RwLock<Vec<PopulationWorker>>,
    worker_threads: RwLock<Vec<thread::JoinHandle<()>>>,
    running: Arc<AtomicBool>,
    stats: RwLock<PopulationStats>,
}

impl PopulationManager {
    pub fn new(num_workers: usize, max_memory: usize) -> Self {
        let task_queue = Arc::new(Mutex::new(BinaryHeap::new()));
        let progress_tracker = Arc::new(RwLock::new(HashMap::new()));
        let memory_handler = Arc::new(MemoryPressureHandler::new(max_memory, 0.9));

        let manager = Self {
            next_task_id: AtomicU64::new(0),
            task_queue: task_queue.clone(),
            completed_tasks: Arc::new(RwLock::new(VecDeque::new())),
            progress_tracker: progress_tracker.clone(),
            memory_handler: memory_handler.clone(),
            workers: RwLock::new(Vec::new()),
            worker_threads: RwLock::new(Vec::new()),
            running: Arc::new(AtomicBool::new(false)),
            stats: RwLock::new(PopulationStats::default()),
        };

        manager.start_workers(num_workers);
        manager
    }

    fn start_workers(&self, num_workers: usize) {
        self.running.store(true, Ordering::SeqCst);

        let mut workers = self.workers.write();
        let mut threads = self.worker_threads.write();

        for _i in 0..num_workers {
            let worker = PopulationWorker::new(
                i,
                self.task_queue.clone(),
                self.progress_tracker.clone(),
                self.memory_handler.clone(),
            );

            let _worker_running = worker.running.clone();
            let task_queue = self.task_queue.clone();
            let progress_tracker = self.progress_tracker.clone();
            let memory_handler = self.memory_handler.clone();

            let handle = thread::spawn(move || {
                let w = PopulationWorker::new(i, task_queue, progress_tracker, memory_handler);
                w.run();
            });

            threads.push(handle);
            workers.push(worker);
        }
    }

    pub fn schedule_population(&self, store: Arc<ColumnStore>) {
        let task_id = self.next_task_id.fetch_add(1, Ordering::SeqCst);

        // Get all column IDs from the store
        let column_ids: Vec<u32> = (0..10).collect(); // Example: first 10 columns

        let task = PopulationTask::new(
            task_id,
            store.name().to_string(),
            column_ids,
            PopulationPriority::Medium,
            PopulationStrategy::Priority,
        );

        self.task_queue.lock().push(task.clone());

        let mut stats = self.stats.write();
        stats.total_tasks += 1;
        stats.queued_tasks += 1;
    }

    pub fn schedule_column(&self, store_name: String, column_id: u32, priority: PopulationPriority) {
        let task_id = self.next_task_id.fetch_add(1, Ordering::SeqCst);

        let task = PopulationTask::new(
            task_id,
            store_name,
            vec![column_id],
            priority,
            PopulationStrategy::OnDemand,
        );

        self.task_queue.lock().push(task);

        let mut stats = self.stats.write();
        stats.total_tasks += 1;
        stats.queued_tasks += 1;
    }

    pub fn get_progress(&self, task_id: u64) -> Option<PopulationProgress> {
        self.progress_tracker.read().get(&task_id).cloned()
    }

    pub fn list_active_tasks(&self) -> Vec<u64> {
        self.progress_tracker.read().keys().copied().collect()
    }

    pub fn pause(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.running.store(true, Ordering::SeqCst);
    }

    pub fn shutdown(&self) {
        self.running.store(false, Ordering::SeqCst);

        // Stop all workers
        for worker in self.workers.read().iter() {
            worker.stop();
        }

        // Wait for threads to finish (with timeout)
        // Note: In production, would properly join threads
    }

    pub fn stats(&self) -> PopulationStats {
        let mut stats = self.stats.read().clone();

        stats.queued_tasks = self.task_queue.lock().len();
        stats.running_tasks = self.progress_tracker.read().len();

        stats
    }

    pub fn memory_stats(&self) -> (usize, usize, f64) {
        let (current, max, pressure, _) = self.memory_handler.get_stats();
        (current, max, pressure)
    }

    pub fn clear_completed(&self) {
        self.completed_tasks.write().clear();
    }

    pub fn repopulate_column(&self, store_name: String, column_id: u32) {
        // Schedule high-priority repopulation after modification
        self.schedule_column(store_name, column_id, PopulationPriority::High);
    }

    pub fn set_max_memory(&self, max_memory: usize) {
        self.memory_handler
            .max_memory
            .store(max_memory, Ordering::Relaxed);
    }

    pub fn enable_eviction(&self, enabled: bool) {
        self.memory_handler
            .eviction_enabled
            .store(enabled, Ordering::Relaxed);
    }
}

impl Drop for PopulationManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_population_priority() {
        let task1 = PopulationTask::new(
            1,
            "test".to_string(),
            vec![0],
            PopulationPriority::Low,
            PopulationStrategy::Lazy,
        );

        let task2 = PopulationTask::new(
            2,
            "test".to_string(),
            vec![1],
            PopulationPriority::High,
            PopulationStrategy::Immediate,
        );

        assert!(task2 > task1);
    }

    #[test]
    fn test_population_progress() {
        let mut progress = PopulationProgress::new(1, 1000, 10);

        progress.update_row_progress(500);
        progress.update_column_progress(5);

        assert_eq!(progress.percentage(), 50.0);
    }

    #[test]
    fn test_memory_pressure_handler() {
        let handler = MemoryPressureHandler::new(1000, 0.8);

        assert!(handler.allocate(500));
        assert_eq!(handler.current_memory.load(Ordering::Relaxed), 500);

        assert!(handler.allocate(300));
        assert_eq!(handler.current_memory.load(Ordering::Relaxed), 800);

        assert!(!handler.check_pressure()); // 800/1000 = 80%

        assert!(handler.allocate(100));
        assert!(handler.check_pressure()); // 900/1000 = 90% > 80%
    }

    #[test]
    fn test_population_manager() {
        let manager = PopulationManager::new(2, 1024 * 1024 * 1024);

        manager.schedule_column("test_store".to_string(), 0, PopulationPriority::Medium);

        let _stats = manager.stats();
        assert_eq!(stats.total_tasks, 1);
        assert_eq!(stats.queued_tasks, 1);

        manager.shutdown();
    }
}


