//! Background Writer and Flush Management
//!
//! Background writer, write coalescing, double-write buffer, and flush lists.

use super::common::*;
use serde::{Serialize, Deserialize};

pub struct BackgroundWriter {
    /// Write batch size
    batch_size: usize,
    /// Write interval
    interval: Duration,
    /// Maximum dirty page percentage before aggressive flushing
    dirty_threshold: f64,
    /// Running flag
    running: Arc<AtomicBool>,
    /// Statistics
    stats: BackgroundWriterStats,
}

#[derive(Debug)]
struct BackgroundWriterStats {
    write_cycles: AtomicU64,
    pages_written: AtomicU64,
    bytes_written: AtomicU64,
}

impl BackgroundWriter {
    pub fn new(batch_size: usize, interval_secs: u64, dirty_threshold: f64) -> Self {
        Self {
            batch_size,
            interval: Duration::from_secs(interval_secs),
            dirty_threshold,
            running: Arc::new(AtomicBool::new(false)),
            stats: BackgroundWriterStats {
                write_cycles: AtomicU64::new(0),
                pages_written: AtomicU64::new(0),
                bytes_written: AtomicU64::new(0),
            },
        }
    }

    /// Start background writer
    pub fn start(&self) {
        if self.running.swap(true, Ordering::Acquire) {
            return;
        }

        let interval = self.interval;
        let running = self.running.clone();

        std::thread::spawn(move || {
            while running.load(Ordering::Acquire) {
                std::thread::sleep(interval);
                // Would perform background writes here
            }
        });
    }

    /// Stop background writer
    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }

    /// Get statistics
    pub fn get_stats(&self) -> BackgroundWriterStatsSnapshot {
        BackgroundWriterStatsSnapshot {
            write_cycles: self.stats.write_cycles.load(Ordering::Relaxed),
            pages_written: self.stats.pages_written.load(Ordering::Relaxed),
            bytes_written: self.stats.bytes_written.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackgroundWriterStatsSnapshot {
    pub write_cycles: u64,
    pub pages_written: u64,
    pub bytes_written: u64,
}

/// Write coalescing buffer
pub struct WriteCoalescingBuffer {
    /// Pending writes grouped by extent
    pending_writes: Mutex<HashMap<u64, Vec<DirtyPage>>>,
    /// Coalescing window (time to wait for adjacent pages)
    coalesce_window: Duration,
    /// Statistics
    stats: CoalescingStats,
}

#[derive(Debug)]
struct CoalescingStats {
    writes_coalesced: AtomicU64,
    io_operations_saved: AtomicU64,
}

impl WriteCoalescingBuffer {
    pub fn new(coalesce_window_ms: u64) -> Self {
        Self {
            pending_writes: Mutex::new(HashMap::new()),
            coalesce_window: Duration::from_millis(coalesce_window_ms),
            stats: CoalescingStats {
                writes_coalesced: AtomicU64::new(0),
                io_operations_saved: AtomicU64::new(0),
            },
        }
    }

    /// Add page to coalescing buffer
    pub fn add_page(&self, page: DirtyPage) {
        let extent_id = page.page_id.page_number / 64; // 64 pages per extent

        let mut pending = self.pending_writes.lock();
        pending.entry(extent_id)
            .or_insert_with(Vec::new)
            .push(page);
    }

    /// Flush extent if coalescing window expired or extent is full
    pub fn try_flush_extent(&self, extent_id: u64) -> Option<Vec<DirtyPage>> {
        let mut pending = self.pending_writes.lock();

        if let Some(pages) = pending.get(&extent_id) {
            let oldest_time = pages.iter()
                .map(|p| p.dirty_time)
                .min()
                .unwrap();

            if oldest_time.elapsed() >= self.coalesce_window || pages.len() >= 64 {
                let pages = pending.remove(&extent_id).unwrap();
                let saved_io = (pages.len() as u64).saturating_sub(1);

                self.stats.writes_coalesced.fetch_add(1, Ordering::Relaxed);
                self.stats.io_operations_saved.fetch_add(saved_io, Ordering::Relaxed);

                return Some(pages);
            }
        }

        None
    }

    /// Get statistics
    pub fn get_stats(&self) -> CoalescingStatsSnapshot {
        CoalescingStatsSnapshot {
            writes_coalesced: self.stats.writes_coalesced.load(Ordering::Relaxed),
            io_operations_saved: self.stats.io_operations_saved.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoalescingStatsSnapshot {
    pub writes_coalesced: u64,
    pub io_operations_saved: u64,
}

/// Double-write buffer for crash recovery
pub struct DoubleWriteBuffer {
    /// Buffer capacity (number of pages)
    capacity: usize,
    /// Buffer pages
    buffer: Mutex<Vec<DirtyPage>>,
    /// Flush threshold
    flush_threshold: usize,
    /// Statistics
    stats: DoubleWriteStats,
}

#[derive(Debug)]
struct DoubleWriteStats {
    pages_buffered: AtomicU64,
    buffer_flushes: AtomicU64,
    recovery_operations: AtomicU64,
}

impl DoubleWriteBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            buffer: Mutex::new(Vec::with_capacity(capacity)),
            flush_threshold: capacity * 3 / 4, // Flush at 75% full
            stats: DoubleWriteStats {
                pages_buffered: AtomicU64::new(0),
                buffer_flushes: AtomicU64::new(0),
                recovery_operations: AtomicU64::new(0),
            },
        }
    }

    /// Add page to double-write buffer
    pub fn add_page(&self, page: DirtyPage) -> bool {
        let mut buffer = self.buffer.lock();

        if buffer.len() >= self.capacity {
            return false; // Buffer full
        }

        buffer.push(page);
        self.stats.pages_buffered.fetch_add(1, Ordering::Relaxed);

        buffer.len() >= self.flush_threshold
    }

    /// Flush double-write buffer
    pub fn flush(&self) -> usize {
        let mut buffer = self.buffer.lock();
        let page_count = buffer.len();

        if page_count == 0 {
            return 0;
        }

        // Step 1: Write all pages to double-write buffer area
        // (In real implementation, would write to dedicated disk area)

        // Step 2: Fsync double-write buffer

        // Step 3: Write pages to their actual locations

        // Step 4: Clear buffer
        buffer.clear();

        self.stats.buffer_flushes.fetch_add(1, Ordering::Relaxed);
        page_count
    }

    /// Recover from double-write buffer after crash
    pub fn recover(&self) -> usize {
        // Would read double-write buffer from disk and restore any partial writes
        self.stats.recovery_operations.fetch_add(1, Ordering::Relaxed);
        0
    }

    /// Get statistics
    pub fn get_stats(&self) -> DoubleWriteStatsSnapshot {
        DoubleWriteStatsSnapshot {
            pages_buffered: self.stats.pages_buffered.load(Ordering::Relaxed),
            buffer_flushes: self.stats.buffer_flushes.load(Ordering::Relaxed),
            recovery_operations: self.stats.recovery_operations.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoubleWriteStatsSnapshot {
    pub pages_buffered: u64,
    pub buffer_flushes: u64,
    pub recovery_operations: u64,
}

/// Flush list manager
pub struct FlushListManager {
    /// Flush lists per tablespace
    flush_lists: PRwLock<HashMap<u32, Mutex<VecDeque<DirtyPage>>>>,
    /// Flush batch size
    batch_size: usize,
    /// Statistics
    stats: FlushListStats,
}

#[derive(Debug)]
struct FlushListStats {
    pages_added: AtomicU64,
    pages_flushed: AtomicU64,
    flush_operations: AtomicU64,
}

impl FlushListManager {
    pub fn new(batch_size: usize) -> Self {
        Self {
            flush_lists: PRwLock::new(HashMap::new()),
            batch_size,
            stats: FlushListStats {
                pages_added: AtomicU64::new(0),
                pages_flushed: AtomicU64::new(0),
                flush_operations: AtomicU64::new(0),
            },
        }
    }

    /// Add page to flush list
    pub fn add_page(&self, page: DirtyPage) {
        let tablespace_id = page.page_id.tablespace_id;

        let lists = self.flush_lists.read();
        if let Some(list) = lists.get(&tablespace_id) {
            let mut list = list.lock();
            list.push_back(page);
            self.stats.pages_added.fetch_add(1, Ordering::Relaxed);
            return;
        }
        drop(lists);

        // Create new flush list for tablespace
        let mut lists = self.flush_lists.write();
        let list = lists.entry(tablespace_id)
            .or_insert_with(|| Mutex::new(VecDeque::new()));

        let mut list = list.lock();
        list.push_back(page);
        self.stats.pages_added.fetch_add(1, Ordering::Relaxed);
    }

    /// Flush pages from a tablespace
    pub fn flush_tablespace(&self, tablespace_id: u32, max_pages: usize) -> usize {
        let lists = self.flush_lists.read();
        if let Some(list) = lists.get(&tablespace_id) {
            let mut list = list.lock();
            let flush_count = std::cmp::min(list.len(), max_pages);

            for _ in 0..flush_count {
                if let Some(page) = list.pop_front() {
                    // Flush page to disk
                    page.frame.dirty.store(false, Ordering::Release);
                }
            }

            self.stats.pages_flushed.fetch_add(flush_count as u64, Ordering::Relaxed);
            self.stats.flush_operations.fetch_add(1, Ordering::Relaxed);

            return flush_count;
        }

        0
    }

    /// Flush all tablespaces
    pub fn flush_all(&self) -> usize {
        let lists = self.flush_lists.read();
        let mut total_flushed = 0;

        for (tablespace_id, _) in lists.iter() {
            total_flushed += self.flush_tablespace(*tablespace_id, self.batch_size);
        }

        total_flushed
    }

    /// Get statistics
    pub fn get_stats(&self) -> FlushListStatsSnapshot {
        FlushListStatsSnapshot {
            pages_added: self.stats.pages_added.load(Ordering::Relaxed),
            pages_flushed: self.stats.pages_flushed.load(Ordering::Relaxed),
            flush_operations: self.stats.flush_operations.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlushListStatsSnapshot {
    pub pages_added: u64,
    pub pages_flushed: u64,
    pub flush_operations: u64,
}

