// # Flashback Technology Module
//
// Oracle-like time travel and point-in-time recovery capabilities for RustyDB.
//
// This module provides comprehensive flashback technology including:
//
// - **Time Travel**: AS OF TIMESTAMP/SCN queries for temporal data access
// - **Version Tracking**: VERSIONS BETWEEN queries and row version management
// - **Table Restore**: FLASHBACK TABLE to restore tables to previous states
// - **Database Recovery**: FLASHBACK DATABASE for point-in-time database recovery
// - **Transaction Analysis**: FLASHBACK TRANSACTION for analyzing and reversing transactions
//
// ## Architecture
//
// The flashback system is built on top of RustyDB's MVCC infrastructure and provides
// multiple levels of temporal query and recovery capabilities:
//
// ```text
// ┌─────────────────────────────────────────────────────────────┐
// │                    Flashback Technology                      │
// ├─────────────────────────────────────────────────────────────┤
// │                                                              │
// │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐     │
// │  │ Time Travel  │  │   Versions   │  │ Transaction  │     │
// │  │    Engine    │  │   Manager    │  │   Flashback  │     │
// │  └──────────────┘  └──────────────┘  └──────────────┘     │
// │         │                 │                   │             │
// │         └─────────────────┴───────────────────┘             │
// │                          │                                  │
// │  ┌──────────────┐  ┌──────────────┐                       │
// │  │ Table Restore│  │  Database    │                       │
// │  │   Manager    │  │  Flashback   │                       │
// │  └──────────────┘  └──────────────┘                       │
// │                                                              │
// └─────────────────────────────────────────────────────────────┘
//                            │
//                ┌───────────┴───────────┐
//                │   MVCC / Storage      │
//                └───────────────────────┘
// ```
//
// ## Features
//
// ### Time Travel Queries
//
// Query historical data at specific points in time:
//
// ```sql
// SELECT * FROM employees AS OF TIMESTAMP '2024-01-01 12:00:00';
// SELECT * FROM accounts AS OF SCN 12345;
// SELECT * FROM orders VERSIONS BETWEEN SCN 1000 AND 2000;
// ```
//
// ### Table Flashback
//
// Restore tables to previous states:
//
// ```sql
// FLASHBACK TABLE employees TO TIMESTAMP '2024-01-01 12:00:00';
// FLASHBACK TABLE employees TO SCN 12345;
// FLASHBACK TABLE employees TO BEFORE DROP;
// ```
//
// ### Database Recovery
//
// Recover entire database to a point in time:
//
// ```sql
// FLASHBACK DATABASE TO TIMESTAMP '2024-01-01 12:00:00';
// FLASHBACK DATABASE TO RESTORE POINT before_migration;
// ALTER DATABASE OPEN RESETLOGS;
// ```
//
// ### Transaction Analysis
//
// Analyze and reverse transactions:
//
// ```sql
// SELECT * FROM FLASHBACK_TRANSACTION_QUERY WHERE xid = '0x1234';
// FLASHBACK TRANSACTION '0x1234' CASCADE;
// ```
//
// ## Usage Example
//
// ```rust,no_run
// use rusty_db::flashback::{TimeTravelEngine, TimeTravelConfig};
// use std::sync::Arc;
//
// let config = TimeTravelConfig::default();
// let engine = Arc::new(TimeTravelEngine::new(config));
//
// // Query historical data
// let historical_rows = engine.query_as_of_scn(
//     table_id,
//     target_scn,
//     None
// )?;
// # Ok::<(), rusty_db::error::DbError>(())
// ```
//
// ## Integration Points
//
// The flashback module integrates with:
//
// - **Transaction Module**: MVCC snapshot isolation and version visibility
// - **Storage Module**: Version chain storage and retrieval
// - **Backup Module**: Archive log coordination and point-in-time recovery
// - **Catalog Module**: Schema versioning and DDL flashback
// - **Index Module**: Temporal index structures for fast historical queries
//
// ## Performance Considerations
//
// - **Version Storage**: Efficient delta-based storage minimizes overhead
// - **Temporal Indexes**: B-tree indexes on SCN for fast range queries
// - **Query Cache**: LRU cache for frequently accessed historical states
// - **Garbage Collection**: Automatic cleanup of old versions based on retention policies
// - **Flashback Logs**: Optimized flashback logs for database-level recovery
//
// ## Target LOC
//
// - time_travel.rs: 800+ lines
// - versions.rs: 700+ lines
// - table_restore.rs: 600+ lines
// - database.rs: 500+ lines
// - transaction.rs: 400+ lines
// - **Total: 3000+ lines**

// ============================================================================
// Module Declarations
// ============================================================================

pub mod time_travel;
pub mod versions;
pub mod table_restore;
pub mod database;
pub mod transaction;

// ============================================================================
// Re-exports
// ============================================================================

// Time Travel exports
pub use time_travel::{
    TimeTravelEngine,
    TimeTravelConfig,
    TimeTravelStats,
    RowVersion,
    VersionChain,
    BiTemporalMetadata,
    BiTemporalRow,
    HistoricalRow,
    TemporalPredicate,
    TemporalBTreeIndex,
    TemporalIndexEntry,
    TemporalOperation,
    SCN,
    Timestamp,
    VersionId,
    current_timestamp,
    system_time_to_timestamp,
    timestamp_to_system_time,
};

// Versions exports
pub use versions::{
    VersionManager,
    VersionConfig,
    VersionStats,
    VersionRow,
    VersionOperation,
    VersionBound,
    VersionRetentionPolicy,
    VersionMetadata,
    VersionComparison,
    ColumnChange,
    UndoRecord,
    GarbageCollectionResult,
    VersionJoinExecutor,
    JoinCondition,
    JoinedVersionRow,
};

// Table Restore exports
pub use table_restore::{
    TableRestoreManager,
    TableRestoreConfig,
    TableRestoreStats,
    FlashbackOptions,
    FlashbackResult,
};

// Database Flashback exports
pub use database::{
    DatabaseFlashbackManager,
    DatabaseFlashbackConfig,
    DatabaseFlashbackStats,
    DatabaseFlashbackResult,
    Incarnation,
    IncarnationStatus,
    GuaranteedRestorePoint,
};

// Transaction Flashback exports
pub use transaction::{
    TransactionFlashbackManager,
    TransactionFlashbackStats,
    TransactionOperation,
    OperationType,
    TransactionHistory,
    DependencyGraph,
    FlashbackTransactionResult,
    TransactionImpactAnalysis,
};

// ============================================================================
// Integration Module
// ============================================================================

/// Unified flashback coordinator that integrates all flashback components
///
/// This struct provides a single entry point for all flashback operations
/// and ensures proper coordination between different flashback subsystems.
pub struct FlashbackCoordinator {
    time_travel: std::sync::Arc<TimeTravelEngine>,
    version_manager: std::sync::Arc<VersionManager>,
    table_restore: std::sync::Arc<TableRestoreManager>,
    database_flashback: std::sync::Arc<DatabaseFlashbackManager>,
    transaction_flashback: std::sync::Arc<TransactionFlashbackManager>,
}

impl FlashbackCoordinator {
    /// Create a new flashback coordinator with default configurations
    pub fn new() -> Self {
        let time_travel = std::sync::Arc::new(TimeTravelEngine::new(
            TimeTravelConfig::default()
        ));

        let version_manager = std::sync::Arc::new(VersionManager::new(
            VersionConfig::default()
        ));

        let table_restore = std::sync::Arc::new(TableRestoreManager::new(
            time_travel.clone(),
            version_manager.clone(),
            TableRestoreConfig::default(),
        ));

        let database_flashback = std::sync::Arc::new(DatabaseFlashbackManager::new(
            time_travel.clone(),
            DatabaseFlashbackConfig::default(),
        ));

        let transaction_flashback = std::sync::Arc::new(TransactionFlashbackManager::new());

        Self {
            time_travel,
            version_manager,
            table_restore,
            database_flashback,
            transaction_flashback,
        }
    }

    /// Create with custom configurations
    pub fn with_configs(
        time_travel_config: TimeTravelConfig,
        version_config: VersionConfig,
        table_restore_config: TableRestoreConfig,
        database_config: DatabaseFlashbackConfig,
    ) -> Self {
        let time_travel = std::sync::Arc::new(TimeTravelEngine::new(time_travel_config));
        let version_manager = std::sync::Arc::new(VersionManager::new(version_config));

        let table_restore = std::sync::Arc::new(TableRestoreManager::new(
            time_travel.clone(),
            version_manager.clone(),
            table_restore_config,
        ));

        let database_flashback = std::sync::Arc::new(DatabaseFlashbackManager::new(
            time_travel.clone(),
            database_config,
        ));

        let transaction_flashback = std::sync::Arc::new(TransactionFlashbackManager::new());

        Self {
            time_travel,
            version_manager,
            table_restore,
            database_flashback,
            transaction_flashback,
        }
    }

    /// Get time travel engine
    pub fn time_travel(&self) -> &std::sync::Arc<TimeTravelEngine> {
        &self.time_travel
    }

    /// Get version manager
    pub fn version_manager(&self) -> &std::sync::Arc<VersionManager> {
        &self.version_manager
    }

    /// Get table restore manager
    pub fn table_restore(&self) -> &std::sync::Arc<TableRestoreManager> {
        &self.table_restore
    }

    /// Get database flashback manager
    pub fn database_flashback(&self) -> &std::sync::Arc<DatabaseFlashbackManager> {
        &self.database_flashback
    }

    /// Get transaction flashback manager
    pub fn transaction_flashback(&self) -> &std::sync::Arc<TransactionFlashbackManager> {
        &self.transaction_flashback
    }

    /// Get comprehensive flashback statistics
    pub fn get_stats(&self) -> FlashbackStats {
        FlashbackStats {
            time_travel: self.time_travel.get_stats(),
            versions: self.version_manager.get_stats(),
            table_restore: self.table_restore.get_stats(),
            database_flashback: self.database_flashback.get_stats(),
            transaction_flashback: self.transaction_flashback.get_stats(),
        }
    }
}

impl Default for FlashbackCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// Comprehensive flashback statistics
#[derive(Debug, Clone)]
pub struct FlashbackStats {
    pub time_travel: TimeTravelStats,
    pub versions: VersionStats,
    pub table_restore: TableRestoreStats,
    pub database_flashback: DatabaseFlashbackStats,
    pub transaction_flashback: TransactionFlashbackStats,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flashback_coordinator_creation() {
        let coordinator = FlashbackCoordinator::new();
        let _stats = coordinator.get_stats();

        assert_eq!(stats.time_travel.queries_executed, 0);
        assert_eq!(stats.versions.total_versions, 0);
    }

    #[test]
    fn test_flashback_coordinator_with_custom_config() {
        let coordinator = FlashbackCoordinator::with_configs(
            TimeTravelConfig::default(),
            VersionConfig::default(),
            TableRestoreConfig::default(),
            DatabaseFlashbackConfig::default(),
        );

        // Verify coordinator is created successfully
        assert!(coordinator.time_travel().get_current_scn() >= 0);
    }
}
