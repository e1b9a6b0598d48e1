// Test compilation of specific modules
// This is a temporary file to test compilation

#[allow(unused_imports)]
use rusty_db::{
    backup::*,
    flashback::*,
    monitoring::*,
};

fn main() {
    println!("Testing backup module...");
    let _backup_config = BackupConfig::default();

    println!("Testing flashback module...");
    let _flashback_config = TimeTravelConfig::default();

    println!("Testing monitoring module...");
    let _monitoring_hub = MonitoringHub::default();

    println!("All modules loaded successfully!");
}
