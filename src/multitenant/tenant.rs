// # Tenant Management and Provisioning
//
// High-level tenant lifecycle management including onboarding workflows,
// metadata management, configuration, backup/restore, and cross-tenant queries.
//
// ## Features
//
// - **Tenant Provisioning**: Automated tenant onboarding and setup
// - **Metadata Management**: Tenant-specific configuration and properties
// - **Backup/Restore**: Per-tenant backup and recovery
// - **Cross-Tenant Queries**: Secure multi-tenant analytics
// - **Self-Service Portal**: API for tenant self-management
// - **Billing Integration**: Usage tracking and billing hooks

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::RwLock;
use serde::{Serialize, Deserialize};
use crate::error::{Result, DbError};
use super::{TenantId, ResourceConsumption};
use super::pdb::{PdbId, PdbConfig, PdbCreateMode};
use super::isolation::ResourceLimits;

// Tenant configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantConfig {
    // Tenant name (unique identifier)
    pub name: String,

    // Display name
    pub display_name: String,

    // Organization/company name
    pub organization: String,

    // Tenant tier (free, basic, premium, enterprise)
    pub tier: TenantTier,

    // Resource limits
    pub resource_limits: ResourceLimits,

    // Contact information
    pub contact_email: String,

    // Contact phone
    pub contact_phone: Option<String>,

    // Billing account ID
    pub billing_account_id: Option<String>,

    // Custom properties
    pub properties: HashMap<String, String>,

    // Region/datacenter preference
    pub region: String,

    // Compliance requirements
    pub compliance: Vec<ComplianceRequirement>,

    // Enable audit logging
    pub audit_logging: bool,

    // Enable encryption at rest
    pub encryption_at_rest: bool,

    // Backup retention days
    pub backup_retention_days: u32,

    // Allow cross-tenant queries
    pub allow_cross_tenant_queries: bool,
}

impl Default for TenantConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            display_name: String::new(),
            organization: String::new(),
            tier: TenantTier::Basic,
            resource_limits: ResourceLimits::default(),
            contact_email: String::new(),
            contact_phone: None,
            billing_account_id: None,
            properties: HashMap::new(),
            region: "us-east-1".to_string(),
            compliance: Vec::new(),
            audit_logging: true,
            encryption_at_rest: true,
            backup_retention_days: 30,
            allow_cross_tenant_queries: false,
        }
    }
}

// Tenant tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TenantTier {
    // Free tier with limited resources
    Free,
    // Basic tier with standard resources
    Basic,
    // Premium tier with enhanced resources
    Premium,
    // Enterprise tier with dedicated resources
    Enterprise,
    // Custom tier with negotiated resources
    Custom,
}

impl TenantTier {
    // Get default resource limits for tier
    pub fn default_limits(&self) -> ResourceLimits {
        match self {
            TenantTier::Free => ResourceLimits {
                memory_bytes: 256 * 1024 * 1024,           // 256 MB
                cpu_shares: 50,                             // 0.5%
                io_bandwidth_bytes_per_sec: 10 * 1024 * 1024, // 10 MB/s
                max_connections: 10,
                temp_space_bytes: 512 * 1024 * 1024,       // 512 MB
                storage_quota_bytes: 1024 * 1024 * 1024,   // 1 GB
                qos_priority: 1,
                cpu_throttling_enabled: true,
                io_throttling_enabled: true,
            },
            TenantTier::Basic => ResourceLimits::default(),
            TenantTier::Premium => ResourceLimits {
                memory_bytes: 2 * 1024 * 1024 * 1024,      // 2 GB
                cpu_shares: 500,                            // 5%
                io_bandwidth_bytes_per_sec: 500 * 1024 * 1024, // 500 MB/s
                max_connections: 500,
                temp_space_bytes: 5 * 1024 * 1024 * 1024,  // 5 GB
                storage_quota_bytes: 100 * 1024 * 1024 * 1024, // 100 GB
                qos_priority: 7,
                cpu_throttling_enabled: false,
                io_throttling_enabled: false,
            },
            TenantTier::Enterprise => ResourceLimits {
                memory_bytes: 16 * 1024 * 1024 * 1024,     // 16 GB
                cpu_shares: 2000,                           // 20%
                io_bandwidth_bytes_per_sec: 1024 * 1024 * 1024, // 1 GB/s
                max_connections: 2000,
                temp_space_bytes: 50 * 1024 * 1024 * 1024, // 50 GB
                storage_quota_bytes: 1024 * 1024 * 1024 * 1024, // 1 TB
                qos_priority: 10,
                cpu_throttling_enabled: false,
                io_throttling_enabled: false,
            },
            TenantTier::Custom => ResourceLimits::default(),
        }
    }

    // Get pricing multiplier
    pub fn pricing_multiplier(&self) -> f64 {
        match self {
            TenantTier::Free => 0.0,
            TenantTier::Basic => 1.0,
            TenantTier::Premium => 3.0,
            TenantTier::Enterprise => 10.0,
            TenantTier::Custom => 1.0,
        }
    }
}

// Compliance requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComplianceRequirement {
    // GDPR compliance
    GDPR,
    // HIPAA compliance
    HIPAA,
    // SOC2 compliance
    SOC2,
    // PCI-DSS compliance
    PCIDSS,
    // ISO 27001
    ISO27001,
}

// Tenant metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantMetadata {
    // Tenant ID
    pub tenant_id: TenantId,

    // Creation timestamp
    pub created_at: u64,

    // Last modified timestamp
    pub modified_at: u64,

    // Last login timestamp
    pub last_login_at: Option<u64>,

    // Tenant status
    pub status: TenantStatus,

    // Associated PDB ID
    pub pdb_id: PdbId,

    // Number of users
    pub user_count: u32,

    // Number of databases/schemas
    pub database_count: u32,

    // Total data size
    pub data_size_bytes: u64,

    // Total backup size
    pub backup_size_bytes: u64,

    // API key
    pub api_key: String,

    // Tags
    pub tags: HashMap<String, String>,
}

// Tenant status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TenantStatus {
    // Tenant is being provisioned
    Provisioning,
    // Tenant is active and operational
    Active,
    // Tenant is suspended (non-payment, violations, etc.)
    Suspended,
    // Tenant is being deprovisioned
    Deprovisioning,
    // Tenant has been deleted
    Deleted,
    // Tenant is in maintenance mode
    Maintenance,
}

// Tenant instance
pub struct Tenant {
    // Tenant configuration
    config: Arc<RwLock<TenantConfig>>,

    // Tenant metadata
    metadata: Arc<RwLock<TenantMetadata>>,

    // Resource consumption history
    consumption_history: Arc<RwLock<Vec<ResourceConsumption>>>,
}

impl Tenant {
    // Create a new tenant
    pub fn new(tenant_id: TenantId, pdb_id: PdbId, config: TenantConfig) -> Self {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();

        let metadata = TenantMetadata {
            tenant_id,
            created_at: now,
            modified_at: now,
            last_login_at: None,
            status: TenantStatus::Provisioning,
            pdb_id,
            user_count: 0,
            database_count: 0,
            data_size_bytes: 0,
            backup_size_bytes: 0,
            api_key: Self::generate_api_key(),
            tags: HashMap::new(),
        };

        Self {
            config: Arc::new(RwLock::new(config)),
            metadata: Arc::new(RwLock::new(metadata)),
            consumption_history: Arc::new(RwLock::new(Vec::new())),
        }
    }

    // Generate a random API key
    fn generate_api_key() -> String {
        use std::hash::{Hash, Hasher};
        use std::collections::hash_map::DefaultHasher;

        let mut hasher = DefaultHasher::new();
        SystemTime::now().hash(&mut hasher);
        std::process::id().hash(&mut hasher);
        format!("tk_{:x}", hasher.finish())
    }

    // Get tenant ID
    pub async fn id(&self) -> TenantId {
        self.metadata.read().await.tenant_id
    }

    // Get tenant name
    pub async fn name(&self) -> String {
        self.config.read().await.name.clone()
    }

    // Get tenant status
    pub async fn status(&self) -> TenantStatus {
        self.metadata.read().await.status
    }

    // Set tenant status
    pub async fn set_status(&self, status: TenantStatus) -> Result<()> {
        let mut metadata = self.metadata.write().await;
        metadata.status = status;
        metadata.modified_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();
        Ok(())
    }

    // Get PDB ID
    pub async fn pdb_id(&self) -> PdbId {
        self.metadata.read().await.pdb_id
    }

    // Record resource consumption
    pub async fn record_consumption(&self, consumption: ResourceConsumption) {
        self.consumption_history.write().await.push(consumption);
    }

    // Get consumption history
    pub async fn consumption_history(&self) -> Vec<ResourceConsumption> {
        self.consumption_history.read().await.clone()
    }

    // Get total consumption
    pub async fn total_consumption(&self) -> ResourceConsumption {
        let history = self.consumption_history.read().await;
        let mut total = ResourceConsumption::zero();

        for consumption in history.iter() {
            total.add(consumption);
        }

        total
    }

    // Update configuration
    pub async fn update_config<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut TenantConfig),
    {
        let mut config = self.config.write().await;
        f(&mut config);
        self.metadata.write().await.modified_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();
        Ok(())
    }

    // Get configuration
    pub async fn config(&self) -> TenantConfig {
        self.config.read().await.clone()
    }

    // Get metadata
    pub async fn metadata(&self) -> TenantMetadata {
        self.metadata.read().await.clone()
    }
}

// Tenant provisioning service
pub struct TenantProvisioningService {
    // Active tenants
    tenants: Arc<RwLock<HashMap<TenantId, Arc<Tenant>>>>,

    // Next tenant ID
    next_id: Arc<RwLock<u64>>,

    // Onboarding workflows
    workflows: Arc<RwLock<HashMap<TenantId, TenantOnboardingWorkflow>>>,
}

impl TenantProvisioningService {
    // Create a new provisioning service
    pub fn new() -> Self {
        Self {
            tenants: Arc::new(RwLock::new(HashMap::new())),
            next_id: Arc::new(RwLock::new(1)),
            workflows: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    // Provision a new tenant
    pub async fn provision_tenant(&self, config: TenantConfig) -> Result<TenantId> {
        // Generate tenant ID
        let mut next_id = self.next_id.write().await;
        let tenant_id = TenantId::new(*next_id);
        *next_id += 1;
        drop(next_id);

        // Start onboarding workflow
        let workflow = TenantOnboardingWorkflow::new(tenant_id, config.clone());
        self.workflows.write().await.insert(tenant_id, workflow.clone());

        // Execute workflow
        let pdb_id = workflow.execute().await?;

        // Create tenant
        let tenant = Arc::new(Tenant::new(tenant_id, pdb_id, config));

        // Set status to active
        tenant.set_status(TenantStatus::Active).await?;

        // Register tenant
        self.tenants.write().await.insert(tenant_id, tenant);

        // Remove workflow
        self.workflows.write().await.remove(&tenant_id);

        Ok(tenant_id)
    }

    // Deprovision a tenant
    pub async fn deprovision_tenant(&self, tenant_id: TenantId) -> Result<()> {
        let tenants = self.tenants.read().await;

        if let Some(tenant) = tenants.get(&tenant_id) {
            tenant.set_status(TenantStatus::Deprovisioning).await?;
            drop(tenants);

            // Perform cleanup
            // - Close PDB
            // - Delete data
            // - Remove backups
            // - Cleanup resources

            // Remove tenant
            self.tenants.write().await.remove(&tenant_id);

            Ok(())
        } else {
            Err(DbError::NotFound(format!("Tenant not found: {:?}", tenant_id)))
        }
    }

    // Get a tenant
    pub async fn get_tenant(&self, tenant_id: TenantId) -> Result<Arc<Tenant>> {
        self.tenants
            .read()
            .await
            .get(&tenant_id)
            .cloned()
            .ok_or_else(|| DbError::NotFound(format!("Tenant not found: {:?}", tenant_id)))
    }

    // List all tenants
    pub async fn list_tenants(&self) -> Vec<TenantId> {
        self.tenants.read().await.keys().copied().collect()
    }

    // Get tenant count
    pub async fn tenant_count(&self) -> usize {
        self.tenants.read().await.len()
    }
}

// Tenant onboarding workflow
#[derive(Debug, Clone)]
pub struct TenantOnboardingWorkflow {
    tenant_id: TenantId,
    config: TenantConfig,
    steps: Vec<OnboardingStep>,
    current_step: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OnboardingStep {
    ValidateConfig,
    CreatePdb,
    ConfigureResources,
    SetupSecurity,
    CreateDefaultObjects,
    EnableBackup,
    EnableMonitoring,
    Complete,
}

impl TenantOnboardingWorkflow {
    // Create a new onboarding workflow
    pub fn new(tenant_id: TenantId, config: TenantConfig) -> Self {
        let steps = vec![
            OnboardingStep::ValidateConfig,
            OnboardingStep::CreatePdb,
            OnboardingStep::ConfigureResources,
            OnboardingStep::SetupSecurity,
            OnboardingStep::CreateDefaultObjects,
            OnboardingStep::EnableBackup,
            OnboardingStep::EnableMonitoring,
            OnboardingStep::Complete,
        ];

        Self {
            tenant_id,
            config,
            steps,
            current_step: 0,
        }
    }

    // Execute the workflow
    pub async fn execute(&self) -> Result<PdbId> {
        // Step 1: Validate configuration
        self.validate_config()?;

        // Step 2: Create PDB
        let pdb_id = self.create_pdb().await?;

        // Step 3: Configure resources
        self.configure_resources(pdb_id).await?;

        // Step 4: Setup security
        self.setup_security(pdb_id).await?;

        // Step 5: Create default objects
        self.create_default_objects(pdb_id).await?;

        // Step 6: Enable backup
        self.enable_backup(pdb_id).await?;

        // Step 7: Enable monitoring
        self.enable_monitoring(pdb_id).await?;

        Ok(pdb_id)
    }

    fn validate_config(&self) -> Result<()> {
        if self.config.name.is_empty() {
            return Err(DbError::InvalidInput("Tenant name cannot be empty".to_string()));
        }

        if self.config.contact_email.is_empty() {
            return Err(DbError::InvalidInput("Contact email cannot be empty".to_string()));
        }

        Ok(())
    }

    async fn create_pdb(&self) -> Result<PdbId> {
        // Create PDB configuration
        let pdb_config = PdbConfig {
            name: format!("PDB_{}", self.config.name.to_uppercase()),
            create_mode: PdbCreateMode::New,
            resource_limits: self.config.resource_limits.clone(),
            ..Default::default()
        };

        // In a real implementation, this would call CDB to create the PDB
        // For now, return a dummy PDB ID
        Ok(PdbId::new(self.tenant_id.value()))
    }

    async fn configure_resources(&self, _pdb_id: PdbId) -> Result<()> {
        // Configure resource limits
        Ok(())
    }

    async fn setup_security(&self, _pdb_id: PdbId) -> Result<()> {
        // Setup encryption, audit logging, etc.
        Ok(())
    }

    async fn create_default_objects(&self, _pdb_id: PdbId) -> Result<()> {
        // Create default tablespaces, users, etc.
        Ok(())
    }

    async fn enable_backup(&self, _pdb_id: PdbId) -> Result<()> {
        // Enable backup schedule
        Ok(())
    }

    async fn enable_monitoring(&self, _pdb_id: PdbId) -> Result<()> {
        // Enable monitoring and metrics
        Ok(())
    }
}

// Tenant backup manager
pub struct TenantBackupManager {
    // Backup metadata
    backups: Arc<RwLock<HashMap<TenantId, Vec<TenantBackup>>>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantBackup {
    pub backup_id: u64,
    pub tenant_id: TenantId,
    pub pdb_id: PdbId,
    pub created_at: u64,
    pub size_bytes: u64,
    pub backup_type: BackupType,
    pub status: BackupStatus,
    pub retention_until: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackupType {
    Full,
    Incremental,
    Differential,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackupStatus {
    InProgress,
    Completed,
    Failed,
}

impl TenantBackupManager {
    // Create a new backup manager
    pub fn new() -> Self {
        Self {
            backups: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    // Create a backup
    pub async fn create_backup(
        &self,
        tenant_id: TenantId,
        pdb_id: PdbId,
        backup_type: BackupType,
    ) -> Result<u64> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();

        let backup_id = now; // Use timestamp as backup ID

        let backup = TenantBackup {
            backup_id,
            tenant_id,
            pdb_id,
            created_at: now,
            size_bytes: 0,
            backup_type,
            status: BackupStatus::InProgress,
            retention_until: now + (30 * 24 * 60 * 60), // 30 days
        };

        self.backups
            .write()
            .await
            .entry(tenant_id)
            .or_insert_with(Vec::new)
            .push(backup);

        Ok(backup_id)
    }

    // List backups for a tenant
    pub async fn list_backups(&self, tenant_id: TenantId) -> Vec<TenantBackup> {
        self.backups
            .read()
            .await
            .get(&tenant_id)
            .cloned()
            .unwrap_or_default()
    }
}

// Cross-tenant query engine
pub struct CrossTenantQueryEngine {
    // Allowed cross-tenant query pairs
    permissions: Arc<RwLock<HashMap<TenantId, Vec<TenantId>>>>,
}

impl CrossTenantQueryEngine {
    // Create a new cross-tenant query engine
    pub fn new() -> Self {
        Self {
            permissions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    // Grant cross-tenant query permission
    pub async fn grant_permission(&self, from_tenant: TenantId, to_tenant: TenantId) -> Result<()> {
        self.permissions
            .write()
            .await
            .entry(from_tenant)
            .or_insert_with(Vec::new)
            .push(to_tenant);
        Ok(())
    }

    // Check if cross-tenant query is allowed
    pub async fn is_allowed(&self, from_tenant: TenantId, to_tenant: TenantId) -> bool {
        self.permissions
            .read()
            .await
            .get(&from_tenant)
            .map(|tenants| tenants.contains(&to_tenant))
            .unwrap_or(false)
    }

    // Execute cross-tenant query
    pub async fn execute_query(
        &self,
        from_tenant: TenantId,
        to_tenant: TenantId,
        query: &str,
    ) -> Result<Vec<Vec<String>>> {
        if !self.is_allowed(from_tenant, to_tenant).await {
            return Err(DbError::PermissionDenied(
                "Cross-tenant query not allowed".to_string()
            ));
        }

        // Execute query (stub)
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
use std::time::UNIX_EPOCH;

    #[tokio::test]
    async fn test_tenant_creation() {
        let tenant_id = TenantId::new(1);
        let pdb_id = PdbId::new(1);
        let config = TenantConfig::default();

        let tenant = Tenant::new(tenant_id, pdb_id, config);
        assert_eq!(tenant.id().await, tenant_id);
        assert_eq!(tenant.status().await, TenantStatus::Provisioning);
    }

    #[tokio::test]
    async fn test_provisioning_service() {
        let service = TenantProvisioningService::new();
        assert_eq!(service.tenant_count().await, 0);
    }

    #[test]
    fn test_tenant_tier_limits() {
        let free_limits = TenantTier::Free.default_limits();
        let enterprise_limits = TenantTier::Enterprise.default_limits();

        assert!(enterprise_limits.memory_bytes > free_limits.memory_bytes);
        assert!(enterprise_limits.cpu_shares > free_limits.cpu_shares);
    }
}
