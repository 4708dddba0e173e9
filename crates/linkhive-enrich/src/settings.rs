//! Tenant settings providers.

use async_trait::async_trait;

use linkhive_core::{Result, TenantFeatures, TenantSettings};

/// Fixed feature flags for every tenant.
///
/// The real settings service is an external collaborator; single-node
/// deployments configure one flag set process-wide via environment.
pub struct StaticTenantSettings {
    features: TenantFeatures,
}

impl StaticTenantSettings {
    pub fn new(features: TenantFeatures) -> Self {
        Self { features }
    }

    /// Enable or disable AI summaries for all tenants.
    pub fn with_ai_summary(enabled: bool) -> Self {
        Self::new(TenantFeatures {
            ai_summary_enabled: enabled,
        })
    }

    /// Read the flag set from `AI_SUMMARY_ENABLED` (default off).
    pub fn from_env() -> Self {
        let enabled = std::env::var("AI_SUMMARY_ENABLED")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);
        Self::with_ai_summary(enabled)
    }
}

#[async_trait]
impl TenantSettings for StaticTenantSettings {
    async fn features(&self, _tenant_id: &str) -> Result<TenantFeatures> {
        Ok(self.features)
    }
}
