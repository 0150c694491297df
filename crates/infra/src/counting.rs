//! Inventory reconciliation: counting campaigns.
//!
//! Campaigns read the ledger for system quantities and record variances;
//! they never adjust stock. Turning a variance into a correction is a
//! separate, deliberate stock adjustment.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;

use forgewms_catalog::WarehouseId;
use forgewms_core::{DomainError, DomainResult, TenantId, UserId};
use forgewms_counting::{CampaignId, CountCampaign, NewCountLine};
use forgewms_ledger::StockKey;

use crate::audit::{AuditRecord, AuditSink};
use crate::catalog::CatalogService;
use crate::read_model::TenantStore;
use crate::stock::StockLedger;

pub struct CountingService<S>
where
    S: TenantStore<CampaignId, CountCampaign>,
{
    campaigns: S,
    catalog: Arc<CatalogService>,
    ledger: Arc<StockLedger>,
    audit: Arc<dyn AuditSink>,
}

impl<S> CountingService<S>
where
    S: TenantStore<CampaignId, CountCampaign>,
{
    pub fn new(
        campaigns: S,
        catalog: Arc<CatalogService>,
        ledger: Arc<StockLedger>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            campaigns,
            catalog,
            ledger,
            audit,
        }
    }

    pub fn open_campaign(
        &self,
        tenant_id: TenantId,
        actor: UserId,
        warehouse_id: WarehouseId,
    ) -> DomainResult<CountCampaign> {
        let now = Utc::now();
        self.catalog.require_warehouse(tenant_id, warehouse_id)?;

        let campaign = CountCampaign::open(tenant_id, warehouse_id, now);
        self.campaigns
            .upsert(tenant_id, campaign.id(), campaign.clone());

        self.audit.record(AuditRecord::new(
            tenant_id,
            actor,
            "counting.open",
            campaign.id().to_string(),
            json!({ "warehouse_id": warehouse_id }),
            now,
        ));
        tracing::info!(campaign_id = %campaign.id(), "count campaign opened");
        Ok(campaign)
    }

    /// Record counted positions. Each line snapshots the unbatched system
    /// quantity at the moment of recording. All-or-nothing per call.
    pub fn record_lines(
        &self,
        tenant_id: TenantId,
        actor: UserId,
        campaign_id: CampaignId,
        lines: Vec<NewCountLine>,
    ) -> DomainResult<CountCampaign> {
        let now = Utc::now();
        if lines.is_empty() {
            return Err(DomainError::validation(
                "count recording must include at least one line",
            ));
        }

        // Snapshot system quantities before touching the campaign.
        let mut snapshots = Vec::with_capacity(lines.len());
        for line in &lines {
            self.catalog.require_item(tenant_id, line.item_id)?;
            self.catalog.require_location(tenant_id, line.location_id)?;
            let key = StockKey::unbatched(line.item_id, line.location_id);
            snapshots.push(self.ledger.quantity_for(tenant_id, &key));
        }

        let updated = self
            .campaigns
            .update_with(tenant_id, &campaign_id, |campaign| {
                for (line, system_quantity) in lines.iter().zip(&snapshots) {
                    campaign.record_line(
                        line.item_id,
                        line.location_id,
                        line.counted_quantity,
                        *system_quantity,
                        actor,
                        now,
                    )?;
                }
                Ok(())
            })?
            .ok_or_else(|| {
                DomainError::not_found(format!("campaign {campaign_id} not found"))
            })?;

        self.audit.record(AuditRecord::new(
            tenant_id,
            actor,
            "counting.record",
            campaign_id.to_string(),
            json!({ "lines": lines.len() }),
            now,
        ));
        tracing::info!(
            campaign_id = %campaign_id,
            lines = lines.len(),
            "count lines recorded"
        );
        Ok(updated)
    }

    pub fn close_campaign(
        &self,
        tenant_id: TenantId,
        actor: UserId,
        campaign_id: CampaignId,
    ) -> DomainResult<CountCampaign> {
        let now = Utc::now();
        let updated = self
            .campaigns
            .update_with(tenant_id, &campaign_id, |campaign| campaign.close(now))?
            .ok_or_else(|| {
                DomainError::not_found(format!("campaign {campaign_id} not found"))
            })?;

        self.audit.record(AuditRecord::new(
            tenant_id,
            actor,
            "counting.close",
            campaign_id.to_string(),
            json!({}),
            now,
        ));
        tracing::info!(campaign_id = %campaign_id, "count campaign closed");
        Ok(updated)
    }

    pub fn get_campaign(
        &self,
        tenant_id: TenantId,
        campaign_id: CampaignId,
    ) -> DomainResult<CountCampaign> {
        self.campaigns
            .get(tenant_id, &campaign_id)
            .ok_or_else(|| DomainError::not_found(format!("campaign {campaign_id} not found")))
    }

    pub fn list_campaigns(&self, tenant_id: TenantId) -> Vec<CountCampaign> {
        let mut campaigns = self.campaigns.list(tenant_id);
        campaigns.sort_by_key(|c| (c.opened_at(), c.id()));
        campaigns
    }
}
