//! Putaway rule administration and the suggestion lookup the receiving
//! clerks call before choosing a destination.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use serde_json::json;

use forgewms_catalog::LocationId;
use forgewms_core::{DomainError, DomainResult, TenantId, UserId};
use forgewms_rules::{PutawayRule, PutawayRuleId, PutawaySuggestion, suggest_putaway};

use crate::audit::{AuditRecord, AuditSink};
use crate::catalog::CatalogService;
use crate::read_model::TenantStore;

pub struct PutawayService<S>
where
    S: TenantStore<PutawayRuleId, PutawayRule>,
{
    rules: S,
    catalog: Arc<CatalogService>,
    audit: Arc<dyn AuditSink>,
}

impl<S> PutawayService<S>
where
    S: TenantStore<PutawayRuleId, PutawayRule>,
{
    pub fn new(rules: S, catalog: Arc<CatalogService>, audit: Arc<dyn AuditSink>) -> Self {
        Self {
            rules,
            catalog,
            audit,
        }
    }

    pub fn create_rule(
        &self,
        tenant_id: TenantId,
        actor: UserId,
        name: impl Into<String>,
        priority: i32,
        criteria: BTreeMap<String, String>,
        target_location_id: LocationId,
    ) -> DomainResult<PutawayRule> {
        let now = Utc::now();
        self.catalog.require_location(tenant_id, target_location_id)?;
        let rule = PutawayRule::create(tenant_id, name, priority, criteria, target_location_id, now)?;
        self.rules.upsert(tenant_id, rule.id(), rule.clone());

        self.audit.record(AuditRecord::new(
            tenant_id,
            actor,
            "putaway.rule_create",
            rule.id().to_string(),
            json!({
                "name": rule.name(),
                "priority": rule.priority(),
                "target_location_id": target_location_id,
            }),
            now,
        ));
        tracing::info!(rule_id = %rule.id(), name = %rule.name(), "putaway rule created");
        Ok(rule)
    }

    /// Rules in evaluation order: priority descending, name as tie-break.
    pub fn list_rules(&self, tenant_id: TenantId) -> Vec<PutawayRule> {
        let mut rules = self.rules.list(tenant_id);
        rules.sort_by(|a, b| {
            b.priority()
                .cmp(&a.priority())
                .then_with(|| a.name().cmp(b.name()))
        });
        rules
    }

    pub fn deactivate_rule(
        &self,
        tenant_id: TenantId,
        actor: UserId,
        rule_id: PutawayRuleId,
    ) -> DomainResult<PutawayRule> {
        let rule = self
            .rules
            .update_with(tenant_id, &rule_id, |rule| {
                rule.deactivate();
                Ok(())
            })?
            .ok_or_else(|| DomainError::not_found(format!("putaway rule {rule_id} not found")))?;

        self.audit.record(AuditRecord::new(
            tenant_id,
            actor,
            "putaway.rule_deactivate",
            rule_id.to_string(),
            json!({}),
            Utc::now(),
        ));
        Ok(rule)
    }

    /// Evaluate the active rule set against the supplied attributes.
    pub fn suggest(
        &self,
        tenant_id: TenantId,
        attributes: &BTreeMap<String, String>,
    ) -> PutawaySuggestion {
        let rules = self.rules.list(tenant_id);
        suggest_putaway(&rules, attributes)
    }
}
