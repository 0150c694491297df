use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use forgewms_catalog::LocationId;
use forgewms_core::{DomainError, DomainResult, TenantId, impl_uuid_newtype};

/// Putaway rule identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PutawayRuleId(Uuid);

impl_uuid_newtype!(PutawayRuleId, "PutawayRuleId");

/// One putaway rule: an exact-match criteria set and a target location.
/// Higher priority wins; an empty criteria set is a catch-all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PutawayRule {
    id: PutawayRuleId,
    tenant_id: TenantId,
    name: String,
    priority: i32,
    active: bool,
    criteria: BTreeMap<String, String>,
    target_location_id: LocationId,
    created_at: DateTime<Utc>,
}

impl PutawayRule {
    pub fn create(
        tenant_id: TenantId,
        name: impl Into<String>,
        priority: i32,
        criteria: BTreeMap<String, String>,
        target_location_id: LocationId,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("rule name must not be blank"));
        }
        Ok(Self {
            id: PutawayRuleId::new(),
            tenant_id,
            name,
            priority,
            active: true,
            criteria,
            target_location_id,
            created_at: now,
        })
    }

    pub fn id(&self) -> PutawayRuleId {
        self.id
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn criteria(&self) -> &BTreeMap<String, String> {
        &self.criteria
    }

    pub fn target_location_id(&self) -> LocationId {
        self.target_location_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// True when every criterion is present in `attributes` with the exact
    /// same value (subset match).
    pub fn matches(&self, attributes: &BTreeMap<String, String>) -> bool {
        self.criteria
            .iter()
            .all(|(key, value)| attributes.get(key) == Some(value))
    }
}

/// Outcome of a putaway suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PutawaySuggestion {
    /// First active rule (by descending priority) whose criteria matched.
    Rule {
        rule_id: PutawayRuleId,
        rule_name: String,
        location_id: LocationId,
    },
    /// No rule matched: stock stays in the receiving zone.
    ReceivingZone,
}

/// Evaluate the rule set against an attribute map. Pure: ordering is by
/// descending priority with rule name as the tie-breaker, first subset
/// match wins.
pub fn suggest_putaway(
    rules: &[PutawayRule],
    attributes: &BTreeMap<String, String>,
) -> PutawaySuggestion {
    let mut active: Vec<&PutawayRule> = rules.iter().filter(|r| r.is_active()).collect();
    active.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then_with(|| a.name.cmp(&b.name))
    });

    for rule in active {
        if rule.matches(attributes) {
            return PutawaySuggestion::Rule {
                rule_id: rule.id,
                rule_name: rule.name.clone(),
                location_id: rule.target_location_id,
            };
        }
    }
    PutawaySuggestion::ReceivingZone
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(
        tenant_id: TenantId,
        name: &str,
        priority: i32,
        criteria: &[(&str, &str)],
    ) -> PutawayRule {
        let criteria = criteria
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        PutawayRule::create(
            tenant_id,
            name,
            priority,
            criteria,
            LocationId::new(),
            Utc::now(),
        )
        .unwrap()
    }

    fn attributes(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn highest_priority_match_wins() {
        let tenant_id = TenantId::new();
        let cold = rule(tenant_id, "cold chain", 10, &[("storage", "cold")]);
        let bulky = rule(tenant_id, "bulk area", 5, &[("size", "bulky")]);
        let rules = vec![bulky.clone(), cold.clone()];

        let suggestion = suggest_putaway(
            &rules,
            &attributes(&[("storage", "cold"), ("size", "bulky")]),
        );
        match suggestion {
            PutawaySuggestion::Rule { rule_id, .. } => assert_eq!(rule_id, cold.id()),
            _ => panic!("Expected the cold chain rule to win"),
        }
    }

    #[test]
    fn criteria_must_match_exactly() {
        let tenant_id = TenantId::new();
        let cold = rule(tenant_id, "cold chain", 10, &[("storage", "cold")]);
        let suggestion = suggest_putaway(
            &[cold],
            &attributes(&[("storage", "ambient")]),
        );
        assert_eq!(suggestion, PutawaySuggestion::ReceivingZone);
    }

    #[test]
    fn inactive_rules_are_skipped() {
        let tenant_id = TenantId::new();
        let mut cold = rule(tenant_id, "cold chain", 10, &[("storage", "cold")]);
        cold.deactivate();
        let suggestion = suggest_putaway(&[cold], &attributes(&[("storage", "cold")]));
        assert_eq!(suggestion, PutawaySuggestion::ReceivingZone);
    }

    #[test]
    fn empty_criteria_is_a_catch_all() {
        let tenant_id = TenantId::new();
        let fallback = rule(tenant_id, "default lane", -100, &[]);
        let suggestion = suggest_putaway(&[fallback.clone()], &attributes(&[]));
        match suggestion {
            PutawaySuggestion::Rule { rule_id, .. } => assert_eq!(rule_id, fallback.id()),
            _ => panic!("Expected catch-all rule to match"),
        }
    }

    #[test]
    fn no_rules_suggests_receiving_zone() {
        assert_eq!(
            suggest_putaway(&[], &attributes(&[("storage", "cold")])),
            PutawaySuggestion::ReceivingZone
        );
    }
}
