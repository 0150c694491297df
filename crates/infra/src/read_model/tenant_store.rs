use std::collections::HashMap;
use std::hash::Hash;
use std::sync::RwLock;

use forgewms_core::{DomainResult, TenantId};
use std::sync::Arc;

/// Tenant-isolated key/value store abstraction for operational records.
pub trait TenantStore<K, V>: Send + Sync {
    fn get(&self, tenant_id: TenantId, key: &K) -> Option<V>;
    fn upsert(&self, tenant_id: TenantId, key: K, value: V);
    fn list(&self, tenant_id: TenantId) -> Vec<V>;
    /// Atomically apply a fallible mutation to one record. The mutation runs
    /// on a copy; the stored record is untouched when it fails. `Ok(None)`
    /// means the key is absent for this tenant.
    fn update_with<F>(&self, tenant_id: TenantId, key: &K, apply: F) -> DomainResult<Option<V>>
    where
        F: FnOnce(&mut V) -> DomainResult<()>;
}

impl<K, V, S> TenantStore<K, V> for Arc<S>
where
    S: TenantStore<K, V> + ?Sized,
{
    fn get(&self, tenant_id: TenantId, key: &K) -> Option<V> {
        (**self).get(tenant_id, key)
    }

    fn upsert(&self, tenant_id: TenantId, key: K, value: V) {
        (**self).upsert(tenant_id, key, value)
    }

    fn list(&self, tenant_id: TenantId) -> Vec<V> {
        (**self).list(tenant_id)
    }

    fn update_with<F>(&self, tenant_id: TenantId, key: &K, apply: F) -> DomainResult<Option<V>>
    where
        F: FnOnce(&mut V) -> DomainResult<()>,
    {
        (**self).update_with(tenant_id, key, apply)
    }
}

/// In-memory tenant-isolated store.
#[derive(Debug)]
pub struct InMemoryTenantStore<K, V> {
    inner: RwLock<HashMap<(TenantId, K), V>>,
}

impl<K, V> InMemoryTenantStore<K, V> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }
}

impl<K, V> Default for InMemoryTenantStore<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> TenantStore<K, V> for InMemoryTenantStore<K, V>
where
    K: Clone + Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn get(&self, tenant_id: TenantId, key: &K) -> Option<V> {
        let map = self.inner.read().ok()?;
        map.get(&(tenant_id, key.clone())).cloned()
    }

    fn upsert(&self, tenant_id: TenantId, key: K, value: V) {
        if let Ok(mut map) = self.inner.write() {
            map.insert((tenant_id, key), value);
        }
    }

    fn list(&self, tenant_id: TenantId) -> Vec<V> {
        let map = match self.inner.read() {
            Ok(m) => m,
            Err(_) => return vec![],
        };

        map.iter()
            .filter_map(|((t, _k), v)| if *t == tenant_id { Some(v.clone()) } else { None })
            .collect()
    }

    fn update_with<F>(&self, tenant_id: TenantId, key: &K, apply: F) -> DomainResult<Option<V>>
    where
        F: FnOnce(&mut V) -> DomainResult<()>,
    {
        let mut map = match self.inner.write() {
            Ok(m) => m,
            Err(_) => return Ok(None),
        };
        let Some(current) = map.get_mut(&(tenant_id, key.clone())) else {
            return Ok(None);
        };
        let mut draft = current.clone();
        apply(&mut draft)?;
        *current = draft.clone();
        Ok(Some(draft))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forgewms_core::DomainError;

    #[test]
    fn records_are_tenant_isolated() {
        let store: InMemoryTenantStore<String, i64> = InMemoryTenantStore::new();
        let tenant_a = TenantId::new();
        let tenant_b = TenantId::new();

        store.upsert(tenant_a, "k".to_string(), 1);
        store.upsert(tenant_b, "k".to_string(), 2);

        assert_eq!(store.get(tenant_a, &"k".to_string()), Some(1));
        assert_eq!(store.get(tenant_b, &"k".to_string()), Some(2));
        assert_eq!(store.list(tenant_a), vec![1]);
    }

    #[test]
    fn failed_update_leaves_the_record_untouched() {
        let store: InMemoryTenantStore<String, i64> = InMemoryTenantStore::new();
        let tenant_id = TenantId::new();
        store.upsert(tenant_id, "k".to_string(), 10);

        let result = store.update_with(tenant_id, &"k".to_string(), |value| {
            *value = 99;
            Err(DomainError::validation("nope"))
        });
        assert!(result.is_err());
        assert_eq!(store.get(tenant_id, &"k".to_string()), Some(10));
    }

    #[test]
    fn update_on_missing_key_reports_absence() {
        let store: InMemoryTenantStore<String, i64> = InMemoryTenantStore::new();
        let updated = store
            .update_with(TenantId::new(), &"k".to_string(), |_| Ok(()))
            .unwrap();
        assert!(updated.is_none());
    }
}
