//! Named group registry.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::error::Result;
use crate::group::{Getter, Group};

// == Group Registry ==
/// Groups by name. Lookups share a read lock; registration is exclusive.
///
/// Registering a name that already exists replaces the old group.
#[derive(Debug, Default)]
pub struct GroupRegistry {
    groups: RwLock<HashMap<String, Arc<Group>>>,
}

impl GroupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // == New Group ==
    /// Creates and registers a group with a `cache_bytes` budget.
    pub async fn new_group(
        &self,
        name: impl Into<String>,
        cache_bytes: i64,
        getter: impl Getter + 'static,
    ) -> Result<Arc<Group>> {
        Group::builder(name)
            .cache_bytes(cache_bytes)
            .getter(getter)
            .register(self)
            .await
    }

    // == Insert ==
    /// Registers an already built group.
    pub async fn insert(&self, group: Group) -> Arc<Group> {
        let group = Arc::new(group);
        let mut groups = self.groups.write().await;
        if groups
            .insert(group.name().to_string(), group.clone())
            .is_some()
        {
            warn!(group = group.name(), "replaced existing group");
        } else {
            info!(group = group.name(), "registered group");
        }
        group
    }

    // == Get Group ==
    /// Returns the group registered under `name`, if any.
    pub async fn get_group(&self, name: &str) -> Option<Arc<Group>> {
        self.groups.read().await.get(name).cloned()
    }

    /// All registered groups, sorted by name.
    pub async fn groups(&self) -> Vec<Arc<Group>> {
        let mut groups: Vec<Arc<Group>> = self.groups.read().await.values().cloned().collect();
        groups.sort_by(|a, b| a.name().cmp(b.name()));
        groups
    }
}
