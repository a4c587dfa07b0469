use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::RwLock;

use crate::model::EquipmentState;

pub type SharedEquipmentState = Arc<RwLock<EquipmentState>>;

/// The fixed equipment pool. Built once from configuration; no dynamic
/// registration. Keys are lowercased, display order and casing come from
/// the configured list.
pub struct Registry {
    items: DashMap<String, SharedEquipmentState>,
    /// Canonical names in configured display order.
    order: Vec<String>,
}

impl Registry {
    pub fn new(names: &[String]) -> Self {
        let items = DashMap::new();
        let mut order = Vec::with_capacity(names.len());
        for name in names {
            items.insert(
                name.to_lowercase(),
                Arc::new(RwLock::new(EquipmentState::new(name.clone()))),
            );
            order.push(name.clone());
        }
        Self { items, order }
    }

    /// Case-insensitive lookup. Returns the per-item state handle.
    pub fn resolve(&self, name: &str) -> Option<SharedEquipmentState> {
        self.items
            .get(&name.to_lowercase())
            .map(|e| e.value().clone())
    }

    /// Canonical names in stable display order.
    pub fn display_order(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
