//! Session-scoped record of which cart lines the assistant added, per thread.

use std::collections::HashMap;

use resiply_types::ThreadId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribution {
    /// Added by the assistant; a generic "checkout" selects it.
    Active,
    /// Payment was declined; kept for reference but never auto-selected.
    Dormant,
}

/// thread id -> product id -> attribution. Not persisted.
#[derive(Debug, Clone, Default)]
pub struct AttributionMap {
    threads: HashMap<ThreadId, HashMap<String, Attribution>>,
}

impl AttributionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_active(&mut self, thread_id: &str, product_id: &str) {
        self.threads
            .entry(thread_id.to_string())
            .or_default()
            .insert(product_id.to_string(), Attribution::Active);
    }

    pub fn state(&self, thread_id: &str, product_id: &str) -> Option<Attribution> {
        self.threads.get(thread_id)?.get(product_id).copied()
    }

    /// Demote every active entry of the thread; returns how many changed.
    pub fn demote_all(&mut self, thread_id: &str) -> usize {
        let Some(entries) = self.threads.get_mut(thread_id) else {
            return 0;
        };
        let mut demoted = 0;
        for state in entries.values_mut() {
            if *state == Attribution::Active {
                *state = Attribution::Dormant;
                demoted += 1;
            }
        }
        demoted
    }

    /// Drop a product from every thread, e.g. once it has been purchased.
    pub fn forget(&mut self, product_id: &str) {
        for entries in self.threads.values_mut() {
            entries.remove(product_id);
        }
        self.threads.retain(|_, entries| !entries.is_empty());
    }

    pub fn forget_thread(&mut self, thread_id: &str) {
        self.threads.remove(thread_id);
    }

    /// Active product ids of the thread, sorted for stable iteration.
    pub fn active_ids(&self, thread_id: &str) -> Vec<String> {
        let mut ids: Vec<String> = self
            .threads
            .get(thread_id)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|(_, s)| **s == Attribution::Active)
                    .map(|(id, _)| id.clone())
                    .collect()
            })
            .unwrap_or_default();
        ids.sort();
        ids
    }
}
