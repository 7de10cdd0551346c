use std::sync::Arc;

use tokio::sync::watch;

use resiply_persist::{JsonSlot, LocalStore, StorageKey};
use resiply_types::{CartLine, Product};

use super::sanitize::sanitize;
use super::state::{CartAction, CartSnapshot};

/// Single owner of the cart.
///
/// Reads go through the selectors; writes go through [`dispatch`](Self::dispatch)
/// or the named operations. Every effective transition is persisted and
/// then published to subscribers.
pub struct CartStore {
    state: CartSnapshot,
    slot: JsonSlot<CartSnapshot>,
    tx: watch::Sender<CartSnapshot>,
}

impl CartStore {
    pub fn load(store: Arc<dyn LocalStore>) -> Self {
        let slot = JsonSlot::new(store, StorageKey::Cart);
        let state = slot.load_value().map(sanitize).unwrap_or_default();
        tracing::debug!(
            lines = state.items.len(),
            selected = state.selected_ids.len(),
            "Cart loaded"
        );

        let (tx, _rx) = watch::channel(state.clone());
        Self { state, slot, tx }
    }

    /// Apply one transition, then persist and notify if it changed anything.
    pub fn dispatch(&mut self, action: CartAction) -> bool {
        let changed = self.state.apply(action);
        if changed {
            self.slot.persist(&self.state);
            self.tx.send_replace(self.state.clone());
        }
        changed
    }

    pub fn add_or_increment(&mut self, product: Product, quantity: u32) -> bool {
        self.dispatch(CartAction::AddOrIncrement { product, quantity })
    }

    pub fn set_quantity(&mut self, id: &str, quantity: u32) -> bool {
        self.dispatch(CartAction::SetQuantity {
            id: id.to_string(),
            quantity,
        })
    }

    pub fn increment(&mut self, id: &str) -> bool {
        match self.state.line(id) {
            Some(line) => {
                let next = line.quantity.saturating_add(1);
                self.set_quantity(id, next)
            }
            None => false,
        }
    }

    /// Never drops below one; use [`remove`](Self::remove) for that.
    pub fn decrement(&mut self, id: &str) -> bool {
        match self.state.line(id) {
            Some(line) if line.quantity > 1 => {
                let next = line.quantity - 1;
                self.set_quantity(id, next)
            }
            _ => false,
        }
    }

    pub fn remove(&mut self, id: &str) -> bool {
        self.dispatch(CartAction::Remove { id: id.to_string() })
    }

    pub fn clear(&mut self) -> bool {
        self.dispatch(CartAction::Clear)
    }

    pub fn toggle_select(&mut self, id: &str) -> bool {
        self.dispatch(CartAction::ToggleSelect { id: id.to_string() })
    }

    pub fn select_all(&mut self) -> bool {
        self.dispatch(CartAction::SelectAll)
    }

    pub fn clear_selection(&mut self) -> bool {
        self.dispatch(CartAction::ClearSelection)
    }

    pub fn remove_selected(&mut self) -> bool {
        self.dispatch(CartAction::RemoveSelected)
    }

    pub fn snapshot(&self) -> &CartSnapshot {
        &self.state
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.state.items
    }

    pub fn line(&self, id: &str) -> Option<&CartLine> {
        self.state.line(id)
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.state.is_selected(id)
    }

    pub fn selected_lines(&self) -> Vec<CartLine> {
        self.state.selected_lines()
    }

    pub fn cart_count(&self) -> u32 {
        self.state.cart_count()
    }

    pub fn subscribe(&self) -> watch::Receiver<CartSnapshot> {
        self.tx.subscribe()
    }
}
