use serde::{Deserialize, Serialize};

use resiply_types::{CartLine, Product};

/// Cart contents plus the ids selected for checkout.
///
/// Invariants: one line per product id, every quantity is at least one,
/// and `selected_ids` only names ids that have a line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSnapshot {
    pub items: Vec<CartLine>,
    pub selected_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartAction {
    /// Increase the line's quantity, or insert it; either way select it.
    AddOrIncrement { product: Product, quantity: u32 },
    /// Ignored for quantities below one; removal is its own action.
    SetQuantity { id: String, quantity: u32 },
    Remove { id: String },
    Clear,
    ToggleSelect { id: String },
    SelectAll,
    ClearSelection,
    RemoveSelected,
}

impl CartSnapshot {
    pub fn line(&self, id: &str) -> Option<&CartLine> {
        self.items.iter().find(|l| l.id() == id)
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected_ids.iter().any(|s| s == id)
    }

    pub fn selected_lines(&self) -> Vec<CartLine> {
        self.items
            .iter()
            .filter(|l| self.is_selected(l.id()))
            .cloned()
            .collect()
    }

    /// Sum of quantities, shown on the cart badge.
    pub fn cart_count(&self) -> u32 {
        self.items.iter().map(|l| l.quantity).fold(0, u32::saturating_add)
    }

    fn select(&mut self, id: &str) {
        if !self.is_selected(id) {
            self.selected_ids.push(id.to_string());
        }
    }

    fn deselect(&mut self, id: &str) {
        self.selected_ids.retain(|s| s != id);
    }

    /// Pure transition. Returns whether anything changed.
    pub fn apply(&mut self, action: CartAction) -> bool {
        match action {
            CartAction::AddOrIncrement { product, quantity } => {
                if quantity == 0 {
                    return false;
                }
                let id = product.id.clone();
                match self.items.iter_mut().find(|l| l.id() == id) {
                    Some(line) => line.quantity = line.quantity.saturating_add(quantity),
                    None => self.items.push(CartLine::new(product, quantity)),
                }
                self.select(&id);
                true
            }
            CartAction::SetQuantity { id, quantity } => {
                if quantity < 1 {
                    return false;
                }
                match self.items.iter_mut().find(|l| l.id() == id) {
                    Some(line) if line.quantity != quantity => {
                        line.quantity = quantity;
                        true
                    }
                    _ => false,
                }
            }
            CartAction::Remove { id } => {
                let before = self.items.len();
                self.items.retain(|l| l.id() != id);
                self.deselect(&id);
                self.items.len() != before
            }
            CartAction::Clear => {
                let changed = !self.items.is_empty() || !self.selected_ids.is_empty();
                self.items.clear();
                self.selected_ids.clear();
                changed
            }
            CartAction::ToggleSelect { id } => {
                if self.line(&id).is_none() {
                    return false;
                }
                if self.is_selected(&id) {
                    self.deselect(&id);
                } else {
                    self.select(&id);
                }
                true
            }
            CartAction::SelectAll => {
                let all: Vec<String> = self.items.iter().map(|l| l.id().to_string()).collect();
                let changed = all != self.selected_ids;
                self.selected_ids = all;
                changed
            }
            CartAction::ClearSelection => {
                let changed = !self.selected_ids.is_empty();
                self.selected_ids.clear();
                changed
            }
            CartAction::RemoveSelected => {
                if self.selected_ids.is_empty() {
                    return false;
                }
                let selected = std::mem::take(&mut self.selected_ids);
                self.items.retain(|l| !selected.iter().any(|s| s == l.id()));
                true
            }
        }
    }
}
