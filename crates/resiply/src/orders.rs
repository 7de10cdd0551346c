//! Order fulfillment: settle a resolved item list, record the order and
//! consume the purchased quantities from the live cart.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;

use resiply_persist::{JsonSlot, LocalStore, StorageKey};
use resiply_types::{CartLine, CheckoutConfig, Order};

use crate::attribution::AttributionMap;
use crate::cart::CartStore;
use crate::checkout::{compute, format_won};
use crate::error::CheckoutError;

/// Recent orders, newest first.
///
/// Entries are kept as raw JSON so records written by other clients survive
/// a round-trip even if this build cannot parse them.
pub struct OrderLedger {
    slot: JsonSlot<Vec<Value>>,
}

impl OrderLedger {
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self {
            slot: JsonSlot::new(store, StorageKey::Orders),
        }
    }

    fn raw(&self) -> Vec<Value> {
        match self.slot.load_value() {
            Some(Value::Array(items)) => items,
            Some(_) => {
                tracing::warn!(key = %self.slot.key(), "Recent order list is not an array");
                Vec::new()
            }
            None => Vec::new(),
        }
    }

    pub fn record(&self, order: &Order) {
        let mut orders = self.raw();
        match serde_json::to_value(order) {
            Ok(value) => orders.insert(0, value),
            Err(e) => {
                tracing::error!(order_id = %order.id, error = %e, "Failed to encode order");
                return;
            }
        }
        self.slot.persist(&orders);
    }

    pub fn recent(&self) -> Vec<Order> {
        self.raw()
            .into_iter()
            .filter_map(|v| serde_json::from_value(v).ok())
            .collect()
    }
}

/// Free-form order fields supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderDetails {
    pub address: String,
    pub request: String,
    pub payment_method: String,
}

impl OrderDetails {
    pub fn new(payment_method: impl Into<String>) -> Self {
        Self {
            payment_method: payment_method.into(),
            ..Default::default()
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    pub fn with_request(mut self, request: impl Into<String>) -> Self {
        self.request = request.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
    pub order: Order,
    pub text: String,
}

impl Receipt {
    fn render(order: &Order, header: &str) -> String {
        let mut lines = vec![
            header.to_string(),
            String::new(),
            format!("주문번호: {}", order.id),
        ];
        lines.extend(
            order
                .items
                .iter()
                .map(|l| format!("- {} x{}", l.product.title, l.quantity)),
        );
        lines.push(format!("총 결제금액: {}원", format_won(order.amounts.payable)));
        lines.join("\n")
    }
}

pub struct OrderDesk {
    ledger: OrderLedger,
    config: CheckoutConfig,
    receipt_header: String,
    last_id: i64,
}

impl OrderDesk {
    pub fn new(store: Arc<dyn LocalStore>, config: CheckoutConfig) -> Self {
        Self {
            ledger: OrderLedger::new(store),
            config,
            receipt_header: "결제가 완료되었습니다.".to_string(),
            last_id: 0,
        }
    }

    pub fn with_receipt_header(mut self, header: impl Into<String>) -> Self {
        self.receipt_header = header.into();
        self
    }

    pub fn ledger(&self) -> &OrderLedger {
        &self.ledger
    }

    pub fn config(&self) -> &CheckoutConfig {
        &self.config
    }

    /// Settle `items` and consume them from `cart`.
    ///
    /// Checks run before any mutation. Consumption is per line: a partial
    /// purchase leaves the remainder, a full purchase removes the line and
    /// its attribution. Purchased ids missing from the cart are skipped.
    pub fn place_order(
        &mut self,
        signed_in: bool,
        items: Vec<CartLine>,
        details: OrderDetails,
        cart: &mut CartStore,
        attribution: &mut AttributionMap,
    ) -> Result<Receipt, CheckoutError> {
        if !signed_in {
            return Err(CheckoutError::AuthRequired);
        }
        if items.is_empty() {
            return Err(CheckoutError::EmptyOrder);
        }

        let amounts = compute(&items, &self.config);
        let order = Order {
            id: self.next_order_id(),
            created_at: Utc::now(),
            items,
            amounts,
            address: details.address,
            request: details.request,
            payment_method: details.payment_method,
        };
        self.ledger.record(&order);

        for purchased in &order.items {
            let Some(live) = cart.line(purchased.id()).map(|l| l.quantity) else {
                continue;
            };
            if live > purchased.quantity {
                cart.set_quantity(purchased.id(), live - purchased.quantity);
            } else {
                cart.remove(purchased.id());
                attribution.forget(purchased.id());
            }
        }

        tracing::info!(
            order_id = %order.id,
            lines = order.items.len(),
            payable = order.amounts.payable,
            "Order placed"
        );

        let text = Receipt::render(&order, &self.receipt_header);
        Ok(Receipt { order, text })
    }

    fn next_order_id(&mut self) -> String {
        let millis = Utc::now().timestamp_millis().max(self.last_id + 1);
        self.last_id = millis;
        format!("ORD-{millis}")
    }
}
