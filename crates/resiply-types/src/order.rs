use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cart::CartLine;

/// Amounts computed for a set of purchased lines, in won.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Amounts {
    #[serde(rename = "productAmount")]
    pub subtotal: i64,
    #[serde(default)]
    pub discount_total: i64,
    pub shipping_fee: i64,
    #[serde(rename = "payAmount")]
    pub payable: i64,
}

/// Write-once order record created at checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    #[serde(rename = "date")]
    pub created_at: DateTime<Utc>,
    pub items: Vec<CartLine>,
    #[serde(flatten)]
    pub amounts: Amounts,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub request: String,
    pub payment_method: String,
}
