//! Settlement amounts for a set of purchased lines.
//!
//! The cart preview and the chat-driven checkout both go through
//! [`compute`] with the same [`CheckoutConfig`], so identical inputs always
//! produce identical amounts.

use resiply_types::{Amounts, CartLine, CheckoutConfig};

pub fn subtotal(lines: &[CartLine]) -> i64 {
    lines
        .iter()
        .map(CartLine::line_total)
        .fold(0, i64::saturating_add)
}

/// Savings against `original_price`; lines without one contribute nothing.
pub fn discount_total(lines: &[CartLine]) -> i64 {
    lines
        .iter()
        .map(|l| {
            let original = l.product.original_price.unwrap_or(l.product.price);
            original
                .saturating_sub(l.product.price)
                .max(0)
                .saturating_mul(i64::from(l.quantity))
        })
        .fold(0, i64::saturating_add)
}

pub fn shipping_fee(lines: &[CartLine], config: &CheckoutConfig) -> i64 {
    if lines.is_empty() || subtotal(lines) >= config.free_shipping_threshold {
        0
    } else {
        config.base_shipping_fee
    }
}

pub fn compute(lines: &[CartLine], config: &CheckoutConfig) -> Amounts {
    let subtotal = subtotal(lines);
    let shipping_fee = shipping_fee(lines, config);
    Amounts {
        subtotal,
        discount_total: discount_total(lines),
        shipping_fee,
        payable: subtotal.saturating_add(shipping_fee).max(0),
    }
}

/// `45000` -> `"45,000"`.
pub fn format_won(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if amount < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
