use serde::{Deserialize, Deserializer, Serialize};

/// Product attributes shared by cart lines and assistant cart replies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub image_url: String,
    pub price: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_cold: Option<bool>,
}

impl Product {
    pub fn new(id: impl Into<String>, title: impl Into<String>, price: i64) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            subtitle: None,
            image_url: String::new(),
            price,
            original_price: None,
            is_cold: None,
        }
    }

    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = url.into();
        self
    }

    pub fn with_original_price(mut self, price: i64) -> Self {
        self.original_price = Some(price);
        self
    }
}

/// One line of the cart. There is at most one line per product id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    #[serde(flatten)]
    pub product: Product,
    pub quantity: u32,
}

impl CartLine {
    pub fn new(product: Product, quantity: u32) -> Self {
        Self { product, quantity }
    }

    pub fn id(&self) -> &str {
        &self.product.id
    }

    pub fn line_total(&self) -> i64 {
        self.product.price.saturating_mul(i64::from(self.quantity))
    }
}

/// Cart item as sent by the assistant in a `cart_add` reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub title: String,
    pub price: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
}

impl CartItem {
    pub fn new(id: impl Into<String>, title: impl Into<String>, price: i64) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            price,
            image_url: None,
            quantity: None,
        }
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = Some(quantity);
        self
    }

    /// Missing or zero quantities count as one.
    pub fn quantity_or_default(&self) -> u32 {
        self.quantity.filter(|q| *q > 0).unwrap_or(1)
    }

    pub fn to_product(&self) -> Product {
        Product::new(self.id.clone(), self.title.clone(), self.price)
            .with_image_url(self.image_url.clone().unwrap_or_default())
    }

    pub fn to_line(&self) -> CartLine {
        CartLine::new(self.to_product(), self.quantity_or_default())
    }
}

/// Product ids arrive as strings or integers depending on the endpoint.
pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Str(s) => s,
        Raw::Int(n) => n.to_string(),
        Raw::Float(f) => f.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_ids_are_normalized() {
        let item: CartItem =
            serde_json::from_str(r#"{"id": 42, "title": "두부", "price": 1500}"#).unwrap();
        assert_eq!(item.id, "42");
        assert_eq!(item.quantity_or_default(), 1);
    }

    #[test]
    fn test_cart_line_flattens_product() {
        let line = CartLine::new(Product::new("7", "양파", 2000).with_original_price(2500), 3);
        let json = serde_json::to_value(&line).unwrap();

        assert_eq!(json["id"], "7");
        assert_eq!(json["originalPrice"], 2500);
        assert_eq!(json["quantity"], 3);
        assert_eq!(line.line_total(), 6000);
    }

    #[test]
    fn test_line_total_saturates() {
        let line = CartLine::new(Product::new("a", "a", i64::MAX), 2);
        assert_eq!(line.line_total(), i64::MAX);
    }

    #[test]
    fn test_zero_quantity_item_defaults_to_one() {
        let item = CartItem::new("1", "쌀", 30000).with_quantity(0);
        assert_eq!(item.to_line().quantity, 1);
    }
}
