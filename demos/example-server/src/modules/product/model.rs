use rapidfast::orm::Entity;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub stock: u32,
}

impl Entity for Product {
    const TABLE: &'static str = "products";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

#[derive(Debug, Deserialize)]
pub struct ListProductsQuery {
    pub min_price: Option<f64>,
    pub in_stock: Option<bool>,
}
