use super::model::{ListProductsQuery, Product};
use rapidfast::prelude::*;

#[derive(Injectable)]
pub struct ProductService {
    products: Arc<dyn Repository<Product>>,
}

impl ProductService {
    pub async fn create(&self, data: Value) -> Result<Product> {
        let product = self.products.create(data)?;
        self.products.save(product).await
    }

    pub async fn get(&self, id: &str) -> Result<Option<Product>> {
        self.products.find_one_by(id).await
    }

    pub async fn list(&self, query: &ListProductsQuery) -> Result<Vec<Product>> {
        let products = self.products.find().await?;
        Ok(products
            .into_iter()
            .filter(|product| query.min_price.is_none_or(|min| product.price >= min))
            .filter(|product| query.in_stock.is_none_or(|wanted| (product.stock > 0) == wanted))
            .collect())
    }

    /// Removes `quantity` from stock, failing when there is not enough.
    pub async fn reserve(&self, id: &str, quantity: u32) -> Result<Option<std::result::Result<Product, u32>>> {
        let Some(product) = self.products.find_one_by(id).await? else {
            return Ok(None);
        };
        if product.stock < quantity {
            return Ok(Some(Err(product.stock)));
        }
        let updated = self
            .products
            .update(id, json!({ "stock": product.stock - quantity }))
            .await?;
        Ok(updated.map(Ok))
    }
}
