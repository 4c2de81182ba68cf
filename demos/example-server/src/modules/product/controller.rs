use super::model::{ListProductsQuery, Product};
use super::service::ProductService;
use rapidfast::prelude::*;

#[controller(path = "/products", tags = ["Products"], description = "Product catalogue")]
pub struct ProductController {
    service: Arc<ProductService>,
}

#[routes]
impl ProductController {
    #[post("/")]
    #[api_operation(summary = "Create a product")]
    #[api_body(schema = "Product")]
    #[api_response(status = 201, schema = "Product")]
    pub async fn create(&self, #[body] data: Value, response: HttpResponse) -> std::result::Result<Json<Product>, BoxError> {
        let product = self
            .service
            .create(data)
            .await
            .map_err(|err| HttpException::bad_request(err.to_string()))?;
        response.status(StatusCode::CREATED);
        Ok(Json(product))
    }

    #[get("/")]
    #[api_operation(summary = "List products")]
    #[api_param(name = "min_price", location = "query", required = false, schema = "number")]
    #[api_param(name = "in_stock", location = "query", required = false, schema = "boolean")]
    #[api_response(status = 200, schema = "Product", is_array)]
    pub async fn list(&self, #[query] query: ListProductsQuery) -> std::result::Result<Json<Vec<Product>>, BoxError> {
        Ok(Json(self.service.list(&query).await?))
    }

    #[get("/:id", middleware = [crate::infrastructure::RequestId])]
    #[api_operation(summary = "Find a product by id")]
    #[api_param(name = "id", description = "Product UUID")]
    pub async fn find_one(
        &self,
        #[param("id", pipe = ParseUuidPipe)] id: String,
        next: Next,
    ) -> std::result::Result<Option<Json<Product>>, BoxError> {
        let product = self.service.get(&id).await?;
        if product.is_none() {
            // falls through to the 404 handler
            next.call();
        }
        Ok(product.map(Json))
    }

    #[post("/:id/reserve/:quantity")]
    #[api_operation(summary = "Reserve stock")]
    #[api_param(name = "quantity", schema = "integer")]
    #[api_response(status = 200, schema = "Product")]
    #[api_response(status = 409, description = "Not enough stock")]
    pub async fn reserve(
        &self,
        #[param("id", pipe = ParseUuidPipe)] id: String,
        #[param("quantity", pipe = ParseIntPipe)] quantity: u32,
    ) -> std::result::Result<Json<Product>, BoxError> {
        match self.service.reserve(&id, quantity).await? {
            Some(Ok(product)) => Ok(Json(product)),
            Some(Err(available)) => Err(HttpException::conflict(format!(
                "Only {available} left in stock"
            ))
            .into()),
            None => Err(HttpException::not_found(format!("Product {id} not found")).into()),
        }
    }
}
