use rapidfast::prelude::*;

mod controller;
mod model;
mod service;

pub use controller::ProductController;
pub use model::Product;
pub use service::ProductService;

#[module(
    controllers = [ProductController],
    providers = [repository_provider::<Product>(), ProductService],
)]
pub struct ProductModule;
