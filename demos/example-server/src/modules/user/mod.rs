use rapidfast::prelude::*;

mod controller;
mod model;
mod service;

pub use controller::UserController;
pub use model::{CreateUserRequest, User};
pub use service::UserService;

#[module(
    controllers = [UserController],
    providers = [repository_provider::<User>(), UserService],
    exports = [UserService],
)]
pub struct UserModule;
