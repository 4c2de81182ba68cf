use crate::infrastructure::HealthController;
use crate::modules::product::ProductModule;
use crate::modules::user::UserModule;
use rapidfast::orm::Database;
use rapidfast::prelude::*;

/// Root application module
#[module(
    imports = [UserModule, ProductModule],
    controllers = [HealthController],
    providers = [Database],
)]
pub struct AppModule;
