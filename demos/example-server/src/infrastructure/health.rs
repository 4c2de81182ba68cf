use crate::infrastructure::RequestId;
use rapidfast::prelude::*;

#[controller(path = "/health", tags = ["Health"], description = "Liveness and configuration checks")]
pub struct HealthController {
    config: Arc<AppConfig>,
}

#[routes]
impl HealthController {
    #[get("/", middleware = [RequestId])]
    #[api_operation(summary = "Liveness probe")]
    #[api_response(status = 200, description = "The service is up")]
    async fn check(&self) -> Value {
        json!({
            "status": "ok",
            "name": self.config.app.name,
            "version": self.config.app.version,
        })
    }

    #[get("/config", middleware = [RequireHeader::with_value("x-api-key", "local-admin")])]
    #[api_operation(summary = "Effective configuration", description = "Requires the x-api-key header")]
    #[api_param(name = "x-api-key", location = "header")]
    async fn config(&self) -> Value {
        json!({
            "environment": self.config.environment,
            "port": self.config.port,
            "swagger": self.config.swagger.enabled,
        })
    }
}
