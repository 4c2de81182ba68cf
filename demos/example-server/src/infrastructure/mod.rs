mod health;
mod request_id;

pub use health::HealthController;
pub use request_id::RequestId;
