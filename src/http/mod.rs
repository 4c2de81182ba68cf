//! Request-side types handed to middleware and route handlers.

mod next;
mod request;
mod response;

pub use next::{Next, NextOutcome};
pub use request::{HttpRequest, HttpRequestBuilder, DEFAULT_BODY_LIMIT};
pub use response::HttpResponse;
