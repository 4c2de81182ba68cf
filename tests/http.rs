mod common;

use common::{app_with, send, send_with_headers};
use rapidfast::prelude::*;
use serde_json::json;

#[controller("/users")]
pub struct UserController;

#[routes]
impl UserController {
    #[get("/:id")]
    async fn find_one(&self, #[param("id")] id: String) -> Value {
        json!({ "id": id })
    }

    #[get("/")]
    #[api_response(status = 200, description = "Every user", schema = "object", is_array)]
    async fn list(&self) -> Value {
        json!([])
    }
}

#[module(controllers = [UserController])]
pub struct UsersModule;

#[tokio::test]
async fn test_get_user_by_id() {
    let app = app_with(&[ClassRef::module::<UsersModule>()]);

    let response = send(&app.router(), "GET", "/users/42", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({ "id": "42" }));
}

#[tokio::test]
async fn test_undocumented_route_gets_default_response() {
    let app = app_with(&[ClassRef::module::<UsersModule>()]);

    let response = send(&app.router(), "GET", "/swagger.json", None).await;
    assert_eq!(response.status, StatusCode::OK);

    let operation = &response.body["paths"]["/users/{id}"]["get"];
    assert_eq!(operation["responses"]["200"]["description"], "Successful operation");
    assert_eq!(operation["parameters"][0]["name"], "id");
    assert_eq!(operation["parameters"][0]["in"], "path");
    assert_eq!(operation["tags"], json!(["User"]));

    let list = &response.body["paths"]["/users"]["get"];
    assert_eq!(list["responses"]["200"]["description"], "Every user");
}

#[tokio::test]
async fn test_swagger_ui_page() {
    let app = app_with(&[ClassRef::module::<UsersModule>()]);

    let response = send(&app.router(), "GET", "/api-docs", None).await;

    assert_eq!(response.status, StatusCode::OK);
    let html = response.body.as_str().unwrap();
    assert!(html.contains("swagger-ui"));
    assert!(html.contains("/swagger.json"));
}

#[controller("/api/")]
pub struct SlashController;

#[routes]
impl SlashController {
    #[get("//items/")]
    async fn items(&self) -> Value {
        json!(["a", "b"])
    }

    #[get]
    async fn root(&self) -> Value {
        json!("root")
    }
}

#[module(controllers = [SlashController])]
pub struct SlashModule;

#[tokio::test]
async fn test_paths_are_normalized() {
    let app = app_with(&[ClassRef::module::<SlashModule>()]);

    let paths: Vec<_> = app.routes().iter().map(|route| route.path.as_str()).collect();
    assert_eq!(paths, ["/api/items", "/api"]);

    let router = app.router();
    assert_eq!(send(&router, "GET", "/api/items", None).await.status, StatusCode::OK);
    assert_eq!(send(&router, "GET", "/api", None).await.body, json!("root"));
}

#[controller("/echo")]
pub struct EchoController;

#[routes]
impl EchoController {
    #[post("/:first/:second")]
    async fn order(
        &self,
        #[body] body: Value,
        #[param("second")] second: String,
        request: HttpRequest,
        #[param("first", pipe = ParseIntPipe)] first: i64,
        #[query("tag")] tag: Option<String>,
    ) -> Value {
        json!({
            "body": body,
            "second": second,
            "first": first,
            "tag": tag,
            "path": request.path(),
        })
    }

    #[get("/flag/:value")]
    async fn flag(&self, #[param("value", pipe = ParseBoolPipe)] value: bool) -> Value {
        json!(value)
    }

    #[get("/headers")]
    async fn headers(&self, #[headers("X-Tenant")] tenant: Option<String>) -> Value {
        json!({ "tenant": tenant })
    }
}

#[module(controllers = [EchoController])]
pub struct EchoModule;

#[tokio::test]
async fn test_arguments_follow_declaration_positions() {
    let app = app_with(&[ClassRef::module::<EchoModule>()]);

    let response = send(
        &app.router(),
        "POST",
        "/echo/7/eight?tag=x",
        Some(json!({ "n": 9 })),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body,
        json!({
            "body": { "n": 9 },
            "second": "eight",
            "first": 7,
            "tag": "x",
            "path": "/echo/7/eight",
        })
    );
}

#[tokio::test]
async fn test_failing_pipe_is_bad_request() {
    let app = app_with(&[ClassRef::module::<EchoModule>()]);
    let router = app.router();

    let response = send(&router, "POST", "/echo/seven/eight", Some(json!({}))).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["statusCode"], 400);

    assert_eq!(send(&router, "GET", "/echo/flag/1", None).await.body, json!(true));
    assert_eq!(
        send(&router, "GET", "/echo/flag/maybe", None).await.status,
        StatusCode::BAD_REQUEST
    );
}

#[tokio::test]
async fn test_named_header_is_case_insensitive() {
    let app = app_with(&[ClassRef::module::<EchoModule>()]);

    let response =
        send_with_headers(&app.router(), "GET", "/echo/headers", None, &[("x-tenant", "acme")]).await;

    assert_eq!(response.body, json!({ "tenant": "acme" }));
}

#[controller("/outcomes")]
pub struct OutcomeController;

#[routes]
impl OutcomeController {
    #[delete("/nothing")]
    async fn nothing(&self) {}

    #[get("/missing")]
    async fn missing(&self) -> std::result::Result<Value, HttpException> {
        Err(HttpException::not_found("Widget not found"))
    }

    #[get("/broken")]
    async fn broken(&self) -> Result<Value> {
        Err(RapidError::Internal("database unreachable".to_string()))
    }

    #[get("/panic")]
    async fn explode(&self) -> Value {
        panic!("handler exploded")
    }

    #[post("/created")]
    async fn created(&self, response: HttpResponse) -> Value {
        response.status(StatusCode::CREATED);
        json!({ "created": true })
    }

    #[get("/raw")]
    async fn raw(&self, #[res] response: HttpResponse) -> Value {
        response.status(StatusCode::ACCEPTED).send("raw body");
        json!("ignored")
    }

    #[get("/skip")]
    async fn skip(&self, next: Next) -> Value {
        next.call();
        json!("ignored")
    }

    #[get("/forward")]
    async fn forward(&self, next: Next) {
        next.fail(HttpException::forbidden("Not yours"));
    }

    #[get("/admin", middleware = [RequireHeader::with_value("x-api-key", "secret")])]
    async fn admin(&self) -> Value {
        json!("welcome")
    }
}

#[module(controllers = [OutcomeController])]
pub struct OutcomeModule;

#[tokio::test]
async fn test_no_value_is_no_content() {
    let app = app_with(&[ClassRef::module::<OutcomeModule>()]);

    let response = send(&app.router(), "DELETE", "/outcomes/nothing", None).await;

    assert_eq!(response.status, StatusCode::NO_CONTENT);
    assert_eq!(response.body, Value::Null);
}

#[tokio::test]
async fn test_errors_become_json_with_status_code() {
    let app = app_with(&[ClassRef::module::<OutcomeModule>()]);
    let router = app.router();

    let missing = send(&router, "GET", "/outcomes/missing", None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.body["statusCode"], 404);
    assert_eq!(missing.body["message"], "Widget not found");

    let broken = send(&router, "GET", "/outcomes/broken", None).await;
    assert_eq!(broken.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(broken.body["statusCode"], 500);
    assert_eq!(broken.body["message"], "Internal Server Error");
    assert!(broken.body.get("detail").is_none());
}

#[tokio::test]
async fn test_panic_is_contained() {
    let app = app_with(&[ClassRef::module::<OutcomeModule>()]);
    let router = app.router();

    let response = send(&router, "GET", "/outcomes/panic", None).await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body["statusCode"], 500);

    let after = send(&router, "POST", "/outcomes/created", None).await;
    assert_eq!(after.status, StatusCode::CREATED);
    assert_eq!(after.body, json!({ "created": true }));
}

#[tokio::test]
async fn test_sent_response_wins_over_return_value() {
    let app = app_with(&[ClassRef::module::<OutcomeModule>()]);

    let response = send(&app.router(), "GET", "/outcomes/raw", None).await;

    assert_eq!(response.status, StatusCode::ACCEPTED);
    assert_eq!(response.body, json!("raw body"));
}

#[tokio::test]
async fn test_next_falls_through_or_forwards() {
    let app = app_with(&[ClassRef::module::<OutcomeModule>()]);
    let router = app.router();

    let skipped = send(&router, "GET", "/outcomes/skip", None).await;
    assert_eq!(skipped.status, StatusCode::NOT_FOUND);
    assert_eq!(skipped.body["message"], "Cannot GET /outcomes/skip");

    let forwarded = send(&router, "GET", "/outcomes/forward", None).await;
    assert_eq!(forwarded.status, StatusCode::FORBIDDEN);
    assert_eq!(forwarded.body["message"], "Not yours");
}

#[tokio::test]
async fn test_route_middleware() {
    let app = app_with(&[ClassRef::module::<OutcomeModule>()]);
    let router = app.router();

    let anonymous = send(&router, "GET", "/outcomes/admin", None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
    assert_eq!(anonymous.body["statusCode"], 401);

    let wrong = send_with_headers(&router, "GET", "/outcomes/admin", None, &[("x-api-key", "guess")]).await;
    assert_eq!(wrong.status, StatusCode::FORBIDDEN);

    let allowed = send_with_headers(&router, "GET", "/outcomes/admin", None, &[("x-api-key", "secret")]).await;
    assert_eq!(allowed.status, StatusCode::OK);
    assert_eq!(allowed.body, json!("welcome"));
}

#[tokio::test]
async fn test_invalid_json_body_is_rejected() {
    let app = app_with(&[ClassRef::module::<EchoModule>()]);
    let request = rapidfast::axum::http::Request::builder()
        .method("POST")
        .uri("/echo/1/2")
        .header("content-type", "application/json")
        .body(rapidfast::axum::body::Body::from("{not json"))
        .unwrap();

    let response = tower::ServiceExt::oneshot(app.router(), request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_route() {
    let app = app_with(&[ClassRef::module::<UsersModule>()]);

    let response = send(&app.router(), "GET", "/nowhere", None).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["message"], "Cannot GET /nowhere");
}

#[derive(Debug, serde::Deserialize, validator::Validate)]
pub struct SignupRequest {
    #[validate(length(min = 2, message = "must be at least 2 characters"))]
    pub name: String,
    #[validate(email(message = "must be a valid address"))]
    pub email: String,
}

#[controller("/signups")]
pub struct SignupController;

#[routes]
impl SignupController {
    #[post("/")]
    async fn create(
        &self,
        #[body(pipe = ValidationPipe::<SignupRequest>::new())] signup: SignupRequest,
        response: HttpResponse,
    ) -> Value {
        response.status(StatusCode::CREATED);
        json!({ "name": signup.name, "email": signup.email })
    }
}

#[module(controllers = [SignupController])]
pub struct SignupModule;

#[tokio::test]
async fn test_validated_body() {
    let app = app_with(&[ClassRef::module::<SignupModule>()]);
    let router = app.router();

    let accepted = send(
        &router,
        "POST",
        "/signups",
        Some(json!({ "name": "Ada", "email": "ada@example.com" })),
    )
    .await;
    assert_eq!(accepted.status, StatusCode::CREATED);
    assert_eq!(accepted.body, json!({ "name": "Ada", "email": "ada@example.com" }));

    let rejected = send(
        &router,
        "POST",
        "/signups",
        Some(json!({ "name": "A", "email": "not-an-email" })),
    )
    .await;
    assert_eq!(rejected.status, StatusCode::BAD_REQUEST);
    assert_eq!(rejected.body["statusCode"], 400);
    assert_eq!(rejected.body["message"], "Validation failed");
    assert_eq!(
        rejected.body["errors"],
        json!([
            "email: must be a valid address",
            "name: must be at least 2 characters",
        ])
    );
}

#[controller("/items")]
pub struct ItemController;

#[routes]
impl ItemController {
    #[get("/:id")]
    async fn find_one(&self, #[param("id")] id: String) -> Value {
        json!({ "id": id })
    }

    #[delete("/:itemId")]
    async fn remove(&self, #[param("itemId")] _id: String) {}
}

#[module(controllers = [ItemController])]
pub struct ItemModule;

#[tokio::test]
async fn test_clashing_parameter_names_do_not_abort_startup() {
    let app = app_with(&[ClassRef::module::<ItemModule>()]);

    let routes: Vec<_> = app
        .routes()
        .iter()
        .map(|route| format!("{} {}", route.method, route.path))
        .collect();
    assert_eq!(routes, ["GET /items/:id"]);

    let response = send(&app.router(), "GET", "/items/5", None).await;
    assert_eq!(response.body, json!({ "id": "5" }));
}

#[controller("/api-docs")]
pub struct DocsController;

#[routes]
impl DocsController {
    #[get]
    async fn docs(&self) -> Value {
        json!("hand written docs")
    }
}

#[module(controllers = [DocsController])]
pub struct DocsModule;

#[tokio::test]
async fn test_controller_keeps_swagger_path() {
    let app = app_with(&[ClassRef::module::<DocsModule>()]);
    let router = app.router();

    let response = send(&router, "GET", "/api-docs", None).await;
    assert_eq!(response.body, json!("hand written docs"));

    let json = send(&router, "GET", "/swagger.json", None).await;
    assert_eq!(json.status, StatusCode::NOT_FOUND);
}
