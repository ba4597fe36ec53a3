//! End-to-end dispatch tests.
//!
//! Each test registers routes on a [`Server`], freezes it into a
//! dispatcher and drives requests through `Dispatcher::handle`.

use bytes::Bytes;
use heron_core::{Request, RequestContext, ResponseWriter, StatusError};
use heron_extract::{Checker, Json, Payload, Template, Valid, Validate};
use heron_middleware::PathInterceptor;
use heron_server::{Dispatcher, Server};
use http::header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
use http::StatusCode;
use http_body_util::BodyExt;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

async fn send(dispatcher: &Dispatcher, req: http::Request<Bytes>) -> (http::response::Parts, Bytes) {
    let response = dispatcher.handle(req).await;
    let (parts, body) = response.into_parts();
    let body = body.collect().await.unwrap().to_bytes();
    (parts, body)
}

fn get(uri: &str) -> http::Request<Bytes> {
    http::Request::get(uri).body(Bytes::new()).unwrap()
}

async fn show_user(req: Request) -> Result<Json<Value>, StatusError> {
    match req.segments().last() {
        Some("missing") => Err(StatusError::new(StatusCode::NOT_FOUND, "user not found")),
        Some(id) => Ok(Json(json!({ "id": id }))),
        None => Err(StatusError::BAD_REQUEST),
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
struct Order {
    sku: String,
    quantity: u32,
}

async fn create_order(Payload(order): Payload<Order>) -> Json<Order> {
    Json(Order {
        quantity: order.quantity * 2,
        ..order
    })
}

impl Validate for Order {
    fn validate(&self, check: &mut Checker) {
        check.pattern("sku", &self.sku, "^[A-Z]-[0-9]+$");
    }
}

async fn create_checked_order(Valid(order): Valid<Order>) -> Json<Order> {
    Json(order)
}

async fn admin() -> Result<&'static str, StatusError> {
    Err(StatusError::UNAUTHORIZED)
}

async fn dashboard(ctx: RequestContext) -> Template {
    ctx.insert("section", "dashboard");
    Template::new("/dashboard.html")
}

async fn login(ctx: RequestContext, resp: ResponseWriter) {
    ctx.session().set("user", "ada");
    resp.redirect("/account", StatusCode::FOUND);
}

async fn account(ctx: RequestContext) -> Json<Value> {
    Json(json!({ "user": ctx.session().get("user") }))
}

fn guarded_server() -> Server {
    let mut server = Server::builder().build();
    server
        .route("GET", "/users/*", show_user)
        .unwrap()
        .route("POST", "/orders", create_order)
        .unwrap()
        .route("POST", "/orders/checked", create_checked_order)
        .unwrap()
        .route("GET", "/admin", admin)
        .unwrap()
        .route("GET", "/dashboard", dashboard)
        .unwrap()
        .route("POST", "/login", login)
        .unwrap()
        .route("GET", "/account", account)
        .unwrap();

    server.intercept(
        PathInterceptor::before("/account", |ctx, resp, _req| async move {
            if ctx.session().contains("user") {
                true
            } else {
                resp.error("Forbidden", StatusCode::FORBIDDEN);
                false
            }
        }),
    );
    server
}

#[tokio::test]
async fn test_wildcard_route_returns_json() {
    let dispatcher = guarded_server().into_dispatcher();

    let (parts, body) = send(&dispatcher, get("/users/42")).await;
    assert_eq!(parts.status, StatusCode::OK);
    assert_eq!(parts.headers[CONTENT_TYPE], "application/json");
    let value: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(value, json!({ "id": "42" }));
}

#[tokio::test]
async fn test_status_error_from_handler() {
    let dispatcher = guarded_server().into_dispatcher();

    let (parts, body) = send(&dispatcher, get("/users/missing")).await;
    assert_eq!(parts.status, StatusCode::NOT_FOUND);
    assert_eq!(parts.headers[CONTENT_TYPE], "text/plain; charset=utf-8");
    assert_eq!(body, Bytes::from_static(b"user not found\n"));
}

#[tokio::test]
async fn test_unregistered_path_is_not_found() {
    let dispatcher = guarded_server().into_dispatcher();

    let (parts, body) = send(&dispatcher, get("/nothing/here")).await;
    assert_eq!(parts.status, StatusCode::NOT_FOUND);
    assert_eq!(body, Bytes::from_static(b"Not Found\n"));

    // Wrong method on a known path is also a 404.
    let (parts, _) = send(&dispatcher, get("/orders")).await;
    assert_eq!(parts.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_json_payload_is_bound() {
    let dispatcher = guarded_server().into_dispatcher();
    let req = http::Request::post("/orders")
        .header(CONTENT_TYPE, "application/json; charset=utf-8")
        .body(Bytes::from_static(br#"{"sku":"A-1","quantity":3}"#))
        .unwrap();

    let (parts, body) = send(&dispatcher, req).await;
    assert_eq!(parts.status, StatusCode::OK);
    let order: Order = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        order,
        Order {
            sku: "A-1".to_string(),
            quantity: 6
        }
    );
}

#[tokio::test]
async fn test_undecodable_payload_skips_handler() {
    let dispatcher = guarded_server().into_dispatcher();
    let req = http::Request::post("/orders")
        .header(CONTENT_TYPE, "application/json")
        .body(Bytes::from_static(b"{not json"))
        .unwrap();

    let (parts, body) = send(&dispatcher, req).await;
    assert_eq!(parts.status, StatusCode::OK);
    assert!(body.is_empty());
}

fn checked_post(body: &'static str) -> http::Request<Bytes> {
    http::Request::post("/orders/checked")
        .header(CONTENT_TYPE, "application/json")
        .body(Bytes::from_static(body.as_bytes()))
        .unwrap()
}

#[tokio::test]
async fn test_invalid_payload_answers_bad_request() {
    let dispatcher = guarded_server().into_dispatcher();
    let (parts, body) = send(&dispatcher, checked_post(r#"{"sku":"a1","quantity":1}"#)).await;
    assert_eq!(parts.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        Bytes::from_static(b".sku should match pattern:^[A-Z]-[0-9]+$\n")
    );

    let (parts, body) = send(&dispatcher, checked_post(r#"{"sku":"B-7","quantity":1}"#)).await;
    assert_eq!(parts.status, StatusCode::OK);
    let order: Order = serde_json::from_slice(&body).unwrap();
    assert_eq!(order.sku, "B-7");
}

#[tokio::test]
async fn test_unauthorized_redirects_home() {
    let dispatcher = guarded_server().into_dispatcher();

    let (parts, _) = send(&dispatcher, get("/admin")).await;
    assert_eq!(parts.status, StatusCode::MOVED_PERMANENTLY);
    assert_eq!(parts.headers[LOCATION], "/");
}

#[tokio::test]
async fn test_template_without_renderer_redirects() {
    let dispatcher = guarded_server().into_dispatcher();

    let (parts, _) = send(&dispatcher, get("/dashboard")).await;
    assert_eq!(parts.status, StatusCode::FOUND);
    assert_eq!(parts.headers[LOCATION], "/dashboard.html");
}

#[tokio::test]
async fn test_interceptor_short_circuits() {
    let dispatcher = guarded_server().into_dispatcher();

    let (parts, body) = send(&dispatcher, get("/account")).await;
    assert_eq!(parts.status, StatusCode::FORBIDDEN);
    assert_eq!(body, Bytes::from_static(b"Forbidden\n"));
}

#[tokio::test]
async fn test_session_survives_between_requests() {
    let dispatcher = guarded_server().into_dispatcher();

    let login = http::Request::post("/login").body(Bytes::new()).unwrap();
    let (parts, _) = send(&dispatcher, login).await;
    assert_eq!(parts.status, StatusCode::FOUND);
    let cookie = parts.headers[SET_COOKIE].to_str().unwrap();
    let pair = cookie.split(';').next().unwrap().to_string();
    assert!(pair.starts_with("heronSession="));

    let req = http::Request::get("/account")
        .header(COOKIE, pair.as_str())
        .body(Bytes::new())
        .unwrap();
    let (parts, body) = send(&dispatcher, req).await;
    assert_eq!(parts.status, StatusCode::OK);
    let value: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(value, json!({ "user": "ada" }));

    // The same id comes back refreshed.
    let refreshed = parts.headers[SET_COOKIE].to_str().unwrap();
    assert!(refreshed.starts_with(&pair));
}
