//! Middleware tests
//!
//! Tests for BearerAuth and RequestIdMiddleware.

use actix_web::http::{Method, StatusCode};
use actix_web::test::{self, TestRequest};
use actix_web::{App, HttpMessage, HttpRequest, HttpResponse, web};
use serde_json::Value;
use uuid::Uuid;

use slotbook::api::jwt::{JwtService, get_jwt_service};
use slotbook::api::middleware::{BearerAuth, RequestId, RequestIdMiddleware};
use slotbook::services::AuthUser;
use slotbook::storage::Role;

async fn whoami(caller: AuthUser) -> HttpResponse {
    HttpResponse::Ok().body(caller.id.to_string())
}

async fn echo_request_id(req: HttpRequest) -> HttpResponse {
    let id = req
        .extensions()
        .get::<RequestId>()
        .map(|r| r.0.clone())
        .unwrap_or_default();
    HttpResponse::Ok().body(id)
}

fn caller() -> AuthUser {
    AuthUser {
        id: Uuid::new_v4(),
        role: Role::Individual,
    }
}

// =============================================================================
// BearerAuth
// =============================================================================

#[actix_rt::test]
async fn test_bearer_auth_accepts_valid_token() {
    let app = test::init_service(
        App::new().service(
            web::scope("/protected")
                .wrap(BearerAuth)
                .route("", web::get().to(whoami)),
        ),
    )
    .await;

    let user = caller();
    let token = get_jwt_service().generate_access_token(user).unwrap();

    let req = TestRequest::get()
        .uri("/protected")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    assert_eq!(body, user.id.to_string());
}

#[actix_rt::test]
async fn test_bearer_auth_rejects_missing_and_malformed() {
    let app = test::init_service(
        App::new().service(
            web::scope("/protected")
                .wrap(BearerAuth)
                .route("", web::get().to(whoami)),
        ),
    )
    .await;

    let req = TestRequest::get().uri("/protected").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], 1001);

    let req = TestRequest::get()
        .uri("/protected")
        .insert_header(("Authorization", "Basic dXNlcjpwYXNz"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn test_bearer_auth_rejects_foreign_signature() {
    let app = test::init_service(
        App::new().service(
            web::scope("/protected")
                .wrap(BearerAuth)
                .route("", web::get().to(whoami)),
        ),
    )
    .await;

    let foreign = JwtService::new("some-other-secret-with-enough-length", 60)
        .generate_access_token(caller())
        .unwrap();

    let req = TestRequest::get()
        .uri("/protected")
        .insert_header(("Authorization", format!("Bearer {}", foreign)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn test_bearer_auth_passes_preflight() {
    let app = test::init_service(
        App::new().service(
            web::scope("/protected")
                .wrap(BearerAuth)
                .route(
                    "",
                    web::method(Method::OPTIONS)
                        .to(|| async { HttpResponse::NoContent().finish() }),
                ),
        ),
    )
    .await;

    let req = TestRequest::default()
        .method(Method::OPTIONS)
        .uri("/protected")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

#[actix_rt::test]
async fn test_auth_user_extractor_without_middleware() {
    let app = test::init_service(App::new().route("/open", web::get().to(whoami))).await;

    let req = TestRequest::get().uri("/open").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// =============================================================================
// RequestIdMiddleware
// =============================================================================

#[actix_rt::test]
async fn test_request_id_generated_and_echoed() {
    let app = test::init_service(
        App::new()
            .wrap(RequestIdMiddleware)
            .route("/", web::get().to(echo_request_id)),
    )
    .await;

    let req = TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;
    let header = resp
        .headers()
        .get("x-request-id")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(Uuid::parse_str(&header).is_ok());

    let body = test::read_body(resp).await;
    assert_eq!(body, header);
}

#[actix_rt::test]
async fn test_request_id_reuses_valid_incoming_header() {
    let app = test::init_service(
        App::new()
            .wrap(RequestIdMiddleware)
            .route("/", web::get().to(echo_request_id)),
    )
    .await;

    let incoming = Uuid::new_v4().to_string();
    let req = TestRequest::get()
        .uri("/")
        .insert_header(("X-Request-ID", incoming.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.headers().get("x-request-id").unwrap(), incoming.as_str());

    let req = TestRequest::get()
        .uri("/")
        .insert_header(("X-Request-ID", "not-a-uuid"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_ne!(resp.headers().get("x-request-id").unwrap(), "not-a-uuid");
}
