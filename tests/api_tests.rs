//! HTTP API integration tests
//!
//! Each test builds a fresh app on top of an empty in-memory store and
//! drives it through `actix_web::test`.

use std::net::SocketAddr;
use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use actix_web::App;
use serde_json::{Value, json};

use slotbook::config::StaticConfig;
use slotbook::runtime::lifetime::startup::StartupContext;
use slotbook::storage::MemoryStore;

const MONDAY: &str = "2030-01-07";

fn peer() -> SocketAddr {
    "127.0.0.1:40000".parse().unwrap()
}

macro_rules! init_app {
    () => {{
        let context =
            StartupContext::with_store(&StaticConfig::default(), Arc::new(MemoryStore::new()));
        test::init_service(App::new().configure(|cfg| context.configure(cfg))).await
    }};
}

/// 注册并返回 (token, user id)
macro_rules! register {
    ($app:expr, $name:expr, $email:expr, $role:expr) => {{
        let req = TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({
                "name": $name,
                "email": $email,
                "password": "password123",
                "role": $role,
            }))
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        (
            body["data"]["token"].as_str().unwrap().to_string(),
            body["data"]["user"]["id"].as_str().unwrap().to_string(),
        )
    }};
}

macro_rules! get_json {
    ($app:expr, $uri:expr, $token:expr) => {{
        let req = TestRequest::get()
            .uri(&$uri)
            .insert_header(("Authorization", format!("Bearer {}", $token)))
            .to_request();
        let resp = test::call_service(&$app, req).await;
        let status = resp.status();
        let body: Value = test::read_body_json(resp).await;
        (status, body)
    }};
}

macro_rules! book {
    ($app:expr, $token:expr, $org:expr, $date:expr, $start:expr, $end:expr) => {{
        let req = TestRequest::post()
            .uri("/api/appointments")
            .insert_header(("Authorization", format!("Bearer {}", $token)))
            .set_json(json!({
                "organizationId": $org,
                "date": $date,
                "timeSlot": { "start": $start, "end": $end },
                "notes": "first visit",
            }))
            .to_request();
        let resp = test::call_service(&$app, req).await;
        let status = resp.status();
        let body: Value = test::read_body_json(resp).await;
        (status, body)
    }};
}

fn available_count(body: &Value) -> usize {
    body["data"]["slots"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|s| s["isAvailable"] == json!(true))
        .count()
}

// =============================================================================
// Auth
// =============================================================================

#[actix_rt::test]
async fn test_register_login_and_me() {
    let app = init_app!();
    let (_, user_id) = register!(app, "Alice", "Alice@Example.com", "individual");

    let req = TestRequest::post()
        .uri("/api/auth/login")
        .peer_addr(peer())
        .set_json(json!({ "email": "alice@example.com", "password": "password123" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], 0);
    let token = body["data"]["token"].as_str().unwrap().to_string();
    assert!(body["data"]["expiresIn"].as_u64().unwrap() > 0);

    let (status, body) = get_json!(app, "/api/auth/me".to_string(), token);
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], json!(user_id));
    assert_eq!(body["data"]["email"], "alice@example.com");
    assert_eq!(body["data"]["role"], "individual");
    assert!(body["data"].get("passwordHash").is_none());
}

#[actix_rt::test]
async fn test_register_duplicate_email_conflicts() {
    let app = init_app!();
    register!(app, "Alice", "alice@example.com", "individual");

    let req = TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({
            "name": "Other",
            "email": "ALICE@example.com",
            "password": "password123",
            "role": "organization",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[actix_rt::test]
async fn test_register_invalid_data_reports_fields() {
    let app = init_app!();
    let req = TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({
            "name": "",
            "email": "not-an-email",
            "password": "short",
            "role": "individual",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"name"));
    assert!(fields.contains(&"email"));
    assert!(fields.contains(&"password"));
}

#[actix_rt::test]
async fn test_login_wrong_password_unauthorized() {
    let app = init_app!();
    register!(app, "Alice", "alice@example.com", "individual");

    let req = TestRequest::post()
        .uri("/api/auth/login")
        .peer_addr(peer())
        .set_json(json!({ "email": "alice@example.com", "password": "wrong-password" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn test_login_is_rate_limited() {
    let app = init_app!();
    let burst = StaticConfig::default().auth.login_burst_size;

    let mut last = StatusCode::OK;
    for _ in 0..=burst {
        let req = TestRequest::post()
            .uri("/api/auth/login")
            .peer_addr(peer())
            .set_json(json!({ "email": "nobody@example.com", "password": "password123" }))
            .to_request();
        last = test::call_service(&app, req).await.status();
    }
    assert_eq!(last, StatusCode::TOO_MANY_REQUESTS);
}

#[actix_rt::test]
async fn test_protected_routes_require_token() {
    let app = init_app!();

    let req = TestRequest::get().uri("/api/appointments").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let (status, _) = get_json!(app, "/api/profile".to_string(), "garbage");
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Organizations and slots
// =============================================================================

#[actix_rt::test]
async fn test_public_slots_and_organization_listing() {
    let app = init_app!();
    let (_, org_id) = register!(app, "Clinic", "clinic@example.com", "organization");

    let req = TestRequest::get().uri("/api/organizations").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["name"], "Clinic");

    let req = TestRequest::get()
        .uri(&format!("/api/organizations/{}/slots?date={}", org_id, MONDAY))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["isLocked"], false);
    let slots = body["data"]["slots"].as_array().unwrap();
    assert_eq!(slots.len(), 16);
    assert_eq!(slots[0]["id"], format!("{}_09:00", MONDAY));
    assert_eq!(slots[0]["start"], "09:00");
    assert_eq!(slots[0]["end"], "09:30");
    assert_eq!(available_count(&body), 16);

    // Sunday is closed by default
    let req = TestRequest::get()
        .uri(&format!("/api/organizations/{}/slots?date=2030-01-13", org_id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert!(body["data"]["slots"].as_array().unwrap().is_empty());
}

#[actix_rt::test]
async fn test_slots_validation_errors() {
    let app = init_app!();
    let (_, org_id) = register!(app, "Clinic", "clinic@example.com", "organization");

    let req = TestRequest::get()
        .uri(&format!("/api/organizations/{}/slots?date=07-01-2030", org_id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["errors"][0]["field"], "date");

    let req = TestRequest::get()
        .uri(&format!("/api/organizations/{}/slots", org_id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = TestRequest::get()
        .uri(&format!(
            "/api/organizations/{}/slots?date={}",
            uuid::Uuid::new_v4(),
            MONDAY
        ))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_update_settings_changes_generated_slots() {
    let app = init_app!();
    let (token, org_id) = register!(app, "Clinic", "clinic@example.com", "organization");

    // warm the slot cache before the update
    let uri = format!("/api/organizations/{}/slots?date={}", org_id, MONDAY);
    let req = TestRequest::get().uri(&uri).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["slots"].as_array().unwrap().len(), 16);

    let days = [
        "monday",
        "tuesday",
        "wednesday",
        "thursday",
        "friday",
        "saturday",
        "sunday",
    ];
    let hours: Vec<Value> = days
        .iter()
        .map(|day| {
            json!({
                "day": day,
                "start": "10:00",
                "end": "12:00",
                "isOpen": *day != "sunday",
            })
        })
        .collect();
    let req = TestRequest::put()
        .uri("/api/organizations/me/settings")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .set_json(json!({
            "businessHours": hours,
            "slotDuration": 45,
            "breakBetweenSlots": 15,
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = TestRequest::get().uri(&uri).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let starts: Vec<&str> = body["data"]["slots"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["start"].as_str().unwrap())
        .collect();
    assert_eq!(starts, vec!["10:00", "11:00"]);

    let (status, body) = get_json!(app, "/api/organizations/me/settings".to_string(), token);
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["slotDuration"], 45);
}

#[actix_rt::test]
async fn test_invalid_settings_rejected() {
    let app = init_app!();
    let (token, _) = register!(app, "Clinic", "clinic@example.com", "organization");

    let req = TestRequest::put()
        .uri("/api/organizations/me/settings")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .set_json(json!({
            "businessHours": [
                { "day": "monday", "start": "17:00", "end": "09:00", "isOpen": true }
            ],
            "slotDuration": 30,
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_individual_cannot_manage_settings() {
    let app = init_app!();
    let (token, _) = register!(app, "Alice", "alice@example.com", "individual");

    let (status, body) = get_json!(app, "/api/organizations/me/settings".to_string(), token);
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], 1003);
}

#[actix_rt::test]
async fn test_lock_and_unlock_day() {
    let app = init_app!();
    let (token, org_id) = register!(app, "Clinic", "clinic@example.com", "organization");

    let req = TestRequest::post()
        .uri("/api/organizations/me/locked-days")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .set_json(json!({ "date": MONDAY }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["dates"], json!([MONDAY]));

    let uri = format!("/api/organizations/{}/slots?date={}", org_id, MONDAY);
    let req = TestRequest::get().uri(&uri).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["isLocked"], true);
    assert_eq!(body["data"]["slots"].as_array().unwrap().len(), 16);
    assert_eq!(available_count(&body), 0);

    let req = TestRequest::delete()
        .uri(&format!("/api/organizations/me/locked-days/{}", MONDAY))
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["dates"], json!([]));

    let req = TestRequest::get().uri(&uri).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["isLocked"], false);
    assert_eq!(available_count(&body), 16);
}

#[actix_rt::test]
async fn test_status_range() {
    let app = init_app!();
    let (token, org_id) = register!(app, "Clinic", "clinic@example.com", "organization");

    let req = TestRequest::post()
        .uri("/api/organizations/me/locked-days")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .set_json(json!({ "date": "2030-01-08" }))
        .to_request();
    test::call_service(&app, req).await;

    let req = TestRequest::get()
        .uri(&format!(
            "/api/organizations/{}/status?from=2030-01-07&to=2030-01-13",
            org_id
        ))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let days = body["data"]["days"].as_array().unwrap();
    assert_eq!(days.len(), 7);
    assert_eq!(days[0]["date"], "2030-01-07");
    assert_eq!(days[0]["totalSlots"], 16);
    assert_eq!(days[0]["availableSlots"], 16);
    assert_eq!(days[1]["isLocked"], true);
    assert_eq!(days[1]["availableSlots"], 0);
    assert_eq!(days[6]["totalSlots"], 0);

    let req = TestRequest::get()
        .uri(&format!(
            "/api/organizations/{}/status?from=2030-01-13&to=2030-01-07",
            org_id
        ))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Appointments
// =============================================================================

#[actix_rt::test]
async fn test_booking_flow_and_double_booking() {
    let app = init_app!();
    let (_, org_id) = register!(app, "Clinic", "clinic@example.com", "organization");
    let (alice, _) = register!(app, "Alice", "alice@example.com", "individual");
    let (bob, _) = register!(app, "Bob", "bob@example.com", "individual");

    let (status, body) = book!(app, alice, org_id, MONDAY, "09:30", "10:00");
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["status"], "pending");
    assert_eq!(body["data"]["number"], 1);
    assert_eq!(body["data"]["notes"], "first visit");

    let (status, body) = book!(app, bob, org_id, MONDAY, "09:30", "10:00");
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 1009);

    let uri = format!("/api/organizations/{}/slots?date={}", org_id, MONDAY);
    let req = TestRequest::get().uri(&uri).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(available_count(&body), 15);
    assert_eq!(body["data"]["slots"][1]["isAvailable"], false);

    let (status, body) = book!(app, bob, org_id, MONDAY, "10:00", "10:30");
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["number"], 2);
}

#[actix_rt::test]
async fn test_booking_rejections() {
    let app = init_app!();
    let (org_token, org_id) = register!(app, "Clinic", "clinic@example.com", "organization");
    let (alice, _) = register!(app, "Alice", "alice@example.com", "individual");

    // organizations cannot book
    let (status, _) = book!(app, org_token, org_id, MONDAY, "09:00", "09:30");
    assert_eq!(status, StatusCode::FORBIDDEN);

    // not one of the generated slots
    let (status, body) = book!(app, alice, org_id, MONDAY, "09:10", "09:40");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "timeSlot");

    // closed day
    let (status, _) = book!(app, alice, org_id, "2030-01-13", "09:00", "09:30");
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // past date
    let (status, body) = book!(app, alice, org_id, "2020-01-06", "09:00", "09:30");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "date");

    // unknown organization
    let (status, _) = book!(
        app,
        alice,
        uuid::Uuid::new_v4().to_string(),
        MONDAY,
        "09:00",
        "09:30"
    );
    assert_eq!(status, StatusCode::NOT_FOUND);

    // locked day
    let req = TestRequest::post()
        .uri("/api/organizations/me/locked-days")
        .insert_header(("Authorization", format!("Bearer {}", org_token)))
        .set_json(json!({ "date": MONDAY }))
        .to_request();
    test::call_service(&app, req).await;
    let (status, body) = book!(app, alice, org_id, MONDAY, "09:00", "09:30");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "date");
}

#[actix_rt::test]
async fn test_cancel_restores_availability() {
    let app = init_app!();
    let (_, org_id) = register!(app, "Clinic", "clinic@example.com", "organization");
    let (alice, _) = register!(app, "Alice", "alice@example.com", "individual");
    let (bob, _) = register!(app, "Bob", "bob@example.com", "individual");

    let (_, body) = book!(app, alice, org_id, MONDAY, "09:00", "09:30");
    let appointment_id = body["data"]["id"].as_str().unwrap().to_string();

    // bob is not a participant
    let req = TestRequest::delete()
        .uri(&format!("/api/appointments/{}", appointment_id))
        .insert_header(("Authorization", format!("Bearer {}", bob)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = TestRequest::delete()
        .uri(&format!("/api/appointments/{}", appointment_id))
        .insert_header(("Authorization", format!("Bearer {}", alice)))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["status"], "cancelled");

    let uri = format!("/api/organizations/{}/slots?date={}", org_id, MONDAY);
    let req = TestRequest::get().uri(&uri).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(available_count(&body), 16);

    let (status, _) = book!(app, bob, org_id, MONDAY, "09:00", "09:30");
    assert_eq!(status, StatusCode::CREATED);
}

#[actix_rt::test]
async fn test_status_transitions() {
    let app = init_app!();
    let (org_token, org_id) = register!(app, "Clinic", "clinic@example.com", "organization");
    let (alice, _) = register!(app, "Alice", "alice@example.com", "individual");

    let (_, body) = book!(app, alice, org_id, MONDAY, "09:00", "09:30");
    let uri = format!("/api/appointments/{}/status", body["data"]["id"].as_str().unwrap());

    let req = TestRequest::patch()
        .uri(&uri)
        .insert_header(("Authorization", format!("Bearer {}", alice)))
        .set_json(json!({ "status": "confirmed" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = TestRequest::patch()
        .uri(&uri)
        .insert_header(("Authorization", format!("Bearer {}", org_token)))
        .set_json(json!({ "status": "confirmed" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["status"], "confirmed");

    let req = TestRequest::patch()
        .uri(&uri)
        .insert_header(("Authorization", format!("Bearer {}", org_token)))
        .set_json(json!({ "status": "pending" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_list_appointments_per_role() {
    let app = init_app!();
    let (org_token, org_id) = register!(app, "Clinic", "clinic@example.com", "organization");
    let (alice, _) = register!(app, "Alice", "alice@example.com", "individual");
    let (bob, _) = register!(app, "Bob", "bob@example.com", "individual");

    book!(app, alice, org_id, "2030-01-08", "09:00", "09:30");
    book!(app, bob, org_id, MONDAY, "09:00", "09:30");

    let (_, body) = get_json!(app, "/api/appointments".to_string(), org_token);
    let list = body["data"].as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["date"], MONDAY);

    let (_, body) = get_json!(app, "/api/appointments".to_string(), alice);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (_, body) = get_json!(
        app,
        "/api/appointments?from=2030-01-08&to=2030-01-08".to_string(),
        org_token
    );
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, _) = get_json!(
        app,
        "/api/appointments?from=tomorrow".to_string(),
        org_token
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_export_csv() {
    let app = init_app!();
    let (_, org_id) = register!(app, "Clinic", "clinic@example.com", "organization");
    let (alice, _) = register!(app, "Alice", "alice@example.com", "individual");
    book!(app, alice, org_id, MONDAY, "09:00", "09:30");

    let req = TestRequest::get()
        .uri("/api/appointments/export?format=csv")
        .insert_header(("Authorization", format!("Bearer {}", alice)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let disposition = resp
        .headers()
        .get("content-disposition")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("attachment"));
    assert!(disposition.contains(".csv"));

    let body = test::read_body(resp).await;
    let text = String::from_utf8(body.to_vec()).unwrap();
    let mut lines = text.lines();
    assert!(lines.next().unwrap().starts_with("number,id,date"));
    assert!(lines.next().unwrap().contains("2030-01-07"));
    assert!(lines.next().is_none());

    let req = TestRequest::get()
        .uri("/api/appointments/export?format=xml")
        .insert_header(("Authorization", format!("Bearer {}", alice)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Health
// =============================================================================

#[actix_rt::test]
async fn test_health_endpoints() {
    let app = init_app!();
    register!(app, "Clinic", "clinic@example.com", "organization");

    let req = TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["status"], "healthy");
    assert_eq!(body["data"]["checks"]["storage"]["users"], 1);

    let req = TestRequest::get().uri("/health/live").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let req = TestRequest::get().uri("/health/ready").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
}
