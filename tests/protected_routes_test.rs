mod common;

use actix_web::{http::header, test};
use serde_json::{json, Value};
use serial_test::serial;

use common::{expired_token, user_token, TestApp};

#[actix_rt::test]
#[serial]
async fn test_trip_routes_without_auth() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get().uri("/api/trips").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);

    let req = test::TestRequest::post()
        .uri("/api/trips/plan")
        .set_json(json!({ "destinations": ["Goa"] }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Unauthorized");
    assert!(test_app.last_prompt().is_none());
}

#[actix_rt::test]
#[serial]
async fn test_trip_routes_with_bad_tokens() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    for token in [
        "Bearer not-a-jwt".to_string(),
        "Basic dXNlcjpwYXNz".to_string(),
        expired_token("alice"),
    ] {
        let req = test::TestRequest::get()
            .uri("/api/trips")
            .insert_header((header::AUTHORIZATION, token.clone()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401, "token: {token}");
    }
}

#[actix_rt::test]
#[serial]
async fn test_trips_are_scoped_to_their_owner() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/trips/plan")
        .insert_header((header::AUTHORIZATION, user_token("alice")))
        .set_json(json!({ "destinations": ["Goa"] }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let trip_id = body["tripId"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri(&format!("/api/trips/{trip_id}"))
        .insert_header((header::AUTHORIZATION, user_token("alice")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let trip: Value = test::read_body_json(resp).await;
    assert_eq!(trip["id"], trip_id.as_str());
    assert_eq!(trip["type"], "plan");
    assert!(trip["result"]["roadmap"].is_array());

    let req = test::TestRequest::get()
        .uri(&format!("/api/trips/{trip_id}"))
        .insert_header((header::AUTHORIZATION, user_token("bob")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);

    let req = test::TestRequest::get()
        .uri("/api/trips")
        .insert_header((header::AUTHORIZATION, user_token("bob")))
        .to_request();
    let trips: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(trips, json!([]));

    let req = test::TestRequest::get()
        .uri("/api/trips")
        .insert_header((header::AUTHORIZATION, user_token("alice")))
        .to_request();
    let trips: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(trips.as_array().unwrap().len(), 1);
}

#[actix_rt::test]
#[serial]
async fn test_trip_lookup_with_invalid_id() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get()
        .uri("/api/trips/not-an-object-id")
        .insert_header((header::AUTHORIZATION, user_token("alice")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let req = test::TestRequest::get()
        .uri("/api/trips/64b7f0c2a1b2c3d4e5f60718")
        .insert_header((header::AUTHORIZATION, user_token("alice")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}
