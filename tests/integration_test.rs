mod common;

use actix_web::{http::header, test};
use serde_json::{json, Value};
use serial_test::serial;

use common::{user_token, TestApp, SUGGEST_ANSWER};

#[actix_rt::test]
#[serial]
async fn test_plan_without_budget_derives_breakdown() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/trips/plan")
        .insert_header((header::AUTHORIZATION, user_token("alice")))
        .set_json(json!({
            "destinations": ["Goa"],
            "days": 3,
            "travelers": 2
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;

    assert_eq!(body["provider"], "canned");
    assert!(body["tripId"].is_string());
    assert_eq!(body["calculatedBudget"], 38940);
    assert_eq!(body["budgetBreakdown"]["total"], 38940);
    assert_eq!(body["budgetBreakdown"]["accommodation"], 18000);

    let plan = &body["plan"];
    assert_eq!(plan["tripTitle"], "Goa in three days");
    assert!(plan["accommodations"][0]["mapLink"]
        .as_str()
        .unwrap()
        .starts_with("https://www.google.com/maps/search/?api=1&query="));
    assert!(plan["roadmap"][0]["activities"][0]["mapLink"].is_string());
    assert_eq!(
        plan["roadmap"][0]["activities"][1]["mapLink"],
        "https://maps.example/baga"
    );

    let prompt = test_app.last_prompt().unwrap();
    assert!(prompt.contains("Total: 38940"));
    assert_eq!(test_app.trips.len(), 1);
}

#[actix_rt::test]
#[serial]
async fn test_plan_with_budget_uses_it_verbatim() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/trips/plan")
        .insert_header((header::AUTHORIZATION, user_token("alice")))
        .set_json(json!({
            "destinations": ["Goa", "Gokarna"],
            "budget": 60000,
            "startDate": "2026-12-20",
            "endDate": "2026-12-24"
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["calculatedBudget"].is_null());
    assert!(body["budgetBreakdown"].is_null());

    let prompt = test_app.last_prompt().unwrap();
    assert!(prompt.contains("5-day itinerary"));
    assert!(prompt.contains("60000 INR"));
}

#[actix_rt::test]
#[serial]
async fn test_plan_with_unusable_output_is_bad_gateway() {
    let raw = "Sorry, I cannot help with that trip.";
    let test_app = TestApp::with_answer(raw);
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/trips/plan")
        .insert_header((header::AUTHORIZATION, user_token("alice")))
        .set_json(json!({ "destinations": ["Goa"] }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 502);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Invalid AI output");
    assert_eq!(body["raw"], raw);
    assert!(test_app.trips.is_empty());
}

#[actix_rt::test]
#[serial]
async fn test_plan_missing_required_keys_is_bad_gateway() {
    let test_app = TestApp::with_answer(r#"{"roadmap": [], "attractions": []}"#);
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/trips/plan")
        .insert_header((header::AUTHORIZATION, user_token("alice")))
        .set_json(json!({ "destinations": ["Goa"] }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 502);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["details"].as_str().unwrap().contains("accommodations"));
}

#[actix_rt::test]
#[serial]
async fn test_unknown_travel_style_is_rejected() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/trips/plan")
        .insert_header((header::AUTHORIZATION, user_token("alice")))
        .set_json(json!({ "destinations": ["Goa"], "travelStyle": "glamping" }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].is_string());
    assert!(test_app.last_prompt().is_none());
}

#[actix_rt::test]
#[serial]
async fn test_plan_validation_errors() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    for body in [
        json!({ "destinations": [] }),
        json!({ "destinations": ["  "] }),
        json!({ "destinations": ["Goa"], "budget": -10 }),
        json!({ "destinations": ["Goa"], "days": 0 }),
        json!({ "destinations": ["Goa"], "travelers": 0 }),
        json!({ "destinations": ["Goa"], "startDate": "2026-12-10", "endDate": "2026-12-01" }),
    ] {
        let req = test::TestRequest::post()
            .uri("/api/trips/plan")
            .insert_header((header::AUTHORIZATION, user_token("alice")))
            .set_json(&body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400, "body: {body}");
    }
    assert!(test_app.last_prompt().is_none());
}

#[actix_rt::test]
#[serial]
async fn test_persistence_failure_still_returns_plan() {
    let test_app = TestApp::with_failing_trip_store(common::PLAN_ANSWER);
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/trips/plan")
        .insert_header((header::AUTHORIZATION, user_token("alice")))
        .set_json(json!({ "destinations": ["Goa"] }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["tripId"].is_null());
    assert!(body["plan"]["roadmap"].is_array());
}

#[actix_rt::test]
#[serial]
async fn test_missing_provider_is_server_error() {
    let test_app = TestApp::without_provider();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/trips/plan")
        .insert_header((header::AUTHORIZATION, user_token("alice")))
        .set_json(json!({ "destinations": ["Goa"] }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 500);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "AI provider not configured");
}

#[actix_rt::test]
#[serial]
async fn test_suggest_returns_suggestions() {
    let test_app = TestApp::with_answer(SUGGEST_ANSWER);
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/trips/suggest")
        .insert_header((header::AUTHORIZATION, user_token("alice")))
        .set_json(json!({ "budget": 20000, "days": 4, "interests": ["heritage"] }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["suggestions"][0]["destination"], "Hampi");
    assert_eq!(body["provider"], "canned");
    assert!(body["tripId"].is_string());

    let req = test::TestRequest::post()
        .uri("/api/trips/suggest")
        .insert_header((header::AUTHORIZATION, user_token("alice")))
        .set_json(json!({ "days": 4 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}
