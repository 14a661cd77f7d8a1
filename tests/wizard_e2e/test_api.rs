//! Wizard HTTP surface: authentication, roles and response payloads.

use actix_web::test;
use psv_inspection_lib::auth::AuthContext;
use psv_inspection_lib::models::UserRole;
use serde_json::json;
use uuid::Uuid;

use super::test_helpers::{
    Harness, Op, auth_header, create_test_app, inspector, multipart_body, read_json,
};

#[actix_rt::test]
async fn test_start_requires_token() {
    let harness = Harness::new();
    let valve = harness.store.add_valve("PSV-060", None);
    let app = create_test_app(&harness).await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/valves/{}/wizard", valve.id))
        .to_request();
    let (status, body) = read_json(test::call_service(&app, req).await).await;
    assert_eq!(status, 401);
    assert_eq!(body["error"], "UNAUTHORIZED");
}

#[actix_rt::test]
async fn test_cliente_cannot_start_wizard() {
    let harness = Harness::new();
    let valve = harness.store.add_valve("PSV-061", None);
    let app = create_test_app(&harness).await;
    let cliente = AuthContext::new(Uuid::new_v4(), UserRole::Cliente, Some(Uuid::new_v4()));

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/valves/{}/wizard", valve.id))
        .insert_header(auth_header(&cliente))
        .to_request();
    let (status, body) = read_json(test::call_service(&app, req).await).await;
    assert_eq!(status, 403);
    assert_eq!(body["error"], "FORBIDDEN");
}

#[actix_rt::test]
async fn test_tests_mode_over_http() {
    let harness = Harness::new();
    let valve = harness.store.add_valve("PSV-062", Some(16.0));
    let app = create_test_app(&harness).await;
    let ctx = inspector();

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/valves/{}/wizard", valve.id))
        .insert_header(auth_header(&ctx))
        .to_request();
    let (status, body) = read_json(test::call_service(&app, req).await).await;
    assert_eq!(status, 201);
    assert_eq!(body["snapshot"]["step"]["key"], "mode_selection");
    assert_eq!(body["snapshot"]["can_advance"], false);
    let sid = body["session_id"].as_str().unwrap().to_string();

    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/wizard/{}/mode", sid))
        .insert_header(auth_header(&ctx))
        .set_json(json!({
            "mode": "tests",
            "test_selection": {
                "test_type": "teste_final",
                "components": ["pressao_abertura"]
            }
        }))
        .to_request();
    let (status, body) = read_json(test::call_service(&app, req).await).await;
    assert_eq!(status, 200);
    assert_eq!(body["snapshot"]["can_advance"], true);
    assert_eq!(body["snapshot"]["step_count"], 3);

    for expected_to in [1, 2] {
        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/wizard/{}/advance", sid))
            .insert_header(auth_header(&ctx))
            .to_request();
        let (status, body) = read_json(test::call_service(&app, req).await).await;
        assert_eq!(status, 200);
        assert_eq!(body["transition"]["outcome"], "moved");
        assert_eq!(body["transition"]["to"], expected_to);
    }

    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/wizard/{}/tests/readings", sid))
        .insert_header(auth_header(&ctx))
        .set_json(json!({ "opening_pressure": [15.8, 15.9, 16.5] }))
        .to_request();
    let (status, body) = read_json(test::call_service(&app, req).await).await;
    assert_eq!(status, 200);
    let evaluation = &body["snapshot"]["tests"]["evaluation"];
    assert_eq!(evaluation["approved"], false);
    assert_eq!(evaluation["deciding_trial_approved"], false);
    assert!(body["snapshot"]["inspection_id"].is_string());
}

#[actix_rt::test]
async fn test_failed_create_returns_snapshot_and_notifications() {
    let harness = Harness::new();
    let valve = harness.store.add_valve("PSV-063", None);
    let app = create_test_app(&harness).await;
    let ctx = inspector();

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/valves/{}/wizard", valve.id))
        .insert_header(auth_header(&ctx))
        .to_request();
    let (_, body) = read_json(test::call_service(&app, req).await).await;
    let sid = body["session_id"].as_str().unwrap().to_string();

    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/wizard/{}/mode", sid))
        .insert_header(auth_header(&ctx))
        .set_json(json!({ "mode": "registry" }))
        .to_request();
    test::call_service(&app, req).await;
    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/wizard/{}/advance", sid))
        .insert_header(auth_header(&ctx))
        .to_request();
    test::call_service(&app, req).await;

    harness.store.fail(Op::CreateInspection);
    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/wizard/{}/advance", sid))
        .insert_header(auth_header(&ctx))
        .to_request();
    let (status, body) = read_json(test::call_service(&app, req).await).await;
    assert_eq!(status, 500);
    assert_eq!(body["error"], "DATABASE_ERROR");
    assert!(!body["message"].as_str().unwrap().contains("injected"));
    assert_eq!(body["snapshot"]["step_index"], 1);
    assert_eq!(body["notifications"][0]["level"], "error");
    let notice = body["notifications"][0]["message"].as_str().unwrap();
    assert_eq!(notice, "Could not create the inspection");
    assert!(!notice.contains("injected"));
}

#[actix_rt::test]
async fn test_other_profile_cannot_use_session() {
    let harness = Harness::new();
    let valve = harness.store.add_valve("PSV-064", None);
    let app = create_test_app(&harness).await;
    let owner = inspector();

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/valves/{}/wizard", valve.id))
        .insert_header(auth_header(&owner))
        .to_request();
    let (_, body) = read_json(test::call_service(&app, req).await).await;
    let sid = body["session_id"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/wizard/{}", sid))
        .insert_header(auth_header(&inspector()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 404);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/wizard/{}", sid))
        .insert_header(auth_header(&owner))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 204);
    assert!(harness.sessions.is_empty().await);
}

#[actix_rt::test]
async fn test_photo_upload_over_multipart() {
    let harness = Harness::new();
    let valve = harness.store.add_valve("PSV-065", None);
    let app = create_test_app(&harness).await;
    let ctx = inspector();

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/valves/{}/wizard", valve.id))
        .insert_header(auth_header(&ctx))
        .to_request();
    let (_, body) = read_json(test::call_service(&app, req).await).await;
    let sid = body["session_id"].as_str().unwrap().to_string();

    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/wizard/{}/mode", sid))
        .insert_header(auth_header(&ctx))
        .set_json(json!({ "mode": "registry" }))
        .to_request();
    test::call_service(&app, req).await;
    for _ in 0..2 {
        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/wizard/{}/advance", sid))
            .insert_header(auth_header(&ctx))
            .to_request();
        test::call_service(&app, req).await;
    }

    let (content_type, payload) =
        multipart_body(&[("frente.jpg", &[1u8; 16][..]), ("placa.jpg", &[2u8; 16][..])]);
    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/wizard/{}/photos", sid))
        .insert_header(auth_header(&ctx))
        .insert_header(("Content-Type", content_type))
        .set_payload(payload)
        .to_request();
    let (status, body) = read_json(test::call_service(&app, req).await).await;
    assert_eq!(status, 200);
    assert_eq!(body["uploaded"].as_array().unwrap().len(), 2);
    assert_eq!(body["snapshot"]["photos"].as_array().unwrap().len(), 2);
    assert_eq!(body["uploaded"][0]["step"], "chegada");

    let photo_id = body["uploaded"][0]["id"].as_str().unwrap().to_string();
    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/wizard/{}/photos/{}", sid, photo_id))
        .insert_header(auth_header(&ctx))
        .set_json(json!({ "caption": "Vista frontal" }))
        .to_request();
    let (status, _) = read_json(test::call_service(&app, req).await).await;
    assert_eq!(status, 200);
    let photo_id = Uuid::parse_str(&photo_id).unwrap();
    assert_eq!(
        harness.store.photo(photo_id).unwrap().caption,
        "Vista frontal"
    );
}

#[actix_rt::test]
async fn test_photo_upload_rejects_too_many_parts() {
    let harness = Harness::new();
    let valve = harness.store.add_valve("PSV-066", None);
    let app = create_test_app(&harness).await;
    let ctx = inspector();

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/valves/{}/wizard", valve.id))
        .insert_header(auth_header(&ctx))
        .to_request();
    let (_, body) = read_json(test::call_service(&app, req).await).await;
    let sid = body["session_id"].as_str().unwrap().to_string();

    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/wizard/{}/mode", sid))
        .insert_header(auth_header(&ctx))
        .set_json(json!({ "mode": "registry" }))
        .to_request();
    test::call_service(&app, req).await;
    for _ in 0..2 {
        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/wizard/{}/advance", sid))
            .insert_header(auth_header(&ctx))
            .to_request();
        test::call_service(&app, req).await;
    }

    // Upload limit in the test app is 5 files
    let names: Vec<String> = (0..6).map(|i| format!("f{}.jpg", i)).collect();
    let parts: Vec<(&str, &[u8])> = names.iter().map(|n| (n.as_str(), &[1u8; 8][..])).collect();
    let (content_type, payload) = multipart_body(&parts);
    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/wizard/{}/photos", sid))
        .insert_header(auth_header(&ctx))
        .insert_header(("Content-Type", content_type))
        .set_payload(payload)
        .to_request();
    let (status, body) = read_json(test::call_service(&app, req).await).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "INVALID_INPUT");
    assert!(harness.files.keys().is_empty());
}
