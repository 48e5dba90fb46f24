mod helpers;

use chrono::{Duration, Local, Utc};
use serde_json::json;
use shared::BookingStatus;
use taxi_client::error::{ApiError, ClientError};
use taxi_client::state::Page;
use taxi_client::validation::{ValidationError, FORM_DATETIME_FORMAT};
use taxi_client::config::Config;
use taxi_client::BookingDesk;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use helpers::*;

#[tokio::test]
async fn test_submit_creates_pending_booking() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bookings"))
        .and(body_partial_json(json!({
            "name": "Asha Rao",
            "phone": "9876543210",
            "pickup": "Station",
            "drop": "Airport",
            "seats": 2,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "booking_id": 101,
            "message": "Booking created successfully",
            "sms_sent": true,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let desk = desk_for(&server);
    let mut form = asha_form();
    let submission = desk.submit(&mut form).await.unwrap();

    assert_eq!(submission.booking.id, 101);
    assert_eq!(submission.booking.status, BookingStatus::Pending);
    assert!(submission.sms_sent);
    assert!(submission.booking.created_at.is_some());

    // form reset, booking cached, status page pre-filled
    assert_eq!(form, Default::default());
    assert_eq!(desk.cached(101).unwrap().name, "Asha Rao");
    desk.with_state(|s| {
        assert_eq!(s.page, Page::Status);
        assert_eq!(s.status_prefill, Some(101));
    });
    assert_eq!(desk.status_prefill(), Some(101));
}

#[tokio::test]
async fn test_submit_prefers_echoed_booking() {
    let server = MockServer::start().await;
    let mut echoed = booking_json(7, "pending", Utc::now());
    echoed["name"] = json!("Asha Rao");
    Mock::given(method("POST"))
        .and(path("/bookings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "booking_id": 7,
            "booking": echoed,
        })))
        .mount(&server)
        .await;

    let desk = desk_for(&server);
    let submission = desk.submit(&mut asha_form()).await.unwrap();
    assert_eq!(submission.booking.id, 7);
    assert_eq!(submission.booking.datetime, "2030-01-01T10:00");
    assert!(!submission.sms_sent);
}

#[tokio::test]
async fn test_invalid_seats_never_reach_backend() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bookings"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let desk = desk_for(&server);
    for seats in ["0", "7", "12", "-3", ""] {
        let mut form = asha_form();
        form.seats = seats.to_string();
        let err = desk.submit(&mut form).await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(ValidationError::Seats)), "seats={seats}");
        assert_eq!(form.seats, seats, "form must be kept for correction");
    }
    assert!(desk.with_state(|s| s.cache.is_empty()));
}

#[tokio::test]
async fn test_early_pickup_rejected_locally() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bookings"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let desk = desk_for(&server);
    for minutes in [-60, 0, 10, 29] {
        let mut form = asha_form();
        form.datetime = (Local::now() + Duration::minutes(minutes))
            .format(FORM_DATETIME_FORMAT)
            .to_string();
        let err = desk.submit(&mut form).await.unwrap_err();
        assert!(
            matches!(err, ClientError::Validation(ValidationError::DatetimeTooEarly(30))),
            "minutes={minutes}"
        );
    }
}

#[tokio::test]
async fn test_backend_rejection_leaves_cache_alone() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bookings"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "success": false,
            "error": "Missing required fields: drop",
        })))
        .mount(&server)
        .await;

    let desk = desk_for(&server);
    let mut form = asha_form();
    let err = desk.submit(&mut form).await.unwrap_err();
    match err {
        ClientError::Api(ApiError::Backend { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message.as_deref(), Some("Missing required fields: drop"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(form.name, "Asha Rao");
    assert!(desk.with_state(|s| s.cache.is_empty() && s.status_prefill.is_none()));
}

#[tokio::test]
async fn test_success_flag_is_authoritative_over_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bookings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": "Database error",
        })))
        .mount(&server)
        .await;

    let desk = desk_for(&server);
    let err = desk.submit(&mut asha_form()).await.unwrap_err();
    assert!(matches!(err, ClientError::Api(ApiError::Backend { status: 200, .. })));
}

#[tokio::test]
async fn test_unreachable_backend_is_network_error() {
    let mut config = Config::default();
    config.api.base_url = "http://127.0.0.1:9".to_string();
    config.api.timeout_secs = 2;
    let desk = BookingDesk::new(config).unwrap();

    let err = desk.submit(&mut asha_form()).await.unwrap_err();
    match err {
        ClientError::Api(api) => assert!(api.is_network(), "got {api:?}"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(desk.with_state(|s| s.cache.is_empty()));
}

#[tokio::test]
async fn test_success_without_id_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bookings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .mount(&server)
        .await;

    let desk = desk_for(&server);
    let err = desk.submit(&mut asha_form()).await.unwrap_err();
    assert!(matches!(err, ClientError::MissingBookingId));
    assert!(desk.with_state(|s| s.cache.is_empty()));
}
