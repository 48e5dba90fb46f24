//! Shared fixtures for the booking client integration tests

#![allow(dead_code)]

use chrono::{DateTime, Duration, Local, Utc};
use serde_json::{json, Value};
use taxi_client::config::{Config, LookupMethod};
use taxi_client::validation::{BookingForm, FORM_DATETIME_FORMAT};
use taxi_client::BookingDesk;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PASS: &str = "admin123";

pub fn config_for(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.api.base_url = server.uri();
    config.api.timeout_secs = 5;
    config
}

pub fn desk_for(server: &MockServer) -> BookingDesk {
    BookingDesk::new(config_for(server)).expect("desk")
}

pub fn desk_with_lookup(server: &MockServer, lookup: LookupMethod) -> BookingDesk {
    let mut config = config_for(server);
    config.api.lookup_method = lookup;
    BookingDesk::new(config).expect("desk")
}

/// A form that passes validation: pickup two hours from now
pub fn asha_form() -> BookingForm {
    BookingForm {
        name: "Asha Rao".to_string(),
        phone: "9876543210".to_string(),
        pickup: "Station".to_string(),
        drop: "Airport".to_string(),
        datetime: (Local::now() + Duration::hours(2)).format(FORM_DATETIME_FORMAT).to_string(),
        seats: "2".to_string(),
    }
}

pub fn booking_json(id: u64, status: &str, created_at: DateTime<Utc>) -> Value {
    json!({
        "id": id,
        "name": format!("Rider {}", id),
        "phone": "9876543210",
        "pickup": "Station",
        "drop": "Airport",
        "datetime": "2030-01-01T10:00",
        "seats": 2,
        "status": status,
        "createdAt": created_at.to_rfc3339(),
        "updatedAt": created_at.to_rfc3339(),
    })
}

pub async fn mount_health(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "healthy",
            "mongodb": "connected",
        })))
        .mount(server)
        .await;
}

pub async fn mount_bookings(server: &MockServer, bookings: Vec<Value>) {
    Mock::given(method("GET"))
        .and(path("/bookings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "bookings": bookings,
        })))
        .mount(server)
        .await;
}

/// Log in with the default credentials; panics if the login itself fails
pub async fn logged_in(desk: &BookingDesk) {
    desk.login(ADMIN_USER, ADMIN_PASS)
        .await
        .expect("login")
        .expect("initial load");
}
