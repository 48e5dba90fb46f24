//! HTTP client for the booking backend

use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    Booking, BookingId, BookingListResponse, BookingStatus, CreateBookingRequest,
    CreateBookingResponse, Envelope, HealthResponse, StatusLookupRequest, StatusLookupResponse,
    UpdateStatusRequest, UpdateStatusResponse,
};
use tracing::{debug, warn};

use crate::config::{ApiConfig, LookupMethod};
use crate::error::ApiError;
use crate::validation::same_phone;

/// Thin typed wrapper over the REST endpoints. Holds no booking state.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    lookup_method: LookupMethod,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("taxi/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            lookup_method: config.lookup_method,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `GET /health`. Any non-2xx answer counts as unhealthy.
    pub async fn health(&self) -> Result<HealthResponse, ApiError> {
        let resp = self.client.get(self.url("/health")).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ApiError::Http {
                status: status.as_u16(),
                message: None,
            });
        }
        let text = resp.text().await?;
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// `GET /health`, status code only. The body is informational and may be
    /// anything.
    pub async fn ping(&self) -> Result<(), ApiError> {
        let status = self.client.get(self.url("/health")).send().await?.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ApiError::Http {
                status: status.as_u16(),
                message: None,
            })
        }
    }

    /// `GET /bookings`
    pub async fn list_bookings(&self) -> Result<Vec<Booking>, ApiError> {
        let resp = self.client.get(self.url("/bookings")).send().await?;
        let list: BookingListResponse = read_envelope(resp).await?;
        Ok(list.bookings)
    }

    /// `POST /bookings`
    pub async fn create_booking(&self, req: &CreateBookingRequest) -> Result<CreateBookingResponse, ApiError> {
        let resp = self.client.post(self.url("/bookings")).json(req).send().await?;
        read_envelope(resp).await
    }

    /// Look a booking up by id and phone.
    ///
    /// `Ok(None)` whenever the backend answers with a parseable envelope that
    /// is not a match, whatever the HTTP status. Transport failures and
    /// unparseable bodies are errors.
    pub async fn lookup_status(&self, booking_id: BookingId, phone: &str) -> Result<Option<Booking>, ApiError> {
        let key = StatusLookupRequest {
            booking_id,
            phone: phone.to_string(),
        };
        let request = match self.lookup_method {
            LookupMethod::Get => self
                .client
                .get(self.url(&format!("/bookings/{}/status", booking_id)))
                .query(&key),
            LookupMethod::Post => self.client.post(self.url("/bookings/status")).json(&key),
        };
        let resp = request.send().await?;
        let status = resp.status();
        let text = resp.text().await?;

        match serde_json::from_str::<StatusLookupResponse>(&text) {
            Ok(body) if body.success() => Ok(body
                .booking
                .filter(|b| b.id == booking_id && same_phone(&b.phone, phone))),
            Ok(body) => {
                debug!(booking_id, error = ?body.error(), "Lookup did not match");
                Ok(None)
            }
            Err(e) if status.is_success() => Err(ApiError::Decode(e.to_string())),
            Err(_) => Err(http_error(status.as_u16(), &text)),
        }
    }

    /// `POST /bookings/{id}/update`
    pub async fn update_status(
        &self,
        booking_id: BookingId,
        status: &BookingStatus,
    ) -> Result<UpdateStatusResponse, ApiError> {
        let body = UpdateStatusRequest { status: status.clone() };
        let resp = self
            .client
            .post(self.url(&format!("/bookings/{}/update", booking_id)))
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await?;
        read_envelope(resp).await
    }
}

/// Decode a `{success, error}` envelope. `success` decides the outcome; the
/// HTTP status only matters when the body is not a usable envelope.
async fn read_envelope<T>(resp: Response) -> Result<T, ApiError>
where
    T: DeserializeOwned + Envelope,
{
    let status = resp.status();
    let text = resp.text().await?;

    match serde_json::from_str::<T>(&text) {
        Ok(body) if body.success() => Ok(body),
        Ok(body) => {
            let message = body.error().map(str::to_string);
            if message.is_none() && !status.is_success() {
                return Err(ApiError::Http {
                    status: status.as_u16(),
                    message: None,
                });
            }
            Err(ApiError::Backend {
                status: status.as_u16(),
                message,
            })
        }
        Err(e) if status.is_success() => {
            warn!(error = %e, "Unparseable response body");
            Err(ApiError::Decode(e.to_string()))
        }
        Err(_) => Err(http_error(status.as_u16(), &text)),
    }
}

fn http_error(status: u16, body: &str) -> ApiError {
    let body = body.trim();
    let message = (!body.is_empty() && body.len() <= 200).then(|| body.to_string());
    ApiError::Http { status, message }
}
