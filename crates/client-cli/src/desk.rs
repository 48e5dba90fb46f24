//! Booking desk - every user-facing operation of the client
//!
//! Holds the API client and the single `AppState`. The state mutex is only
//! taken for short synchronous sections and is never held across `.await`.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{Local, Utc};
use shared::{Booking, BookingId, BookingStatus, HealthResponse, TransitionError};
use tracing::{debug, info, warn};

use crate::api::ApiClient;
use crate::config::Config;
use crate::error::{ApiError, ClientError, Result};
use crate::render::{self, StatusView, TableRow};
use crate::state::{AdminView, AppState, LookupOutcome, Page, SeatAvailability};
use crate::validation::{self, BookingForm};

/// A booking the backend accepted
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub booking: Booking,
    pub sms_sent: bool,
}

/// A status change the backend accepted
#[derive(Debug, Clone, PartialEq)]
pub struct StatusChange {
    pub booking_id: BookingId,
    pub status: BookingStatus,
    pub sms_sent: bool,
    pub message: Option<String>,
}

#[derive(Clone)]
pub struct BookingDesk {
    api: ApiClient,
    config: Arc<Config>,
    state: Arc<Mutex<AppState>>,
}

/// Removes a booking id from the in-flight set when the update finishes,
/// whichever way it finishes.
struct InFlight {
    state: Arc<Mutex<AppState>>,
    booking_id: BookingId,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.in_flight.remove(&self.booking_id);
    }
}

impl BookingDesk {
    pub fn new(config: Config) -> Result<Self> {
        let api = ApiClient::new(&config.api)?;
        Ok(Self {
            api,
            config: Arc::new(config),
            state: Arc::new(Mutex::new(AppState::default())),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn state(&self) -> MutexGuard<'_, AppState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Read from the state without holding the lock afterwards
    pub fn with_state<T>(&self, f: impl FnOnce(&AppState) -> T) -> T {
        f(&self.state())
    }

    pub fn navigate(&self, page: Page) -> Option<AdminView> {
        debug!(?page, "Navigating");
        self.state().navigate(page)
    }

    // ------------------------------------------------------------------------
    // Backend sync
    // ------------------------------------------------------------------------

    pub async fn health(&self) -> Result<HealthResponse> {
        Ok(self.api.health().await?)
    }

    /// Replace the cache with the backend's list. On failure the cache is
    /// left as it was.
    pub async fn load_bookings(&self) -> Result<usize> {
        let bookings = self.api.list_bookings().await?;
        let count = bookings.len();
        self.state().cache.replace_all(bookings);
        info!(count, "Loaded bookings from backend");
        Ok(count)
    }

    // ------------------------------------------------------------------------
    // Booking submission
    // ------------------------------------------------------------------------

    /// Validate and submit the form. On success the booking is cached, the
    /// form is cleared and the status page is pre-filled with the new id.
    pub async fn submit(&self, form: &mut BookingForm) -> Result<Submission> {
        let request = validation::validate(form, &Local::now(), self.config.booking.min_lead_minutes)?;
        info!(name = %request.name, "Submitting booking");

        let resp = self.api.create_booking(&request).await?;
        let now = Utc::now();
        let booking = match (resp.booking, resp.booking_id) {
            (Some(booking), _) => booking,
            (None, Some(id)) => Booking {
                id,
                name: request.name,
                phone: request.phone,
                pickup: request.pickup,
                drop: request.drop,
                datetime: request.datetime,
                seats: request.seats,
                status: BookingStatus::Pending,
                created_at: Some(now),
                updated_at: Some(now),
            },
            (None, None) => return Err(ClientError::MissingBookingId),
        };

        {
            let mut state = self.state();
            state.cache.append(booking.clone());
            state.navigate(Page::Status);
            state.status_prefill = Some(booking.id);
        }
        form.reset();

        info!(booking_id = booking.id, sms_sent = resp.sms_sent, "Booking created");
        Ok(Submission {
            booking,
            sms_sent: resp.sms_sent,
        })
    }

    /// Earliest pickup time the form currently accepts, formatted for input
    pub fn earliest_pickup(&self) -> Option<String> {
        validation::earliest_pickup(&Local::now(), self.config.booking.min_lead_minutes)
            .map(|t| t.format(validation::FORM_DATETIME_FORMAT).to_string())
    }

    // ------------------------------------------------------------------------
    // Status lookup
    // ------------------------------------------------------------------------

    pub async fn lookup(&self, booking_id: &str, phone: &str) -> Result<LookupOutcome> {
        let (booking_id, phone) = validation::validate_lookup(booking_id, phone)?;
        let outcome = match self.api.lookup_status(booking_id, &phone).await? {
            Some(booking) => LookupOutcome::Found(booking),
            None => LookupOutcome::NotFound { booking_id },
        };
        debug!(booking_id, found = matches!(outcome, LookupOutcome::Found(_)), "Status lookup");
        self.state().last_lookup = Some(outcome.clone());
        Ok(outcome)
    }

    // ------------------------------------------------------------------------
    // Admin
    // ------------------------------------------------------------------------

    /// Check credentials and open the dashboard. The returned result is the
    /// booking-list refresh, which may fail independently of the login.
    pub async fn login(&self, username: &str, password: &str) -> Result<Result<usize>> {
        {
            let mut state = self.state();
            if let Err(e) = state.session.login(&self.config.admin, username, password) {
                warn!("Admin login failed");
                return Err(e);
            }
            state.navigate(Page::Admin);
        }
        info!(username, "Admin logged in");

        let loaded = self.load_bookings().await;
        if let Err(e) = &loaded {
            warn!(error = %e, "Could not load bookings after login");
        }
        Ok(loaded)
    }

    pub fn logout(&self) {
        let mut state = self.state();
        state.session.logout();
        state.navigate(Page::Admin);
        info!("Admin logged out");
    }

    pub fn is_admin(&self) -> bool {
        self.state().session.is_active()
    }

    /// Confirm or reject a booking.
    ///
    /// The cache is only touched after the backend reports success; any
    /// failure leaves local state exactly as it was. A second call for the
    /// same booking while the first is outstanding is refused.
    pub async fn update_status(&self, booking_id: BookingId, status: BookingStatus) -> Result<StatusChange> {
        if !status.is_terminal() {
            return Err(ClientError::InvalidTargetStatus(status));
        }

        let _guard = {
            let mut state = self.state();
            state.session.require()?;
            if let Some(cached) = state.cache.get(booking_id) {
                if !cached.is_pending() {
                    return Err(ClientError::AlreadyFinal(TransitionError {
                        id: booking_id,
                        from: cached.status.clone(),
                        to: status,
                    }));
                }
            }
            if !state.in_flight.insert(booking_id) {
                return Err(ClientError::UpdateInFlight(booking_id));
            }
            InFlight {
                state: Arc::clone(&self.state),
                booking_id,
            }
        };

        info!(booking_id, %status, "Updating booking status");

        if self.config.api.preflight_health {
            self.api
                .ping()
                .await
                .map_err(|e| ApiError::Unreachable(e.to_string()))?;
        }

        let resp = self.api.update_status(booking_id, &status).await?;

        {
            let mut state = self.state();
            match state.cache.apply_status(booking_id, status.clone(), Utc::now()) {
                Ok(true) => {}
                Ok(false) => warn!(booking_id, "Updated booking is not in the local cache"),
                Err(e) => warn!(booking_id, error = %e, "Local copy already final"),
            }
        }

        info!(booking_id, %status, sms_sent = resp.sms_sent, "Booking status updated");
        Ok(StatusChange {
            booking_id,
            status,
            sms_sent: resp.sms_sent,
            message: resp.message,
        })
    }

    // ------------------------------------------------------------------------
    // Seat availability
    // ------------------------------------------------------------------------

    pub fn availability(&self) -> SeatAvailability {
        self.state().availability
    }

    pub fn toggle_availability(&self) -> Result<SeatAvailability> {
        let mut state = self.state();
        state.session.require()?;
        state.availability = state.availability.toggled();
        info!(availability = %state.availability, "Seat availability changed");
        Ok(state.availability)
    }

    // ------------------------------------------------------------------------
    // Views
    // ------------------------------------------------------------------------

    /// Status page content for the last lookup, if one was made since the
    /// page was entered
    pub fn status_view(&self) -> Option<StatusView> {
        self.state().last_lookup.as_ref().map(render::status_view)
    }

    /// Booking id the status page is pre-filled with after a submission
    pub fn status_prefill(&self) -> Option<BookingId> {
        self.state().status_prefill
    }

    /// Dashboard rows for the current cache
    pub fn rows(&self) -> Vec<TableRow> {
        render::booking_rows(self.state().cache.as_slice())
    }

    pub fn cached(&self, booking_id: BookingId) -> Option<Booking> {
        self.state().cache.get(booking_id).cloned()
    }
}
