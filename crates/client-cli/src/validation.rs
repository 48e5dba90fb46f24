//! Local checks applied to the booking form before anything is sent

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Timelike};
use shared::{CreateBookingRequest, MAX_SEATS, MIN_SEATS};
use thiserror::Error;

/// Format produced by a `datetime-local` input, and used for the pickup hint
pub const FORM_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

const NAIVE_FORMATS: [&str; 3] = [FORM_DATETIME_FORMAT, "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Raw booking form values, exactly as entered
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingForm {
    pub name: String,
    pub phone: String,
    pub pickup: String,
    pub drop: String,
    pub datetime: String,
    pub seats: String,
}

impl BookingForm {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// The first rule a form breaks. Display text is what the user sees.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter a valid name (at least 2 characters)")]
    Name,
    #[error("Please enter a valid phone number")]
    Phone,
    #[error("Please enter a valid pickup location")]
    Pickup,
    #[error("Please enter a valid drop location")]
    Drop,
    #[error("Please select date and time")]
    DatetimeMissing,
    #[error("Please select a time at least {0} minutes from now")]
    DatetimeTooEarly(i64),
    #[error("Please select between 1 and 6 seats")]
    Seats,
    #[error("Please enter both Booking ID and Phone Number")]
    LookupFields,
}

fn long_enough(value: &str, min_chars: usize) -> bool {
    value.trim().chars().count() >= min_chars
}

/// Parse a pickup time. Values without an offset are read in `tz`.
pub fn parse_pickup_time<Tz: TimeZone>(raw: &str, tz: &Tz) -> Option<DateTime<Tz>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(tz));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .and_then(|naive| tz.from_local_datetime(&naive).earliest())
}

/// `now` plus the lead time; `None` when that falls outside chrono's range
fn lead_deadline<Tz: TimeZone>(now: &DateTime<Tz>, min_lead_minutes: i64) -> Option<DateTime<Tz>> {
    Duration::try_minutes(min_lead_minutes).and_then(|lead| now.clone().checked_add_signed(lead))
}

/// Earliest pickup time the form accepts, rounded up to the next whole minute
pub fn earliest_pickup<Tz: TimeZone>(now: &DateTime<Tz>, min_lead_minutes: i64) -> Option<DateTime<Tz>> {
    let min = lead_deadline(now, min_lead_minutes)?;
    let whole = min
        .with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or_else(|| min.clone());
    if whole < min {
        whole.checked_add_signed(Duration::minutes(1))
    } else {
        Some(whole)
    }
}

/// Check the form against `now`. The first violation wins; on success the
/// trimmed request body is returned.
pub fn validate<Tz: TimeZone>(
    form: &BookingForm,
    now: &DateTime<Tz>,
    min_lead_minutes: i64,
) -> Result<CreateBookingRequest, ValidationError> {
    if !long_enough(&form.name, 2) {
        return Err(ValidationError::Name);
    }
    if !long_enough(&form.phone, 10) {
        return Err(ValidationError::Phone);
    }
    if !long_enough(&form.pickup, 3) {
        return Err(ValidationError::Pickup);
    }
    if !long_enough(&form.drop, 3) {
        return Err(ValidationError::Drop);
    }
    if form.datetime.trim().is_empty() {
        return Err(ValidationError::DatetimeMissing);
    }

    let min_time = lead_deadline(now, min_lead_minutes);
    match (parse_pickup_time(&form.datetime, &now.timezone()), min_time) {
        (Some(pickup), Some(min_time)) if pickup >= min_time => {}
        _ => return Err(ValidationError::DatetimeTooEarly(min_lead_minutes)),
    }

    let seats = form
        .seats
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|s| (MIN_SEATS as i64..=MAX_SEATS as i64).contains(s))
        .ok_or(ValidationError::Seats)?;

    Ok(CreateBookingRequest {
        name: form.name.trim().to_string(),
        phone: form.phone.trim().to_string(),
        pickup: form.pickup.trim().to_string(),
        drop: form.drop.trim().to_string(),
        datetime: form.datetime.trim().to_string(),
        seats: seats as u32,
    })
}

/// Phone numbers match when their digits do; spacing and dashes are ignored
pub fn same_phone(a: &str, b: &str) -> bool {
    let digits = |s: &str| s.chars().filter(char::is_ascii_digit).collect::<String>();
    let a = digits(a);
    !a.is_empty() && a == digits(b)
}

/// Parse the status-lookup inputs; both are required and the id must be a
/// positive integer.
pub fn validate_lookup(booking_id: &str, phone: &str) -> Result<(u64, String), ValidationError> {
    let id = booking_id
        .trim()
        .parse::<u64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or(ValidationError::LookupFields)?;
    let phone = phone.trim();
    if phone.is_empty() {
        return Err(ValidationError::LookupFields);
    }
    Ok((id, phone.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 5, 1, 9, 0, 0).unwrap()
    }

    fn valid_form() -> BookingForm {
        BookingForm {
            name: "Asha Rao".to_string(),
            phone: "9876543210".to_string(),
            pickup: "Station".to_string(),
            drop: "Airport".to_string(),
            datetime: "2030-05-01T11:00".to_string(),
            seats: "2".to_string(),
        }
    }

    #[test]
    fn test_valid_form_builds_request() {
        let mut form = valid_form();
        form.name = "  Asha Rao ".to_string();
        let req = validate(&form, &now(), 30).unwrap();
        assert_eq!(req.name, "Asha Rao");
        assert_eq!(req.seats, 2);
        assert_eq!(req.datetime, "2030-05-01T11:00");
    }

    #[test]
    fn test_seats_outside_range_rejected() {
        for seats in ["0", "7", "-1", "100", "", "two", "2.5"] {
            let mut form = valid_form();
            form.seats = seats.to_string();
            assert_eq!(validate(&form, &now(), 30), Err(ValidationError::Seats), "seats={seats}");
        }
        for seats in 1..=6 {
            let mut form = valid_form();
            form.seats = seats.to_string();
            assert!(validate(&form, &now(), 30).is_ok());
        }
    }

    #[test]
    fn test_pickup_must_be_thirty_minutes_out() {
        let mut form = valid_form();
        for early in ["2030-05-01T09:29", "2030-05-01T09:00", "2030-04-30T23:00", "not a date"] {
            form.datetime = early.to_string();
            assert_eq!(
                validate(&form, &now(), 30),
                Err(ValidationError::DatetimeTooEarly(30)),
                "datetime={early}"
            );
        }
        form.datetime = "2030-05-01T09:30".to_string();
        assert!(validate(&form, &now(), 30).is_ok());
    }

    #[test]
    fn test_offset_datetimes_compare_as_instants() {
        let mut form = valid_form();
        // 14:45 at +05:30 is 09:15 UTC
        form.datetime = "2030-05-01T14:45:00+05:30".to_string();
        assert_eq!(validate(&form, &now(), 30), Err(ValidationError::DatetimeTooEarly(30)));
        form.datetime = "2030-05-01T15:30:00+05:30".to_string();
        assert!(validate(&form, &now(), 30).is_ok());
    }

    #[test]
    fn test_first_violation_wins() {
        let form = BookingForm {
            name: "A".to_string(),
            phone: "1".to_string(),
            seats: "9".to_string(),
            ..Default::default()
        };
        assert_eq!(validate(&form, &now(), 30), Err(ValidationError::Name));

        let mut form = valid_form();
        form.phone = "98765".to_string();
        form.drop = "x".to_string();
        assert_eq!(validate(&form, &now(), 30), Err(ValidationError::Phone));

        let mut form = valid_form();
        form.drop = " ab ".to_string();
        form.datetime = String::new();
        assert_eq!(validate(&form, &now(), 30), Err(ValidationError::Drop));

        let mut form = valid_form();
        form.datetime = "  ".to_string();
        form.seats = "0".to_string();
        assert_eq!(validate(&form, &now(), 30), Err(ValidationError::DatetimeMissing));
    }

    #[test]
    fn test_empty_form_reports_name() {
        let err = validate(&BookingForm::default(), &now(), 30).unwrap_err();
        assert_eq!(err.to_string(), "Please enter a valid name (at least 2 characters)");
    }

    #[test]
    fn test_earliest_pickup_rounds_up() {
        let with_seconds = Utc.with_ymd_and_hms(2030, 5, 1, 9, 0, 10).unwrap();
        let earliest = earliest_pickup(&with_seconds, 30).unwrap();
        assert_eq!(earliest.format(FORM_DATETIME_FORMAT).to_string(), "2030-05-01T09:31");

        let exact = earliest_pickup(&now(), 30).unwrap();
        assert_eq!(exact.format(FORM_DATETIME_FORMAT).to_string(), "2030-05-01T09:30");
    }

    #[test]
    fn test_huge_lead_time_is_too_early_not_a_crash() {
        for lead in [9_000_000_000_000, i64::MAX] {
            assert_eq!(
                validate(&valid_form(), &now(), lead),
                Err(ValidationError::DatetimeTooEarly(lead))
            );
            assert!(earliest_pickup(&now(), lead).is_none());
        }
    }

    #[test]
    fn test_same_phone_compares_digits() {
        assert!(same_phone("9876543210", " 98765-43210 "));
        assert!(!same_phone("9876543210", "9999999999"));
        assert!(!same_phone("", ""));
    }

    #[test]
    fn test_lookup_requires_both_fields() {
        assert_eq!(validate_lookup("12", " 9876543210 "), Ok((12, "9876543210".to_string())));
        assert_eq!(validate_lookup("", "9876543210"), Err(ValidationError::LookupFields));
        assert_eq!(validate_lookup("0", "9876543210"), Err(ValidationError::LookupFields));
        assert_eq!(validate_lookup("abc", "9876543210"), Err(ValidationError::LookupFields));
        assert_eq!(validate_lookup("12", "   "), Err(ValidationError::LookupFields));
    }

    #[test]
    fn test_reset_clears_form() {
        let mut form = valid_form();
        form.reset();
        assert_eq!(form, BookingForm::default());
    }
}
