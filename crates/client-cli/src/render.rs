//! Projection of bookings into display rows and views
//!
//! Everything here is pure: the dashboard and the CLI printers format what
//! these functions return and never look at the cache directly.

use chrono::NaiveDateTime;
use shared::{Booking, BookingId, BookingStatus};

use crate::state::LookupOutcome;
use crate::validation::parse_pickup_time;

pub const NO_BOOKINGS: &str = "No bookings found";

/// Badge colours; `Neutral` is the fallback for statuses the client does not know
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeColor {
    Amber,
    Green,
    Red,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusBadge {
    pub label: String,
    pub icon: &'static str,
    pub color: BadgeColor,
}

pub fn status_badge(status: &BookingStatus) -> StatusBadge {
    let (icon, color) = match status {
        BookingStatus::Pending => ("⏳", BadgeColor::Amber),
        BookingStatus::Confirmed => ("✅", BadgeColor::Green),
        BookingStatus::Rejected => ("❌", BadgeColor::Red),
        BookingStatus::Unknown(_) => ("❔", BadgeColor::Neutral),
    };
    StatusBadge {
        label: status.as_str().to_uppercase(),
        icon,
        color,
    }
}

/// What the actions column offers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowActions {
    ConfirmReject,
    Final(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRow {
    pub id: BookingId,
    pub name: String,
    pub phone: String,
    pub pickup: String,
    pub drop: String,
    pub datetime: String,
    pub seats: u32,
    pub badge: StatusBadge,
    pub actions: RowActions,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableRow {
    Placeholder(&'static str),
    Booking(BookingRow),
}

impl TableRow {
    pub fn booking_id(&self) -> Option<BookingId> {
        match self {
            TableRow::Booking(row) => Some(row.id),
            TableRow::Placeholder(_) => None,
        }
    }
}

/// Render a pickup time for humans; unparseable values are shown as given
pub fn display_datetime(raw: &str) -> String {
    match parse_pickup_time(raw, &chrono::Local) {
        Some(dt) => dt.format("%d %b %Y, %I:%M %p").to_string(),
        None => NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|dt| dt.format("%d %b %Y, %I:%M %p").to_string())
            .unwrap_or_else(|_| raw.to_string()),
    }
}

fn row_actions(status: &BookingStatus) -> RowActions {
    match status {
        BookingStatus::Pending => RowActions::ConfirmReject,
        BookingStatus::Confirmed => RowActions::Final("✅ Confirmed".to_string()),
        BookingStatus::Rejected => RowActions::Final("❌ Rejected".to_string()),
        BookingStatus::Unknown(raw) => RowActions::Final(format!("❔ {}", raw)),
    }
}

/// Full table projection, newest booking first. Never returns an empty vec.
pub fn booking_rows(bookings: &[Booking]) -> Vec<TableRow> {
    if bookings.is_empty() {
        return vec![TableRow::Placeholder(NO_BOOKINGS)];
    }

    let mut sorted: Vec<&Booking> = bookings.iter().collect();
    sorted.sort_by(|a, b| Booking::newest_first(a, b));

    sorted
        .into_iter()
        .map(|b| {
            TableRow::Booking(BookingRow {
                id: b.id,
                name: b.name.clone(),
                phone: b.phone.clone(),
                pickup: b.pickup.clone(),
                drop: b.drop.clone(),
                datetime: display_datetime(&b.datetime),
                seats: b.seats,
                badge: status_badge(&b.status),
                actions: row_actions(&b.status),
            })
        })
        .collect()
}

/// Status page content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusView {
    Detail {
        id: BookingId,
        badge: StatusBadge,
        fields: Vec<(&'static str, String)>,
    },
    NotFound {
        message: &'static str,
        call_to_action: &'static str,
    },
}

pub fn status_view(outcome: &LookupOutcome) -> StatusView {
    match outcome {
        LookupOutcome::Found(b) => StatusView::Detail {
            id: b.id,
            badge: status_badge(&b.status),
            fields: vec![
                ("Name", b.name.clone()),
                ("Phone", b.phone.clone()),
                ("From", b.pickup.clone()),
                ("To", b.drop.clone()),
                ("Date & Time", display_datetime(&b.datetime)),
                ("Seats", b.seats.to_string()),
            ],
        },
        LookupOutcome::NotFound { .. } => StatusView::NotFound {
            message: "No booking found with the provided details. Please check your Booking ID and phone number.",
            call_to_action: "Make a new booking: taxi book --help",
        },
    }
}

// ============================================================================
// Plain-text output for one-shot commands
// ============================================================================

const HEADERS: [&str; 9] = ["ID", "Name", "Phone", "From", "To", "Date & Time", "Seats", "Status", "Actions"];

fn action_text(actions: &RowActions) -> String {
    match actions {
        RowActions::ConfirmReject => "confirm | reject".to_string(),
        RowActions::Final(label) => label.clone(),
    }
}

fn cells(row: &BookingRow) -> [String; 9] {
    [
        row.id.to_string(),
        row.name.clone(),
        row.phone.clone(),
        row.pickup.clone(),
        row.drop.clone(),
        row.datetime.clone(),
        row.seats.to_string(),
        row.badge.label.clone(),
        action_text(&row.actions),
    ]
}

/// Column-aligned text table
pub fn table_text(rows: &[TableRow]) -> String {
    let body: Vec<[String; 9]> = rows
        .iter()
        .filter_map(|r| match r {
            TableRow::Booking(row) => Some(cells(row)),
            TableRow::Placeholder(_) => None,
        })
        .collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for line in &body {
        for (w, cell) in widths.iter_mut().zip(line.iter()) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let format_line = |line: &[String]| {
        line.iter()
            .zip(widths.iter())
            .map(|(cell, w)| format!("{:<width$}", cell, width = *w))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = vec![format_line(&HEADERS.map(str::to_string)[..])];
    for row in rows {
        match row {
            TableRow::Placeholder(text) => out.push(text.to_string()),
            TableRow::Booking(row) => out.push(format_line(&cells(row)[..])),
        }
    }
    out.join("\n")
}

pub fn status_text(view: &StatusView) -> String {
    match view {
        StatusView::Detail { id, badge, fields } => {
            let mut out = vec![format!("{} Booking #{}  [{}]", badge.icon, id, badge.label)];
            out.extend(fields.iter().map(|(label, value)| format!("  {:<12} {}", format!("{}:", label), value)));
            out.join("\n")
        }
        StatusView::NotFound { message, call_to_action } => {
            format!("❌ Booking Not Found\n  {}\n  {}", message, call_to_action)
        }
    }
}
