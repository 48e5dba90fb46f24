//! Main TUI application for the admin dashboard

use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
};
use shared::{BookingId, BookingStatus};
use tokio::runtime::Handle;

use crate::desk::BookingDesk;
use crate::notify::{Action, Notice, NoticeLevel};
use crate::render::{BadgeColor, RowActions, TableRow};

/// Dashboard state. Backend calls run on the tokio runtime and report back
/// over a channel, so keys keep working while requests are outstanding.
pub struct Dashboard {
    desk: BookingDesk,
    runtime: Handle,
    /// Rows derived from the cache; recomputed after every completed request
    rows: Vec<TableRow>,
    table_state: TableState,
    /// Latest notification shown in the status bar
    notice: Option<Notice>,
    /// Requests started but not yet reported back
    loading: usize,
    notice_tx: Sender<Notice>,
    notice_rx: Receiver<Notice>,
    should_quit: bool,
}

impl Dashboard {
    pub fn new(desk: BookingDesk, runtime: Handle) -> Self {
        let (notice_tx, notice_rx) = mpsc::channel();
        let rows = desk.rows();
        let mut table_state = TableState::default();
        table_state.select(Some(0));
        Self {
            desk,
            runtime,
            rows,
            table_state,
            notice: None,
            loading: 0,
            notice_tx,
            notice_rx,
            should_quit: false,
        }
    }

    /// Run the TUI main loop. Blocks; call from a blocking thread.
    pub fn run(&mut self) -> io::Result<()> {
        let _restore = TerminalGuard::enter()?;
        let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;

        while !self.should_quit {
            self.process_notices();

            terminal.draw(|f| self.draw(f))?;

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key.code, key.modifiers);
                }
            }
        }
        Ok(())
    }

    /// Drain finished requests and re-derive the table
    fn process_notices(&mut self) {
        let mut changed = false;
        while let Ok(notice) = self.notice_rx.try_recv() {
            self.loading = self.loading.saturating_sub(1);
            self.notice = Some(notice);
            changed = true;
        }
        if changed {
            self.refresh_rows();
        }
    }

    fn refresh_rows(&mut self) {
        self.rows = self.desk.rows();
        let last = self.rows.len().saturating_sub(1);
        let selected = self.table_state.selected().unwrap_or(0).min(last);
        self.table_state.select(Some(selected));
    }

    fn selected_id(&self) -> Option<BookingId> {
        self.table_state
            .selected()
            .and_then(|i| self.rows.get(i))
            .and_then(TableRow::booking_id)
    }

    fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        if modifiers.contains(KeyModifiers::CONTROL) {
            if code == KeyCode::Char('c') {
                self.should_quit = true;
            }
            return;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Up | KeyCode::Char('k') => self.table_state.select_previous(),
            KeyCode::Down | KeyCode::Char('j') => {
                let next = self.table_state.selected().map_or(0, |i| i + 1);
                if next < self.rows.len() {
                    self.table_state.select(Some(next));
                }
            }
            KeyCode::Char('c') => self.spawn_update(BookingStatus::Confirmed),
            KeyCode::Char('x') => self.spawn_update(BookingStatus::Rejected),
            KeyCode::Char('g') => self.spawn_refresh(),
            KeyCode::Char('a') => {
                self.notice = Some(match self.desk.toggle_availability() {
                    Ok(availability) => Notice::info(format!("Seat availability: {}", availability)),
                    Err(e) => Notice::from_error(Action::Update, &e),
                });
            }
            KeyCode::Char('l') => {
                self.desk.logout();
                self.should_quit = true;
            }
            _ => {}
        }
    }

    fn spawn_update(&mut self, status: BookingStatus) {
        let Some(booking_id) = self.selected_id() else {
            return;
        };
        let desk = self.desk.clone();
        let tx = self.notice_tx.clone();
        self.loading += 1;
        self.runtime.spawn(async move {
            let notice = match desk.update_status(booking_id, status).await {
                Ok(change) => Notice::status_changed(&change),
                Err(e) => Notice::from_error(Action::Update, &e),
            };
            let _ = tx.send(notice);
        });
    }

    fn spawn_refresh(&mut self) {
        let desk = self.desk.clone();
        let tx = self.notice_tx.clone();
        self.loading += 1;
        self.runtime.spawn(async move {
            let notice = match desk.load_bookings().await {
                Ok(count) => Notice::info(format!("Loaded {} bookings", count)),
                Err(e) => Notice::from_error(Action::Load, &e),
            };
            let _ = tx.send(notice);
        });
    }

    /// Draw the UI
    fn draw(&mut self, frame: &mut Frame) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0), Constraint::Length(1)])
            .split(frame.area());

        self.draw_header(frame, layout[0]);
        self.draw_table(frame, layout[1]);
        self.draw_status_bar(frame, layout[2]);
    }

    fn draw_header(&self, frame: &mut Frame, area: Rect) {
        let admin = self.desk.with_state(|s| s.session.username().unwrap_or("-").to_string());
        let header = format!(
            " Taxi bookings | admin: {} | seats: {} | pending: {} ",
            admin,
            self.desk.availability(),
            self.desk.with_state(|s| s.cache.pending_count()),
        );
        let paragraph = Paragraph::new(header).style(Style::default().fg(Color::Cyan).bold());
        frame.render_widget(paragraph, area);
    }

    fn draw_table(&mut self, frame: &mut Frame, area: Rect) {
        let header = Row::new(["ID", "Name", "Phone", "From", "To", "Date & Time", "Seats", "Status", "Actions"])
            .style(Style::default().fg(Color::White).bold());

        let rows: Vec<Row> = self
            .rows
            .iter()
            .map(|row| match row {
                TableRow::Placeholder(text) => {
                    Row::new([Cell::from(""), Cell::from(*text)]).style(Style::default().fg(Color::DarkGray))
                }
                TableRow::Booking(b) => {
                    let actions = match &b.actions {
                        RowActions::ConfirmReject => "[c] confirm  [x] reject".to_string(),
                        RowActions::Final(label) => label.clone(),
                    };
                    Row::new([
                        Cell::from(b.id.to_string()),
                        Cell::from(b.name.clone()),
                        Cell::from(b.phone.clone()),
                        Cell::from(b.pickup.clone()),
                        Cell::from(b.drop.clone()),
                        Cell::from(b.datetime.clone()),
                        Cell::from(b.seats.to_string()),
                        Cell::from(b.badge.label.clone()).style(Style::default().fg(badge_color(b.badge.color))),
                        Cell::from(actions),
                    ])
                }
            })
            .collect();

        let widths = [
            Constraint::Length(5),
            Constraint::Min(10),
            Constraint::Length(14),
            Constraint::Min(10),
            Constraint::Min(10),
            Constraint::Length(22),
            Constraint::Length(5),
            Constraint::Length(10),
            Constraint::Length(24),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().title(" Bookings ").borders(Borders::ALL))
            .row_highlight_style(Style::default().bg(Color::DarkGray))
            .highlight_symbol("> ");

        frame.render_stateful_widget(table, area, &mut self.table_state);
    }

    fn draw_status_bar(&self, frame: &mut Frame, area: Rect) {
        let (text, color) = match &self.notice {
            Some(n) => (n.message.clone(), notice_color(n.level)),
            None => (String::new(), Color::White),
        };
        let loading = if self.loading > 0 { " ⟳ working..." } else { "" };
        let status = format!(
            " {}{} | c: confirm  x: reject  g: refresh  a: availability  l: logout  q: quit ",
            text, loading
        );

        let paragraph = Paragraph::new(status).style(Style::default().bg(Color::DarkGray).fg(color));
        frame.render_widget(paragraph, area);
    }
}

/// Raw mode plus alternate screen; restored on drop, including on error paths
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        let guard = TerminalGuard;
        execute!(io::stdout(), EnterAlternateScreen)?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

fn badge_color(color: BadgeColor) -> Color {
    match color {
        BadgeColor::Amber => Color::Yellow,
        BadgeColor::Green => Color::Green,
        BadgeColor::Red => Color::Red,
        BadgeColor::Neutral => Color::Gray,
    }
}

fn notice_color(level: NoticeLevel) -> Color {
    match level {
        NoticeLevel::Success => Color::Green,
        NoticeLevel::Info => Color::White,
        NoticeLevel::Warning => Color::Yellow,
        NoticeLevel::Error => Color::Red,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn dashboard() -> Dashboard {
        let desk = BookingDesk::new(Config::default()).unwrap();
        Dashboard::new(desk, Handle::current())
    }

    #[test]
    fn test_restore_guard_drop_is_safe_without_a_terminal() {
        drop(TerminalGuard);
    }

    #[tokio::test]
    async fn test_quit_keys() {
        for (code, modifiers) in [
            (KeyCode::Char('q'), KeyModifiers::NONE),
            (KeyCode::Esc, KeyModifiers::NONE),
            (KeyCode::Char('c'), KeyModifiers::CONTROL),
        ] {
            let mut dash = dashboard();
            dash.handle_key(code, modifiers);
            assert!(dash.should_quit);
        }
    }

    #[tokio::test]
    async fn test_placeholder_row_has_no_booking_to_update() {
        let mut dash = dashboard();
        assert_eq!(dash.selected_id(), None);
        dash.handle_key(KeyCode::Down, KeyModifiers::NONE);
        assert_eq!(dash.table_state.selected(), Some(0));
        dash.handle_key(KeyCode::Char('c'), KeyModifiers::NONE);
        assert_eq!(dash.loading, 0);
    }
}
