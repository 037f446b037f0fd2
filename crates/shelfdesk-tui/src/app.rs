//! Application state management for shelfdesk.
//!
//! This module contains the `App` struct that holds the form values typed
//! into the test bench, the text shown in each result panel, and the channel
//! that brings command results back from their background tasks.

use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use shelfdesk_core::harness::{present, Outcome};
use shelfdesk_core::models::BookFields;
use shelfdesk_core::{
    ApiError, Command, Config, Credentials, DisplaySink, SessionClient, SessionData, SinkId,
};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the command result channel.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Maximum length for a single form field.
const MAX_FIELD_LENGTH: usize = 256;

/// Maximum length for the password field.
const MAX_PASSWORD_LENGTH: usize = 128;

/// Lines to scroll the result panel on page up/down.
pub const PAGE_SCROLL_SIZE: u16 = 10;

const EMAIL_ENV: &str = "SHELFDESK_EMAIL";
const PASSWORD_ENV: &str = "SHELFDESK_PASSWORD";

// ============================================================================
// UI State Types
// ============================================================================

/// Main navigation tabs, one per section of the test bench
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Session,
    Books,
    Reservations,
    Loans,
    Dashboard,
    Notifications,
}

impl Tab {
    pub const ALL: [Tab; 6] = [
        Tab::Session,
        Tab::Books,
        Tab::Reservations,
        Tab::Loans,
        Tab::Dashboard,
        Tab::Notifications,
    ];

    /// Get the display title for this tab.
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Session => "Session",
            Tab::Books => "Books",
            Tab::Reservations => "Reservations",
            Tab::Loans => "Loans",
            Tab::Dashboard => "Dashboard",
            Tab::Notifications => "Notifications",
        }
    }

    /// Get the next tab (wrapping around)
    pub fn next(&self) -> Self {
        match self {
            Tab::Session => Tab::Books,
            Tab::Books => Tab::Reservations,
            Tab::Reservations => Tab::Loans,
            Tab::Loans => Tab::Dashboard,
            Tab::Dashboard => Tab::Notifications,
            Tab::Notifications => Tab::Session,
        }
    }

    /// Get the previous tab (wrapping around)
    pub fn prev(&self) -> Self {
        match self {
            Tab::Session => Tab::Notifications,
            Tab::Books => Tab::Session,
            Tab::Reservations => Tab::Books,
            Tab::Loans => Tab::Reservations,
            Tab::Dashboard => Tab::Loans,
            Tab::Notifications => Tab::Dashboard,
        }
    }

    /// Result panel shown beside this tab's form
    pub fn sink(&self) -> SinkId {
        match self {
            Tab::Session => SinkId::TokenStatus,
            Tab::Books => SinkId::Books,
            Tab::Reservations => SinkId::Reservations,
            Tab::Loans => SinkId::Loans,
            Tab::Dashboard => SinkId::Dashboard,
            Tab::Notifications => SinkId::Notifications,
        }
    }

    pub fn fields(&self) -> &'static [FieldId] {
        match self {
            Tab::Session => &[FieldId::Email, FieldId::Password, FieldId::UserType],
            Tab::Books => &[
                FieldId::BookId,
                FieldId::Title,
                FieldId::Author,
                FieldId::Genre,
                FieldId::Description,
            ],
            Tab::Reservations => &[FieldId::ReservationBookId, FieldId::ReservationId],
            Tab::Loans => &[FieldId::LoanId],
            Tab::Dashboard => &[FieldId::DashboardPeriod],
            Tab::Notifications => &[],
        }
    }

    pub fn actions(&self) -> &'static [Action] {
        match self {
            Tab::Session => &[Action::Login, Action::Logout, Action::WhoAmI],
            Tab::Books => &[
                Action::ListBooks,
                Action::CreateBook,
                Action::EditBook,
                Action::DeactivateBook,
            ],
            Tab::Reservations => &[
                Action::CreateReservation,
                Action::ListReservations,
                Action::ConfirmReservation,
            ],
            Tab::Loans => &[Action::ReturnLoan, Action::ListLoans],
            Tab::Dashboard => &[Action::Dashboard],
            Tab::Notifications => &[
                Action::DueReminders,
                Action::ExpiringReservations,
                Action::TestEmail,
                Action::PublicAlerts,
            ],
        }
    }

    /// Number of focusable items (fields, then buttons)
    pub fn item_count(&self) -> usize {
        self.fields().len() + self.actions().len()
    }

    pub fn item(&self, index: usize) -> Option<FormItem> {
        let fields = self.fields();
        if index < fields.len() {
            Some(FormItem::Field(fields[index]))
        } else {
            self.actions()
                .get(index - fields.len())
                .copied()
                .map(FormItem::Button)
        }
    }
}

/// Input fields of the test bench
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldId {
    Email,
    Password,
    UserType,
    BookId,
    Title,
    Author,
    Genre,
    Description,
    ReservationBookId,
    ReservationId,
    LoanId,
    DashboardPeriod,
}

impl FieldId {
    pub fn label(&self) -> &'static str {
        match self {
            FieldId::Email => "Email",
            FieldId::Password => "Password",
            FieldId::UserType => "User type",
            FieldId::BookId => "Book id (edit)",
            FieldId::Title => "Title",
            FieldId::Author => "Author",
            FieldId::Genre => "Genre",
            FieldId::Description => "Description",
            FieldId::ReservationBookId => "Book id",
            FieldId::ReservationId => "Reservation id",
            FieldId::LoanId => "Loan id",
            FieldId::DashboardPeriod => "Period",
        }
    }

    /// Placeholder shown while the field is empty
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            FieldId::UserType => Some("optional: aluno/professor/admin"),
            FieldId::DashboardPeriod => Some("optional: ultimos_7_dias/mes_atual"),
            _ => None,
        }
    }

    pub fn is_secret(&self) -> bool {
        matches!(self, FieldId::Password)
    }

    pub fn max_len(&self) -> usize {
        if self.is_secret() {
            MAX_PASSWORD_LENGTH
        } else {
            MAX_FIELD_LENGTH
        }
    }
}

/// Buttons of the test bench
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Login,
    Logout,
    WhoAmI,
    ListBooks,
    CreateBook,
    EditBook,
    DeactivateBook,
    CreateReservation,
    ListReservations,
    ConfirmReservation,
    ReturnLoan,
    ListLoans,
    Dashboard,
    DueReminders,
    ExpiringReservations,
    TestEmail,
    PublicAlerts,
}

impl Action {
    pub fn label(&self) -> &'static str {
        match self {
            Action::Login => "Login",
            Action::Logout => "Logout",
            Action::WhoAmI => "Who am I",
            Action::ListBooks => "List books",
            Action::CreateBook => "Create book",
            Action::EditBook => "Edit book",
            Action::DeactivateBook => "Deactivate book",
            Action::CreateReservation => "Create reservation",
            Action::ListReservations => "List my reservations",
            Action::ConfirmReservation => "Confirm reservation",
            Action::ReturnLoan => "Return loan",
            Action::ListLoans => "List loans",
            Action::Dashboard => "Fetch dashboard",
            Action::DueReminders => "Send due reminders",
            Action::ExpiringReservations => "Warn expiring reservations",
            Action::TestEmail => "Send test email",
            Action::PublicAlerts => "Public alerts",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormItem {
    Field(FieldId),
    Button(Action),
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ShowingHelp,
    ConfirmingQuit,
    Quitting,
}

// ============================================================================
// Background Task Results
// ============================================================================

/// A finished command, sent back from its task
struct CommandResult {
    command: Command,
    result: Result<Outcome, ApiError>,
}

/// Main application state container
pub struct App {
    pub config: Config,
    /// Where `config` is saved after a successful login; None skips saving
    config_path: Option<PathBuf>,
    pub client: SessionClient,

    // UI State
    pub state: AppState,
    pub current_tab: Tab,
    /// Index into the current tab's form items
    pub focus: usize,
    pub result_scroll: u16,

    // Form values, keyed by field
    form: HashMap<FieldId, String>,

    // Display sinks
    pub panels: HashMap<SinkId, String>,
    /// Pending blocking notices, oldest first
    pub alerts: VecDeque<String>,

    /// Snapshot of the session for rendering
    pub session: Option<SessionData>,
    pub in_flight: usize,
    pub status_message: Option<String>,

    results_rx: mpsc::Receiver<CommandResult>,
    results_tx: mpsc::Sender<CommandResult>,
}

impl App {
    /// Create a new application instance
    pub fn new(config: Config) -> Result<Self> {
        let client = SessionClient::from_config(&config)?;

        // Prefill credentials from env vars or config
        let email = std::env::var(EMAIL_ENV)
            .ok()
            .or_else(|| config.last_email.clone())
            .unwrap_or_default();
        let password = std::env::var(PASSWORD_ENV).unwrap_or_default();

        debug!(base_url = client.base_url(), "App created");
        let mut app = Self::from_parts(config, client, email, password);
        app.config_path = Config::config_path().ok();
        Ok(app)
    }

    /// App with an empty form, for tests
    #[cfg(test)]
    pub(crate) fn with_client(config: Config, client: SessionClient) -> Self {
        Self::from_parts(config, client, String::new(), String::new())
    }

    /// Save the config to `path` instead of the default location
    #[cfg(test)]
    pub(crate) fn with_config_path(mut self, path: PathBuf) -> Self {
        self.config_path = Some(path);
        self
    }

    fn from_parts(config: Config, client: SessionClient, email: String, password: String) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        let mut form = HashMap::new();
        form.insert(FieldId::Email, email);
        form.insert(FieldId::Password, password);

        Self {
            config,
            config_path: None,
            client,
            state: AppState::Normal,
            current_tab: Tab::Session,
            focus: 0,
            result_scroll: 0,
            form,
            panels: HashMap::new(),
            alerts: VecDeque::new(),
            session: None,
            in_flight: 0,
            status_message: None,
            results_rx: rx,
            results_tx: tx,
        }
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    pub fn select_tab(&mut self, tab: Tab) {
        if self.current_tab != tab {
            self.current_tab = tab;
            self.focus = 0;
            self.result_scroll = 0;
        }
    }

    pub fn focus_next(&mut self) {
        let count = self.current_tab.item_count();
        if count > 0 {
            self.focus = (self.focus + 1) % count;
        }
    }

    pub fn focus_prev(&mut self) {
        let count = self.current_tab.item_count();
        if count > 0 {
            self.focus = (self.focus + count - 1) % count;
        }
    }

    pub fn focused_item(&self) -> Option<FormItem> {
        self.current_tab.item(self.focus)
    }

    pub fn focused_field(&self) -> Option<FieldId> {
        match self.focused_item() {
            Some(FormItem::Field(field)) => Some(field),
            _ => None,
        }
    }

    pub fn scroll_result_down(&mut self, lines: u16) {
        self.result_scroll = self.result_scroll.saturating_add(lines);
    }

    pub fn scroll_result_up(&mut self, lines: u16) {
        self.result_scroll = self.result_scroll.saturating_sub(lines);
    }

    // =========================================================================
    // Form
    // =========================================================================

    pub fn field(&self, field: FieldId) -> &str {
        self.form.get(&field).map(String::as_str).unwrap_or("")
    }

    pub fn push_char(&mut self, field: FieldId, c: char) {
        let value = self.form.entry(field).or_default();
        if can_add_char(value.chars().count(), field.max_len(), c) {
            value.push(c);
        }
    }

    pub fn pop_char(&mut self, field: FieldId) {
        if let Some(value) = self.form.get_mut(&field) {
            value.pop();
        }
    }

    pub fn clear_field(&mut self, field: FieldId) {
        self.form.remove(&field);
    }

    fn owned(&self, field: FieldId) -> String {
        self.field(field).to_string()
    }

    fn book_fields(&self) -> BookFields {
        BookFields {
            title: self.owned(FieldId::Title),
            author: self.owned(FieldId::Author),
            genre: self.owned(FieldId::Genre),
            description: self.owned(FieldId::Description),
        }
    }

    /// Read the form as it is right now; values are passed verbatim.
    pub fn build_command(&self, action: Action) -> Command {
        match action {
            Action::Login => Command::Login(
                Credentials::new(self.owned(FieldId::Email), self.owned(FieldId::Password))
                    .with_user_type(self.owned(FieldId::UserType)),
            ),
            Action::Logout => Command::Logout,
            Action::WhoAmI => Command::WhoAmI,
            Action::ListBooks => Command::ListBooks,
            Action::CreateBook => Command::CreateBook(self.book_fields()),
            Action::EditBook => Command::EditBook {
                id: self.owned(FieldId::BookId),
                book: self.book_fields(),
            },
            Action::DeactivateBook => Command::DeactivateBook {
                id: self.owned(FieldId::BookId),
            },
            Action::CreateReservation => Command::CreateReservation {
                book_id: self.owned(FieldId::ReservationBookId),
            },
            Action::ListReservations => Command::ListReservations,
            Action::ConfirmReservation => Command::ConfirmReservation {
                reservation_id: self.owned(FieldId::ReservationId),
            },
            Action::ReturnLoan => Command::ReturnLoan {
                loan_id: self.owned(FieldId::LoanId),
            },
            Action::ListLoans => Command::ListLoans,
            Action::Dashboard => Command::Dashboard {
                period: self.owned(FieldId::DashboardPeriod),
            },
            Action::DueReminders => Command::DueReminders,
            Action::ExpiringReservations => Command::ExpiringReservations,
            Action::TestEmail => Command::TestEmail,
            Action::PublicAlerts => Command::PublicAlerts,
        }
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Run an action in its own task. Nothing waits for it; the result comes
    /// back through `check_background_tasks`.
    pub fn dispatch(&mut self, action: Action) {
        let command = self.build_command(action);
        info!(command = command.name(), "Dispatching command");
        self.status_message = Some(format!("{}...", action.label()));
        self.in_flight += 1;

        let client = self.client.clone();
        let tx = self.results_tx.clone();
        tokio::spawn(async move {
            let result = command.execute(&client).await;
            if let Err(e) = tx.send(CommandResult { command, result }).await {
                error!(error = %e, "Failed to send command result - channel closed");
            }
        });
    }

    /// Check for completed commands and display their results
    pub async fn check_background_tasks(&mut self) {
        let mut received = false;
        while let Ok(result) = self.results_rx.try_recv() {
            self.process_result(result);
            received = true;
        }
        if received {
            self.session = self.client.session_data().await;
        }
    }

    fn process_result(&mut self, CommandResult { command, result }: CommandResult) {
        self.in_flight = self.in_flight.saturating_sub(1);

        match (&command, &result) {
            (Command::Login(credentials), Ok(_)) => {
                self.config.last_email = Some(credentials.email.clone());
                if let Some(path) = &self.config_path {
                    if let Err(e) = self.config.save_to(path) {
                        warn!(error = %e, "Failed to save config");
                    }
                }
                self.clear_field(FieldId::Password);
            }
            (_, Err(e)) => {
                warn!(command = command.name(), error = %e, "Command failed");
            }
            _ => {}
        }

        let presentation = present(&command, &result);
        self.status_message = Some(format!("{}: done", command.name()));
        self.show(presentation.sink, &presentation.text);
    }

    pub fn panel(&self, sink: SinkId) -> &str {
        self.panels.get(&sink).map(String::as_str).unwrap_or("")
    }

    pub fn dismiss_alert(&mut self) {
        self.alerts.pop_front();
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }
}

impl DisplaySink for App {
    fn show(&mut self, sink: SinkId, text: &str) {
        if sink == SinkId::Alert {
            self.alerts.push_back(text.to_string());
            return;
        }
        if sink == self.current_tab.sink() {
            self.result_scroll = 0;
        }
        self.panels.insert(sink, text.to_string());
    }
}

// ============================================================================
// Input validation helpers (exported for use in input.rs)
// ============================================================================

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

/// Check if a character should be accepted into a field
pub fn can_add_char(current_len: usize, max_len: usize, c: char) -> bool {
    current_len < max_len && is_valid_input_char(c)
}

// ============================================================================
// Tests
// ============================================================================
