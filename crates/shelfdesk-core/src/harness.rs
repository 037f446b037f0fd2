//! Harness commands and their presentation.
//!
//! Each button of the test bench is a `Command`. Executing one performs a
//! single call on the `SessionClient` and yields an `Outcome`; `present`
//! turns that result into the text a named display sink should show.
//! Front ends only implement `DisplaySink`.

use tracing::{debug, info};

use crate::api::{ApiError, SessionClient};
use crate::auth::{Credentials, SessionData};
use crate::models::{ApiResponse, BookFields, EntityKind, Fields, Payload};

pub const LOGIN_OK: &str = "Login OK!";
pub const LOGIN_FAILED: &str = "Login failed!";
pub const LOGGED_OUT: &str = "Logged out.";
pub const LOGIN_REQUIRED: &str = "Please log in first!";
pub const BOOK_DEACTIVATED: &str = "Book deactivated successfully!";
pub const EMPTY_RESPONSE: &str = "(empty response)";

/// Named output targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SinkId {
    TokenStatus,
    Books,
    Reservations,
    Loans,
    Dashboard,
    Notifications,
    /// Blocking notice the user has to dismiss
    Alert,
}

impl SinkId {
    pub fn title(&self) -> &'static str {
        match self {
            SinkId::TokenStatus => "Token status",
            SinkId::Books => "Books",
            SinkId::Reservations => "Reservations",
            SinkId::Loans => "Loans",
            SinkId::Dashboard => "Dashboard",
            SinkId::Notifications => "Notifications",
            SinkId::Alert => "Alert",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Login(Credentials),
    Logout,
    WhoAmI,
    ListBooks,
    CreateBook(BookFields),
    EditBook { id: String, book: BookFields },
    DeactivateBook { id: String },
    CreateReservation { book_id: String },
    ListReservations,
    ConfirmReservation { reservation_id: String },
    ReturnLoan { loan_id: String },
    ListLoans,
    Dashboard { period: String },
    DueReminders,
    ExpiringReservations,
    TestEmail,
    PublicAlerts,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    LoggedIn(SessionData),
    LoggedOut,
    Response(ApiResponse),
}

impl Command {
    /// Short name for logs and the status bar
    pub fn name(&self) -> &'static str {
        match self {
            Command::Login(_) => "login",
            Command::Logout => "logout",
            Command::WhoAmI => "who-am-i",
            Command::ListBooks => "list-books",
            Command::CreateBook(_) => "create-book",
            Command::EditBook { .. } => "edit-book",
            Command::DeactivateBook { .. } => "deactivate-book",
            Command::CreateReservation { .. } => "create-reservation",
            Command::ListReservations => "list-reservations",
            Command::ConfirmReservation { .. } => "confirm-reservation",
            Command::ReturnLoan { .. } => "return-loan",
            Command::ListLoans => "list-loans",
            Command::Dashboard { .. } => "dashboard",
            Command::DueReminders => "due-reminders",
            Command::ExpiringReservations => "expiring-reservations",
            Command::TestEmail => "test-email",
            Command::PublicAlerts => "public-alerts",
        }
    }

    /// Sink that receives this command's result
    pub fn target(&self) -> SinkId {
        match self {
            Command::Login(_) | Command::Logout | Command::WhoAmI => SinkId::TokenStatus,
            Command::ListBooks
            | Command::CreateBook(_)
            | Command::EditBook { .. }
            | Command::DeactivateBook { .. } => SinkId::Books,
            Command::CreateReservation { .. }
            | Command::ListReservations
            | Command::ConfirmReservation { .. } => SinkId::Reservations,
            // Loan returns surface as a blocking notice rather than in a panel
            Command::ReturnLoan { .. } => SinkId::Alert,
            Command::ListLoans => SinkId::Loans,
            Command::Dashboard { .. } => SinkId::Dashboard,
            Command::DueReminders
            | Command::ExpiringReservations
            | Command::TestEmail
            | Command::PublicAlerts => SinkId::Notifications,
        }
    }

    pub async fn execute(&self, client: &SessionClient) -> Result<Outcome, ApiError> {
        debug!(command = self.name(), "Executing command");
        let response = match self {
            Command::Login(credentials) => {
                return client.authenticate(credentials).await.map(Outcome::LoggedIn);
            }
            Command::Logout => {
                client.logout().await;
                return Ok(Outcome::LoggedOut);
            }
            Command::WhoAmI => client.current_user().await,
            Command::ListBooks => client.list(EntityKind::Books).await,
            Command::CreateBook(book) => client.create(EntityKind::Books, &Fields::from(book)).await,
            Command::EditBook { id, book } => {
                client
                    .update(EntityKind::Books, id, &Fields::from(book))
                    .await
            }
            Command::DeactivateBook { id } => client.deactivate(EntityKind::Books, id).await,
            Command::CreateReservation { book_id } => client.create_reservation(book_id).await,
            Command::ListReservations => client.list(EntityKind::Reservations).await,
            Command::ConfirmReservation { reservation_id } => {
                client.confirm_reservation(reservation_id).await
            }
            Command::ReturnLoan { loan_id } => client.return_loan(loan_id).await,
            Command::ListLoans => client.list(EntityKind::Loans).await,
            Command::Dashboard { period } => client.dashboard(Some(period.as_str())).await,
            Command::DueReminders => client.due_reminders().await,
            Command::ExpiringReservations => client.expiring_reservations().await,
            Command::TestEmail => client.send_test_email().await,
            Command::PublicAlerts => client.public_alerts().await,
        };
        response.map(Outcome::Response)
    }
}

/// What a sink should display for one command result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presentation {
    pub sink: SinkId,
    pub text: String,
}

impl Presentation {
    pub fn new(sink: SinkId, text: impl Into<String>) -> Self {
        Self {
            sink,
            text: text.into(),
        }
    }
}

fn render_payload(payload: &Payload) -> String {
    if payload.is_empty() {
        EMPTY_RESPONSE.to_string()
    } else {
        payload.to_display()
    }
}

pub fn present(command: &Command, result: &Result<Outcome, ApiError>) -> Presentation {
    let target = command.target();
    match (command, result) {
        (_, Err(ApiError::MissingCredential)) => Presentation::new(SinkId::Alert, LOGIN_REQUIRED),
        (Command::Login(_), Ok(_)) => Presentation::new(SinkId::TokenStatus, LOGIN_OK),
        (Command::Login(_), Err(_)) => Presentation::new(SinkId::TokenStatus, LOGIN_FAILED),
        (_, Ok(Outcome::LoggedIn(_))) => Presentation::new(SinkId::TokenStatus, LOGIN_OK),
        (_, Ok(Outcome::LoggedOut)) => Presentation::new(SinkId::TokenStatus, LOGGED_OUT),
        (Command::DeactivateBook { .. }, Ok(Outcome::Response(response)))
            if response.is_no_content() =>
        {
            Presentation::new(target, BOOK_DEACTIVATED)
        }
        (_, Ok(Outcome::Response(response))) => {
            Presentation::new(target, render_payload(&response.payload))
        }
        (_, Err(ApiError::Status { status, payload })) => {
            let text = if payload.is_empty() {
                format!("HTTP {}", status)
            } else {
                payload.to_display()
            };
            Presentation::new(target, text)
        }
        (_, Err(e)) => Presentation::new(target, format!("Request failed: {}", e)),
    }
}

/// A named output target that only ever gets written to.
pub trait DisplaySink {
    fn show(&mut self, sink: SinkId, text: &str);
}

/// Run one command and write its presentation to `sink`.
pub async fn dispatch<S: DisplaySink + ?Sized>(
    client: &SessionClient,
    command: &Command,
    sink: &mut S,
) -> Presentation {
    let result = command.execute(client).await;
    if let Err(e) = &result {
        info!(command = command.name(), error = %e, "Command failed");
    }
    let presentation = present(command, &result);
    sink.show(presentation.sink, &presentation.text);
    presentation
}
