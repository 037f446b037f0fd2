//! End-to-end command dispatch into a recording sink.

mod common;

use serde_json::json;
use shelfdesk_core::harness::{BOOK_DEACTIVATED, LOGGED_OUT, LOGIN_FAILED, LOGIN_OK, LOGIN_REQUIRED};
use shelfdesk_core::models::BookFields;
use shelfdesk_core::{dispatch, Command, Credentials, DisplaySink, SessionClient, SinkId};

use common::{StubResponse, StubServer};

#[derive(Default)]
struct RecordingSink {
    shown: Vec<(SinkId, String)>,
}

impl DisplaySink for RecordingSink {
    fn show(&mut self, sink: SinkId, text: &str) {
        self.shown.push((sink, text.to_string()));
    }
}

impl RecordingSink {
    fn last(&self) -> (SinkId, &str) {
        let (sink, text) = self.shown.last().expect("nothing was shown");
        (*sink, text.as_str())
    }
}

fn login() -> Command {
    Command::Login(Credentials::new("a@b.com", "pw"))
}

#[tokio::test]
async fn login_then_list_books_uses_returned_token() {
    let server = StubServer::start(vec![
        StubResponse::json(200, json!({"access": "T1"})),
        StubResponse::json(200, json!([{"id": 1, "titulo": "Iracema"}])),
    ])
    .await;
    let client = SessionClient::new(server.base_url.clone()).unwrap();
    let mut sink = RecordingSink::default();

    dispatch(&client, &login(), &mut sink).await;
    assert_eq!(sink.last(), (SinkId::TokenStatus, LOGIN_OK));

    dispatch(&client, &Command::ListBooks, &mut sink).await;
    let (target, text) = sink.last();
    assert_eq!(target, SinkId::Books);
    assert_eq!(
        text,
        "[\n  {\n    \"id\": 1,\n    \"titulo\": \"Iracema\"\n  }\n]"
    );

    let requests = server.finish().await;
    assert_eq!(requests[1].header("authorization"), Some("Bearer T1"));
}

#[tokio::test]
async fn failed_login_reports_failure() {
    let server = StubServer::start(vec![StubResponse::json(
        401,
        json!({"detail": "No active account found with the given credentials"}),
    )])
    .await;
    let client = SessionClient::new(server.base_url.clone()).unwrap();
    let mut sink = RecordingSink::default();

    dispatch(&client, &login(), &mut sink).await;
    assert_eq!(sink.last(), (SinkId::TokenStatus, LOGIN_FAILED));
    assert!(!client.is_authenticated().await);
    server.finish().await;
}

#[tokio::test]
async fn commands_before_login_prompt_for_login() {
    // Nothing is served: any request that went out would fail as a network error
    let client = SessionClient::new("http://127.0.0.1:9/api").unwrap();
    let mut sink = RecordingSink::default();

    let commands = [
        Command::ListBooks,
        Command::CreateBook(BookFields::default()),
        Command::DeactivateBook { id: "5".into() },
        Command::CreateReservation { book_id: "1".into() },
        Command::ConfirmReservation { reservation_id: "1".into() },
        Command::ReturnLoan { loan_id: "1".into() },
        Command::Dashboard { period: String::new() },
        Command::DueReminders,
        Command::ExpiringReservations,
    ];
    for command in &commands {
        dispatch(&client, command, &mut sink).await;
        assert_eq!(sink.last(), (SinkId::Alert, LOGIN_REQUIRED), "{}", command.name());
    }
}

#[tokio::test]
async fn deactivate_with_no_content_shows_fixed_message() {
    let server = StubServer::start(vec![
        StubResponse::json(200, json!({"access": "T1"})),
        StubResponse::no_content(),
    ])
    .await;
    let client = SessionClient::new(server.base_url.clone()).unwrap();
    let mut sink = RecordingSink::default();

    dispatch(&client, &login(), &mut sink).await;
    dispatch(&client, &Command::DeactivateBook { id: "5".into() }, &mut sink).await;
    assert_eq!(sink.last(), (SinkId::Books, BOOK_DEACTIVATED));

    let requests = server.finish().await;
    assert_eq!(requests[1].path, "/api/livros/5/");
}

#[tokio::test]
async fn deactivate_failure_shows_error_body() {
    let server = StubServer::start(vec![
        StubResponse::json(200, json!({"access": "T1"})),
        StubResponse::json(403, json!({"detail": "Você não tem permissão para executar essa ação."})),
    ])
    .await;
    let client = SessionClient::new(server.base_url.clone()).unwrap();
    let mut sink = RecordingSink::default();

    dispatch(&client, &login(), &mut sink).await;
    dispatch(&client, &Command::DeactivateBook { id: "5".into() }, &mut sink).await;
    let (target, text) = sink.last();
    assert_eq!(target, SinkId::Books);
    assert!(text.contains("não tem permissão"));
    assert_ne!(text, BOOK_DEACTIVATED);
    server.finish().await;
}

#[tokio::test]
async fn return_loan_surfaces_as_alert() {
    let server = StubServer::start(vec![
        StubResponse::json(200, json!({"access": "T1"})),
        StubResponse::json(404, json!({"erro": "Empréstimo não encontrado."})),
    ])
    .await;
    let client = SessionClient::new(server.base_url.clone()).unwrap();
    let mut sink = RecordingSink::default();

    dispatch(&client, &login(), &mut sink).await;
    dispatch(&client, &Command::ReturnLoan { loan_id: "123".into() }, &mut sink).await;
    let (target, text) = sink.last();
    assert_eq!(target, SinkId::Alert);
    assert!(text.contains("Empréstimo não encontrado."));
    server.finish().await;
}

#[tokio::test]
async fn logout_clears_credential() {
    let server = StubServer::start(vec![StubResponse::json(200, json!({"access": "T1"}))]).await;
    let client = SessionClient::new(server.base_url.clone()).unwrap();
    let mut sink = RecordingSink::default();

    dispatch(&client, &login(), &mut sink).await;
    server.finish().await;

    dispatch(&client, &Command::Logout, &mut sink).await;
    assert_eq!(sink.last(), (SinkId::TokenStatus, LOGGED_OUT));

    dispatch(&client, &Command::ListLoans, &mut sink).await;
    assert_eq!(sink.last(), (SinkId::Alert, LOGIN_REQUIRED));
}
