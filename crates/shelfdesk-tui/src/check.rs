//! Non-interactive smoke run: log in once, then run the read-only commands
//! and print every result to stdout.

use std::io::{self, BufRead, Write};

use anyhow::{bail, Result};
use tracing::info;

use shelfdesk_core::{dispatch, Command, Config, Credentials, DisplaySink, SessionClient, SinkId};

/// Prints each presentation under a header naming its sink.
struct StdoutSink;

impl DisplaySink for StdoutSink {
    fn show(&mut self, sink: SinkId, text: &str) {
        println!("== {} ==", sink.title());
        println!("{}\n", text);
    }
}

/// Commands run after login, in order
fn read_only_commands() -> Vec<Command> {
    vec![
        Command::WhoAmI,
        Command::ListBooks,
        Command::ListReservations,
        Command::ListLoans,
        Command::Dashboard {
            period: String::new(),
        },
        Command::PublicAlerts,
    ]
}

fn prompt_email(default: Option<&str>) -> Result<String> {
    match default {
        Some(email) => eprint!("Email [{}]: ", email),
        None => eprint!("Email: "),
    }
    io::stderr().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let line = line.trim();

    Ok(if line.is_empty() {
        default.unwrap_or_default().to_string()
    } else {
        line.to_string()
    })
}

pub async fn run(config: Config) -> Result<()> {
    let client = SessionClient::from_config(&config)?;
    eprintln!("Checking {}", client.base_url());

    let default_email = std::env::var("SHELFDESK_EMAIL")
        .ok()
        .or_else(|| config.last_email.clone());
    let email = prompt_email(default_email.as_deref())?;
    let password = match std::env::var("SHELFDESK_PASSWORD") {
        Ok(password) => password,
        Err(_) => rpassword::prompt_password("Password: ")?,
    };

    let mut sink = StdoutSink;
    dispatch(&client, &Command::Login(Credentials::new(email, password)), &mut sink).await;
    if !client.is_authenticated().await {
        bail!("Login failed against {}", client.base_url());
    }

    for command in read_only_commands() {
        info!(command = command.name(), "Running check");
        dispatch(&client, &command, &mut sink).await;
    }

    Ok(())
}
