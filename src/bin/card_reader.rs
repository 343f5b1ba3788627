// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Card reader client.
//!
//! Reads card ids from stdin, one per line, and posts each as a punch
//! stamped with the reader's local time. `quit` or Ctrl-C stops the loop.
//!
//! Environment:
//! - `API_ENDPOINT` - server base URL, e.g. `https://attendance.example.com`
//! - `READER_TOKEN` - access token carrying `post:attendance`

use std::{error::Error, time::Duration};

use attendance_server::{config::LogFormat, models::RecordPunchRequest, telemetry::init_tracing};
use chrono::{Local, NaiveDateTime};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

const API_ENDPOINT_ENV: &str = "API_ENDPOINT";
const READER_TOKEN_ENV: &str = "READER_TOKEN";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, PartialEq, Eq)]
enum Input {
    Quit,
    Blank,
    Card(i64),
    Invalid(String),
}

fn parse_line(line: &str) -> Input {
    let line = line.trim();
    if line.is_empty() {
        Input::Blank
    } else if line.eq_ignore_ascii_case("quit") {
        Input::Quit
    } else {
        match line.parse::<i64>() {
            Ok(id) if id > 0 => Input::Card(id),
            _ => Input::Invalid(line.to_string()),
        }
    }
}

fn punch_url(endpoint: &str) -> String {
    format!("{}/v1/attendance", endpoint.trim_end_matches('/'))
}

fn punch_request(user_id: i64, read_at: NaiveDateTime) -> RecordPunchRequest {
    RecordPunchRequest {
        user_id,
        timestamp: Some(read_at.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()),
    }
}

struct Reader {
    client: reqwest::Client,
    url: String,
    token: String,
}

impl Reader {
    fn from_env() -> Result<Self, Box<dyn Error>> {
        let endpoint = std::env::var(API_ENDPOINT_ENV)
            .map_err(|_| format!("missing required environment variable {API_ENDPOINT_ENV}"))?;
        let token = std::env::var(READER_TOKEN_ENV)
            .map_err(|_| format!("missing required environment variable {READER_TOKEN_ENV}"))?;
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            url: punch_url(&endpoint),
            token,
        })
    }

    async fn send(&self, user_id: i64) {
        let read_at = Local::now().naive_local();
        tracing::info!(user_id, %read_at, "Card read");

        let result = self
            .client
            .post(&self.url)
            .bearer_auth(&self.token)
            .json(&punch_request(user_id, read_at))
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                tracing::info!(user_id, status = %response.status(), "Punch recorded");
            }
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                tracing::warn!(user_id, %status, %body, "Server rejected punch");
            }
            Err(e) => {
                tracing::error!(user_id, error = %e, "Failed to send punch");
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_tracing(LogFormat::Pretty)?;
    let reader = Reader::from_env()?;
    tracing::info!(url = %reader.url, "Card reader started");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"ID Card: ").await?;
        stdout.flush().await?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                break;
            }
        };
        let Some(line) = line else { break };

        match parse_line(&line) {
            Input::Quit => break,
            Input::Blank => {}
            Input::Card(user_id) => reader.send(user_id).await,
            Input::Invalid(raw) => tracing::warn!(input = %raw, "Ignoring unreadable card id"),
        }
    }

    tracing::info!("Card reader stopped");
    Ok(())
}
