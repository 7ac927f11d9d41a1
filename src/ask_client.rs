use anyhow::{Context, Result, anyhow};
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use crate::config::AskConfig;
use crate::http_client::http_client;

/// User-facing message for any non-success status. The status itself only goes to the log.
pub const HTTP_FAILURE_MESSAGE: &str = "Something went wrong";

#[derive(Debug, Serialize)]
struct AskRequest<'a> {
    question: &'a str,
}

#[derive(Debug, Deserialize)]
struct AskResponse {
    answer: String,
}

/// One question in, one answer out. Implementations must be callable from worker threads.
pub trait AskTransport: Send + Sync {
    fn ask(&self, question: &str) -> Result<String>;
}

pub fn encode_ask_request(question: &str) -> Result<String> {
    serde_json::to_string(&AskRequest { question }).context("encode ask request")
}

pub fn parse_ask_response_json(raw: &str) -> Result<String> {
    let resp: AskResponse = serde_json::from_str(raw).context("invalid answer payload")?;
    Ok(resp.answer)
}

#[derive(Debug, Clone)]
pub struct HttpAskClient {
    url: String,
    client: Client,
}

impl HttpAskClient {
    pub fn from_config(cfg: &AskConfig) -> Result<Self> {
        let client = http_client(cfg.request_timeout)?.clone();
        Ok(Self::with_client(cfg.ask_url(), client))
    }

    pub fn with_client(url: impl Into<String>, client: Client) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl AskTransport for HttpAskClient {
    fn ask(&self, question: &str) -> Result<String> {
        let body = encode_ask_request(question)?;
        let resp = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .body(body)
            .send()
            .context("request failed")?;

        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(%status, url = %self.url, "ask endpoint returned failure status");
            return Err(anyhow!(HTTP_FAILURE_MESSAGE));
        }

        let raw = resp.text().context("failed reading body")?;
        parse_ask_response_json(&raw)
    }
}
