use std::path::PathBuf;
use std::time::Duration;

use crate::html;

pub const ASK_PATH: &str = "/api/ask";
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_FACT_SECS: u64 = 3;
const LOG_FILE: &str = "squad_terminal.log";

/// Feature presets matching the three historical front-ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Plain,
    Structured,
    Ticker,
}

impl Variant {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "plain" | "basic" => Some(Variant::Plain),
            "structured" | "squad" => Some(Variant::Structured),
            "ticker" | "facts" | "full" => Some(Variant::Ticker),
            _ => None,
        }
    }

    pub fn structured_render(self) -> bool {
        !matches!(self, Variant::Plain)
    }

    pub fn fact_ticker(self) -> bool {
        matches!(self, Variant::Ticker)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AskConfig {
    pub base_url: String,
    pub structured_render: bool,
    pub fact_ticker: bool,
    pub fact_period: Duration,
    pub request_timeout: Option<Duration>,
    pub log_file: Option<PathBuf>,
}

impl Default for AskConfig {
    fn default() -> Self {
        Self::for_variant(Variant::Ticker)
    }
}

impl AskConfig {
    pub fn for_variant(variant: Variant) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            structured_render: variant.structured_render(),
            fact_ticker: variant.fact_ticker(),
            fact_period: Duration::from_secs(DEFAULT_FACT_SECS),
            request_timeout: None,
            log_file: None,
        }
    }

    pub fn from_env() -> Self {
        let mut cfg = Self::from_lookup(|key| std::env::var(key).ok());
        if cfg.log_file.is_none() {
            cfg.log_file = html::cache_dir().map(|dir| dir.join(LOG_FILE));
        }
        cfg
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let variant = lookup("SQUAD_VARIANT")
            .and_then(|val| Variant::parse(&val))
            .unwrap_or(Variant::Ticker);
        let mut cfg = Self::for_variant(variant);

        if let Some(url) = lookup("SQUAD_BASE_URL").and_then(|val| non_empty(&val)) {
            cfg.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(flag) = lookup("SQUAD_STRUCTURED").and_then(|val| parse_bool(&val)) {
            cfg.structured_render = flag;
        }
        if let Some(flag) = lookup("SQUAD_FACT_TICKER").and_then(|val| parse_bool(&val)) {
            cfg.fact_ticker = flag;
        }
        let fact_secs = lookup("SQUAD_FACT_SECS")
            .and_then(|val| val.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_FACT_SECS)
            .max(1);
        cfg.fact_period = Duration::from_secs(fact_secs);
        cfg.request_timeout = lookup("SQUAD_TIMEOUT_SECS")
            .and_then(|val| val.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);
        cfg.log_file = lookup("SQUAD_LOG_FILE")
            .and_then(|val| non_empty(&val))
            .map(PathBuf::from);
        cfg
    }

    pub fn ask_url(&self) -> String {
        format!("{}{ASK_PATH}", self.base_url.trim_end_matches('/'))
    }
}

pub fn load_dotenv() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
