use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;

use crate::answer::{AnswerNode, AnswerView, Inline, PlayerRecord};

const CACHE_DIR: &str = "squad_terminal";
const EXPORT_FILE: &str = "answer.html";

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Markup for the answer body. Every piece of answer text goes through [`escape_html`];
/// the only tags emitted are the ones produced here.
pub fn answer_to_html(view: &AnswerView) -> String {
    let mut out = String::new();
    for node in view.nodes() {
        match node {
            AnswerNode::Paragraph(inlines) => {
                out.push_str("<p>");
                out.push_str(&inlines_to_html(inlines));
                out.push_str("</p>\n");
            }
            AnswerNode::Card(card) => out.push_str(&card_to_html(card)),
        }
    }
    out
}

pub fn inlines_to_html(inlines: &[Inline]) -> String {
    let mut out = String::new();
    for inline in inlines {
        match inline {
            Inline::Text(text) => out.push_str(&escape_html(text)),
            Inline::Strong(text) => {
                out.push_str("<strong>");
                out.push_str(&escape_html(text));
                out.push_str("</strong>");
            }
            Inline::Break => out.push_str("<br>"),
        }
    }
    out
}

fn card_to_html(card: &PlayerRecord) -> String {
    let mut out = String::from("<div class=\"player-card\">\n");
    out.push_str(&format!("  <h3>{}</h3>\n", escape_html(&card.name)));
    for (label, value) in &card.details {
        if label.is_empty() {
            out.push_str(&format!("  <p>{}</p>\n", escape_html(value)));
        } else {
            out.push_str(&format!(
                "  <p><strong>{}:</strong> {}</p>\n",
                escape_html(label),
                escape_html(value)
            ));
        }
    }
    out.push_str("</div>\n");
    out
}

pub fn answer_document(question: &str, view: &AnswerView) -> String {
    let generated = Utc::now().format("%Y-%m-%d %H:%M UTC");
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n</head>\n<body>\n<h2>{title}</h2>\n<p class=\"generated\">{generated}</p>\n<div id=\"answer-text\">\n{body}</div>\n</body>\n</html>\n",
        title = escape_html(question),
        body = answer_to_html(view),
    )
}

pub fn write_answer_document(path: &Path, question: &str, view: &AnswerView) -> Result<()> {
    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
    {
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }
    let tmp = path.with_extension("html.tmp");
    fs::write(&tmp, answer_document(question, view)).context("write answer export")?;
    fs::rename(&tmp, path).context("swap answer export")?;
    Ok(())
}

pub fn export_path() -> Option<PathBuf> {
    cache_dir().map(|dir| dir.join(EXPORT_FILE))
}

pub fn cache_dir() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(CACHE_DIR));
        }
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(CACHE_DIR))
}
