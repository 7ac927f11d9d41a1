use std::collections::VecDeque;
use std::time::Instant;

use rand::Rng;

use crate::answer::{self, AnswerView};
use crate::config::AskConfig;
use crate::facts::FactTicker;

const MAX_LOGS: usize = 200;
pub const ERROR_PREFIX: &str = "Error: ";

pub type RequestId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Rendered,
    Errored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Settled(Outcome),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub id: RequestId,
    pub question: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AskCommand {
    Submit { id: RequestId, question: String },
}

impl From<Submission> for AskCommand {
    fn from(sub: Submission) -> Self {
        AskCommand::Submit {
            id: sub.id,
            question: sub.question,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delta {
    AnswerReady { id: RequestId, answer: String },
    AskFailed { id: RequestId, message: String },
    Log(String),
}

#[derive(Debug)]
pub struct AppState {
    pub input: String,
    pub phase: Phase,
    pub answer: AnswerView,
    pub last_question: Option<String>,
    pub ticker: Option<FactTicker>,
    pub active_request: Option<RequestId>,
    pub answer_scroll: u16,
    pub help_overlay: bool,
    pub logs: VecDeque<String>,
    pub config: AskConfig,
    next_request: RequestId,
}

impl AppState {
    pub fn new(config: AskConfig) -> Self {
        Self {
            input: String::new(),
            phase: Phase::Idle,
            answer: AnswerView::new(),
            last_question: None,
            ticker: None,
            active_request: None,
            answer_scroll: 0,
            help_overlay: false,
            logs: VecDeque::new(),
            config,
            next_request: 1,
        }
    }

    pub fn loading_visible(&self) -> bool {
        self.phase == Phase::Loading
    }

    pub fn answer_visible(&self) -> bool {
        matches!(self.phase, Phase::Settled(_))
    }

    pub fn fact(&self) -> Option<&'static str> {
        if !self.loading_visible() {
            return None;
        }
        self.ticker.as_ref().map(FactTicker::current)
    }

    /// Validate the typed question and move into `Loading`.
    ///
    /// Returns `None` for blank input, in which case nothing at all changes. Otherwise the
    /// caller owns the returned submission and must dispatch exactly one request for it.
    /// A submission made while another is in flight supersedes it: the older id stops
    /// being active and its late result is dropped in [`apply_delta`].
    pub fn begin_submission<R: Rng + ?Sized>(
        &mut self,
        now: Instant,
        rng: &mut R,
    ) -> Option<Submission> {
        let question = self.input.trim();
        if question.is_empty() {
            return None;
        }
        let question = question.to_string();

        let id = self.next_request;
        self.next_request += 1;
        if let Some(prev) = self.active_request.replace(id) {
            tracing::info!(superseded = prev, id, "replacing in-flight question");
            self.push_log(format!("[INFO] Question #{prev} superseded by #{id}"));
        }

        self.phase = Phase::Loading;
        self.answer_scroll = 0;
        self.ticker = if self.config.fact_ticker {
            Some(FactTicker::start(now, self.config.fact_period, rng))
        } else {
            None
        };
        self.last_question = Some(question.clone());
        tracing::info!(id, question = %question, "question submitted");
        Some(Submission { id, question })
    }

    pub fn tick<R: Rng + ?Sized>(&mut self, now: Instant, rng: &mut R) -> bool {
        if !self.loading_visible() {
            return false;
        }
        self.ticker
            .as_mut()
            .map(|ticker| ticker.tick(now, rng))
            .unwrap_or(false)
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    /// Offsets count cards when the answer has any, logical text lines otherwise.
    pub fn max_answer_scroll(&self) -> u16 {
        let cards = self.answer.cards().count();
        let rows = if cards > 0 {
            cards
        } else {
            self.answer.plain_text().lines().count()
        };
        u16::try_from(rows.saturating_sub(1)).unwrap_or(u16::MAX)
    }

    pub fn scroll_answer(&mut self, delta: i32) {
        let max = i32::from(self.max_answer_scroll());
        let next = i32::from(self.answer_scroll).saturating_add(delta);
        self.answer_scroll = u16::try_from(next.clamp(0, max)).unwrap_or(0);
    }

    /// The result channel closed: no answer can arrive for the active request anymore.
    pub fn worker_disconnected(&mut self) {
        if let Some(id) = self.active_request {
            apply_delta(
                self,
                Delta::AskFailed {
                    id,
                    message: "request worker unavailable".to_string(),
                },
            );
        }
    }

    fn show_answer(&mut self, answer: &str) {
        if self.config.structured_render {
            answer::render(answer, &mut self.answer);
        } else {
            answer::render_text(answer, &mut self.answer);
        }
    }

    fn show_error(&mut self, message: &str) {
        self.answer.set_text(&format!("{ERROR_PREFIX}{message}"));
    }

    fn settle(&mut self, outcome: Outcome) {
        self.active_request = None;
        self.ticker = None;
        self.phase = Phase::Settled(outcome);
        self.answer_scroll = self.answer_scroll.min(self.max_answer_scroll());
    }

    fn is_active(&self, id: RequestId) -> bool {
        self.active_request == Some(id)
    }
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::AnswerReady { id, answer } => {
            if !state.is_active(id) {
                state.push_log(format!("[INFO] Dropped stale answer for question #{id}"));
                return;
            }
            state.show_answer(&answer);
            let cards = state.answer.cards().count();
            if cards > 0 {
                state.push_log(format!("[INFO] Answer #{id}: {cards} player cards"));
            } else {
                state.push_log(format!("[INFO] Answer #{id} received"));
            }
            tracing::info!(id, cards, "answer rendered");
            state.settle(Outcome::Rendered);
        }
        Delta::AskFailed { id, message } => {
            if !state.is_active(id) {
                state.push_log(format!("[INFO] Dropped stale failure for question #{id}"));
                return;
            }
            state.show_error(&message);
            state.push_log(format!("[WARN] Question #{id} failed: {message}"));
            tracing::warn!(id, error = %message, "question failed");
            state.settle(Outcome::Errored);
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}
