use std::time::{Duration, Instant};

use rand::Rng;

pub const FACT_PERIOD: Duration = Duration::from_secs(3);
pub const FADE_IN: Duration = Duration::from_millis(400);

pub const FACTS: [&str; 10] = [
    "Alan Shearer holds the Premier League record with 260 goals.",
    "Arsenal went the whole 2003-04 league season unbeaten.",
    "Manchester City reached 100 points in the 2017-18 season.",
    "Gareth Barry made 653 Premier League appearances.",
    "Ryan Giggs won 13 Premier League titles with Manchester United.",
    "Sadio Mane scored a hat-trick in 2 minutes 56 seconds in 2015.",
    "Petr Cech kept 202 Premier League clean sheets.",
    "Leicester City won the 2015-16 title after 5000-1 pre-season odds.",
    "Frank Lampard scored 177 Premier League goals from midfield.",
    "The first Premier League goal was scored by Brian Deane in 1992.",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeStage {
    Entering,
    Shown,
}

#[derive(Debug, Clone)]
pub struct FactTicker {
    current: usize,
    period: Duration,
    last_rotation: Instant,
}

impl FactTicker {
    /// Starts with a fact already showing; the first rotation comes one period later.
    pub fn start<R: Rng + ?Sized>(now: Instant, period: Duration, rng: &mut R) -> Self {
        Self {
            current: rng.gen_range(0..FACTS.len()),
            period,
            last_rotation: now,
        }
    }

    pub fn current(&self) -> &'static str {
        FACTS[self.current]
    }

    pub fn index(&self) -> usize {
        self.current
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Returns true when a new fact was swapped in.
    pub fn tick<R: Rng + ?Sized>(&mut self, now: Instant, rng: &mut R) -> bool {
        if now.saturating_duration_since(self.last_rotation) < self.period {
            return false;
        }
        // Skip over the current index so the same fact never shows twice in a row.
        let offset = rng.gen_range(1..FACTS.len());
        self.current = (self.current + offset) % FACTS.len();
        self.last_rotation = now;
        true
    }

    pub fn fade(&self, now: Instant) -> FadeStage {
        if now.saturating_duration_since(self.last_rotation) < FADE_IN {
            FadeStage::Entering
        } else {
            FadeStage::Shown
        }
    }
}
