use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Instant;

use anyhow::{Context, Result, bail};

use squad_terminal::ask_client::HttpAskClient;
use squad_terminal::config::{self, AskConfig};
use squad_terminal::html;
use squad_terminal::state::{AppState, Outcome, Phase, apply_delta};
use squad_terminal::{telemetry, worker};

const USAGE: &str = "usage: ask [--base-url URL] [--html PATH] [--plain] <question...>";

#[derive(Debug, Default)]
struct CliArgs {
    base_url: Option<String>,
    html: Option<PathBuf>,
    plain: bool,
    question: Vec<String>,
}

fn main() -> Result<()> {
    config::load_dotenv();
    telemetry::init_stderr_tracing();

    let args = parse_args(std::env::args().skip(1).collect())?;
    let mut cfg = AskConfig::from_env();
    cfg.fact_ticker = false;
    if let Some(url) = args.base_url {
        cfg.base_url = url.trim_end_matches('/').to_string();
    }
    if args.plain {
        cfg.structured_render = false;
    }

    let client = HttpAskClient::from_config(&cfg)?;
    let mut state = AppState::new(cfg);
    state.input = args.question.join(" ");
    let Some(submission) = state.begin_submission(Instant::now(), &mut rand::thread_rng()) else {
        bail!("{USAGE}");
    };

    let (tx, rx) = mpsc::channel();
    worker::run_request(&tx, &client, submission.id, &submission.question);
    let delta = rx.recv().context("request produced no result")?;
    apply_delta(&mut state, delta);

    if state.phase == Phase::Settled(Outcome::Errored) {
        eprintln!("{}", state.answer.plain_text());
        std::process::exit(1);
    }

    match args.html {
        Some(path) => {
            html::write_answer_document(&path, &submission.question, &state.answer)?;
            println!("Wrote {}", path.display());
        }
        None => println!("{}", state.answer.plain_text()),
    }
    Ok(())
}

fn parse_args(args: Vec<String>) -> Result<CliArgs> {
    let mut out = CliArgs::default();
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        if let Some(url) = arg.strip_prefix("--base-url=") {
            out.base_url = Some(url.to_string());
        } else if arg == "--base-url" {
            out.base_url = Some(iter.next().context("--base-url needs a value")?);
        } else if let Some(path) = arg.strip_prefix("--html=") {
            out.html = Some(PathBuf::from(path));
        } else if arg == "--html" {
            out.html = Some(PathBuf::from(iter.next().context("--html needs a path")?));
        } else if arg == "--plain" {
            out.plain = true;
        } else if arg == "-h" || arg == "--help" {
            println!("{USAGE}");
            std::process::exit(0);
        } else {
            out.question.push(arg);
        }
    }
    Ok(out)
}
