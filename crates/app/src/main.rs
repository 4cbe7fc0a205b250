use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use drift_core::exam::{ExamPhase, ExamSnapshot, FailureReason, ProgressMark};
use drift_core::model::{TopicId, VehicleId};
use drift_core::time::format_clock;
use services::{
    Clock, ExamHandle, ExamLoopService, ExamSelection, ExamServiceError, ExamTiming,
    HttpQuestionBank, QuestionBankConfig, TracingResultsSink,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingVehicle,
    MissingTopics,
    UnknownArg(String),
    InvalidVehicle { raw: String },
    InvalidTopics { raw: String },
    InvalidApiUrl { raw: String },
    InvalidFlag { flag: &'static str, raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingVehicle => write!(f, "a vehicle is required (--vehicle)"),
            ArgsError::MissingTopics => {
                write!(f, "Please select at least one topic before starting the exam.")
            }
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidVehicle { raw } => write!(f, "invalid vehicle id: {raw:?}"),
            ArgsError::InvalidTopics { raw } => write!(f, "invalid topic list: {raw:?}"),
            ArgsError::InvalidApiUrl { raw } => write!(f, "invalid --api value: {raw}"),
            ArgsError::InvalidFlag { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- --vehicle <id> --topics <id,id,...> [--api <url>] [--auto-advance]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --api https://avtoskola-drift.vercel.app/api");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  DRIFT_API_BASE_URL, DRIFT_VEHICLE_ID, DRIFT_TOPIC_IDS, DRIFT_AUTO_ADVANCE, RUST_LOG");
    eprintln!();
    eprintln!("During the exam:");
    eprintln!("  <n>      answer with option n");
    eprintln!("  n / p    next / previous question");
    eprintln!("  g <n>    jump to question n");
    eprintln!("  v <n>    review answered question n");
    eprintln!("  d        move the current question to the end");
    eprintln!("  a        toggle auto-advance");
    eprintln!("  t        finish the exam now");
    eprintln!("  r / R    retake with the same / new questions");
    eprintln!("  s        show the current question");
    eprintln!("  q        quit");
}

#[derive(Debug)]
struct Args {
    api_base_url: String,
    vehicle: VehicleId,
    topics: Vec<TopicId>,
    auto_advance: bool,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        Self::parse_with_env(args, |key| std::env::var(key).ok())
    }

    /// Parses flags on top of `DRIFT_*` defaults read through `env`. A default
    /// that is set but invalid is an error even if a flag would override it.
    fn parse_with_env(
        args: &mut impl Iterator<Item = String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ArgsError> {
        let mut api_base_url = env("DRIFT_API_BASE_URL")
            .filter(|value| !value.trim().is_empty())
            .map_or_else(|| QuestionBankConfig::default().base_url, |value| value.trim().to_string());
        let mut vehicle = env("DRIFT_VEHICLE_ID")
            .map(|value| {
                value
                    .parse::<VehicleId>()
                    .map_err(|_| ArgsError::InvalidVehicle { raw: value.clone() })
            })
            .transpose()?;
        let mut topics = env("DRIFT_TOPIC_IDS")
            .map(|value| parse_topics(&value))
            .transpose()?
            .unwrap_or_default();
        let mut auto_advance = env("DRIFT_AUTO_ADVANCE")
            .map(|value| {
                parse_flag(&value).ok_or(ArgsError::InvalidFlag {
                    flag: "DRIFT_AUTO_ADVANCE",
                    raw: value.clone(),
                })
            })
            .transpose()?
            .unwrap_or(false);

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--vehicle" => {
                    let value = require_value(args, "--vehicle")?;
                    let parsed = value
                        .parse::<VehicleId>()
                        .map_err(|_| ArgsError::InvalidVehicle { raw: value.clone() })?;
                    vehicle = Some(parsed);
                }
                "--topics" => {
                    let value = require_value(args, "--topics")?;
                    topics = parse_topics(&value)?;
                }
                "--api" => {
                    let value = require_value(args, "--api")?;
                    let trimmed = value.trim();
                    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
                        return Err(ArgsError::InvalidApiUrl { raw: value });
                    }
                    api_base_url = trimmed.to_string();
                }
                "--auto-advance" => auto_advance = true,
                "--no-auto-advance" => auto_advance = false,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let vehicle = vehicle.ok_or(ArgsError::MissingVehicle)?;
        if topics.is_empty() {
            return Err(ArgsError::MissingTopics);
        }

        Ok(Self {
            api_base_url,
            vehicle,
            topics,
            auto_advance,
        })
    }
}

fn parse_topics(raw: &str) -> Result<Vec<TopicId>, ArgsError> {
    let invalid = || ArgsError::InvalidTopics { raw: raw.to_string() };
    if raw.trim().is_empty() {
        return Err(invalid());
    }
    raw.split(',')
        .filter(|part| !part.trim().is_empty())
        .map(|part| part.parse::<TopicId>().map_err(|_| invalid()))
        .collect::<Result<Vec<_>, _>>()
        .and_then(|topics| if topics.is_empty() { Err(invalid()) } else { Ok(topics) })
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

//
// ─── EXAM INPUT ────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    Answer(usize),
    Next,
    Prev,
    Jump(usize),
    Review(usize),
    Defer,
    ToggleAutoAdvance,
    Terminate,
    RestartSame,
    RestartNew,
    Show,
    Quit,
}

impl Input {
    fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let head = parts.next().unwrap_or("s");
        let number = |parts: &mut std::str::SplitWhitespace<'_>| {
            parts
                .next()
                .and_then(|value| value.parse::<usize>().ok())
                .filter(|n| *n > 0)
        };
        match head {
            "n" => Some(Self::Next),
            "p" => Some(Self::Prev),
            "g" => number(&mut parts).map(Self::Jump),
            "v" => number(&mut parts).map(Self::Review),
            "d" => Some(Self::Defer),
            "a" => Some(Self::ToggleAutoAdvance),
            "t" => Some(Self::Terminate),
            "r" => Some(Self::RestartSame),
            "R" => Some(Self::RestartNew),
            "s" => Some(Self::Show),
            "q" => Some(Self::Quit),
            other => other
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .map(Self::Answer),
        }
    }
}

//
// ─── RENDERING ─────────────────────────────────────────────────────────────────
//

fn progress_bar(marks: &[ProgressMark]) -> String {
    marks
        .iter()
        .map(|mark| match mark {
            ProgressMark::Correct => '+',
            ProgressMark::Wrong => 'x',
            ProgressMark::Current => '>',
            ProgressMark::Unanswered => '.',
        })
        .collect()
}

fn result_message(snapshot: &ExamSnapshot) -> Option<&'static str> {
    match (snapshot.phase, snapshot.failure_reason) {
        (ExamPhase::InProgress, _) => None,
        (ExamPhase::CompletedPassed, _) => Some("Congratulations, you passed the exam!"),
        (ExamPhase::TerminatedByUser, _) => Some("Exam finished early."),
        (ExamPhase::CompletedFailed, Some(FailureReason::TimeExpired)) => {
            Some("Time is up. You did not pass the exam.")
        }
        (ExamPhase::CompletedFailed, Some(FailureReason::FinalScore)) => {
            Some("Exam complete. You did not reach the passing score.")
        }
        (ExamPhase::CompletedFailed, _) => Some("Too many wrong answers. You did not pass the exam."),
    }
}

fn render(exam: &ExamHandle) {
    let snapshot = exam.snapshot();
    println!();
    println!(
        "Question {}/{}   Time {}   Wrong {}/{}{}",
        snapshot.position(),
        snapshot.total,
        format_clock(snapshot.time_remaining_secs),
        snapshot.wrong,
        snapshot.max_wrong_allowed,
        if snapshot.auto_advance { "   [auto]" } else { "" }
    );
    println!("[{}]", progress_bar(&exam.progress_marks()));

    if let Some(message) = result_message(&snapshot) {
        println!();
        println!("{message}");
        println!(
            "Correct {}  Wrong {}  Unanswered {}",
            snapshot.correct,
            snapshot.wrong,
            snapshot.total - snapshot.answered
        );
        println!("Retake with r (same questions) or R (new questions), or q to quit.");
        return;
    }

    let Some(question) = snapshot.current_question.as_ref() else {
        return;
    };
    println!();
    println!("{}", question.title());
    if let Some(image) = question.image() {
        println!("  image: {image}");
    }
    for (number, option) in question.options().iter().enumerate() {
        let chosen = snapshot.current_answer.as_deref() == Some(option.as_str());
        let marker = match (chosen, question.is_correct(option)) {
            (true, true) => "+",
            (true, false) => "x",
            (false, true) if snapshot.current_answer.is_some() => "*",
            _ => " ",
        };
        println!(" {marker} {}. {option}", number + 1);
    }
}

fn render_review(exam: &ExamHandle, index: usize) {
    match exam.review(index) {
        Some(review) => {
            println!();
            println!("#{} {}", review.index + 1, review.question.title());
            println!("  your answer:    {}", review.user_answer);
            println!("  correct answer: {}", review.correct_answer());
        }
        None => println!("Question {} has not been answered.", index + 1),
    }
}

//
// ─── DRIVER ────────────────────────────────────────────────────────────────────
//

fn start_failed(err: ExamServiceError) -> Box<dyn std::error::Error> {
    warn!(error = %err, "could not start exam");
    err.user_message().into()
}

async fn drive(service: &ExamLoopService, mut exam: ExamHandle) -> Result<(), Box<dyn std::error::Error>> {
    let settle = ExamTiming::default().auto_advance_delay + Duration::from_millis(50);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut watch = tokio::time::interval(Duration::from_secs(1));
    let mut announced = false;

    render(&exam);
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = watch.tick() => {
                let finished = exam.snapshot().is_finished();
                if finished && !announced {
                    render(&exam);
                }
                announced = finished;
                continue;
            }
        };
        let Some(line) = line else {
            break;
        };
        let Some(input) = Input::parse(&line) else {
            println!("Unrecognised input. Use -h for the list of commands.");
            continue;
        };

        match input {
            Input::Answer(number) => {
                let option = exam.read(|session| {
                    session
                        .current_question()
                        .and_then(|question| question.options().get(number - 1).cloned())
                });
                let Some(option) = option else {
                    println!("There is no option {number}.");
                    continue;
                };
                exam.submit_answer(&option).await;
                if exam.snapshot().auto_advance {
                    tokio::time::sleep(settle).await;
                }
            }
            Input::Next => {
                exam.go_next().await;
            }
            Input::Prev => {
                exam.go_prev().await;
            }
            Input::Jump(number) => {
                exam.go_to(number - 1).await;
            }
            Input::Review(number) => {
                render_review(&exam, number - 1);
                continue;
            }
            Input::Defer => {
                if !exam.defer_current() {
                    println!("Cannot move this question right now.");
                }
            }
            Input::ToggleAutoAdvance => {
                let enabled = exam.snapshot().auto_advance;
                exam.set_auto_advance(!enabled);
            }
            Input::Terminate => {
                exam.terminate().await;
            }
            Input::RestartSame => exam.restart_same_questions(),
            Input::RestartNew => {
                exam = service.restart_new_questions(exam).await.map_err(start_failed)?;
            }
            Input::Show => {}
            Input::Quit => break,
        }
        announced = exam.snapshot().is_finished();
        render(&exam);
    }

    exam.close();
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut iter = std::env::args().skip(1);
    let args = Args::parse(&mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    init_tracing();
    info!(api = %args.api_base_url, vehicle = %args.vehicle, topics = args.topics.len(), "starting exam");

    let bank = Arc::new(HttpQuestionBank::new(QuestionBankConfig {
        base_url: args.api_base_url,
    }));
    let service = ExamLoopService::new(
        Clock::system(),
        bank.clone(),
        bank,
        Arc::new(TracingResultsSink),
    )
    .with_auto_advance(args.auto_advance);

    let selection = ExamSelection::new(args.vehicle, args.topics);
    let exam = service.start_exam(selection).await.map_err(start_failed)?;
    drive(&service, exam).await
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
