mod terminal;

use std::fmt;

use quiz_core::model::{QuestionKind, QuizId};
use services::{
    AppConfig, AppServices, DEFAULT_DB_URL, DEFAULT_MANIFEST, DocumentRoot, SearchOutcome,
    SessionError, SessionSlot,
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingOperand { command: &'static str },
    UnknownArg(String),
    InvalidSeed { raw: String },
    InvalidDbUrl { raw: String },
    InvalidQuizPath { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingOperand { command } => write!(f, "{command} requires an argument"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidSeed { raw } => write!(f, "invalid --seed value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidQuizPath { raw } => write!(f, "invalid quiz path: {raw:?}"),
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
    eprintln!("  quiz list            [options]   # categories, quizzes and last scores");
    eprintln!("  quiz play <path>     [options]   # play the quiz stored at <path>");
    eprintln!("  quiz search <query>  [options]   # search every quiz's questions and answers");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --root <dir|url>     where the manifest and quiz documents live (default: .)");
    eprintln!("  --manifest <name>    manifest document (default: {DEFAULT_MANIFEST})");
    eprintln!("  --db <sqlite_url>    results database (default: {DEFAULT_DB_URL})");
    eprintln!("                       use sqlite::memory: to keep nothing between runs");
    eprintln!("  --seed <n>           fixed seed for question order");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_ROOT, QUIZ_MANIFEST, QUIZ_DB_URL, QUIZ_SEED, RUST_LOG");
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    List,
    Play(QuizId),
    Search(String),
}

struct Args {
    command: Command,
    config: AppConfig,
}

impl Args {
    fn parse(argv: Vec<String>) -> Result<Self, ArgsError> {
        let mut config = config_from_env()?;
        let mut command = None;
        let mut operand: Option<String> = None;

        let mut args = argv.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--root" => config.root = DocumentRoot::parse(&require_value(&mut args, "--root")?),
                "--manifest" => config.manifest = require_value(&mut args, "--manifest")?,
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    config.db_url = Some(normalize_sqlite_url(value));
                }
                "--seed" => {
                    let value = require_value(&mut args, "--seed")?;
                    config.seed = Some(parse_seed(value)?);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                flag if flag.starts_with("--") => return Err(ArgsError::UnknownArg(arg)),
                _ if command.is_none() => command = Some(arg),
                _ if operand.is_none() => operand = Some(arg),
                _ => {
                    // Unquoted multi-word search queries.
                    if let Some(existing) = operand.as_mut() {
                        existing.push(' ');
                        existing.push_str(&arg);
                    }
                }
            }
        }

        let command = match command.as_deref() {
            None | Some("list") => Command::List,
            Some("play") => {
                let raw = operand.ok_or(ArgsError::MissingOperand { command: "play" })?;
                let quiz_id = raw
                    .parse::<QuizId>()
                    .map_err(|_| ArgsError::InvalidQuizPath { raw: raw.clone() })?;
                Command::Play(quiz_id)
            }
            Some("search") => {
                Command::Search(operand.ok_or(ArgsError::MissingOperand { command: "search" })?)
            }
            Some(other) => return Err(ArgsError::UnknownArg(other.to_owned())),
        };

        Ok(Self { command, config })
    }
}

fn config_from_env() -> Result<AppConfig, ArgsError> {
    let mut config = AppConfig::default();
    if let Ok(root) = std::env::var("QUIZ_ROOT") {
        config.root = DocumentRoot::parse(&root);
    }
    if let Ok(manifest) = std::env::var("QUIZ_MANIFEST") {
        config.manifest = manifest;
    }
    if let Some(db_url) = std::env::var("QUIZ_DB_URL")
        .ok()
        .filter(|value| !value.trim().is_empty())
    {
        config.db_url = Some(normalize_sqlite_url(db_url));
    }
    if let Ok(seed) = std::env::var("QUIZ_SEED") {
        config.seed = Some(parse_seed(seed)?);
    }
    Ok(config)
}

fn parse_seed(raw: String) -> Result<u64, ArgsError> {
    raw.trim().parse().map_err(|_| ArgsError::InvalidSeed { raw })
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn list(services: &mut AppServices) -> Result<(), Box<dyn std::error::Error>> {
    services.catalog_mut().load_manifest().await?;
    let results = services.results();
    let catalog = services.catalog();

    for category in catalog.categories()? {
        println!("{category}");
        for entry in catalog.quizzes_in(category)? {
            let last = results
                .load_result(entry.quiz_id())
                .await?
                .map_or_else(|| "-".to_owned(), |record| record.score_summary());
            println!("  {}  [{}]  Last Score: {last}", entry.name, entry.path);
        }
    }
    Ok(())
}

async fn play(
    services: &mut AppServices,
    quiz_id: &QuizId,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Err(err) = services.catalog_mut().load_manifest().await {
        debug!(%err, "playing without a manifest title");
    }
    if let Some(entry) = services.catalog().entry(quiz_id) {
        println!("{} - {}", entry.category, entry.name);
    }

    let session_loop = services.session_loop();
    let mut slot = SessionSlot::new();

    let ticket = slot.begin_load();
    match session_loop.start_session(quiz_id).await {
        Ok(session) => {
            slot.install(ticket, session)?;
        }
        Err(err) => {
            if let Some(err) = slot.fail_load(ticket, err) {
                return Err(err.into());
            }
            return Ok(());
        }
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(session) = slot.session_mut() {
        let Some(question) = session.current_question().cloned() else {
            break;
        };
        let prompt = terminal::render_question(&question, &session.progress());
        stdout.write_all(prompt.as_bytes()).await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            println!();
            println!("Quiz abandoned; no result saved.");
            return Ok(());
        };

        let len = question.answers().len();
        let submitted = match question.kind {
            QuestionKind::Single => terminal::parse_single(&line, len)
                .map(|index| session.submit_single(question.number, index)),
            QuestionKind::Multi => terminal::parse_selection(&line, len)
                .map(|indices| session.submit_multi(question.number, &indices)),
        };

        match submitted {
            Ok(Ok(feedback)) => println!("{}", terminal::render_feedback(&feedback)),
            Ok(Err(rejected)) => println!("{rejected}"),
            Err(input) => println!("{input}"),
        }
    }

    let Some(session) = slot.take_completed() else {
        return Err(SessionError::NotCompleted.into());
    };
    let record = session_loop.finish(&session).await?;
    print!("{}", terminal::render_result(&record));
    Ok(())
}

async fn search(
    services: &mut AppServices,
    query: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    services.catalog_mut().load_manifest().await?;
    let report = services.catalog_mut().preload_all().await;
    if !report.is_complete() {
        eprintln!(
            "{} quiz(zes) could not be loaded and are not searched.",
            report.failures.len()
        );
    }

    match services.search_index().search(query) {
        SearchOutcome::TooShort { min_length } => {
            println!("Please enter at least {min_length} characters to search.");
        }
        SearchOutcome::Matches(hits) if hits.is_empty() => {
            println!("No questions found.");
        }
        SearchOutcome::Matches(hits) => {
            for hit in hits {
                println!("{}", terminal::render_search_hit(hit));
            }
        }
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    let parsed = Args::parse(argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    if let Some(db_url) = &parsed.config.db_url {
        prepare_sqlite_file(db_url)?;
    }
    let mut services = AppServices::build(&parsed.config).await?;
    debug!(command = ?parsed.command, persisted = parsed.config.db_url.is_some(), "services ready");

    match &parsed.command {
        Command::List => list(&mut services).await,
        Command::Play(quiz_id) => play(&mut services, quiz_id).await,
        Command::Search(query) => search(&mut services, query).await,
    }
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
