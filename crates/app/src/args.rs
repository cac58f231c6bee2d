use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use quiz_core::model::SubjectId;
use services::AUTO_ADVANCE_DELAY;

pub const DEFAULT_DB_URL: &str = "sqlite://quiz.sqlite3";
pub const DEFAULT_BANK_PATH: &str = "subjects.json";

#[derive(Debug, PartialEq, Eq)]
pub enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidDbUrl { raw: String },
    InvalidSubject { raw: String },
    InvalidAdvanceMs { raw: String },
    SubjectRequired,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidSubject { raw } => write!(f, "invalid --subject value: {raw:?}"),
            ArgsError::InvalidAdvanceMs { raw } => write!(f, "invalid --advance-ms value: {raw}"),
            ArgsError::SubjectRequired => write!(f, "reset requires --subject"),
        }
    }
}

impl std::error::Error for ArgsError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Play,
    Stats,
    Reset,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "play" => Some(Self::Play),
            "stats" => Some(Self::Stats),
            "reset" => Some(Self::Reset),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    pub command: Command,
    pub db_url: String,
    pub bank_path: PathBuf,
    pub subject: Option<SubjectId>,
    pub advance_delay: Duration,
}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [play]  [--db <sqlite_url>] [--bank <path>] [--subject <id>] [--advance-ms <n>]");
    eprintln!("  cargo run -p app -- stats   [--db <sqlite_url>] [--bank <path>]");
    eprintln!("  cargo run -p app -- reset   --subject <id> [--db <sqlite_url>] [--bank <path>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db {DEFAULT_DB_URL}");
    eprintln!("  --bank {DEFAULT_BANK_PATH}");
    eprintln!("  --advance-ms {}", AUTO_ADVANCE_DELAY.as_millis());
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_DB_URL, QUIZ_BANK_PATH, QUIZ_SUBJECT, QUIZ_ADVANCE_MS, RUST_LOG");
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_subject(raw: String) -> Result<SubjectId, ArgsError> {
    SubjectId::new(raw.clone()).map_err(|_| ArgsError::InvalidSubject { raw })
}

fn parse_advance_ms(raw: String) -> Result<Duration, ArgsError> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|_| ArgsError::InvalidAdvanceMs { raw })
}

impl Args {
    /// Parse the command line after the program name. Environment values
    /// come from `env` and are overridden by flags.
    ///
    /// Returns `Ok(None)` when help was requested.
    pub fn parse(
        argv: impl IntoIterator<Item = String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Option<Self>, ArgsError> {
        let mut argv: Vec<String> = argv.into_iter().collect();

        // No subcommand means play.
        let command = match argv.first().map(String::as_str) {
            None => Command::Play,
            Some(first) if first.starts_with('-') => Command::Play,
            Some(first) => Command::from_arg(first)
                .ok_or_else(|| ArgsError::UnknownCommand(first.to_string()))?,
        };
        if argv.first().is_some_and(|first| !first.starts_with('-')) {
            argv.remove(0);
        }
        let mut args = argv.into_iter();

        let mut db_url = env("QUIZ_DB_URL")
            .filter(|v| !v.trim().is_empty())
            .map_or_else(|| DEFAULT_DB_URL.to_string(), normalize_sqlite_url);
        let mut bank_path = env("QUIZ_BANK_PATH")
            .filter(|v| !v.trim().is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_BANK_PATH), PathBuf::from);
        let mut subject = env("QUIZ_SUBJECT")
            .filter(|v| !v.trim().is_empty())
            .map(parse_subject)
            .transpose()?;
        let mut advance_delay = env("QUIZ_ADVANCE_MS")
            .map(parse_advance_ms)
            .transpose()?
            .unwrap_or(AUTO_ADVANCE_DELAY);

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--bank" => bank_path = PathBuf::from(require_value(&mut args, "--bank")?),
                "--subject" => subject = Some(parse_subject(require_value(&mut args, "--subject")?)?),
                "--advance-ms" => {
                    advance_delay = parse_advance_ms(require_value(&mut args, "--advance-ms")?)?;
                }
                "--help" | "-h" => return Ok(None),
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        if command == Command::Reset && subject.is_none() {
            return Err(ArgsError::SubjectRequired);
        }

        Ok(Some(Self {
            command,
            db_url,
            bank_path,
            subject,
            advance_delay,
        }))
    }
}

/// Turn a bare path or `sqlite:` path into an absolute `sqlite://` URL.
pub fn normalize_sqlite_url(raw: String) -> String {
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
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

/// Make sure the database file and its directory exist before connecting.
pub fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
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
