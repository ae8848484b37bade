mod manage;
mod play;

use std::fmt;
use std::io::{self, BufRead, Write};

use dedaena_core::InputClearPolicy;
use dedaena_core::model::{ContentKind, RoleFilter, TourPosition};
use services::{ApiConfig, AppServices, Clock, Registration};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingArgument { name: &'static str },
    UnknownArg(String),
    InvalidPosition { raw: String },
    InvalidDbUrl { raw: String },
    InvalidSound { raw: String },
    InvalidValue { what: &'static str, raw: String },
    UnknownAction { command: &'static str, action: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingArgument { name } => write!(f, "missing <{name}>"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidPosition { raw } => write!(f, "invalid --position value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidSound { raw } => {
                write!(f, "sound expects on, off or toggle, got {raw}")
            }
            ArgsError::InvalidValue { what, raw } => write!(f, "invalid {what}: {raw}"),
            ArgsError::UnknownAction { command, action } => {
                write!(f, "unknown {command} action: {action}")
            }
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
    eprintln!("  app play     [--db <sqlite_url>] [--table <name>] [--position <n>] [--keep-input]");
    eprintln!("  app toc      [--db <sqlite_url>] [--table <name>]");
    eprintln!("  app login    <username> [--password <password>]");
    eprintln!("  app register <username> --email <email> [--password <password>]");
    eprintln!("  app logout");
    eprintln!("  app sound    [on|off|toggle]");
    eprintln!("  app moderate [list] [--kind <kind>] [--tour <n>] [--search <text>]");
    eprintln!("  app moderate add <kind> <tour> <text>");
    eprintln!("  app moderate update <kind> <tour> <index> <text>");
    eprintln!("  app moderate delete <kind> <tour> <index>");
    eprintln!("  app moderate detect <text>");
    eprintln!("  app moderate check <tour> <sentence>");
    eprintln!("  app admin    [users] [--search <text>] [--role all|admin|moder|user]");
    eprintln!("  app admin    toggle <id> | role <id> admin|moder on|off | delete <id>");
    eprintln!("  app admin    logs [--page <n>] [--user <name>] [--action <a>] [--audit-table <t>]");
    eprintln!("  app admin    stats");
    eprintln!();
    eprintln!("Kinds: word, sentence, proverb, reading");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite://dedaena.sqlite3");
    eprintln!("  --position 1");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  DEDAENA_DB_URL, DEDAENA_API_BASE_URL, DEDAENA_TABLE,");
    eprintln!("  DEDAENA_API_TIMEOUT_SECS, DEDAENA_PASSWORD, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Play,
    Toc,
    Login,
    Register,
    Logout,
    Sound,
    Moderate,
    Admin,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "play" => Some(Self::Play),
            "toc" => Some(Self::Toc),
            "login" => Some(Self::Login),
            "register" => Some(Self::Register),
            "logout" => Some(Self::Logout),
            "sound" => Some(Self::Sound),
            "moderate" => Some(Self::Moderate),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SoundChange {
    Show,
    Set(bool),
    Toggle,
}

impl SoundChange {
    fn parse(raw: Option<&str>) -> Result<Self, ArgsError> {
        match raw {
            None => Ok(Self::Show),
            Some("on") => Ok(Self::Set(true)),
            Some("off") => Ok(Self::Set(false)),
            Some("toggle") => Ok(Self::Toggle),
            Some(other) => Err(ArgsError::InvalidSound {
                raw: other.to_string(),
            }),
        }
    }
}

#[derive(Debug)]
struct Args {
    db_url: String,
    table: Option<String>,
    position: TourPosition,
    clear_policy: InputClearPolicy,
    email: Option<String>,
    password: Option<String>,
    kind: Option<ContentKind>,
    tour: Option<TourPosition>,
    search: Option<String>,
    role: Option<RoleFilter>,
    page: Option<u32>,
    user: Option<String>,
    action: Option<String>,
    audit_table: Option<String>,
    positional: Vec<String>,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("DEDAENA_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://dedaena.sqlite3".into(), normalize_sqlite_url);
        let mut table = None;
        let mut position = TourPosition::FIRST;
        let mut clear_policy = InputClearPolicy::Always;
        let mut email = None;
        let mut password = std::env::var("DEDAENA_PASSWORD").ok();
        let mut kind = None;
        let mut tour = None;
        let mut search = None;
        let mut role = None;
        let mut page = None;
        let mut user = None;
        let mut action = None;
        let mut audit_table = None;
        let mut positional = Vec::new();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--table" => table = Some(require_value(args, "--table")?),
                "--position" => {
                    let value = require_value(args, "--position")?;
                    position = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidPosition { raw: value.clone() })?;
                }
                "--keep-input" => clear_policy = InputClearPolicy::OnSuccess,
                "--email" => email = Some(require_value(args, "--email")?),
                "--password" => password = Some(require_value(args, "--password")?),
                "--kind" => kind = Some(manage::parse_kind(&require_value(args, "--kind")?)?),
                "--tour" => {
                    let value = require_value(args, "--tour")?;
                    tour = Some(
                        value
                            .parse()
                            .map_err(|_| ArgsError::InvalidPosition { raw: value.clone() })?,
                    );
                }
                "--search" => search = Some(require_value(args, "--search")?),
                "--role" => {
                    role = Some(manage::parse_role_filter(&require_value(args, "--role")?)?);
                }
                "--page" => {
                    let value = require_value(args, "--page")?;
                    page = Some(value.parse().map_err(|_| ArgsError::InvalidValue {
                        what: "page",
                        raw: value.clone(),
                    })?);
                }
                "--user" => user = Some(require_value(args, "--user")?),
                "--action" => action = Some(require_value(args, "--action")?),
                "--audit-table" => audit_table = Some(require_value(args, "--audit-table")?),
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                flag if flag.starts_with("--") => return Err(ArgsError::UnknownArg(arg)),
                _ => positional.push(arg),
            }
        }

        Ok(Self {
            db_url,
            table,
            position,
            clear_policy,
            email,
            password,
            kind,
            tour,
            search,
            role,
            page,
            user,
            action,
            audit_table,
            positional,
        })
    }

    fn username(&self) -> Result<&str, ArgsError> {
        self.positional
            .first()
            .map(String::as_str)
            .ok_or(ArgsError::MissingArgument { name: "username" })
    }
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

fn prompt(label: &str) -> io::Result<String> {
    print!("{label}: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn read_password(args: &Args) -> io::Result<String> {
    match &args.password {
        Some(password) => Ok(password.clone()),
        None => prompt("password"),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("app=info,services=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    let cmd = match argv.first().map(String::as_str) {
        None => Command::Play,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Play,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            io::Error::new(io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let parsed = Args::parse(&mut argv.into_iter()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    prepare_sqlite_file(&parsed.db_url)?;
    let mut config = ApiConfig::from_env()?;
    if let Some(table) = &parsed.table {
        config = config.with_table(table.clone());
    }
    let services = AppServices::new_sqlite(&parsed.db_url, config, Clock::default()).await?;
    tracing::debug!(db = %parsed.db_url, base_url = %services.config().base_url, "services ready");

    match cmd {
        Command::Play => {
            let game = services.game().as_ref().clone().with_clear_policy(parsed.clear_policy);
            let sound = services.preferences().load().await?.sound_enabled();
            play::run(&game, parsed.position, sound).await
        }
        Command::Toc => {
            let game = services.game();
            let toc = game.table_of_contents().await?;
            println!("{}: {} tours", game.table(), toc.len());
            for (index, summary) in toc.iter().enumerate() {
                let mut extras = Vec::new();
                if summary.has_proverbs {
                    extras.push("proverbs");
                }
                if summary.has_reading {
                    extras.push("reading");
                }
                println!(
                    "{:>3}. {}  words {:>3}  sentences {:>3}  {}",
                    index + 1,
                    summary.letter,
                    summary.word_count,
                    summary.sentence_count,
                    extras.join(", ")
                );
            }
            Ok(())
        }
        Command::Login => {
            let username = parsed.username()?;
            let password = read_password(&parsed)?;
            let session = services.auth().login(username, &password).await?;
            println!(
                "signed in as {} ({})",
                session.user.username,
                session.user.role().as_str()
            );
            Ok(())
        }
        Command::Register => {
            let username = parsed.username()?.to_string();
            let email = parsed
                .email
                .clone()
                .ok_or(ArgsError::MissingValue { flag: "--email" })?;
            let password = read_password(&parsed)?;
            let user = services
                .auth()
                .register(Registration {
                    username,
                    email,
                    password,
                })
                .await?;
            println!("registered {}; sign in with `app login {}`", user.username, user.username);
            Ok(())
        }
        Command::Logout => {
            services.auth().logout().await?;
            println!("signed out");
            Ok(())
        }
        Command::Sound => {
            let preferences = services.preferences();
            let enabled = match SoundChange::parse(parsed.positional.first().map(String::as_str))? {
                SoundChange::Show => preferences.load().await?.sound_enabled(),
                SoundChange::Set(enabled) => {
                    preferences.set_sound_enabled(enabled).await?.sound_enabled()
                }
                SoundChange::Toggle => preferences.toggle_sound().await?,
            };
            println!("sound {}", if enabled { "on" } else { "off" });
            Ok(())
        }
        Command::Moderate => {
            let action = manage::ModerateAction::parse(&parsed.positional)?;
            let table = services.config().table.clone();
            manage::moderate(&services.moderation(), &table, action, &parsed).await
        }
        Command::Admin => {
            let action = manage::AdminAction::parse(&parsed.positional)?;
            manage::admin(&services.admin(), action, &parsed).await
        }
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
