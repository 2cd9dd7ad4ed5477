//! `regdialog`: edit one value of a registry-style key in the terminal.
//!
//! The key is read from JSON (`--values`), edited through the value dialogs
//! and written back out as JSON (`--output`).

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::Parser;
use color_eyre::eyre::{Report, Result, WrapErr, eyre};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use regdialog::{
    Dialogs, EditOutcome, MemoryKey, Screen, TerminalScreen, ValueItem, ValueKind, ValueStore,
};

const DEFAULT_KEY_PATH: &str = "HKEY_CURRENT_USER\\Software\\regdialog";
const LOG_ENV: &str = "REGDIALOG_LOG";

#[derive(Debug, Parser)]
#[command(
    name = "regdialog",
    version,
    about = "Edit registry-style values in an interactive terminal dialog"
)]
struct Cli {
    /// Key contents as JSON: file path or "-" for stdin
    #[arg(short = 'v', long = "values", value_name = "SPEC")]
    values: Option<String>,

    /// Edit the existing value with this name instead of creating one
    #[arg(short = 'e', long = "edit", value_name = "NAME")]
    edit: Option<String>,

    /// Type of the new value (REG_SZ, REG_DWORD, ...); skips the type picker
    #[arg(short = 't', long = "type", value_name = "TYPE", conflicts_with = "edit")]
    kind: Option<String>,

    /// Where to write the resulting key as JSON ("-" writes to stdout)
    #[arg(short = 'o', long = "output", value_name = "DEST")]
    output: Option<String>,

    /// Emit compact JSON rather than pretty formatting
    #[arg(long = "no-pretty")]
    no_pretty: bool,

    /// Overwrite the output file even if it already exists
    #[arg(short = 'f', long = "force", short_alias = 'y', alias = "yes")]
    force: bool,

    /// Append diagnostics to this file (filtered by REGDIALOG_LOG or RUST_LOG)
    #[arg(long = "log-file", value_name = "PATH")]
    log_file: Option<PathBuf>,
}

/// What the dialogs should do once the terminal is up.
#[derive(Debug)]
enum Session {
    Edit(ValueItem),
    Create(Option<ValueKind>),
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    if let Some(path) = cli.log_file.as_ref() {
        init_logging(path)?;
    }

    let mut key = load_key(cli.values.as_deref())?;
    let session = resolve_session(&cli, &key)?;
    ensure_output_available(cli.output.as_deref(), cli.force)?;

    let outcome = {
        let screen = TerminalScreen::new().map_err(|err| eyre!("{err:#}"))?;
        let mut dialogs = Dialogs::new(screen);
        run_session(&mut dialogs, &mut key, session)?
    };

    match outcome {
        Some(EditOutcome::Saved) => eprintln!("value saved"),
        Some(EditOutcome::Unchanged) => eprintln!("value unchanged"),
        Some(EditOutcome::Cancelled) | None => eprintln!("cancelled"),
    }
    info!(?outcome, values = key.len(), "session finished");

    if let Some(dest) = cli.output.as_deref() {
        write_key(&key, dest, !cli.no_pretty)?;
    }
    Ok(())
}

fn init_logging(path: &Path) -> Result<()> {
    let file = File::options()
        .create(true)
        .append(true)
        .open(path)
        .wrap_err_with(|| format!("failed to open log file {}", path.display()))?;
    let env_filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| "regdialog=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .try_init()
        .map_err(|err| eyre!("failed to initialize tracing: {err}"))?;
    Ok(())
}

fn load_key(spec: Option<&str>) -> Result<MemoryKey> {
    let Some(spec) = spec else {
        return Ok(MemoryKey::new(DEFAULT_KEY_PATH));
    };
    let contents = if spec == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .wrap_err("failed to read from stdin")?;
        buffer
    } else {
        fs::read_to_string(spec).wrap_err_with(|| format!("failed to read file {spec}"))?
    };
    MemoryKey::from_json_str(&contents)
        .wrap_err_with(|| format!("failed to parse values from {spec}"))
}

fn resolve_session(cli: &Cli, key: &MemoryKey) -> Result<Session> {
    if let Some(name) = cli.edit.as_deref() {
        let value = key
            .get_value(name)
            .wrap_err_with(|| format!("cannot edit {name:?}"))?;
        return Ok(Session::Edit(ValueItem::new(name, value)));
    }
    let kind = cli
        .kind
        .as_deref()
        .map(|raw| ValueKind::from_name(raw).ok_or_else(|| eyre!("unknown value type {raw:?}")))
        .transpose()?;
    Ok(Session::Create(kind))
}

fn run_session<S: Screen>(
    dialogs: &mut Dialogs<S>,
    key: &mut MemoryKey,
    session: Session,
) -> Result<Option<EditOutcome>> {
    let area = dialogs.area();
    let outcome = match session {
        Session::Edit(item) => Some(dialogs.edit_value(key, item.kind(), Some(&item), area)?),
        Session::Create(kind) => {
            let kind = match kind {
                Some(kind) => Some(kind),
                None => dialogs.select_type(area)?,
            };
            match kind {
                Some(kind) => Some(dialogs.edit_value(key, kind, None, area)?),
                None => None,
            }
        }
    };
    Ok(outcome)
}

fn ensure_output_available(dest: Option<&str>, force: bool) -> Result<()> {
    match dest {
        Some(path) if path != "-" && !force && fs::metadata(path).is_ok() => Err(eyre!(
            "output file {path} already exists (use --force to overwrite)"
        )),
        _ => Ok(()),
    }
}

fn write_key(key: &MemoryKey, dest: &str, pretty: bool) -> Result<()> {
    let mut payload = key.to_json_string(pretty).map_err(Report::new)?;
    payload.push('\n');
    if dest == "-" {
        io::stdout()
            .write_all(payload.as_bytes())
            .wrap_err("failed to write to stdout")?;
    } else {
        fs::write(dest, payload).wrap_err_with(|| format!("failed to write {dest}"))?;
    }
    Ok(())
}
