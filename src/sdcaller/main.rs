use chrono::Utc;
use clap::Parser;
use colored::*;
use directories::ProjectDirs;
use sdcaller::api::{AppPaths, CallerApi, CmdMessage, ConfigAction, ImportPreview, MessageLevel};
use sdcaller::error::{Result, SdCallerError};
use sdcaller::model::{PracticeSession, UserProfile};
use sdcaller::store::fs::FileBackend;
use sdcaller::store::LocalStore;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod args;
use args::{Cli, Commands};

const HOME_ENV: &str = "SDCALLER_HOME";
const LOG_ENV: &str = "SDCALLER_LOG";

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "Error:".red(), e);
        std::process::exit(1);
    }
}

/// Diagnostics go to stderr; stdout stays clean for `export --stdout`.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let api = init_api()?;

    match cli.command {
        Some(Commands::Create { name }) => handle_create(&api, &name),
        Some(Commands::Show) | None => handle_show(&api),
        Some(Commands::Rename { name }) => handle_rename(&api, &name),
        Some(Commands::Record {
            calls,
            successful,
            failed,
        }) => handle_record(
            &api,
            PracticeSession {
                calls,
                successful,
                failed,
            },
        ),
        Some(Commands::Prefs {
            auto_play,
            flow_hints,
            reset,
        }) => handle_prefs(&api, auto_play, flow_hints, reset),
        Some(Commands::Export { out, stdout }) => handle_export(&api, out, stdout),
        Some(Commands::Import { file, yes }) => handle_import(&api, file, yes),
        Some(Commands::Reset { yes }) => handle_reset(&api, yes),
        Some(Commands::Doctor) => handle_doctor(&api),
        Some(Commands::Config { key, value }) => handle_config(&api, key, value),
    }
}

fn data_dir() -> Result<PathBuf> {
    if let Some(home) = std::env::var_os(HOME_ENV) {
        return Ok(PathBuf::from(home));
    }
    ProjectDirs::from("com", "sdcaller", "sdcaller")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| SdCallerError::Store("Could not determine a data directory".to_string()))
}

fn init_api() -> Result<CallerApi<FileBackend>> {
    let data = data_dir()?;
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    let store = LocalStore::new(FileBackend::new(data.clone()));
    Ok(CallerApi::new(store, AppPaths { data, cwd }))
}

fn handle_create(api: &CallerApi<FileBackend>, name: &str) -> Result<()> {
    let result = api.create_profile(name, Utc::now())?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_show(api: &CallerApi<FileBackend>) -> Result<()> {
    let result = api.show_profile()?;
    if let Some(profile) = &result.profile {
        print_profile(profile);
    } else {
        print_messages(&result.messages);
        println!("{}", "Create one with: sdcaller create <name>".dimmed());
    }
    Ok(())
}

fn handle_rename(api: &CallerApi<FileBackend>, name: &str) -> Result<()> {
    let result = api.rename_profile(name)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_record(api: &CallerApi<FileBackend>, session: PracticeSession) -> Result<()> {
    let result = api.record_session(session)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_prefs(
    api: &CallerApi<FileBackend>,
    auto_play: Option<bool>,
    flow_hints: Option<bool>,
    reset: bool,
) -> Result<()> {
    let result = if reset {
        api.reset_preferences()?
    } else {
        api.set_preferences(auto_play, flow_hints)?
    };
    if let Some(profile) = &result.profile {
        print_preferences(profile);
    }
    print_messages(&result.messages);
    Ok(())
}

fn handle_export(api: &CallerApi<FileBackend>, out: Option<PathBuf>, stdout: bool) -> Result<()> {
    if stdout {
        let result = api.export_to_string(Utc::now())?;
        if let Some(json) = result.backup_json {
            println!("{}", json);
        }
        return Ok(());
    }

    let result = api.export(out.as_deref(), Utc::now())?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_import(api: &CallerApi<FileBackend>, file: PathBuf, yes: bool) -> Result<()> {
    let Some(envelope) = api.load_backup_from_file(&file) else {
        return Err(SdCallerError::Api(format!(
            "{} is not a usable backup file; nothing was imported",
            file.display()
        )));
    };
    let raw = serde_json::to_value(&envelope).map_err(SdCallerError::Serialization)?;

    let preview = api.preview_import(&raw)?;
    if preview.is_destructive() && !yes && !confirm(&describe_import(&preview))? {
        println!("{}", "Import cancelled.".dimmed());
        return Ok(());
    }

    let result = api.import(&raw)?;
    print_messages(&result.messages);
    Ok(())
}

fn describe_import(preview: &ImportPreview) -> String {
    let current = preview
        .replaces
        .as_ref()
        .map(|p| p.name.as_str())
        .unwrap_or_default();
    match &preview.envelope.user {
        Some(incoming) => format!(
            "This replaces the profile for {} with the backup of {}.",
            current, incoming.name
        ),
        None => format!(
            "The backup holds no profile; the profile for {} will be removed.",
            current
        ),
    }
}

fn handle_reset(api: &CallerApi<FileBackend>, yes: bool) -> Result<()> {
    if !yes && !confirm("This removes your profile and all statistics.")? {
        println!("{}", "Reset cancelled.".dimmed());
        return Ok(());
    }
    let result = api.reset()?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_doctor(api: &CallerApi<FileBackend>) -> Result<()> {
    println!("{}", format!("Data directory: {}", api.paths().data.display()).dimmed());
    let result = api.doctor()?;
    print_messages(&result.messages);
    if result.has_errors() {
        std::process::exit(2);
    }
    Ok(())
}

fn handle_config(
    api: &CallerApi<FileBackend>,
    key: Option<String>,
    value: Option<String>,
) -> Result<()> {
    let action = match (key, value) {
        (None, _) => ConfigAction::ShowAll,
        (Some(k), None) => ConfigAction::ShowKey(k),
        (Some(k), Some(v)) => ConfigAction::Set(k, v),
    };

    let show_all = matches!(action, ConfigAction::ShowAll);
    let result = api.config_action(action)?;
    if show_all {
        if let Some(config) = &result.config {
            for key in sdcaller::config::AppConfig::keys() {
                println!("{} = {}", key, config.get(key).unwrap_or_default());
            }
        }
    }
    print_messages(&result.messages);
    Ok(())
}

fn confirm(question: &str) -> Result<bool> {
    print!("{} {} ", question.yellow(), "Continue? [y/N]".bold());
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes" | "Yes"))
}

fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => println!("{}", message.content.red()),
        }
    }
}

const LABEL_WIDTH: usize = 22;

fn print_row(label: &str, value: impl std::fmt::Display) {
    println!("  {:<width$}{}", label.dimmed(), value, width = LABEL_WIDTH);
}

fn print_profile(profile: &UserProfile) {
    println!("{}", profile.name.bold());
    print_row("Member since", format_since(profile));
    println!();

    let stats = &profile.stats;
    print_row("Sessions", stats.total_sessions);
    print_row("Calls", stats.total_calls);
    print_row("Successful sequences", stats.successful_sequences.to_string().green());
    print_row("Failed sequences", stats.failed_sequences.to_string().red());
    let rate = stats
        .success_rate()
        .map(|r| format!("{:.0}%", r * 100.0))
        .unwrap_or_else(|| "-".to_string());
    print_row("Success rate", rate);
    println!();

    print_preferences(profile);
}

fn print_preferences(profile: &UserProfile) {
    let prefs = profile.effective_preferences();
    let stored = profile.preferences.unwrap_or_default();
    print_row(
        "Auto-play animations",
        flag(prefs.auto_play_animations(), stored.auto_play_animations.is_none()),
    );
    print_row(
        "Flow hints",
        flag(prefs.show_flow_hints(), stored.show_flow_hints.is_none()),
    );
}

fn flag(on: bool, is_default: bool) -> String {
    let text = if on { "on" } else { "off" };
    if is_default {
        format!("{} {}", text, "(default)".dimmed())
    } else {
        text.to_string()
    }
}

fn format_since(profile: &UserProfile) -> String {
    let Some(created) = profile.created_at_utc() else {
        return "-".to_string();
    };
    let elapsed = Utc::now()
        .signed_duration_since(created)
        .to_std()
        .unwrap_or_default();
    format!(
        "{} ({})",
        created.format("%Y-%m-%d"),
        timeago::Formatter::new().convert(elapsed)
    )
}
