//! restore-todo: the todo demo driven through restore sessions.
//!
//! Every mutating command runs one business function inside a session,
//! writes the resulting dataset back to the data file and prints the
//! operation batch. With a `restore.toml` that names an endpoint, the batch
//! is also flushed to the remote store before the process exits.

mod commands;
mod format;
mod todo;

use std::path::Path;
use std::process;
use std::sync::Arc;

use clap::ArgMatches;
use restore_remote::{
    load_data, ActionOutcome, ActionWrapper, HttpRemote, RemoteConfig, RemoteError, RemoteSignal,
    SignalSink, CONFIG_FILE_NAME,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use commands::{build_cli, DEFAULT_DATA_FILE};
use format::{format_ops, format_todos, OutputMode};
use todo::TodoModel;

fn main() {
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let matches = build_cli().get_matches();

    let output_mode = if matches.get_flag("json") {
        OutputMode::Json
    } else {
        OutputMode::Human
    };

    if let Err(e) = run(&matches, output_mode) {
        eprintln!("(error) {}", e);
        process::exit(1);
    }
}

fn run(matches: &ArgMatches, mode: OutputMode) -> Result<(), String> {
    let config_path = matches
        .get_one::<String>("config")
        .map(|s| s.as_str())
        .unwrap_or(CONFIG_FILE_NAME);

    // Handle `init-config` before reading any file.
    if let Some(("init-config", sub)) = matches.subcommand() {
        let endpoint = sub.get_one::<String>("endpoint").map(|s| s.as_str());
        init_config(Path::new(config_path), endpoint).map_err(|e| e.to_string())?;
        eprintln!("Config ready at {}", config_path);
        return Ok(());
    }

    let config = load_config(matches, Path::new(config_path))?;
    let data_path = matches
        .get_one::<String>("data")
        .map(|s| s.as_str())
        .unwrap_or(DEFAULT_DATA_FILE);
    let mut model = TodoModel::open(Path::new(data_path))?;
    debug!(target: "restore::cli", data = data_path, todos = model.todos().len(), "Dataset opened");

    match matches.subcommand() {
        Some(("list", _)) => {
            println!("{}", format_todos(model.todos(), mode));
            Ok(())
        }
        Some(("pull", _)) => pull(&config, &mut model),
        Some((name, sub)) => {
            let wrapper =
                ActionWrapper::from_config(&config, signal_printer()).map_err(|e| e.to_string())?;
            let result = apply(&wrapper, &mut model, name, sub);
            if let Some(queue) = wrapper.flush_queue() {
                queue.drain();
            }
            result
        }
        None => Err("no command given".to_string()),
    }
}

/// With an endpoint the file is rewritten; without one an existing file is kept.
fn init_config(path: &Path, endpoint: Option<&str>) -> Result<(), RemoteError> {
    match endpoint {
        Some(endpoint) => RemoteConfig::with_endpoint(endpoint).write_to_file(path),
        None => RemoteConfig::write_default_if_missing(path),
    }
}

/// An explicit `--config` must exist; the default file is optional.
fn load_config(matches: &ArgMatches, path: &Path) -> Result<RemoteConfig, String> {
    if matches.get_one::<String>("config").is_some() || path.exists() {
        RemoteConfig::from_file(path).map_err(|e| e.to_string())
    } else {
        Ok(RemoteConfig::default())
    }
}

fn apply(
    wrapper: &ActionWrapper,
    model: &mut TodoModel,
    name: &str,
    sub: &ArgMatches,
) -> Result<(), String> {
    let (outcome, target) = match name {
        "add" => {
            let id = model.next_id()?;
            let text = text_arg(sub)?;
            (wrapper.execute(model, |s| todo::add(s, id, text)), None)
        }
        "edit" => {
            let id = id_arg(sub)?;
            let text = text_arg(sub)?;
            (wrapper.execute(model, |s| todo::edit(s, id, text)), Some(id))
        }
        "complete" => {
            let id = id_arg(sub)?;
            (wrapper.execute(model, |s| todo::complete(s, id)), Some(id))
        }
        "delete" => {
            let id = id_arg(sub)?;
            (wrapper.execute(model, |s| todo::delete(s, id)), Some(id))
        }
        "clear-completed" => (wrapper.execute(model, todo::clear_completed), None),
        other => return Err(format!("unknown command '{}'", other)),
    };

    let outcome: ActionOutcome<bool> = outcome.map_err(|e| e.to_string())?;
    if let (false, Some(id)) = (outcome.value, target) {
        return Err(format!("no todo with id {}", id));
    }

    model.save()?;
    println!("{}", format_ops(&outcome.commit.ops)?);
    Ok(())
}

fn pull(config: &RemoteConfig, model: &mut TodoModel) -> Result<(), String> {
    let remote = HttpRemote::from_config(config)
        .ok_or_else(|| "no endpoint configured in restore.toml".to_string())?;
    load_data(&remote, model).map_err(|e| e.to_string())?;
    model.save()?;
    eprintln!("Pulled {} todos from {}", model.todos().len(), remote.endpoint());
    Ok(())
}

fn id_arg(sub: &ArgMatches) -> Result<i64, String> {
    sub.get_one::<i64>("id")
        .copied()
        .ok_or_else(|| "missing todo id".to_string())
}

fn text_arg(sub: &ArgMatches) -> Result<&str, String> {
    sub.get_one::<String>("text")
        .map(|s| s.as_str())
        .ok_or_else(|| "missing todo text".to_string())
}

fn signal_printer() -> SignalSink {
    Arc::new(|signal: RemoteSignal| match signal {
        RemoteSignal::Begin => eprintln!("remote: saving..."),
        RemoteSignal::End => eprintln!("remote: saved"),
        RemoteSignal::Fail(reason) => eprintln!("remote: failed ({})", reason),
    })
}
