//! Clap command tree definition.

use clap::{Arg, ArgAction, Command};

/// Dataset file used when `--data` is not given.
pub const DEFAULT_DATA_FILE: &str = "todos.json";

/// Build the complete CLI command tree.
pub fn build_cli() -> Command {
    Command::new("restore-todo")
        .about("Todo list kept in a change-tracking session")
        .subcommand_required(true)
        .arg(
            Arg::new("data")
                .long("data")
                .help("Dataset file (default: todos.json)")
                .global(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("restore.toml with the remote endpoint")
                .global(true),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("JSON output mode")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("add")
                .about("Add a todo")
                .arg(Arg::new("text").required(true).help("Todo text")),
        )
        .subcommand(
            Command::new("edit")
                .about("Change the text of a todo")
                .arg(id_arg())
                .arg(Arg::new("text").required(true).help("New text")),
        )
        .subcommand(
            Command::new("complete")
                .about("Toggle the completed flag of a todo")
                .arg(id_arg()),
        )
        .subcommand(Command::new("delete").about("Delete a todo").arg(id_arg()))
        .subcommand(
            Command::new("clear-completed").about("Delete every completed todo"),
        )
        .subcommand(Command::new("list").about("List todos"))
        .subcommand(Command::new("pull").about("Replace local data with the remote dataset"))
        .subcommand(
            Command::new("init-config")
                .about("Write a default restore.toml if none exists")
                .arg(
                    Arg::new("endpoint")
                        .long("endpoint")
                        .help("Write a config for this remote store, replacing any existing file"),
                ),
        )
}

fn id_arg() -> Arg {
    Arg::new("id")
        .required(true)
        .value_parser(clap::value_parser!(i64))
        .help("Todo id")
}
