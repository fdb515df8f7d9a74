//! # Command Line Interface
//!
//! The subcommands operate on the projected tree, so paths given with
//! `-f` are projection paths like `/mydisk/HELLO`, not host paths.
//! Simple subcommands dispatch straight to the `commands` module.

mod cli;

use dskdav::commands;
use dskdav::commands::CommandError;

fn main() -> Result<(),Box<dyn std::error::Error>> {
    env_logger::init();
    let matches = cli::build_cli().get_matches();

    if let Some(cmd) = matches.subcommand_matches("ls") {
        return commands::ls(cmd);
    }
    if let Some(cmd) = matches.subcommand_matches("catalog") {
        return commands::catalog(cmd);
    }
    if let Some(cmd) = matches.subcommand_matches("vtoc") {
        return commands::vtoc(cmd);
    }
    if let Some(cmd) = matches.subcommand_matches("get") {
        return commands::get::get(cmd);
    }
    if let Some(cmd) = matches.subcommand_matches("lock") {
        return commands::lock(cmd);
    }
    if let Some(cmd) = matches.subcommand_matches("unlock") {
        return commands::unlock(cmd);
    }
    if let Some(cmd) = matches.subcommand_matches("delete") {
        return commands::delete(cmd);
    }

    eprintln!("No subcommand was found, try `dskdav --help`");
    Err(Box::new(CommandError::InvalidCommand))
}
