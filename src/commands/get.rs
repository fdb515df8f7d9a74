//! The `get` subcommand: stream a projected file to stdout, or hex dump
//! it when stdout is a terminal.

use std::io::Write;
use clap::ArgMatches;
use super::{mount,RCH};
use crate::vfs::OpenMode;
use crate::STDRESULT;

pub fn get(cmd: &ArgMatches) -> STDRESULT {
    let dfs = mount(cmd)?;
    let path = cmd.get_one::<String>("file").expect(RCH);
    let mut handle = dfs.open(path,OpenMode::Read)?;
    let buf = handle.read_to_end()?;
    if atty::is(atty::Stream::Stdout) {
        display_block(&buf);
    } else {
        std::io::stdout().write_all(&buf)?;
    }
    Ok(())
}

/// Hex dump with two text gutters: the bytes as ASCII, and the same
/// bytes with the high bit stripped, which is the readable gutter for
/// Hi-ASCII text and names.
fn display_block(block: &[u8]) {
    for (row,chunk) in block.chunks(16).enumerate() {
        let hex: Vec<String> = chunk.iter().map(|b| format!("{:02X}",b)).collect();
        let plain: String = chunk.iter().map(|b| printable(*b)).collect();
        let flipped: String = chunk.iter().map(|b| printable(b & 0x7f)).collect();
        println!("{:04X}  {:<47}  {:<16}  {}",row*16,hex.join(" "),plain,flipped);
    }
}

fn printable(b: u8) -> char {
    match b {
        0x20..=0x7e => b as char,
        _ => '.'
    }
}
