//! # CLI Subcommands
//!
//! Contains the code behind the subcommands.  Everything here goes
//! through the `vfs` projection rather than the DOS layer directly, so
//! the command line exercises the same contract a transport would.

pub mod get;

use clap::ArgMatches;
use crate::vfs::{DavFs,OpenMode};
use crate::{DYNERR,STDRESULT};

pub const RCH: &str = "unreachable was reached";

#[derive(thiserror::Error,Debug)]
pub enum CommandError {
    #[error("Command could not be interpreted")]
    InvalidCommand
}

/// Load every `-d` image and project the set.
pub fn mount(cmd: &ArgMatches) -> Result<DavFs,DYNERR> {
    let paths: Vec<String> = cmd.get_many::<String>("dimg").expect(RCH).cloned().collect();
    DavFs::new(&paths)
}

/// List a folder of the projected tree, root by default.
pub fn ls(cmd: &ArgMatches) -> STDRESULT {
    let dfs = mount(cmd)?;
    let path = match cmd.get_one::<String>("file") {
        Some(p) => p.clone(),
        None => "/".to_string()
    };
    let handle = dfs.open(&path,OpenMode::Read)?;
    for info in dfs.readdir(&handle)? {
        match info.is_dir {
            true => println!("{:>8} {}/","",info.name),
            false => println!("{:>8} {}",info.size,info.name)
        }
    }
    Ok(())
}

/// Print a rendered meta file for every loaded disk.
fn print_meta(cmd: &ArgMatches,meta_name: &str) -> STDRESULT {
    let dfs = mount(cmd)?;
    for disk in dfs.list_images() {
        let mut handle = dfs.open(&format!("/{}/_dos/{}",disk,meta_name),OpenMode::Read)?;
        let buf = handle.read_to_end()?;
        print!("{}",String::from_utf8_lossy(&buf));
    }
    Ok(())
}

/// Write each disk's CATALOG report to stdout.
pub fn catalog(cmd: &ArgMatches) -> STDRESULT {
    print_meta(cmd,crate::vfs::CATALOG_NAME)
}

/// Write each disk's VTOC report to stdout.
pub fn vtoc(cmd: &ArgMatches) -> STDRESULT {
    print_meta(cmd,crate::vfs::VTOC_NAME)
}

/// Lock a file by creating its lock marker.
pub fn lock(cmd: &ArgMatches) -> STDRESULT {
    let dfs = mount(cmd)?;
    let file = cmd.get_one::<String>("file").expect(RCH);
    dfs.open(&format!("{},locked",file),OpenMode::Create)?;
    Ok(())
}

/// Unlock a file by removing its lock marker.
pub fn unlock(cmd: &ArgMatches) -> STDRESULT {
    let dfs = mount(cmd)?;
    let file = cmd.get_one::<String>("file").expect(RCH);
    dfs.remove(&format!("{},locked",file))
}

/// Tombstone a file.
pub fn delete(cmd: &ArgMatches) -> STDRESULT {
    let dfs = mount(cmd)?;
    let file = cmd.get_one::<String>("file").expect(RCH);
    dfs.remove(file)
}
