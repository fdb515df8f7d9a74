//! # `dskdav` main library
//!
//! This library interprets Apple DOS 3.3 disk images (DSK) and projects
//! them as a browsable, partially writable virtual filesystem, suitable
//! for mounting behind a WebDAV or similar transport.
//!
//! ## Architecture
//!
//! The work is split across three modules:
//! * `img` owns the raw image bytes, does sector addressing, and writes
//!   changes back to the host file
//! * `fs::dos33` interprets the DOS structures: VTOC, catalog chain,
//!   track/sector lists, file entries, and the lock/delete mutations
//! * `vfs` composes loaded disks into a tree of named nodes and exposes
//!   the open/stat/readdir/read/seek/remove contract a transport consumes
//!
//! When a `Disk` is created it takes ownership of a `DiskImage` and uses
//! it as storage; readers share a lock on the image while mutations hold
//! it exclusively.  Mutations are written through to the backing file
//! before they are acknowledged.
//!
//! ## Supported images
//!
//! Raw DOS 3.3 sector dumps of 116480 bytes (13 sector) or 143360 bytes
//! (16 sector), byte-exact, with no header or sidecar.

pub mod img;
pub mod fs;
pub mod vfs;
pub mod commands;

use log::warn;

pub type DYNERR = Box<dyn std::error::Error>;
pub type STDRESULT = Result<(),Box<dyn std::error::Error>>;

const KNOWN_FILE_EXTENSIONS: &str = "dsk,d13,do";

/// Load the disk image at `path` without interpreting the file system.
pub fn load_image(path: &str) -> Result<img::DiskImage,DYNERR> {
    if let Some(ext) = path.split('.').last() {
        if !KNOWN_FILE_EXTENSIONS.contains(&ext.to_lowercase()) {
            warn!("extension of {} is not a usual DSK extension",path);
        }
    }
    img::DiskImage::load(path)
}

/// Given a bytestream return a DOS 3.3 file system, or Err if the
/// bytestream cannot be interpreted as one.
pub fn create_fs_from_bytestream(name: &str,data: Vec<u8>) -> Result<fs::dos33::Disk,DYNERR> {
    let img = img::DiskImage::from_bytes(name,data)?;
    fs::dos33::Disk::from_img(img)
}

/// Calls `load_image` and imposes the DOS 3.3 file system on the result.
pub fn create_fs_from_file(path: &str) -> Result<fs::dos33::Disk,DYNERR> {
    let img = load_image(path)?;
    fs::dos33::Disk::from_img(img)
}
