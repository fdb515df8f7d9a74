//! # Disk Image Module
//!
//! This owns the raw bytes of a DSK image.  A DSK is a flat dump of the
//! already-decoded sector data, so all this module has to do is size
//! verification, sector addressing, and writing changes back to the host.
//! Interpreting the DOS 3.3 structures found inside the sectors is left
//! to the `fs` module.
//!
//! Two layouts are recognized, distinguished by total size alone:
//! 35 tracks of 13 sectors (116480 bytes) or 35 tracks of 16 sectors
//! (143360 bytes).  Anything else is rejected at load time.

use std::io::{Read,Write};
use std::path::{Path,PathBuf};
use chrono::{DateTime,Utc};
use log::{debug,info,warn};
use crate::DYNERR;

/// Bytes in a DOS sector.
pub const SECTOR_SIZE: usize = 256;

const D13_SIZE: usize = 116480;
const D13_VTOC: usize = 0xdd00;
const DSK_SIZE: usize = 143360;
const DSK_VTOC: usize = 0x11000;

/// Enumerates disk image errors.
#[derive(thiserror::Error,Debug)]
pub enum Error {
    #[error("image size {0} is neither a 13 nor a 16 sector DOS volume")]
    UnsupportedImageSize(usize),
    #[error("image is read-only")]
    ReadOnlyImage
}

/// In-memory copy of one DSK image.  The buffer is the single source of
/// truth while the image is loaded; mutations land here first and are made
/// permanent with `commit`.
pub struct DiskImage {
    path: Option<PathBuf>,
    name: String,
    data: Vec<u8>,
    mod_time: DateTime<Utc>,
    read_only: bool,
    vtoc_offset: usize,
    sectors: u8
}

/// Map an image size onto the VTOC offset and sector count, or fail.
fn geometry(size: usize) -> Result<(usize,u8),Error> {
    match size {
        D13_SIZE => Ok((D13_VTOC,13)),
        DSK_SIZE => Ok((DSK_VTOC,16)),
        bad => Err(Error::UnsupportedImageSize(bad))
    }
}

/// Open a file read-write, falling back to read-only when the host denies
/// write permission.
fn try_open_rw(path: &Path) -> Result<(std::fs::File,bool),std::io::Error> {
    match std::fs::OpenOptions::new().read(true).write(true).open(path) {
        Ok(f) => Ok((f,false)),
        Err(e) if e.kind()==std::io::ErrorKind::PermissionDenied => {
            warn!("no write permission for {}, falling back to read-only",path.display());
            Ok((std::fs::File::open(path)?,true))
        },
        Err(e) => Err(e)
    }
}

impl DiskImage {
    /// Load the image at `path`.  The display name is the basename without
    /// its extension.  The host modification time is snapshotted here and
    /// reported unchanged for the life of the image.
    pub fn load(path: &str) -> Result<Self,DYNERR> {
        let p = Path::new(path);
        let (mut file,read_only) = try_open_rw(p)?;
        let meta = file.metadata()?;
        let mod_time: DateTime<Utc> = meta.modified()?.into();
        let mut data: Vec<u8> = Vec::new();
        file.read_to_end(&mut data)?;
        let (vtoc_offset,sectors) = geometry(data.len())?;
        let stem = match p.file_stem() {
            Some(s) => s.to_string_lossy().to_string(),
            None => path.to_string()
        };
        info!("loaded {} ({} bytes, {} sectors per track)",stem,data.len(),sectors);
        Ok(Self {
            path: Some(p.to_path_buf()),
            name: stem,
            data,
            mod_time,
            read_only,
            vtoc_offset,
            sectors
        })
    }
    /// Wrap an in-memory buffer, e.g. from a pipe or a test.  Such images
    /// accept mutations but `commit` has nowhere to write them.
    pub fn from_bytes(name: &str,data: Vec<u8>) -> Result<Self,DYNERR> {
        let (vtoc_offset,sectors) = geometry(data.len())?;
        Ok(Self {
            path: None,
            name: name.to_string(),
            data,
            mod_time: Utc::now(),
            read_only: false,
            vtoc_offset,
            sectors
        })
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn mod_time(&self) -> DateTime<Utc> {
        self.mod_time
    }
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }
    pub fn byte_capacity(&self) -> usize {
        self.data.len()
    }
    pub fn track_count(&self) -> usize {
        self.data.len() / (self.sectors as usize * SECTOR_SIZE)
    }
    pub fn sectors_per_track(&self) -> u8 {
        self.sectors
    }
    /// The 256 bytes of the volume table of contents.
    pub fn vtoc_sector(&self) -> &[u8] {
        &self.data[self.vtoc_offset..self.vtoc_offset+SECTOR_SIZE]
    }
    fn sector_offset(&self,track: u8,sector: u8) -> usize {
        if track as usize >= self.track_count() || sector >= self.sectors {
            panic!("sector access outside disk bounds: track {} sector {}",track,sector);
        }
        (track as usize * self.sectors as usize + sector as usize) * SECTOR_SIZE
    }
    /// Borrow a sector.  Out of range track or sector panics; callers walk
    /// structures that were bounds-checked when followed.
    pub fn raw_sector(&self,track: u8,sector: u8) -> &[u8] {
        let offset = self.sector_offset(track,sector);
        &self.data[offset..offset+SECTOR_SIZE]
    }
    /// Mutable counterpart of `raw_sector`.  This does not check the
    /// read-only flag; that belongs to the layer deciding to mutate.
    pub fn raw_sector_mut(&mut self,track: u8,sector: u8) -> &mut [u8] {
        let offset = self.sector_offset(track,sector);
        &mut self.data[offset..offset+SECTOR_SIZE]
    }
    /// Copy of the whole image, byte-exact with what `commit` would
    /// write.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.data.clone()
    }
    /// True when the track and sector address a sector inside the image.
    pub fn contains_sector(&self,track: u8,sector: u8) -> bool {
        (track as usize) < self.track_count() && sector < self.sectors
    }
    /// Make the buffer permanent.  The whole image is rewritten and synced
    /// before this returns, so an acknowledged mutation survives the
    /// process.  In-memory images commit to nothing and report success.
    pub fn commit(&mut self) -> Result<(),DYNERR> {
        if self.read_only {
            return Err(Box::new(Error::ReadOnlyImage));
        }
        let path = match &self.path {
            Some(p) => p.clone(),
            None => {
                debug!("image {} has no backing file, commit is a no-op",self.name);
                return Ok(());
            }
        };
        let mut file = std::fs::OpenOptions::new().write(true).open(&path)?;
        file.write_all(&self.data)?;
        file.sync_all()?;
        debug!("committed {} bytes to {}",self.data.len(),path.display());
        Ok(())
    }
}
