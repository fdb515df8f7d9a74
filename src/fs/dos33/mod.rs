//! # DOS 3.3 file system module
//!
//! This interprets the structures a DOS 3.3 volume keeps on disk: the
//! VTOC locates the catalog, the catalog chain yields file entries, and
//! each entry's track/sector list chain yields the file's data sectors.
//!
//! The walkers never trust a chain byte: every hop is bounds-checked and
//! run through a visited set sized by the sector count, so a damaged
//! image terminates instead of looping.  A bad chain in the catalog
//! truncates the listing with a warning; a bad chain under a file read is
//! an error the caller sees.
//!
//! Writes are limited to what DOS allowed without reallocating anything:
//! toggling the lock bit and tombstoning an entry.  Both flip bytes in
//! the owned image and push the whole image back to the host before they
//! acknowledge.

pub mod types;
pub mod directory;
pub mod display;

use std::collections::HashSet;
use std::sync::RwLock;
use chrono::{DateTime,Utc};
use log::{debug,warn};
use types::*;
use directory::*;
use crate::img::{DiskImage,SECTOR_SIZE};
use crate::fs::{Error,DiskStruct};
use crate::DYNERR;

const LOCK_MSG: &str = "disk image lock poisoned";

/// An owned snapshot of one 35-byte file descriptive entry, remembering
/// the catalog sector and slot it came from so mutations can find it
/// again.
#[derive(Clone,Debug)]
pub struct CatalogEntry {
    raw: [u8;35],
    dir_ts: [u8;2],
    slot: usize
}

impl CatalogEntry {
    pub fn is_deleted(&self) -> bool {
        self.raw[0x00] == 0xff
    }
    pub fn is_locked(&self) -> bool {
        self.raw[0x02] & 0x80 != 0
    }
    /// The raw type-and-flags byte, lock bit included.
    pub fn type_code(&self) -> u8 {
        self.raw[0x02]
    }
    pub fn file_type(&self) -> Option<FileType> {
        FileType::from_code(self.raw[0x02])
    }
    /// The filename.  For a tombstone the last name byte holds the
    /// rescued track number, so only 29 bytes of name remain.
    pub fn name(&self) -> Filename {
        let size = match self.is_deleted() {
            true => 29,
            false => 30
        };
        Filename::from_raw(&self.raw[0x03..0x03+size])
    }
    /// Sectors used by the file, track/sector list included.
    pub fn sectors_used(&self) -> u16 {
        u16::from_le_bytes([self.raw[0x21],self.raw[0x22]])
    }
    /// Track and sector of the first track/sector list.  For a tombstone
    /// the track comes from the rescue byte at the end of the name.
    pub fn first_tslist(&self) -> [u8;2] {
        match self.is_deleted() {
            true => [self.raw[0x20],self.raw[0x01]],
            false => [self.raw[0x00],self.raw[0x01]]
        }
    }
    pub fn raw(&self) -> &[u8;35] {
        &self.raw
    }
}

/// The primary interface to one DOS 3.3 volume.  Owns the disk image;
/// readers share the lock, mutations take it exclusively, so concurrent
/// request handlers stay consistent.
pub struct Disk {
    name: String,
    mod_time: DateTime<Utc>,
    read_only: bool,
    img: RwLock<DiskImage>
}

impl Disk {
    /// Take ownership of an image and verify it actually holds a DOS 3.3
    /// volume: the VTOC geometry must agree with the image size and the
    /// volume and catalog pointer must be in range.
    pub fn from_img(img: DiskImage) -> Result<Self,DYNERR> {
        let vtoc = Vtoc::from_bytes(img.vtoc_sector());
        if vtoc.sectors_per_track != img.sectors_per_track() {
            return Err(Box::new(Error::CorruptImage(format!(
                "VTOC sector count {} does not match image geometry {}",vtoc.sectors_per_track,img.sectors_per_track()))));
        }
        if vtoc.num_tracks as usize != img.track_count() {
            return Err(Box::new(Error::CorruptImage(format!(
                "VTOC track count {} does not match image geometry {}",vtoc.num_tracks,img.track_count()))));
        }
        if vtoc.volume < 1 || vtoc.volume > 254 {
            return Err(Box::new(Error::CorruptImage(format!("volume {} out of range",vtoc.volume))));
        }
        if vtoc.sector_bytes != [0,1] {
            return Err(Box::new(Error::CorruptImage("VTOC bytes per sector field".to_string())));
        }
        if !img.contains_sector(vtoc.catalog_track,vtoc.catalog_sector) {
            return Err(Box::new(Error::CorruptImage(format!(
                "catalog pointer track {} sector {} out of range",vtoc.catalog_track,vtoc.catalog_sector))));
        }
        debug!("DOS 3.3 volume {} on {}",vtoc.volume,img.name());
        Ok(Self {
            name: img.name().to_string(),
            mod_time: img.mod_time(),
            read_only: img.is_read_only(),
            img: RwLock::new(img)
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
    /// Byte-exact copy of the underlying image, e.g. for serializing the
    /// volume elsewhere.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.img.read().expect(LOCK_MSG).to_bytes()
    }
    /// Snapshot of the parsed VTOC.
    pub fn vtoc(&self) -> Vtoc {
        let img = self.img.read().expect(LOCK_MSG);
        Vtoc::from_bytes(img.vtoc_sector())
    }
    pub fn volume(&self) -> u8 {
        self.vtoc().volume
    }
    /// All file entries in on-disk order, tombstones included, never-used
    /// slots skipped.  A malformed chain ends the listing with a warning
    /// rather than an error so a damaged disk still shows what it can.
    pub fn catalog(&self) -> Result<Vec<CatalogEntry>,DYNERR> {
        let img = self.img.read().expect(LOCK_MSG);
        let vtoc = Vtoc::from_bytes(img.vtoc_sector());
        let mut entries: Vec<CatalogEntry> = Vec::new();
        let mut visited: HashSet<[u8;2]> = HashSet::new();
        let mut ts = [vtoc.catalog_track,vtoc.catalog_sector];
        while ts[0] != 0 {
            if ts == [VTOC_TRACK,0] {
                warn!("catalog chain of {} runs into the VTOC sector",self.name);
                break;
            }
            if !img.contains_sector(ts[0],ts[1]) {
                warn!("catalog chain of {} leaves the disk at track {} sector {}",self.name,ts[0],ts[1]);
                break;
            }
            if !visited.insert(ts) {
                warn!("catalog chain of {} has a cycle at track {} sector {}",self.name,ts[0],ts[1]);
                break;
            }
            let dir = DirectorySector::from_bytes(img.raw_sector(ts[0],ts[1]));
            for (slot,entry) in dir.entries.iter().enumerate() {
                if entry.tslist_track == 0 {
                    continue;
                }
                let mut raw = [0;35];
                raw.copy_from_slice(&entry.to_bytes());
                entries.push(CatalogEntry { raw, dir_ts: ts, slot });
            }
            ts = [dir.link_track,dir.link_sector];
        }
        Ok(entries)
    }
    /// The file's data sectors in walk order as (logical index, bytes)
    /// pairs.  A (0,0) slot is a sparse hole, yielded as a zero sector
    /// and counted in the index, unless nothing after it in the current
    /// list is allocated, in which case it ends the data.  The on-disk
    /// entry cannot say which access mode the file used, so this
    /// look-ahead stands in for that knowledge.
    pub fn data_sectors(&self,entry: &CatalogEntry) -> Result<Vec<(usize,Vec<u8>)>,DYNERR> {
        let img = self.img.read().expect(LOCK_MSG);
        let mut ans: Vec<(usize,Vec<u8>)> = Vec::new();
        let mut visited: HashSet<[u8;2]> = HashSet::new();
        let mut index: usize = 0;
        let mut ts = entry.first_tslist();
        while ts[0] != 0 {
            if !img.contains_sector(ts[0],ts[1]) {
                return Err(Box::new(Error::CorruptImage(format!(
                    "track/sector list leaves the disk at track {} sector {}",ts[0],ts[1]))));
            }
            if !visited.insert(ts) {
                return Err(Box::new(Error::CorruptImage(format!(
                    "track/sector list has a cycle at track {} sector {}",ts[0],ts[1]))));
            }
            let tslist = TrackSectorList::from_bytes(img.raw_sector(ts[0],ts[1]));
            for p in 0..TSLIST_PAIRS {
                let dt = tslist.data_pairs[p*2];
                let ds = tslist.data_pairs[p*2+1];
                if dt == 0 {
                    let any_later = tslist.data_pairs[p*2..].chunks(2).any(|pair| pair[0] != 0);
                    if !any_later {
                        return Ok(ans);
                    }
                    ans.push((index,vec![0;SECTOR_SIZE]));
                    index += 1;
                    continue;
                }
                if !img.contains_sector(dt,ds) {
                    return Err(Box::new(Error::CorruptImage(format!(
                        "data sector out of range at track {} sector {}",dt,ds))));
                }
                ans.push((index,img.raw_sector(dt,ds).to_vec()));
                index += 1;
            }
            ts = [tslist.link_track,tslist.link_sector];
        }
        Ok(ans)
    }
    /// Reconstruct the file's bytes.  Binary and relocatable files start
    /// with a 4-byte header giving the load address and payload length;
    /// the header is kept and exactly that many payload bytes follow.
    /// Every other type is the raw sectors in walk order; trimming text
    /// at its terminator is left to interested callers.
    pub fn read_all(&self,entry: &CatalogEntry) -> Result<Vec<u8>,DYNERR> {
        let with_header = match entry.file_type() {
            Some(typ) => typ.uses_header(),
            None => {
                warn!("unknown file type ${:02X}, reading raw",entry.type_code() & 0x7f);
                false
            }
        };
        let sectors = self.data_sectors(entry)?;
        let mut ans: Vec<u8> = Vec::new();
        if with_header {
            let mut iter = sectors.into_iter();
            let first = match iter.next() {
                Some((_,data)) => data,
                None => return Ok(ans)
            };
            let address = u16::from_le_bytes([first[0],first[1]]);
            let length = u16::from_le_bytes([first[2],first[3]]) as usize;
            debug!("{} - address = ${:04X} length = ${:04X}",entry.name().path_safe(),address,length);
            ans.extend_from_slice(&first[0..4]);
            let mut remaining = length;
            let take = usize::min(remaining,first.len()-4);
            ans.extend_from_slice(&first[4..4+take]);
            remaining -= take;
            for (_,data) in iter {
                if remaining == 0 {
                    break;
                }
                let take = usize::min(remaining,data.len());
                ans.extend_from_slice(&data[0..take]);
                remaining -= take;
            }
        } else {
            for (_,data) in sectors {
                ans.extend_from_slice(&data);
            }
        }
        Ok(ans)
    }
    /// Set the lock bit.  Idempotent.
    pub fn lock(&self,entry: &CatalogEntry) -> Result<(),DYNERR> {
        self.modify_entry(entry,|e| e[0x02] |= 0x80)
    }
    /// Clear the lock bit.  Idempotent.
    pub fn unlock(&self,entry: &CatalogEntry) -> Result<(),DYNERR> {
        self.modify_entry(entry,|e| e[0x02] &= 0x7f)
    }
    /// Tombstone the entry the way DOS did: rescue the first list track
    /// into the last name byte and mark the entry 0xff.  The track/sector
    /// list, the data sectors, and the free map are left alone, so the
    /// file stays recoverable.  A locked file will not go, matching DOS;
    /// tombstoning a tombstone would destroy the rescued track, so that
    /// is refused as well.
    pub fn delete(&self,entry: &CatalogEntry) -> Result<(),DYNERR> {
        if entry.is_deleted() {
            return Err(Box::new(Error::Unsupported));
        }
        if entry.is_locked() {
            return Err(Box::new(Error::Locked));
        }
        self.modify_entry(entry,|e| {
            e[0x20] = e[0x00];
            e[0x00] = 0xff;
        })
    }
    /// Apply a byte-level change to the entry's 35 bytes and push it to
    /// the host.  If the host write fails the sector is restored, so the
    /// in-memory image never disagrees with an acknowledged state.
    fn modify_entry<F: Fn(&mut [u8])>(&self,entry: &CatalogEntry,f: F) -> Result<(),DYNERR> {
        if self.read_only {
            return Err(Box::new(Error::ReadOnly));
        }
        let mut img = self.img.write().expect(LOCK_MSG);
        let [t,s] = entry.dir_ts;
        let offset = ENTRY_OFFSETS[entry.slot];
        let sec = img.raw_sector_mut(t,s);
        let prior = sec.to_vec();
        f(&mut sec[offset..offset+35]);
        match img.commit() {
            Ok(()) => Ok(()),
            Err(e) => {
                img.raw_sector_mut(t,s).copy_from_slice(&prior);
                Err(e)
            }
        }
    }
    /// The CATALOG report served as `CATALOG.txt`.
    pub fn catalog_text(&self) -> Result<String,DYNERR> {
        let entries = self.catalog()?;
        Ok(display::catalog_text(self.volume(),&entries))
    }
    /// The VTOC report served as `VTOC.txt`.
    pub fn vtoc_text(&self) -> String {
        display::vtoc_text(&self.vtoc())
    }
}
