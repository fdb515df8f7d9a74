//! # DOS 3.3 directory structures
//!
//! Byte-exact mirrors of the structures DOS keeps on disk: the volume
//! table of contents, the catalog sectors with their seven file entries,
//! and the track/sector lists.  All are fixed length, so the `DiskStruct`
//! impls are plain sequential packing; the `unused` fields keep the
//! offsets honest.

use crate::fs::DiskStruct;

/// Volume Table of Contents, always on the catalog track at sector 0.
/// The free map allocates 4 bytes per track for up to 35 tracks.
pub struct Vtoc {
    pub unused0: u8,
    pub catalog_track: u8,
    pub catalog_sector: u8,
    pub dos_version: u8,
    pub unused1: [u8;2],
    pub volume: u8,
    pub unused2: [u8;32],
    pub pairs_per_tslist: u8,
    pub unused3: [u8;8],
    pub alloc_track: u8,
    pub alloc_direction: u8,
    pub unused4: [u8;2],
    pub num_tracks: u8,
    pub sectors_per_track: u8,
    pub sector_bytes: [u8;2],
    pub free_map: [u8;140]
}

impl DiskStruct for Vtoc {
    fn new() -> Self {
        Self {
            unused0: 0,
            catalog_track: 0,
            catalog_sector: 0,
            dos_version: 0,
            unused1: [0;2],
            volume: 0,
            unused2: [0;32],
            pairs_per_tslist: 0,
            unused3: [0;8],
            alloc_track: 0,
            alloc_direction: 0,
            unused4: [0;2],
            num_tracks: 0,
            sectors_per_track: 0,
            sector_bytes: [0;2],
            free_map: [0;140]
        }
    }
    fn from_bytes(bytes: &[u8]) -> Self {
        let mut ans = Self::new();
        ans.unused0 = bytes[0x00];
        ans.catalog_track = bytes[0x01];
        ans.catalog_sector = bytes[0x02];
        ans.dos_version = bytes[0x03];
        ans.unused1.copy_from_slice(&bytes[0x04..0x06]);
        ans.volume = bytes[0x06];
        ans.unused2.copy_from_slice(&bytes[0x07..0x27]);
        ans.pairs_per_tslist = bytes[0x27];
        ans.unused3.copy_from_slice(&bytes[0x28..0x30]);
        ans.alloc_track = bytes[0x30];
        ans.alloc_direction = bytes[0x31];
        ans.unused4.copy_from_slice(&bytes[0x32..0x34]);
        ans.num_tracks = bytes[0x34];
        ans.sectors_per_track = bytes[0x35];
        ans.sector_bytes.copy_from_slice(&bytes[0x36..0x38]);
        ans.free_map.copy_from_slice(&bytes[0x38..0xc4]);
        ans
    }
    fn to_bytes(&self) -> Vec<u8> {
        let mut ans: Vec<u8> = Vec::new();
        ans.push(self.unused0);
        ans.push(self.catalog_track);
        ans.push(self.catalog_sector);
        ans.push(self.dos_version);
        ans.extend_from_slice(&self.unused1);
        ans.push(self.volume);
        ans.extend_from_slice(&self.unused2);
        ans.push(self.pairs_per_tslist);
        ans.extend_from_slice(&self.unused3);
        ans.push(self.alloc_track);
        ans.push(self.alloc_direction);
        ans.extend_from_slice(&self.unused4);
        ans.push(self.num_tracks);
        ans.push(self.sectors_per_track);
        ans.extend_from_slice(&self.sector_bytes);
        ans.extend_from_slice(&self.free_map);
        ans
    }
    fn len(&self) -> usize {
        196
    }
}

/// One 35-byte file descriptive entry.  An entry with `tslist_track` 0
/// has never been used; 0xff marks a deleted file, whose original track
/// is rescued into the last filename byte.
pub struct DirectoryEntry {
    pub tslist_track: u8,
    pub tslist_sector: u8,
    pub type_and_flags: u8,
    pub filename: [u8;30],
    pub sector_count: [u8;2]
}

impl DiskStruct for DirectoryEntry {
    fn new() -> Self {
        Self {
            tslist_track: 0,
            tslist_sector: 0,
            type_and_flags: 0,
            filename: [0;30],
            sector_count: [0;2]
        }
    }
    fn from_bytes(bytes: &[u8]) -> Self {
        let mut ans = Self::new();
        ans.tslist_track = bytes[0x00];
        ans.tslist_sector = bytes[0x01];
        ans.type_and_flags = bytes[0x02];
        ans.filename.copy_from_slice(&bytes[0x03..0x21]);
        ans.sector_count.copy_from_slice(&bytes[0x21..0x23]);
        ans
    }
    fn to_bytes(&self) -> Vec<u8> {
        let mut ans: Vec<u8> = Vec::new();
        ans.push(self.tslist_track);
        ans.push(self.tslist_sector);
        ans.push(self.type_and_flags);
        ans.extend_from_slice(&self.filename);
        ans.extend_from_slice(&self.sector_count);
        ans
    }
    fn len(&self) -> usize {
        35
    }
}

/// One catalog sector: a link to the next catalog sector and up to seven
/// file entries.
pub struct DirectorySector {
    pub unused0: u8,
    pub link_track: u8,
    pub link_sector: u8,
    pub unused1: [u8;8],
    pub entries: [DirectoryEntry;7]
}

impl DiskStruct for DirectorySector {
    fn new() -> Self {
        Self {
            unused0: 0,
            link_track: 0,
            link_sector: 0,
            unused1: [0;8],
            entries: [
                DirectoryEntry::new(),
                DirectoryEntry::new(),
                DirectoryEntry::new(),
                DirectoryEntry::new(),
                DirectoryEntry::new(),
                DirectoryEntry::new(),
                DirectoryEntry::new()
            ]
        }
    }
    fn from_bytes(bytes: &[u8]) -> Self {
        let mut ans = Self::new();
        ans.unused0 = bytes[0];
        ans.link_track = bytes[1];
        ans.link_sector = bytes[2];
        ans.unused1.copy_from_slice(&bytes[3..11]);
        let mut offset = 11;
        for i in 0..7 {
            ans.entries[i] = DirectoryEntry::from_bytes(&bytes[offset..offset+35]);
            offset += 35;
        }
        ans
    }
    fn to_bytes(&self) -> Vec<u8> {
        let mut ans: Vec<u8> = Vec::new();
        ans.push(self.unused0);
        ans.push(self.link_track);
        ans.push(self.link_sector);
        ans.extend_from_slice(&self.unused1);
        for i in 0..7 {
            ans.append(&mut self.entries[i].to_bytes());
        }
        ans
    }
    fn len(&self) -> usize {
        256
    }
}

/// One track/sector list sector: a link to the next list and 122 data
/// sector pairs.
pub struct TrackSectorList {
    pub unused0: u8,
    pub link_track: u8,
    pub link_sector: u8,
    pub unused1: [u8;2],
    pub first_sector_offset: [u8;2],
    pub unused2: [u8;5],
    pub data_pairs: [u8;244]
}

impl DiskStruct for TrackSectorList {
    fn new() -> Self {
        Self {
            unused0: 0,
            link_track: 0,
            link_sector: 0,
            unused1: [0;2],
            first_sector_offset: [0;2],
            unused2: [0;5],
            data_pairs: [0;244]
        }
    }
    fn from_bytes(bytes: &[u8]) -> Self {
        let mut ans = Self::new();
        ans.unused0 = bytes[0x00];
        ans.link_track = bytes[0x01];
        ans.link_sector = bytes[0x02];
        ans.unused1.copy_from_slice(&bytes[0x03..0x05]);
        ans.first_sector_offset.copy_from_slice(&bytes[0x05..0x07]);
        ans.unused2.copy_from_slice(&bytes[0x07..0x0c]);
        ans.data_pairs.copy_from_slice(&bytes[0x0c..0x100]);
        ans
    }
    fn to_bytes(&self) -> Vec<u8> {
        let mut ans: Vec<u8> = Vec::new();
        ans.push(self.unused0);
        ans.push(self.link_track);
        ans.push(self.link_sector);
        ans.extend_from_slice(&self.unused1);
        ans.extend_from_slice(&self.first_sector_offset);
        ans.extend_from_slice(&self.unused2);
        ans.extend_from_slice(&self.data_pairs);
        ans
    }
    fn len(&self) -> usize {
        256
    }
}
