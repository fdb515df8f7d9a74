//! # DOS 3.3 display module
//!
//! Renders the two reports the projection serves as text files: the
//! CATALOG listing as the user would have seen it at the `]` prompt, and
//! a labeled dump of the VTOC with the free sector map.

use std::fmt::Write;
use super::CatalogEntry;
use super::directory::Vtoc;

/// Render the catalog the way DOS's CATALOG command did: a volume
/// banner, then one line per live file with the lock star, the type
/// letter, the sector count modulo 256, and the name.
pub fn catalog_text(vol: u8,entries: &[CatalogEntry]) -> String {
    let mut ans = String::new();
    write!(ans,"\nDISK VOLUME {}\n\n",vol).expect("formatting failed");
    for entry in entries {
        if entry.is_deleted() {
            continue;
        }
        let lock = match entry.is_locked() {
            true => '*',
            false => ' '
        };
        let letter = match entry.file_type() {
            Some(typ) => typ.to_string(),
            None => "?".to_string()
        };
        write!(ans,"{}{} {:03} {}\n",lock,letter,entry.sectors_used()%256,entry.name().ansi_escaped())
            .expect("formatting failed");
    }
    ans.push('\n');
    ans
}

/// Render the VTOC fields and the free sector map.  In the map a set
/// bitmap bit means the sector is free (`.`), clear means used (`X`);
/// byte +1 of each track's 4 bytes covers sectors 0-7 and byte +0
/// covers sectors 8-15.
pub fn vtoc_text(vtoc: &Vtoc) -> String {
    let mut ans = String::new();
    let bytes_per_sector = u16::from_le_bytes(vtoc.sector_bytes);
    ans += "Volume Table of Contents\n";
    ans += "------------------------\n";
    ans += "\n";
    write!(ans,"  Track of first catalog sector            {:3}  ${:02X}\n",vtoc.catalog_track,vtoc.catalog_track).expect("formatting failed");
    write!(ans,"  Sector of first catalog sector           {:3}  ${:02X}\n",vtoc.catalog_sector,vtoc.catalog_sector).expect("formatting failed");
    write!(ans,"  DOS version used to INIT diskette        {:3}  ${:02X}\n",vtoc.dos_version,vtoc.dos_version).expect("formatting failed");
    write!(ans,"  Diskette volume number                   {:3}  ${:02X}\n",vtoc.volume,vtoc.volume).expect("formatting failed");
    write!(ans,"  Max. Track/Sector pairs in a T/S list    {:3}  ${:02X}\n",vtoc.pairs_per_tslist,vtoc.pairs_per_tslist).expect("formatting failed");
    write!(ans,"  Last track where sectors were allocated  {:3}  ${:02X}\n",vtoc.alloc_track,vtoc.alloc_track).expect("formatting failed");
    write!(ans,"  Direction of track allocation(+1 or -1)  {:+3}  ${:02X}\n",vtoc.alloc_direction as i8,vtoc.alloc_direction).expect("formatting failed");
    write!(ans,"  Tracks per diskette (normally 35)        {:3}  ${:02X}\n",vtoc.num_tracks,vtoc.num_tracks).expect("formatting failed");
    write!(ans,"  Sectors per track (13 or 16)             {:3}  ${:02X}\n",vtoc.sectors_per_track,vtoc.sectors_per_track).expect("formatting failed");
    write!(ans,"  Bytes per sector                       {:5}  ${:02X}{:02X}\n",bytes_per_sector,vtoc.sector_bytes[1],vtoc.sector_bytes[0]).expect("formatting failed");
    ans += "\n";
    ans += "  Track  Sector (X = used, . = free)\n";
    ans += "        ";
    let cols = match vtoc.sectors_per_track as usize {
        n if n > 16 => 16,
        n => n
    };
    for col in 0..cols {
        write!(ans," {:X}",col).expect("formatting failed");
        if col==7 {
            ans.push(' ');
        }
    }
    ans.push('\n');
    for track in 0..vtoc.num_tracks as usize {
        let map = &vtoc.free_map[track*4..track*4+4];
        write!(ans," {:2} ${:02X} ",track,track).expect("formatting failed");
        for bit in 0..8 {
            match map[1] & (1<<bit) {
                0 => ans += " X",
                _ => ans += " ."
            }
        }
        ans.push(' ');
        for bit in 0..cols.saturating_sub(8) {
            match map[0] & (1<<bit) {
                0 => ans += " X",
                _ => ans += " ."
            }
        }
        ans.push('\n');
    }
    ans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::DiskStruct;

    #[test]
    fn free_map_row() {
        let mut vtoc = Vtoc::new();
        vtoc.volume = 254;
        vtoc.num_tracks = 1;
        vtoc.sectors_per_track = 16;
        vtoc.sector_bytes = [0,1];
        // sectors 0-7 free, 8-15 used
        vtoc.free_map[0] = 0x00;
        vtoc.free_map[1] = 0xff;
        let report = vtoc_text(&vtoc);
        assert!(report.contains("  0 $00  . . . . . . . .  X X X X X X X X"));
    }

    #[test]
    fn column_header_splits_after_eight() {
        let mut vtoc = Vtoc::new();
        vtoc.num_tracks = 1;
        vtoc.sectors_per_track = 16;
        let report = vtoc_text(&vtoc);
        assert!(report.contains(" 0 1 2 3 4 5 6 7  8 9 A B C D E F\n"));
    }
}
