// test of the DOS 3.3 file system module
mod fixture;

use dskdav::create_fs_from_bytestream;
use dskdav::fs::dos33::Disk;
use dskdav::fs::dos33::types::FileType;

fn standard_disk() -> Disk {
    create_fs_from_bytestream("DISK",fixture::standard_image()).expect("fixture image did not load")
}

fn extended_disk() -> Disk {
    create_fs_from_bytestream("DISK",fixture::extended_image()).expect("fixture image did not load")
}

fn entry_named(disk: &Disk,logical: &str) -> dskdav::fs::dos33::CatalogEntry {
    disk.catalog().expect("catalog walk failed").into_iter()
        .find(|e| e.name().logical()==logical)
        .expect("file not in catalog")
}

#[test]
fn bad_size_is_rejected() {
    match create_fs_from_bytestream("bad",vec![0;1000]) {
        Ok(_) => panic!("accepted an impossible image size"),
        Err(e) => assert!(e.to_string().contains("neither a 13 nor a 16"))
    }
}

#[test]
fn bad_vtoc_is_rejected() {
    let mut buf = fixture::standard_image();
    buf[fixture::sector_offset(17,0)+0x06] = 0; // volume out of range
    match create_fs_from_bytestream("bad",buf) {
        Ok(_) => panic!("accepted a volume of 0"),
        Err(e) => assert!(e.to_string().contains("volume"))
    }
    let mut buf = fixture::standard_image();
    buf[fixture::sector_offset(17,0)+0x35] = 13; // disagrees with image size
    match create_fs_from_bytestream("bad",buf) {
        Ok(_) => panic!("accepted a geometry mismatch"),
        Err(e) => assert!(e.to_string().contains("does not match"))
    }
}

#[test]
fn vtoc_fields() {
    let disk = standard_disk();
    let vtoc = disk.vtoc();
    assert_eq!(vtoc.catalog_track,17);
    assert_eq!(vtoc.catalog_sector,15);
    assert_eq!(vtoc.volume,254);
    assert_eq!(vtoc.pairs_per_tslist,122);
    assert_eq!(vtoc.num_tracks,35);
    assert_eq!(vtoc.sectors_per_track,16);
    assert_eq!(u16::from_le_bytes(vtoc.sector_bytes),256);
    assert_eq!(disk.volume(),254);
}

#[test]
fn catalog_order_and_flags() {
    let disk = extended_disk();
    let entries = disk.catalog().expect("catalog walk failed");
    let names: Vec<String> = entries.iter().map(|e| e.name().path_safe()).collect();
    assert_eq!(names,vec!["HELLO","APPLESOFT","RAWDOS","HELLO","OLDFILE","SPARSE","TSCYCLE"]);
    assert!(!entries[0].is_locked());
    assert!(entries[1].is_locked());
    assert!(entries[2].is_locked());
    assert!(entries[4].is_deleted());
    assert_eq!(entries[0].file_type(),Some(FileType::Integer));
    assert_eq!(entries[2].file_type(),Some(FileType::Binary));
    assert_eq!(entries[1].sectors_used(),43);
}

#[test]
fn inverted_name_round_trip() {
    let disk = extended_disk();
    let entries = disk.catalog().expect("catalog walk failed");
    let inv = &entries[3];
    assert_eq!(inv.name().path_safe(),"HELLO");
    assert!(inv.name().inverted_flags().iter().all(|f| *f));
    // the normal-video twin decodes with no inverted characters
    assert!(entries[0].name().inverted_flags().iter().all(|f| !*f));
}

#[test]
fn read_one_sector_file() {
    let disk = standard_disk();
    let hello = entry_named(&disk,"HELLO");
    let data = disk.read_all(&hello).expect("read failed");
    assert_eq!(data.len(),256);
    assert_eq!(data[0],0x40);
    assert_eq!(data[255],0x40u8.wrapping_add(255));
}

#[test]
fn read_chained_file() {
    let disk = standard_disk();
    let aps = entry_named(&disk,"APPLESOFT");
    let sectors = disk.data_sectors(&aps).expect("walk failed");
    assert_eq!(sectors.len(),42);
    assert_eq!(sectors[0].0,0);
    assert_eq!(sectors[41].0,41);
    // first data sector is track 19 sector 1, seeded with 1
    assert_eq!(sectors[0].1[0],1);
    // last data sector is track 21 sector 10, seeded with 0x6a
    assert_eq!(sectors[41].1[0],0x6a);
    let data = disk.read_all(&aps).expect("read failed");
    assert_eq!(data.len(),42*256);
}

#[test]
fn binary_header_is_preserved() {
    let disk = standard_disk();
    let rawdos = entry_named(&disk,"RAWDOS");
    let data = disk.read_all(&rawdos).expect("read failed");
    assert_eq!(u16::from_le_bytes([data[0],data[1]]),fixture::RAWDOS_ADDR);
    assert_eq!(u16::from_le_bytes([data[2],data[3]]),fixture::RAWDOS_LEN);
    assert_eq!(data.len(),4 + fixture::RAWDOS_LEN as usize);
    assert!(data.len() <= rawdos.sectors_used() as usize * 256);
}

#[test]
fn sparse_holes_are_zero_filled() {
    let disk = extended_disk();
    let sparse = entry_named(&disk,"SPARSE");
    let sectors = disk.data_sectors(&sparse).expect("walk failed");
    assert_eq!(sectors.len(),3);
    assert_eq!(sectors[1].0,1);
    assert!(sectors[1].1.iter().all(|b| *b==0));
    assert_eq!(sectors[2].1[0],2);
    let data = disk.read_all(&sparse).expect("read failed");
    assert_eq!(data.len(),3*256);
}

#[test]
fn tslist_cycle_is_an_error() {
    let disk = extended_disk();
    let cyc = entry_named(&disk,"TSCYCLE");
    match disk.read_all(&cyc) {
        Ok(_) => panic!("read through a cyclic track/sector list"),
        Err(e) => assert!(e.to_string().contains("cycle"))
    }
}

#[test]
fn catalog_cycle_truncates_listing() {
    let disk = create_fs_from_bytestream("DISK",fixture::cyclic_catalog_image())
        .expect("fixture image did not load");
    let entries = disk.catalog().expect("catalog walk should truncate, not fail");
    assert_eq!(entries.len(),3);
}

#[test]
fn lock_then_unlock_is_byte_exact() {
    let disk = standard_disk();
    let before = disk.to_bytes();
    let hello = entry_named(&disk,"HELLO");
    disk.lock(&hello).expect("lock failed");
    let during = disk.to_bytes();
    let flag_offset = fixture::sector_offset(17,15) + 0x0b + 0x02;
    assert_eq!(during[flag_offset],0x81);
    let diffs = before.iter().zip(during.iter()).filter(|(a,b)| a!=b).count();
    assert_eq!(diffs,1);
    assert!(entry_named(&disk,"HELLO").is_locked());
    disk.unlock(&hello).expect("unlock failed");
    assert_eq!(before,disk.to_bytes());
}

#[test]
fn lock_is_idempotent() {
    let disk = standard_disk();
    let aps = entry_named(&disk,"APPLESOFT");
    let before = disk.to_bytes();
    disk.lock(&aps).expect("lock failed");
    assert_eq!(before,disk.to_bytes());
}

#[test]
fn delete_leaves_a_recoverable_tombstone() {
    let disk = standard_disk();
    let hello = entry_named(&disk,"HELLO");
    let original = disk.read_all(&hello).expect("read failed");
    disk.delete(&hello).expect("delete failed");
    let tomb = entry_named(&disk,"HELLO");
    assert!(tomb.is_deleted());
    assert_eq!(tomb.raw()[0x00],0xff);
    assert_eq!(tomb.raw()[0x20],18); // rescued first-list track
    assert_eq!(tomb.first_tslist(),[18,0]);
    // the data is still there
    assert_eq!(disk.read_all(&tomb).expect("read failed"),original);
    // a second delete would destroy the rescued track
    match disk.delete(&tomb) {
        Ok(_) => panic!("tombstoned a tombstone"),
        Err(e) => assert_eq!(e.to_string(),"OPERATION NOT SUPPORTED")
    }
}

#[test]
fn locked_files_do_not_delete() {
    let disk = standard_disk();
    let rawdos = entry_named(&disk,"RAWDOS");
    match disk.delete(&rawdos) {
        Ok(_) => panic!("deleted a locked file"),
        Err(e) => assert_eq!(e.to_string(),"FILE LOCKED")
    }
}

#[test]
fn catalog_report() {
    let disk = extended_disk();
    let report = disk.catalog_text().expect("render failed");
    assert!(report.starts_with("\nDISK VOLUME 254\n\n"));
    assert!(report.contains("\n I 002 HELLO\n"));
    assert!(report.contains("\n*I 043 APPLESOFT\n"));
    assert!(report.contains("\n*B 039 RAWDOS\n"));
    // tombstones are not listed
    assert!(!report.contains("OLDFILE"));
    assert!(report.ends_with("\n\n"));
}

#[test]
fn vtoc_report() {
    let disk = standard_disk();
    let report = disk.vtoc_text();
    assert!(report.starts_with("Volume Table of Contents\n"));
    assert!(report.contains("Diskette volume number                   254  $FE"));
    assert!(report.contains("Tracks per diskette (normally 35)         35  $23"));
    assert!(report.contains("Sectors per track (13 or 16)              16  $10"));
    // track 3 is free, track 17 is the catalog
    assert!(report.contains("  3 $03  . . . . . . . .  . . . . . . . ."));
    assert!(report.contains(" 17 $11  X X X X X X X X  X X X X X X X X"));
}

#[test]
fn read_only_image_refuses_mutation() {
    let dir = tempfile::tempdir().expect("no temp dir");
    let path = dir.path().join("protected.dsk");
    std::fs::write(&path,fixture::standard_image()).expect("could not write image");
    let mut perms = std::fs::metadata(&path).expect("no metadata").permissions();
    perms.set_readonly(true);
    std::fs::set_permissions(&path,perms).expect("could not set permissions");
    let disk = dskdav::create_fs_from_file(path.to_str().expect("bad path")).expect("load failed");
    if !disk.is_read_only() {
        // a privileged process can open the file for writing anyway
        return;
    }
    let hello = entry_named(&disk,"HELLO");
    match disk.lock(&hello) {
        Ok(_) => panic!("mutated a read-only image"),
        Err(e) => assert_eq!(e.to_string(),"WRITE PROTECTED")
    }
}

#[test]
fn mutations_write_through_to_the_host() {
    let dir = tempfile::tempdir().expect("no temp dir");
    let path = dir.path().join("mutable.dsk");
    std::fs::write(&path,fixture::standard_image()).expect("could not write image");
    let disk = dskdav::create_fs_from_file(path.to_str().expect("bad path")).expect("load failed");
    let hello = entry_named(&disk,"HELLO");
    disk.lock(&hello).expect("lock failed");
    let on_host = std::fs::read(&path).expect("could not read image back");
    assert_eq!(on_host.len(),fixture::DSK_SIZE);
    assert_eq!(on_host[fixture::sector_offset(17,15)+0x0b+0x02],0x81);
}
