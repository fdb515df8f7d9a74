mod fixture;

use assert_cmd::prelude::*; // Add methods on commands
use predicates::prelude::*; // Used for writing assertions
use std::process::Command; // Run programs

fn write_image(dir: &tempfile::TempDir) -> String {
    let path = dir.path().join("mydisk.dsk");
    std::fs::write(&path,fixture::standard_image()).expect("could not write image");
    path.to_str().expect("bad path").to_string()
}

#[test]
fn catalog_prints_the_volume() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = write_image(&dir);
    let mut cmd = Command::cargo_bin("dskdav")?;
    cmd.arg("catalog")
        .arg("-d").arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("DISK VOLUME 254"))
        .stdout(predicate::str::contains(" I 002 HELLO"));
    Ok(())
}

#[test]
fn ls_lists_root_and_disk() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = write_image(&dir);
    let mut cmd = Command::cargo_bin("dskdav")?;
    cmd.arg("ls")
        .arg("-d").arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("README.txt"))
        .stdout(predicate::str::contains("mydisk/"));
    let mut cmd = Command::cargo_bin("dskdav")?;
    cmd.arg("ls")
        .arg("-d").arg(&path)
        .arg("-f").arg("/mydisk")
        .assert()
        .success()
        .stdout(predicate::str::contains("RAWDOS,locked"))
        .stdout(predicate::str::contains("_dos/"));
    Ok(())
}

#[test]
fn get_streams_the_file() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = write_image(&dir);
    let mut cmd = Command::cargo_bin("dskdav")?;
    cmd.arg("get")
        .arg("-d").arg(&path)
        .arg("-f").arg("/mydisk/RAWDOS")
        .assert()
        .success()
        .stdout(predicate::function(|out: &[u8]| {
            out.len()==4+fixture::RAWDOS_LEN as usize && out[0]==0x00 && out[1]==0x1d
        }));
    Ok(())
}

#[test]
fn lock_persists_to_the_image() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = write_image(&dir);
    let mut cmd = Command::cargo_bin("dskdav")?;
    cmd.arg("lock")
        .arg("-d").arg(&path)
        .arg("-f").arg("/mydisk/HELLO")
        .assert()
        .success();
    let mut cmd = Command::cargo_bin("dskdav")?;
    cmd.arg("catalog")
        .arg("-d").arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("*I 002 HELLO"));
    let mut cmd = Command::cargo_bin("dskdav")?;
    cmd.arg("unlock")
        .arg("-d").arg(&path)
        .arg("-f").arg("/mydisk/HELLO")
        .assert()
        .success();
    Ok(())
}

#[test]
fn missing_image_fails() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("dskdav")?;
    cmd.arg("catalog")
        .arg("-d").arg("no-such-disk.dsk")
        .assert()
        .failure();
    Ok(())
}

#[test]
fn missing_file_fails() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = write_image(&dir);
    let mut cmd = Command::cargo_bin("dskdav")?;
    cmd.arg("get")
        .arg("-d").arg(&path)
        .arg("-f").arg("/mydisk/NOPE")
        .assert()
        .failure();
    Ok(())
}
