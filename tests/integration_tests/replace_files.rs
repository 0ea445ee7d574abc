use std::{fs, path::Path};

use isosplice::{Error, PatchOptions, Replacement, WriteMode, patch_iso_file};
use tempfile::tempdir;

use super::common::{ISO_SECTOR_SIZE, pvd_total_sectors, read_iso_file, write_test_iso};

fn big() -> Vec<u8> {
    (0..3000u32).map(|i| (i % 251) as u8).collect()
}

fn tail() -> Vec<u8> {
    vec![0x5a; 100]
}

/// README at 22, DATA/BIG.BIN at 23-24, DATA/TAIL.BIN at 25.
fn sample_iso(path: &Path) {
    let big = big();
    let tail = tail();
    write_test_iso(
        path,
        &[
            ("/README.TXT", &b"hello"[..]),
            ("/DATA/BIG.BIN", big.as_slice()),
            ("/DATA/TAIL.BIN", tail.as_slice()),
        ],
    )
    .unwrap();
}

fn replacement(image_path: &str, source: &Path) -> Replacement {
    Replacement {
        image_path: image_path.to_string(),
        source: source.to_path_buf(),
    }
}

#[test]
fn test_same_sector_count_keeps_image_size() -> Result<(), Error> {
    let dir = tempdir().unwrap();
    let iso_path = dir.path().join("game.iso");
    sample_iso(&iso_path);
    let new_readme = dir.path().join("readme.txt");
    fs::write(&new_readme, b"a longer readme that still fits one sector").unwrap();

    let report = patch_iso_file(
        &iso_path,
        &[replacement("/README.TXT", &new_readme)],
        &PatchOptions::default(),
    )?;

    assert_eq!(report.byte_delta, 0);
    assert!(!report.needs_cuesheet_update);
    assert_eq!(report.files.len(), 1);
    assert_eq!(report.files[0].sector_delta, 0);
    assert_eq!(report.files[0].old_size, 5);

    let iso = fs::read(&iso_path).unwrap();
    assert_eq!(iso.len(), 26 * ISO_SECTOR_SIZE);
    assert_eq!(pvd_total_sectors(&iso), 26);
    assert_eq!(
        read_iso_file(&iso, "/README.TXT").unwrap(),
        b"a longer readme that still fits one sector"
    );
    assert_eq!(read_iso_file(&iso, "/DATA/BIG.BIN").unwrap(), big());
    assert_eq!(report.image_crc32, crc32fast::hash(&iso));
    Ok(())
}

#[test]
fn test_growing_file_shifts_later_files() -> Result<(), Error> {
    for mode in [WriteMode::Replace, WriteMode::Atomic] {
        let dir = tempdir().unwrap();
        let iso_path = dir.path().join("game.iso");
        sample_iso(&iso_path);
        let payload = vec![0xc3; 5000];
        let source = dir.path().join("big.bin");
        fs::write(&source, &payload).unwrap();

        let report = patch_iso_file(
            &iso_path,
            &[replacement("DATA\\BIG.BIN", &source)],
            &PatchOptions { write_mode: mode },
        )?;

        assert_eq!(report.byte_delta, ISO_SECTOR_SIZE as i64);
        assert!(report.needs_cuesheet_update);

        let iso = fs::read(&iso_path).unwrap();
        assert_eq!(iso.len(), 27 * ISO_SECTOR_SIZE);
        assert_eq!(pvd_total_sectors(&iso), 27);
        assert_eq!(read_iso_file(&iso, "/DATA/BIG.BIN").unwrap(), payload);
        assert_eq!(read_iso_file(&iso, "/DATA/TAIL.BIN").unwrap(), tail());
        assert_eq!(read_iso_file(&iso, "/README.TXT").unwrap(), b"hello");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2, "{:?}", mode);
    }
    Ok(())
}

#[test]
fn test_empty_payload_removes_sectors() -> Result<(), Error> {
    let dir = tempdir().unwrap();
    let iso_path = dir.path().join("game.iso");
    sample_iso(&iso_path);
    let empty = dir.path().join("empty");
    fs::write(&empty, b"").unwrap();

    let report = patch_iso_file(
        &iso_path,
        &[replacement("/readme.txt", &empty)],
        &PatchOptions::default(),
    )?;

    assert_eq!(report.byte_delta, -(ISO_SECTOR_SIZE as i64));
    let iso = fs::read(&iso_path).unwrap();
    assert_eq!(pvd_total_sectors(&iso), 25);
    assert_eq!(read_iso_file(&iso, "/README.TXT").unwrap(), b"");
    assert_eq!(read_iso_file(&iso, "/DATA/BIG.BIN").unwrap(), big());
    assert_eq!(read_iso_file(&iso, "/DATA/TAIL.BIN").unwrap(), tail());
    Ok(())
}

#[test]
fn test_several_replacements_in_one_run() -> Result<(), Error> {
    let dir = tempdir().unwrap();
    let iso_path = dir.path().join("game.iso");
    sample_iso(&iso_path);
    let readme = dir.path().join("readme.txt");
    fs::write(&readme, vec![b'r'; 4097]).unwrap();
    let tail_src = dir.path().join("tail.bin");
    fs::write(&tail_src, b"t").unwrap();

    let report = patch_iso_file(
        &iso_path,
        &[
            replacement("/README.TXT", &readme),
            replacement("/DATA/TAIL.BIN", &tail_src),
        ],
        &PatchOptions::default(),
    )?;

    assert_eq!(report.files.len(), 2);
    assert_eq!(report.files[0].sector_delta, 2);
    assert_eq!(report.files[1].sector_delta, 0);
    assert_eq!(report.files[1].lba, 27);
    assert_eq!(report.byte_delta, 2 * ISO_SECTOR_SIZE as i64);

    let iso = fs::read(&iso_path).unwrap();
    assert_eq!(read_iso_file(&iso, "/README.TXT").unwrap(), vec![b'r'; 4097]);
    assert_eq!(read_iso_file(&iso, "/DATA/BIG.BIN").unwrap(), big());
    assert_eq!(read_iso_file(&iso, "/DATA/TAIL.BIN").unwrap(), b"t");
    Ok(())
}

#[test]
fn test_missing_target_leaves_image_untouched() {
    let dir = tempdir().unwrap();
    let iso_path = dir.path().join("game.iso");
    sample_iso(&iso_path);
    let before = fs::read(&iso_path).unwrap();
    let source = dir.path().join("new.bin");
    fs::write(&source, vec![1u8; 9000]).unwrap();

    let err = patch_iso_file(
        &iso_path,
        &[replacement("/DATA/NOPE.BIN", &source)],
        &PatchOptions::default(),
    )
    .unwrap_err();

    assert!(matches!(err, Error::TargetNotFound { ref path } if path == "/DATA/NOPE.BIN"));
    assert_eq!(err.exit_code(), 3);
    assert_eq!(fs::read(&iso_path).unwrap(), before);
}

#[test]
fn test_missing_inputs() {
    let dir = tempdir().unwrap();
    let iso_path = dir.path().join("game.iso");

    let err = patch_iso_file(&iso_path, &[], &PatchOptions::default()).unwrap_err();
    assert!(matches!(err, Error::InputNotFound { .. }));

    sample_iso(&iso_path);
    let before = fs::read(&iso_path).unwrap();
    let err = patch_iso_file(
        &iso_path,
        &[replacement("/README.TXT", &dir.path().join("missing.txt"))],
        &PatchOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::InputNotFound { .. }));
    assert_eq!(fs::read(&iso_path).unwrap(), before);
}

#[test]
fn test_rejects_non_iso_input() {
    let dir = tempdir().unwrap();
    let iso_path = dir.path().join("not.iso");
    fs::write(&iso_path, vec![0u8; 40 * ISO_SECTOR_SIZE]).unwrap();

    let err = patch_iso_file(&iso_path, &[], &PatchOptions::default()).unwrap_err();
    assert!(matches!(err, Error::UnsupportedFormat { .. }));
    assert_eq!(err.exit_code(), 50);
}
