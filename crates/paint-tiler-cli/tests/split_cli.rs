use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::Command;

use image::{Rgba, RgbaImage};

fn cli_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_paint-tiler"))
}

fn write_mural(dir: &Path) -> PathBuf {
    let path = dir.join("mural.png");
    RgbaImage::from_pixel(32, 48, Rgba([90, 60, 30, 255]))
        .save(&path)
        .expect("save mural.png");
    path
}

fn file_names(dir: &Path) -> BTreeSet<String> {
    std::fs::read_dir(dir)
        .expect("read_dir")
        .map(|e| e.expect("entry").file_name().to_string_lossy().into_owned())
        .collect()
}

#[test]
fn split_writes_raster_and_descriptor_per_tile() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write_mural(dir.path());
    let out = dir.path().join("tiles");

    let status = Command::new(cli_bin())
        .arg("split")
        .arg("--input")
        .arg(&input)
        .arg("--out")
        .arg(&out)
        .arg("-q")
        .status()
        .expect("run paint-tiler");
    assert!(status.success());

    let expected: BTreeSet<String> = [
        "mural_0_0.bmp",
        "mural_0_0.paint",
        "mural_1_0.bmp",
        "mural_1_0.paint",
    ]
    .into_iter()
    .map(String::from)
    .collect();
    assert_eq!(file_names(&out), expected);

    let desc = paint_tiler_core::read_descriptor(&out.join("mural_1_0.paint")).expect("read");
    assert_eq!(desc.ct, 2);
    assert_eq!(desc.pixels.len(), 32 * 16);
}

#[test]
fn dry_run_writes_nothing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write_mural(dir.path());
    let out = dir.path().join("tiles");

    let status = Command::new(cli_bin())
        .args(["-q", "split", "--dry-run", "--input"])
        .arg(&input)
        .arg("--out")
        .arg(&out)
        .status()
        .expect("run paint-tiler");
    assert!(status.success());
    assert!(!out.exists());
}

#[test]
fn misaligned_input_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("odd.png");
    RgbaImage::new(20, 16).save(&input).expect("save odd.png");
    let out = dir.path().join("tiles");

    let output = Command::new(cli_bin())
        .args(["-q", "split", "--input"])
        .arg(&input)
        .arg("--out")
        .arg(&out)
        .output()
        .expect("run paint-tiler");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("multiples of 16"));
    assert!(!out.exists());
}
