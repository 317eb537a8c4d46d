extern crate assert_cmd;
extern crate image;
extern crate predicates;
extern crate tempfile;

use assert_cmd::prelude::*;
use image::GenericImageView;
use predicates::prelude::*;
use std::path::PathBuf;
use std::process::Command;

fn catalog() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("datasets.json")
}

fn symmetry() -> Command {
    let mut cmd = Command::cargo_bin("symmetry").unwrap();
    cmd.arg("--datasets").arg(catalog());
    cmd
}

const QUICK: &[&str] = &[
    "--size",
    "48x40",
    "--tick-iterations",
    "2000",
    "--total-iterations",
    "6000",
];

#[test]
fn lists_datasets() {
    symmetry()
        .arg("--list")
        .assert()
        .success()
        .stdout(predicate::str::contains("halloween").and(predicate::str::contains("delta_star")));
}

#[test]
fn renders_one_dataset() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("icon.png");
    symmetry()
        .args(&["--dataset", "halloween", "--output"])
        .arg(&output)
        .args(QUICK)
        .assert()
        .success();

    let img = image::open(&output).unwrap();
    assert_eq!(img.dimensions(), (48, 40));
    let bytes = img.to_rgb().into_raw();
    assert!(bytes.iter().any(|b| *b > 0));
}

#[test]
fn renders_every_dataset() {
    let dir = tempfile::tempdir().unwrap();
    let outdir = dir.path().join("icons");
    symmetry()
        .arg("--all")
        .arg(&outdir)
        .args(&["--threads", "1"])
        .args(QUICK)
        .assert()
        .success();
    assert!(outdir.join("swirl.png").exists());
    assert!(outdir.join("delta_fish.png").exists());
}

#[test]
fn unknown_dataset_fails() {
    symmetry()
        .args(&["--dataset", "no-such-icon"])
        .args(QUICK)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown dataset 'no-such-icon'"));
}

#[test]
fn missing_catalog_fails() {
    Command::cargo_bin("symmetry")
        .unwrap()
        .args(&["--datasets", "/nonexistent/datasets.json", "--list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not read dataset catalog"));
}

#[test]
fn needs_a_dataset() {
    symmetry().assert().failure();
}
