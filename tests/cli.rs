use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

const VTT: &str = "WEBVTT\n\nNOTE fetched from a test fixture\n\n00:00:01.000 --> 00:00:02.000 align:start\n<c.yellow>Hi</c> there\n\n00:00:02.500 --> 00:00:03.000\n{\\an8}Bye now\n";

fn captionscribe() -> Command {
    Command::cargo_bin("captionscribe").unwrap()
}

#[test]
fn clean_prints_flattened_text() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("talk.en.vtt");
    fs::write(&file, VTT).unwrap();

    captionscribe()
        .arg("clean")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::eq("Hi there Bye now\n"));
}

#[test]
fn clean_json_reports_language_from_file_name() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("talk.en.vtt");
    fs::write(&file, VTT).unwrap();

    captionscribe()
        .args(["clean", "--format", "json"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"lang\": \"en\""))
        .stdout(predicate::str::contains("\"cue_count\": 2"));
}

#[test]
fn clean_collapses_stutters() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("auto.srt");
    fs::write(&file, "1\n00:00:00,000 --> 00:00:01,000\nA A A A hello\n").unwrap();

    captionscribe()
        .arg("clean")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::eq("A hello\n"));
}

#[test]
fn clean_malformed_file_is_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("broken.srt");
    fs::write(&file, "this is not a caption file\n").unwrap();

    captionscribe()
        .arg("clean")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::function(|err: &str| err.matches("no recognizable cues").count() == 1));
}

#[test]
fn convert_vtt_to_srt() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("talk.vtt");
    fs::write(&file, VTT).unwrap();

    captionscribe()
        .args(["convert", "--to", "srt"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("1\n00:00:01,000 --> 00:00:02,000\nHi there\n"))
        .stdout(predicate::str::contains("2\n00:00:02,500 --> 00:00:03,000\nBye now\n"));
}

#[test]
fn convert_writes_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("talk.srt");
    let output = dir.path().join("out").join("talk.vtt");
    fs::write(&input, "1\n00:00:01,000 --> 00:00:02,000\nHi there\n").unwrap();

    captionscribe()
        .args(["convert", "--to", "vtt", "--output"])
        .arg(&output)
        .arg(&input)
        .assert()
        .success();

    let written = fs::read_to_string(&output).unwrap();
    assert_eq!(written, "WEBVTT\n\n00:00:01.000 --> 00:00:02.000\nHi there\n");
}

#[test]
fn convert_into_directory_names_file_by_target_dialect() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("talk.en.vtt");
    let out_dir = dir.path().join("converted");
    fs::create_dir(&out_dir).unwrap();
    fs::write(&input, VTT).unwrap();

    captionscribe()
        .args(["convert", "--to", "srt", "--output"])
        .arg(&out_dir)
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("talk.en.srt"));

    let written = fs::read_to_string(out_dir.join("talk.en.srt")).unwrap();
    assert!(written.starts_with("1\n00:00:01,000 --> 00:00:02,000\nHi there\n"));
}

#[test]
fn convert_rejects_file_without_cues() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("empty.vtt");
    fs::write(&file, "WEBVTT\n\nNOTE nothing here\n").unwrap();

    captionscribe()
        .args(["convert", "--to", "srt"])
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Could not parse"));
}

#[test]
fn missing_file_fails() {
    captionscribe()
        .args(["clean", "/nonexistent/captions.srt"])
        .assert()
        .failure();
}
