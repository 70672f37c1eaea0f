//! Tests for best-score persistence.

use std::fs;
use std::path::PathBuf;

use serial_test::serial;
use serial_tetris::highscore::{default_path, load_best_score, save_best_score};
use tempfile::tempdir;

#[test]
fn missing_file_reads_as_zero() {
    let dir = tempdir().unwrap();
    assert_eq!(load_best_score(&dir.path().join("best_score")), 0);
}

#[test]
fn corrupt_file_reads_as_zero() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("best_score");
    fs::write(&path, "not a number").unwrap();
    assert_eq!(load_best_score(&path), 0);
}

#[test]
fn surrounding_whitespace_is_tolerated() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("best_score");
    fs::write(&path, "  120\n").unwrap();
    assert_eq!(load_best_score(&path), 120);
}

#[test]
fn saved_score_loads_back() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("best_score");

    save_best_score(&path, 70).unwrap();
    assert_eq!(load_best_score(&path), 70);

    save_best_score(&path, 150).unwrap();
    assert_eq!(load_best_score(&path), 150);
}

#[test]
fn save_creates_missing_directories() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("deeper").join("best_score");

    save_best_score(&path, 10).unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "10");
}

#[test]
fn save_into_a_file_path_fails() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "").unwrap();

    let err = save_best_score(&blocker.join("best_score"), 10).unwrap_err();
    assert!(err.to_string().contains("blocker"));
}

#[test]
#[serial]
fn default_path_prefers_xdg_config_home() {
    let dir = tempdir().unwrap();
    let previous = std::env::var_os("XDG_CONFIG_HOME");
    std::env::set_var("XDG_CONFIG_HOME", dir.path());

    let path = default_path();

    match previous {
        Some(value) => std::env::set_var("XDG_CONFIG_HOME", value),
        None => std::env::remove_var("XDG_CONFIG_HOME"),
    }
    assert_eq!(
        path,
        dir.path().join("serial-tetris").join("best_score")
    );
}

#[test]
#[serial]
fn default_path_falls_back_to_home_config() {
    let previous_xdg = std::env::var_os("XDG_CONFIG_HOME");
    let previous_home = std::env::var_os("HOME");
    std::env::remove_var("XDG_CONFIG_HOME");
    std::env::set_var("HOME", "/home/player");

    let path = default_path();

    if let Some(value) = previous_xdg {
        std::env::set_var("XDG_CONFIG_HOME", value);
    }
    match previous_home {
        Some(value) => std::env::set_var("HOME", value),
        None => std::env::remove_var("HOME"),
    }
    assert_eq!(
        path,
        PathBuf::from("/home/player/.config/serial-tetris/best_score")
    );
}
