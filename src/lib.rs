//! Falling-block puzzle engine with a terminal front end and serial-device input.

pub mod app;
pub mod audio;
pub mod board;
pub mod command;
pub mod config;
pub mod device;
pub mod error;
pub mod game;
pub mod highscore;
pub mod input;
pub mod piece;
pub mod ui;
