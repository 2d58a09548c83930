//! FFmpeg Tools - interactive batch front end for ffmpeg
//!
//! Pick one operation from a menu (subtitle muxing, AC3 audio, H.264/H.265
//! transcodes, scaling, rewrapping) and run it over every file given on the
//! command line, with collision-safe output names.

pub mod app;
pub mod batch;
pub mod classify;
pub mod cli;
pub mod config;
pub mod error;
pub mod media;
pub mod menu;
pub mod naming;
pub mod operation;
pub mod power;
