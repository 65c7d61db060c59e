//! # Mowve It
//!
//! Lawn mowing arcade game on top of `mowve_engine`. Drive a mower across a
//! square lawn and cut every tile before the level timer runs out, while
//! garden ornaments cost lives and animals wander in from the edges.

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod app;
pub mod assets;
pub mod commands;
pub mod config;
pub mod contexts;
pub mod frame;
pub mod levels;
pub mod objects;

pub use app::Game;
pub use commands::Command;
pub use config::GameConfig;
