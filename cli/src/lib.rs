//! procServ instance manager library: exposes modules for the binaries and
//! for integration testing.

#![cfg_attr(test, allow(clippy::expect_used))]

pub mod app;
pub mod application;
pub mod cli;
pub mod commands;
pub mod domain;
pub mod generator;
pub mod infra;
pub mod output;
