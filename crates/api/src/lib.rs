//! Tinystore API library.
//!
//! This crate provides the HTTP backend as a library, allowing the router to
//! be tested end to end and the repositories to be reused by the CLI.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
