//! MediChat widget core — transcript, option derivation, input gating,
//! turn orchestration, and the HTTP chat backend client shared by the
//! CLI and desktop frontends.

pub mod backend;
pub mod config;
pub mod controller;
pub mod options;
pub mod protocol;
pub mod reset;
pub mod session;
pub mod transcript;
pub mod validate;
pub mod view;
