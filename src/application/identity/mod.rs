//! Identity module: account use-cases
//!
//! `AccountService` owns registration, credential checks, profile edits and
//! account removal. HTTP handlers stay thin and delegate here.

pub mod service;

pub use service::AccountService;
