//! Command handlers

pub mod database;
pub mod library;
pub mod sync;
