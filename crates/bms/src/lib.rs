//! BMS - Building Management System
//!
//! This crate provides the application layer around `bms_model`:
//! - Loading and saving the building save-file format
//! - Runtime configuration from `bms.toml`
//! - Minute-by-minute simulation and status reports

// Re-export the model crate
pub use bms_model;

// Save file loading and writing
pub mod savefile;

// Runtime configuration
pub mod config;

// Simulation driver and reports
pub mod simulation;
