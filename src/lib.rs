//! Desktop dashboard for exploring predicted author gender in PubMed
//! publication metadata, compared against a gender-neutral baseline topic.

pub mod app;
pub mod color;
pub mod config;
pub mod data;
pub mod state;
pub mod ui;
