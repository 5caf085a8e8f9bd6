// KnowledgeBot client library - exposes modules for the binary and integration tests

pub mod api;
pub mod config;
pub mod controller;
pub mod ui;
