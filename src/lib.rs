// Library root
// -----------
// This crate exposes the library surface of the `apos` CLI. The binary
// (`main.rs`) parses arguments, wires the pieces together and maps errors
// to exit codes.
//
// Module responsibilities:
// - `api`: blocking HTTP client for the APOS REST service.
// - `config`: the persisted session (base URL + bearer token).
// - `model`: group orders, items and creation payloads.
// - `history`: deadline arithmetic and the recency filter.
// - `prompt`: terminal prompting behind a trait.
// - `table`: plain-text table rendering.
// - `ui`: the interactive flows.
pub mod api;
pub mod config;
pub mod history;
pub mod model;
pub mod prompt;
pub mod table;
pub mod ui;
