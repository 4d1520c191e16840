//! Purpose: Best-effort reader for FastTrack Schedule binary project files.
//! Exports: `api` (reader entry points, tables, reports), `notice`, and `core` internals.
//! Role: Library behind the `fasttrack` CLI; callers map rows into their own project model.
//! Invariants: Decoding is a pure function of the input bytes; no global state.
//! Invariants: A single unreadable column never fails a whole read by default.
pub mod api;
pub mod core;
pub mod notice;
