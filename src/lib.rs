//! Lectern application library
//!
//! Book catalog and reader reviews served over HTTP: the catalog domain, the
//! HTTP modules exposing it, and the application wiring.

pub mod app;
pub mod catalog;
pub mod modules;

pub use app::Application;
