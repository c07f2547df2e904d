//! Desktop shell for the edit session.
//!
//! The UI layer owns no mask state: it feeds clicks and commands into
//! `EditSession` and displays whatever composite the session renders.

mod app;

pub use app::RemaskApp;
