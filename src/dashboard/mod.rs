//! Dashboard client.
//!
//! The pages of the dashboard (drive, mail, calendar, todos) all do the same
//! thing: call one gateway route with the browser's session cookie and show
//! either the data, a login prompt or an error. `view.rs` is that state
//! machine, `client.rs` drives it over HTTP.

pub mod client;
pub mod view;

pub use client::{DashboardClient, Overview};
pub use view::ViewState;
