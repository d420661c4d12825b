//! Network layer subsystem.
//!
//! The gateway binds a plain Tokio `TcpListener`; `tls.rs` turns the
//! configured PEM files into a rustls acceptor when the listener has a
//! `[listener.tls]` section.

pub mod tls;
