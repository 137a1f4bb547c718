//! Web control panel
//!
//! HTTP/WebSocket server, REST handlers and the WebSocket bridge that
//! streams frames and status to the browser page.

pub mod handlers;
pub mod server;
pub mod websocket;

pub use server::{AppState, WebServer};
