// Library interface for the streak client (used by the binary and the integration tests)
pub mod api;
pub mod app;
pub mod carousel;
pub mod config;
pub mod feed;
pub mod flight;

#[macro_use]
pub mod logging;

pub mod ranking;
pub mod router;
pub mod session;
pub mod storage;
pub mod terminal;
pub mod toast;
pub mod ui;
pub mod validation;
