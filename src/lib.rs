pub mod app_context;
pub mod auth;
pub mod callable;
pub mod cli;
pub mod clock;
pub mod device_id;
pub mod endpoints;
pub mod kiosk;
pub mod logging;
pub mod scan;
