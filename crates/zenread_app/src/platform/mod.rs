pub mod app;
pub mod effects;
pub mod logging;
pub mod speech;
pub mod ui;
