pub mod detail;
pub mod evaluation;
pub mod setup;
pub mod ui;
