pub mod backup;
pub mod dashboard;
pub mod nav;
pub mod records;
pub mod settings;
pub mod setup;
pub mod ui;
