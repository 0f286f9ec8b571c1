pub mod app;
pub mod vision;
