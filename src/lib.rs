pub mod app;
pub mod cli;
pub mod persist;
pub mod render;
pub mod store;
pub mod surfaces;
pub mod terminal;
pub mod types;
pub mod utils;
