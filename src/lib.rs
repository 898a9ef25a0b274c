pub mod bottle;
pub mod config;
pub mod importers;
pub mod services;
pub mod table;
pub mod utils;
