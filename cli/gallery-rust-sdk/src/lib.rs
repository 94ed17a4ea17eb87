pub mod models;
pub mod providers;
