pub mod assets;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod pptx;
pub mod seed;
pub mod templates_structs;
