pub mod config;
pub mod crossings;
pub mod map;
pub mod migrate;
pub mod render;
pub mod run;
pub mod validate;
