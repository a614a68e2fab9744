pub mod config;
pub mod counter;
pub mod reveal;
pub mod scan;
pub mod validate;
