pub mod client;
pub mod config;
pub mod sequence;
pub mod tools;
pub mod util;
