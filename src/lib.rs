pub mod config;
pub mod minecraft;
pub mod properties;
pub mod util;
