pub mod annotation;
pub mod backend;
pub mod config;
pub mod engine;
pub mod i18n;
pub mod report;
pub mod spec;
pub mod types;

// Re-export the localization macros
pub use crate::i18n::{t, t_with_args};
