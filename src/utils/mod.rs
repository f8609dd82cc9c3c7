pub mod config;
pub mod error;
pub mod helpers;
pub mod i18n;
pub mod validation;
