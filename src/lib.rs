pub mod aur;
pub mod build;
pub mod config;
pub mod error;
pub mod http;
pub mod package;
pub mod repo;
pub mod runtime;
pub mod tool;
