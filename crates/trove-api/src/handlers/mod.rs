//! HTTP request handlers, grouped by domain.

pub mod auth;
pub mod file;
pub mod folder;
pub mod group;
pub mod health;
pub mod pages;
pub mod share;
pub mod user;
