//! Data models for the library service

pub mod book;
pub mod borrowing;
pub mod user;
