//! HTTP request handlers

pub mod health;
pub mod submit;
pub mod sign;
pub mod admin;
