//! Route modules for Lectern Server

pub mod health;
pub mod multipart;
pub mod stream;
