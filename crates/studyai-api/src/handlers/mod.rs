//! API handlers

pub mod gateway;
pub mod health;
pub mod quiz;
pub mod root;
pub mod summarize;
