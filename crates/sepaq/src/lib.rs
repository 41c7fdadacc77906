//! # Sepaq
//!
//! This crate provides a client for the SEPAQ reservation API, which is used to list parks,
//! their cabins and the availability calendar of each cabin.

/// Stateful client for the SEPAQ reservation API.
mod client;
pub use client::*;

/// Parks, cabins, cabin dates and the errors raised while fetching them.
mod types;
pub use types::*;
