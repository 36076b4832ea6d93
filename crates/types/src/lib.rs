//! Core types for strategy configuration documents

pub mod address;
pub mod name;
pub mod network;
pub mod strategy;

pub use address::*;
pub use name::*;
pub use network::*;
pub use strategy::*;
