pub mod catalog;
pub mod classify;
pub mod config;
pub mod replay;
pub mod synth;
