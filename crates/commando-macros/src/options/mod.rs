//! `#[derive(Options)]` implementation.

mod attrs;
mod derive;

pub use derive::options_derive_impl;
