// src/utils/mod.rs
mod string_encoding;
mod synchsafe;

pub use string_encoding::*;
pub use synchsafe::*;
