// src/header/mod.rs
mod tag_header;

pub use tag_header::{emit_header, parse_header, read_header, write_header, TagHeader};
