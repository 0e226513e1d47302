//! A pure-Rust parser for VP9 video bitstreams
//!
//! Given one frame's compressed payload (container demuxing is the
//! caller's job), the parser extracts every syntax element of the frame:
//! the uncompressed header, the arithmetic-coded compressed header with
//! its probability updates, and the per-tile stream of partition and
//! block syntax. Pixel reconstruction is out of scope; the output is the
//! populated frame state plus the decoded block syntax and the
//! adaptation counters a backward-adaptation pass needs.
//!
//! # Architecture
//!
//! - `bit_reader`: bit-level access to the frame buffer
//! - `bool_decoder`: the boolean arithmetic decoder
//! - `probs`: probability tables and the four frame-context banks
//! - `counter`: syntax-element adaptation counters
//! - `tree`: symbol trees and neighbor-context selection
//! - `frame`: frame header state
//! - `block` / `mv`: per-block mode info and motion-vector prediction
//! - `decoder`: the [`Vp9Parser`] entry point
//!
//! ```no_run
//! use vp9_syntax::{ParserOptions, Vp9Parser};
//!
//! let mut parser = Vp9Parser::new(ParserOptions::default());
//! let payload: Vec<u8> = std::fs::read("frame.vp9").unwrap();
//! let frame = parser.parse_frame(&payload).unwrap();
//! println!("{}x{}, {} blocks", frame.header.width, frame.header.height, frame.blocks.len());
//! ```

pub mod bit_reader;
pub mod block;
pub mod bool_decoder;
mod compressed;
pub mod counter;
pub mod decoder;
pub mod error;
pub mod frame;
pub mod mv;
pub mod probs;
pub mod tables;
mod tile;
pub mod tree;

pub use block::{ModeInfo, ParsedBlock};
pub use decoder::{ParsedFrame, ParserOptions, Vp9Parser};
pub use error::{Error, Result};
pub use frame::FrameHeader;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
