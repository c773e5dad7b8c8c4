//! IPC wire codec for the CTR OS command buffer protocol.
//!
//! This crate implements the marshaling format used by synchronous IPC on the
//! emulated CTR OS. A request is a fixed 64-word command buffer located at a
//! well-known offset in the calling thread's communication area. The buffer
//! starts with a packed 32-bit header, followed by *normal parameters*
//! (copied verbatim between processes) and *translate parameters* (a stream
//! of tagged descriptor words whose payloads the kernel rewrites when the
//! buffer crosses an address-space boundary).
//!
//! # Buffer Layout
//!
//! ```text
//! Word    Contents
//! ─────────────────────────────────────────────────────────
//! 0       Header {command_id, normal_params, translate_params_size}
//! 1..=n   Normal parameters (n = normal_params)
//! n+1..   Translate parameters: descriptor word, then its payload
//!         (N handle words, or one address word), repeated
//! ─────────────────────────────────────────────────────────
//! ```
//!
//! Descriptors are self-delimiting only through the scan rule above; the
//! header's `translate_params_size` counts *words*, not descriptors.
//!
//! This crate is purely the codec: every operation is a total function over
//! 32-bit words. Cross-address-space translation and dispatch live in the
//! service framework crate built on top of this one.

#![no_std]

pub mod buffer;
pub mod descriptor;
pub mod handle;
pub mod header;

pub use buffer::{COMMAND_BUFFER_OFFSET, COMMAND_BUFFER_WORDS, CommandBuffer};
pub use handle::{Handle, ProcessId};
pub use header::{Header, make_header};
