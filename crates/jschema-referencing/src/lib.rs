//! Implementation-agnostic URI, JSON Pointer and disk/in-memory resource resolution.
//!
//! This crate carries the parts of JSON Schema reference handling that do not depend on
//! the keyword/vocabulary machinery: normalized URIs, JSON Pointer parsing and evaluation,
//! and a [`Registry`] of JSON resources addressable by URI, optionally backed by mounted
//! directories on disk. The `jschema` crate builds its [`Catalogue`](../jschema/struct.Catalogue.html)
//! and schema compiler on top of these primitives.
mod error;
mod pointer;
mod registry;
mod uri;

pub use error::{JsonPointerError, ReferencingError, UriError};
pub use pointer::JsonPointer;
pub use registry::Registry;
pub use uri::Uri;
