//! Unit-level API test suite for taxform
//!
//! Exercises the public library surface (parser, resolver, validator,
//! exporter, cache) through `taxform::...` paths, the way an embedding
//! application would use it.
//!
//! # Running Unit Tests
//!
//! ```bash
//! cargo test --test unit
//! ```

mod cache;
mod export;
mod parser;
mod resolver;
mod validation;
