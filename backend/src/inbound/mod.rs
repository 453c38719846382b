//! Inbound adapters that translate domain results for external callers while
//! keeping framework details at the edge.
//!
//! HTTP rendering lives under [`http`].

pub mod http;
