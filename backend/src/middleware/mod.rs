//! Request middleware.
//!
//! Purpose: request lifecycle concerns shared by every route, currently the
//! trace identifier attached to each request.

pub mod trace;

pub use trace::Trace;
