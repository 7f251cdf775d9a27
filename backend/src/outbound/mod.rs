//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL repositories using Diesel ORM
//! - **memory**: a single in-process store implementing every repository
//! - **cache**: Redis and in-process key-value caches
//! - **mail**: log-backed delivery behind a bounded background queue
//! - **security**: Argon2 password hashing and random secrets
//!
//! Adapters are thin translators between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod cache;
pub mod mail;
pub mod memory;
pub mod persistence;
pub mod security;
