//! Shared test utilities for the VibeCurator workspace
//!
//! This crate provides an in-memory mock of the Redis wire protocol surface
//! the API actually uses (`SETEX`, `GET`, `DEL`, `EXISTS`, `KEYS`, TTL), so
//! the cache layer can be tested without a live Redis server.
//!
//! # Mock Services
//!
//! - [`MockRedisStore`] - In-memory Redis mock for caching tests
//!
//! # Example
//!
//! ```rust,ignore
//! use vibecurator_test_utils::MockRedisStore;
//!
//! #[tokio::test]
//! async fn test_with_mock_cache() {
//!     let store = MockRedisStore::new();
//!     store.setex("rec:v1:seed:1:k:10", 300, "{}").await;
//!     assert!(store.exists("rec:v1:seed:1:k:10").await);
//! }
//! ```

mod redis;

pub use redis::MockRedisStore;
