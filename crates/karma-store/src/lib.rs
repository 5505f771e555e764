//! Karma Store - Redis implementation of the counter store.

pub mod redis_store;

pub use redis_store::RedisCounterStore;
