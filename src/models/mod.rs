//! Data models for object descriptors, restore requests and the local
//! store's metadata rows.
//!
//! `object` and `restore` are what callers of the lifecycle manager see;
//! `bucket` and `stored` map to SQLite tables via `sqlx::FromRow`.

pub mod bucket;
pub mod object;
pub mod restore;
pub mod stored;
