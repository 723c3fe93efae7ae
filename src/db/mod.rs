//! Database layer
//!
//! Database abstraction for the Blastline site server. Supports:
//! - SQLite (default, for single-binary deployment)
//! - MySQL (for larger deployments)
//!
//! The driver is selected from configuration. A trait-based abstraction
//! (`DatabasePool`) lets repositories work against either backend; each
//! repository dispatches on `pool.driver()` to driver-specific SQL.

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{
    create_pool, create_test_pool, DatabasePool, DynDatabasePool, MysqlDatabase, SqliteDatabase,
};
