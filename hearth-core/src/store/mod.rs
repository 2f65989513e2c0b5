pub mod database;
pub mod error;

pub use database::{Database, DatabaseBuilder};
pub use error::{StoreError, StoreResult};

use uuid::Uuid;

pub(crate) fn new_id(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}

pub(crate) fn bool_to_sql(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
