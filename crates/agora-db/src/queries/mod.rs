mod categories;
mod comments;
mod memberships;
mod notifications;
mod posts;
mod reactions;
mod tokens;
mod users;

use crate::error::{StoreError, StoreResult};

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> StoreResult<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> StoreResult<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Map "zero rows affected" to `NoRows`.
fn expect_affected(affected: usize) -> StoreResult<()> {
    if affected == 0 {
        Err(StoreError::NoRows)
    } else {
        Ok(())
    }
}
