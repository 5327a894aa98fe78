//! Restoring a row from its change history.

use crate::view::unzip_outbound;
use serde_json::Value;
use tablescope_core::{get_row_key, Error, Result, Table};
use tracing::debug;

/// Overwrites the row identified by `snapshot` with `snapshot`.
///
/// The identity is derived from the snapshot itself under the table's key
/// path, so the write lands on the same row even if its key fields are
/// displayed differently. Rows without a usable identity cannot be restored.
pub async fn rollback(table: &Table, snapshot: &Value) -> Result<Value> {
    let key = get_row_key(snapshot, table.key_path());
    if !key.is_addressable() {
        return Err(Error::invalid_key(format!(
            "row of table {} has no identity to restore",
            table.name()
        )));
    }
    debug!(table = %table.name(), key = %key, "rolling back row");
    table
        .put_with_key(unzip_outbound(snapshot), key.to_queryable_key())
        .await
}
