//! Latest-pointer recomputation
//!
//! Every mutation that changes the version population of a
//! (maintainer, appId) group runs this inside the same transaction, so the
//! row change and the new pointer assignment commit together or not at all.
//!
//! Two pointers are maintained per group: the maintainer-latest (highest
//! version overall) and the stb-latest (highest version among visible
//! rows). The pass clears both flags group-wide before writing the new
//! assignment, so re-running it on an unchanged group is a no-op.

use rusqlite::Transaction;
use tracing::debug;

use crate::catalog::error::CatalogError;
use crate::version::DottedVersion;

struct GroupRow {
    id: i64,
    version: DottedVersion,
    visible: bool,
}

/// Recompute `latest_maintainer` / `latest_stb` for one application group.
///
/// An empty group (all versions deleted) is left untouched. Versions are
/// validated on write, so an unparseable stored version means the database
/// was modified outside the store and surfaces as [`CatalogError::Corrupt`].
pub fn recompute_latest(
    tx: &Transaction<'_>,
    maintainer_id: i64,
    app_id: &str,
) -> Result<(), CatalogError> {
    let mut stmt = tx.prepare(
        "SELECT id, version, visible FROM applications
         WHERE maintainer_id = ?1 AND app_id = ?2",
    )?;
    let rows = stmt
        .query_map((maintainer_id, app_id), |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, bool>(2)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;
    drop(stmt);

    let group = rows
        .into_iter()
        .map(|(id, version, visible)| {
            let version = version.parse::<DottedVersion>().map_err(|e| {
                CatalogError::Corrupt(format!("stored version unparseable: {e}"))
            })?;
            Ok(GroupRow {
                id,
                version,
                visible,
            })
        })
        .collect::<Result<Vec<_>, CatalogError>>()?;

    if group.is_empty() {
        debug!(app_id, "group empty after mutation, no latest to assign");
        return Ok(());
    }

    let maintainer_top = group
        .iter()
        .max_by(|a, b| a.version.cmp(&b.version))
        .map(|r| r.id)
        .ok_or_else(|| CatalogError::Corrupt("non-empty group without a maximum".to_string()))?;

    let stb_top = group
        .iter()
        .filter(|r| r.visible)
        .max_by(|a, b| a.version.cmp(&b.version))
        .map(|r| r.id);

    // Clear before set: at most one row per flag, and re-running the pass
    // cannot leave a stale assignment behind.
    tx.execute(
        "UPDATE applications SET latest_maintainer = 0, latest_stb = 0
         WHERE maintainer_id = ?1 AND app_id = ?2",
        (maintainer_id, app_id),
    )?;

    match stb_top {
        Some(stb_id) if stb_id == maintainer_top => {
            // Common case: both perspectives agree, one write
            tx.execute(
                "UPDATE applications SET latest_maintainer = 1, latest_stb = 1 WHERE id = ?1",
                [maintainer_top],
            )?;
        }
        Some(stb_id) => {
            tx.execute(
                "UPDATE applications SET latest_maintainer = 1 WHERE id = ?1",
                [maintainer_top],
            )?;
            tx.execute(
                "UPDATE applications SET latest_stb = 1 WHERE id = ?1",
                [stb_id],
            )?;
        }
        None => {
            tx.execute(
                "UPDATE applications SET latest_maintainer = 1 WHERE id = ?1",
                [maintainer_top],
            )?;
        }
    }

    debug!(
        app_id,
        maintainer_top,
        stb_top = ?stb_top,
        "latest pointers recomputed"
    );
    Ok(())
}
