use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{Connection, OptionalExtension, Transaction, params};
use tracing::{debug, info};

use crate::catalog::error::CatalogError;
use crate::catalog::latest::recompute_latest;
use crate::catalog::preferred::pick_preferred;
use crate::catalog::types::{
    ApplicationDetails, ApplicationPayload, ApplicationSummary, LatestFlags, ListFilters,
    Maintainer, Page, Perspective, PlatformSpec, VersionListing,
};
use crate::identifier::VersionSelector;
use crate::version::DottedVersion;

/// Schema migrations
/// Each version contains a list of SQL statements to execute
const MIGRATIONS: &[&[&str]] = &[
    // v1: preferred tie-break flag
    &["ALTER TABLE applications ADD COLUMN preferred INTEGER NOT NULL DEFAULT 0"],
];

/// SQLite-backed catalog relation: one row per (maintainer, appId, version),
/// with the per-perspective latest pointers kept as cached row state.
///
/// Every mutation and its latest-pointer recomputation run in one
/// transaction; the `Mutex` around the connection serializes writers
/// process-wide, so two mutations of the same application group can never
/// interleave.
pub struct CatalogStore {
    conn: Mutex<Connection>,
}

const APP_COLUMNS: &str = "m.code, m.name, m.address, m.homepage, m.email, \
     a.app_id, a.version, a.visible, a.preferred, a.latest_maintainer, a.latest_stb, \
     a.name, a.description, a.icon, a.category, a.app_type, a.size, \
     a.localizations, a.platform_architecture, a.platform_variant, a.platform_os, \
     a.dependencies, a.features, a.hardware, a.source_url";

/// One application row as read back from SQLite, JSON blobs still raw.
struct RawRow {
    maintainer: Maintainer,
    app_id: String,
    version: String,
    visible: bool,
    preferred: bool,
    latest: LatestFlags,
    name: String,
    description: Option<String>,
    icon: Option<String>,
    category: Option<String>,
    app_type: String,
    size: Option<i64>,
    localizations: String,
    platform_architecture: Option<String>,
    platform_variant: Option<String>,
    platform_os: Option<String>,
    dependencies: String,
    features: String,
    hardware: Option<String>,
    source_url: Option<String>,
}

impl RawRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            maintainer: Maintainer {
                code: row.get(0)?,
                name: row.get(1)?,
                address: row.get(2)?,
                homepage: row.get(3)?,
                email: row.get(4)?,
            },
            app_id: row.get(5)?,
            version: row.get(6)?,
            visible: row.get(7)?,
            preferred: row.get(8)?,
            latest: LatestFlags {
                maintainer: row.get(9)?,
                stb: row.get(10)?,
            },
            name: row.get(11)?,
            description: row.get(12)?,
            icon: row.get(13)?,
            category: row.get(14)?,
            app_type: row.get(15)?,
            size: row.get(16)?,
            localizations: row.get(17)?,
            platform_architecture: row.get(18)?,
            platform_variant: row.get(19)?,
            platform_os: row.get(20)?,
            dependencies: row.get(21)?,
            features: row.get(22)?,
            hardware: row.get(23)?,
            source_url: row.get(24)?,
        })
    }

    fn into_payload(self) -> Result<(Maintainer, String, String, LatestFlags, ApplicationPayload), CatalogError> {
        let platform = self.platform_architecture.map(|architecture| PlatformSpec {
            architecture,
            variant: self.platform_variant,
            os: self.platform_os,
        });
        let hardware = self
            .hardware
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?;

        let payload = ApplicationPayload {
            name: self.name,
            app_type: self.app_type,
            visible: self.visible,
            preferred: self.preferred,
            description: self.description,
            icon: self.icon,
            category: self.category,
            size: self.size,
            localizations: serde_json::from_str(&self.localizations)?,
            platform,
            dependencies: serde_json::from_str(&self.dependencies)?,
            features: serde_json::from_str(&self.features)?,
            hardware,
            source_url: self.source_url,
        };
        Ok((self.maintainer, self.app_id, self.version, self.latest, payload))
    }
}

impl CatalogStore {
    pub fn new(db_path: &Path) -> Result<Self, CatalogError> {
        info!("Initializing catalog database at {:?}", db_path);

        let conn = Connection::open(db_path)?;

        // Enable WAL mode for better concurrency
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        debug!("Database connection established");

        let store = Self {
            conn: Mutex::new(conn),
        };

        store.create_schema()?;
        info!("Catalog initialized successfully");

        Ok(store)
    }

    /// Acquire database connection lock with proper error handling
    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>, CatalogError> {
        self.conn.lock().map_err(|_| CatalogError::LockPoisoned)
    }

    fn create_schema(&self) -> Result<(), CatalogError> {
        debug!("Creating database schema");

        let conn = self.lock_conn()?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS maintainers (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                code TEXT NOT NULL,
                name TEXT NOT NULL,
                address TEXT,
                homepage TEXT,
                email TEXT,
                UNIQUE(code)
            )
            "#,
            [],
        )?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS applications (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                maintainer_id INTEGER NOT NULL,
                app_id TEXT NOT NULL,
                version TEXT NOT NULL,
                visible INTEGER NOT NULL DEFAULT 0,
                latest_maintainer INTEGER NOT NULL DEFAULT 0,
                latest_stb INTEGER NOT NULL DEFAULT 0,
                name TEXT NOT NULL,
                description TEXT,
                icon TEXT,
                category TEXT,
                app_type TEXT NOT NULL,
                size INTEGER,
                localizations TEXT NOT NULL DEFAULT '{}',
                platform_architecture TEXT,
                platform_variant TEXT,
                platform_os TEXT,
                dependencies TEXT NOT NULL DEFAULT '[]',
                features TEXT NOT NULL DEFAULT '[]',
                hardware TEXT,
                source_url TEXT,
                FOREIGN KEY (maintainer_id) REFERENCES maintainers(id),
                UNIQUE(maintainer_id, app_id, version)
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_applications_group ON applications(maintainer_id, app_id)",
            [],
        )?;

        // Apply migrations
        Self::apply_migrations(&conn)?;

        debug!("Database schema created successfully");
        Ok(())
    }

    /// Apply pending migrations based on user_version pragma
    fn apply_migrations(conn: &Connection) -> Result<(), CatalogError> {
        let current_version: i32 =
            conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

        for (i, statements) in MIGRATIONS.iter().enumerate() {
            let version = (i + 1) as i32;
            if version > current_version {
                for sql in *statements {
                    // Handle "duplicate column name" error for existing DBs
                    // that were created before the migration system
                    match conn.execute(sql, []) {
                        Ok(_) => {}
                        Err(rusqlite::Error::SqliteFailure(_, Some(ref msg)))
                            if msg.contains("duplicate column name") =>
                        {
                            debug!("Column already exists, skipping: {}", sql);
                        }
                        Err(e) => return Err(e.into()),
                    }
                }
                debug!("Applied migration v{}", version);
            }
        }

        let target_version = MIGRATIONS.len() as i32;
        if target_version > current_version {
            conn.pragma_update(None, "user_version", target_version)?;
            debug!("Updated schema version to v{}", target_version);
        }

        Ok(())
    }

    // ------------------------------------------------------------------
    // Maintainers
    // ------------------------------------------------------------------

    pub fn create_maintainer(&self, maintainer: &Maintainer) -> Result<(), CatalogError> {
        let conn = self.lock_conn()?;

        let inserted = conn.execute(
            r#"
            INSERT OR IGNORE INTO maintainers (code, name, address, homepage, email)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                maintainer.code,
                maintainer.name,
                maintainer.address,
                maintainer.homepage,
                maintainer.email
            ],
        )?;

        if inserted == 0 {
            return Err(CatalogError::MaintainerExists(maintainer.code.clone()));
        }

        info!(code = %maintainer.code, "maintainer created");
        Ok(())
    }

    pub fn get_maintainer(&self, code: &str) -> Result<Option<Maintainer>, CatalogError> {
        let conn = self.lock_conn()?;
        let maintainer = conn
            .query_row(
                "SELECT code, name, address, homepage, email FROM maintainers WHERE code = ?1",
                [code],
                maintainer_from_row,
            )
            .optional()?;
        Ok(maintainer)
    }

    pub fn list_maintainers(
        &self,
        name: Option<&str>,
        offset: u64,
        limit: u64,
    ) -> Result<Page<Maintainer>, CatalogError> {
        let conn = self.lock_conn()?;

        let limit_i = limit as i64;
        let offset_i = offset as i64;

        let (total, items) = if let Some(name) = name {
            let pattern = format!("%{name}%");
            let total: u64 = conn.query_row(
                "SELECT COUNT(*) FROM maintainers WHERE name LIKE ?1",
                [&pattern],
                |row| row.get(0),
            )?;
            let mut stmt = conn.prepare(
                "SELECT code, name, address, homepage, email FROM maintainers \
                 WHERE name LIKE ?1 ORDER BY code LIMIT ?2 OFFSET ?3",
            )?;
            let items = stmt
                .query_map(params![pattern, limit_i, offset_i], maintainer_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            (total, items)
        } else {
            let total: u64 =
                conn.query_row("SELECT COUNT(*) FROM maintainers", [], |row| row.get(0))?;
            let mut stmt = conn.prepare(
                "SELECT code, name, address, homepage, email FROM maintainers \
                 ORDER BY code LIMIT ?1 OFFSET ?2",
            )?;
            let items = stmt
                .query_map(params![limit_i, offset_i], maintainer_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            (total, items)
        };

        Ok(Page {
            items,
            total,
            offset,
            limit,
        })
    }

    /// Update a maintainer's descriptive fields. The code is the business
    /// key and cannot change.
    pub fn update_maintainer(&self, code: &str, maintainer: &Maintainer) -> Result<bool, CatalogError> {
        let conn = self.lock_conn()?;
        let updated = conn.execute(
            r#"
            UPDATE maintainers SET name = ?1, address = ?2, homepage = ?3, email = ?4
            WHERE code = ?5
            "#,
            params![
                maintainer.name,
                maintainer.address,
                maintainer.homepage,
                maintainer.email,
                code
            ],
        )?;
        Ok(updated > 0)
    }

    /// Delete a maintainer. Rejected while it still owns catalog rows;
    /// versions must be removed first.
    pub fn delete_maintainer(&self, code: &str) -> Result<bool, CatalogError> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;

        let Some(maintainer_id) = find_maintainer_id(&tx, code)? else {
            return Ok(false);
        };

        let owned: i64 = tx.query_row(
            "SELECT COUNT(*) FROM applications WHERE maintainer_id = ?1",
            [maintainer_id],
            |row| row.get(0),
        )?;
        if owned > 0 {
            return Err(CatalogError::MaintainerNotEmpty(code.to_string()));
        }

        tx.execute("DELETE FROM maintainers WHERE id = ?1", [maintainer_id])?;
        tx.commit()?;

        info!(code, "maintainer deleted");
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Versions
    // ------------------------------------------------------------------

    /// Insert a new application version and recompute the group's latest
    /// pointers, in one transaction.
    pub fn add_version(
        &self,
        maintainer_code: &str,
        app_id: &str,
        version: &str,
        payload: &ApplicationPayload,
    ) -> Result<(), CatalogError> {
        // Versions are validated on the way in so ranking never meets an
        // unparseable one.
        version.parse::<DottedVersion>()?;

        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;

        let maintainer_id = find_maintainer_id(&tx, maintainer_code)?
            .ok_or_else(|| CatalogError::MaintainerNotFound(maintainer_code.to_string()))?;

        let exists: bool = tx.query_row(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM applications
                WHERE maintainer_id = ?1 AND app_id = ?2 AND version = ?3
            )
            "#,
            params![maintainer_id, app_id, version],
            |row| row.get(0),
        )?;
        if exists {
            return Err(CatalogError::VersionExists {
                maintainer: maintainer_code.to_string(),
                app_id: app_id.to_string(),
                version: version.to_string(),
            });
        }

        let insert_params = payload_params(maintainer_id, app_id, version, payload)?;
        tx.execute(
            r#"
            INSERT INTO applications (
                maintainer_id, app_id, version, visible, preferred,
                name, description, icon, category, app_type, size,
                localizations, platform_architecture, platform_variant, platform_os,
                dependencies, features, hardware, source_url
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)
            "#,
            param_refs(&insert_params).as_slice(),
        )?;

        recompute_latest(&tx, maintainer_id, app_id)?;
        tx.commit()?;

        info!(maintainer_code, app_id, version, "version added");
        Ok(())
    }

    /// Update one version in place. `Exact` targets that version, `Latest`
    /// the current maintainer-latest; `All` is reserved for deletes.
    /// Returns `false` when nothing matched.
    pub fn update_version(
        &self,
        maintainer_code: &str,
        app_id: &str,
        selector: &VersionSelector,
        payload: &ApplicationPayload,
    ) -> Result<bool, CatalogError> {
        if selector.is_all() {
            return Err(CatalogError::InvalidSelector("all".to_string()));
        }

        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;

        let maintainer_id = find_maintainer_id(&tx, maintainer_code)?
            .ok_or_else(|| CatalogError::MaintainerNotFound(maintainer_code.to_string()))?;

        let Some(row_id) = find_target_row(&tx, maintainer_id, app_id, selector)? else {
            return Ok(false);
        };

        let update_params = payload_update_params(row_id, payload)?;
        tx.execute(
            r#"
            UPDATE applications SET
                visible = ?1, preferred = ?2, name = ?3, description = ?4, icon = ?5,
                category = ?6, app_type = ?7, size = ?8, localizations = ?9,
                platform_architecture = ?10, platform_variant = ?11, platform_os = ?12,
                dependencies = ?13, features = ?14, hardware = ?15, source_url = ?16
            WHERE id = ?17
            "#,
            param_refs(&update_params).as_slice(),
        )?;

        // Visibility may have changed, which can move the stb pointer
        recompute_latest(&tx, maintainer_id, app_id)?;
        tx.commit()?;

        info!(maintainer_code, app_id, ?selector, "version updated");
        Ok(true)
    }

    /// Delete one version (`Exact`), the current maintainer-latest
    /// (`Latest`), or every version of the app (`All`). Returns `false`
    /// when nothing matched.
    pub fn delete_version(
        &self,
        maintainer_code: &str,
        app_id: &str,
        selector: &VersionSelector,
    ) -> Result<bool, CatalogError> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;

        let maintainer_id = find_maintainer_id(&tx, maintainer_code)?
            .ok_or_else(|| CatalogError::MaintainerNotFound(maintainer_code.to_string()))?;

        let deleted = match selector {
            VersionSelector::All => tx.execute(
                "DELETE FROM applications WHERE maintainer_id = ?1 AND app_id = ?2",
                params![maintainer_id, app_id],
            )?,
            _ => match find_target_row(&tx, maintainer_id, app_id, selector)? {
                Some(row_id) => tx.execute("DELETE FROM applications WHERE id = ?1", [row_id])?,
                None => 0,
            },
        };

        if deleted == 0 {
            return Ok(false);
        }

        // Removing every version empties the group; there is nothing left
        // to point at.
        if !selector.is_all() {
            recompute_latest(&tx, maintainer_id, app_id)?;
        }
        tx.commit()?;

        info!(maintainer_code, app_id, ?selector, deleted, "version(s) deleted");
        Ok(true)
    }

    /// Resolve one application version for a perspective.
    ///
    /// Maintainer reads are scoped to the maintainer's own rows; stb reads
    /// see only visible rows, across all maintainers. A `Latest` selector
    /// resolves through the cached pointers with the preferred-version
    /// tie-break on top. The returned details carry the perspective's full
    /// version list, most recent first.
    pub fn get_details(
        &self,
        perspective: &Perspective,
        app_id: &str,
        selector: &VersionSelector,
    ) -> Result<Option<ApplicationDetails>, CatalogError> {
        if selector.is_all() {
            return Err(CatalogError::InvalidSelector("all".to_string()));
        }

        let conn = self.lock_conn()?;

        let mut sql = format!(
            "SELECT {APP_COLUMNS} FROM applications a \
             JOIN maintainers m ON a.maintainer_id = m.id \
             WHERE a.app_id = ?1"
        );
        let mut params: Vec<&dyn rusqlite::ToSql> = vec![&app_id];

        let maintainer_code = match perspective {
            Perspective::Maintainer(code) => {
                sql.push_str(" AND m.code = ?2");
                params.push(code);
                Some(code)
            }
            Perspective::Stb => {
                sql.push_str(" AND a.visible = 1");
                None
            }
        };

        let exact = selector.exact();
        match &exact {
            Some(version) => {
                sql.push_str(if maintainer_code.is_some() {
                    " AND a.version = ?3"
                } else {
                    " AND a.version = ?2"
                });
                params.push(version);
            }
            None => {
                sql.push_str(match perspective {
                    Perspective::Maintainer(_) => " AND a.latest_maintainer = 1",
                    Perspective::Stb => " AND a.latest_stb = 1",
                });
            }
        }

        let mut stmt = conn.prepare(&sql)?;
        let raw_rows = stmt
            .query_map(params.as_slice(), RawRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        drop(stmt);

        let candidates = raw_rows
            .into_iter()
            .map(RawRow::into_payload)
            .collect::<Result<Vec<_>, _>>()?;
        let candidates = rank_by_version_desc(candidates, |(_, _, version, _, _)| version.as_str())?;

        let Some((maintainer, app_id, version, latest, payload)) =
            pick_preferred(candidates, |(_, _, _, _, payload)| payload.preferred)
        else {
            return Ok(None);
        };

        let versions = list_group_versions(&conn, perspective, &app_id)?;

        debug!(app_id, version, "details resolved");
        Ok(Some(ApplicationDetails {
            maintainer,
            app_id,
            version,
            latest,
            payload,
            versions,
        }))
    }

    /// List catalog rows for a perspective. Without an exact version filter
    /// only the perspective's latest row per application is listed.
    pub fn list_versions(
        &self,
        perspective: &Perspective,
        filters: &ListFilters,
        offset: u64,
        limit: u64,
    ) -> Result<Page<ApplicationSummary>, CatalogError> {
        let conn = self.lock_conn()?;

        let mut clauses: Vec<String> = Vec::new();
        let mut owned: Vec<String> = Vec::new();

        match perspective {
            Perspective::Maintainer(code) => {
                owned.push(code.clone());
                clauses.push(format!("m.code = ?{}", owned.len()));
            }
            Perspective::Stb => clauses.push("a.visible = 1".to_string()),
        }

        match &filters.version {
            Some(version) => {
                owned.push(version.clone());
                clauses.push(format!("a.version = ?{}", owned.len()));
            }
            None => {
                // Latest-only listing unless a version is pinned
                clauses.push(match perspective {
                    Perspective::Maintainer(_) => "a.latest_maintainer = 1".to_string(),
                    Perspective::Stb => "a.latest_stb = 1".to_string(),
                });
            }
        }

        fn push_like(
            column: &str,
            value: &Option<String>,
            owned: &mut Vec<String>,
            clauses: &mut Vec<String>,
        ) {
            if let Some(v) = value {
                owned.push(format!("%{v}%"));
                clauses.push(format!("{column} LIKE ?{}", owned.len()));
            }
        }
        push_like("a.name", &filters.name, &mut owned, &mut clauses);
        push_like("a.description", &filters.description, &mut owned, &mut clauses);
        push_like("a.app_type", &filters.app_type, &mut owned, &mut clauses);

        fn push_eq(
            column: &str,
            value: &Option<String>,
            owned: &mut Vec<String>,
            clauses: &mut Vec<String>,
        ) {
            if let Some(v) = value {
                owned.push(v.clone());
                clauses.push(format!("{column} = ?{}", owned.len()));
            }
        }
        push_eq("a.category", &filters.category, &mut owned, &mut clauses);
        push_eq(
            "a.platform_architecture",
            &filters.platform_architecture,
            &mut owned,
            &mut clauses,
        );
        push_eq(
            "a.platform_variant",
            &filters.platform_variant,
            &mut owned,
            &mut clauses,
        );
        push_eq("a.platform_os", &filters.platform_os, &mut owned, &mut clauses);

        let where_clause = clauses.join(" AND ");
        let base = format!(
            "FROM applications a JOIN maintainers m ON a.maintainer_id = m.id WHERE {where_clause}"
        );

        let total: u64 = conn.query_row(
            &format!("SELECT COUNT(*) {base}"),
            rusqlite::params_from_iter(owned.iter()),
            |row| row.get(0),
        )?;

        let limit_i = limit as i64;
        let offset_i = offset as i64;
        let sql = format!(
            "SELECT m.code, a.app_id, a.version, a.name, a.app_type, a.category, \
                    a.visible, a.latest_maintainer, a.latest_stb \
             {base} ORDER BY a.app_id, m.code, a.version \
             LIMIT ?{} OFFSET ?{}",
            owned.len() + 1,
            owned.len() + 2
        );

        let mut stmt = conn.prepare(&sql)?;
        let params: Vec<&dyn rusqlite::ToSql> = owned
            .iter()
            .map(|s| s as &dyn rusqlite::ToSql)
            .chain([&limit_i as &dyn rusqlite::ToSql, &offset_i as &dyn rusqlite::ToSql])
            .collect();
        let items = stmt
            .query_map(params.as_slice(), |row| {
                Ok(ApplicationSummary {
                    maintainer_code: row.get(0)?,
                    app_id: row.get(1)?,
                    version: row.get(2)?,
                    name: row.get(3)?,
                    app_type: row.get(4)?,
                    category: row.get(5)?,
                    visible: row.get(6)?,
                    latest: LatestFlags {
                        maintainer: row.get(7)?,
                        stb: row.get(8)?,
                    },
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        debug!(total, returned = items.len(), "versions listed");
        Ok(Page {
            items,
            total,
            offset,
            limit,
        })
    }
}

fn maintainer_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Maintainer> {
    Ok(Maintainer {
        code: row.get(0)?,
        name: row.get(1)?,
        address: row.get(2)?,
        homepage: row.get(3)?,
        email: row.get(4)?,
    })
}

fn find_maintainer_id(conn: &Connection, code: &str) -> Result<Option<i64>, CatalogError> {
    let id = conn
        .query_row("SELECT id FROM maintainers WHERE code = ?1", [code], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(id)
}

/// Locate the single row a non-`All` selector addresses within a group.
fn find_target_row(
    tx: &Transaction<'_>,
    maintainer_id: i64,
    app_id: &str,
    selector: &VersionSelector,
) -> Result<Option<i64>, CatalogError> {
    let row_id = match selector {
        VersionSelector::Exact(version) => tx
            .query_row(
                "SELECT id FROM applications WHERE maintainer_id = ?1 AND app_id = ?2 AND version = ?3",
                params![maintainer_id, app_id, version],
                |row| row.get(0),
            )
            .optional()?,
        VersionSelector::Latest => tx
            .query_row(
                "SELECT id FROM applications WHERE maintainer_id = ?1 AND app_id = ?2 AND latest_maintainer = 1",
                params![maintainer_id, app_id],
                |row| row.get(0),
            )
            .optional()?,
        VersionSelector::All => None,
    };
    Ok(row_id)
}

/// All versions of an app as one perspective sees them, most recent first.
fn list_group_versions(
    conn: &Connection,
    perspective: &Perspective,
    app_id: &str,
) -> Result<Vec<VersionListing>, CatalogError> {
    let (sql, params): (&str, Vec<&dyn rusqlite::ToSql>) = match perspective {
        Perspective::Maintainer(code) => (
            "SELECT a.version, a.visible FROM applications a \
             JOIN maintainers m ON a.maintainer_id = m.id \
             WHERE a.app_id = ?1 AND m.code = ?2",
            vec![&app_id, code],
        ),
        Perspective::Stb => (
            "SELECT a.version, a.visible FROM applications a \
             WHERE a.app_id = ?1 AND a.visible = 1",
            vec![&app_id],
        ),
    };

    let mut stmt = conn.prepare(sql)?;
    let versions = stmt
        .query_map(params.as_slice(), |row| {
            Ok(VersionListing {
                version: row.get(0)?,
                visible: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rank_by_version_desc(versions, |listing| listing.version.as_str())
}

/// Rank rows most recent first by the dotted version order. Versions were
/// validated on write, so a parse failure here means outside modification.
fn rank_by_version_desc<T, F>(rows: Vec<T>, version_of: F) -> Result<Vec<T>, CatalogError>
where
    F: Fn(&T) -> &str,
{
    let mut keyed = rows
        .into_iter()
        .map(|row| {
            let version = version_of(&row).parse::<DottedVersion>().map_err(|e| {
                CatalogError::Corrupt(format!("stored version unparseable: {e}"))
            })?;
            Ok((version, row))
        })
        .collect::<Result<Vec<_>, CatalogError>>()?;
    keyed.sort_by(|(a, _), (b, _)| b.cmp(a));
    Ok(keyed.into_iter().map(|(_, row)| row).collect())
}

type SqlParams<'a> = Vec<Box<dyn rusqlite::ToSql + 'a>>;

fn param_refs<'a>(params: &'a SqlParams<'_>) -> Vec<&'a dyn rusqlite::ToSql> {
    params.iter().map(|p| p.as_ref() as &dyn rusqlite::ToSql).collect()
}

fn payload_params<'a>(
    maintainer_id: i64,
    app_id: &'a str,
    version: &'a str,
    payload: &'a ApplicationPayload,
) -> Result<SqlParams<'a>, CatalogError> {
    let mut params: SqlParams<'a> = vec![
        Box::new(maintainer_id),
        Box::new(app_id),
        Box::new(version),
    ];
    params.extend(payload_field_params(payload)?);
    Ok(params)
}

fn payload_update_params<'a>(
    row_id: i64,
    payload: &'a ApplicationPayload,
) -> Result<SqlParams<'a>, CatalogError> {
    let mut params = payload_field_params(payload)?;
    params.push(Box::new(row_id));
    Ok(params)
}

fn payload_field_params<'a>(payload: &'a ApplicationPayload) -> Result<SqlParams<'a>, CatalogError> {
    let localizations = serde_json::to_string(&payload.localizations)?;
    let dependencies = serde_json::to_string(&payload.dependencies)?;
    let features = serde_json::to_string(&payload.features)?;
    let hardware = payload
        .hardware
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;

    let (platform_architecture, platform_variant, platform_os) = match &payload.platform {
        Some(platform) => (
            Some(platform.architecture.clone()),
            platform.variant.clone(),
            platform.os.clone(),
        ),
        None => (None, None, None),
    };

    Ok(vec![
        Box::new(payload.visible),
        Box::new(payload.preferred),
        Box::new(payload.name.as_str()),
        Box::new(payload.description.as_deref()),
        Box::new(payload.icon.as_deref()),
        Box::new(payload.category.as_deref()),
        Box::new(payload.app_type.as_str()),
        Box::new(payload.size),
        Box::new(localizations),
        Box::new(platform_architecture),
        Box::new(platform_variant),
        Box::new(platform_os),
        Box::new(dependencies),
        Box::new(features),
        Box::new(hardware),
        Box::new(payload.source_url.as_deref()),
    ])
}
