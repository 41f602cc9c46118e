use crate::config::RESTAURANTS_TABLE;
use crate::db::connection::Database;
use crate::domain::listing::Listing;
use crate::errors::ServerError;
use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, OptionalExtension};

const SQL_CREATE_RESTAURANTS: &str = include_str!("../../sql/restaurants_schema.sql");
const SQL_INSERT_RESTAURANT: &str = include_str!("../../sql/restaurants_insert.sql");

/// Rows and column names returned by an agent query, already rendered as text.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRows {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// True when more rows matched than were kept.
    pub truncated: bool,
}

/// Drop and recreate `restaurants` with exactly `listings` as its contents.
///
/// Everything happens in one transaction: on any error the previous table
/// is left as it was.
pub fn replace_restaurants(conn: &mut Connection, listings: &[Listing]) -> Result<usize, ServerError> {
    let tx = conn
        .transaction()
        .map_err(|e| ServerError::DbError(e.to_string()))?;

    tx.execute_batch(&format!("DROP TABLE IF EXISTS {RESTAURANTS_TABLE};"))
        .map_err(|e| ServerError::DbError(format!("Drop failed: {e}")))?;
    tx.execute_batch(SQL_CREATE_RESTAURANTS)
        .map_err(|e| ServerError::DbError(format!("Create failed: {e}")))?;

    {
        let mut stmt = tx
            .prepare(SQL_INSERT_RESTAURANT)
            .map_err(|e| ServerError::DbError(e.to_string()))?;

        for l in listings {
            stmt.execute(params![
                l.name,
                l.address,
                l.cuisine,
                l.rating,
                l.price_level.as_str(),
                l.num_reviews,
                l.subrating_rate_food,
                l.subrating_rate_service,
                l.subrating_rate_atmosphere,
                l.url,
                l.city,
            ])
            .map_err(|e| ServerError::DbError(format!("Insert failed for '{}': {e}", l.name)))?;
        }
    }

    tx.commit()
        .map_err(|e| ServerError::DbError(format!("Commit failed: {e}")))?;

    Ok(listings.len())
}

/// Rows in `restaurants`. Never creates the database file.
pub fn count_restaurants(db: &Database) -> Result<i64, ServerError> {
    db.with_existing_conn(|conn| {
        conn.query_row(&format!("SELECT COUNT(*) FROM {RESTAURANTS_TABLE}"), [], |row| row.get(0))
            .map_err(|e| ServerError::DbError(e.to_string()))
    })
}

/// The `CREATE TABLE` statement for `table`, if the table exists.
pub fn table_definition(conn: &Connection, table: &str) -> Result<Option<String>, ServerError> {
    conn.query_row(
        "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = ?1",
        params![table],
        |row| row.get::<_, String>(0),
    )
    .optional()
    .map_err(|e| ServerError::DbError(e.to_string()))
}

/// Run a statement without allowing it to write, keeping at most `max_rows` rows.
pub fn run_read_only(conn: &Connection, sql: &str, max_rows: usize) -> Result<QueryRows, ServerError> {
    conn.pragma_update(None, "query_only", true)
        .map_err(|e| ServerError::DbError(e.to_string()))?;

    let result = collect_rows(conn, sql, max_rows);

    // Restore even on failure; the connection stays cached on this thread.
    conn.pragma_update(None, "query_only", false)
        .map_err(|e| ServerError::DbError(e.to_string()))?;

    result
}

fn collect_rows(conn: &Connection, sql: &str, max_rows: usize) -> Result<QueryRows, ServerError> {
    let mut stmt = conn
        .prepare(sql)
        .map_err(|e| ServerError::DbError(e.to_string()))?;

    let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
    let width = columns.len();

    let mut rows = stmt
        .query([])
        .map_err(|e| ServerError::DbError(e.to_string()))?;

    let mut out = Vec::new();
    let mut truncated = false;
    while let Some(row) = rows.next().map_err(|e| ServerError::DbError(e.to_string()))? {
        if out.len() == max_rows {
            truncated = true;
            break;
        }
        let mut cells = Vec::with_capacity(width);
        for i in 0..width {
            let value = row
                .get_ref(i)
                .map_err(|e| ServerError::DbError(e.to_string()))?;
            cells.push(render_value(value));
        }
        out.push(cells);
    }

    Ok(QueryRows {
        columns,
        rows: out,
        truncated,
    })
}

fn render_value(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => "NULL".to_string(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) => String::from_utf8_lossy(t).into_owned(),
        ValueRef::Blob(b) => format!("<{} bytes>", b.len()),
    }
}
