use pms_core::integrity::FOREIGN_KEYS;
use pms_core::models::EntityKind;
use sqlx::SqlitePool;

/// Every foreign key declared in the integrity graph must exist as a table
/// constraint with the same `ON DELETE` action, and vice versa.
#[sqlx::test(migrations = "./migrations")]
async fn test_foreign_keys_match_integrity_graph(pool: SqlitePool) {
    let mut declared = 0;

    for kind in EntityKind::ALL {
        let rows: Vec<(String, String, String)> = sqlx::query_as(&format!(
            "SELECT \"table\", \"from\", on_delete FROM pragma_foreign_key_list('{}')",
            kind.table()
        ))
        .fetch_all(&pool)
        .await
        .unwrap();

        for (parent_table, column, on_delete) in &rows {
            let fk = FOREIGN_KEYS
                .iter()
                .find(|fk| fk.child == kind && fk.column.as_str() == column)
                .unwrap_or_else(|| panic!("{}.{column} is not in the integrity graph", kind.table()));
            assert_eq!(parent_table, fk.parent.table(), "{}.{column} parent", kind.table());
            assert_eq!(on_delete, fk.on_delete.sql(), "{}.{column} action", kind.table());
        }
        declared += rows.len();
    }

    assert_eq!(declared, FOREIGN_KEYS.len());
}

/// Every table carries created_at and updated_at.
#[sqlx::test(migrations = "./migrations")]
async fn test_all_tables_have_timestamps(pool: SqlitePool) {
    for kind in EntityKind::ALL {
        let columns: Vec<(String,)> = sqlx::query_as(&format!(
            "SELECT name FROM pragma_table_info('{}')",
            kind.table()
        ))
        .fetch_all(&pool)
        .await
        .unwrap();

        for col in ["id", "created_at", "updated_at"] {
            assert!(
                columns.iter().any(|(name,)| name == col),
                "Table {} is missing column {col}",
                kind.table()
            );
        }
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn test_foreign_keys_are_enforced(pool: SqlitePool) {
    let (enabled,): (i64,) = sqlx::query_as("PRAGMA foreign_keys")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(enabled, 1);
}
