use diesel::prelude::*;
use diesel::sql_types::Text;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

use crate::repository::{DieselRepository, RepositoryError, RepositoryResult, SchemaManager};

/// Migration creating the five catalog tables.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[derive(QueryableByName)]
struct TableName {
    #[diesel(sql_type = Text)]
    name: String,
}

impl SchemaManager for DieselRepository {
    fn create_schema(&self) -> RepositoryResult<()> {
        let mut conn = self.conn()?;

        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| RepositoryError::Migration(e.to_string()))?;

        log::info!("Applied {} catalog migrations", applied.len());
        Ok(())
    }

    fn drop_schema(&self) -> RepositoryResult<()> {
        let mut conn = self.conn()?;

        let reverted = conn
            .revert_all_migrations(MIGRATIONS)
            .map_err(|e| RepositoryError::Migration(e.to_string()))?;

        log::info!("Reverted {} catalog migrations", reverted.len());
        Ok(())
    }

    fn list_tables(&self) -> RepositoryResult<Vec<String>> {
        let mut conn = self.conn()?;

        let tables = diesel::sql_query(
            "SELECT name FROM sqlite_master \
             WHERE type = 'table' \
             AND name NOT LIKE 'sqlite_%' \
             AND name <> '__diesel_schema_migrations' \
             ORDER BY name",
        )
        .load::<TableName>(&mut conn)?;

        Ok(tables.into_iter().map(|table| table.name).collect())
    }
}
