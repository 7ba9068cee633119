use sea_orm::{ConnectOptions, Database as SeaDatabase, DatabaseConnection};
use std::time::Duration;

use crate::config::Config;

/// Initialize the database connection from config.
pub async fn connect(config: &Config) -> Result<DatabaseConnection, sea_orm::DbErr> {
    let mut opts = ConnectOptions::new(&config.database_url);

    if config.database_url.contains(":memory:") {
        // A pooled in-memory SQLite database is one database per connection,
        // and recycling the connection drops the schema. Pin a single
        // long-lived connection.
        opts.max_connections(1).min_connections(1);
    } else {
        opts.max_connections(100)
            .min_connections(5)
            .connect_timeout(Duration::from_secs(8))
            .acquire_timeout(Duration::from_secs(8))
            .idle_timeout(Duration::from_secs(8));
    }
    opts.sqlx_logging(config.is_dev());

    SeaDatabase::connect(opts).await
}
