use std::time::Duration;

use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PoolError};
use diesel::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations};

pub mod catalog;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod schema;
pub mod seed;
pub mod serializer;
pub mod validation;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("./migrations");

pub const IN_MEMORY_DATABASE: &str = ":memory:";

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

#[derive(Debug)]
struct SqlitePragmas;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqlitePragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Builds the connection pool every catalog operation draws from.
///
/// An in-memory database lives only as long as its connection, so it gets a
/// single connection that is never recycled.
pub fn establish_pool(database_url: &str, max_size: u32) -> Result<DbPool, PoolError> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    let builder = Pool::<ConnectionManager<SqliteConnection>>::builder()
        .connection_customizer(Box::new(SqlitePragmas));

    if database_url == IN_MEMORY_DATABASE {
        builder
            .max_size(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .build(manager)
    } else {
        builder
            .max_size(max_size)
            .connection_timeout(Duration::from_secs(10))
            .build(manager)
    }
}
