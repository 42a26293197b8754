use diesel_async::pooled_connection::deadpool::Pool;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::AsyncPgConnection;

pub type DbPool = Pool<AsyncPgConnection>;

/// Create a Diesel async connection pool shared by the identity, message and
/// session stores.
pub async fn connect(database_url: &str) -> DbPool {
    let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);
    let pool = Pool::builder(manager)
        .max_size(16)
        .build()
        .expect("failed to build connection pool");

    tracing::info!("database pool created");

    pool
}

/// Point `database_url` at the `<name>_test` database, keeping any query string.
pub fn with_test_db_suffix(database_url: &str) -> String {
    let (base, query) = match database_url.split_once('?') {
        Some((base, query)) => (base, Some(query)),
        None => (database_url, None),
    };

    let Some((prefix, db_name)) = base.rsplit_once('/') else {
        return database_url.to_string();
    };
    if db_name.is_empty() || db_name.ends_with("_test") {
        return database_url.to_string();
    }

    match query {
        Some(query) => format!("{prefix}/{db_name}_test?{query}"),
        None => format!("{prefix}/{db_name}_test"),
    }
}

#[cfg(test)]
mod tests {
    use super::with_test_db_suffix;

    #[test]
    fn appends_test_suffix_to_database_name() {
        assert_eq!(
            with_test_db_suffix("postgres://u:p@localhost/chat"),
            "postgres://u:p@localhost/chat_test"
        );
        assert_eq!(
            with_test_db_suffix("postgres://localhost/chat?sslmode=disable"),
            "postgres://localhost/chat_test?sslmode=disable"
        );
    }

    #[test]
    fn leaves_test_databases_alone() {
        assert_eq!(
            with_test_db_suffix("postgres://localhost/chat_test"),
            "postgres://localhost/chat_test"
        );
    }
}
