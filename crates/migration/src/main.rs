use sea_orm::Database;
use sea_orm_migration::prelude::*;

const DEFAULT_SQLITE_PATH: &str = "balance.db";

/// `DATABASE_URL` wins; otherwise the file named by the server's
/// `BALANCE__DATABASE__SQLITE` setting, so both binaries touch the same ledger.
fn database_url(var: impl Fn(&str) -> Option<String>) -> String {
    if let Some(url) = var("DATABASE_URL") {
        return url;
    }
    let path = var("BALANCE__DATABASE__SQLITE").unwrap_or_else(|| DEFAULT_SQLITE_PATH.to_string());
    format!("sqlite:{path}?mode=rwc")
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut args = std::env::args().skip(1);
    let cmd = args.next().unwrap_or_else(|| "up".to_string());

    let db = Database::connect(database_url(|key| std::env::var(key).ok())).await?;

    match cmd.as_str() {
        "up" => migration::Migrator::up(&db, None).await?,
        "down" => migration::Migrator::down(&db, None).await?,
        "fresh" => migration::Migrator::fresh(&db).await?,
        "status" => migration::Migrator::status(&db).await?,
        _ => {
            eprintln!("Usage: migration [up|down|fresh|status]");
            eprintln!("Database: DATABASE_URL, or BALANCE__DATABASE__SQLITE=<path> (default {DEFAULT_SQLITE_PATH})");
            std::process::exit(2);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_defaults_to_server_database_file() {
        assert_eq!(database_url(|_| None), "sqlite:balance.db?mode=rwc");
    }

    #[test]
    fn url_follows_server_setting() {
        let url = database_url(|key| {
            (key == "BALANCE__DATABASE__SQLITE").then(|| "/var/lib/balance/ledger.db".to_string())
        });
        assert_eq!(url, "sqlite:/var/lib/balance/ledger.db?mode=rwc");
    }

    #[test]
    fn explicit_url_wins() {
        let url = database_url(|key| match key {
            "DATABASE_URL" => Some("sqlite::memory:".to_string()),
            _ => Some("ignored.db".to_string()),
        });
        assert_eq!(url, "sqlite::memory:");
    }
}
