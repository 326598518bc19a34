//! CLI subcommands.

pub mod migrate;
pub mod profile;

/// Get database URL with fallback to generic `DATABASE_URL`.
fn database_url() -> Option<String> {
    std::env::var("PORTAL_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()
        .filter(|url| !url.is_empty())
}
