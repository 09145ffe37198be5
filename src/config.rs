use std::path::PathBuf;

/// Runtime configuration, read once at startup from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub people_csv: PathBuf,
    pub products_csv: PathBuf,
    pub bind: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            people_csv: env_path("DECKGEN_PEOPLE_CSV", "People.csv"),
            products_csv: env_path("DECKGEN_PRODUCTS_CSV", "Products.csv"),
            bind: std::env::var("DECKGEN_BIND")
                .unwrap_or_else(|_| "127.0.0.1:8080".to_string()),
        }
    }
}

fn env_path(var: &str, default: &str) -> PathBuf {
    std::env::var(var)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(default))
}
