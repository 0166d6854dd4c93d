use crate::errors::AppError;

const DEFAULT_MAX_CONNECTIONS: u32 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| AppError::configuration("DATABASE_URL not set"))?;
        let max_connections = std::env::var("DB_MAX_CONNECTIONS")
            .map(|val| val.parse::<u32>())
            .unwrap_or(Ok(DEFAULT_MAX_CONNECTIONS))
            .map_err(|_| AppError::configuration("DB_MAX_CONNECTIONS must be a valid integer"))?;

        if max_connections == 0 {
            return Err(AppError::configuration("DB_MAX_CONNECTIONS must be at least 1"));
        }

        Ok(Self {
            database_url,
            max_connections,
        })
    }
}

/// Load `.env` from the working directory, falling back to the crate directory.
pub fn load_env() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    let crate_env = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
    let _ = dotenvy::from_path(crate_env);
}
