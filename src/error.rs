use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("API_KEY is missing. Set it in the environment or in a .env file")]
    MissingApiKey,

    #[error("weather request for {city} failed: {source}")]
    Request {
        city: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("could not open weather store {path}: {source}")]
    Connection {
        path: String,
        #[source]
        source: diesel::ConnectionError,
    },

    #[error("weather store query failed: {0}")]
    Query(#[from] diesel::result::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Opens the store at `path`, keeping the path in the error
pub(crate) fn open_store(path: &str) -> Result<diesel::sqlite::SqliteConnection> {
    db::establish_connection(path).map_err(|source| Error::Connection {
        path: path.to_string(),
        source,
    })
}
