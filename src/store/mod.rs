pub mod kv;
pub mod ledger;
pub mod schema;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read key {key}: {source}")]
    PersistenceReadFailure {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write key {key}: {source}")]
    PersistenceWriteFailure {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("stored value for {key} is corrupt: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}
