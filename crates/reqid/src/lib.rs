//! Request-scoped identifier injection.
//!
//! On every request the injector generates a fresh random identifier for the
//! primary slot (`request_id`) and one for each configured additional name
//! (`request_id.<name>`), and writes them into a per-request variable store
//! that later pipeline stages read by key.

pub mod config;
pub mod error;
pub mod generate;
pub mod handler;
pub mod layer;
pub mod reload;
pub mod store;

pub use config::{materialize, IdConfig, RawAdditional, RawIdConfig, RawLength, DEFAULT_LENGTH, MAX_LENGTH};
pub use error::{ConfigError, GenerateError};
pub use generate::{generate, try_generate, ALPHABET};
pub use handler::RequestIdInjector;
pub use layer::{RequestIdLayer, RequestIdService};
pub use reload::ConfigHandle;
pub use store::{derived_key, RequestVars, VariableStore, PRIMARY_KEY};
