//! Request decorators for feeds that require credentials.

mod api_key;

pub use api_key::ApiKey;
