//! Credential handling and SSRF protection.

mod credentials;
mod url_validator;

pub use credentials::ApiKey;
pub use url_validator::{UrlValidator, MAX_REDIRECTS, MAX_URL_LEN};
