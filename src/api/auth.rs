//! Authentication handling for the OpenProject API.
//!
//! OpenProject authenticates API requests with Basic Auth using the fixed
//! username `apikey` and the user's API key as the password.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

/// The fixed Basic Auth username for API key authentication.
const AUTH_USER: &str = "apikey";

/// Authentication credentials for OpenProject.
#[derive(Debug, Clone)]
pub struct Auth {
    /// The complete Base64-encoded authorization header value.
    auth_header: String,
}

impl Auth {
    /// Create new authentication credentials from an API key.
    ///
    /// The key is immediately encoded and the raw key is not stored.
    pub fn new(apikey: &str) -> Self {
        Self {
            auth_header: build_auth_header(apikey),
        }
    }

    /// Get the authorization header value for HTTP requests.
    ///
    /// Returns the complete "Basic ..." header value.
    pub fn header_value(&self) -> &str {
        &self.auth_header
    }
}

/// Build the Basic Auth header value.
///
/// Encodes "apikey:<key>" in Base64 and prepends "Basic ".
fn build_auth_header(apikey: &str) -> String {
    let credentials = format!("{}:{}", AUTH_USER, apikey);
    let encoded = BASE64.encode(credentials.as_bytes());
    format!("Basic {}", encoded)
}
