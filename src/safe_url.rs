//! URL parsing with the scheme, credentials and hostname checks.

use url::Url;

use crate::error::Error;
use crate::hostname::{normalize_hostname, NormalizedHost};

/// An absolute http(s) URL with no userinfo and a non-empty host.
///
/// This is the structural half of a check; whether the host is safe to
/// contact is decided by [`check_url`](crate::check_url).
#[derive(Debug, Clone)]
pub struct SafeUrl {
    inner: Url,
    host: NormalizedHost,
}

impl SafeUrl {
    /// Parse a URL string and run the structural checks.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidUrl`] if the input is not an absolute URL
    /// - [`Error::InvalidScheme`] for anything but http/https
    /// - [`Error::CredentialsNotAllowed`] if `user:pass@` is present
    /// - [`Error::InvalidHostname`] if the host normalizes to nothing
    pub fn parse(input: &str) -> Result<Self, Error> {
        let url = Url::parse(input).map_err(|e| Error::invalid_url(input, e.to_string()))?;
        Self::from_url(url)
    }

    /// Run the structural checks on an already-parsed URL.
    pub fn from_url(url: Url) -> Result<Self, Error> {
        match url.scheme() {
            "http" | "https" => {}
            scheme => return Err(Error::invalid_scheme(url.as_str(), scheme)),
        }

        if !url.username().is_empty() || url.password().is_some() {
            return Err(Error::CredentialsNotAllowed {
                url: without_credentials(&url),
            });
        }

        let host = url
            .host_str()
            .and_then(normalize_hostname)
            .ok_or_else(|| Error::InvalidHostname {
                url: url.as_str().to_string(),
            })?;

        Ok(Self { inner: url, host })
    }

    /// Get the normalized hostname. IPv6 literals keep their brackets.
    pub fn host(&self) -> &NormalizedHost {
        &self.host
    }

    /// Get the port, defaulting to 80 for http and 443 for https.
    pub fn port(&self) -> u16 {
        self.inner.port_or_known_default().unwrap_or(80)
    }

    pub fn path(&self) -> &str {
        self.inner.path()
    }

    pub fn as_str(&self) -> &str {
        self.inner.as_str()
    }

    pub fn is_https(&self) -> bool {
        self.inner.scheme() == "https"
    }

    pub fn into_url(self) -> Url {
        self.inner
    }
}

/// The URL with userinfo removed, so secrets never reach logs or errors.
fn without_credentials(url: &Url) -> String {
    let mut redacted = url.clone();
    // Only fails for cannot-be-a-base URLs, which http(s) never are.
    let _ = redacted.set_username("");
    let _ = redacted.set_password(None);
    redacted.to_string()
}
