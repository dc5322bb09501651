//! Best-effort online resolution of ids to external documentation URLs.

use std::time::Duration;

use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::error::Error;

/// Why a content-service lookup failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// The service answered, but not with a usable response. Affects one id only.
    #[error("malformed response: {0}")]
    Protocol(String),
    /// The service could not be reached.
    #[error("transport failure: {0}")]
    Transport(String),
}

/// An external content-indexing service mapping ids to endpoint fragments.
pub trait ContentService {
    /// Look up the endpoint fragment for `id` in `locale`.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Transport` if the service is unreachable, or
    /// `ServiceError::Protocol` if its answer cannot be understood.
    fn lookup(&self, id: &str, locale: &str) -> Result<Option<String>, ServiceError>;
}

/// Body of a successful lookup response.
#[derive(Debug, Deserialize)]
struct LookupResponse {
    /// Endpoint fragment appended to the base URL and locale.
    endpoint: String,
}

/// `ContentService` over HTTP: `GET <service_url>?id=<id>&locale=<locale>`.
pub struct HttpContentService {
    /// Blocking client with the configured timeout.
    client: reqwest::blocking::Client,
    /// Lookup endpoint.
    service_url: String,
}

impl HttpContentService {
    /// Build a client for `service_url`.
    ///
    /// # Errors
    ///
    /// Returns `Error::OnlineSetup` if the HTTP client cannot be constructed.
    pub fn new(service_url: &str, timeout: Duration) -> Result<Self, Error> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("docxref/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| return Error::OnlineSetup { reason: e.to_string() })?;
        return Ok(Self {
            client,
            service_url: service_url.to_string(),
        });
    }
}

impl ContentService for HttpContentService {
    fn lookup(&self, id: &str, locale: &str) -> Result<Option<String>, ServiceError> {
        let response = self
            .client
            .get(&self.service_url)
            .query(&[("id", id), ("locale", locale)])
            .send()
            .map_err(|e| return ServiceError::Transport(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(ServiceError::Protocol(format!("service returned status {status}")));
        }
        let body: LookupResponse = response
            .json()
            .map_err(|e| return ServiceError::Protocol(e.to_string()))?;
        if body.endpoint.is_empty() {
            return Ok(None);
        }
        return Ok(Some(body.endpoint));
    }
}

/// Resolves ids through a [`ContentService`], caching every definitive answer.
///
/// The first transport failure disables the resolver for the rest of its life.
/// A protocol failure only fails the id that caused it.
pub struct OnlineResolver {
    /// URL template base, without trailing slash.
    base_url: String,
    /// Definitive answers: `Some(endpoint)` for hits, `None` for "not found".
    cache: FxHashMap<String, Option<String>>,
    /// Set after the first transport failure.
    disabled: bool,
    /// Locale inserted into built URLs and sent with lookups.
    locale: String,
    /// The live service.
    service: Box<dyn ContentService>,
}

impl OnlineResolver {
    /// Build the full URL for an endpoint fragment in the current locale.
    pub fn build_url(&self, endpoint: &str) -> String {
        return build_url(&self.base_url, &self.locale, endpoint);
    }

    /// The endpoint fragment for `id`, from the cache or the service.
    pub fn endpoint(&mut self, id: &str) -> Option<String> {
        if let Some(cached) = self.cache.get(id) {
            return cached.clone();
        }
        if self.disabled {
            return None;
        }

        match self.service.lookup(id, &self.locale) {
            Ok(endpoint) => {
                tracing::debug!(id, found = endpoint.is_some(), "online lookup");
                self.cache.insert(id.to_string(), endpoint.clone());
                return endpoint;
            },
            Err(ServiceError::Protocol(reason)) => {
                tracing::warn!(id, %reason, "online lookup returned an unusable response");
                return None;
            },
            Err(ServiceError::Transport(reason)) => {
                tracing::warn!(%reason, "online resolver unreachable, disabled for this run");
                self.disabled = true;
                return None;
            },
        }
    }

    /// Whether a transport failure has disabled the resolver.
    pub const fn is_disabled(&self) -> bool {
        return self.disabled;
    }

    /// The current locale.
    pub fn locale(&self) -> &str {
        return &self.locale;
    }

    /// Create an enabled resolver with an empty cache.
    pub fn new(service: Box<dyn ContentService>, base_url: &str, locale: &str) -> Self {
        return Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            cache: FxHashMap::default(),
            disabled: false,
            locale: locale.to_string(),
            service,
        };
    }

    /// Resolve `id` to a full URL.
    pub fn resolve(&mut self, id: &str) -> Option<String> {
        let endpoint = self.endpoint(id)?;
        return Some(self.build_url(&endpoint));
    }

    /// Change the locale used for new lookups and built URLs.
    pub fn set_locale(&mut self, locale: &str) {
        locale.clone_into(&mut self.locale);
    }
}

/// `base/{locale}/{endpoint}`, tolerating stray slashes at the joins.
pub fn build_url(base_url: &str, locale: &str, endpoint: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let endpoint = endpoint.trim_start_matches('/');
    return format!("{base}/{locale}/{endpoint}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Fake service answering from a fixed table, counting calls.
    struct FakeService {
        calls: Rc<Cell<usize>>,
        failure: Option<ServiceError>,
    }

    impl ContentService for FakeService {
        fn lookup(&self, id: &str, locale: &str) -> Result<Option<String>, ServiceError> {
            self.calls.set(self.calls.get() + 1);
            if let Some(failure) = &self.failure {
                return Err(failure.clone());
            }
            Ok(match id {
                "T:System.String" => Some(format!("dotnet/api/system.string?locale={locale}")),
                _ => None,
            })
        }
    }

    fn resolver(failure: Option<ServiceError>) -> (OnlineResolver, Rc<Cell<usize>>) {
        let calls = Rc::new(Cell::new(0));
        let service = FakeService { calls: Rc::clone(&calls), failure };
        (OnlineResolver::new(Box::new(service), "https://docs.example.com/", "en-us"), calls)
    }

    #[test]
    fn repeated_resolution_hits_the_cache() {
        let (mut resolver, calls) = resolver(None);
        let url = resolver.resolve("T:System.String").unwrap();
        assert_eq!(url, "https://docs.example.com/en-us/dotnet/api/system.string?locale=en-us");

        assert_eq!(resolver.resolve("T:System.String").unwrap(), url);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn not_found_is_cached_too() {
        let (mut resolver, calls) = resolver(None);
        assert!(resolver.resolve("T:Nope").is_none());
        assert!(resolver.resolve("T:Nope").is_none());
        assert_eq!(calls.get(), 1);
        assert!(!resolver.is_disabled());
    }

    #[test]
    fn transport_failure_disables_permanently() {
        let (mut resolver, calls) = resolver(Some(ServiceError::Transport("refused".to_string())));
        assert!(resolver.resolve("T:System.String").is_none());
        assert!(resolver.is_disabled());
        assert!(resolver.resolve("T:System.Int32").is_none());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn protocol_failure_keeps_resolver_enabled() {
        let (mut resolver, calls) = resolver(Some(ServiceError::Protocol("not json".to_string())));
        assert!(resolver.resolve("T:System.String").is_none());
        assert!(!resolver.is_disabled());
        assert!(resolver.resolve("T:System.String").is_none());
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn locale_changes_built_urls() {
        let (mut resolver, _) = resolver(None);
        resolver.set_locale("de-de");
        assert_eq!(resolver.locale(), "de-de");
        assert_eq!(resolver.build_url("/a/b"), "https://docs.example.com/de-de/a/b");
    }
}
