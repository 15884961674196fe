//! Tenant records and their domains.

use serde::{Deserialize, Serialize};

use super::id::TenantId;

/// A domain configured for a tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantDomain {
    /// Host name, without scheme or port.
    pub domain: String,
    /// Whether the admin UI may be used from this domain.
    #[serde(default)]
    pub cms: bool,
}

impl TenantDomain {
    /// A domain that only serves the tenant's public site.
    pub fn public(domain: impl Into<String>) -> Self {
        Self {
            domain: normalize_host(&domain.into()),
            cms: false,
        }
    }

    /// A domain that also serves the admin UI.
    pub fn cms(domain: impl Into<String>) -> Self {
        Self {
            domain: normalize_host(&domain.into()),
            cms: true,
        }
    }
}

/// An organization owning users, content and domains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    /// Identifier.
    pub id: TenantId,
    /// Display name.
    pub name: String,
    /// URL-safe short name.
    pub slug: String,
    /// Domains routed to this tenant.
    #[serde(default)]
    pub domains: Vec<TenantDomain>,
    /// Key used by the tenant's machine clients.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
}

impl Tenant {
    /// Creates a tenant without domains or API key.
    pub fn new(id: impl Into<TenantId>, name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            slug: slug.into(),
            domains: Vec::new(),
            api_key: None,
        }
    }

    /// Adds a domain.
    pub fn with_domain(mut self, domain: TenantDomain) -> Self {
        self.domains.push(domain);
        self
    }

    /// Sets the machine API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Domains tagged for admin UI use.
    pub fn cms_domains(&self) -> impl Iterator<Item = &str> {
        self.domains
            .iter()
            .filter(|d| d.cms)
            .map(|d| d.domain.as_str())
    }

    /// Returns `true` if `host` is one of this tenant's domains.
    pub fn serves_host(&self, host: &str) -> bool {
        let host = normalize_host(host);
        self.domains.iter().any(|d| d.domain == host)
    }
}

/// Normalizes a `Host` header value for comparison: trims whitespace,
/// lower-cases, drops a trailing dot and any `:port` suffix.
///
/// ```
/// use meridian_tenancy::tenant::normalize_host;
///
/// assert_eq!(normalize_host("CMS.Example.com:8443"), "cms.example.com");
/// assert_eq!(normalize_host("[::1]:3000"), "[::1]");
/// ```
pub fn normalize_host(host: &str) -> String {
    let host = host.trim();
    let without_port = if host.starts_with('[') {
        // IPv6 literal
        match host.find(']') {
            Some(end) => &host[..=end],
            None => host,
        }
    } else {
        match host.rsplit_once(':') {
            Some((name, port)) if port.chars().all(|c| c.is_ascii_digit()) => name,
            _ => host,
        }
    };
    without_port.trim_end_matches('.').to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_host() {
        assert_eq!(normalize_host("example.com"), "example.com");
        assert_eq!(normalize_host("Example.COM:3000"), "example.com");
        assert_eq!(normalize_host(" example.com. "), "example.com");
        assert_eq!(normalize_host("[::1]:8080"), "[::1]");
    }

    #[test]
    fn test_cms_domains_filter() {
        let tenant = Tenant::new(7, "Acme", "acme")
            .with_domain(TenantDomain::cms("cms.acme.test"))
            .with_domain(TenantDomain::public("www.acme.test"));
        let cms: Vec<_> = tenant.cms_domains().collect();
        assert_eq!(cms, vec!["cms.acme.test"]);
    }

    #[test]
    fn test_serves_host_ignores_port_and_case() {
        let tenant = Tenant::new(7, "Acme", "acme").with_domain(TenantDomain::public("www.acme.test"));
        assert!(tenant.serves_host("WWW.acme.test:443"));
        assert!(!tenant.serves_host("acme.test"));
    }

    #[test]
    fn test_api_key_not_serialized() {
        let tenant = Tenant::new(7, "Acme", "acme").with_api_key("secret");
        let json = serde_json::to_value(&tenant).unwrap();
        assert!(json.get("apiKey").is_none());
    }
}
