use url::Url;

/// Ordered list of known provider substrings (domain fragments), loaded once
/// from config. Matching is plain substring containment; the first entry in
/// registration order decides which provider label is reported.
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    entries: Vec<String>,
}

/// Result of checking a link against the registry. `provider` is the matched
/// registry entry, or a best-effort host label for unsupported links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub supported: bool,
    pub provider: String,
}

impl ProviderRegistry {
    pub fn new(entries: Vec<String>) -> Self {
        Self { entries }
    }

    pub fn classify(&self, link: &str) -> Classification {
        if let Some(entry) = self.entries.iter().find(|e| link.contains(e.as_str())) {
            return Classification {
                supported: true,
                provider: entry.clone(),
            };
        }

        Classification {
            supported: false,
            provider: host_label(link),
        }
    }
}

/// Best-effort provider label for a link that matched no registry entry:
/// the URL's host with a leading `www.` stripped, or `"unknown"` when the
/// link doesn't parse as a URL at all.
fn host_label(link: &str) -> String {
    Url::parse(link)
        .ok()
        .and_then(|u| {
            u.host_str()
                .map(|h| h.trim_start_matches("www.").to_string())
        })
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ProviderRegistry {
        ProviderRegistry::new(vec![
            "instagram.com".to_string(),
            "tiktok.com".to_string(),
        ])
    }

    #[test]
    fn test_supported_link_reports_matched_entry() {
        let c = registry().classify("https://instagram.com/reel/abc123");
        assert!(c.supported);
        assert_eq!(c.provider, "instagram.com");
    }

    #[test]
    fn test_first_entry_in_order_wins() {
        // Both entries appear in the link; registration order decides.
        let c = registry().classify("https://instagram.com/share?via=tiktok.com");
        assert!(c.supported);
        assert_eq!(c.provider, "instagram.com");
    }

    #[test]
    fn test_unsupported_link_gets_host_label() {
        let c = registry().classify("http://example.org/x");
        assert!(!c.supported);
        assert_eq!(c.provider, "example.org");
    }

    #[test]
    fn test_www_prefix_is_stripped() {
        let c = registry().classify("https://www.example.org/video/1");
        assert!(!c.supported);
        assert_eq!(c.provider, "example.org");
    }

    #[test]
    fn test_malformed_link_falls_back_to_unknown() {
        let c = registry().classify("https://");
        assert!(!c.supported);
        assert_eq!(c.provider, "unknown");
    }

    #[test]
    fn test_empty_registry_supports_nothing() {
        let c = ProviderRegistry::new(Vec::new()).classify("https://instagram.com/reel/1");
        assert!(!c.supported);
        assert_eq!(c.provider, "instagram.com");
    }
}
