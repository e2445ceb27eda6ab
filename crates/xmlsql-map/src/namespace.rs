//! Namespace stripping for element names.

/// Strips one configured namespace from `{uri}local` element names before config matching.
///
/// Names in any other namespace are returned unchanged and so never match a config tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceNormalizer {
    prefix: Option<String>,
}

impl NamespaceNormalizer {
    /// Accepts the namespace either as a bare URI or already braced (`{uri}`).
    ///
    /// A missing or blank namespace yields a no-op normalizer.
    pub fn new(namespace: Option<&str>) -> Self {
        let prefix = namespace
            .map(str::trim)
            .map(|ns| ns.trim_start_matches('{').trim_end_matches('}'))
            .filter(|ns| !ns.is_empty())
            .map(|ns| format!("{{{ns}}}"));
        Self { prefix }
    }

    pub fn is_active(&self) -> bool {
        self.prefix.is_some()
    }

    /// Returns `name` without the configured namespace qualifier.
    pub fn normalize<'a>(&self, name: &'a str) -> &'a str {
        match &self.prefix {
            Some(prefix) => name.strip_prefix(prefix.as_str()).unwrap_or(name),
            None => name,
        }
    }
}
