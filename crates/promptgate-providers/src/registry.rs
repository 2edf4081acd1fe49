//! Provider registry — static specs for the backends PromptGate knows about.
//!
//! Each `ProviderSpec` describes how a backend is recognised from the
//! `MODEL_PROVIDER` selector and which environment variables configure it.
//! The factory consults [`find_by_selector`]; the `status` command walks
//! [`PROVIDERS`] to report what is configured.

use crate::traits::ProviderKind;

// ─────────────────────────────────────────────
// ProviderSpec — static metadata for one provider
// ─────────────────────────────────────────────

/// Static specification describing one provider backend.
#[derive(Clone, Debug)]
pub struct ProviderSpec {
    /// Internal name (e.g. `"google_genai"`).
    pub name: &'static str,
    pub kind: ProviderKind,
    /// Human-readable name for logs and status output.
    pub display_name: &'static str,
    /// Lowercase selector values matched exactly.
    pub selectors: &'static [&'static str],
    /// Lowercase selector prefixes. E.g. `"gemini"` matches `"gemini-pro"`.
    pub selector_prefixes: &'static [&'static str],
    /// Environment variables that configure this backend.
    pub env_keys: &'static [&'static str],
    /// Whether the factory may pick this backend from `MODEL_PROVIDER`.
    ///
    /// Groq is only reachable explicitly (e.g. `ask --backend groq`).
    pub selectable: bool,
}

impl ProviderSpec {
    fn matches(&self, selector_lower: &str) -> bool {
        self.selectors.contains(&selector_lower)
            || self
                .selector_prefixes
                .iter()
                .any(|p| selector_lower.starts_with(p))
    }
}

// ─────────────────────────────────────────────
// Known providers
// ─────────────────────────────────────────────

/// All known providers, in matching priority order.
pub static PROVIDERS: &[ProviderSpec] = &[
    ProviderSpec {
        name: "mock",
        kind: ProviderKind::Mock,
        display_name: "Mock",
        selectors: &["mock"],
        selector_prefixes: &[],
        env_keys: &["MOCK_LLM"],
        // Selected by the MOCK_LLM flag, never by MODEL_PROVIDER.
        selectable: false,
    },
    ProviderSpec {
        name: "google_genai",
        kind: ProviderKind::Gemini,
        display_name: "Gemini",
        selectors: &["google_genai"],
        selector_prefixes: &["gemini"],
        env_keys: &[
            "GOOGLE_API_KEY",
            "GOOGLE_APPLICATION_CREDENTIALS",
            "GOOGLE_OAUTH_ACCESS_TOKEN",
        ],
        selectable: true,
    },
    ProviderSpec {
        name: "groq",
        kind: ProviderKind::Groq,
        display_name: "Groq",
        selectors: &["groq"],
        selector_prefixes: &[],
        env_keys: &["GROQ_API_KEY", "GROQ_API_URL"],
        selectable: false,
    },
];

/// The backend used when nothing else matches.
pub fn primary() -> &'static ProviderSpec {
    &PROVIDERS[1]
}

// ─────────────────────────────────────────────
// Matching functions
// ─────────────────────────────────────────────

/// Find the selectable provider named by a `MODEL_PROVIDER` value.
///
/// Matching is case-insensitive. Returns `None` for anything unrecognised;
/// the caller decides the fallback.
pub fn find_by_selector(selector: &str) -> Option<&'static ProviderSpec> {
    let lower = selector.trim().to_lowercase();
    PROVIDERS
        .iter()
        .find(|spec| spec.selectable && spec.matches(&lower))
}

/// Find any provider (selectable or not) by name, selector or kind label.
///
/// Used for explicit choices such as the CLI `--backend` flag.
pub fn find_by_name(name: &str) -> Option<&'static ProviderSpec> {
    let lower = name.trim().to_lowercase();
    PROVIDERS
        .iter()
        .find(|spec| spec.matches(&lower) || spec.kind.to_string() == lower)
}

/// Find the spec for a provider kind.
pub fn find_by_kind(kind: ProviderKind) -> &'static ProviderSpec {
    PROVIDERS
        .iter()
        .find(|spec| spec.kind == kind)
        .unwrap_or_else(primary)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_google_genai() {
        let spec = find_by_selector("google_genai").unwrap();
        assert_eq!(spec.kind, ProviderKind::Gemini);
    }

    #[test]
    fn test_selector_gemini_prefix_case_insensitive() {
        for selector in ["gemini", "gemini-pro", "GEMINI-1.5", "Gemini_flash"] {
            let spec = find_by_selector(selector).unwrap();
            assert_eq!(spec.name, "google_genai", "selector {selector}");
        }
    }

    #[test]
    fn test_selector_unknown() {
        assert!(find_by_selector("openai").is_none());
        assert!(find_by_selector("").is_none());
        assert!(find_by_selector("my-gemini").is_none());
    }

    #[test]
    fn test_groq_and_mock_not_selectable() {
        assert!(find_by_selector("groq").is_none());
        assert!(find_by_selector("mock").is_none());
    }

    #[test]
    fn test_find_by_name() {
        assert_eq!(find_by_name("groq").unwrap().kind, ProviderKind::Groq);
        assert_eq!(find_by_name("MOCK").unwrap().kind, ProviderKind::Mock);
        assert_eq!(find_by_name("gemini").unwrap().kind, ProviderKind::Gemini);
        assert!(find_by_name("anthropic").is_none());
    }

    #[test]
    fn test_find_by_kind() {
        assert_eq!(find_by_kind(ProviderKind::Groq).env_keys[0], "GROQ_API_KEY");
        assert_eq!(find_by_kind(ProviderKind::Gemini).display_name, "Gemini");
    }

    #[test]
    fn test_primary_is_gemini() {
        assert_eq!(primary().kind, ProviderKind::Gemini);
        assert!(primary().selectable);
    }

    #[test]
    fn test_all_providers_have_unique_names() {
        let names: Vec<&str> = PROVIDERS.iter().map(|s| s.name).collect();
        let mut unique = names.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(names.len(), unique.len(), "Duplicate provider names found");
    }
}
