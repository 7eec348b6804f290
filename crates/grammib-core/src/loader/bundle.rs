//! Bundled standard modules.
//!
//! A small resource table of the base SMI modules, keyed by module name.
//! The loader falls back to these after the configured locators, so the
//! standard imports resolve without any files on disk.

/// The bundled modules.
const BUNDLED: &[(&str, &str)] = &[
    ("RFC1155-SMI", include_str!("../../mibs/RFC1155-SMI.mib")),
    ("RFC-1212", include_str!("../../mibs/RFC-1212.mib")),
    ("RFC-1215", include_str!("../../mibs/RFC-1215.mib")),
    ("RFC1213-MIB", include_str!("../../mibs/RFC1213-MIB.mib")),
    ("SNMPv2-SMI", include_str!("../../mibs/SNMPv2-SMI.mib")),
    ("SNMPv2-TC", include_str!("../../mibs/SNMPv2-TC.mib")),
    ("SNMPv2-CONF", include_str!("../../mibs/SNMPv2-CONF.mib")),
];

/// Look up a bundled module's source text by module name.
#[must_use]
pub fn bundled(name: &str) -> Option<&'static str> {
    BUNDLED
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, text)| *text)
}

/// The names of all bundled modules.
pub fn bundled_names() -> impl Iterator<Item = &'static str> {
    BUNDLED.iter().map(|(n, _)| *n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert!(bundled("RFC1213-MIB").is_some());
        assert!(bundled("NO-SUCH-MIB").is_none());
    }

    #[test]
    fn test_names_match_module_headers() {
        for (name, text) in BUNDLED {
            let first_word = text.split_whitespace().find(|w| !w.starts_with("--"));
            assert_eq!(first_word, Some(*name), "bundled {name} header mismatch");
        }
    }
}
