//! Vendor taxonomy for source attribution.
//!
//! The review tracks how many sources rely on private data from a
//! small set of commercial vendors. Dataset cells name these vendors
//! inconsistently ("IDC", "International Data Corporation", "IDC
//! Worldwide Quarterly Tracker"), so matching goes through an alias
//! table normalized to canonical labels.

use std::collections::HashMap;

/// Alias table mapping raw source names to canonical vendor labels.
pub struct VendorTaxonomy {
    /// Lowercased alias -> canonical label.
    aliases: HashMap<String, String>,
}

impl VendorTaxonomy {
    /// Taxonomy with the vendors tracked by the review.
    pub fn new() -> Self {
        let mut taxonomy = Self {
            aliases: HashMap::new(),
        };

        taxonomy.add_vendor("IDC", &["international data corporation", "idc tracker"]);
        taxonomy.add_vendor("Cisco", &["cisco systems", "cisco vni", "cisco visual networking index"]);
        taxonomy.add_vendor("Gartner", &["gartner inc", "gartner group"]);
        taxonomy.add_vendor("Statista", &[]);

        taxonomy
    }

    /// Extend the built-in table with aliases from the config file.
    pub fn with_aliases(extra: &HashMap<String, Vec<String>>) -> Self {
        let mut taxonomy = Self::new();
        for (canonical, aliases) in extra {
            let alias_refs: Vec<&str> = aliases.iter().map(String::as_str).collect();
            taxonomy.add_vendor(canonical, &alias_refs);
        }
        taxonomy
    }

    fn add_vendor(&mut self, canonical: &str, aliases: &[&str]) {
        self.aliases
            .insert(canonical.to_lowercase(), canonical.to_string());
        for alias in aliases {
            self.aliases
                .insert(alias.to_lowercase(), canonical.to_string());
        }
    }

    /// Canonical label for an exact (case-insensitive) alias match.
    pub fn normalize(&self, name: &str) -> Option<String> {
        self.aliases.get(&name.trim().to_lowercase()).cloned()
    }

    /// Detect a vendor inside a longer source cell.
    ///
    /// Tries an exact match first, then whole-phrase containment of
    /// each alias within the lowercased cell. Longest alias wins so
    /// "cisco visual networking index" beats "cisco".
    pub fn detect(&self, cell: &str) -> Option<String> {
        if let Some(canonical) = self.normalize(cell) {
            return Some(canonical);
        }

        let haystack = cell.to_lowercase();
        let mut best: Option<(&str, &String)> = None;
        for (alias, canonical) in &self.aliases {
            if contains_phrase(&haystack, alias) {
                let longer = best.map_or(true, |(a, _)| alias.len() > a.len());
                if longer {
                    best = Some((alias, canonical));
                }
            }
        }
        best.map(|(_, canonical)| canonical.clone())
    }
}

impl Default for VendorTaxonomy {
    fn default() -> Self {
        Self::new()
    }
}

/// Whole-word containment: the alias must not be a fragment of a
/// larger token ("idc" must not match "acidc").
fn contains_phrase(haystack: &str, needle: &str) -> bool {
    let mut start = 0;
    while let Some(pos) = haystack[start..].find(needle) {
        let begin = start + pos;
        let end = begin + needle.len();
        let before_ok = begin == 0
            || !haystack[..begin]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_alphanumeric());
        let after_ok = end == haystack.len()
            || !haystack[end..].chars().next().is_some_and(|c| c.is_alphanumeric());
        if before_ok && after_ok {
            return true;
        }
        start = begin + 1;
    }
    false
}
