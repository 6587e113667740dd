//! Display-name shortening.

use regex_lite::{NoExpand, Regex, RegexBuilder};
use tracing::warn;

/// Ordered, case-insensitive find → replace table for station names.
///
/// Each pair is applied to the output of the previous one. Search strings
/// are literal, and pairs with an empty search string are ignored. Case
/// folding is ASCII only.
#[derive(Debug, Clone, Default)]
pub struct NameShortener {
    replacements: Vec<(Regex, String)>,
}

impl NameShortener {
    pub fn new(replacements: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            replacements: replacements
                .into_iter()
                .filter(|(find, _)| !find.is_empty())
                .filter_map(|(find, replace)| {
                    match RegexBuilder::new(&regex_lite::escape(&find))
                        .case_insensitive(true)
                        .build()
                    {
                        Ok(regex) => Some((regex, replace)),
                        Err(e) => {
                            warn!(%find, error = %e, "skipping station name replacement");
                            None
                        }
                    }
                })
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.replacements.is_empty()
    }

    /// Apply every replacement in order.
    pub fn shorten(&self, name: &str) -> String {
        self.replacements
            .iter()
            .fold(name.to_string(), |acc, (find, replace)| {
                find.replace_all(&acc, NoExpand(replace.as_str())).into_owned()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shortener(pairs: &[(&str, &str)]) -> NameShortener {
        NameShortener::new(
            pairs
                .iter()
                .map(|(f, r)| (f.to_string(), r.to_string())),
        )
    }

    #[test]
    fn empty_table_is_identity() {
        let s = NameShortener::default();
        assert!(s.is_empty());
        assert_eq!(s.shorten("de la Commune / Place Jacques-Cartier"), "de la Commune / Place Jacques-Cartier");
    }

    #[test]
    fn replaces_case_insensitively() {
        let s = shortener(&[("street", "St")]);
        assert_eq!(s.shorten("Main STREET / King Street"), "Main St / King St");
    }

    #[test]
    fn applies_in_configured_order() {
        // The second pair sees the output of the first
        let s = shortener(&[("Avenue", "Av"), ("Av", "Ave.")]);
        assert_eq!(s.shorten("Park Avenue"), "Park Ave.");

        let s = shortener(&[("Av", "Ave."), ("Avenue", "Av")]);
        assert_eq!(s.shorten("Park Avenue"), "Park Ave.enue");
    }

    #[test]
    fn ignores_empty_search_strings() {
        let s = shortener(&[("", "x")]);
        assert!(s.is_empty());
        assert_eq!(s.shorten("Berri"), "Berri");
    }

    #[test]
    fn handles_multibyte_names() {
        let s = shortener(&[("métro", "M")]);
        assert_eq!(s.shorten("Métro Mont-Royal"), "M Mont-Royal");
        assert_eq!(s.shorten("Café Ébène"), "Café Ébène");
    }

    #[test]
    fn search_and_replacement_are_literal() {
        let s = shortener(&[("St.", "$1 Saint"), ("(Nord)", "N")]);
        assert_eq!(s.shorten("St. Denis (Nord)"), "$1 Saint Denis N");
        // The dot only matches a dot
        assert_eq!(s.shorten("Sta Maria"), "Sta Maria");
    }
}
