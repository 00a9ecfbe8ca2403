//! Character sets and `Accept-Charset` negotiation.
//!
//! # Design Decisions
//! - A charset is identified by its canonical IANA name; lookups by alias
//!   resolve to the same identity
//! - Names outside the built-in alias table are still usable, they simply
//!   have no aliases
//! - The pool used when a resource declares no charsets is supplied by the
//!   caller, never read from process-wide state

use std::fmt;

use crate::negotiation::weighted::{sort_by_quality, WeightedValue};

/// Canonical name followed by its registered aliases.
const REGISTRY: &[&[&str]] = &[
    &["UTF-8", "unicode-1-1-utf-8", "utf8"],
    &["UTF-16", "utf16", "unicode"],
    &["UTF-16BE", "x-utf-16be", "unicodebigunmarked"],
    &["UTF-16LE", "x-utf-16le", "unicodelittleunmarked"],
    &["US-ASCII", "ascii", "iso-ir-6", "ansi_x3.4-1968", "iso646-us", "us", "ibm367", "cp367", "csascii", "default"],
    &["ISO-8859-1", "iso-ir-100", "iso_8859-1", "latin1", "l1", "ibm819", "cp819", "csisolatin1", "819", "iso8859_1", "iso_8859_1"],
    &["ISO-8859-2", "iso-ir-101", "iso_8859-2", "latin2", "l2", "csisolatin2", "iso8859_2"],
    &["ISO-8859-5", "iso-ir-144", "iso_8859-5", "cyrillic", "csisolatincyrillic", "iso8859_5"],
    &["ISO-8859-15", "iso_8859-15", "latin-9", "latin9", "l9", "csisolatin9", "iso8859_15"],
    &["windows-1252", "cp1252", "cp5348"],
    &["windows-1251", "cp1251", "cp5347"],
    &["KOI8-R", "koi8", "cskoi8r"],
    &["Shift_JIS", "shift-jis", "sjis", "ms_kanji", "csshiftjis", "x-sjis"],
    &["EUC-JP", "eucjp", "x-euc-jp", "cseucpkdfmtjapanese", "extended_unix_code_packed_format_for_japanese"],
    &["EUC-KR", "euckr", "ksc5601", "ks_c_5601-1987", "5601", "cseuckr"],
    &["GB2312", "gb2312-80", "gb2312-1980", "euc-cn", "euccn", "x-euc-cn", "csgb2312"],
    &["GBK", "cp936", "windows-936"],
    &["Big5", "csbig5", "big-5", "cn-big5", "big-five", "bigfive"],
    &["Big5-HKSCS", "big5hk", "big5-hkscs", "big5hkscs"],
];

/// A character set identified by canonical name.
#[derive(Debug, Clone)]
pub struct Charset {
    name: String,
    aliases: &'static [&'static str],
}

impl Charset {
    /// Resolve a name or alias. Unknown names become alias-free charsets.
    pub fn for_name(name: &str) -> Self {
        let name = name.trim();
        for entry in REGISTRY {
            if entry.iter().any(|n| n.eq_ignore_ascii_case(name)) {
                return Self {
                    name: entry[0].to_string(),
                    aliases: &entry[1..],
                };
            }
        }
        Self {
            name: name.to_string(),
            aliases: &[],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn aliases(&self) -> &'static [&'static str] {
        self.aliases
    }

    /// Whether `label` names this charset, canonically or by alias.
    pub fn is_named(&self, label: &str) -> bool {
        self.name.eq_ignore_ascii_case(label)
            || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(label))
    }

    fn is_any_of(&self, values: &[WeightedValue]) -> bool {
        values.iter().any(|v| self.is_named(v.token()))
    }
}

impl PartialEq for Charset {
    fn eq(&self, other: &Self) -> bool {
        self.name.eq_ignore_ascii_case(&other.name)
    }
}

impl Eq for Charset {}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Result of charset negotiation when something is acceptable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CharsetChoice {
    /// No `Accept-Charset` header: any charset will do.
    Unconstrained,
    Selected(Charset),
}

/// Charset negotiation following RFC 2616 §14.2.
#[derive(Debug, Clone)]
pub struct CharsetNegotiator {
    default_pool: Vec<Charset>,
}

impl CharsetNegotiator {
    /// `default_pool` stands in for the server-supported set whenever a caller
    /// passes an empty one.
    pub fn new(default_pool: Vec<Charset>) -> Self {
        Self { default_pool }
    }

    pub fn default_pool(&self) -> &[Charset] {
        &self.default_pool
    }

    /// Returns `None` when nothing the server supports is acceptable.
    pub fn select(
        &self,
        supported: &[Charset],
        preferences: Option<&[WeightedValue]>,
    ) -> Option<CharsetChoice> {
        let Some(preferences) = preferences else {
            return Some(CharsetChoice::Unconstrained);
        };
        let pool = if supported.is_empty() {
            &self.default_pool
        } else {
            supported
        };

        let disallowed: Vec<WeightedValue> = preferences
            .iter()
            .filter(|p| !p.is_acceptable())
            .cloned()
            .collect();

        let mut ranked = preferences.to_vec();
        if !ranked.iter().any(WeightedValue::is_wildcard) {
            ranked.push(WeightedValue::new("*", 0.0));
            let latin1 = Charset::for_name("ISO-8859-1");
            if !latin1.is_any_of(&ranked) {
                ranked.push(WeightedValue::new(latin1.name(), 1.0));
            }
        }
        sort_by_quality(&mut ranked);

        for preference in ranked.iter().take_while(|p| p.is_acceptable()) {
            let found = if preference.is_wildcard() {
                pool.iter().find(|c| !c.is_any_of(&disallowed))
            } else {
                pool.iter()
                    .find(|c| c.is_named(preference.token()) && !c.is_any_of(&disallowed))
            };
            if let Some(charset) = found {
                return Some(CharsetChoice::Selected(charset.clone()));
            }
        }

        None
    }
}
