// transync: Translation Repository Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Built-in language table.
//!
//! ```text
//! canonical code   de, pt_BR, zh_Hant    (underscore separated)
//! lookup("pt_BR")  --> exact row, else base language "pt", else None
//! ```

/// Language name and gettext plural rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    pub code: &'static str,
    pub name: &'static str,
    pub plurals: u32,
    pub formula: &'static str,
}

impl Language {
    /// `Plural-Forms` header value.
    #[must_use]
    pub fn plural_forms(&self) -> String {
        format!("nplurals={}; plural={};", self.plurals, self.formula)
    }
}

const ONE: &str = "0";
const GERMANIC: &str = "n != 1";
const FRENCH: &str = "n > 1";
const SLAVIC: &str = "n%10==1 && n%100!=11 ? 0 : n%10>=2 && n%10<=4 && (n%100<10 || n%100>=20) ? 1 : 2";
const CZECH: &str = "(n==1) ? 0 : (n>=2 && n<=4) ? 1 : 2";
const POLISH: &str = "n==1 ? 0 : n%10>=2 && n%10<=4 && (n%100<10 || n%100>=20) ? 1 : 2";
const ARABIC: &str = "n==0 ? 0 : n==1 ? 1 : n==2 ? 2 : n%100>=3 && n%100<=10 ? 3 : n%100>=11 ? 4 : 5";

macro_rules! languages {
    ($($code:literal => $name:literal, $plurals:literal, $formula:expr;)+) => {
        &[$(Language { code: $code, name: $name, plurals: $plurals, formula: $formula }),+]
    };
}

static LANGUAGES: &[Language] = languages! {
    "ar" => "Arabic", 6, ARABIC;
    "bg" => "Bulgarian", 2, GERMANIC;
    "ca" => "Catalan", 2, GERMANIC;
    "cs" => "Czech", 3, CZECH;
    "da" => "Danish", 2, GERMANIC;
    "de" => "German", 2, GERMANIC;
    "el" => "Greek", 2, GERMANIC;
    "en" => "English", 2, GERMANIC;
    "en_GB" => "English (United Kingdom)", 2, GERMANIC;
    "eo" => "Esperanto", 2, GERMANIC;
    "es" => "Spanish", 2, GERMANIC;
    "et" => "Estonian", 2, GERMANIC;
    "eu" => "Basque", 2, GERMANIC;
    "fa" => "Persian", 2, FRENCH;
    "fi" => "Finnish", 2, GERMANIC;
    "fr" => "French", 2, FRENCH;
    "ga" => "Irish", 5, "n==1 ? 0 : n==2 ? 1 : (n>2 && n<7) ? 2 :(n>6 && n<11) ? 3 : 4";
    "gl" => "Galician", 2, GERMANIC;
    "he" => "Hebrew", 2, GERMANIC;
    "hi" => "Hindi", 2, FRENCH;
    "hr" => "Croatian", 3, SLAVIC;
    "hu" => "Hungarian", 2, GERMANIC;
    "id" => "Indonesian", 1, ONE;
    "it" => "Italian", 2, GERMANIC;
    "ja" => "Japanese", 1, ONE;
    "ko" => "Korean", 1, ONE;
    "lt" => "Lithuanian", 3, "n%10==1 && n%100!=11 ? 0 : n%10>=2 && (n%100<10 || n%100>=20) ? 1 : 2";
    "lv" => "Latvian", 3, "n%10==0 || n%100>=11 && n%100<=19 ? 0 : n%10==1 && n%100!=11 ? 1 : 2";
    "nb_NO" => "Norwegian Bokmål", 2, GERMANIC;
    "nl" => "Dutch", 2, GERMANIC;
    "pl" => "Polish", 3, POLISH;
    "pt" => "Portuguese", 2, GERMANIC;
    "pt_BR" => "Portuguese (Brazil)", 2, FRENCH;
    "ro" => "Romanian", 3, "n==1 ? 0 : (n==0 || (n%100 > 0 && n%100 < 20)) ? 1 : 2";
    "ru" => "Russian", 3, SLAVIC;
    "sk" => "Slovak", 3, CZECH;
    "sl" => "Slovenian", 4, "n%100==1 ? 0 : n%100==2 ? 1 : n%100==3 || n%100==4 ? 2 : 3";
    "sr" => "Serbian", 3, SLAVIC;
    "sv" => "Swedish", 2, GERMANIC;
    "th" => "Thai", 1, ONE;
    "tr" => "Turkish", 2, GERMANIC;
    "uk" => "Ukrainian", 3, SLAVIC;
    "vi" => "Vietnamese", 1, ONE;
    "zh_Hans" => "Chinese (Simplified)", 1, ONE;
    "zh_Hant" => "Chinese (Traditional)", 1, ONE;
};

/// Normalizes `pt-BR`, `pt-rBR`, `PT_br` to the canonical `pt_BR`.
#[must_use]
pub fn normalize_code(raw: &str) -> String {
    let raw = raw.trim().replace("-r", "_").replace(['-', '@'], "_");
    let mut parts = raw.split('_').filter(|p| !p.is_empty());
    let Some(base) = parts.next() else {
        return String::new();
    };
    let mut code = base.to_ascii_lowercase();
    for part in parts {
        code.push('_');
        if part.len() == 2 {
            code.push_str(&part.to_ascii_uppercase());
        } else if part.len() == 4 {
            let mut chars = part.chars();
            if let Some(first) = chars.next() {
                code.push(first.to_ascii_uppercase());
                code.push_str(&chars.as_str().to_ascii_lowercase());
            }
        } else {
            code.push_str(part);
        }
    }
    code
}

/// Row for a canonical code, falling back to the base language.
#[must_use]
pub fn lookup(code: &str) -> Option<&'static Language> {
    LANGUAGES
        .iter()
        .find(|lang| lang.code == code)
        .or_else(|| {
            let base = code.split('_').next()?;
            LANGUAGES.iter().find(|lang| lang.code == base)
        })
}

/// Display name, the code itself for unknown languages.
#[must_use]
pub fn language_name(code: &str) -> String {
    lookup(code).map_or_else(|| code.to_string(), |lang| lang.name.to_string())
}

/// Plural count, 2 for unknown languages.
#[must_use]
pub fn plural_count(code: &str) -> u32 {
    lookup(code).map_or(2, |lang| lang.plurals)
}

/// Whether a code is well formed: a 2-3 letter base plus optional parts.
#[must_use]
pub fn is_valid_code(code: &str) -> bool {
    let mut parts = code.split('_');
    let base_ok = parts
        .next()
        .is_some_and(|b| (2..=3).contains(&b.len()) && b.bytes().all(|c| c.is_ascii_lowercase()));
    base_ok && parts.all(|p| !p.is_empty() && p.len() <= 8 && p.bytes().all(|c| c.is_ascii_alphanumeric()))
}
