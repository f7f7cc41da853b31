//! URL slugs for products and categories.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when creating a [`Slug`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SlugError {
    /// Nothing usable was left after normalization.
    #[error("o slug não pode ficar vazio")]
    Empty,
    /// An explicit slug contains characters outside `a-z`, `0-9` and `-`.
    #[error("slug inválido: use apenas letras minúsculas, números e hífens")]
    InvalidCharacters,
}

/// A lowercase, hyphen-separated URL segment.
///
/// ```
/// use mais_saude_core::Slug;
///
/// let slug = Slug::from_name("Protetor Solar FPS 50 – Pele Sensível").unwrap();
/// assert_eq!(slug.as_str(), "protetor-solar-fps-50-pele-sensivel");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Derive a slug from a display name.
    ///
    /// Accents are folded to their base letter, anything that is not a letter
    /// or digit becomes a single hyphen, and hyphens at the ends are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`SlugError::Empty`] when the name has no letters or digits.
    pub fn from_name(name: &str) -> Result<Self, SlugError> {
        let mut out = String::with_capacity(name.len());
        let mut pending_dash = false;

        for ch in name.chars().flat_map(char::to_lowercase) {
            if COMBINING_MARKS.contains(&ch) {
                continue;
            }
            let folded = fold_accent(ch);
            if folded.is_ascii_alphanumeric() {
                if pending_dash && !out.is_empty() {
                    out.push('-');
                }
                pending_dash = false;
                out.push(folded);
            } else {
                pending_dash = true;
            }
        }

        if out.is_empty() {
            return Err(SlugError::Empty);
        }
        Ok(Self(out))
    }

    /// Validate a slug typed by an admin.
    ///
    /// # Errors
    ///
    /// Returns [`SlugError`] when the value is blank or has characters other
    /// than lowercase ASCII letters, digits and single inner hyphens.
    pub fn parse(value: &str) -> Result<Self, SlugError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(SlugError::Empty);
        }
        let valid = value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
            && !value.starts_with('-')
            && !value.ends_with('-')
            && !value.contains("--");
        if !valid {
            return Err(SlugError::InvalidCharacters);
        }
        Ok(Self(value.to_owned()))
    }

    /// Use `explicit` when given, otherwise derive from `name`.
    ///
    /// # Errors
    ///
    /// See [`Slug::parse`] and [`Slug::from_name`].
    pub fn from_input(explicit: Option<&str>, name: &str) -> Result<Self, SlugError> {
        match explicit.map(str::trim).filter(|s| !s.is_empty()) {
            Some(slug) => Self::parse(slug),
            None => Self::from_name(name),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Combining diacritical marks, as found in decomposed (NFD) text.
const COMBINING_MARKS: core::ops::RangeInclusive<char> = '\u{300}'..='\u{36f}';

/// Map accented Latin letters (already lowercased) to ASCII.
///
/// Covers Latin-1 and Latin Extended-A letters whose canonical decomposition
/// is a base letter plus marks. Letters without one (`ø`, `ß`, `æ`) are
/// returned unchanged.
const fn fold_accent(ch: char) -> char {
    match ch {
        'á' | 'à' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => 'a',
        'ç' | 'ć' | 'ĉ' | 'ċ' | 'č' => 'c',
        'ď' => 'd',
        'é' | 'è' | 'ê' | 'ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' | 'ẽ' => 'e',
        'ĝ' | 'ğ' | 'ġ' | 'ģ' => 'g',
        'ĥ' => 'h',
        'í' | 'ì' | 'î' | 'ï' | 'ĩ' | 'ī' | 'ĭ' | 'į' => 'i',
        'ĵ' => 'j',
        'ķ' => 'k',
        'ĺ' | 'ļ' | 'ľ' => 'l',
        'ñ' | 'ń' | 'ņ' | 'ň' => 'n',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' | 'ō' | 'ŏ' | 'ő' => 'o',
        'ŕ' | 'ŗ' | 'ř' => 'r',
        'ś' | 'ŝ' | 'ş' | 'š' => 's',
        'ţ' | 'ť' => 't',
        'ú' | 'ù' | 'û' | 'ü' | 'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' => 'u',
        'ŵ' => 'w',
        'ý' | 'ÿ' | 'ŷ' | 'ỳ' | 'ỹ' => 'y',
        'ź' | 'ż' | 'ž' => 'z',
        other => other,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_folds_accents() {
        assert_eq!(
            Slug::from_name("Higiene & Beleza").unwrap().as_str(),
            "higiene-beleza"
        );
        assert_eq!(
            Slug::from_name("Vitamina C Efervescente — Laranja").unwrap().as_str(),
            "vitamina-c-efervescente-laranja"
        );
        assert_eq!(
            Slug::from_name("Pomada Cicatrizante Açaí").unwrap().as_str(),
            "pomada-cicatrizante-acai"
        );
    }

    #[test]
    fn test_from_name_folds_accents_beyond_portuguese() {
        assert_eq!(
            Slug::from_name("Piñata Müsli Crème Brûlée").unwrap().as_str(),
            "pinata-musli-creme-brulee"
        );
        assert_eq!(
            Slug::from_name("ŠKODA Łódź Čaj Ÿ").unwrap().as_str(),
            "skoda-odz-caj-y"
        );
        assert_eq!(
            Slug::from_name("Guaraná Açaí Ñandutí").unwrap().as_str(),
            "guarana-acai-nanduti"
        );
    }

    #[test]
    fn test_from_name_skips_combining_marks() {
        // "Água Oxigenada" typed with decomposed accents.
        assert_eq!(
            Slug::from_name("A\u{301}gua Oxigenada").unwrap().as_str(),
            "agua-oxigenada"
        );
        assert_eq!(
            Slug::from_name("Sabonete Cre\u{300}me").unwrap().as_str(),
            "sabonete-creme"
        );
    }

    #[test]
    fn test_from_name_trims_separators() {
        assert_eq!(Slug::from_name("  --Dipirona 500mg!!  ").unwrap().as_str(), "dipirona-500mg");
        assert_eq!(Slug::from_name("!!!"), Err(SlugError::Empty));
    }

    #[test]
    fn test_parse_explicit() {
        assert!(Slug::parse("dipirona-500mg").is_ok());
        assert_eq!(Slug::parse("Dipirona"), Err(SlugError::InvalidCharacters));
        assert_eq!(Slug::parse("a--b"), Err(SlugError::InvalidCharacters));
        assert_eq!(Slug::parse("-a"), Err(SlugError::InvalidCharacters));
        assert_eq!(Slug::parse(" "), Err(SlugError::Empty));
    }

    #[test]
    fn test_from_input_prefers_explicit() {
        assert_eq!(
            Slug::from_input(Some("custom"), "Nome Qualquer").unwrap().as_str(),
            "custom"
        );
        assert_eq!(
            Slug::from_input(Some("  "), "Nome Qualquer").unwrap().as_str(),
            "nome-qualquer"
        );
        assert_eq!(
            Slug::from_input(None, "Álcool em Gel").unwrap().as_str(),
            "alcool-em-gel"
        );
    }
}
