use serde::{Deserialize, Serialize};

/// Languages user-facing messages are available in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Fr,
}

impl Language {
    /// Parse a language tag such as `fr`, `fr-CA` or `en_US`. Unknown tags
    /// fall back to English.
    pub fn from_tag(tag: &str) -> Self {
        let primary = tag
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or("")
            .to_ascii_lowercase();
        match primary.as_str() {
            "fr" => Language::Fr,
            _ => Language::En,
        }
    }

    /// Pick the first supported language out of an `Accept-Language` value.
    pub fn from_accept_language(header: &str) -> Self {
        header
            .split(',')
            .map(|part| part.split(';').next().unwrap_or("").trim())
            .find_map(|tag| match Language::from_tag(tag) {
                Language::Fr => Some(Language::Fr),
                Language::En if tag.to_ascii_lowercase().starts_with("en") => {
                    Some(Language::En)
                }
                _ => None,
            })
            .unwrap_or_default()
    }

    pub fn deleted_placeholder(self) -> &'static str {
        match self {
            Language::En => "This comment has been deleted.",
            Language::Fr => "Ce commentaire a été supprimé.",
        }
    }

    pub fn edited_marker(self) -> &'static str {
        match self {
            Language::En => "edited",
            Language::Fr => "modifié",
        }
    }

    pub fn admin_reply_label(self) -> &'static str {
        match self {
            Language::En => "Reply from the team",
            Language::Fr => "Réponse de l'équipe",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tag() {
        assert_eq!(Language::from_tag("fr"), Language::Fr);
        assert_eq!(Language::from_tag("fr-CA"), Language::Fr);
        assert_eq!(Language::from_tag("en_US"), Language::En);
        assert_eq!(Language::from_tag("de"), Language::En);
        assert_eq!(Language::from_tag(""), Language::En);
    }

    #[test]
    fn test_from_accept_language_skips_unsupported() {
        assert_eq!(
            Language::from_accept_language("de-DE,de;q=0.9,fr;q=0.8"),
            Language::Fr
        );
        assert_eq!(
            Language::from_accept_language("en-GB,fr;q=0.5"),
            Language::En
        );
        assert_eq!(Language::from_accept_language("*"), Language::En);
    }
}
