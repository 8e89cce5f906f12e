//! Localized status messages
//!
//! Every envelope carries human-readable messages. The catalog is fixed per
//! locale and chosen once at startup from `service.locale`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Supported message locales
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Locale {
    /// Brazilian Portuguese
    #[default]
    #[serde(rename = "pt-BR", alias = "pt_BR", alias = "pt")]
    PtBr,
    /// English
    #[serde(rename = "en", alias = "en-US", alias = "en_US")]
    En,
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PtBr => write!(f, "pt-BR"),
            Self::En => write!(f, "en"),
        }
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "pt-br" | "pt" => Ok(Self::PtBr),
            "en" | "en-us" => Ok(Self::En),
            other => Err(format!("unsupported locale '{}'", other)),
        }
    }
}

/// Message catalog for one locale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Messages {
    /// Locale the catalog was built for
    pub locale: Locale,
    /// Returned by a successful create
    pub created: &'static str,
    /// Returned by a successful read
    pub query_ok: &'static str,
    /// Returned by a successful update
    pub updated: &'static str,
    /// Returned by a successful delete
    pub deleted: &'static str,
    /// Returned when a condition matches nothing
    pub not_found: &'static str,
    /// Returned for any backend failure
    pub internal_error: &'static str,
}

impl Messages {
    /// Catalog for `locale`
    pub const fn for_locale(locale: Locale) -> Self {
        match locale {
            Locale::PtBr => Self {
                locale,
                created: "Criado com sucesso.",
                query_ok: "Consulta realizada com sucesso.",
                updated: "Atualizado com sucesso.",
                deleted: "Deletado com sucesso.",
                not_found: "Dados não encontrados.",
                internal_error: "Erro interno do servidor.",
            },
            Locale::En => Self {
                locale,
                created: "Created successfully.",
                query_ok: "Query completed successfully.",
                updated: "Updated successfully.",
                deleted: "Deleted successfully.",
                not_found: "Data not found.",
                internal_error: "Internal server error.",
            },
        }
    }
}

impl Default for Messages {
    fn default() -> Self {
        Self::for_locale(Locale::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_is_portuguese() {
        let messages = Messages::default();
        assert_eq!(messages.locale, Locale::PtBr);
        assert_eq!(messages.created, "Criado com sucesso.");
        assert_eq!(messages.query_ok, "Consulta realizada com sucesso.");
        assert_eq!(messages.deleted, "Deletado com sucesso.");
    }

    #[test]
    fn test_english_catalog() {
        let messages = Messages::for_locale(Locale::En);
        assert_eq!(messages.not_found, "Data not found.");
    }

    #[test]
    fn test_locale_parse() {
        assert_eq!("pt-BR".parse::<Locale>(), Ok(Locale::PtBr));
        assert_eq!("pt_br".parse::<Locale>(), Ok(Locale::PtBr));
        assert_eq!("EN".parse::<Locale>(), Ok(Locale::En));
        assert!("fr".parse::<Locale>().is_err());
    }

    #[test]
    fn test_locale_serde() {
        let locale: Locale = serde_json::from_str("\"pt-BR\"").unwrap();
        assert_eq!(locale, Locale::PtBr);
        let locale: Locale = serde_json::from_str("\"en-US\"").unwrap();
        assert_eq!(locale, Locale::En);
        assert_eq!(serde_json::to_string(&Locale::En).unwrap(), "\"en\"");
    }
}
