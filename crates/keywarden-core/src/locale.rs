// ABOUTME: The three supported delivery locales and every localized fixed string.
// ABOUTME: Message headers, document labels, email subjects, and time-of-day greetings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Delivery locale. Selects the language of generated messages,
/// documents, and email subjects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locale {
    PtBr,
    EnUs,
    Es,
}

impl Locale {
    /// Email subject line for a delivery.
    pub fn subject(self) -> &'static str {
        match self {
            Locale::PtBr => "Seu Pedido de Chave(s) de Ativação",
            Locale::EnUs => "Your Activation Key(s) Order",
            Locale::Es => "Su Pedido de Clave(s) de Activación",
        }
    }

    /// Opening line of the delivery message.
    pub fn message_header(self) -> &'static str {
        match self {
            Locale::PtBr => "Obrigado por sua compra! Seguem os detalhes do seu pedido:",
            Locale::EnUs => "Thank you for your purchase! Here are your order details:",
            Locale::Es => "¡Gracias por su compra! Siguen los detalles de su pedido:",
        }
    }

    /// Closing line of the delivery message.
    pub fn message_footer(self) -> &'static str {
        match self {
            Locale::PtBr => {
                "Qualquer dúvida ou problema com a ativação, por favor, entre em contato."
            }
            Locale::EnUs => {
                "If you have any questions or issues with activation, please contact us."
            }
            Locale::Es => {
                "Cualquier duda o problema con la activación, por favor, póngase en contacto."
            }
        }
    }

    /// Per-category instruction header in the delivery message.
    /// `{}` is the category name.
    pub fn instructions_header(self, category: &str) -> String {
        match self {
            Locale::PtBr => format!("**Instruções para {category} (PT-BR):**"),
            Locale::EnUs => format!("**Instructions for {category} (EN-US):**"),
            Locale::Es => format!("**Instrucciones para {category} (ES):**"),
        }
    }

    /// Banner headline of the delivery document.
    pub fn document_header(self) -> &'static str {
        match self {
            Locale::PtBr => "Obrigado por sua compra!",
            Locale::EnUs => "Thank you for your purchase!",
            Locale::Es => "¡Gracias por su compra!",
        }
    }

    /// Closing line of the delivery document.
    pub fn document_footer(self) -> &'static str {
        match self {
            Locale::PtBr => "Qualquer dúvida ou problema, por favor, entre em contato.",
            Locale::EnUs => "If you have any questions, please contact us.",
            Locale::Es => "Cualquier duda o problema, por favor, entre en contacto.",
        }
    }

    /// Label above the key block; singular/plural depends on the count.
    pub fn key_label(self, count: usize) -> &'static str {
        match (self, count > 1) {
            (Locale::PtBr, false) => "Sua Chave de Ativação:",
            (Locale::PtBr, true) => "Suas Chaves de Ativação:",
            (Locale::EnUs, false) => "Your Activation Key:",
            (Locale::EnUs, true) => "Your Activation Keys:",
            (Locale::Es, false) => "Su Clave de Activación:",
            (Locale::Es, true) => "Sus Claves de Activación:",
        }
    }

    /// Heading above the instruction section of the document.
    pub fn instruction_title(self) -> &'static str {
        match self {
            Locale::PtBr => "Instruções de Ativação",
            Locale::EnUs => "Activation Instructions",
            Locale::Es => "Instrucciones de Activación",
        }
    }

    /// Labels for the buyer info table, in display order:
    /// buyer, email, product, license type, language, delivery.
    pub fn info_labels(self) -> [&'static str; 6] {
        match self {
            Locale::PtBr => [
                "Comprador",
                "Email",
                "Produto",
                "Tipo de licença",
                "Idioma",
                "Entrega",
            ],
            Locale::EnUs => [
                "Buyer",
                "Email",
                "Product",
                "License type",
                "Language",
                "Delivery",
            ],
            Locale::Es => [
                "Comprador",
                "Email",
                "Producto",
                "Tipo de licencia",
                "Idioma",
                "Entrega",
            ],
        }
    }

    /// Time-of-day greeting used by the `{greeting}` placeholder.
    /// Morning is 5..12, afternoon 12..18, evening otherwise.
    pub fn greeting(self, hour: u32) -> &'static str {
        let slot = match hour {
            5..12 => 0,
            12..18 => 1,
            _ => 2,
        };
        match self {
            Locale::PtBr => ["Bom dia", "Boa tarde", "Boa noite"][slot],
            Locale::EnUs => ["Good morning", "Good afternoon", "Good evening"][slot],
            Locale::Es => ["Buenos días", "Buenas tardes", "Buenas noches"][slot],
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Locale::PtBr => "pt-br",
            Locale::EnUs => "en-us",
            Locale::Es => "es",
        };
        f.write_str(tag)
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pt" | "pt-br" | "pt_br" => Ok(Locale::PtBr),
            "en" | "en-us" | "en_us" => Ok(Locale::EnUs),
            "es" | "es-es" | "es_es" => Ok(Locale::Es),
            other => Err(format!("unknown locale: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_tags() {
        assert_eq!("pt-br".parse::<Locale>().unwrap(), Locale::PtBr);
        assert_eq!("EN".parse::<Locale>().unwrap(), Locale::EnUs);
        assert_eq!("es_es".parse::<Locale>().unwrap(), Locale::Es);
        assert!("fr".parse::<Locale>().is_err());
    }

    #[test]
    fn key_label_pluralizes() {
        assert_eq!(Locale::EnUs.key_label(1), "Your Activation Key:");
        assert_eq!(Locale::EnUs.key_label(3), "Your Activation Keys:");
    }

    #[test]
    fn greeting_covers_the_day() {
        assert_eq!(Locale::PtBr.greeting(8), "Bom dia");
        assert_eq!(Locale::PtBr.greeting(14), "Boa tarde");
        assert_eq!(Locale::PtBr.greeting(22), "Boa noite");
        assert_eq!(Locale::PtBr.greeting(3), "Boa noite");
        assert_eq!(Locale::EnUs.greeting(9), "Good morning");
    }
}
