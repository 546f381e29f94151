use crate::error::BlessingError;

/// Shown when the generator answers with nothing.
pub const EMPTY_BLESSING_FALLBACK: &str =
    "¡Que la luz de la Navidad ilumine cada rincón de tu corazón!";

/// Shown when the generator call fails.
pub const FAILED_BLESSING_FALLBACK: &str = "¡Feliz Navidad! Que este día esté lleno de magia y amor.";

/// Prompt text for one blessing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlessingPrompt {
    text: String,
}

impl BlessingPrompt {
    /// `context` is the sender's own message, used as inspiration when non-blank.
    pub fn new(name: &str, context: Option<&str>) -> Self {
        let mut text = format!(
            "Escribe una bendición navideña emotiva para {name}, enfocada en el amor de pareja, \
             el cumplimiento de sueños anhelados, la reconciliación y la unidad profunda."
        );
        if let Some(ctx) = context.filter(|c| !c.trim().is_empty()) {
            text.push_str(&format!(
                " Úsalo como inspiración este mensaje personal escrito por el remitente, \
                 pero no lo copies textualmente, sino amplifica su sentimiento: \"{ctx}\"."
            ));
        }
        text.push_str(" Que sea un mensaje inspirador, poético y mágico, máximo 3 líneas.");
        Self { text }
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

/// Turn a generator outcome into text for the user. Never fails: errors are
/// logged with their kind and replaced by a canned blessing.
pub fn resolve_blessing(outcome: Result<String, BlessingError>) -> String {
    match outcome {
        Ok(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                EMPTY_BLESSING_FALLBACK.to_string()
            } else {
                trimmed.to_string()
            }
        }
        Err(e) => {
            log::warn!("blessing generation failed ({}): {e}", e.kind());
            FAILED_BLESSING_FALLBACK.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_without_context() {
        let prompt = BlessingPrompt::new("Luis", None).into_string();
        assert!(prompt.starts_with("Escribe una bendición navideña emotiva para Luis,"));
        assert!(!prompt.contains("inspiración"));
        assert!(prompt.ends_with("máximo 3 líneas."));
    }

    #[test]
    fn prompt_quotes_the_sender_message() {
        let prompt = BlessingPrompt::new("Ana", Some("Gracias por todo")).into_string();
        assert!(prompt.contains("amplifica su sentimiento: \"Gracias por todo\"."));
    }

    #[test]
    fn blank_context_is_ignored() {
        assert_eq!(
            BlessingPrompt::new("Ana", Some("   ")),
            BlessingPrompt::new("Ana", None)
        );
    }

    #[test]
    fn resolve_uses_fallbacks() {
        assert_eq!(resolve_blessing(Ok("  Paz y amor \n".into())), "Paz y amor");
        assert_eq!(resolve_blessing(Ok(String::new())), EMPTY_BLESSING_FALLBACK);
        assert_eq!(
            resolve_blessing(Err(BlessingError::Quota("429".into()))),
            FAILED_BLESSING_FALLBACK
        );
        assert_eq!(
            resolve_blessing(Err(BlessingError::Network("offline".into()))),
            FAILED_BLESSING_FALLBACK
        );
    }
}
