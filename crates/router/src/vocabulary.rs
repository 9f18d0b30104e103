use once_cell::sync::Lazy;
use regex::Regex;

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w+\b").expect("static word regex"));

/// Fixed phrase lists the router classifies against. All entries are lower-case.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    pub thanks: Vec<String>,
    pub help: Vec<String>,
    pub cuisines: Vec<String>,
    pub cancel_triggers: Vec<String>,
    pub summary_command: String,
    pub menu_command: String,
    /// Clears an open restaurant list without choosing anything.
    pub abandon_command: String,
}

fn owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            thanks: owned(&["thanks", "thank you"]),
            help: owned(&["!help", "hi", "hello"]),
            cuisines: owned(&[
                "italian", "mexican", "thai", "chinese", "indian", "japanese", "greek",
                "mediterranean", "korean", "vietnamese", "french", "spanish", "lebanese",
            ]),
            cancel_triggers: owned(&["cancel", "remove", "forget", "less"]),
            summary_command: "!summary".to_string(),
            menu_command: "!menu".to_string(),
            abandon_command: "!nevermind".to_string(),
        }
    }
}

impl Vocabulary {
    pub fn is_thanks(&self, text: &str) -> bool {
        self.thanks.iter().any(|t| t == text)
    }

    pub fn is_help(&self, text: &str) -> bool {
        self.help.iter().any(|t| t == text)
    }

    /// Exact-match commands. These are never read as a restaurant pick.
    pub fn is_command(&self, text: &str) -> bool {
        self.is_help(text)
            || text == self.summary_command
            || text == self.menu_command
            || text == self.abandon_command
    }

    /// First cuisine, in vocabulary order, that appears as a whole word.
    pub fn find_cuisine(&self, text: &str) -> Option<&str> {
        let words: Vec<&str> = WORD.find_iter(text).map(|m| m.as_str()).collect();
        self.cuisines
            .iter()
            .find(|c| words.contains(&c.as_str()))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_cuisine() {
        let vocab = Vocabulary::default();
        assert_eq!(vocab.find_cuisine("i want thai food"), Some("thai"));
        assert_eq!(vocab.find_cuisine("show me italian restaurants"), Some("italian"));
        assert_eq!(vocab.find_cuisine("greek or thai?"), Some("thai"));
        assert_eq!(vocab.find_cuisine("thailand trip"), None);
        assert_eq!(vocab.find_cuisine("2 pork rolls"), None);
    }

    #[test]
    fn test_commands() {
        let vocab = Vocabulary::default();
        assert!(vocab.is_command("!menu"));
        assert!(vocab.is_command("hello"));
        assert!(vocab.is_command("!nevermind"));
        assert!(!vocab.is_command("hello there"));
        assert!(vocab.is_thanks("thank you"));
        assert!(!vocab.is_thanks("thanks a lot"));
    }
}
