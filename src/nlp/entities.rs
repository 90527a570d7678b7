/// Extracts proper-noun-like spans from page text, used to pick a concise
/// claim query. Swappable so tests can script exact outputs.
pub trait EntityTagger: Send + Sync {
    /// Entity spans in order of appearance. May contain duplicates.
    fn entities(&self, text: &str) -> Vec<String>;
}

// TitleCase words that start sentences or noun phrases without naming
// anything. Runs break at these.
const COMMON_WORDS: &[&str] = &[
    "The", "A", "An", "This", "That", "These", "Those", "It", "He", "She", "They", "We", "You",
    "I", "His", "Her", "Its", "Their", "Our", "My", "Your", "And", "But", "Or", "So", "If",
    "When", "While", "Where", "After", "Before", "During", "However", "Meanwhile", "Although",
    "Because", "Since", "As", "At", "By", "For", "From", "In", "On", "Of", "To", "With",
];

/// Capitalization-based tagger covering the organization/person/event shapes
/// that matter for claim queries: maximal runs of TitleCase tokens plus short
/// all-caps acronyms. Single TitleCase tokens at a sentence start are
/// ambiguous (ordinary capitalization) and are skipped.
pub struct HeuristicEntityTagger;

impl HeuristicEntityTagger {
    fn is_acronym(token: &str) -> bool {
        let len = token.chars().count();
        (2..=6).contains(&len)
            && token.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
            && token.chars().any(|c| c.is_ascii_uppercase())
    }

    fn is_title_case(token: &str) -> bool {
        let mut chars = token.chars();
        match chars.next() {
            Some(first) if first.is_uppercase() => chars.any(|c| c.is_lowercase()),
            _ => false,
        }
    }

    fn is_common_word(token: &str) -> bool {
        COMMON_WORDS.contains(&token)
    }

    fn qualifies(token: &str) -> bool {
        if token.is_empty() || Self::is_common_word(token) {
            return false;
        }
        Self::is_acronym(token) || Self::is_title_case(token)
    }
}

impl EntityTagger for HeuristicEntityTagger {
    fn entities(&self, text: &str) -> Vec<String> {
        let raw_tokens: Vec<&str> = text.split_whitespace().collect();
        let mut found = Vec::new();
        let mut run: Vec<&str> = Vec::new();
        let mut run_starts_sentence = false;

        let mut flush = |run: &mut Vec<&str>, starts_sentence: bool| {
            if run.is_empty() {
                return;
            }
            let single = run.len() == 1;
            let acronym_only = run.iter().all(|t| Self::is_acronym(t));
            // A lone TitleCase word opening a sentence is just capitalization.
            if !(single && starts_sentence && !acronym_only) {
                found.push(run.join(" "));
            }
            run.clear();
        };

        for (i, raw) in raw_tokens.iter().enumerate() {
            let token = raw.trim_matches(|c: char| !c.is_alphanumeric());
            let sentence_start = i == 0
                || raw_tokens[i - 1].ends_with(['.', '!', '?']);
            if Self::qualifies(token) {
                if run.is_empty() {
                    run_starts_sentence = sentence_start;
                }
                run.push(token);
                // A sentence boundary inside the run splits it.
                if raw.ends_with(['.', '!', '?']) {
                    flush(&mut run, run_starts_sentence);
                }
            } else {
                flush(&mut run, run_starts_sentence);
            }
        }
        flush(&mut run, run_starts_sentence);
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(text: &str) -> Vec<String> {
        HeuristicEntityTagger.entities(text)
    }

    #[test]
    fn finds_names_acronyms_and_places() {
        assert_eq!(
            tag("BBC reported that John Smith visited New Delhi."),
            vec!["BBC", "John Smith", "New Delhi"]
        );
    }

    #[test]
    fn skips_common_sentence_openers() {
        assert_eq!(tag("The flood in Chennai damaged several homes."), vec!["Chennai"]);
    }

    #[test]
    fn lone_titlecase_at_sentence_start_is_not_an_entity() {
        assert!(tag("Floods hit the city today.").is_empty());
        assert!(tag("floods hit the city today.").is_empty());
    }

    #[test]
    fn multiword_run_at_sentence_start_counts() {
        assert_eq!(tag("John Smith said the road was flooded."), vec!["John Smith"]);
    }

    #[test]
    fn common_words_break_runs() {
        assert_eq!(
            tag("The Supreme Court ruled against the State Government."),
            vec!["Supreme Court", "State Government"]
        );
    }

    #[test]
    fn sentence_boundary_splits_a_run() {
        assert_eq!(tag("He met Narendra Modi. Delhi celebrated."), vec!["Narendra Modi"]);
    }

    #[test]
    fn acronym_alone_at_sentence_start_counts() {
        assert_eq!(tag("WHO issued a warning."), vec!["WHO"]);
    }

    #[test]
    fn empty_text_yields_nothing() {
        assert!(tag("").is_empty());
    }
}
