use super::entities::EntityTagger;

/// Query string for the fact-check lookup: the first entity found in the
/// page text, else the leading sentences verbatim.
pub fn claim_query(tagger: &dyn EntityTagger, text: &str) -> String {
    if let Some(first) = tagger.entities(text).into_iter().next() {
        return first;
    }
    leading_sentences(text, 3)
}

/// First `count` '.'-separated fragments, space-joined. Fragment-leading
/// whitespace survives — this is a naive split, not sentence detection.
pub fn leading_sentences(text: &str, count: usize) -> String {
    text.split('.').take(count).collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Canned(Vec<String>);

    impl EntityTagger for Canned {
        fn entities(&self, _text: &str) -> Vec<String> {
            self.0.clone()
        }
    }

    #[test]
    fn first_entity_wins() {
        let tagger = Canned(vec!["Reserve Bank".into(), "Mumbai".into()]);
        assert_eq!(claim_query(&tagger, "whatever text"), "Reserve Bank");
    }

    #[test]
    fn falls_back_to_leading_sentences() {
        let tagger = Canned(vec![]);
        let query = claim_query(&tagger, "first part. second part. third part. fourth part.");
        assert_eq!(query, "first part  second part  third part");
    }

    #[test]
    fn short_text_passes_through() {
        assert_eq!(leading_sentences("no periods here", 3), "no periods here");
    }

    #[test]
    fn fallback_is_nonempty_for_nonempty_text() {
        let tagger = Canned(vec![]);
        assert!(!claim_query(&tagger, "a").is_empty());
    }
}
