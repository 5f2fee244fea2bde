//! Heuristic removal of call-queue announcements from transcripts.
//!
//! Phone recordings routinely start with hold-queue messages ("please wait,
//! your call will be continued shortly...") that the vendor transcribes like
//! any other speech. This filter drops those utterances at display time based
//! on a phrase list; the stored transcript is never modified.

/// Hold-queue vocabulary of Polish phone systems. Matching is substring-based
/// on lowercased text, so inflected forms are covered by their stems.
pub const DEFAULT_JUNK_PHRASES: &[&str] = &[
    "prosimy",
    "poczekać",
    "zawiesił",
    "połączenie",
    "kontynuować",
    "wkrótce",
    "rozmowę",
    "będziesz",
    "mógł",
    "oczekiwanie",
];

/// How many distinct phrases a later utterance must contain to count as junk.
const LATE_HIT_THRESHOLD: usize = 3;

/// Positions before this index are judged strictly (a single phrase hit is
/// enough); queue announcements almost always open the recording.
const STRICT_PREFIX_LEN: usize = 2;

/// Junk-utterance classifier over a phrase list.
#[derive(Debug, Clone)]
pub struct JunkFilter {
    phrases: Vec<String>,
}

impl Default for JunkFilter {
    fn default() -> Self {
        Self::new(DEFAULT_JUNK_PHRASES.iter().map(|p| p.to_string()).collect())
    }
}

impl JunkFilter {
    pub fn new(phrases: Vec<String>) -> Self {
        let phrases = phrases.into_iter().map(|p| p.to_lowercase()).collect();
        Self { phrases }
    }

    /// Classify the utterance at `index` within its transcript.
    ///
    /// The first two utterances are junk if they contain any listed phrase;
    /// later ones only when at least three distinct phrases match, so normal
    /// conversation that happens to reuse a word is kept.
    pub fn is_junk(&self, text: &str, index: usize) -> bool {
        let lower = text.to_lowercase();
        if index < STRICT_PREFIX_LEN {
            return self.phrases.iter().any(|p| lower.contains(p.as_str()));
        }
        let hits = self
            .phrases
            .iter()
            .filter(|p| lower.contains(p.as_str()))
            .count();
        hits >= LATE_HIT_THRESHOLD
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_announcement_is_junk() {
        let filter = JunkFilter::default();
        assert!(filter.is_junk("Prosimy poczekać na połączenie.", 0));
        assert!(filter.is_junk("Wkrótce będziesz mógł kontynuować rozmowę.", 1));
    }

    #[test]
    fn single_phrase_later_is_kept() {
        let filter = JunkFilter::default();
        // One overlapping word mid-conversation must not drop real speech.
        assert!(!filter.is_junk("Dobrze, możemy kontynuować temat z zeszłego tygodnia.", 5));
    }

    #[test]
    fn dense_announcement_later_is_junk() {
        let filter = JunkFilter::default();
        assert!(filter.is_junk(
            "Prosimy poczekać, wkrótce będziesz mógł kontynuować rozmowę.",
            7
        ));
    }

    #[test]
    fn clean_opening_is_kept() {
        let filter = JunkFilter::default();
        assert!(!filter.is_junk("Dzień dobry, w czym mogę pomóc?", 0));
    }

    #[test]
    fn custom_phrase_list() {
        let filter = JunkFilter::new(vec!["Hold Music".to_string()]);
        assert!(filter.is_junk("hold music playing", 0));
        assert!(!filter.is_junk("Prosimy poczekać.", 0));
    }
}
