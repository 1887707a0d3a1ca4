// Extractive summarizer: picks verbatim sentences, never generates text.

pub const NO_CONTENT: &str = "No content available for summarization.";

/// Candidate sentences must be longer than this to be kept.
const MIN_SENTENCE_LENGTH: usize = 20;

/// Split on runs of `.`, `!`, `?` and drop fragments that are blank once trimmed.
/// The returned fragments are untrimmed.
pub fn split_sentences(content: &str) -> Vec<&str> {
    content
        .split(['.', '!', '?'])
        .filter(|s| !s.trim().is_empty())
        .collect()
}

/// Build a summary from the first, the longest and the last sentence of `content`.
///
/// Candidates are deduplicated keeping their original order, and any candidate of
/// 20 characters or fewer is dropped. The survivors are joined with `". "` and a
/// final `"."` is appended, so content made only of short sentences yields `"."`
/// (see [`is_degenerate`]).
pub fn summarize(content: &str) -> String {
    let sentences = split_sentences(content);
    let (Some(first), Some(last)) = (sentences.first(), sentences.last()) else {
        return NO_CONTENT.to_string();
    };

    // Longest by untrimmed length; ties keep the earliest.
    let longest = sentences.iter().fold("", |longest, &current| {
        if current.chars().count() > longest.chars().count() {
            current
        } else {
            longest
        }
    });

    let mut parts: Vec<&str> = Vec::with_capacity(3);
    for candidate in [first.trim(), longest.trim(), last.trim()] {
        if candidate.chars().count() > MIN_SENTENCE_LENGTH && !parts.contains(&candidate) {
            parts.push(candidate);
        }
    }

    format!("{}.", parts.join(". "))
}

/// A summary this short carries no sentence at all.
pub fn is_degenerate(summary: &str) -> bool {
    summary.chars().count() <= 2
}
