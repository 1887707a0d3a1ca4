use crate::dictionary::TranslationDictionary;

/// ASCII word characters: letters, digits and underscore.
fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Translate one whitespace-free token.
///
/// Every non-word character of the token is collected, in order, as its punctuation and
/// appended after the translated word, so `"don't"` becomes `<dont>'`. Tokens whose
/// cleaned form is not in the dictionary are returned untouched.
pub fn translate_token(token: &str, dictionary: &TranslationDictionary) -> String {
    let clean: String = token.chars().filter(|c| is_word_char(*c)).collect();
    if clean.is_empty() {
        return token.to_string();
    }

    match dictionary.lookup(&clean.to_lowercase()) {
        Some(target) => {
            let punctuation: String = token.chars().filter(|c| !is_word_char(*c)).collect();
            format!("{}{}", target, punctuation)
        }
        None => token.to_string(),
    }
}

/// Word-by-word dictionary substitution. Token count and order are preserved;
/// tokens are re-joined with single spaces.
pub fn translate(text: &str, dictionary: &TranslationDictionary) -> String {
    text.split_whitespace()
        .map(|token| translate_token(token, dictionary))
        .collect::<Vec<_>>()
        .join(" ")
}
