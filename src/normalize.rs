use once_cell::sync::Lazy;
use regex::Regex;

static NON_ALNUM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

/// Reduce a title to a lowercase, ASCII-alphanumeric key so that the same paper written with
/// different casing or punctuation compares equal.
pub fn normalize(title: &str) -> String {
    NON_ALNUM_RE
        .replace_all(&title.to_lowercase(), "")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignores_case_and_punctuation() {
        assert_eq!(normalize("Foo, Bar!"), normalize("foo bar"));
        assert_eq!(normalize("Foo, Bar!"), "foobar");
    }

    #[test]
    fn keeps_digits_and_drops_non_ascii() {
        assert_eq!(normalize("GPT-4: A Técnica 2.0"), "gpt4atcnica20");
        assert_eq!(normalize("  \t\n"), "");
    }

    #[test]
    fn is_idempotent() {
        proptest::proptest!(|(s in "\\PC{0,64}")| {
            let once = normalize(&s);
            proptest::prop_assert_eq!(normalize(&once), once.clone());
            proptest::prop_assert!(once.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        })
    }
}
