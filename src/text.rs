//! Text normalization for question material

use std::sync::LazyLock;

use regex::Regex;

/// Matches answer-choice markers: `(1)`-style numbers and circled digits.
static CHOICE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\(\d+\)|①|②|③|④|⑤|⑥|⑦|⑧|⑨)").expect("literal pattern")
});

/// Put each answer choice on its own line.
///
/// Scanned question sheets run the choices together on one line; every
/// choice marker gets a newline inserted in front of it so the choices
/// read as a list.
pub fn insert_choice_breaks(text: &str) -> String {
    CHOICE_MARKER.replace_all(text, "\n$1").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breaks_parenthesized_choices() {
        let broken = insert_choice_breaks("Pick the even number. (1) 3 (2) 8 (3) 5");
        assert_eq!(broken, "Pick the even number. \n(1) 3 \n(2) 8 \n(3) 5");
    }

    #[test]
    fn test_breaks_circled_digit_choices() {
        let broken = insert_choice_breaks("① apples ② pears ③ plums");
        assert_eq!(broken, "\n① apples \n② pears \n③ plums");
    }

    #[test]
    fn test_leaves_plain_text_untouched() {
        let text = "How many sides does a triangle have?";
        assert_eq!(insert_choice_breaks(text), text);
    }
}
