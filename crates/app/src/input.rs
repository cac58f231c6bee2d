/// A keystroke during a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizKey {
    /// Option by zero-based position.
    Choose(usize),
    Skip,
    Exit,
}

/// Map one line of input to a quiz key.
///
/// Options are picked with `1`-`5`, `а`-`д` or `a`-`e`. `s`/`п` skips and `q`
/// leaves the session. Case is ignored.
pub fn parse_quiz_key(line: &str) -> Option<QuizKey> {
    let mut chars = line.trim().chars().flat_map(char::to_lowercase);
    let c = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    let key = match c {
        '1'..='5' => QuizKey::Choose(c as usize - '1' as usize),
        'а' => QuizKey::Choose(0),
        'б' => QuizKey::Choose(1),
        'в' => QuizKey::Choose(2),
        'г' => QuizKey::Choose(3),
        'д' => QuizKey::Choose(4),
        'a'..='e' => QuizKey::Choose(c as usize - 'a' as usize),
        's' | 'п' => QuizKey::Skip,
        'q' => QuizKey::Exit,
        _ => return None,
    };
    Some(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_and_both_alphabets_pick_options() {
        assert_eq!(parse_quiz_key("1"), Some(QuizKey::Choose(0)));
        assert_eq!(parse_quiz_key("5"), Some(QuizKey::Choose(4)));
        assert_eq!(parse_quiz_key("в"), Some(QuizKey::Choose(2)));
        assert_eq!(parse_quiz_key("Д"), Some(QuizKey::Choose(4)));
        assert_eq!(parse_quiz_key(" b "), Some(QuizKey::Choose(1)));
        assert_eq!(parse_quiz_key("E"), Some(QuizKey::Choose(4)));
    }

    #[test]
    fn skip_and_exit() {
        assert_eq!(parse_quiz_key("s"), Some(QuizKey::Skip));
        assert_eq!(parse_quiz_key("П"), Some(QuizKey::Skip));
        assert_eq!(parse_quiz_key("q"), Some(QuizKey::Exit));
    }

    #[test]
    fn anything_else_is_ignored() {
        assert_eq!(parse_quiz_key(""), None);
        assert_eq!(parse_quiz_key("6"), None);
        assert_eq!(parse_quiz_key("f"), None);
        assert_eq!(parse_quiz_key("12"), None);
    }
}
