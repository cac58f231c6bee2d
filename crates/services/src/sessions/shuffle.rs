use rand::Rng;
use rand::seq::SliceRandom;

use quiz_core::model::{AnswerOption, OptionLetter, Question};

/// Fresh random order of `questions`.
pub fn shuffle_questions<R: Rng + ?Sized>(questions: &[Question], rng: &mut R) -> Vec<Question> {
    let mut shuffled = questions.to_vec();
    shuffled.shuffle(rng);
    shuffled
}

/// Copy of `question` with its options permuted and relabelled by position.
///
/// The correct answer follows the option text. A question whose correct
/// letter matches no option, or that has more options than letters, is
/// returned unchanged.
pub fn shuffle_options<R: Rng + ?Sized>(question: &Question, rng: &mut R) -> Question {
    let Some(correct_text) = question.correct_option().map(|o| o.text.as_str()) else {
        log::debug!("correct answer missing for {:?}; options left as is", question.question);
        return question.clone();
    };

    let mut texts: Vec<&str> = question.options.iter().map(|o| o.text.as_str()).collect();
    texts.shuffle(rng);

    let mut options = Vec::with_capacity(texts.len());
    let mut correct_answer = None;
    for (index, text) in texts.into_iter().enumerate() {
        let Some(letter) = OptionLetter::from_index(index) else {
            return question.clone();
        };
        if correct_answer.is_none() && text == correct_text {
            correct_answer = Some(letter);
        }
        options.push(AnswerOption::new(letter, text));
    }
    let Some(correct_answer) = correct_answer else {
        return question.clone();
    };

    Question {
        options,
        correct_answer,
        ..question.clone()
    }
}

/// Question order and every question's options shuffled independently.
pub fn prepare_questions<R: Rng + ?Sized>(questions: &[Question], rng: &mut R) -> Vec<Question> {
    shuffle_questions(questions, rng)
        .iter()
        .map(|q| shuffle_options(q, rng))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn letter(c: char) -> OptionLetter {
        OptionLetter::from_char(c).unwrap()
    }

    fn sample() -> Question {
        Question::with_options("1-1", "Which is red?", ["sky", "grass", "blood", "snow"], letter('в'))
    }

    #[test]
    fn correct_answer_tracks_option_text() {
        let question = sample();
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let shuffled = shuffle_options(&question, &mut rng);
            assert_eq!(shuffled.correct_option().unwrap().text, "blood");
            assert_eq!(shuffled.question, question.question);
            assert_eq!(shuffled.id, question.id);
            assert!(shuffled.check().is_ok());
        }
    }

    #[test]
    fn letters_stay_contiguous_from_start() {
        let question =
            Question::with_options("1", "Pick", ["x", "y", "z"], letter('б'));
        let mut rng = StdRng::seed_from_u64(7);
        let shuffled = shuffle_options(&question, &mut rng);
        let letters: String = shuffled.options.iter().map(|o| o.letter.as_char()).collect();
        assert_eq!(letters, "абв");
        let mut texts: Vec<_> = shuffled.options.iter().map(|o| o.text.clone()).collect();
        texts.sort();
        assert_eq!(texts, vec!["x", "y", "z"]);
    }

    #[test]
    fn unmatched_correct_answer_is_left_unmodified() {
        let question = Question::with_options("1", "Broken", ["x", "y"], letter('д'));
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(shuffle_options(&question, &mut rng), question);
    }

    #[test]
    fn foreign_correct_letter_is_left_unmodified() {
        let question: Question = serde_json::from_str(
            r#"{"question": "Q", "options": [{"letter": "а", "text": "x"}, {"letter": "б", "text": "y"}], "correctAnswer": "е"}"#,
        )
        .unwrap();
        let mut rng = StdRng::seed_from_u64(4);
        assert_eq!(shuffle_options(&question, &mut rng), question);
    }

    #[test]
    fn options_beyond_the_alphabet_are_left_unmodified() {
        let question: Question = serde_json::from_str(
            r#"{"question": "Q", "options": [
                {"letter": "а", "text": "1"}, {"letter": "б", "text": "2"},
                {"letter": "в", "text": "3"}, {"letter": "г", "text": "4"},
                {"letter": "д", "text": "5"}, {"letter": "е", "text": "6"}
            ], "correctAnswer": "е"}"#,
        )
        .unwrap();
        for seed in 0..8 {
            let mut rng = StdRng::seed_from_u64(seed);
            assert_eq!(shuffle_options(&question, &mut rng), question);
        }
    }

    #[test]
    fn question_shuffle_is_a_permutation() {
        let questions: Vec<Question> = (0..12)
            .map(|i| Question::with_options(i.to_string(), format!("Q{i}"), ["a", "b"], letter('а')))
            .collect();
        let mut rng = StdRng::seed_from_u64(11);
        let mut shuffled = prepare_questions(&questions, &mut rng);
        assert_eq!(shuffled.len(), questions.len());
        shuffled.sort_by_key(|q| q.id.parse::<u32>().unwrap());
        let texts: Vec<_> = shuffled.iter().map(|q| q.question.clone()).collect();
        let expected: Vec<_> = questions.iter().map(|q| q.question.clone()).collect();
        assert_eq!(texts, expected);
        assert!(shuffled.iter().all(|q| q.correct_option().unwrap().text == "a"));
    }
}
