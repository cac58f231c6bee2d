use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

use quiz_core::model::{VariantKey, VariantSelector};
use services::{ControllerState, QuizController, ResultTier, ThemeService, TimerToken};

use crate::format;
use crate::input::{QuizKey, parse_quiz_key};

/// Line-oriented host for the quiz controller.
///
/// Renders the screen for the current controller state, reads one line, and
/// turns it into a controller call. The auto-advance after an answer runs on
/// a tokio timer and is cut short by any input line.
pub struct Terminal<R, W> {
    lines: Lines<R>,
    out: W,
    advance_delay: Duration,
    themes: Arc<ThemeService>,
}

impl<R, W> Terminal<R, W>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    pub fn new(reader: R, out: W, advance_delay: Duration, themes: Arc<ThemeService>) -> Self {
        Self {
            lines: reader.lines(),
            out,
            advance_delay,
            themes,
        }
    }

    /// Run until the user quits or input ends.
    pub async fn run(&mut self, controller: &mut QuizController) -> io::Result<()> {
        loop {
            let keep_going = match controller.state() {
                ControllerState::SelectingSubject => self.subject_screen(controller).await?,
                ControllerState::SelectingVariant(_) => self.variant_screen(controller).await?,
                ControllerState::InProgress => self.question_screen(controller).await?,
                ControllerState::Completed => self.result_screen(controller).await?,
            };
            if !keep_going {
                self.out.flush()?;
                return Ok(());
            }
        }
    }

    async fn read_line(&mut self) -> io::Result<Option<String>> {
        self.out.flush()?;
        self.lines.next_line().await
    }

    async fn subject_screen(&mut self, controller: &mut QuizController) -> io::Result<bool> {
        writeln!(self.out, "\nSubjects:")?;
        for (i, summary) in controller.subject_summaries().iter().enumerate() {
            writeln!(
                self.out,
                "  {}. {} [{}/{} variants, avg {}%, {}]",
                i + 1,
                summary.name,
                summary.completed_variants,
                summary.total_variants,
                summary.average_percent,
                format::total_time(summary.stats.total_time_ms)
            )?;
        }
        writeln!(self.out, "Pick a subject number, or q to quit.")?;

        let Some(line) = self.read_line().await? else {
            return Ok(false);
        };
        let line = line.trim();
        if line == "q" {
            return Ok(false);
        }
        let picked = line
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| controller.catalog().subjects().get(i))
            .map(|s| s.id().clone());
        match picked {
            Some(id) => {
                if let Err(err) = controller.select_subject(&id) {
                    writeln!(self.out, "{err}")?;
                }
            }
            None => writeln!(self.out, "No such subject.")?,
        }
        Ok(true)
    }

    async fn variant_screen(&mut self, controller: &mut QuizController) -> io::Result<bool> {
        let Some(menu) = controller.variant_menu() else {
            controller.back_to_subjects();
            return Ok(true);
        };
        let summary = &menu.summary;
        writeln!(
            self.out,
            "\n{} ({}% complete, {} attempts, avg {}%, {})",
            summary.name,
            summary.completion_percent,
            summary.stats.total_attempts,
            summary.average_percent,
            format::total_time(summary.stats.total_time_ms)
        )?;
        for entry in &menu.entries {
            let label = match entry.key {
                VariantKey::Numbered(n) => n.to_string(),
                _ => "m".to_string(),
            };
            let best = entry
                .best
                .as_ref()
                .map(|b| format!(" (best {}%)", b.percentage))
                .unwrap_or_default();
            writeln!(
                self.out,
                "  [{label}] {}: {} questions{best}",
                entry.key, entry.question_count
            )?;
        }
        if menu.can_review_errors() {
            writeln!(
                self.out,
                "  [e] error review: {} questions",
                menu.error_review_count
            )?;
        }
        let theme = self.themes.load().await;
        writeln!(
            self.out,
            "  [t] theme ({theme})  [r] reset progress  [b] back  [q] quit"
        )?;

        let Some(line) = self.read_line().await? else {
            return Ok(false);
        };
        match line.trim() {
            "q" => return Ok(false),
            "b" => controller.back_to_subjects(),
            "m" => {
                if let Err(err) = controller.start_quiz(VariantSelector::Marathon) {
                    writeln!(self.out, "{err}")?;
                }
            }
            "e" => match controller.start_error_review() {
                Ok(Some(_)) => {}
                Ok(None) => writeln!(self.out, "Nothing to review.")?,
                Err(err) => writeln!(self.out, "{err}")?,
            },
            "t" => match self.themes.toggle().await {
                Ok(theme) => writeln!(self.out, "Theme: {theme}")?,
                Err(err) => writeln!(self.out, "Could not save theme: {err}")?,
            },
            "r" => {
                if let Err(err) = controller.reset_subject_stats().await {
                    writeln!(self.out, "{err}")?;
                } else {
                    writeln!(self.out, "Progress reset.")?;
                }
            }
            other => match other.parse::<u32>() {
                Ok(n) if menu.entry(VariantKey::Numbered(n)).is_some() => {
                    if let Err(err) = controller.start_quiz(VariantSelector::Numbered(n)) {
                        writeln!(self.out, "{err}")?;
                    }
                }
                _ => writeln!(self.out, "Unknown choice.")?,
            },
        }
        Ok(true)
    }

    async fn question_screen(&mut self, controller: &mut QuizController) -> io::Result<bool> {
        let Some(snapshot) = controller.snapshot() else {
            return Ok(true);
        };
        let Some(question) = snapshot.question else {
            writeln!(self.out, "This selection has no questions.")?;
            controller.exit_to_menu();
            return Ok(true);
        };
        let elapsed = controller
            .current_token()
            .and_then(|t| controller.elapsed_for(t))
            .unwrap_or(snapshot.elapsed_ms);

        writeln!(
            self.out,
            "\n[{}/{}] {}  score {}  {:.0}% done",
            snapshot.index + 1,
            snapshot.total,
            format::clock(elapsed),
            snapshot.score,
            snapshot.progress.fraction() * 100.0
        )?;
        writeln!(self.out, "{}", question.question)?;
        for option in &question.options {
            writeln!(self.out, "  {}) {}", option.letter, option.text)?;
        }
        writeln!(self.out, "Answer with 1-5, а-д or a-e; s skips, q exits.")?;

        let Some(line) = self.read_line().await? else {
            return Ok(false);
        };
        match parse_quiz_key(&line) {
            None => writeln!(self.out, "Unrecognised key.")?,
            Some(QuizKey::Exit) => controller.exit_to_menu(),
            Some(QuizKey::Skip) => {
                if controller.skip().is_none() {
                    writeln!(self.out, "Cannot skip now.")?;
                }
            }
            Some(QuizKey::Choose(index)) => match controller.answer(index).await {
                None => writeln!(self.out, "No option {}.", index + 1)?,
                Some(feedback) => {
                    if feedback.outcome.is_correct {
                        writeln!(self.out, "Correct!")?;
                    } else {
                        let text = question
                            .correct_option()
                            .map(|o| o.text.as_str())
                            .unwrap_or_default();
                        writeln!(
                            self.out,
                            "Wrong. Correct answer: {}) {text}",
                            feedback.outcome.correct_answer
                        )?;
                    }
                    return self.wait_for_advance(controller, feedback.advance_token).await;
                }
            },
        }
        Ok(true)
    }

    async fn wait_for_advance(
        &mut self,
        controller: &mut QuizController,
        token: TimerToken,
    ) -> io::Result<bool> {
        if self.advance_delay.is_zero() {
            controller.fire_auto_advance(token).await;
            return Ok(true);
        }
        self.out.flush()?;
        tokio::select! {
            () = tokio::time::sleep(self.advance_delay) => {
                controller.fire_auto_advance(token).await;
            }
            line = self.lines.next_line() => {
                if line?.is_none() {
                    return Ok(false);
                }
                controller.next().await;
            }
        }
        Ok(true)
    }

    async fn result_screen(&mut self, controller: &mut QuizController) -> io::Result<bool> {
        let Some(result) = controller.snapshot().and_then(|s| s.result) else {
            controller.exit_to_menu();
            return Ok(true);
        };
        let verdict = match result.tier() {
            ResultTier::Perfect => "Perfect!",
            ResultTier::Excellent => "Excellent!",
            ResultTier::Good => "Good.",
            ResultTier::NeedsPractice => "Keep practising.",
        };
        writeln!(
            self.out,
            "\nFinished {}: {}/{} ({}%) in {}. {verdict}",
            result.variant_key,
            result.final_score,
            result.total_questions,
            result.percentage,
            format::clock(result.elapsed_ms)
        )?;
        if !result.wrong_questions.is_empty() {
            writeln!(self.out, "Missed:")?;
            for text in &result.wrong_questions {
                writeln!(self.out, "  - {text}")?;
            }
        }
        writeln!(self.out, "[r] restart  [enter] menu  [q] quit")?;

        let Some(line) = self.read_line().await? else {
            return Ok(false);
        };
        match line.trim() {
            "q" => return Ok(false),
            "r" => match controller.restart() {
                Ok(Some(_)) => {}
                Ok(None) => writeln!(self.out, "Nothing left to review.")?,
                Err(err) => writeln!(self.out, "{err}")?,
            },
            _ => controller.exit_to_menu(),
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::SubjectId;
    use quiz_core::time::fixed_clock;
    use services::ProgressStore;
    use services::bank::catalog_from_str;
    use storage::repository::{InMemoryStore, KeyValueStore};

    const BANK: &str = r#"[{
        "id": "demo",
        "name": "Demo",
        "data": [
            {"question": "Q1", "options": [{"letter": "а", "text": "yes"}, {"letter": "б", "text": "no"}], "correctAnswer": "а"},
            {"question": "Q2", "options": [{"letter": "а", "text": "yes"}, {"letter": "б", "text": "no"}], "correctAnswer": "а"},
            {"question": "Q3", "options": [{"letter": "а", "text": "yes"}, {"letter": "б", "text": "no"}], "correctAnswer": "а"}
        ]
    }]"#;

    async fn drive(script: &str) -> (String, QuizController) {
        drive_with_delay(script, Duration::ZERO).await
    }

    async fn drive_with_delay(script: &str, delay: Duration) -> (String, QuizController) {
        let kv: Arc<dyn KeyValueStore> = Arc::new(InMemoryStore::new());
        let catalog = Arc::new(catalog_from_str(BANK).unwrap());
        let progress = ProgressStore::load(Arc::clone(&kv), catalog.ids()).await;
        let mut controller = QuizController::new(fixed_clock(), catalog, progress);
        let themes = Arc::new(ThemeService::new(kv));

        let mut terminal = Terminal::new(script.as_bytes(), Vec::new(), delay, themes);
        terminal.run(&mut controller).await.unwrap();
        (String::from_utf8(terminal.out).unwrap(), controller)
    }

    fn demo() -> SubjectId {
        SubjectId::new("demo").unwrap()
    }

    #[tokio::test]
    async fn full_session_is_recorded() {
        let (out, controller) = drive("1\n1\n1\n1\n1\n\nq\n").await;
        assert!(out.contains("Finished variant 1: "));
        let stats = controller.progress().stats(&demo());
        assert_eq!(stats.total_attempts, 1);
        assert_eq!(stats.total_questions, 3);
    }

    #[tokio::test]
    async fn early_line_advances_exactly_once() {
        let (out, controller) = drive_with_delay("1\nm\n1\n\nq\nq\n", Duration::from_secs(30)).await;
        assert!(out.contains("[1/3]"));
        assert!(out.contains("[2/3]"));
        assert!(!out.contains("[3/3]"));
        assert_eq!(controller.state(), ControllerState::SelectingVariant(demo()));
        assert_eq!(controller.progress().stats(&demo()).total_attempts, 0);
    }

    #[tokio::test]
    async fn leaving_mid_session_records_nothing() {
        let (out, controller) = drive("1\nm\ns\nq\nq\n").await;
        assert!(out.contains("[1/3]"));
        assert_eq!(controller.state(), ControllerState::SelectingVariant(demo()));
        assert_eq!(controller.progress().stats(&demo()).total_attempts, 0);
    }

    #[tokio::test]
    async fn empty_error_review_is_refused() {
        let (out, _) = drive("1\ne\nq\n").await;
        assert!(out.contains("Nothing to review."));
    }

    #[tokio::test]
    async fn theme_toggle_is_reported() {
        let (out, _) = drive("1\nt\nq\n").await;
        assert!(out.contains("theme (dark)"));
        assert!(out.contains("Theme: light"));
    }

    #[tokio::test]
    async fn end_of_input_stops_the_loop() {
        let (_, controller) = drive("1\n").await;
        assert_eq!(controller.state(), ControllerState::SelectingVariant(demo()));
    }
}
