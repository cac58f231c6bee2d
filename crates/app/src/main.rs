mod args;
mod format;
mod input;
mod terminal;

use services::{AppServices, Clock, SessionError};

use crate::args::{Args, Command, prepare_sqlite_file, print_usage};
use crate::terminal::Terminal;

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let parsed = match Args::parse(std::env::args().skip(1), |key| std::env::var(key).ok()) {
        Ok(Some(args)) => args,
        Ok(None) => {
            print_usage();
            return Ok(());
        }
        Err(err) => {
            eprintln!("{err}");
            print_usage();
            return Err(err.into());
        }
    };

    // The database file must exist before sqlx connects.
    prepare_sqlite_file(&parsed.db_url)?;
    let services = AppServices::new_sqlite(&parsed.db_url, &parsed.bank_path, Clock::system()).await?;
    let mut controller = services.controller().await;

    match parsed.command {
        Command::Play => {
            if let Some(subject) = &parsed.subject {
                controller.select_subject(subject)?;
            }
            let reader = tokio::io::BufReader::new(tokio::io::stdin());
            let mut terminal =
                Terminal::new(reader, std::io::stdout(), parsed.advance_delay, services.theme());
            terminal.run(&mut controller).await?;
        }
        Command::Stats => {
            let summaries = controller.subject_summaries();
            let wanted = parsed.subject.as_ref();
            for summary in summaries
                .iter()
                .filter(|s| wanted.is_none_or(|id| *id == s.subject_id))
            {
                println!(
                    "{} ({}): {}/{} variants, {} attempts, {} questions, avg {}%, {} to review, {}",
                    summary.name,
                    summary.subject_id,
                    summary.completed_variants,
                    summary.total_variants,
                    summary.stats.total_attempts,
                    summary.stats.total_questions,
                    summary.average_percent,
                    summary.wrong_answers,
                    format::total_time(summary.stats.total_time_ms)
                );
            }
        }
        Command::Reset => {
            let subject = parsed.subject.as_ref().ok_or(SessionError::NoSubjectSelected)?;
            controller.select_subject(subject)?;
            controller.reset_subject_stats().await?;
            println!("progress reset for {subject}");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run().await {
        log::error!("{err}");
        std::process::exit(2);
    }
}
