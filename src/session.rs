use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use crate::backend::KvBackend;
use crate::command::{parse_command, CommandError};
use crate::engine::Engine;
use crate::model::Status;
use crate::render;

/// The controller loop: read one command per line, dispatch it, write the
/// rendered screen. Returns when the input ends.
pub async fn run_session<B, R, W>(engine: &mut Engine<B>, input: R, mut output: W) -> std::io::Result<()>
where
    B: KvBackend,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    // Initial render, like a page load.
    let initial = render::render_view(&engine.view());
    output.write_all(initial.as_bytes()).await?;
    output.flush().await?;

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        let text = match parse_command(&line) {
            Ok(cmd) => {
                debug!(command = crate::observability::command_label(&cmd), "dispatch");
                render::render_response(&engine.dispatch(cmd))
            }
            Err(CommandError::Empty) => continue,
            Err(e) => {
                warn!("{e}");
                metrics::counter!(crate::observability::INVALID_COMMANDS_TOTAL).increment(1);
                let mut text = render::render_status(&Status::error(e.to_string()));
                text.push('\n');
                text
            }
        };
        output.write_all(text.as_bytes()).await?;
        output.flush().await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::engine::BookingStore;
    use chrono::NaiveDate;

    fn engine() -> Engine<MemoryBackend> {
        Engine::new(BookingStore::new(MemoryBackend::new()))
            .with_today(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap())
    }

    async fn run(engine: &mut Engine<MemoryBackend>, script: &str) -> String {
        let mut out = Vec::new();
        run_session(engine, script.as_bytes(), &mut out).await.unwrap();
        String::from_utf8(out).unwrap()
    }

    const FIRST: &str = r#"{"cmd":"submit","name":"Ana","phone":"555","sport":"Tennis","venue":"Court A","date":"2025-06-10","startTime":"10:00","duration":"1"}"#;
    const OVERLAP: &str = r#"{"cmd":"submit","name":"Bo","phone":"556","sport":"Tennis","venue":"Court A","date":"2025-06-10","startTime":"10:30","duration":"1"}"#;

    #[tokio::test]
    async fn initial_render_on_empty_input() {
        let mut engine = engine();
        let out = run(&mut engine, "").await;
        assert!(out.contains("0 upcoming booking(s)"));
        assert!(out.contains("No bookings found for this filter."));
    }

    #[tokio::test]
    async fn submit_then_overlap() {
        let mut engine = engine();
        let out = run(&mut engine, &format!("{FIRST}\n\n{OVERLAP}\n")).await;
        assert!(out.contains("ok: Booking confirmed successfully."));
        assert!(out.contains(
            "error: That slot overlaps with an existing booking at 10:00 for Court A."
        ));
        assert_eq!(engine.store().load().len(), 1);
    }

    #[tokio::test]
    async fn bad_line_reports_and_continues() {
        let mut engine = engine();
        let out = run(&mut engine, &format!("garbage\n{FIRST}\n")).await;
        assert!(out.contains("error: could not parse command"));
        assert!(out.contains("ok: Booking confirmed successfully."));
    }
}
