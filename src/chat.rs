use silencio_core::{Answer, Assistant};
use silencio_llm::{Embedder, Generator};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

const QUIT_COMMAND: &str = "/quit";

/// Render an answer, optionally followed by its numbered sources.
pub(crate) fn format_answer(answer: &Answer, show_sources: bool) -> String {
    let mut out = answer.text.clone();
    if show_sources && !answer.sources.is_empty() {
        out.push_str("\n\nSources:");
        for (i, source) in answer.sources.iter().enumerate() {
            out.push_str(&format!(
                "\n  [{}] {} (score {:.3})",
                i + 1,
                source.record.id,
                source.score
            ));
        }
    }
    out
}

/// Line-oriented question loop. Returns the number of questions answered.
///
/// Ends on `/quit` or end of input.
pub(crate) async fn run_chat<E, G, R, W>(
    assistant: &Assistant<E, G>,
    examples: &[String],
    top_k: usize,
    show_sources: bool,
    input: R,
    output: &mut W,
) -> anyhow::Result<usize>
where
    E: Embedder,
    G: Generator,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut banner = format!(
        "Ask anything about {}. Type {QUIT_COMMAND} to leave.\n",
        assistant.subject()
    );
    if !examples.is_empty() {
        banner.push_str("For example:\n");
        for q in examples {
            banner.push_str(&format!("  - {q}\n"));
        }
    }
    output.write_all(banner.as_bytes()).await?;
    output.write_all(b"> ").await?;
    output.flush().await?;

    let mut lines = input.lines();
    let mut asked = 0;
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line == QUIT_COMMAND {
            break;
        }
        let answer = assistant.ask(line, top_k).await;
        asked += 1;
        let rendered = format_answer(&answer, show_sources);
        output
            .write_all(format!("{rendered}\n\n> ").as_bytes())
            .await?;
        output.flush().await?;
    }
    output.write_all(b"\n").await?;
    output.flush().await?;
    tracing::info!(questions = asked, "chat session ended");
    Ok(asked)
}
