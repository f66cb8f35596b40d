use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;

use super::{OrderingPolicy, SearchClient, SearchForm, SearchOutcome, render};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Url(String),
    Query(String),
    Submit,
    Show,
    Quit,
    Unknown(String),
}

/// Parses one input line. The first word is the command and the rest of the
/// line, minus one separating space, is its argument.
pub fn parse_command(line: &str) -> Command {
    let line = line.trim_end_matches(['\r', '\n']);
    let (head, rest) = match line.split_once(' ') {
        Some((head, rest)) => (head, rest),
        None => (line, ""),
    };
    match head {
        "url" => Command::Url(rest.to_string()),
        "query" => Command::Query(rest.to_string()),
        "submit" | "s" => Command::Submit,
        "show" => Command::Show,
        "quit" | "exit" | "q" => Command::Quit,
        _ => Command::Unknown(line.to_string()),
    }
}

pub const HELP: &str = "commands: url <text> | query <text> | submit | show | quit";

/// Runs the interactive form over `input` and `output`.
///
/// Submissions run as spawned tasks and report back over a channel, so
/// input keeps being read while requests are in flight. When input ends the
/// session waits for outstanding requests before returning the final form.
pub async fn run_session<R, W>(
    client: Arc<SearchClient>,
    policy: OrderingPolicy,
    input: R,
    mut output: W,
) -> Result<SearchForm>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut form = SearchForm::new(policy);
    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<(u64, SearchOutcome)>();
    let mut lines = input.lines();
    let mut pending = 0usize;
    let mut input_open = true;

    output.write_all(format!("{HELP}\n").as_bytes()).await?;

    while input_open || pending > 0 {
        tokio::select! {
            line = lines.next_line(), if input_open => {
                let Some(line) = line? else {
                    input_open = false;
                    continue;
                };
                match parse_command(&line) {
                    Command::Url(url) => form.set_url(url),
                    Command::Query(query) => form.set_query(query),
                    Command::Submit => match form.start_submit() {
                        Some(submission) => {
                            pending += 1;
                            log::info!("submitting #{}: {:?}", submission.seq, submission.request);
                            let client = client.clone();
                            let done_tx = done_tx.clone();
                            tokio::spawn(async move {
                                let outcome = client.search(&submission.request).await;
                                // receiver only goes away when the session is over
                                let _ = done_tx.send((submission.seq, outcome));
                            });
                            output.write_all(render(&form).to_string().as_bytes()).await?;
                        }
                        None => {
                            output.write_all(b"Please fill in both Website URL and Search Query.\n").await?;
                        }
                    },
                    Command::Show => {
                        output.write_all(render(&form).to_string().as_bytes()).await?;
                    }
                    Command::Quit => break,
                    Command::Unknown(other) => {
                        if !other.trim().is_empty() {
                            output.write_all(format!("unknown command {other:?}; {HELP}\n").as_bytes()).await?;
                        }
                    }
                }
            }
            Some((seq, outcome)) = done_rx.recv() => {
                pending -= 1;
                if let Some(alert) = form.apply(seq, outcome) {
                    log::warn!("submission #{seq} failed ({}): {}", alert.kind, alert.message);
                    output.write_all(format!("{alert}\n").as_bytes()).await?;
                }
                output.write_all(render(&form).to_string().as_bytes()).await?;
            }
        }
        output.flush().await?;
    }

    Ok(form)
}
