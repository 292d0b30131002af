//! Chat command implementation

use crate::chat::{ChatSession, CompletionSource, HttpCompletionClient, SubmitOutcome};
use crate::cli::output::{format_metrics, format_transcript_json, GREETING};
use crate::cli::{load_config_with_overrides, ChatArgs};
use crate::config::{MAX_MAX_TOKENS, MIN_MAX_TOKENS};
use crate::logging::{init_tracing, truncate_prompt};
use colored::Colorize;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

/// How replies are written to the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderMode {
    /// Print tokens as they arrive
    pub stream_tokens: bool,
    /// Use the non-streaming endpoint
    pub blocking: bool,
}

impl From<&ChatArgs> for RenderMode {
    fn from(args: &ChatArgs) -> Self {
        Self {
            stream_tokens: !args.json,
            blocking: args.no_stream,
        }
    }
}

/// Run one turn and render it to `out`.
///
/// Returns the outcome so callers decide whether a failure ends the process.
pub async fn run_turn<S, W>(
    session: &mut ChatSession,
    source: &S,
    input: &str,
    mode: RenderMode,
    out: &mut W,
) -> SubmitOutcome
where
    S: CompletionSource + ?Sized,
    W: Write,
{
    let outcome = if mode.blocking {
        session.submit_blocking(source, input).await
    } else {
        session
            .submit(source, input, |token| {
                if mode.stream_tokens {
                    let _ = write!(out, "{}", token);
                    let _ = out.flush();
                }
            })
            .await
    };

    if !mode.stream_tokens {
        return outcome;
    }

    match &outcome {
        SubmitOutcome::Completed { id, metrics } => {
            if mode.blocking {
                if let Some(msg) = session.message(*id) {
                    let _ = write!(out, "{}", msg.content);
                }
            }
            let _ = writeln!(out);
            let _ = writeln!(out, "{}", format_metrics(metrics).dimmed());
        }
        SubmitOutcome::Failed { .. } => {
            let _ = writeln!(out);
        }
        SubmitOutcome::Ignored => {}
    }

    outcome
}

/// Handle `dllama chat` command
pub async fn run_chat(args: ChatArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = load_config_with_overrides(&args.client)?;
    if let Some(max_tokens) = args.max_tokens {
        config.chat.max_tokens = max_tokens;
    }
    config.validate()?;

    init_tracing(&config.logging)?;

    let client = HttpCompletionClient::new(&config.api)?;
    let mut session = ChatSession::new(config.chat.max_tokens);
    let mode = RenderMode::from(&args);
    let content_logging = config.logging.enable_content_logging;

    tracing::debug!(
        base_url = %config.api.base_url,
        max_tokens = session.max_tokens(),
        "Chat session started"
    );

    let mut stdout = std::io::stdout();

    if let Some(prompt) = args.prompt.as_deref() {
        tracing::debug!(prompt = ?truncate_prompt(prompt, content_logging), "Submitting prompt");
        let outcome = run_turn(&mut session, &client, prompt, mode, &mut stdout).await;

        if args.json {
            println!("{}", format_transcript_json(session.messages())?);
        }
        if let SubmitOutcome::Failed { error, .. } = outcome {
            return Err(error.into());
        }
        return Ok(());
    }

    interactive_loop(
        &mut session,
        &client,
        BufReader::new(tokio::io::stdin()),
        mode,
        content_logging,
        &mut stdout,
    )
    .await?;

    if args.json {
        println!("{}", format_transcript_json(session.messages())?);
    }

    Ok(())
}

/// A line the interactive loop handles itself instead of sending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopCommand {
    Quit,
    /// `/max` with its parsed argument, `None` when missing or invalid
    SetMaxTokens(Option<u32>),
}

/// Recognize `/quit`, `/exit` and `/max <n>`. Anything else is a prompt.
fn parse_command(line: &str) -> Option<LoopCommand> {
    let mut words = line.split_whitespace();
    let command = words.next()?;
    let rest: Vec<&str> = words.collect();

    match (command, rest.as_slice()) {
        ("/quit" | "/exit", []) => Some(LoopCommand::Quit),
        ("/max", [value]) => Some(LoopCommand::SetMaxTokens(value.parse().ok())),
        ("/max", _) => Some(LoopCommand::SetMaxTokens(None)),
        _ => None,
    }
}

/// Read prompts line by line until `/quit`, `/exit` or end of input.
///
/// A failed turn is already logged by the session; the loop keeps going.
pub async fn interactive_loop<S, R, W>(
    session: &mut ChatSession,
    source: &S,
    input: R,
    mode: RenderMode,
    content_logging: bool,
    out: &mut W,
) -> std::io::Result<()>
where
    S: CompletionSource + ?Sized,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    if mode.stream_tokens {
        writeln!(out, "{}", GREETING.bold())?;
        writeln!(
            out,
            "{}",
            "Type /quit to exit, /max <n> to change max tokens.".dimmed()
        )?;
    }

    let mut lines = input.lines();
    loop {
        if mode.stream_tokens {
            write!(out, "{} ", ">".cyan().bold())?;
            out.flush()?;
        }

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_command(&line) {
            Some(LoopCommand::Quit) => break,
            Some(LoopCommand::SetMaxTokens(Some(n))) => {
                session.set_max_tokens(n);
                writeln!(out, "max tokens: {}", session.max_tokens())?;
            }
            Some(LoopCommand::SetMaxTokens(None)) => {
                writeln!(out, "usage: /max <{}-{}>", MIN_MAX_TOKENS, MAX_MAX_TOKENS)?;
            }
            None => {
                tracing::debug!(prompt = ?truncate_prompt(&line, content_logging), "Submitting prompt");
                run_turn(session, source, &line, mode, out).await;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::{ChatError, EventStream, GenerateResponse, StreamEvent};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FixedSource(Vec<&'static str>);

    #[async_trait]
    impl CompletionSource for FixedSource {
        async fn open_stream(&self, _: &str, _: u32) -> Result<EventStream, ChatError> {
            let items: Vec<_> = self.0.iter().map(|p| Ok(StreamEvent::parse(p))).collect();
            Ok(Box::pin(futures::stream::iter(items)))
        }

        async fn generate(&self, prompt: &str, _: u32) -> Result<GenerateResponse, ChatError> {
            Ok(GenerateResponse {
                generated_text: "whole reply".to_string(),
                prompt: prompt.to_string(),
                generation_time: 0.5,
                total_tokens: 2,
            })
        }
    }

    const STREAMING: RenderMode = RenderMode {
        stream_tokens: true,
        blocking: false,
    };

    #[tokio::test]
    async fn test_run_turn_streams_tokens_and_metrics() {
        colored::control::set_override(false);
        let source = FixedSource(vec![r#"{"text": "Hello"}"#, r#"{"text": " world"}"#, "[DONE]"]);
        let mut session = ChatSession::new(256);
        let mut out = Vec::new();

        let outcome = run_turn(&mut session, &source, "hi", STREAMING, &mut out).await;

        assert!(matches!(outcome, SubmitOutcome::Completed { .. }));
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Hello world\n"));
        assert!(text.contains("Tokens: 2"));
    }

    #[tokio::test]
    async fn test_run_turn_blocking_prints_whole_reply() {
        colored::control::set_override(false);
        let source = FixedSource(vec![]);
        let mut session = ChatSession::new(256);
        let mut out = Vec::new();
        let mode = RenderMode {
            stream_tokens: true,
            blocking: true,
        };

        run_turn(&mut session, &source, "hi", mode, &mut out).await;

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("whole reply\n"));
        assert!(text.contains("Time: 0.50s"));
    }

    #[tokio::test]
    async fn test_run_turn_quiet_mode_writes_nothing() {
        let source = FixedSource(vec![r#"{"text": "Hello"}"#, "[DONE]"]);
        let mut session = ChatSession::new(256);
        let mut out = Vec::new();
        let mode = RenderMode {
            stream_tokens: false,
            blocking: false,
        };

        run_turn(&mut session, &source, "hi", mode, &mut out).await;

        assert!(out.is_empty());
        assert_eq!(session.messages()[1].content, "Hello");
    }

    #[tokio::test]
    async fn test_run_turn_blank_input_writes_nothing() {
        let source = FixedSource(vec!["[DONE]"]);
        let mut session = ChatSession::new(256);
        let mut out = Vec::new();

        let outcome = run_turn(&mut session, &source, "   ", STREAMING, &mut out).await;

        assert_eq!(outcome, SubmitOutcome::Ignored);
        assert!(out.is_empty());
    }

    /// Records every prompt; replies `ok` or fails when the prompt says so.
    #[derive(Default)]
    struct RecordingSource {
        prompts: Mutex<Vec<(String, u32)>>,
    }

    impl RecordingSource {
        fn prompts(&self) -> Vec<(String, u32)> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CompletionSource for RecordingSource {
        async fn open_stream(
            &self,
            prompt: &str,
            max_tokens: u32,
        ) -> Result<EventStream, ChatError> {
            self.prompts
                .lock()
                .unwrap()
                .push((prompt.to_string(), max_tokens));
            if prompt.contains("fail") {
                return Err(ChatError::Network("connection refused".to_string()));
            }
            let items = vec![
                Ok(StreamEvent::parse(r#"{"text": "ok"}"#)),
                Ok(StreamEvent::Done),
            ];
            Ok(Box::pin(futures::stream::iter(items)))
        }

        async fn generate(&self, _: &str, _: u32) -> Result<GenerateResponse, ChatError> {
            Err(ChatError::StreamClosed)
        }
    }

    async fn drive_loop(source: &RecordingSource, input: &str) -> (ChatSession, String) {
        colored::control::set_override(false);
        let mut session = ChatSession::new(256);
        let mut out = Vec::new();
        interactive_loop(
            &mut session,
            source,
            input.as_bytes(),
            STREAMING,
            false,
            &mut out,
        )
        .await
        .unwrap();
        (session, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_parse_command_exact_words_only() {
        assert_eq!(parse_command("/quit"), Some(LoopCommand::Quit));
        assert_eq!(parse_command("  /exit  "), Some(LoopCommand::Quit));
        assert_eq!(
            parse_command("/max 64"),
            Some(LoopCommand::SetMaxTokens(Some(64)))
        );
        assert_eq!(parse_command("/max"), Some(LoopCommand::SetMaxTokens(None)));
        assert_eq!(
            parse_command("/max lots"),
            Some(LoopCommand::SetMaxTokens(None))
        );

        assert_eq!(parse_command("/maxwell equations explained"), None);
        assert_eq!(parse_command("/quitting time"), None);
        assert_eq!(parse_command("/quit now please"), None);
        assert_eq!(parse_command("hello"), None);
        assert_eq!(parse_command("   "), None);
    }

    #[tokio::test]
    async fn test_loop_sends_slash_prefixed_prompts() {
        let source = RecordingSource::default();

        let (session, out) = drive_loop(&source, "/maxwell equations explained\n/quit\n").await;

        assert_eq!(
            source.prompts(),
            vec![("/maxwell equations explained".to_string(), 256)]
        );
        assert!(!out.contains("usage"));
        assert_eq!(session.messages().len(), 2);
    }

    #[tokio::test]
    async fn test_loop_max_command_changes_budget() {
        let source = RecordingSource::default();

        let (_, out) = drive_loop(&source, "first\n/max 16\nsecond\n/max nope\n").await;

        assert_eq!(
            source.prompts(),
            vec![("first".to_string(), 256), ("second".to_string(), 16)]
        );
        assert!(out.contains("max tokens: 16"));
        assert!(out.contains("usage: /max <1-1024>"));
    }

    #[tokio::test]
    async fn test_loop_skips_blank_lines_and_stops_at_quit() {
        let source = RecordingSource::default();

        let (session, out) = drive_loop(&source, "\n   \nhi\n/exit\nnever sent\n").await;

        assert_eq!(source.prompts(), vec![("hi".to_string(), 256)]);
        assert_eq!(session.messages().len(), 2);
        assert!(out.starts_with(GREETING));
    }

    #[tokio::test]
    async fn test_loop_continues_after_failed_turn() {
        let source = RecordingSource::default();

        let (session, _) = drive_loop(&source, "please fail\nagain").await;

        // EOF without a trailing newline still submits the last line
        assert_eq!(source.prompts().len(), 2);
        let replies: Vec<_> = session
            .messages()
            .iter()
            .filter(|m| m.role == crate::chat::Role::Assistant)
            .collect();
        assert!(replies[0].metrics.is_none());
        assert_eq!(replies[1].content, "ok");
        assert!(replies[1].metrics.is_some());
    }
}
