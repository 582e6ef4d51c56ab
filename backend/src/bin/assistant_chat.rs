//! Terminal client for the assistant chat endpoint.
//!
//! Reads a message per line, streams the reply, and turns reverse-question
//! tool calls into prompts. Answers go back through [`ChatSession`], which
//! decides when the conversation is resent to the model.

use std::io::Write;

use clap::Parser;
use color_eyre::eyre::{Context, Result, eyre};
use futures_util::StreamExt;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::runtime::Builder;

use hello_assistant::client::ChatClient;
use hello_assistant::domain::{QuestionType, ReverseQuestionOutput};
use hello_assistant::domain::chat::{
    ChatSession, QuestionForm, SUBMIT_LABEL, ToolPartView, UiMessageChunk,
};

type InputLines = Lines<BufReader<Stdin>>;

/// `assistant-chat` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "assistant-chat",
    about = "Chat with the assistant from the terminal",
    version
)]
struct CliArgs {
    /// Base URL of the server.
    #[arg(long, value_name = "url", default_value = "http://127.0.0.1:8080")]
    url: String,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = CliArgs::parse();
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("failed to create Tokio runtime")?;
    runtime.block_on(run(args))
}

async fn run(args: CliArgs) -> Result<()> {
    let client = ChatClient::new(&args.url)?;
    let mut session = ChatSession::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("Connected to {}. Type a message, or /quit to exit.", client.endpoint());
    loop {
        prompt("> ")?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let text = line.trim();
        if text == "/quit" {
            break;
        }
        if text.is_empty() {
            continue;
        }
        session.send_text(text);
        converse(&client, &mut session, &mut lines).await?;
    }
    Ok(())
}

/// Stream replies until the model stops asking questions.
async fn converse(
    client: &ChatClient,
    session: &mut ChatSession,
    lines: &mut InputLines,
) -> Result<()> {
    loop {
        stream_reply(client, session).await?;
        if let Some(error) = session.last_error() {
            println!("[error] {error}");
            return Ok(());
        }
        answer_questions(session, lines).await?;
        if !session.should_resend() {
            return Ok(());
        }
    }
}

async fn stream_reply(client: &ChatClient, session: &mut ChatSession) -> Result<()> {
    let mut chunks = client.stream(session.messages()).await?;
    let mut printed = false;
    while let Some(chunk) = chunks.next().await {
        let chunk = chunk?;
        if let UiMessageChunk::TextDelta { delta, .. } = &chunk {
            prompt(delta)?;
            printed = true;
        }
        session.apply(chunk);
    }
    if printed {
        println!();
    }
    Ok(())
}

async fn answer_questions(session: &mut ChatSession, lines: &mut InputLines) -> Result<()> {
    let views: Vec<ToolPartView> = session
        .pending_tool_calls()
        .map(ToolPartView::from_part)
        .collect();
    for view in views {
        match view {
            ToolPartView::Form(form) => {
                let output = ask(&form, lines).await?;
                session
                    .add_tool_output(form.tool_call_id(), serde_json::to_value(output)?)
                    .map_err(|err| eyre!(err))?;
            }
            other => println!("{}", other.status_text()),
        }
    }
    Ok(())
}

async fn ask(
    form: &QuestionForm,
    lines: &mut InputLines,
) -> Result<ReverseQuestionOutput> {
    let input = form.input();
    println!("? {}", input.question());
    for (index, option) in input.options().iter().enumerate() {
        match &option.description {
            Some(description) => println!("  {}. {} ({description})", index + 1, option.label),
            None => println!("  {}. {}", index + 1, option.label),
        }
    }
    loop {
        let hint = form.placeholder().unwrap_or(SUBMIT_LABEL);
        prompt(&format!("[{hint}] "))?;
        let raw = lines
            .next_line()
            .await?
            .ok_or_else(|| eyre!("input closed before the question was answered"))?;
        let raw = match input.kind() {
            QuestionType::Select => select_value(form, &raw),
            QuestionType::Text => raw,
        };
        match form.submit(&raw) {
            Ok(output) => return Ok(output),
            Err(err) => println!("{err}"),
        }
    }
}

/// Map a 1-based option number to that option's value; anything else is
/// submitted as typed.
fn select_value(form: &QuestionForm, raw: &str) -> String {
    let raw = raw.trim();
    raw.parse::<usize>()
        .ok()
        .and_then(|number| number.checked_sub(1))
        .and_then(|index| form.input().options().get(index))
        .map_or_else(|| raw.to_owned(), |option| option.value.clone())
}

fn prompt(text: &str) -> Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(text.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hello_assistant::domain::{QuestionOption, ReverseQuestionInput};
    use rstest::rstest;

    fn form() -> QuestionForm {
        let input = ReverseQuestionInput::select(
            "Which language?",
            vec![
                QuestionOption {
                    label: "TypeScript".to_owned(),
                    value: "ts".to_owned(),
                    description: None,
                },
                QuestionOption {
                    label: "Rust".to_owned(),
                    value: "rust".to_owned(),
                    description: None,
                },
            ],
        )
        .expect("valid select question");
        QuestionForm::new("c1", input)
    }

    #[rstest]
    #[case("2", "rust")]
    #[case(" 1 ", "ts")]
    #[case("3", "3")]
    #[case("0", "0")]
    #[case("rust", "rust")]
    fn numbers_pick_options(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(select_value(&form(), raw), expected);
    }
}
