//! Render-ready views of reverse-question tool parts.
//!
//! Every client renders the same affordance per tool state; keeping the
//! decision here means the terminal client and any future front end agree on
//! what the user sees and on how a form answer is packaged.

use super::message::{ToolPart, ToolState};
use crate::domain::reverse_question::{QuestionType, ReverseQuestionInput, ReverseQuestionOutput};

/// Shown while the tool arguments have not arrived.
pub const PREPARING_TEXT: &str = "質問を準備しています...";
/// Shown while arguments are arriving but cannot be rendered yet.
pub const RECEIVING_TEXT: &str = "質問内容を受信中...";
/// Shown for a select question without options.
pub const MISSING_OPTIONS_TEXT: &str = "選択式の質問ですが、選択肢が定義されていません。";
/// Shown when submitting or validating the answer failed.
pub const FAILED_TEXT: &str = "回答処理でエラーが発生しました。もう一度お試しください。";
/// Shown when output exists but carries no answer text.
pub const SUBMITTED_TEXT: &str = "送信済み";
/// Placeholder of the select control.
pub const SELECT_PLACEHOLDER: &str = "選択してください";
/// Label of the submit control.
pub const SUBMIT_LABEL: &str = "送信";

/// Errors raised by [`QuestionForm::submit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    /// A required answer was left empty.
    #[error("回答を入力してください")]
    AnswerRequired,
}

/// Interactive form for a question awaiting an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionForm {
    tool_call_id: String,
    input: ReverseQuestionInput,
}

impl QuestionForm {
    /// Form for the given call.
    #[must_use]
    pub fn new(tool_call_id: impl Into<String>, input: ReverseQuestionInput) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            input,
        }
    }

    /// Call the answer belongs to.
    #[must_use]
    pub fn tool_call_id(&self) -> &str {
        &self.tool_call_id
    }

    /// Question being asked.
    #[must_use]
    pub fn input(&self) -> &ReverseQuestionInput {
        &self.input
    }

    /// Placeholder for the answer control.
    #[must_use]
    pub fn placeholder(&self) -> Option<&str> {
        match self.input.kind() {
            QuestionType::Select => Some(SELECT_PLACEHOLDER),
            QuestionType::Text => self.input.placeholder(),
        }
    }

    /// Validate a raw form value and package it as tool output.
    ///
    /// Text answers are trimmed. Required questions reject an empty answer.
    /// Select answers resolve to the chosen option's label.
    ///
    /// # Examples
    /// ```
    /// use hello_assistant::domain::ReverseQuestionInput;
    /// use hello_assistant::domain::chat::{FormError, QuestionForm};
    ///
    /// let form = QuestionForm::new("c1", ReverseQuestionInput::text("Name?").expect("valid"));
    /// assert_eq!(form.submit("  Ferris ").expect("answer").answer, "Ferris");
    /// assert_eq!(form.submit("   "), Err(FormError::AnswerRequired));
    /// ```
    pub fn submit(&self, raw: &str) -> Result<ReverseQuestionOutput, FormError> {
        let answer = match self.input.kind() {
            QuestionType::Text => raw.trim(),
            QuestionType::Select => raw,
        };
        if self.input.is_required() && answer.is_empty() {
            return Err(FormError::AnswerRequired);
        }
        Ok(self.input.resolve_answer(answer))
    }
}

/// What to render for one reverse-question tool part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolPartView {
    /// No arguments yet.
    Preparing,
    /// Arguments present but not renderable yet.
    Receiving,
    /// Select question with nothing to select.
    MissingOptions { question: String },
    /// Awaiting the user's answer.
    Form(QuestionForm),
    /// Answer submitted.
    Answered { question: String, answer: String },
    /// Input or output failed.
    Failed { question: Option<String> },
}

impl ToolPartView {
    /// Choose the view for a tool part.
    #[must_use]
    pub fn from_part(part: &ToolPart) -> Self {
        let Some(raw_input) = part.input.clone() else {
            return Self::Preparing;
        };
        let input = ReverseQuestionInput::from_value(raw_input).ok();
        let question = input.as_ref().map(|input| input.question().to_owned());

        match part.state {
            ToolState::OutputAvailable => {
                let output = part.output.as_ref();
                let answer = output
                    .and_then(|output| output.get("answer"))
                    .and_then(serde_json::Value::as_str)
                    .map_or_else(|| SUBMITTED_TEXT.to_owned(), str::to_owned);
                let question = question
                    .or_else(|| {
                        output
                            .and_then(|output| output.get("question"))
                            .and_then(serde_json::Value::as_str)
                            .map(str::to_owned)
                    })
                    .unwrap_or_default();
                Self::Answered { question, answer }
            }
            ToolState::OutputError => Self::Failed { question },
            ToolState::InputAvailable => match input {
                Some(input) if input.lacks_options() => Self::MissingOptions {
                    question: input.question().to_owned(),
                },
                Some(input) => Self::Form(QuestionForm::new(part.tool_call_id.clone(), input)),
                None => Self::Receiving,
            },
            ToolState::InputStreaming => Self::Receiving,
        }
    }

    /// Status line for the view; the question itself for a form.
    #[must_use]
    pub fn status_text(&self) -> String {
        match self {
            Self::Preparing => PREPARING_TEXT.to_owned(),
            Self::Receiving => RECEIVING_TEXT.to_owned(),
            Self::MissingOptions { .. } => MISSING_OPTIONS_TEXT.to_owned(),
            Self::Form(form) => form.input().question().to_owned(),
            Self::Answered { answer, .. } => format!("回答: {answer}"),
            Self::Failed { .. } => FAILED_TEXT.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use serde_json::{Value, json};

    #[fixture]
    fn select_input() -> Value {
        json!({
            "question": "Pick a language",
            "type": "select",
            "options": [
                { "label": "TypeScript", "value": "ts" },
                { "label": "Rust", "value": "rust" }
            ]
        })
    }

    fn part(state: ToolState, input: Option<Value>, output: Option<Value>) -> ToolPart {
        ToolPart {
            tool_name: "reverseQuestion".to_owned(),
            tool_call_id: "c1".to_owned(),
            state,
            input,
            output,
            error_text: None,
        }
    }

    #[rstest]
    fn missing_input_renders_preparing() {
        let view = ToolPartView::from_part(&part(ToolState::InputStreaming, None, None));
        assert_eq!(view, ToolPartView::Preparing);
        assert_eq!(view.status_text(), PREPARING_TEXT);
    }

    #[rstest]
    fn partial_input_renders_receiving() {
        let view = ToolPartView::from_part(&part(
            ToolState::InputStreaming,
            Some(json!({ "question": "Pi" })),
            None,
        ));
        assert_eq!(view, ToolPartView::Receiving);
    }

    #[rstest]
    fn select_without_options_renders_warning() {
        let view = ToolPartView::from_part(&part(
            ToolState::InputAvailable,
            Some(json!({ "question": "Pick", "type": "select", "options": [] })),
            None,
        ));
        assert_eq!(view.status_text(), MISSING_OPTIONS_TEXT);
    }

    #[rstest]
    fn available_input_renders_form(select_input: Value) {
        let view = ToolPartView::from_part(&part(ToolState::InputAvailable, Some(select_input), None));
        let ToolPartView::Form(form) = view else {
            panic!("expected a form");
        };
        assert_eq!(form.placeholder(), Some(SELECT_PLACEHOLDER));
        assert_eq!(form.tool_call_id(), "c1");
    }

    #[rstest]
    #[case(Some(json!({ "answer": "Rust", "type": "select", "question": "Pick a language" })), "回答: Rust")]
    #[case(Some(json!({})), "回答: 送信済み")]
    #[case(None, "回答: 送信済み")]
    fn answered_part_renders_answer(
        select_input: Value,
        #[case] output: Option<Value>,
        #[case] expected: &str,
    ) {
        let view = ToolPartView::from_part(&part(ToolState::OutputAvailable, Some(select_input), output));
        assert_eq!(view.status_text(), expected);
    }

    #[rstest]
    fn failed_part_renders_error(select_input: Value) {
        let view = ToolPartView::from_part(&part(ToolState::OutputError, Some(select_input), None));
        assert_eq!(
            view,
            ToolPartView::Failed {
                question: Some("Pick a language".to_owned())
            }
        );
        assert_eq!(view.status_text(), FAILED_TEXT);
    }

    #[rstest]
    fn optional_text_question_accepts_empty_answer() {
        let input = ReverseQuestionInput::text("Anything else?")
            .expect("valid")
            .with_required(false)
            .with_placeholder("optional");
        let form = QuestionForm::new("c2", input);
        assert_eq!(form.placeholder(), Some("optional"));
        assert_eq!(form.submit("  ").expect("optional answer").answer, "");
    }

    #[rstest]
    fn select_submission_resolves_label(select_input: Value) {
        let input = ReverseQuestionInput::from_value(select_input).expect("valid");
        let form = QuestionForm::new("c1", input);
        let output = form.submit("rust").expect("answer");
        assert_eq!(output.answer, "Rust");
        assert_eq!(output.option_value.as_deref(), Some("rust"));
        assert_eq!(form.submit(""), Err(FormError::AnswerRequired));
    }

    #[rstest]
    fn unmatched_select_answer_renders_the_raw_value(select_input: Value) {
        let input = ReverseQuestionInput::from_value(select_input.clone()).expect("valid");
        let output = QuestionForm::new("c1", input).submit("go").expect("answer");
        assert_eq!(output.option_value, None);
        assert_eq!(output.option_label, None);

        let output = serde_json::to_value(&output).expect("output json");
        let view =
            ToolPartView::from_part(&part(ToolState::OutputAvailable, Some(select_input), Some(output)));

        assert_eq!(
            view,
            ToolPartView::Answered {
                question: "Pick a language".to_owned(),
                answer: "go".to_owned(),
            }
        );
        assert_eq!(view.status_text(), "回答: go");
    }
}
