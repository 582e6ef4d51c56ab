//! The `reverseQuestion` tool: input and output shapes, validation, the
//! declaration handed to the language model, and answer resolution.
//!
//! The model calls this tool to ask the user a clarifying question before it
//! answers. Arguments arrive as JSON and are validated here before any client
//! renders them; the client's answer is packaged into
//! [`ReverseQuestionOutput`] and fed back into the conversation.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::domain::chat::ToolDefinition;

/// Tool name declared to the model and used in `tool-reverseQuestion` parts.
pub const REVERSE_QUESTION_TOOL_NAME: &str = "reverseQuestion";

/// Tool description declared to the model.
pub const REVERSE_QUESTION_DESCRIPTION: &str =
    "ユーザーのリクエストを満たすために不足している情報を質問として提示し、回答を受け取るためのツール";

/// Kind of answer the question expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    /// Free-form text.
    Text,
    /// One of the supplied options.
    Select,
}

/// One selectable option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    /// Human-readable text shown to the user.
    pub label: String,
    /// Value submitted by the form.
    pub value: String,
    /// Optional supplementary explanation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Validation errors for tool input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReverseQuestionValidationError {
    /// The input does not match the tool schema.
    Malformed { message: String },
    /// The question text is empty.
    EmptyQuestion,
}

impl std::fmt::Display for ReverseQuestionValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed { message } => write!(f, "invalid reverseQuestion input: {message}"),
            Self::EmptyQuestion => write!(f, "question must not be empty"),
        }
    }
}

impl std::error::Error for ReverseQuestionValidationError {}

/// Validated arguments of a `reverseQuestion` call.
///
/// ## Invariants
/// - `question` is non-empty.
/// - Every option carries both `label` and `value`.
///
/// An empty or absent option list is accepted for `select`; renderers show a
/// warning instead of a form in that case.
///
/// # Examples
/// ```
/// use hello_assistant::domain::{QuestionType, ReverseQuestionInput};
/// use serde_json::json;
///
/// let input = ReverseQuestionInput::from_value(json!({
///     "question": "What should I call you?",
///     "type": "text"
/// }))
/// .expect("valid input");
/// assert_eq!(input.kind(), QuestionType::Text);
/// assert!(input.is_required());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ReverseQuestionInputDto", into = "ReverseQuestionInputDto")]
pub struct ReverseQuestionInput {
    question: String,
    kind: QuestionType,
    options: Option<Vec<QuestionOption>>,
    placeholder: Option<String>,
    required: Option<bool>,
}

impl ReverseQuestionInput {
    /// Build a free-form text question.
    pub fn text(question: impl Into<String>) -> Result<Self, ReverseQuestionValidationError> {
        Self::try_new(question, QuestionType::Text, None)
    }

    /// Build a select question with the given options.
    pub fn select(
        question: impl Into<String>,
        options: Vec<QuestionOption>,
    ) -> Result<Self, ReverseQuestionValidationError> {
        Self::try_new(question, QuestionType::Select, Some(options))
    }

    fn try_new(
        question: impl Into<String>,
        kind: QuestionType,
        options: Option<Vec<QuestionOption>>,
    ) -> Result<Self, ReverseQuestionValidationError> {
        let question = question.into();
        if question.is_empty() {
            return Err(ReverseQuestionValidationError::EmptyQuestion);
        }
        Ok(Self {
            question,
            kind,
            options,
            placeholder: None,
            required: None,
        })
    }

    /// Validate raw tool-call arguments.
    pub fn from_value(value: Value) -> Result<Self, ReverseQuestionValidationError> {
        serde_json::from_value(value).map_err(|err| ReverseQuestionValidationError::Malformed {
            message: err.to_string(),
        })
    }

    /// Attach a placeholder for free-form answers.
    #[must_use]
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Mark whether an answer is mandatory.
    #[must_use]
    pub fn with_required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    /// Question text shown to the user.
    #[must_use]
    pub fn question(&self) -> &str {
        self.question.as_str()
    }

    /// Expected answer kind.
    #[must_use]
    pub fn kind(&self) -> QuestionType {
        self.kind
    }

    /// Options in declaration order; empty when none were supplied.
    #[must_use]
    pub fn options(&self) -> &[QuestionOption] {
        self.options.as_deref().unwrap_or_default()
    }

    /// Placeholder for free-form answers.
    #[must_use]
    pub fn placeholder(&self) -> Option<&str> {
        self.placeholder.as_deref()
    }

    /// Whether an answer is mandatory. Defaults to `true`.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(true)
    }

    /// Whether a select question has nothing to choose from.
    #[must_use]
    pub fn lacks_options(&self) -> bool {
        self.kind == QuestionType::Select && self.options().is_empty()
    }

    /// Package a raw form value as tool output.
    ///
    /// Select answers resolve to the matching option's label; when no option
    /// matches, the raw value is kept as the answer and the option fields are
    /// left empty.
    ///
    /// # Examples
    /// ```
    /// use hello_assistant::domain::{QuestionOption, ReverseQuestionInput};
    ///
    /// let input = ReverseQuestionInput::select(
    ///     "Pick a language",
    ///     vec![QuestionOption {
    ///         label: "Rust".to_owned(),
    ///         value: "rust".to_owned(),
    ///         description: None,
    ///     }],
    /// )
    /// .expect("valid input");
    /// assert_eq!(input.resolve_answer("rust").answer, "Rust");
    /// assert_eq!(input.resolve_answer("go").answer, "go");
    /// ```
    #[must_use]
    pub fn resolve_answer(&self, raw: &str) -> ReverseQuestionOutput {
        let selected = match self.kind {
            QuestionType::Select => self.options().iter().find(|option| option.value == raw),
            QuestionType::Text => None,
        };
        ReverseQuestionOutput {
            answer: selected.map_or_else(|| raw.to_owned(), |option| option.label.clone()),
            option_value: selected.map(|option| option.value.clone()),
            option_label: selected.map(|option| option.label.clone()),
            kind: self.kind,
            question: self.question.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ReverseQuestionInputDto {
    question: String,
    #[serde(rename = "type")]
    kind: QuestionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    options: Option<Vec<QuestionOption>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    required: Option<bool>,
}

impl From<ReverseQuestionInput> for ReverseQuestionInputDto {
    fn from(value: ReverseQuestionInput) -> Self {
        Self {
            question: value.question,
            kind: value.kind,
            options: value.options,
            placeholder: value.placeholder,
            required: value.required,
        }
    }
}

impl TryFrom<ReverseQuestionInputDto> for ReverseQuestionInput {
    type Error = ReverseQuestionValidationError;

    fn try_from(value: ReverseQuestionInputDto) -> Result<Self, Self::Error> {
        let ReverseQuestionInputDto {
            question,
            kind,
            options,
            placeholder,
            required,
        } = value;
        let mut input = Self::try_new(question, kind, options)?;
        input.placeholder = placeholder;
        input.required = required;
        Ok(input)
    }
}

/// Answer submitted as the tool's output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReverseQuestionOutput {
    /// Answer as the conversation should read it.
    pub answer: String,
    /// Raw value of the chosen option.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option_value: Option<String>,
    /// Label of the chosen option.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option_label: Option<String>,
    /// Kind of question answered.
    #[serde(rename = "type")]
    pub kind: QuestionType,
    /// Question that was answered.
    pub question: String,
}

/// JSON schema of the tool input, with field descriptions for the model.
#[must_use]
pub fn reverse_question_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "question": {
                "type": "string",
                "minLength": 1,
                "description": "ユーザーに確認したい質問文"
            },
            "type": {
                "type": "string",
                "enum": ["text", "select"],
                "description": "質問種別。text=自由記述, select=選択式"
            },
            "options": {
                "type": "array",
                "description": "typeがselectの場合に提示する選択肢",
                "items": {
                    "type": "object",
                    "properties": {
                        "label": { "type": "string", "description": "表示用のテキスト" },
                        "value": { "type": "string", "description": "フォーム送信用の値" },
                        "description": { "type": "string", "description": "選択肢の補足説明" }
                    },
                    "required": ["label", "value"]
                }
            },
            "placeholder": {
                "type": "string",
                "description": "自由記述のプレースホルダー"
            },
            "required": {
                "type": "boolean",
                "description": "trueの場合、回答必須として扱う"
            }
        },
        "required": ["question", "type"]
    })
}

/// Tool declaration handed to the language model.
#[must_use]
pub fn reverse_question_tool() -> ToolDefinition {
    ToolDefinition {
        name: REVERSE_QUESTION_TOOL_NAME.to_owned(),
        description: REVERSE_QUESTION_DESCRIPTION.to_owned(),
        parameters: reverse_question_schema(),
    }
}
