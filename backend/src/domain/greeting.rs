//! Greeting entity read by the hello endpoint.
//!
//! Rows are created by the datastore and only ever read here, so the type
//! exposes validated constructors and accessors but no mutation.

use serde::{Deserialize, Serialize};

/// Validation errors raised when constructing a [`Greeting`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GreetingValidationError {
    /// The identifier is zero or negative.
    NonPositiveId { id: i64 },
    /// The message is the empty string.
    EmptyMessage,
}

impl std::fmt::Display for GreetingValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonPositiveId { id } => write!(f, "greeting id must be positive, got {id}"),
            Self::EmptyMessage => write!(f, "greeting message must not be empty"),
        }
    }
}

impl std::error::Error for GreetingValidationError {}

/// Positive greeting identifier assigned by the datastore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct GreetingId(i64);

impl GreetingId {
    /// Validate and wrap a raw identifier.
    pub fn new(id: i64) -> Result<Self, GreetingValidationError> {
        if id <= 0 {
            return Err(GreetingValidationError::NonPositiveId { id });
        }
        Ok(Self(id))
    }

    /// Raw identifier value.
    #[must_use]
    pub fn get(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for GreetingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Non-empty greeting text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct GreetingMessage(String);

impl GreetingMessage {
    /// Validate and wrap a message.
    pub fn new(message: impl Into<String>) -> Result<Self, GreetingValidationError> {
        let message = message.into();
        if message.is_empty() {
            return Err(GreetingValidationError::EmptyMessage);
        }
        Ok(Self(message))
    }

    /// Borrow the message text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for GreetingMessage {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl From<GreetingMessage> for String {
    fn from(value: GreetingMessage) -> Self {
        value.0
    }
}

/// A stored greeting.
///
/// ## Invariants
/// - `id` is strictly positive.
/// - `message` is at least one character long.
///
/// # Examples
/// ```
/// use hello_assistant::domain::Greeting;
///
/// let greeting = Greeting::try_new(1, "Hello").expect("valid greeting");
/// assert_eq!(greeting.id().get(), 1);
/// assert_eq!(greeting.message().as_str(), "Hello");
/// assert!(Greeting::try_new(0, "Hello").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GreetingDto", into = "GreetingDto")]
pub struct Greeting {
    id: GreetingId,
    message: GreetingMessage,
}

impl Greeting {
    /// Build a greeting from validated parts.
    #[must_use]
    pub fn new(id: GreetingId, message: GreetingMessage) -> Self {
        Self { id, message }
    }

    /// Validate raw values and build a greeting.
    pub fn try_new(id: i64, message: impl Into<String>) -> Result<Self, GreetingValidationError> {
        Ok(Self::new(GreetingId::new(id)?, GreetingMessage::new(message)?))
    }

    /// Datastore identifier.
    #[must_use]
    pub fn id(&self) -> GreetingId {
        self.id
    }

    /// Greeting text.
    #[must_use]
    pub fn message(&self) -> &GreetingMessage {
        &self.message
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GreetingDto {
    id: i64,
    message: String,
}

impl From<Greeting> for GreetingDto {
    fn from(value: Greeting) -> Self {
        Self {
            id: value.id.get(),
            message: value.message.into(),
        }
    }
}

impl TryFrom<GreetingDto> for Greeting {
    type Error = GreetingValidationError;

    fn try_from(value: GreetingDto) -> Result<Self, Self::Error> {
        Self::try_new(value.id, value.message)
    }
}
