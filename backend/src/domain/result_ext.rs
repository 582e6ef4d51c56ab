//! Result combinators that `std::result::Result` does not provide.
//!
//! The standard type already covers construction (`Ok`/`Err`),
//! discrimination (`is_ok`/`is_err`), `map`, `map_err`, `and_then` and
//! `unwrap_or`. This module adds side-effect hooks, exhaustive folding, an
//! unwrap that panics with the error value itself, panic capture and
//! fail-fast aggregation. Services use `tap`/`tap_err` for their log lines.

use std::any::Any;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};

use futures_util::FutureExt;

/// Payload recovered from a panic.
pub type Raised = Box<dyn Any + Send + 'static>;

/// Extension methods for [`Result`].
///
/// # Examples
/// ```
/// use hello_assistant::domain::result_ext::ResultExt;
///
/// let mut seen = None;
/// let result: Result<u8, &str> = Ok(2);
/// let doubled = result
///     .tap(|value| seen = Some(*value))
///     .fold(|value| value * 2, |_| 0);
/// assert_eq!(doubled, 4);
/// assert_eq!(seen, Some(2));
/// ```
pub trait ResultExt<T, E>: Sized {
    /// Run `f` on the success value and return the result unchanged.
    #[must_use]
    fn tap<F>(self, f: F) -> Self
    where
        F: FnOnce(&T);

    /// Run `f` on the error value and return the result unchanged.
    #[must_use]
    fn tap_err<F>(self, f: F) -> Self
    where
        F: FnOnce(&E);

    /// Dispatch exhaustively on the variant and return the branch output.
    fn fold<R, OnOk, OnErr>(self, ok: OnOk, err: OnErr) -> R
    where
        OnOk: FnOnce(T) -> R,
        OnErr: FnOnce(E) -> R;

    /// Return the success value or panic with the error value as payload.
    ///
    /// The payload is the `E` itself rather than a formatted message, so a
    /// surrounding [`try_catch`] can downcast it back.
    ///
    /// # Panics
    /// Panics with `E` when called on `Err`.
    fn unwrap_or_raise(self) -> T
    where
        E: Send + 'static;
}

impl<T, E> ResultExt<T, E> for Result<T, E> {
    fn tap<F>(self, f: F) -> Self
    where
        F: FnOnce(&T),
    {
        if let Ok(value) = &self {
            f(value);
        }
        self
    }

    fn tap_err<F>(self, f: F) -> Self
    where
        F: FnOnce(&E),
    {
        if let Err(error) = &self {
            f(error);
        }
        self
    }

    fn fold<R, OnOk, OnErr>(self, ok: OnOk, err: OnErr) -> R
    where
        OnOk: FnOnce(T) -> R,
        OnErr: FnOnce(E) -> R,
    {
        match self {
            Ok(value) => ok(value),
            Err(error) => err(error),
        }
    }

    fn unwrap_or_raise(self) -> T
    where
        E: Send + 'static,
    {
        match self {
            Ok(value) => value,
            Err(error) => panic::panic_any(error),
        }
    }
}

/// Run `f`, turning a panic into `Err` via `on_error`.
///
/// A normal return becomes `Ok`. The mapped error is always returned.
///
/// # Examples
/// ```
/// use hello_assistant::domain::result_ext::{try_catch, ResultExt};
///
/// let failing: Result<u8, String> = Err("boom".to_owned());
/// let caught = try_catch(
///     move || failing.unwrap_or_raise(),
///     |payload| payload.downcast::<String>().map(|s| *s).unwrap_or_default(),
/// );
/// assert_eq!(caught, Err("boom".to_owned()));
/// ```
pub fn try_catch<T, E, F, M>(f: F, on_error: M) -> Result<T, E>
where
    F: FnOnce() -> T,
    M: FnOnce(Raised) -> E,
{
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(on_error)
}

/// Async counterpart of [`try_catch`]: a panic while polling `fut` becomes
/// `Err` via `on_error`.
pub async fn try_catch_async<T, E, Fut, M>(fut: Fut, on_error: M) -> Result<T, E>
where
    Fut: Future<Output = T>,
    M: FnOnce(Raised) -> E,
{
    AssertUnwindSafe(fut).catch_unwind().await.map_err(on_error)
}

/// [`try_catch`] with the raised payload as the error, unmapped.
///
/// # Examples
/// ```
/// use hello_assistant::domain::result_ext::try_catch_raised;
///
/// let caught = try_catch_raised(|| -> u8 { std::panic::panic_any(7_u32) });
/// let payload = caught.expect_err("raised");
/// assert_eq!(payload.downcast_ref::<u32>(), Some(&7));
/// ```
pub fn try_catch_raised<T, F>(f: F) -> Result<T, Raised>
where
    F: FnOnce() -> T,
{
    try_catch(f, |raised| raised)
}

/// Async counterpart of [`try_catch_raised`].
pub async fn try_catch_raised_async<T, Fut>(fut: Fut) -> Result<T, Raised>
where
    Fut: Future<Output = T>,
{
    try_catch_async(fut, |raised| raised).await
}

/// Collect the success values in input order, or return the first error.
///
/// An empty input yields `Ok(vec![])`.
///
/// # Examples
/// ```
/// use hello_assistant::domain::result_ext::combine;
///
/// assert_eq!(combine(vec![Ok::<_, &str>(1), Ok(2)]), Ok(vec![1, 2]));
/// assert_eq!(combine(vec![Ok(1), Err("first"), Err("second")]), Err("first"));
/// ```
pub fn combine<T, E, I>(results: I) -> Result<Vec<T>, E>
where
    I: IntoIterator<Item = Result<T, E>>,
{
    results.into_iter().collect()
}
