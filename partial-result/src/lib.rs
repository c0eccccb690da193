//! Results that can carry a best-effort value alongside an error.
//!
//! A plain `Result` forces a caller to choose between a value and an
//! error. When walking a document tree, that choice is too coarse: a
//! rewrite may fail on one field yet still produce a perfectly usable
//! tree for everything else. [`DataResult`] keeps both: an error message
//! and, when one exists, the partial value the failed step managed to
//! build. Downstream combinators decide whether to recover the partial
//! or to surface the failure.

mod either;

use std::fmt;

pub use either::Either;

/// Success, or an error with an optional best-effort value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataResult<A> {
    Success(A),
    Error(DataError<A>),
}

/// The error arm of a [`DataResult`]: a non-empty message and an
/// optional partial value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataError<A> {
    message: String,
    partial: Option<A>,
}

impl<A> DataError<A> {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), partial: None }
    }
    pub fn with_partial(message: impl Into<String>, partial: A) -> Self {
        Self { message: message.into(), partial: Some(partial) }
    }
    pub fn message(&self) -> &str {
        &self.message
    }
    pub fn partial(&self) -> Option<&A> {
        self.partial.as_ref()
    }
    pub fn into_partial(self) -> Option<A> {
        self.partial
    }
    pub fn map<B>(self, f: impl FnOnce(A) -> B) -> DataError<B> {
        DataError { message: self.message, partial: self.partial.map(f) }
    }
}

impl<A> fmt::Display for DataError<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}
impl<A: fmt::Debug> std::error::Error for DataError<A> {}

impl<A> DataResult<A> {
    pub fn success(value: A) -> Self {
        Self::Success(value)
    }
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(DataError::new(message))
    }
    pub fn error_partial(message: impl Into<String>, partial: A) -> Self {
        Self::Error(DataError::with_partial(message, partial))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
    /// The complete value, if any. Partial values do not count.
    pub fn result(&self) -> Option<&A> {
        match self {
            Self::Success(value) => Some(value),
            Self::Error(_) => None,
        }
    }
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::Error(err) => Some(err.message()),
        }
    }
    pub fn partial(&self) -> Option<&A> {
        match self {
            Self::Success(_) => None,
            Self::Error(err) => err.partial(),
        }
    }

    pub fn map<B>(self, f: impl FnOnce(A) -> B) -> DataResult<B> {
        match self {
            Self::Success(value) => DataResult::Success(f(value)),
            Self::Error(err) => DataResult::Error(err.map(f)),
        }
    }

    /// Chains a fallible step.
    ///
    /// An error that carries a partial value still runs `f` on it: the
    /// step's messages are joined with `"; "` and the innermost partial
    /// survives. An error without a partial is absorbing.
    pub fn flat_map<B>(self, f: impl FnOnce(A) -> DataResult<B>) -> DataResult<B> {
        match self {
            Self::Success(value) => f(value),
            Self::Error(DataError { message, partial: None }) => DataResult::error(message),
            Self::Error(DataError { message, partial: Some(partial) }) => match f(partial) {
                DataResult::Success(value) => DataResult::error_partial(message, value),
                DataResult::Error(inner) => DataResult::Error(DataError {
                    message: format!("{message}; {}", inner.message),
                    partial: inner.partial,
                }),
            },
        }
    }

    pub fn map_error(self, f: impl FnOnce(String) -> String) -> Self {
        match self {
            Self::Success(value) => Self::Success(value),
            Self::Error(DataError { message, partial }) => {
                Self::Error(DataError { message: f(message), partial })
            }
        }
    }

    /// Projects onto `Result`, keeping the partial inside the error.
    pub fn into_result(self) -> Result<A, DataError<A>> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Error(err) => Err(err),
        }
    }

    /// The value, recovering a partial one after reporting its message
    /// through `on_error`. Errors without a partial stay hard errors.
    pub fn result_or_partial(self, on_error: impl FnOnce(&str)) -> Result<A, DataError<A>> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Error(DataError { message, partial: Some(partial) }) => {
                on_error(&message);
                Ok(partial)
            }
            Self::Error(err) => Err(err),
        }
    }

    pub fn or_else(self, fallback: A) -> A {
        match self {
            Self::Success(value) => value,
            Self::Error(_) => fallback,
        }
    }
    pub fn or_else_get(self, fallback: impl FnOnce(&str) -> A) -> A {
        match self {
            Self::Success(value) => value,
            Self::Error(err) => fallback(&err.message),
        }
    }

    /// Combines two results. A combined partial is synthesized when
    /// both sides offer a value, complete or not, joining the error
    /// messages with `"; "`; when one side has nothing to offer, the
    /// first error propagates alone.
    pub fn apply2<B, C>(
        self,
        other: DataResult<B>,
        combine: impl FnOnce(A, B) -> C,
    ) -> DataResult<C> {
        use DataResult::{Error, Success};
        match (self, other) {
            (Success(a), Success(b)) => Success(combine(a, b)),
            (Success(a), Error(b_err)) => Error(b_err.map(|b| combine(a, b))),
            (Error(a_err), Success(b)) => Error(a_err.map(|a| combine(a, b))),
            (Error(a_err), Error(b_err)) => match (a_err.partial, b_err.partial) {
                (Some(a), Some(b)) => Error(DataError {
                    message: format!("{}; {}", a_err.message, b_err.message),
                    partial: Some(combine(a, b)),
                }),
                _ => Error(DataError::new(a_err.message)),
            },
        }
    }

    /// Upgrades an error-with-partial to a success, reporting the
    /// dropped message through `on_error`. Anything else is unchanged.
    pub fn promote_partial(self, on_error: impl FnOnce(&str)) -> Self {
        match self {
            Self::Error(DataError { message, partial: Some(partial) }) => {
                on_error(&message);
                Self::Success(partial)
            }
            other => other,
        }
    }

    /// Collapses onto [`Either`], dropping any partial value.
    pub fn to_either(self) -> Either<String, A> {
        match self {
            Self::Success(value) => Either::Right(value),
            Self::Error(err) => Either::Left(err.message),
        }
    }
}

impl<A> From<Result<A, String>> for DataResult<A> {
    fn from(result: Result<A, String>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(message) => Self::error(message),
        }
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    fn ok(n: i32) -> DataResult<i32> {
        DataResult::success(n)
    }

    #[test]
    fn map_identity_is_identity() {
        assert_eq!(ok(3).map(|x| x), ok(3));
        let err: DataResult<i32> = DataResult::error_partial("boom", 7);
        assert_eq!(err.clone().map(|x| x), err);
    }

    #[test]
    fn flat_map_success_is_identity() {
        assert_eq!(ok(3).flat_map(DataResult::success), ok(3));
    }

    #[test]
    fn flat_map_associates() {
        let f = |x: i32| ok(x + 1);
        let g = |x: i32| ok(x * 2);
        let left = ok(5).flat_map(f).flat_map(g);
        let right = ok(5).flat_map(|x| f(x).flat_map(g));
        assert_eq!(left, right);
    }

    #[test]
    fn bare_error_absorbs() {
        let err: DataResult<i32> = DataResult::error("boom");
        assert_eq!(err.clone().map(|x| x + 1), err);
        assert_eq!(err.clone().flat_map(|x| ok(x + 1)), err);
    }

    #[test]
    fn flat_map_runs_on_partial() {
        let err: DataResult<i32> = DataResult::error_partial("first", 10);
        assert_eq!(
            err.clone().flat_map(|x| ok(x + 1)),
            DataResult::error_partial("first", 11),
        );
        assert_eq!(
            err.flat_map(|x| DataResult::error_partial("second", x + 1)),
            DataResult::error_partial("first; second", 11),
        );
    }

    #[test]
    fn apply2_synthesizes_partials() {
        let a: DataResult<i32> = DataResult::error_partial("left", 1);
        let b: DataResult<i32> = DataResult::error_partial("right", 2);
        assert_eq!(
            a.apply2(b, |x, y| x + y),
            DataResult::error_partial("left; right", 3),
        );
        // No combined partial to build: the first error wins alone.
        let a: DataResult<i32> = DataResult::error("left");
        let b: DataResult<i32> = DataResult::error_partial("right", 2);
        assert_eq!(a.apply2(b, |x, y| x + y), DataResult::error("left"));
        assert_eq!(ok(1).apply2(ok(2), |x, y| x + y), ok(3));
    }

    #[test]
    fn promote_partial_reports_and_recovers() {
        let mut seen = None;
        let err: DataResult<i32> = DataResult::error_partial("almost", 9);
        assert_eq!(err.promote_partial(|msg| seen = Some(msg.to_owned())), ok(9));
        assert_eq!(seen.as_deref(), Some("almost"));

        let bare: DataResult<i32> = DataResult::error("gone");
        assert_eq!(bare.clone().promote_partial(|_| unreachable!("no partial")), bare);
    }

    #[test]
    fn result_or_partial_hard_fails_without_partial() {
        let bare: DataResult<i32> = DataResult::error("gone");
        assert!(bare.result_or_partial(|_| {}).is_err());
        let soft: DataResult<i32> = DataResult::error_partial("soft", 4);
        assert_eq!(soft.result_or_partial(|_| {}), Ok(4));
    }

    #[test]
    fn either_drops_partial() {
        let err: DataResult<i32> = DataResult::error_partial("oops", 1);
        assert_eq!(err.to_either(), Either::Left("oops".to_owned()));
        assert_eq!(ok(2).to_either(), Either::Right(2));
    }
}
