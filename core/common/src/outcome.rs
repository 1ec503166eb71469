//! Chainable success/failure results.
//!
//! `Outcome` carries the result of an operation that can fail for an
//! expected reason (bad input, failed validation, mismatched hash). Unlike
//! `std::result::Result`, both arms may carry extra context: a success can
//! have an informational message and a failure can keep a best-effort
//! partial value.
//!
//! Panics are never turned into failures; only domain errors travel here.

use std::future::Future;

use crate::error::{Error, Result};

/// Outcome of an operation that can fail for an expected reason.
///
/// A failure always has a non-empty message: every [`Error`] variant renders
/// with a descriptive prefix.
#[derive(Debug)]
#[must_use = "an Outcome may be a failure that should be handled"]
pub enum Outcome<T> {
    /// The operation succeeded.
    Ok {
        value: T,
        message: Option<String>,
    },
    /// The operation failed.
    Fail {
        error: Error,
        value: Option<T>,
    },
}

impl<T> Outcome<T> {
    /// Successful outcome without a message.
    pub fn ok(value: T) -> Self {
        Outcome::Ok {
            value,
            message: None,
        }
    }

    /// Successful outcome with an informational message.
    pub fn ok_with_message(value: T, message: impl Into<String>) -> Self {
        Outcome::Ok {
            value,
            message: Some(message.into()),
        }
    }

    /// Failed outcome without a value.
    pub fn fail(error: Error) -> Self {
        Outcome::Fail { error, value: None }
    }

    /// Failed outcome that keeps a partial or fallback value.
    pub fn fail_with_value(error: Error, value: T) -> Self {
        Outcome::Fail {
            error,
            value: Some(value),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Outcome::Ok { .. })
    }

    pub fn is_fail(&self) -> bool {
        !self.is_ok()
    }

    /// The success message, or the rendered error for a failure.
    pub fn message(&self) -> Option<String> {
        match self {
            Outcome::Ok { message, .. } => message.clone(),
            Outcome::Fail { error, .. } => Some(error.to_string()),
        }
    }

    /// The carried value, if any.
    pub fn value(&self) -> Option<&T> {
        match self {
            Outcome::Ok { value, .. } => Some(value),
            Outcome::Fail { value, .. } => value.as_ref(),
        }
    }

    pub fn has_value(&self) -> bool {
        self.value().is_some()
    }

    pub fn error(&self) -> Option<&Error> {
        match self {
            Outcome::Ok { .. } => None,
            Outcome::Fail { error, .. } => Some(error),
        }
    }

    /// Consume the outcome and return the carried value, if any.
    pub fn into_value(self) -> Option<T> {
        match self {
            Outcome::Ok { value, .. } => Some(value),
            Outcome::Fail { value, .. } => value,
        }
    }

    /// Convert into a plain `Result`, dropping messages and partial values.
    pub fn into_result(self) -> Result<T> {
        match self {
            Outcome::Ok { value, .. } => Ok(value),
            Outcome::Fail { error, .. } => Err(error),
        }
    }

    /// Run the next step only on success.
    ///
    /// A failure short-circuits: the error moves into the new outcome and
    /// `next` is never called.
    pub fn then<U, F>(self, next: F) -> Outcome<U>
    where
        F: FnOnce(T) -> Outcome<U>,
    {
        match self {
            Outcome::Ok { value, .. } => next(value),
            Outcome::Fail { error, .. } => Outcome::Fail { error, value: None },
        }
    }

    /// Transform the success value, keeping the message.
    pub fn map<U, F>(self, f: F) -> Outcome<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Outcome::Ok { value, message } => Outcome::Ok {
                value: f(value),
                message,
            },
            Outcome::Fail { error, .. } => Outcome::Fail { error, value: None },
        }
    }

    /// Always invoked with the current outcome; the handler decides the verdict.
    pub fn catch<U, F>(self, handler: F) -> Outcome<U>
    where
        F: FnOnce(Outcome<T>) -> Outcome<U>,
    {
        handler(self)
    }

    /// Invoked only on failure, with the error and any partial value.
    pub fn or_else<F>(self, recover: F) -> Outcome<T>
    where
        F: FnOnce(Error, Option<T>) -> Outcome<T>,
    {
        match self {
            Outcome::Fail { error, value } => recover(error, value),
            ok => ok,
        }
    }

    /// Always invoked for observation; the verdict is returned unchanged.
    pub fn finally<F>(self, observe: F) -> Outcome<T>
    where
        F: FnOnce(&Outcome<T>),
    {
        observe(&self);
        self
    }

    /// Always invoked; the callback may replace the outcome.
    pub fn finally_with<U, F>(self, f: F) -> Outcome<U>
    where
        F: FnOnce(Outcome<T>) -> Outcome<U>,
    {
        f(self)
    }
}

impl<T> From<Result<T>> for Outcome<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(value) => Outcome::ok(value),
            Err(error) => Outcome::fail(error),
        }
    }
}

/// Combinators over pending outcomes.
///
/// Each continuation starts only after the previous future has resolved.
pub trait OutcomeFutureExt<T>: Future<Output = Outcome<T>> + Sized {
    /// Async [`Outcome::then`].
    fn then_async<U, F, Fut>(self, next: F) -> impl Future<Output = Outcome<U>>
    where
        F: FnOnce(T) -> Fut,
        Fut: Future<Output = Outcome<U>>,
    {
        async move {
            match self.await {
                Outcome::Ok { value, .. } => next(value).await,
                Outcome::Fail { error, .. } => Outcome::Fail { error, value: None },
            }
        }
    }

    /// Async [`Outcome::catch`].
    fn catch_async<U, F, Fut>(self, handler: F) -> impl Future<Output = Outcome<U>>
    where
        F: FnOnce(Outcome<T>) -> Fut,
        Fut: Future<Output = Outcome<U>>,
    {
        async move { handler(self.await).await }
    }

    /// Async [`Outcome::finally`]: awaits the observer, then yields the
    /// original outcome.
    fn finally_async<F, Fut>(self, observe: F) -> impl Future<Output = Outcome<T>>
    where
        F: FnOnce(&Outcome<T>) -> Fut,
        Fut: Future<Output = ()>,
    {
        async move {
            let outcome = self.await;
            observe(&outcome).await;
            outcome
        }
    }
}

impl<T, F> OutcomeFutureExt<T> for F where F: Future<Output = Outcome<T>> {}
