//! Generic error handling for glue code that only needs to report failures upwards.
//!
//! Typed, matchable errors (for example, serialization failures) live next to the code that produces them. This crate
//! covers the remaining cases: loading configuration, wiring a serializer together, and similar plumbing.

use std::fmt::Display;

/// A type-erased error.
pub type GenericError = anyhow::Error;

pub(crate) mod private {
    pub trait Sealed {}

    impl<T, E> Sealed for Result<T, E> {}
}

/// Adds context to a failed result, converting its error into a [`GenericError`].
// NOTE: `anyhow::Context` is wrapped so its extension methods don't collide with `snafu::ResultExt` in modules that
// import both.
pub trait ErrorContext<T, E>: private::Sealed {
    /// Wraps the error value with additional context.
    fn error_context<C>(self, context: C) -> Result<T, GenericError>
    where
        C: Display + Send + Sync + 'static;
}

impl<T, E> ErrorContext<T, E> for Result<T, E>
where
    Result<T, E>: anyhow::Context<T, E>,
{
    fn error_context<C>(self, context: C) -> Result<T, GenericError>
    where
        C: Display + Send + Sync + 'static,
    {
        <Self as anyhow::Context<T, E>>::context(self, context)
    }
}
