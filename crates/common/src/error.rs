use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A storage kind name that is none of `durable`, `session`, `cookie`.
    #[error("unknown storage kind: {0}")]
    UnknownStorageKind(String),

    /// A layout name that is neither `blob` nor `per_field`.
    #[error("unknown storage layout: {0}")]
    UnknownLayout(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can carry a free-form message, so failures from other
/// crates can be wrapped with a description of what was being attempted.
pub trait FromMessage: Sized {
    fn from_message(message: String) -> Self;
}

/// Define a crate-local `Context` trait adding `.context()` and
/// `.with_context()` to any `Result` whose error is displayable.
///
/// Expects `Error: FromMessage` and a one-parameter `Result<T>` alias in the
/// invoking module:
///
/// ```ignore
/// // crates/storage/src/error.rs
/// formstash_common::impl_context!();
///
/// // elsewhere in the crate
/// File::open(&path).with_context(|| format!("failed to open {}", path.display()))?;
/// ```
#[macro_export]
macro_rules! impl_context {
    () => {
        pub trait Context<T> {
            /// Replace the error with `"{context}: {error}"`.
            fn context(self, context: &str) -> Result<T>;

            /// Like [`Context::context`], building the message only on error.
            fn with_context<F: FnOnce() -> String>(self, describe: F) -> Result<T>;
        }

        impl<T, E: std::fmt::Display> Context<T> for std::result::Result<T, E> {
            fn context(self, context: &str) -> Result<T> {
                self.with_context(|| context.to_owned())
            }

            fn with_context<F: FnOnce() -> String>(self, describe: F) -> Result<T> {
                self.map_err(|e| {
                    <Error as $crate::FromMessage>::from_message(format!("{}: {e}", describe()))
                })
            }
        }
    };
}
