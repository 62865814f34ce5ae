//! Common utilities for the cafe client crates

pub mod masking {
    //! Minimal secret wrapper used for API tokens read from configuration.

    use serde::{Deserialize, Serialize};
    use std::fmt;

    #[derive(Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
    #[serde(transparent)]
    pub struct Secret<T>(T);

    impl<T> Secret<T> {
        pub fn new(value: T) -> Self {
            Self(value)
        }
    }

    impl<T> From<T> for Secret<T> {
        fn from(value: T) -> Self {
            Self(value)
        }
    }

    impl<T> fmt::Debug for Secret<T> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "*** {} ***", std::any::type_name::<T>())
        }
    }

    pub trait ExposeInterface<T> {
        fn expose(self) -> T;
    }

    impl<T> ExposeInterface<T> for Secret<T> {
        fn expose(self) -> T {
            self.0
        }
    }

    pub trait PeekInterface<T> {
        fn peek(&self) -> &T;
    }

    impl<T> PeekInterface<T> for Secret<T> {
        fn peek(&self) -> &T {
            &self.0
        }
    }

    /// A header value that may need hiding from logs
    #[derive(Clone, PartialEq, Eq, Hash)]
    pub enum Maskable<T> {
        Masked(Secret<T>),
        Normal(T),
    }

    impl<T: fmt::Debug> fmt::Debug for Maskable<T> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Self::Masked(secret) => fmt::Debug::fmt(secret, f),
                Self::Normal(value) => fmt::Debug::fmt(value, f),
            }
        }
    }

    impl From<String> for Maskable<String> {
        fn from(value: String) -> Self {
            Self::Normal(value)
        }
    }

    impl<T> Maskable<T> {
        pub fn into_inner(self) -> T {
            match self {
                Self::Masked(secret) => secret.expose(),
                Self::Normal(value) => value,
            }
        }
    }
}

pub use masking::{ExposeInterface, Maskable, PeekInterface, Secret};

pub mod consts;
pub mod crypto;
pub mod errors;
pub mod ext_traits;
pub mod fp_utils;
pub mod request;
pub mod types;

pub use errors::{CustomResult, ParsingError, ValidationError};
pub use request::{Method, Request, RequestBuilder, RequestContent};
pub use types::{MinorUnit, StringMajorUnit};

/// Date-time utilities.
pub mod date_time {
    use time::OffsetDateTime;

    /// Milliseconds since the unix epoch, in UTC
    pub fn now_unix_millis() -> i128 {
        OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000
    }
}
