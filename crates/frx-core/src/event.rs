#![forbid(unsafe_code)]

//! Events delivered to an observer.
//!
//! A subscription sees zero or more [`Event::Next`] values followed by at most
//! one terminal event ([`Event::Error`] or [`Event::Completed`]). The
//! terminal rule is enforced by the subscription, not by this type.

use std::fmt;

/// A single notification in an observable sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event<T, E> {
    /// A produced element.
    Next(T),
    /// The sequence failed. Terminal.
    Error(E),
    /// The sequence finished normally. Terminal.
    Completed,
}

impl<T, E> Event<T, E> {
    /// Whether this event ends the sequence.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Next(_))
    }

    #[must_use]
    pub fn is_next(&self) -> bool {
        matches!(self, Self::Next(_))
    }

    /// The element carried by a `Next` event.
    #[must_use]
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Next(value) => Some(value),
            _ => None,
        }
    }

    /// The error carried by an `Error` event.
    #[must_use]
    pub fn error(&self) -> Option<&E> {
        match self {
            Self::Error(err) => Some(err),
            _ => None,
        }
    }

    /// Collapse into a `Result`; `Completed` carries neither and maps to `None`.
    #[must_use]
    pub fn into_result(self) -> Option<Result<T, E>> {
        match self {
            Self::Next(value) => Some(Ok(value)),
            Self::Error(err) => Some(Err(err)),
            Self::Completed => None,
        }
    }

    /// Short stable name of the variant, used in trace fields.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Next(_) => "next",
            Self::Error(_) => "error",
            Self::Completed => "completed",
        }
    }
}

impl<T: fmt::Debug, E: fmt::Debug> fmt::Display for Event<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Next(value) => write!(f, "next({value:?})"),
            Self::Error(err) => write!(f, "error({err:?})"),
            Self::Completed => f.write_str("completed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type E = Event<i32, &'static str>;

    #[test]
    fn terminal_classification() {
        assert!(!E::Next(1).is_terminal());
        assert!(E::Error("boom").is_terminal());
        assert!(E::Completed.is_terminal());
        assert!(E::Next(1).is_next());
        assert!(!E::Completed.is_next());
    }

    #[test]
    fn accessors() {
        assert_eq!(E::Next(7).value(), Some(&7));
        assert_eq!(E::Completed.value(), None);
        assert_eq!(E::Error("boom").error(), Some(&"boom"));
        assert_eq!(E::Next(7).error(), None);
    }

    #[test]
    fn into_result_maps_terminal_completed_to_none() {
        assert_eq!(E::Next(3).into_result(), Some(Ok(3)));
        assert_eq!(E::Error("x").into_result(), Some(Err("x")));
        assert_eq!(E::Completed.into_result(), None);
    }

    #[test]
    fn display_notation() {
        assert_eq!(E::Next(1).to_string(), "next(1)");
        assert_eq!(E::Error("anError").to_string(), "error(\"anError\")");
        assert_eq!(E::Completed.to_string(), "completed");
        assert_eq!(E::Next(1).kind(), "next");
    }
}
