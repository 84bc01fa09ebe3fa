//! Structured, indexed failure carriers for the coordination combinators.
//!
//! Message texts here are contractual: callers match on them across
//! language ports, so [`LengthError`] reproduces the exact
//! pluralization-sensitive wording and [`CompositeError`] keeps the
//! canonical `"Too many promises rejected."` default.

use std::fmt;

/// Quota validation failure: the input sequence is too short to ever
/// satisfy the requested number of fulfillments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthError {
    required: usize,
    actual: usize,
}

const fn item_label(count: usize) -> &'static str {
    if count == 1 { "item" } else { "items" }
}

impl fmt::Display for LengthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Input array must contain at least {} {} but contains only {} {}.",
            self.required,
            item_label(self.required),
            self.actual,
            item_label(self.actual)
        )
    }
}

impl std::error::Error for LengthError {}

impl LengthError {
    /// Creates a length error for a quota of `required` over `actual`
    /// available items.
    #[must_use]
    pub const fn new(required: usize, actual: usize) -> Self {
        Self { required, actual }
    }

    /// The number of fulfillments the caller asked for.
    #[must_use]
    pub const fn required(&self) -> usize {
        self.required
    }

    /// The number of items actually supplied.
    #[must_use]
    pub const fn actual(&self) -> usize {
        self.actual
    }
}

/// An aggregate failure carrying every individual reason keyed by its
/// original input index.
///
/// Reasons are held in ascending index order, only for indices that
/// actually failed. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeError<E> {
    reasons: Vec<(usize, E)>,
    message: String,
}

impl<E> CompositeError<E> {
    /// Default message used when a quota becomes unreachable.
    pub const TOO_MANY_REJECTED: &'static str = "Too many promises rejected.";

    /// Creates a composite error; reasons are sorted into ascending
    /// index order.
    #[must_use]
    pub fn new(mut reasons: Vec<(usize, E)>, message: impl Into<String>) -> Self {
        reasons.sort_by_key(|(index, _)| *index);
        Self {
            reasons,
            message: message.into(),
        }
    }

    /// Creates a composite error with the canonical quota-unreachable
    /// message.
    #[must_use]
    pub fn too_many_rejected(reasons: Vec<(usize, E)>) -> Self {
        Self::new(reasons, Self::TOO_MANY_REJECTED)
    }

    /// The `(original index, reason)` pairs, ascending by index.
    #[must_use]
    pub fn reasons(&self) -> &[(usize, E)] {
        &self.reasons
    }

    /// Looks up the reason recorded for an original input index.
    #[must_use]
    pub fn reason_at(&self, index: usize) -> Option<&E> {
        self.reasons
            .binary_search_by_key(&index, |(i, _)| *i)
            .ok()
            .map(|slot| &self.reasons[slot].1)
    }

    /// Number of recorded failures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.reasons.len()
    }

    /// True when no failure was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reasons.is_empty()
    }

    /// The descriptive message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl<E> fmt::Display for CompositeError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl<E: fmt::Debug> std::error::Error for CompositeError<E> {}

/// Rejection type of quota-based combinators: either the quota was
/// invalid up front, or enough inputs failed that it became unreachable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuotaError<E> {
    /// The input sequence cannot possibly satisfy the quota.
    Length(LengthError),
    /// Enough inputs rejected that the quota became unreachable.
    Composite(CompositeError<E>),
}

impl<E> QuotaError<E> {
    /// Returns the length error, if that is what this is.
    #[must_use]
    pub const fn as_length(&self) -> Option<&LengthError> {
        match self {
            Self::Length(error) => Some(error),
            Self::Composite(_) => None,
        }
    }

    /// Returns the composite error, if that is what this is.
    #[must_use]
    pub const fn as_composite(&self) -> Option<&CompositeError<E>> {
        match self {
            Self::Composite(error) => Some(error),
            Self::Length(_) => None,
        }
    }
}

impl<E> From<LengthError> for QuotaError<E> {
    fn from(error: LengthError) -> Self {
        Self::Length(error)
    }
}

impl<E> From<CompositeError<E>> for QuotaError<E> {
    fn from(error: CompositeError<E>) -> Self {
        Self::Composite(error)
    }
}

impl<E> fmt::Display for QuotaError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Length(error) => error.fmt(f),
            Self::Composite(error) => error.fmt(f),
        }
    }
}

impl<E: fmt::Debug + 'static> std::error::Error for QuotaError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Length(error) => Some(error),
            Self::Composite(error) => Some(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_test(name: &str) {
        crate::test_utils::init_test_logging();
        crate::test_phase!(name);
    }

    #[test]
    fn length_error_pluralizes_each_count_independently() {
        init_test("length_error_pluralizes_each_count_independently");
        let cases = [
            (
                0,
                0,
                "Input array must contain at least 0 items but contains only 0 items.",
            ),
            (
                1,
                0,
                "Input array must contain at least 1 item but contains only 0 items.",
            ),
            (
                1,
                1,
                "Input array must contain at least 1 item but contains only 1 item.",
            ),
            (
                4,
                1,
                "Input array must contain at least 4 items but contains only 1 item.",
            ),
            (
                4,
                3,
                "Input array must contain at least 4 items but contains only 3 items.",
            ),
            (
                0,
                3,
                "Input array must contain at least 0 items but contains only 3 items.",
            ),
            (
                0,
                1,
                "Input array must contain at least 0 items but contains only 1 item.",
            ),
            (
                1,
                3,
                "Input array must contain at least 1 item but contains only 3 items.",
            ),
            (
                4,
                0,
                "Input array must contain at least 4 items but contains only 0 items.",
            ),
        ];
        for (required, actual, expected) in cases {
            let rendered = LengthError::new(required, actual).to_string();
            crate::assert_with_log!(rendered == expected, "message", expected, rendered);
        }
        crate::test_complete!("length_error_pluralizes_each_count_independently");
    }

    #[test]
    fn length_error_exposes_counts() {
        init_test("length_error_exposes_counts");
        let error = LengthError::new(4, 3);
        assert_eq!(error.required(), 4);
        assert_eq!(error.actual(), 3);
        crate::test_complete!("length_error_exposes_counts");
    }

    #[test]
    fn composite_error_sorts_reasons_by_index() {
        init_test("composite_error_sorts_reasons_by_index");
        let error = CompositeError::new(vec![(2, "c"), (0, "a"), (5, "f")], "several failed");
        assert_eq!(error.reasons(), &[(0, "a"), (2, "c"), (5, "f")]);
        assert_eq!(error.reason_at(2), Some(&"c"));
        assert_eq!(error.reason_at(1), None);
        assert_eq!(error.len(), 3);
        assert!(!error.is_empty());
        crate::test_complete!("composite_error_sorts_reasons_by_index");
    }

    #[test]
    fn composite_error_default_message_is_canonical() {
        init_test("composite_error_default_message_is_canonical");
        let error: CompositeError<&str> = CompositeError::too_many_rejected(vec![(1, "x")]);
        assert_eq!(error.to_string(), "Too many promises rejected.");
        assert_eq!(error.message(), CompositeError::<&str>::TOO_MANY_REJECTED);
        crate::test_complete!("composite_error_default_message_is_canonical");
    }

    #[test]
    fn quota_error_forwards_display_and_source() {
        init_test("quota_error_forwards_display_and_source");
        let length: QuotaError<&str> = LengthError::new(1, 0).into();
        assert_eq!(
            length.to_string(),
            "Input array must contain at least 1 item but contains only 0 items."
        );
        assert!(length.as_length().is_some());
        assert!(length.as_composite().is_none());

        let composite: QuotaError<&str> =
            CompositeError::too_many_rejected(vec![(0, "bad")]).into();
        assert_eq!(composite.to_string(), "Too many promises rejected.");
        assert!(composite.as_composite().is_some());

        let source = std::error::Error::source(&composite);
        assert!(source.is_some());
        crate::test_complete!("quota_error_forwards_display_and_source");
    }
}
