//! Resolution of closed, string-named value sets.
//!
//! Package markup frequently carries unknown or legacy attribute values.
//! Types implementing [`NamedEnum`] expose three lookup modes over their
//! fixed name table, letting each call site decide how strict it must be:
//!
//! | Mode | Method | Unknown name |
//! |------|--------|--------------|
//! | Strict | [`NamedEnum::from_name`] | [`EpubError::UnknownEnumValue`] |
//! | Nullable | [`NamedEnum::from_name_opt`] | [`None`] |
//! | Defaulting | [`NamedEnum::from_name_or_default`] | [`NamedEnum::DEFAULT`] |

use crate::ebook::epub::errors::{EpubError, EpubResult};

/// A value set with a fixed table of names and a documented fallback value.
///
/// # Examples
/// - Resolving a page progression direction:
/// ```
/// # use bindery::ebook::named::NamedEnum;
/// # use bindery::epub::spine::Direction;
/// assert_eq!(Direction::Rtl, Direction::from_name("rtl").unwrap());
/// assert_eq!(None, Direction::from_name_opt("sideways"));
/// assert_eq!(Direction::Default, Direction::from_name_or_default("sideways"));
/// assert!(Direction::from_name("sideways").is_err());
/// ```
pub trait NamedEnum: Copy + PartialEq + Sized + 'static {
    /// Human-readable name of the value set, used in error messages.
    const KIND: &'static str;

    /// The value returned by [`Self::from_name_or_default`] for unmapped names.
    const DEFAULT: Self;

    /// Every `(name, value)` pair of the set.
    const ENTRIES: &'static [(&'static str, Self)];

    /// Returns the value mapped to `name`.
    ///
    /// # Errors
    /// [`EpubError::UnknownEnumValue`] when `name` is not part of the set.
    fn from_name(name: &str) -> EpubResult<Self> {
        Self::from_name_opt(name).ok_or_else(|| EpubError::UnknownEnumValue {
            kind: Self::KIND,
            name: name.to_owned(),
        })
    }

    /// Returns the value mapped to `name`, or [`None`] when unmapped.
    fn from_name_opt(name: &str) -> Option<Self> {
        Self::ENTRIES
            .iter()
            .find(|(entry, _)| *entry == name)
            .map(|(_, value)| *value)
    }

    /// Returns the value mapped to `name`, or [`Self::DEFAULT`] when unmapped.
    ///
    /// This never fails.
    fn from_name_or_default(name: &str) -> Self {
        Self::from_name_opt(name).unwrap_or(Self::DEFAULT)
    }

    /// Iterates over every name of the set, in table order.
    fn names() -> impl Iterator<Item = &'static str> {
        Self::ENTRIES.iter().map(|(name, _)| *name)
    }

    /// The name mapped to `self`.
    fn name(&self) -> &'static str {
        Self::ENTRIES
            .iter()
            .find(|(_, value)| value == self)
            .map_or("", |(name, _)| *name)
    }
}
