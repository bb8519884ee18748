//! # Keys
//!
//! [`Key`] is the immutable string identity of an entity. Non-string values are
//! coerced to their string form through `From`, so `factory.construct(42, ..)` and
//! `factory.construct("42", ..)` address the same entity.

use std::borrow::{Borrow, Cow};
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// An immutable, cheaply clonable entity key.
///
/// Equality, ordering and hashing follow the string content, and `Key: Borrow<str>`
/// allows registry lookups by `&str`.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Key(Arc<str>);

impl Key {
    /// Builds a key from the [`Display`](fmt::Display) form of any value.
    ///
    /// Use this for types without a dedicated `From` conversion.
    #[must_use]
    pub fn display(value: impl fmt::Display) -> Self {
        Self(Arc::from(value.to_string()))
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for Key {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl PartialEq<str> for Key {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for Key {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

impl From<&Self> for Key {
    fn from(key: &Self) -> Self {
        key.clone()
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Self(Arc::from(value))
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Self(Arc::from(value))
    }
}

impl From<&String> for Key {
    fn from(value: &String) -> Self {
        Self(Arc::from(value.as_str()))
    }
}

impl From<Cow<'_, str>> for Key {
    fn from(value: Cow<'_, str>) -> Self {
        Self(Arc::from(value))
    }
}

impl From<Arc<str>> for Key {
    fn from(value: Arc<str>) -> Self {
        Self(value)
    }
}

macro_rules! key_from_display {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Key {
                fn from(value: $ty) -> Self {
                    Self::display(value)
                }
            }
        )*
    };
}

key_from_display!(
    char, bool, u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize
);

#[cfg(test)]
mod tests {
    use super::*;
    use fxhash::FxHashMap;

    #[test]
    fn test_non_string_keys_coerce_to_display_form() {
        assert_eq!(Key::from(42_u32), "42");
        assert_eq!(Key::from(-7_i64), "-7");
        assert_eq!(Key::from('x'), "x");
        assert_eq!(Key::from(true), "true");
        assert_eq!(Key::display(1.5_f64), "1.5");
    }

    #[test]
    fn test_coerced_and_string_keys_are_equal() {
        assert_eq!(Key::from(42_u8), Key::from("42"));
        assert_eq!(Key::from(String::from("a")), Key::from(Cow::Borrowed("a")));
    }

    #[test]
    fn test_lookup_by_str_through_borrow() {
        let mut map = FxHashMap::default();
        map.insert(Key::from("alpha"), 1);
        assert_eq!(map.get("alpha"), Some(&1));
        assert!(!map.contains_key("beta"));
    }

    #[test]
    fn test_clone_shares_storage() {
        let key = Key::from("shared");
        let copy = key.clone();
        assert!(std::ptr::eq(key.as_str(), copy.as_str()));
        assert_eq!(format!("{key:?}"), "\"shared\"");
    }
}
