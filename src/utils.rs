use anyhow::{bail, Error};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::ops::Deref;

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(try_from = "Vec<T>", into = "Vec<T>")]
pub struct NonEmptyVec<T: Clone>(Vec<T>);

impl<T: Clone> NonEmptyVec<T> {
    pub fn new(t: T) -> Self {
        Self(vec![t])
    }

    pub fn maybe_new(v: Vec<T>) -> Option<Self> {
        Self::try_from(v).ok()
    }

    pub fn push(&mut self, t: T) {
        self.0.push(t)
    }

    pub fn into_inner(self) -> Vec<T> {
        self.0
    }
}

impl<T: Clone> TryFrom<Vec<T>> for NonEmptyVec<T> {
    type Error = Error;

    fn try_from(v: Vec<T>) -> Result<NonEmptyVec<T>, Error> {
        if v.is_empty() {
            bail!("cannot create a NonEmptyVec from an empty Vec")
        }
        Ok(NonEmptyVec(v))
    }
}

impl<T: Clone> From<NonEmptyVec<T>> for Vec<T> {
    fn from(NonEmptyVec(v): NonEmptyVec<T>) -> Vec<T> {
        v
    }
}

impl<T: Clone> AsRef<[T]> for NonEmptyVec<T> {
    fn as_ref(&self) -> &[T] {
        &self.0
    }
}

impl<T: Clone> Deref for NonEmptyVec<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.0
    }
}

/// An ordered set holding at least one element.
///
/// Serialized as a JSON array in ascending order; duplicates in the input collapse.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(try_from = "Vec<T>", into = "Vec<T>")]
pub struct NonEmptySet<T: Ord + Clone>(BTreeSet<T>);

impl<T: Ord + Clone> NonEmptySet<T> {
    pub fn new(t: T) -> Self {
        Self(BTreeSet::from([t]))
    }

    pub fn maybe_new(v: impl IntoIterator<Item = T>) -> Option<Self> {
        let set: BTreeSet<T> = v.into_iter().collect();
        (!set.is_empty()).then_some(Self(set))
    }

    pub fn insert(&mut self, t: T) -> bool {
        self.0.insert(t)
    }

    pub fn into_inner(self) -> BTreeSet<T> {
        self.0
    }
}

impl<T: Ord + Clone> TryFrom<Vec<T>> for NonEmptySet<T> {
    type Error = Error;

    fn try_from(v: Vec<T>) -> Result<NonEmptySet<T>, Error> {
        match Self::maybe_new(v) {
            Some(set) => Ok(set),
            None => bail!("cannot create a NonEmptySet from an empty Vec"),
        }
    }
}

impl<T: Ord + Clone> From<NonEmptySet<T>> for Vec<T> {
    fn from(NonEmptySet(s): NonEmptySet<T>) -> Vec<T> {
        s.into_iter().collect()
    }
}

impl<T: Ord + Clone> Deref for NonEmptySet<T> {
    type Target = BTreeSet<T>;

    fn deref(&self) -> &BTreeSet<T> {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_vec_rejects_empty() {
        assert!(NonEmptyVec::<u8>::maybe_new(vec![]).is_none());
        assert!(serde_json::from_str::<NonEmptyVec<u8>>("[]").is_err());

        let v: NonEmptyVec<u8> = serde_json::from_str("[3, 1]").unwrap();
        assert_eq!(&*v, &[3, 1]);
    }

    #[test]
    fn non_empty_set_collapses_duplicates() {
        let s: NonEmptySet<String> = serde_json::from_str(r#"["b", "a", "b"]"#).unwrap();
        assert_eq!(s.len(), 2);
        assert_eq!(serde_json::to_string(&s).unwrap(), r#"["a","b"]"#);

        assert!(serde_json::from_str::<NonEmptySet<String>>("[]").is_err());
    }
}
