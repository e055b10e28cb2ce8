use super::{splay, OptNode, SplayMap};
use std::borrow::Borrow;
use std::cmp::Ordering::*;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// A sorted set of values.
///
/// The implementation is a thin wrapper around [`SplayMap<T, ()>`](SplayMap)
/// and inherits its properties: cloning is O(1) and shares nodes, updates
/// are amortized O(log n) and splay the touched value to the root, and
/// clones never observe each other's updates.
///
/// Inserting a value that compares equal to a stored one replaces the
/// stored value.  For value types whose ordering inspects only part of the
/// value, that makes the set usable as a keyed record store; see
/// [`replace`](#method.replace).
#[derive(Clone)]
pub struct SplaySet<T> {
    map: SplayMap<T, ()>,
}

impl<T> SplaySet<T> {
    /// Returns a new, empty set.
    pub fn new() -> Self {
        Self {
            map: SplayMap::new(),
        }
    }

    /// Removes all the entries from self.
    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Returns true if self is the empty set, false otherwise.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns the number of elements in self.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Tests whether self and other are clones sharing a common root node.
    ///
    /// A true result implies the sets hold equal elements; a false result
    /// implies nothing.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.map.ptr_eq(&other.map)
    }

    /// Tests if self contains the given value.
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.map.contains_key(value)
    }

    /// Returns a reference to the element matching value, if it exists.
    pub fn get<Q>(&self, value: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut curr = &self.map.root;
        while let Some(n) = curr {
            match value.cmp(n.key.borrow()) {
                Less => curr = &n.left,
                Equal => return Some(&n.key),
                Greater => curr = &n.right,
            }
        }

        None
    }

    /// Looks up the element matching value and splays it to the root of
    /// the tree, so an immediately following lookup of the same value
    /// costs O(1).
    ///
    /// # Examples
    /// ```
    /// use splay_collections::SplaySet;
    ///
    /// let mut s = SplaySet::from([3, 1, 4]);
    /// assert_eq!(s.get_memoized(&4), Some(&4));
    /// assert_eq!(s.get_memoized(&5), None);
    /// ```
    pub fn get_memoized<Q>(&mut self, value: &Q) -> Option<&T>
    where
        T: Borrow<Q> + Clone,
        Q: Ord + ?Sized,
    {
        splay(&mut self.map.root, value);
        match self.map.root.as_ref() {
            Some(rc) if value.cmp(rc.key.borrow()) == Equal => Some(&rc.key),
            _ => None,
        }
    }

    /// Returns the least value in the set.
    pub fn first(&self) -> Option<&T> {
        self.map.first_key_value().map(|(k, _)| k)
    }

    /// Returns the greatest value in self.
    pub fn last(&self) -> Option<&T> {
        self.map.last_key_value().map(|e| e.0)
    }

    /// Inserts the given value and returns true if self did not already
    /// have the value and returns false otherwise.
    ///
    /// An equal stored value is overwritten.
    ///
    /// # Examples
    /// ```
    /// use splay_collections::SplaySet;
    ///
    /// let mut s = SplaySet::new();
    /// assert!(s.insert(3));
    /// assert!(!s.insert(3));
    /// assert_eq!(s.len(), 1);
    /// ```
    pub fn insert(&mut self, value: T) -> bool
    where
        T: Clone + Ord,
    {
        self.replace(value).is_none()
    }

    /// Inserts the given value and returns the displaced equal value, if
    /// there was one.
    ///
    /// # Examples
    /// ```
    /// use splay_collections::SplaySet;
    ///
    /// let mut s = SplaySet::new();
    /// s.insert("abc".to_string());
    /// assert_eq!(s.replace("abc".to_string()), Some("abc".to_string()));
    /// ```
    pub fn replace(&mut self, value: T) -> Option<T>
    where
        T: Clone + Ord,
    {
        self.map.replace_entry(value, ()).map(|e| e.0)
    }

    /// Removes the given value from self returning true if the value was
    /// present and false otherwise.
    ///
    /// Like every splaying operation, a miss still reorganizes the tree
    /// around a near neighbor of the value.
    pub fn remove<Q>(&mut self, value: &Q) -> bool
    where
        T: Borrow<Q> + Clone + Ord,
        Q: Ord + ?Sized,
    {
        self.map.remove(value).is_some()
    }

    /// Removes and returns the set member that matches value.
    ///
    /// # Examples
    /// ```
    /// use splay_collections::SplaySet;
    ///
    /// let mut s = SplaySet::new();
    /// s.insert("abc".to_string());
    /// s.insert("def".to_string());
    /// assert_eq!(s.take("abc"), Some(String::from("abc")));
    /// assert_eq!(s.len(), 1);
    /// ```
    pub fn take<Q>(&mut self, value: &Q) -> Option<T>
    where
        T: Borrow<Q> + Clone + Ord,
        Q: Ord + ?Sized,
    {
        self.map.remove_entry(value).map(|e| e.0)
    }

    /// Returns a clone of self with the value inserted.
    ///
    /// Self is unchanged; the two sets share every node off the inserted
    /// value's search path.
    ///
    /// # Examples
    /// ```
    /// use splay_collections::SplaySet;
    ///
    /// let s = SplaySet::from([1, 2]);
    /// let s2 = s.with(3);
    /// assert!(!s.contains(&3));
    /// assert!(s2.contains(&3));
    /// ```
    pub fn with(&self, value: T) -> Self
    where
        T: Clone + Ord,
    {
        let mut res = self.clone();
        res.insert(value);
        res
    }

    /// Returns a clone of self with the value removed.
    pub fn without<Q>(&self, value: &Q) -> Self
    where
        T: Borrow<Q> + Clone + Ord,
        Q: Ord + ?Sized,
    {
        let mut res = self.clone();
        res.remove(value);
        res
    }

    /// Returns an iterator over self's values in sorted order.
    pub fn iter(&self) -> Iter<T> {
        Iter {
            iter: self.map.iter(),
        }
    }

    /// Applies f to each value in the set, in ascending order.
    pub fn for_each<F: FnMut(&T)>(&self, mut f: F) {
        self.map.for_each(|(k, _)| f(k));
    }

    /// Left-folds f over the values of the set in ascending order.
    ///
    /// # Examples
    /// ```
    /// use splay_collections::SplaySet;
    ///
    /// let s = SplaySet::from([1, 2, 3]);
    /// assert_eq!(s.fold(0, |acc, v| acc + v), 6);
    /// ```
    pub fn fold<B, F>(&self, init: B, mut f: F) -> B
    where
        F: FnMut(B, &T) -> B,
    {
        self.map.fold(init, |acc, (k, _)| f(acc, k))
    }

    /// Copies the values of the set into a Vec, in ascending order.
    ///
    /// # Examples
    /// ```
    /// use splay_collections::SplaySet;
    ///
    /// let s = SplaySet::from([2, 3, 1, 3]);
    /// assert_eq!(s.to_vec(), vec![1, 2, 3]);
    /// ```
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        let mut out = Vec::with_capacity(self.len());
        self.for_each(|v| out.push(v.clone()));
        out
    }
}

/// An iterator over the values of a set, in ascending order.
pub struct Iter<'a, T> {
    iter: super::Iter<'a, T, ()>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(|e| e.0)
    }
}

/// An owning iterator over the values of a set, in ascending order.
pub struct IntoIter<T> {
    iter: super::IntoIter<T, ()>,
}

impl<T: Clone> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(|e| e.0)
    }
}

// The textual dump: a node prints as `value:rc` if it is a leaf and as
// `(value:rc LEFT RIGHT)` otherwise; an absent child prints as `()`.
fn dump<T: Debug>(
    f: &mut Formatter<'_>,
    opt_node: &OptNode<T, ()>,
) -> std::fmt::Result {
    match opt_node.as_ref() {
        None => f.write_str("()"),

        Some(rc) => {
            if rc.left.is_none() && rc.right.is_none() {
                write!(f, "{:?}:{}", rc.key, Arc::strong_count(rc))
            } else {
                write!(f, "({:?}:{} ", rc.key, Arc::strong_count(rc))?;
                dump(f, &rc.left)?;
                f.write_str(" ")?;
                dump(f, &rc.right)?;
                f.write_str(")")
            }
        }
    }
}

impl<T: Debug> Debug for SplaySet<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        dump(f, &self.map.root)
    }
}

impl<T> Default for SplaySet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PartialEq> PartialEq for SplaySet<T> {
    fn eq(&self, other: &SplaySet<T>) -> bool {
        self.map.eq(&other.map)
    }
}

impl<T: Eq> Eq for SplaySet<T> {}

impl<T: PartialOrd> PartialOrd for SplaySet<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.map.partial_cmp(&other.map)
    }
}

impl<T: Ord> Ord for SplaySet<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.map.cmp(&other.map)
    }
}

impl<T: std::hash::Hash> std::hash::Hash for SplaySet<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.map.len.hash(state);
        for v in self.iter() {
            v.hash(state);
        }
    }
}

impl<'a, T: Clone + Ord> Extend<&'a T> for SplaySet<T> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        for x in iter {
            self.insert(x.clone());
        }
    }
}

impl<T: Clone + Ord> Extend<T> for SplaySet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for x in iter {
            self.insert(x);
        }
    }
}

impl<T: Clone + Ord, const N: usize> From<[T; N]> for SplaySet<T> {
    fn from(value: [T; N]) -> Self {
        Self::from_iter(value.into_iter())
    }
}

impl<T: Clone + Ord> FromIterator<T> for SplaySet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut s = SplaySet::new();
        s.extend(iter);
        s
    }
}

impl<'a, T> IntoIterator for &'a SplaySet<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Clone> IntoIterator for SplaySet<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            iter: self.map.into_iter(),
        }
    }
}

#[cfg(feature = "serde")]
mod splay_set_serde {
    use super::SplaySet;
    use serde::de::{Deserialize, SeqAccess, Visitor};
    use std::fmt;
    use std::marker::PhantomData;

    pub(super) struct SplaySetVisitor<T> {
        marker: PhantomData<fn() -> SplaySet<T>>,
    }

    impl<T> SplaySetVisitor<T> {
        pub fn new() -> Self {
            SplaySetVisitor {
                marker: PhantomData,
            }
        }
    }

    impl<'de, T> Visitor<'de> for SplaySetVisitor<T>
    where
        T: Clone + Deserialize<'de> + Ord,
    {
        type Value = SplaySet<T>;

        // Format a message stating what data this Visitor expects to receive.
        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("splay_collections::SplaySet")
        }

        fn visit_seq<M>(self, mut access: M) -> Result<Self::Value, M::Error>
        where
            M: SeqAccess<'de>,
        {
            let mut set = SplaySet::<T>::new();

            while let Some(elem) = access.next_element()? {
                set.insert(elem);
            }

            Ok(set)
        }
    }
}

#[cfg(feature = "serde")]
impl<T> serde::ser::Serialize for SplaySet<T>
where
    T: serde::ser::Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        use serde::ser::SerializeSeq;

        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for k in self {
            seq.serialize_element(k)?;
        }
        seq.end()
    }
}

#[cfg(feature = "serde")]
impl<'de, T> serde::de::Deserialize<'de> for SplaySet<T>
where
    T: Clone + serde::de::Deserialize<'de> + Ord,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::de::Deserializer<'de>,
    {
        deserializer.deserialize_seq(self::splay_set_serde::SplaySetVisitor::new())
    }
}

#[cfg(test)]
mod test {
    extern crate quickcheck;
    use super::*;
    use quickcheck::quickcheck;

    // this is a compile-time test
    fn _default_sets_for_no_default_entries() {
        struct Foo;
        let _ = SplaySet::<Foo>::default();
    }

    // orders and compares by key alone; the payload rides along
    #[derive(Clone, Debug)]
    struct Keyed {
        key: u8,
        tag: char,
    }

    impl PartialEq for Keyed {
        fn eq(&self, other: &Self) -> bool {
            self.key == other.key
        }
    }

    impl Eq for Keyed {}

    impl PartialOrd for Keyed {
        fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
            Some(self.cmp(other))
        }
    }

    impl Ord for Keyed {
        fn cmp(&self, other: &Self) -> std::cmp::Ordering {
            self.key.cmp(&other.key)
        }
    }

    fn digits() -> SplaySet<i32> {
        SplaySet::from([3, 1, 4, 1, 5, 9, 2, 6])
    }

    #[test]
    fn insert_then_to_vec() {
        let s = digits();
        assert_eq!(s.to_vec(), vec![1, 2, 3, 4, 5, 6, 9]);
        assert_eq!(s.len(), 7);
        assert_eq!(s.fold(0, |acc, _| acc + 1), 7);
    }

    #[test]
    fn memoized_lookup_shows_at_root() {
        let mut s = digits();
        assert_eq!(s.get_memoized(&9), Some(&9));

        // the accessed value is the new root of the dump
        assert!(format!("{:?}", s).starts_with("(9:"));
        assert!(s.contains(&9));
        assert_eq!(s.to_vec(), vec![1, 2, 3, 4, 5, 6, 9]);
    }

    #[test]
    fn remove_preserves_order() {
        let mut s = digits();
        assert!(s.remove(&4));
        assert_eq!(s.to_vec(), vec![1, 2, 3, 5, 6, 9]);

        assert!(!s.remove(&42));
        assert_eq!(s.to_vec(), vec![1, 2, 3, 5, 6, 9]);
    }

    #[test]
    fn remove_down_to_empty() {
        let mut s = SplaySet::from([1, 2]);
        assert!(s.remove(&1));
        assert_eq!(s.to_vec(), vec![2]);

        assert!(s.remove(&2));
        assert!(s.is_empty());

        assert!(!s.remove(&1));
        assert!(s.is_empty());
        assert_eq!(format!("{:?}", s), "()");
    }

    #[test]
    fn clones_diverge_without_interference() {
        let a = digits();
        let b = a.clone();
        assert!(a.ptr_eq(&b));

        let mut a = a;
        a.insert(7);
        assert!(!a.ptr_eq(&b));
        assert_eq!(b.to_vec(), vec![1, 2, 3, 4, 5, 6, 9]);
        assert_eq!(a.to_vec(), vec![1, 2, 3, 4, 5, 6, 7, 9]);
    }

    #[test]
    fn with_and_without_leave_self_alone() {
        let s = digits();
        let bigger = s.with(8);
        let smaller = s.without(&3);

        assert_eq!(s.to_vec(), vec![1, 2, 3, 4, 5, 6, 9]);
        assert_eq!(bigger.to_vec(), vec![1, 2, 3, 4, 5, 6, 8, 9]);
        assert_eq!(smaller.to_vec(), vec![1, 2, 4, 5, 6, 9]);
    }

    #[test]
    fn insert_overwrites_payload() {
        let mut s = SplaySet::new();
        assert!(s.insert(Keyed { key: 1, tag: 'a' }));
        assert!(!s.insert(Keyed { key: 1, tag: 'b' }));

        assert_eq!(s.len(), 1);
        assert_eq!(s.get(&Keyed { key: 1, tag: 'x' }).unwrap().tag, 'b');

        let old = s.replace(Keyed { key: 1, tag: 'c' }).unwrap();
        assert_eq!(old.tag, 'b');
        assert_eq!(s.get_memoized(&Keyed { key: 1, tag: 'x' }).unwrap().tag, 'c');
    }

    #[test]
    fn take_removes_stored_element() {
        let mut s = SplaySet::from(["abc".to_string(), "def".to_string()]);
        assert_eq!(s.take("abc"), Some("abc".to_string()));
        assert_eq!(s.take("abc"), None);
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn first_and_last() {
        let s = digits();
        assert_eq!(s.first(), Some(&1));
        assert_eq!(s.last(), Some(&9));

        let empty = SplaySet::<i32>::new();
        assert_eq!(empty.first(), None);
        assert_eq!(empty.last(), None);
    }

    #[test]
    fn dump_fmt_test() {
        let mut s = SplaySet::new();
        assert_eq!(format!("{:?}", s), "()");

        s.insert(1);
        assert_eq!(format!("{:?}", s), "1:1");

        s.insert(2);
        assert_eq!(format!("{:?}", s), "(2:1 1:1 ())");

        let c = s.clone();
        assert_eq!(format!("{:?}", c), "(2:2 1:1 ())");
        assert_eq!(format!("{:?}", s), "(2:2 1:1 ())");
    }

    quickcheck! {
        fn qc_set_ops(vs: Vec<(u8, bool)>) -> () {
            let mut s = SplaySet::new();
            let mut t = std::collections::BTreeSet::new();

            for &(x, add) in vs.iter() {
                if add {
                    assert_eq!(s.insert(x), t.insert(x));
                } else {
                    assert_eq!(s.remove(&x), t.remove(&x));
                }
                assert_eq!(s.len(), t.len());
            }

            assert!(s.iter().cmp(t.iter()).is_eq());

            for x in 0..=u8::MAX {
                assert_eq!(s.contains(&x), t.contains(&x));
                assert_eq!(s.contains(&x), s.get(&x).is_some());
            }
        }

        fn qc_to_vec_ascending(vs: Vec<u16>) -> () {
            let s: SplaySet<_> = vs.into_iter().collect();
            let v = s.to_vec();

            // strictly ascending, no duplicates
            assert!(v.windows(2).all(|w| w[0] < w[1]));
            assert!(v.iter().eq(s.iter()));
            assert_eq!(v.len(), s.len());
        }
    }

    // run with: `cargo test --features serde`
    #[cfg(feature = "serde")]
    mod serde_test {
        use crate::SplaySet;
        use serde_test::{assert_tokens, Token};

        #[test]
        fn test_serde() {
            let mut s = SplaySet::new();
            s.insert('a');
            s.insert('b');
            s.insert('c');

            assert_tokens(
                &s,
                &[
                    Token::Seq { len: Some(3) },
                    Token::Char('a'),
                    Token::Char('b'),
                    Token::Char('c'),
                    Token::SeqEnd,
                ],
            );
        }
    }
}
