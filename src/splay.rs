#![warn(missing_docs)]
use std::borrow::Borrow;
use std::cmp::Ordering::*;
use std::fmt::{Debug, Formatter};
use std::iter::FusedIterator;
use std::mem::replace;
use std::sync::Arc;

type OptNode<K, V> = Option<Arc<Node<K, V>>>;

#[cfg(test)]
macro_rules! chk_map {
    ( $x:expr ) => {{
        let m = $x;
        let chk_len = chk(&m.root, None).0;
        assert_eq!(chk_len, m.len);
        m
    }};
}

#[cfg(not(test))]
macro_rules! chk_map {
    ( $x:expr ) => {{
        $x
    }};
}

mod splay_set;
pub use splay_set::SplaySet;

struct Node<K, V> {
    key: K,
    val: V,
    left: OptNode<K, V>,
    right: OptNode<K, V>,
}

impl<K, V> Node<K, V> {
    fn new(key: K, val: V, left: OptNode<K, V>, right: OptNode<K, V>) -> Self {
        Node {
            key,
            val,
            left,
            right,
        }
    }

    fn for_each<F>(&self, g: &mut F)
    where
        F: FnMut((&K, &V)),
    {
        if let Some(rc) = self.left.as_ref() {
            rc.for_each(g);
        }

        g((&self.key, &self.val));

        if let Some(rc) = self.right.as_ref() {
            rc.for_each(g);
        }
    }

    fn for_each_mut<F>(&mut self, g: &mut F)
    where
        K: Clone,
        V: Clone,
        F: FnMut((&K, &mut V)),
    {
        if let Some(rc) = self.left.as_mut() {
            Arc::make_mut(rc).for_each_mut(g);
        }

        g((&self.key, &mut self.val));

        if let Some(rc) = self.right.as_mut() {
            Arc::make_mut(rc).for_each_mut(g);
        }
    }

    fn fold<B, F>(&self, g: &mut F, init: B) -> B
    where
        F: FnMut(B, (&K, &V)) -> B,
    {
        let mut acc = init;

        if let Some(rc) = self.left.as_ref() {
            acc = rc.fold(g, acc);
        }

        acc = g(acc, (&self.key, &self.val));

        if let Some(rc) = self.right.as_ref() {
            acc = rc.fold(g, acc);
        }

        acc
    }
}

impl<K: Ord, V> Node<K, V> {
    #[cfg(test)]
    fn chk(&self, greatest: Option<&K>) -> (usize, Option<&K>) {
        // is our node in order with left-side ancestors?
        assert!(greatest.iter().all(|&k| k < &self.key));

        // are our left descendents okay?
        let (lf_len, greatest) = chk(&self.left, greatest);

        // are our left descendents all less than us?
        assert!(greatest.iter().all(|&k| k < &self.key));

        // are our right descendents okay?
        let (rt_len, greatest) = chk(&self.right, Some(&self.key));

        (lf_len + rt_len + 1, greatest)
    }
}

impl<K: Clone, V: Clone> Clone for Node<K, V> {
    fn clone(&self) -> Self {
        // a one-level structural copy: the children are shared, not copied
        Node {
            key: self.key.clone(),
            val: self.val.clone(),
            left: self.left.clone(),
            right: self.right.clone(),
        }
    }
}

#[cfg(test)]
fn chk<'a, K: Ord, V>(
    opt_node: &'a OptNode<K, V>,
    greatest: Option<&'a K>,
) -> (usize, Option<&'a K>) {
    match opt_node.as_ref() {
        None => (0, greatest),
        Some(n) => n.chk(greatest),
    }
}

// Writes a node as `{key: val}:rc` if it is a leaf and as
// `({key: val}:rc LEFT RIGHT)` otherwise; an absent child prints as `()`.
fn dump_node<K: Debug, V: Debug>(
    f: &mut Formatter<'_>,
    opt_node: &OptNode<K, V>,
) -> std::fmt::Result {
    match opt_node.as_ref() {
        None => f.write_str("()"),

        Some(rc) => {
            let n = rc.as_ref();
            if n.left.is_none() && n.right.is_none() {
                write!(f, "{{{:?}: {:?}}}:{}", n.key, n.val, Arc::strong_count(rc))
            } else {
                write!(f, "({{{:?}: {:?}}}:{} ", n.key, n.val, Arc::strong_count(rc))?;
                dump_node(f, &n.left)?;
                f.write_str(" ")?;
                dump_node(f, &n.right)?;
                f.write_str(")")
            }
        }
    }
}

// prerequisites:
//   - opt_node.is_some()
//   - the node is uniquely owned (splaying clones the entire search path,
//     so a freshly splayed root always qualifies)
fn take_node<K: Clone, V: Clone>(opt_node: &mut OptNode<K, V>) -> Node<K, V> {
    let old_rc = opt_node.take().unwrap();
    match Arc::try_unwrap(old_rc) {
        Ok(n) => n,
        Err(_) => panic!("Attempt to take a shared node"),
    }
}

fn rot_rt<K: Clone, V: Clone>(root: &mut OptNode<K, V>) {
    // We want the following transformation:
    //    a(b(x, y), z)   =>   b(x, a(y, z))
    // x and z retain the same parents.  The subtree references are moved,
    // never duplicated, so no child refcount changes.

    let mut a_opt = root.take();
    let a_rc = a_opt.as_mut().unwrap();
    let a = Arc::make_mut(a_rc);

    let mut b_opt = a.left.take();
    let b_rc = b_opt.as_mut().unwrap();
    let b = Arc::make_mut(b_rc);

    // move y from b to a
    a.left = b.right.take();

    // move a into b
    b.right = a_opt;

    // install b as the new root
    *root = b_opt;
}

fn rot_lf<K: Clone, V: Clone>(root: &mut OptNode<K, V>) {
    // We want the following transformation:
    //    a(x, b(y, z))   =>   b(a(x, y), z)
    // x and z retain the same parents.

    let mut a_opt = root.take();
    let a_rc = a_opt.as_mut().unwrap();
    let a = Arc::make_mut(a_rc);

    let mut b_opt = a.right.take();
    let b_rc = b_opt.as_mut().unwrap();
    let b = Arc::make_mut(b_rc);

    a.right = b.left.take();
    b.left = a_opt;
    *root = b_opt;
}

// Promotes the entry for key to the root of the subtree.  If the key is
// absent, the last node on the search path is promoted instead, which keeps
// the amortized bound for misses.
//
// Every node inspected passes through Arc::make_mut before any relink, so
// the whole search path is uniquely owned by the time it is rewritten; the
// rotations never clone and never disturb trees that share nodes with this
// one.
fn splay<K, V, Q>(root: &mut OptNode<K, V>, key: &Q)
where
    K: Borrow<Q> + Clone,
    V: Clone,
    Q: Ord + ?Sized,
{
    let Some(rc) = root.as_mut() else { return };
    let n = Arc::make_mut(rc);

    match key.cmp(n.key.borrow()) {
        Equal => (),

        Less => {
            let Some(lf_rc) = n.left.as_mut() else { return };
            let lf = Arc::make_mut(lf_rc);

            match key.cmp(lf.key.borrow()) {
                Less => {
                    // zig-zig:
                    // (g (p (n A B) C) D) ==> (n A (p B (g C D)))
                    // rotate the grandparent edge here; the rotation after
                    // the match finishes the promotion
                    splay(&mut lf.left, key);
                    rot_rt(root);
                }

                Greater => {
                    // zig-zag:
                    // (g (p A (n B C)) D) ==> (n (p A B) (g C D))
                    splay(&mut lf.right, key);
                    if lf.right.is_some() {
                        rot_lf(&mut n.left);
                    }
                }

                // zig: (p (n A B) C) ==> (n A (p B C))
                Equal => (),
            }

            if root.as_ref().unwrap().left.is_some() {
                rot_rt(root);
            }
        }

        Greater => {
            let Some(rt_rc) = n.right.as_mut() else { return };
            let rt = Arc::make_mut(rt_rc);

            match key.cmp(rt.key.borrow()) {
                Greater => {
                    // zig-zig:
                    // (g A (p B (n C D))) ==> (n (p (g A B) C) D)
                    splay(&mut rt.right, key);
                    rot_lf(root);
                }

                Less => {
                    // zig-zag:
                    // (g A (p (n B C) D)) ==> (n (g A B) (p C D))
                    splay(&mut rt.left, key);
                    if rt.left.is_some() {
                        rot_rt(&mut n.right);
                    }
                }

                // zig: (p A (n B C)) ==> (n (p A B) C)
                Equal => (),
            }

            if root.as_ref().unwrap().right.is_some() {
                rot_lf(root);
            }
        }
    }
}

// Promotes the greatest entry to the root.  The search path is the right
// spine, so every step is the right-handed zig-zig or the final zig.
fn splay_max<K: Clone, V: Clone>(root: &mut OptNode<K, V>) {
    let Some(rc) = root.as_mut() else { return };
    let n = Arc::make_mut(rc);

    let Some(rt_rc) = n.right.as_mut() else { return };
    let rt = Arc::make_mut(rt_rc);

    if rt.right.is_some() {
        splay_max(&mut rt.right);
        rot_lf(root);
    }

    rot_lf(root);
}

// Binary-search descent that places (key, val), cloning shared nodes along
// the way.  An equal key is overwritten: both the stored key and the stored
// value are replaced and returned, so an overwrite is observable even when
// the ordering inspects only part of the key.  The caller is expected to
// splay the key afterwards.
fn ins<K, V>(root: &mut OptNode<K, V>, key: K, val: V) -> Option<(K, V)>
where
    K: Clone + Ord,
    V: Clone,
{
    let n = match root.as_mut() {
        None => {
            *root = Some(Arc::new(Node::new(key, val, None, None)));
            return None; // *** EARLY RETURN ***
        }

        Some(rc) => Arc::make_mut(rc),
    };

    match key.cmp(&n.key) {
        Equal => {
            let old_key = replace(&mut n.key, key);
            let old_val = replace(&mut n.val, val);
            Some((old_key, old_val))
        }

        Less => ins(&mut n.left, key, val),
        Greater => ins(&mut n.right, key, val),
    }
}

/// A map from keys to values sorted by key.
///
/// Internally, the map uses 'persistent' [splay
/// trees](https://en.wikipedia.org/wiki/Splay_tree).  The trees are
/// persistent in that maps cloned from a common ancestor share nodes until
/// they are updated.  When a map is updated, nodes it shares with other
/// maps are cloned as the update reaches them; the maps the nodes are
/// shared with never observe the change.  Cloning a map is O(1).
///
/// Splay trees rebalance by use: every update splays the touched key to
/// the root of the tree, and [`get_memoized`](#method.get_memoized) does
/// the same for lookups, so a key is O(1) to find again right after it was
/// accessed.  All operations are amortized O(log n).  The tree keeps no
/// per-node bookkeeping, which makes nodes small and the clones performed
/// for structural sharing cheap.
///
/// The node refcounts are atomic, so maps sharing nodes may live on
/// different threads.
#[derive(Clone)]
pub struct SplayMap<K, V> {
    len: usize,
    root: OptNode<K, V>,
}

impl<K, V> SplayMap<K, V> {
    /// Creates a new, empty map.
    ///
    /// # Examples
    /// ```
    /// use splay_collections::SplayMap;
    /// let m: SplayMap<usize, usize> = SplayMap::new();
    /// assert!(m.is_empty());
    /// ```
    pub fn new() -> Self {
        SplayMap { len: 0, root: None }
    }

    /// Drops all entries from the map.
    pub fn clear(&mut self) {
        self.len = 0;
        self.root = None;
    }

    /// Returns true if the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the number of entries in self.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Tests whether self and other are clones sharing a common root node.
    ///
    /// A true result implies the maps hold equal entries; a false result
    /// implies nothing, since equal maps may be built separately.
    ///
    /// # Examples
    /// ```
    /// use splay_collections::SplayMap;
    ///
    /// let m = SplayMap::from([(0, 'x')]);
    /// let c = m.clone();
    /// assert!(m.ptr_eq(&c));
    /// assert!(!m.ptr_eq(&SplayMap::from([(0, 'x')])));
    /// ```
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.root, &other.root) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }

    /// Returns a reference to the value mapped by the given key, or `None`
    /// if the key is not in the map.
    ///
    /// The lookup is read-only: it does not reorganize the tree and never
    /// clones a node.  Use [`get_memoized`](#method.get_memoized) when the
    /// key will be looked up again soon.
    ///
    /// # Examples
    /// ```
    /// use splay_collections::SplayMap;
    ///
    /// let m = SplayMap::from([(1, 'a')]);
    /// assert_eq!(m.get(&1), Some(&'a'));
    /// assert_eq!(m.get(&2), None);
    /// ```
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get_key_value(key).map(|e| e.1)
    }

    /// Returns the stored entry for the given key, or `None` if the key is
    /// not in the map.
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut curr = &self.root;
        while let Some(n) = curr {
            match key.cmp(n.key.borrow()) {
                Less => curr = &n.left,
                Equal => return Some((&n.key, &n.val)),
                Greater => curr = &n.right,
            }
        }

        None
    }

    /// Tests if the map has an entry for the given key.
    ///
    /// # Examples
    /// ```
    /// use splay_collections::SplayMap;
    ///
    /// let m = SplayMap::from([(1, 'a')]);
    /// assert!(m.contains_key(&1));
    /// assert!(!m.contains_key(&2));
    /// ```
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get_key_value(key).is_some()
    }

    /// Returns the entry with the least key.
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        let mut curr = self.root.as_ref()?;
        while let Some(n) = curr.left.as_ref() {
            curr = n;
        }

        Some((&curr.key, &curr.val))
    }

    /// Returns the entry with the greatest key.
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        let mut curr = self.root.as_ref()?;
        while let Some(n) = curr.right.as_ref() {
            curr = n;
        }

        Some((&curr.key, &curr.val))
    }

    /// Creates an iterator over the map entries, sorted by key.
    ///
    /// Because tree nodes may be shared between maps, the children cannot
    /// have ancestor links; the iterator tracks its progress with a Vec.
    /// [`for_each`](#method.for_each) visits entries with less overhead.
    ///
    /// # Examples
    /// ```
    /// use splay_collections::SplayMap;
    ///
    /// let m = SplayMap::from([(0, 1), (1, 2), (2, 3)]);
    /// for (i, (k, v)) in m.iter().enumerate() {
    ///     assert_eq!(&i, k);
    ///     assert_eq!(&(i + 1), v);
    /// }
    /// ```
    pub fn iter(&self) -> Iter<K, V> {
        let mut work = Vec::new();
        let mut curr = self.root.as_ref();
        while let Some(n) = curr {
            work.push(n);
            curr = n.left.as_ref();
        }

        Iter {
            work,
            len: self.len,
        }
    }

    /// Produces an iterator over the keys of the map, in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|p| p.0)
    }

    /// Produces an iterator over the values of the map, ordered by their
    /// associated keys.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|p| p.1)
    }

    /// Applies f to each entry of the map in order of the keys.
    ///
    /// # Examples
    /// ```
    /// use splay_collections::SplayMap;
    ///
    /// let m = SplayMap::from([(0, -10), (1, 0), (2, 12)]);
    /// let mut cnt_keys_gt_vals = 0;
    /// m.for_each(|(k, v)| if k > v { cnt_keys_gt_vals += 1 });
    /// assert_eq!(cnt_keys_gt_vals, 2);
    /// ```
    pub fn for_each<F: FnMut((&K, &V))>(&self, mut f: F) {
        if let Some(rc) = self.root.as_ref() {
            rc.for_each(&mut f);
        }
    }

    /// Left-folds f over the entries of the map in order of the keys.
    ///
    /// # Examples
    /// ```
    /// use splay_collections::SplayMap;
    ///
    /// let m = SplayMap::from([(1, 10), (2, 20)]);
    /// let sum = m.fold(0, |acc, (_, v)| acc + v);
    /// assert_eq!(sum, 30);
    /// ```
    pub fn fold<B, F>(&self, init: B, mut f: F) -> B
    where
        F: FnMut(B, (&K, &V)) -> B,
    {
        match self.root.as_ref() {
            Some(rc) => rc.fold(&mut f, init),
            None => init,
        }
    }
}

impl<K: Clone + Ord, V: Clone> SplayMap<K, V> {
    /// Inserts a key-value pair in the map and splays the entry to the
    /// root.
    ///
    /// If the key was already present, the stored key is replaced along
    /// with the value; the difference is observable for key types whose
    /// ordering inspects only part of the key.
    ///
    /// # Examples
    /// ```
    /// use splay_collections::SplayMap;
    ///
    /// let mut m = SplayMap::new();
    /// assert_eq!(m.insert(0, "a"), None);
    /// assert_eq!(m.insert(0, "b"), Some("a"));
    /// assert_eq!(m.get(&0), Some(&"b"));
    /// ```
    pub fn insert(&mut self, key: K, val: V) -> Option<V> {
        self.replace_entry(key, val).map(|e| e.1)
    }

    // insert, but returns the complete displaced entry.  SplaySet builds
    // its replace operation on the displaced key.
    fn replace_entry(&mut self, key: K, val: V) -> Option<(K, V)> {
        let probe = key.clone();
        let old = ins(&mut self.root, key, val);
        self.len += old.is_none() as usize;

        // the key is present now, so this promotes exactly the entry we
        // just placed or overwrote
        splay(&mut self.root, &probe);
        chk_map!(&self);
        old
    }

    /// Looks up the given key and splays it to the root of the tree.
    ///
    /// The map answers from the root afterwards, so a [`get`](#method.get)
    /// of the same key right after costs O(1).  The reorganization clones
    /// whatever part of the search path is shared with other maps, exactly
    /// as an update would.
    ///
    /// # Examples
    /// ```
    /// use splay_collections::SplayMap;
    ///
    /// let mut m = SplayMap::from([(1, 'a'), (2, 'b')]);
    /// assert_eq!(m.get_memoized(&2), Some(&'b'));
    /// assert_eq!(m.get_memoized(&9), None);
    /// ```
    pub fn get_memoized<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        splay(&mut self.root, key);
        match self.root.as_ref() {
            Some(rc) if key.cmp(rc.key.borrow()) == Equal => Some(&rc.val),
            _ => None,
        }
    }

    /// Returns a mutable reference to the value mapped by the given key.
    ///
    /// The entry is splayed to the root; the reference hands out the
    /// root's value slot, cloned away from any sharing maps first.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        splay(&mut self.root, key);
        match self.root.as_mut() {
            Some(rc) if key.cmp(rc.key.borrow()) == Equal => {
                Some(&mut Arc::make_mut(rc).val)
            }
            _ => None,
        }
    }

    /// Removes a key from the map and returns the unmapped value.
    ///
    /// # Examples
    /// ```
    /// use splay_collections::SplayMap;
    ///
    /// let mut m = SplayMap::new();
    /// m.insert(1, 2);
    /// m.insert(2, 3);
    /// assert_eq!(m.remove(&2), Some(3));
    /// assert_eq!(m.remove(&2), None);
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.remove_entry(key).map(|e| e.1)
    }

    /// Removes a key from the map and returns the stored entry.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        splay(&mut self.root, key);
        match self.root.as_ref() {
            Some(rc) if key.cmp(rc.key.borrow()) == Equal => (),
            _ => return None, // *** EARLY RETURN ***
        }

        // the splay left the doomed entry at the (uniquely owned) root;
        // detach its subtrees and join them
        let n = take_node(&mut self.root);
        let mut left = n.left;
        let right = n.right;

        if left.is_none() {
            self.root = right;
        } else if right.is_none() {
            self.root = left;
        } else {
            // every key on the left is less than every key on the right,
            // so once the left tree's maximum is its root, its right slot
            // is free to adopt the right tree
            splay_max(&mut left);
            let lf = Arc::make_mut(left.as_mut().unwrap());
            debug_assert!(lf.right.is_none());
            lf.right = right;
            self.root = left;
        }

        self.len -= 1;
        chk_map!(&self);
        Some((n.key, n.val))
    }

    /// Returns a clone of self with the key-value pair inserted.
    ///
    /// Self is unchanged; the two maps share every node off the inserted
    /// key's search path.
    ///
    /// # Examples
    /// ```
    /// use splay_collections::SplayMap;
    ///
    /// let m = SplayMap::from([(1, 'a')]);
    /// let m2 = m.with(2, 'b');
    /// assert!(!m.contains_key(&2));
    /// assert_eq!(m2.get(&2), Some(&'b'));
    /// ```
    pub fn with(&self, key: K, val: V) -> Self {
        let mut res = self.clone();
        res.insert(key, val);
        res
    }

    /// Returns a clone of self with the entry for the key removed.
    pub fn without<Q>(&self, key: &Q) -> Self
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut res = self.clone();
        res.remove(key);
        res
    }

    /// Applies a function to every key-value pair in the map, passing the
    /// value mutably.
    ///
    /// Any shared nodes in the tree are cloned, regardless of whether the
    /// contained values are mutated.
    pub fn for_each_mut<F: FnMut((&K, &mut V))>(&mut self, mut f: F) {
        if let Some(rc) = self.root.as_mut() {
            Arc::make_mut(rc).for_each_mut(&mut f);
        }
    }

    /// Gets the given key's corresponding entry in the map for in-place
    /// manipulation.
    ///
    /// # Examples
    /// ```
    /// use splay_collections::SplayMap;
    ///
    /// let mut m = SplayMap::from([(0, 0)]);
    /// m.entry(0).and_modify(|v| *v = 7);
    /// assert_eq!(m.entry(3).or_insert(3), &3);
    /// assert_eq!(m.get(&0), Some(&7));
    /// ```
    pub fn entry(&mut self, key: K) -> Entry<'_, K, V> {
        splay(&mut self.root, &key);
        let occupied =
            matches!(&self.root, Some(rc) if rc.key.cmp(&key) == Equal);

        if occupied {
            let rc = self.root.as_mut().unwrap();
            let val = &mut Arc::make_mut(rc).val;
            Entry::Occupied(OccupiedEntry { key, val })
        } else {
            Entry::Vacant(VacantEntry { key, map: self })
        }
    }

    #[cfg(test)]
    fn chk(&self) {
        assert_eq!(self.len, chk(&self.root, None).0);
    }
}

impl<K: Debug, V: Debug> Debug for SplayMap<K, V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.root {
            None => f.write_str("SplayMap(EMPTY)"),
            Some(_) => {
                f.write_fmt(format_args!("SplayMap(#{}, ", self.len))?;
                dump_node(f, &self.root)?;
                f.write_str(")")
            }
        }
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for SplayMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self.iter().zip(other.iter()).all(|(x, y)| x == y)
    }
}

impl<K: Eq, V: Eq> Eq for SplayMap<K, V> {}

impl<K: PartialOrd, V: PartialOrd> PartialOrd for SplayMap<K, V> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<K: Ord, V: Ord> Ord for SplayMap<K, V> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<K: std::hash::Hash, V: std::hash::Hash> std::hash::Hash for SplayMap<K, V> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.for_each(|(k, v)| {
            k.hash(state);
            v.hash(state);
        });
    }
}

impl<K, Q, V> std::ops::Index<&Q> for SplayMap<K, V>
where
    K: Borrow<Q>,
    Q: Ord + ?Sized,
{
    type Output = V;

    fn index(&self, index: &Q) -> &Self::Output {
        match self.get(index) {
            Some(v) => v,
            None => panic!("Key not found in SplayMap"),
        }
    }
}

impl<K, V> Default for SplayMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

/// An iterator over the entries of a map, sorted by key.
pub struct Iter<'a, K, V> {
    work: Vec<&'a Arc<Node<K, V>>>,
    len: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.work.pop().map(|n| {
            self.len -= 1;
            let entry = (&n.key, &n.val);
            let mut curr = n.right.as_ref();
            while let Some(m) = curr {
                self.work.push(m);
                curr = m.left.as_ref();
            }
            entry
        })
    }
}

impl<'a, K, V> ExactSizeIterator for Iter<'a, K, V> {
    fn len(&self) -> usize {
        self.len
    }
}

impl<'a, K, V> FusedIterator for Iter<'a, K, V> {}

/// An owning iterator over the entries of a map, sorted by key.
///
/// Uniquely owned nodes are dismantled and their entries moved out; nodes
/// shared with other maps are left in place and their entries cloned.
pub struct IntoIter<K, V> {
    work: Vec<Node<K, V>>,
    len: usize,
}

impl<K: Clone, V: Clone> IntoIter<K, V> {
    fn push_left_spine(&mut self, mut opt_node: OptNode<K, V>) {
        while let Some(rc) = opt_node {
            let mut n = match Arc::try_unwrap(rc) {
                Ok(n) => n,
                Err(rc) => (*rc).clone(),
            };
            opt_node = n.left.take();
            self.work.push(n);
        }
    }
}

impl<K: Clone, V: Clone> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        let mut n = self.work.pop()?;
        self.len -= 1;
        let rt = n.right.take();
        self.push_left_spine(rt);
        Some((n.key, n.val))
    }
}

impl<K: Clone, V: Clone> ExactSizeIterator for IntoIter<K, V> {
    fn len(&self) -> usize {
        self.len
    }
}

impl<K: Clone, V: Clone> FusedIterator for IntoIter<K, V> {}

impl<K: Clone, V: Clone> IntoIterator for SplayMap<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(mut self) -> IntoIter<K, V> {
        let mut iter = IntoIter {
            work: Vec::new(),
            len: self.len,
        };
        iter.push_left_spine(self.root.take());
        iter
    }
}

impl<'a, K, V> IntoIterator for &'a SplayMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

/// A view of an occupied entry in a [`SplayMap`], created by
/// [`SplayMap::entry`].
pub struct OccupiedEntry<'a, K, V> {
    key: K,
    val: &'a mut V,
}

impl<'a, K, V> OccupiedEntry<'a, K, V> {
    /// Gets a reference to the value in the entry.
    pub fn get(&self) -> &V {
        self.val
    }

    /// Gets a mutable reference to the value in the entry.
    pub fn get_mut(&mut self) -> &mut V {
        self.val
    }

    /// Sets the value of the entry and returns the old value.
    pub fn insert(&mut self, new_val: V) -> V {
        std::mem::replace(self.val, new_val)
    }

    /// Converts the entry into a mutable reference to its value.
    pub fn into_mut(self) -> &'a mut V {
        self.val
    }

    /// Gets a reference to the key of the entry.
    pub fn key(&self) -> &K {
        &self.key
    }
}

/// A view of a vacant entry in a [`SplayMap`], created by
/// [`SplayMap::entry`].
pub struct VacantEntry<'a, K, V> {
    key: K,
    map: &'a mut SplayMap<K, V>,
}

impl<'a, K: Clone + Ord, V: Clone> VacantEntry<'a, K, V> {
    /// Inserts the value into the map under the entry's key.
    pub fn insert(self, val: V) -> &'a mut V {
        // the insert splays the key to the root, so get_mut finds it there
        self.map.insert(self.key.clone(), val);
        self.map.get_mut(&self.key).unwrap()
    }

    /// Takes ownership of the key.
    pub fn into_key(self) -> K {
        self.key
    }

    /// Gets a reference to the key that would be used on insert.
    pub fn key(&self) -> &K {
        &self.key
    }
}

/// A view of a single entry in a [`SplayMap`], which may be either occupied
/// or vacant.
pub enum Entry<'a, K, V> {
    /// An occupied entry.
    Occupied(OccupiedEntry<'a, K, V>),
    /// A vacant entry.
    Vacant(VacantEntry<'a, K, V>),
}

impl<'a, K, V> Entry<'a, K, V> {
    /// Applies f to the entry's value if it is occupied.
    pub fn and_modify<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&mut V),
    {
        if let Entry::Occupied(occ) = &mut self {
            f(occ.val);
        }

        self
    }

    /// Gets a reference to the entry's key.
    pub fn key(&self) -> &K {
        match self {
            Entry::Occupied(x) => &x.key,
            Entry::Vacant(x) => &x.key,
        }
    }

    /// Inserts the default value if the entry is vacant; returns a mutable
    /// reference to the entry's value.
    pub fn or_default(self) -> &'a mut V
    where
        K: Clone + Ord,
        V: Clone + Default,
    {
        match self {
            Entry::Occupied(x) => x.into_mut(),
            Entry::Vacant(x) => x.insert(V::default()),
        }
    }

    /// Inserts the given value if the entry is vacant; returns a mutable
    /// reference to the entry's value.
    pub fn or_insert(self, default: V) -> &'a mut V
    where
        K: Clone + Ord,
        V: Clone,
    {
        match self {
            Entry::Occupied(x) => x.into_mut(),
            Entry::Vacant(x) => x.insert(default),
        }
    }

    /// Inserts the value produced by f if the entry is vacant; returns a
    /// mutable reference to the entry's value.
    pub fn or_insert_with<F: FnOnce() -> V>(self, default: F) -> &'a mut V
    where
        K: Clone + Ord,
        V: Clone,
    {
        match self {
            Entry::Occupied(x) => x.into_mut(),
            Entry::Vacant(x) => x.insert(default()),
        }
    }

    /// Like [`or_insert_with`](#method.or_insert_with), but the closure is
    /// given a reference to the key.
    pub fn or_insert_with_key<F: FnOnce(&K) -> V>(self, default: F) -> &'a mut V
    where
        K: Clone + Ord,
        V: Clone,
    {
        match self {
            Entry::Occupied(x) => x.into_mut(),
            Entry::Vacant(x) => {
                let v = default(&x.key);
                x.insert(v)
            }
        }
    }
}

impl<K: Clone + Ord, V: Clone> Extend<(K, V)> for SplayMap<K, V> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for SplayMap<K, V>
where
    K: Clone + Ord,
    V: Clone,
{
    fn from(vs: [(K, V); N]) -> Self {
        SplayMap::from_iter(vs.into_iter())
    }
}

impl<K: Clone + Ord, V: Clone> FromIterator<(K, V)> for SplayMap<K, V> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut fmap = SplayMap::new();
        fmap.extend(iter);
        fmap
    }
}

#[cfg(feature = "serde")]
mod splay_map_serde {
    use super::SplayMap;
    use serde::de::{Deserialize, MapAccess, Visitor};
    use std::fmt;
    use std::marker::PhantomData;

    pub(super) struct SplayMapVisitor<K, V> {
        marker: PhantomData<fn() -> SplayMap<K, V>>,
    }

    impl<K, V> SplayMapVisitor<K, V> {
        pub fn new() -> Self {
            SplayMapVisitor {
                marker: PhantomData,
            }
        }
    }

    impl<'de, K, V> Visitor<'de> for SplayMapVisitor<K, V>
    where
        K: Clone + Deserialize<'de> + Ord,
        V: Clone + Deserialize<'de>,
    {
        type Value = SplayMap<K, V>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("splay_collections::SplayMap")
        }

        fn visit_map<M>(self, mut access: M) -> Result<Self::Value, M::Error>
        where
            M: MapAccess<'de>,
        {
            let mut map = SplayMap::<K, V>::new();

            while let Some((key, val)) = access.next_entry()? {
                map.insert(key, val);
            }

            Ok(map)
        }
    }
}

#[cfg(feature = "serde")]
impl<K, V> serde::ser::Serialize for SplayMap<K, V>
where
    K: serde::ser::Serialize,
    V: serde::ser::Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self.iter() {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

#[cfg(feature = "serde")]
impl<'de, K, V> serde::de::Deserialize<'de> for SplayMap<K, V>
where
    K: Clone + serde::de::Deserialize<'de> + Ord,
    V: Clone + serde::de::Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::de::Deserializer<'de>,
    {
        deserializer.deserialize_map(self::splay_map_serde::SplayMapVisitor::new())
    }
}
