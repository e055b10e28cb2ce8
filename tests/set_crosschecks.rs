use proptest::prelude::*;
use splay_collections::SplaySet;
use std::collections::BTreeSet as StdSet;

mod common;
use common::*;

#[derive(Clone)]
struct Sets<T> {
    splay_set: SplaySet<T>,
    std_set: StdSet<T>,
}

impl<T> Sets<T>
where
    T: Clone + Ord,
{
    fn new(v: Vec<T>) -> Sets<T> {
        Sets {
            splay_set: SplaySet::from_iter(v.clone()),
            std_set: StdSet::from_iter(v),
        }
    }

    fn chk(&self)
    where
        T: Eq + std::fmt::Debug,
    {
        assert_eq!(self.splay_set.len(), self.std_set.len());
        assert_eq_iters(self.splay_set.iter(), self.std_set.iter());
    }
}

fn check_contains(u: U16Seq) {
    let sets = Sets::new(u);

    for i in 0..64 {
        assert_eq!(sets.splay_set.contains(&i), sets.std_set.contains(&i));
        assert_eq!(sets.splay_set.get(&i), sets.std_set.get(&i));
    }
}

fn check_remove(v: U16Seq, w: Vec<u16>) {
    let mut m = Sets::new(v);

    for i in w {
        assert_eq!(m.splay_set.remove(&i), m.std_set.remove(&i));
        m.chk();
    }
}

fn check_memoized(v: U16Seq, probes: Vec<u16>) {
    let mut m = Sets::new(v);

    for p in probes {
        let expect = m.std_set.get(&p);
        assert_eq!(m.splay_set.get_memoized(&p), expect);
        assert_eq!(m.splay_set.get(&p), expect);
        m.chk();
    }
}

fn check_forks(u: U16Seq, v: U16Seq) {
    let base = Sets::new(u);
    let mut fork = base.clone();
    assert!(base.splay_set.ptr_eq(&fork.splay_set));

    for x in v {
        fork.splay_set.insert(x);
        fork.std_set.insert(x);
    }

    base.chk();
    fork.chk();
}

fn check_to_vec(v: U16Seq) {
    let sets = Sets::new(v);
    let out = sets.splay_set.to_vec();

    assert!(out.windows(2).all(|w| w[0] < w[1]));
    assert_eq_iters(out.iter(), sets.std_set.iter());
}

#[test]
fn test_first_and_last() {
    let mut sets = Sets::new(vec![4, 2, 3]);

    assert_eq!(sets.splay_set.first(), sets.std_set.first());
    assert_eq!(sets.splay_set.last(), sets.std_set.last());

    sets.splay_set.clear();
    sets.std_set.clear();
    sets.chk();

    assert_eq!(sets.splay_set.first(), sets.std_set.first());
    assert_eq!(sets.splay_set.last(), sets.std_set.last());
}

#[test]
fn test_digits_scenario() {
    let mut s: SplaySet<_> = [3, 1, 4, 1, 5, 9, 2, 6].into_iter().collect();
    assert_eq!(s.to_vec(), vec![1, 2, 3, 4, 5, 6, 9]);
    assert_eq!(s.len(), 7);

    assert_eq!(s.get_memoized(&9), Some(&9));
    assert!(format!("{:?}", s).starts_with("(9:"));

    assert!(s.remove(&4));
    assert_eq!(s.to_vec(), vec![1, 2, 3, 5, 6, 9]);
    assert!(!s.remove(&42));
    assert_eq!(s.to_vec(), vec![1, 2, 3, 5, 6, 9]);
}

#[test]
fn test_eq_ignores_shape() {
    // equal contents reached through different access histories
    let a: SplaySet<_> = (0..100).collect();
    let mut b: SplaySet<_> = (0..100).rev().collect();
    b.get_memoized(&42);

    assert_eq!(a, b);
    assert!(!a.ptr_eq(&b));
}

#[test]
fn test_hash_ignores_shape() {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn hash_of<T: Hash>(x: &T) -> u64 {
        let mut h = DefaultHasher::new();
        x.hash(&mut h);
        h.finish()
    }

    let a: SplaySet<_> = (0..100).collect();
    let mut b: SplaySet<_> = (0..100).rev().collect();
    b.get_memoized(&42);

    assert_eq!(hash_of(&a), hash_of(&b));
}

proptest! {
    #[test]
    fn test_contains(u in u16_seq(64, 48)) {
        check_contains(u);
    }

    #[test]
    fn test_remove(
        v in u16_seq(64, 48),
        w in prop::collection::vec(0u16..64, 48))
    {
        check_remove(v, w);
    }

    #[test]
    fn test_memoized(
        v in u16_seq(64, 48),
        probes in prop::collection::vec(0u16..64, 48))
    {
        check_memoized(v, probes);
    }

    #[test]
    fn test_forks(u in small_int_seq(), v in small_int_seq()) {
        check_forks(u, v);
    }

    #[test]
    fn test_to_vec(v in small_int_seq()) {
        check_to_vec(v);
    }
}
