use proptest::prelude::*;

#[allow(dead_code)]
pub(super) fn assert_eq_iters<I: Iterator, J: Iterator<Item = I::Item>>(
    mut i: I,
    mut j: J,
) where
    I::Item: std::fmt::Debug + Eq, // same inferred for J::Item
{
    loop {
        match (i.next(), j.next()) {
            (None, None) => return,
            (a, b) => assert_eq!(a, b),
        }
    }
}

pub(super) type U16Seq = Vec<u16>;

// sequences drawn from a narrow key range so operations collide often
#[allow(dead_code)]
pub(super) fn u16_seq(ub: u16, len: usize) -> impl Strategy<Value = U16Seq> {
    prop::collection::vec(0..ub, 0..len)
}

#[allow(dead_code)]
pub(super) fn small_int_seq() -> impl Strategy<Value = U16Seq> {
    prop::collection::vec(0u16..1024u16, 0..512)
}

#[allow(dead_code)]
pub(super) fn small_int_pairs() -> impl Strategy<Value = Vec<(u16, u16)>> {
    prop::collection::vec((0u16..1024u16, 0u16..1024u16), 0..512)
}
