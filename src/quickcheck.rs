use crate::{digest::StructuralHash, shared_ptr::SharedPointerKind, GenericSet};
use ::quickcheck::{Arbitrary, Gen};
use std::iter::FromIterator;

impl<A, P> Arbitrary for GenericSet<A, P>
where
    A: StructuralHash + Clone + Arbitrary + Sync,
    P: SharedPointerKind + 'static,
{
    fn arbitrary(g: &mut Gen) -> Self {
        GenericSet::from_iter(Vec::<A>::arbitrary(g))
    }
}
