// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Proptest strategies.
//!
//! These are only available when using the `proptest` feature flag.

use std::ops::Range;

use ::proptest::collection::vec;
use ::proptest::strategy::{BoxedStrategy, Strategy, ValueTree};

use crate::digest::StructuralHash;
use crate::Set;

/// A strategy for a [`Set`] of a given size.
///
/// # Examples
///
/// ```rust,ignore
/// # use ::proptest::proptest;
/// proptest! {
///     #[test]
///     fn proptest_a_set(ref s in hamt_digest::proptest::set(".*", 10..100)) {
///         assert!(s.len() < 100);
///         assert!(s.len() >= 10);
///     }
/// }
/// ```
pub fn set<A: Strategy + 'static>(
    element: A,
    size: Range<usize>,
) -> BoxedStrategy<Set<<A::Tree as ValueTree>::Value>>
where
    <A::Tree as ValueTree>::Value: StructuralHash + Clone,
{
    vec(element, size.clone())
        .prop_map(Set::from)
        .prop_filter("Set minimum size".to_owned(), move |s| {
            s.len() >= size.start
        })
        .boxed()
}
