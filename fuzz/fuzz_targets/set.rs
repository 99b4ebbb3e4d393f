#![no_main]

use std::collections::HashSet as NatSet;
use std::iter::FromIterator;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use hamt_digest::Set;

#[derive(Arbitrary, Debug)]
enum Action<A> {
    Insert(A),
    Remove(A),
}

fuzz_target!(|actions: Vec<Action<u32>>| {
    let mut set = Set::new();
    let mut nat = NatSet::new();
    for action in actions {
        match action {
            Action::Insert(value) => {
                let len = nat.len() + if nat.contains(&value) { 0 } else { 1 };
                assert_eq!(nat.insert(value), set.insert(value));
                assert_eq!(len, set.len());
            }
            Action::Remove(value) => {
                let len = nat.len() - if nat.contains(&value) { 1 } else { 0 };
                assert_eq!(nat.remove(&value), set.remove(&value));
                assert_eq!(len, set.len());
            }
        }
        assert_eq!(nat.len(), set.len());
    }
    if let Some(root) = set.root() {
        root.assert_invariants();
    }
    assert_eq!(Set::<u32>::from_iter(nat.iter().cloned()), set);
    assert_eq!(NatSet::from_iter(set.iter().cloned()), nat);
    assert_eq!(set.iter().count(), nat.len());
});
