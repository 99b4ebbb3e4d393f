#![no_main]

use std::collections::HashMap;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use hamt_digest::shared_ptr::RcK;
use hamt_digest::NodeRef;

// Raw hashes rather than digests, so the fuzzer can steer keys into shared
// prefixes and the deepest levels.
#[derive(Arbitrary, Debug)]
enum Action {
    Set(u64, u8),
    Remove(u64),
}

fuzz_target!(|actions: Vec<Action>| {
    let mut root: Option<NodeRef<u64, u8, RcK>> = None;
    let mut nat = HashMap::new();
    for action in actions {
        match action {
            Action::Set(hash, value) => {
                nat.insert(hash, value);
                root = Some(match root {
                    None => NodeRef::leaf(hash, hash, value),
                    Some(node) => node.set(hash, value, hash, 0),
                });
            }
            Action::Remove(hash) => {
                let expected = nat.remove(&hash).is_some();
                if let Some(node) = root.take() {
                    let (next, removed) = node.remove(hash, 0);
                    assert_eq!(expected, removed);
                    if !removed {
                        assert!(next.as_ref().map_or(false, |next| next.ptr_eq(&node)));
                    }
                    root = next;
                } else {
                    assert!(!expected);
                }
            }
        }
        match &root {
            Some(node) => {
                node.assert_invariants();
                assert_eq!(nat.len(), node.count());
            }
            None => assert!(nat.is_empty()),
        }
    }
    if let Some(node) = &root {
        for (hash, value) in &nat {
            assert_eq!(Some(value), node.get(*hash, 0));
        }
    }
});
