// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

// Every codebase needs a `util` module.

// Copy-on-write helpers for compacted child arrays. None of them touch the
// source slice; each returns a fresh vector of the requested length.

pub(crate) fn replace_at<A: Clone>(items: &[A], index: usize, value: A) -> Vec<A> {
    let mut out = items.to_vec();
    out[index] = value;
    out
}

pub(crate) fn insert_at<A: Clone>(items: &[A], index: usize, value: A) -> Vec<A> {
    let mut out = Vec::with_capacity(items.len() + 1);
    out.extend_from_slice(&items[..index]);
    out.push(value);
    out.extend_from_slice(&items[index..]);
    out
}

pub(crate) fn remove_at<A: Clone>(items: &[A], index: usize) -> Vec<A> {
    let mut out = Vec::with_capacity(items.len().saturating_sub(1));
    out.extend_from_slice(&items[..index]);
    out.extend_from_slice(&items[index + 1..]);
    out
}

#[cfg(test)]
macro_rules! assert_covariant {
    ($name:ident<$($gen:tt),*> in $param:ident) => {
        #[allow(dead_code, unused_assignments, unused_variables)]
        const _: () = {
            type Tmp<$param> = $name<$($gen),*>;
            fn assign<'a, 'b: 'a>(src: Tmp<&'b i32>, mut dst: Tmp<&'a i32>) {
                dst = src;
            }
        };
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn replace_keeps_length() {
        let items = vec![1, 2, 3];
        assert_eq!(vec![1, 9, 3], replace_at(&items, 1, 9));
        assert_eq!(vec![1, 2, 3], items);
    }

    #[test]
    fn insert_splices() {
        let items = vec![1, 3];
        assert_eq!(vec![0, 1, 3], insert_at(&items, 0, 0));
        assert_eq!(vec![1, 2, 3], insert_at(&items, 1, 2));
        assert_eq!(vec![1, 3, 4], insert_at(&items, 2, 4));
    }

    #[test]
    fn remove_drops_slot() {
        let items = vec![1, 2, 3];
        assert_eq!(vec![2, 3], remove_at(&items, 0));
        assert_eq!(vec![1, 3], remove_at(&items, 1));
        assert_eq!(vec![1, 2], remove_at(&items, 2));
        assert_eq!(Vec::<i32>::new(), remove_at(&[7], 0));
    }
}
