// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/// The level size of the trie, in bits.
/// Branching factor is 2 ^ HASH_LEVEL_SIZE.
pub(crate) const HASH_LEVEL_SIZE: usize = 6;

/// Number of child slots a single branch can address.
pub(crate) const HASH_WIDTH: usize = 1 << HASH_LEVEL_SIZE;

/// The deepest offset a 64 bit hash can be split into.
///
/// 64 bits in chunks of 6 gives offsets `0..=10`, the last of which only
/// sees the top four bits of the hash.
pub const MAX_OFFSET: usize = (u64::BITS as usize - 1) / HASH_LEVEL_SIZE;
