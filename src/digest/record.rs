// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use super::{combine_ordered, digest, StructuralHash};

/// A builder for the digest of a record type.
///
/// A record's digest starts from the digest of its type name and XORs in
/// `combine_ordered(digest(field_name), digest(field_value))` for every
/// field, so the order fields are fed in doesn't matter. Only feed it the
/// fields that make up the record's public shape.
///
/// [`structural_record!`][crate::structural_record] writes the calls for you.
///
/// # Examples
///
/// ```
/// # use hamt_digest::digest::{digest, RecordDigest, StructuralHash};
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// impl StructuralHash for Point {
///     fn structural_hash(&self) -> u64 {
///         RecordDigest::new("Point")
///             .field("x", &self.x)
///             .field("y", &self.y)
///             .finish()
///     }
/// }
///
/// assert_eq!(digest(&Point { x: 1, y: 2 }), digest(&Point { x: 1, y: 2 }));
/// assert_ne!(digest(&Point { x: 1, y: 2 }), digest(&Point { x: 2, y: 1 }));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecordDigest {
    acc: u64,
}

impl RecordDigest {
    #[must_use]
    pub fn new(type_name: &str) -> Self {
        RecordDigest {
            acc: digest(type_name),
        }
    }

    pub fn field<T: StructuralHash + ?Sized>(&mut self, name: &str, value: &T) -> &mut Self {
        self.acc ^= combine_ordered(digest(name), digest(value));
        self
    }

    #[must_use]
    pub fn finish(&self) -> u64 {
        self.acc
    }
}

/// Define a struct along with a [`StructuralHash`] impl over its `pub`
/// fields.
///
/// Fields that are private or only visible within a restricted path
/// (`pub(crate)`, `pub(super)`, ...) are left out of the digest. The type
/// name used is the bare struct name. Generic structs aren't supported;
/// write those impls by hand with [`RecordDigest`].
///
/// # Examples
///
/// ```
/// # use hamt_digest::digest::digest;
/// # use hamt_digest::structural_record;
/// structural_record! {
///     #[derive(Clone, Debug)]
///     pub struct Account {
///         pub owner: String,
///         pub balance: i64,
///         cache: Option<u64>,
///     }
/// }
///
/// let plain = Account { owner: "ada".into(), balance: 10, cache: None };
/// let cached = Account { cache: Some(1234), ..plain.clone() };
/// assert_eq!(digest(&plain), digest(&cached));
/// ```
#[macro_export]
macro_rules! structural_record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $($body:tt)*
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $($body)*
        }

        impl $crate::digest::StructuralHash for $name {
            fn structural_hash(&self) -> u64 {
                #[allow(unused_mut)]
                let mut record = $crate::digest::RecordDigest::new(stringify!($name));
                $crate::__structural_record_fields!(self, record; $($body)*);
                record.finish()
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __structural_record_fields {
    ($self:ident, $record:ident;) => {};
    ($self:ident, $record:ident; #[$meta:meta] $($rest:tt)*) => {
        $crate::__structural_record_fields!($self, $record; $($rest)*);
    };
    ($self:ident, $record:ident; pub ($($path:tt)*) $field:ident : $ty:ty $(, $($rest:tt)*)?) => {
        $crate::__structural_record_fields!($self, $record; $($($rest)*)?);
    };
    ($self:ident, $record:ident; pub $field:ident : $ty:ty $(, $($rest:tt)*)?) => {
        $record.field(stringify!($field), &$self.$field);
        $crate::__structural_record_fields!($self, $record; $($($rest)*)?);
    };
    ($self:ident, $record:ident; $field:ident : $ty:ty $(, $($rest:tt)*)?) => {
        $crate::__structural_record_fields!($self, $record; $($($rest)*)?);
    };
}
