/// Defines an index newtype together with a vector that can only be indexed
/// by it.
///
/// ```
/// planrep::define_indexed_vec!(
///     pub struct Slot;
///     pub struct SlotVec;
/// );
///
/// let mut v = SlotVec::new();
/// let a = v.push('a');
/// assert_eq!(v[a], 'a');
/// assert_eq!(v.get(Slot(1)), None);
/// ```
#[macro_export]
macro_rules! define_indexed_vec {
    (
        $(#[$idx_meta:meta])*
        $idx_vis:vis struct $Idx:ident ;

        $(#[$vec_meta:meta])*
        $vec_vis:vis struct $Vec:ident ;
    ) => {
        $(#[$idx_meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $idx_vis struct $Idx(pub usize);

        impl ::std::convert::From<usize> for $Idx {
            fn from(value: usize) -> Self {
                $Idx(value)
            }
        }

        impl ::std::convert::From<$Idx> for usize {
            fn from(value: $Idx) -> Self {
                value.0
            }
        }

        impl ::std::fmt::Display for $Idx {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        $(#[$vec_meta])*
        #[derive(Clone, Debug, Hash, PartialEq, Eq)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vec_vis struct $Vec<T>(::std::vec::Vec<T>);

        impl<T> ::std::default::Default for $Vec<T> {
            fn default() -> Self {
                Self(::std::vec::Vec::new())
            }
        }

        impl<T> ::std::ops::Index<$Idx> for $Vec<T> {
            type Output = T;
            #[inline]
            fn index(&self, i: $Idx) -> &T {
                &self.0[i.0]
            }
        }

        impl<T> ::std::ops::IndexMut<$Idx> for $Vec<T> {
            #[inline]
            fn index_mut(&mut self, i: $Idx) -> &mut T {
                &mut self.0[i.0]
            }
        }

        #[allow(dead_code)]
        impl<T> $Vec<T> {
            #[inline]
            pub fn new() -> Self {
                Self(::std::vec::Vec::new())
            }

            #[inline]
            pub fn len(&self) -> usize {
                self.0.len()
            }

            #[inline]
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            /// Appends `value` and returns its index.
            #[inline]
            pub fn push(&mut self, value: T) -> $Idx {
                self.0.push(value);
                $Idx(self.0.len() - 1)
            }

            #[inline]
            pub fn swap(&mut self, a: $Idx, b: $Idx) {
                self.0.swap(a.0, b.0);
            }

            #[inline]
            pub fn get(&self, idx: $Idx) -> Option<&T> {
                self.0.get(idx.0)
            }

            #[inline]
            pub fn get_mut(&mut self, idx: $Idx) -> Option<&mut T> {
                self.0.get_mut(idx.0)
            }

            /// Grows the vector with `value` until `idx` is a valid index.
            #[inline]
            pub fn ensure(&mut self, idx: $Idx, value: T)
            where
                T: Clone,
            {
                if self.0.len() <= idx.0 {
                    self.0.resize(idx.0 + 1, value);
                }
            }

            /// Grows the vector with `value` up to `len` entries.
            #[inline]
            pub fn grow_to(&mut self, len: usize, value: T)
            where
                T: Clone,
            {
                if self.0.len() < len {
                    self.0.resize(len, value);
                }
            }

            pub fn iter(&self) -> impl Iterator<Item = ($Idx, &T)> + '_ {
                self.0.iter().enumerate().map(|(i, t)| ($Idx(i), t))
            }
        }

        impl<T: Clone> $Vec<T> {
            /// A vector holding `len` copies of `value`.
            #[inline]
            pub fn filled(len: usize, value: T) -> Self {
                Self(::std::vec![value; len])
            }
        }

        impl<T> ::std::iter::FromIterator<T> for $Vec<T> {
            fn from_iter<I: ::std::iter::IntoIterator<Item = T>>(it: I) -> Self {
                Self(::std::vec::Vec::from_iter(it))
            }
        }

        impl<T> ::std::convert::From<::std::vec::Vec<T>> for $Vec<T> {
            fn from(v: ::std::vec::Vec<T>) -> Self {
                Self(v)
            }
        }
    };
}
