/// Defines the methods of an arena vector that can only be indexed by its own
/// index newtype.
///
/// The sweeps allocate one of these per call and link their nodes together by
/// index, so the arena is the only owner of the nodes.
macro_rules! impl_typed_vec {
    ($vec_name:ident, $idx_name:ident, $dbg_prefix:expr) => {
        impl std::fmt::Debug for $idx_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}_{}", $dbg_prefix, self.0)
            }
        }

        #[allow(dead_code)]
        impl<T> $vec_name<T> {
            /// Creates an empty vector with room for `cap` elements.
            ///
            /// Unlike `Vec::with_capacity`, allocation failure is reported
            /// instead of aborting.
            pub fn try_with_capacity(cap: usize) -> Result<Self, crate::Error> {
                let mut inner = Vec::new();
                inner
                    .try_reserve_exact(cap)
                    .map_err(|_| crate::Error::NoMemory)?;
                Ok(Self { inner })
            }

            /// Returns an iterator over all indices into this vector.
            pub fn indices(&self) -> impl Iterator<Item = $idx_name> {
                (0..self.inner.len()).map($idx_name)
            }

            /// The length of this vector.
            pub fn len(&self) -> usize {
                self.inner.len()
            }

            /// Are we empty?
            pub fn is_empty(&self) -> bool {
                self.inner.is_empty()
            }

            /// Adds a new element, returning its index.
            pub fn try_push(&mut self, elt: T) -> Result<$idx_name, crate::Error> {
                if self.inner.len() == self.inner.capacity() {
                    self.inner
                        .try_reserve(1)
                        .map_err(|_| crate::Error::NoMemory)?;
                }
                self.inner.push(elt);
                Ok($idx_name(self.inner.len() - 1))
            }

            /// Returns an iterator over indices and elements.
            pub fn iter(&self) -> impl Iterator<Item = ($idx_name, &T)> + '_ {
                self.inner
                    .iter()
                    .enumerate()
                    .map(|(idx, t)| ($idx_name(idx), t))
            }
        }

        impl<T> Default for $vec_name<T> {
            fn default() -> Self {
                Self { inner: Vec::new() }
            }
        }

        impl<T> std::ops::Index<$idx_name> for $vec_name<T> {
            type Output = T;

            fn index(&self, index: $idx_name) -> &Self::Output {
                &self.inner[index.0]
            }
        }

        impl<T> std::ops::IndexMut<$idx_name> for $vec_name<T> {
            fn index_mut(&mut self, index: $idx_name) -> &mut T {
                &mut self.inner[index.0]
            }
        }

        impl<T: std::fmt::Debug> std::fmt::Debug for $vec_name<T> {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                let mut list = f.debug_map();
                for (idx, elt) in self.iter() {
                    list.entry(&idx, elt);
                }
                list.finish()
            }
        }
    };
}
