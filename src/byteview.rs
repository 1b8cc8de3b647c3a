//! Immutable view over cached bytes.

use std::fmt;
use std::sync::Arc;

use crate::cache::Value;

/// An immutable view of bytes handed out by a group.
///
/// Cloning a view shares the underlying buffer; the only way to get at the
/// bytes mutably is through [`ByteView::byte_slice`], which copies.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ByteView {
    b: Arc<[u8]>,
}

impl ByteView {
    /// Copies `bytes` into a new view so the caller keeps no alias to it.
    pub fn copy_from(bytes: &[u8]) -> Self {
        Self { b: Arc::from(bytes) }
    }

    /// Returns the view's length in bytes.
    pub fn len(&self) -> usize {
        self.b.len()
    }

    pub fn is_empty(&self) -> bool {
        self.b.is_empty()
    }

    /// Returns a copy of the data.
    pub fn byte_slice(&self) -> Vec<u8> {
        self.b.to_vec()
    }

    /// Borrows the data without copying.
    pub fn as_bytes(&self) -> &[u8] {
        &self.b
    }
}

impl Default for ByteView {
    fn default() -> Self {
        Self::copy_from(&[])
    }
}

// Takes ownership of a freshly produced buffer; no other handle to it exists.
impl From<Vec<u8>> for ByteView {
    fn from(bytes: Vec<u8>) -> Self {
        Self { b: Arc::from(bytes) }
    }
}

impl fmt::Display for ByteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.b))
    }
}

impl fmt::Debug for ByteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ByteView")
            .field(&String::from_utf8_lossy(&self.b))
            .finish()
    }
}

impl Value for ByteView {
    fn len(&self) -> usize {
        self.b.len()
    }
}
