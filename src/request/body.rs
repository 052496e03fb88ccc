//! Reusable request body.

use bytes::Bytes;

/// Result of a single [`RequestBody::read`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyRead {
    /// Bytes copied into the destination buffer.
    pub bytes_read: usize,
    /// Always true: the body is delivered in one read.
    pub end_of_stream: bool,
}

/// Immutable request body shared by every request a probe builds.
///
/// Unlike a buffered reader there is no cursor: each read copies from the
/// start of the body, as much as the destination holds, and reports end of
/// stream on that same call. Nothing needs resetting between uses, so one
/// buffer can back many requests read concurrently. Clones share the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestBody {
    bytes: Bytes,
}

impl RequestBody {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// Copies the body prefix that fits into `dst`.
    pub fn read(&self, dst: &mut [u8]) -> BodyRead {
        let n = dst.len().min(self.bytes.len());
        dst[..n].copy_from_slice(&self.bytes[..n]);
        BodyRead {
            bytes_read: n,
            end_of_stream: true,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Cheap handle to the underlying buffer.
    pub fn bytes(&self) -> Bytes {
        self.bytes.clone()
    }
}
