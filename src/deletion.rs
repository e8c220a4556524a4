//! Partition deletion markers.
//!
//! A marker records when a partition was logically deleted. Markers for
//! the same partition are resolved by the supersession rule, never by
//! arrival order, so out-of-order delete requests converge to the same
//! final state.

/// A partition-level deletion marker.
///
/// Persisted as 12 bytes big-endian: 4 bytes `local_deletion_time`
/// followed by 8 bytes `marked_for_delete_at`. The encoding is stable
/// across restarts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionDeletion {
    /// Local server time of the deletion, in epoch seconds.
    pub local_deletion_time: u32,
    /// Write timestamp of the deletion, in microseconds.
    pub marked_for_delete_at: i64,
}

impl PartitionDeletion {
    /// Size of a serialized marker in bytes.
    pub const SIZE: usize = 4 + 8;

    /// Creates a new deletion marker.
    pub fn new(local_deletion_time: u32, marked_for_delete_at: i64) -> Self {
        Self { local_deletion_time, marked_for_delete_at }
    }

    /// Returns whether this marker supersedes `other` for the same
    /// partition.
    ///
    /// A strictly greater `marked_for_delete_at` always wins; ties are
    /// broken by a strictly greater `local_deletion_time`. A marker never
    /// supersedes an identical one, which makes repeated deletes no-ops.
    pub fn supersedes(&self, other: &PartitionDeletion) -> bool {
        self.marked_for_delete_at > other.marked_for_delete_at
            || (self.marked_for_delete_at == other.marked_for_delete_at
                && self.local_deletion_time > other.local_deletion_time)
    }

    /// Serializes the marker to its fixed big-endian wire format.
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        buf[0..4].copy_from_slice(&self.local_deletion_time.to_be_bytes());
        buf[4..12].copy_from_slice(&self.marked_for_delete_at.to_be_bytes());
        buf
    }

    /// Deserializes a marker from bytes.
    ///
    /// Returns `None` if the slice is not exactly [`Self::SIZE`] bytes.
    pub fn from_bytes(buf: &[u8]) -> Option<Self> {
        if buf.len() != Self::SIZE {
            return None;
        }
        Some(Self {
            local_deletion_time: u32::from_be_bytes(buf[0..4].try_into().ok()?),
            marked_for_delete_at: i64::from_be_bytes(buf[4..12].try_into().ok()?),
        })
    }
}
