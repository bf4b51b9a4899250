//! Severity-tagged notification log with a pre-allocated ring buffer.
//!
//! The engine pushes a notification for every user-visible outcome; the
//! rendering collaborator reads the log after each mutating operation.
//! Capacity is fixed (10 by default) and the oldest entry is evicted when
//! full.

// ---------------------------------------------------------------------------
// Notification types
// ---------------------------------------------------------------------------

/// How a notification should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// A single user-visible message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
}

// ---------------------------------------------------------------------------
// NotificationLog — pre-allocated ring buffer
// ---------------------------------------------------------------------------

/// A fixed-capacity ring buffer of notifications. When full, the oldest
/// entry is evicted.
#[derive(Debug)]
pub struct NotificationLog {
    /// Pre-allocated storage.
    entries: Vec<Option<Notification>>,
    /// Write position (wraps around).
    head: usize,
    /// Number of notifications currently stored.
    len: usize,
    /// Total notifications ever pushed (including evicted).
    total_pushed: u64,
}

impl NotificationLog {
    /// Create a log with the given capacity. A capacity of 0 is clamped to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: (0..capacity).map(|_| None).collect(),
            head: 0,
            len: 0,
            total_pushed: 0,
        }
    }

    /// Push a notification. If the log is full, the oldest is evicted.
    pub fn push(&mut self, severity: Severity, message: impl Into<String>) {
        self.entries[self.head] = Some(Notification {
            message: message.into(),
            severity,
        });
        self.head = (self.head + 1) % self.capacity();
        if self.len < self.capacity() {
            self.len += 1;
        }
        self.total_pushed += 1;
    }

    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total notifications pushed since creation (including evicted).
    pub fn total_pushed(&self) -> u64 {
        self.total_pushed
    }

    /// Number of notifications evicted because the log was full.
    pub fn evicted_count(&self) -> u64 {
        self.total_pushed.saturating_sub(self.len as u64)
    }

    /// Iterate from oldest to newest.
    pub fn iter(&self) -> NotificationIter<'_> {
        let start = if self.len < self.capacity() {
            0
        } else {
            // head is the next write position, which is the oldest entry
            self.head
        };
        NotificationIter {
            log: self,
            index: start,
            remaining: self.len,
        }
    }

    /// Drop all entries.
    pub fn clear(&mut self) {
        for slot in &mut self.entries {
            *slot = None;
        }
        self.head = 0;
        self.len = 0;
    }
}

/// Iterator over a [`NotificationLog`], oldest to newest.
#[derive(Debug)]
pub struct NotificationIter<'a> {
    log: &'a NotificationLog,
    index: usize,
    remaining: usize,
}

impl<'a> Iterator for NotificationIter<'a> {
    type Item = &'a Notification;

    fn next(&mut self) -> Option<Self::Item> {
        while self.remaining > 0 {
            let slot = &self.log.entries[self.index];
            self.index = (self.index + 1) % self.log.capacity();
            self.remaining -= 1;
            if let Some(notification) = slot {
                return Some(notification);
            }
        }
        None
    }
}
