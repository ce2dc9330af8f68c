use std::fmt::Write;

pub const MESSAGE_CAPACITY: usize = 100;
pub const MESSAGE_LIFE: f64 = 2.0; // seconds a message stays on screen

/// Fixed-capacity FIFO of owned messages.
///
/// A ring over `Option<String>`: the live window starts at `head` and
/// wraps; slots outside it are always `None`. Pushing into a full queue
/// evicts the oldest message so the newest always fits.
pub struct MessageQueue {
    slots: Vec<Option<String>>,
    head: usize,
    len: usize,
    dropped: u64,
}

impl MessageQueue {
    pub fn new() -> Self {
        MessageQueue::with_capacity(MESSAGE_CAPACITY)
    }
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "capacity must be at least 1");
        MessageQueue {
            slots: vec![None; capacity],
            head: 0,
            len: 0,
            dropped: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
    pub fn len(&self) -> usize {
        self.len
    }
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
    /// How many messages have been evicted by overflowing pushes.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Append a message, evicting the oldest one first if the queue is full.
    pub fn push(&mut self,  message: String) {
        if self.len >= self.slots.len() {
            let evicted = self.slots[self.head].take();
            self.head = (self.head + 1) % self.slots.len();
            self.len -= 1;
            self.dropped += 1;
            log::warn!("message queue full, dropped {:?}", evicted.as_deref().unwrap_or(""));
        }
        let tail = (self.head + self.len) % self.slots.len();
        self.slots[tail] = Some(message);
        self.len += 1;
    }

    /// Remove and return the oldest message.
    /// An empty queue returns `None` and is left untouched.
    pub fn pop(&mut self) -> Option<String> {
        if self.len == 0 {
            return None;
        }
        let message = self.slots[self.head].take();
        self.head = (self.head + 1) % self.slots.len();
        self.len -= 1;
        message
    }

    pub fn clear(&mut self) {
        while self.pop().is_some() {}
    }

    /// The live messages, oldest first, without consuming them.
    pub fn iter(&self) -> impl Iterator<Item=&str> + '_ {
        self.slots[self.head..].iter()
            .chain(&self.slots[..self.head])
            .filter_map(|slot| slot.as_deref() )
            .take(self.len)
    }

    /// Diagnostic listing, either the live messages in logical order or
    /// every slot in raw buffer order with empty slots marked `-`.
    pub fn debug_dump(&self,  include_raw: bool) -> String {
        let mut out = format!(
            "head={} len={} cap={} dropped={}\n",
            self.head, self.len, self.slots.len(), self.dropped,
        );
        if include_raw {
            for (i, slot) in self.slots.iter().enumerate() {
                match slot {
                    Some(message) => { let _ = writeln!(&mut out, "[{}] {:?}", i, message); }
                    None => { let _ = writeln!(&mut out, "[{}] -", i); }
                }
            }
        } else {
            for (i, message) in self.iter().enumerate() {
                let _ = writeln!(&mut out, "[{}] {:?}", i, message);
            }
        }
        out
    }
}

/// Shows the queued messages one at a time, each for `MESSAGE_LIFE` seconds.
pub struct MessageBoard {
    current: Option<String>,
    shown_since: f64,
}

impl MessageBoard {
    pub fn new() -> Self {MessageBoard {
        current: None,
        shown_since: 0.0,
    } }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }
    pub fn clear(&mut self) {
        self.current = None;
        self.shown_since = 0.0;
    }

    /// Drop the displayed message once its time is up and try to show the
    /// next one. When the queue is empty the display goes blank and the
    /// next queued message is picked up on the first tick after it arrives.
    pub fn tick(&mut self,  now: f64,  queue: &mut MessageQueue) {
        if now - self.shown_since > MESSAGE_LIFE {
            self.current = queue.pop();
            if self.current.is_some() {
                self.shown_since = now;
            }
        }
    }
}
