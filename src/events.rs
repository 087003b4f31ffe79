//! Interrupt-driven input edge signaling.
//!
//! Wall-switch GPIO ISRs only record which input changed and the level the
//! pin had when the interrupt fired.  Debouncing, toggling and every
//! attribute or output access happen on the main loop, which drains the
//! queue in order.  Carrying the level keeps a tap that is pressed and
//! released within one loop tick visible to the debouncer.
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────────────┐
//! │ GPIO ISR in0 │────▶│              │     │                      │
//! │ GPIO ISR in1 │────▶│  EdgeQueue   │────▶│  Main loop           │
//! │ ...          │────▶│  (lock-free) │     │  debounce → toggle   │
//! └──────────────┘     └──────────────┘     └──────────────────────┘
//! ```

use core::sync::atomic::{AtomicU8, Ordering};

use crate::app::toggle::InputId;

/// Slot bit holding the sampled pin level.
const LEVEL_BIT: u8 = 0x80;

/// One interrupt: the input and its pin level at that instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeNotice {
    pub input: InputId,
    pub high: bool,
}

impl EdgeNotice {
    pub const fn new(input: InputId, high: bool) -> Self {
        Self { input, high }
    }

    const fn encode(self) -> u8 {
        (self.input.raw() & !LEVEL_BIT) | if self.high { LEVEL_BIT } else { 0 }
    }

    const fn decode(raw: u8) -> Self {
        Self {
            input: InputId::new(raw & !LEVEL_BIT),
            high: raw & LEVEL_BIT != 0,
        }
    }
}

/// Slots in the ring; one is kept free to tell full from empty.
/// Power of 2 for efficient ring buffer modulo.
pub const EDGE_QUEUE_CAP: usize = 32;

/// Lock-free SPSC ring of [`EdgeNotice`]s, one byte per slot.
///
/// Producer: ISR context, one writer.  Consumer: main loop, one reader.
pub struct EdgeQueue {
    head: AtomicU8,
    tail: AtomicU8,
    slots: [AtomicU8; EDGE_QUEUE_CAP],
}

impl EdgeQueue {
    pub const fn new() -> Self {
        Self {
            head: AtomicU8::new(0),
            tail: AtomicU8::new(0),
            slots: [const { AtomicU8::new(0) }; EDGE_QUEUE_CAP],
        }
    }

    /// Record an edge.
    /// Safe to call from ISR context.
    /// Returns `false` if the queue is full (edge dropped; the periodic
    /// input poll picks the level up later).
    pub fn push(&self, notice: EdgeNotice) -> bool {
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Acquire);
        let next_head = (head + 1) % EDGE_QUEUE_CAP as u8;

        if next_head == tail {
            return false;
        }

        self.slots[head as usize].store(notice.encode(), Ordering::Relaxed);
        self.head.store(next_head, Ordering::Release);
        true
    }

    /// Pop the oldest pending edge.  Single consumer only.
    pub fn pop(&self) -> Option<EdgeNotice> {
        let tail = self.tail.load(Ordering::Relaxed);
        let head = self.head.load(Ordering::Acquire);

        if tail == head {
            return None;
        }

        let raw = self.slots[tail as usize].load(Ordering::Relaxed);
        self.tail
            .store((tail + 1) % EDGE_QUEUE_CAP as u8, Ordering::Release);
        Some(EdgeNotice::decode(raw))
    }

    /// Drain all pending edges into a callback, in FIFO order.
    pub fn drain(&self, mut handler: impl FnMut(EdgeNotice)) {
        while let Some(notice) = self.pop() {
            handler(notice);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tail.load(Ordering::Relaxed) == self.head.load(Ordering::Acquire)
    }

    pub fn len(&self) -> usize {
        let head = self.head.load(Ordering::Relaxed) as usize;
        let tail = self.tail.load(Ordering::Relaxed) as usize;
        (head + EDGE_QUEUE_CAP - tail) % EDGE_QUEUE_CAP
    }
}

impl Default for EdgeQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Queue fed by the wall-switch GPIO ISRs registered in
/// [`hw_init`](crate::drivers::hw_init).
pub static INPUT_EDGES: EdgeQueue = EdgeQueue::new();
