//! Scratch byte buffers for large bind and define elements and LOB chunks.
//!
//! Buffers are grouped in power-of-two size classes. Small requests are plain
//! allocations; only requests of at least [`MIN_POOLED`] bytes are recycled.

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::ops::{Deref, DerefMut};

/// Smallest request served from the pool
pub(crate) const MIN_POOLED : usize = 32 << 10;
/// Largest request served from the pool
pub(crate) const MAX_POOLED : usize = 64 << 20;
// Idle buffers kept per size class
const MAX_IDLE : usize = 4;

const NUM_CLASSES : usize = (MAX_POOLED.trailing_zeros() - MIN_POOLED.trailing_zeros() + 1) as usize;

struct BufPool {
    classes: Vec<Mutex<Vec<Vec<u8>>>>,
}

static BUFS : Lazy<BufPool> = Lazy::new(|| BufPool {
    classes: (0..NUM_CLASSES).map(|_| Mutex::new(Vec::new())).collect()
});

fn class_of(size: usize) -> Option<usize> {
    if size < MIN_POOLED || size > MAX_POOLED {
        None
    } else {
        let cap = size.next_power_of_two();
        Some( (cap.trailing_zeros() - MIN_POOLED.trailing_zeros()) as usize )
    }
}

/**
A zero-filled byte buffer. Pooled buffers go back to their size class when dropped.
*/
pub(crate) struct Buf {
    data: Vec<u8>,
    class: Option<usize>,
}

impl Buf {
    /// Borrows a zero-filled buffer of exactly `size` bytes.
    pub(crate) fn new(size: usize) -> Self {
        let class = class_of(size);
        let recycled = class.and_then(|ix| BUFS.classes[ix].lock().pop());
        let data = match recycled {
            Some(mut data) => {
                data.clear();
                data.resize(size, 0);
                data
            }
            None => {
                let mut data = Vec::with_capacity(if class.is_some() { size.next_power_of_two() } else { size });
                data.resize(size, 0);
                data
            }
        };
        Self { data, class }
    }

    pub(crate) fn as_mut_ptr(&mut self) -> *mut u8 {
        self.data.as_mut_ptr()
    }
}

impl Deref for Buf {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.data
    }
}

impl DerefMut for Buf {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

impl Drop for Buf {
    fn drop(&mut self) {
        if let Some(ix) = self.class {
            let mut idle = BUFS.classes[ix].lock();
            if idle.len() < MAX_IDLE {
                idle.push(std::mem::take(&mut self.data));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_classes() {
        assert_eq!(class_of(100), None);
        assert_eq!(class_of(MIN_POOLED), Some(0));
        assert_eq!(class_of(MIN_POOLED + 1), Some(1));
        assert_eq!(class_of(MAX_POOLED), Some(NUM_CLASSES - 1));
        assert_eq!(class_of(MAX_POOLED + 1), None);
    }

    #[test]
    fn borrowed_buffers_are_fresh() {
        let size = MIN_POOLED * 3;
        for round in 0..4u8 {
            let mut buf = Buf::new(size);
            assert_eq!(buf.len(), size);
            assert!(buf.iter().all(|&b| b == 0), "round {} saw stale bytes", round);
            buf.iter_mut().for_each(|b| *b = 0xA5 ^ round);
        }
        let mut buf = Buf::new(MIN_POOLED);
        buf[0] = 1;
        drop(buf);
        let buf = Buf::new(MIN_POOLED + 7);
        assert_eq!(buf.len(), MIN_POOLED + 7);
        assert!(buf.iter().all(|&b| b == 0));
    }
}
