use crossbeam_channel::{Receiver, Sender, TrySendError};

use crate::frame::AudioFrame;

/// Consumer half of the frame queue. FIFO; single consumer in practice.
pub type FrameReceiver = Receiver<AudioFrame>;

/// Bounded, ordered hand-off of audio frames from the capture callback to
/// the recognition worker. The producer never blocks: when the queue is
/// full the oldest frame is evicted so real-time capture wins over
/// completeness.
pub struct FrameQueue;

impl FrameQueue {
    pub fn bounded(capacity: usize) -> (FrameSender, FrameReceiver) {
        let (tx, rx) = crossbeam_channel::bounded(capacity);
        (
            FrameSender {
                tx,
                evict_rx: rx.clone(),
            },
            rx,
        )
    }
}

/// Producer half, held by the capture side. Cloneable so the controller can
/// hand it to each new stream's assembler.
#[derive(Clone)]
pub struct FrameSender {
    tx: Sender<AudioFrame>,
    // Crossbeam channels are mpmc, so the producer keeps its own receiver
    // handle purely to evict the head when the queue is full.
    evict_rx: Receiver<AudioFrame>,
}

impl FrameSender {
    /// Non-blocking push. Returns the number of frames evicted to make room
    /// (0 on the happy path, and when the consumer is gone).
    pub fn push(&self, frame: AudioFrame) -> usize {
        let mut evicted = 0;
        let mut frame = frame;
        loop {
            match self.tx.try_send(frame) {
                Ok(()) => return evicted,
                Err(TrySendError::Full(back)) => {
                    frame = back;
                    if self.evict_rx.try_recv().is_ok() {
                        evicted += 1;
                    }
                    // If the consumer raced us for the head, the retry
                    // succeeds on the freed slot instead.
                }
                Err(TrySendError::Disconnected(_)) => return evicted,
            }
        }
    }

    pub fn len(&self) -> usize {
        self.tx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tx.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn frame(tag: i16) -> AudioFrame {
        AudioFrame {
            samples: vec![tag],
            timestamp: Instant::now(),
        }
    }

    #[test]
    fn fifo_order_is_preserved() {
        let (tx, rx) = FrameQueue::bounded(8);
        for tag in 0..5 {
            assert_eq!(tx.push(frame(tag)), 0);
        }
        let tags: Vec<i16> = rx.try_iter().map(|f| f.samples[0]).collect();
        assert_eq!(tags, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn full_queue_drops_oldest() {
        let (tx, rx) = FrameQueue::bounded(3);
        for tag in 0..3 {
            tx.push(frame(tag));
        }
        // Queue holds [0, 1, 2]; pushing 3 must evict 0, never block.
        assert_eq!(tx.push(frame(3)), 1);
        let tags: Vec<i16> = rx.try_iter().map(|f| f.samples[0]).collect();
        assert_eq!(tags, vec![1, 2, 3]);
    }

    #[test]
    fn push_after_consumer_gone_does_not_block() {
        let (tx, rx) = FrameQueue::bounded(2);
        drop(rx);
        assert_eq!(tx.push(frame(0)), 0);
    }
}
