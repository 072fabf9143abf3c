//! The change feed: a bounded queue of changed coordinates.
//!
//! Mutating workers push the coordinate of every cell they touch; an
//! observer drains the queue and redraws those cells. The feed is
//! coalescing-tolerant: a coordinate only means "something changed here",
//! so dropping a duplicate under backpressure costs nothing beyond a
//! coarser redraw.

use std::sync::mpsc::{Receiver, SyncSender, TrySendError, sync_channel};

use crate::geom::Point;

/// Create a change feed with room for `cap` pending coordinates.
pub(crate) fn channel(cap: usize) -> (Notifier, Receiver<Point>) {
    let (tx, rx) = sync_channel(cap);
    (Notifier { tx }, rx)
}

/// Producer half of the change feed.
///
/// Sends are best-effort and never block: a full queue drops the
/// coordinate, and a vanished observer is ignored. A slow or absent
/// observer therefore cannot stall a generation or routing worker.
#[derive(Clone)]
pub(crate) struct Notifier {
    tx: SyncSender<Point>,
}

impl Notifier {
    pub(crate) fn notify(&self, p: Point) {
        match self.tx.try_send(p) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => log::trace!("change feed full, dropped {p}"),
            Err(TrySendError::Disconnected(_)) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivers_in_fifo_order() {
        let (tx, rx) = channel(8);
        tx.notify(Point::new(1, 0));
        tx.notify(Point::new(2, 0));
        tx.notify(Point::new(3, 0));
        assert_eq!(rx.recv().unwrap(), Point::new(1, 0));
        assert_eq!(rx.recv().unwrap(), Point::new(2, 0));
        assert_eq!(rx.recv().unwrap(), Point::new(3, 0));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn full_queue_drops_instead_of_blocking() {
        let (tx, rx) = channel(2);
        for x in 0..100 {
            // Must return immediately even with no consumer.
            tx.notify(Point::new(x, 0));
        }
        assert_eq!(rx.recv().unwrap(), Point::new(0, 0));
        assert_eq!(rx.recv().unwrap(), Point::new(1, 0));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn gone_observer_is_ignored() {
        let (tx, rx) = channel(2);
        drop(rx);
        tx.notify(Point::ZERO);
    }
}
