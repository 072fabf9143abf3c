//! The [`Grid`] type — a shared, lock-guarded maze grid with a change feed.
//!
//! A `Grid` is a cheap handle: cloning yields another view of the **same**
//! shared state, so a generation worker and a rendering observer can hold
//! the grid from different threads. All cell access goes through an
//! internal mutex; the topology (dimensions and neighbor relations) is
//! fixed at construction and read lock-free.

use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use crate::cell::{Cell, Label};
use crate::error::Error;
use crate::geom::{Direction, Point};
use crate::notify::{self, Notifier};

// ---------------------------------------------------------------------------
// Pacing
// ---------------------------------------------------------------------------

/// Animation pacing for generation and routing workers.
///
/// The delays give an observer time to redraw between steps; they are a
/// pacing contract for animation, not a correctness requirement. Use
/// [`Pacing::NONE`] for headless or test use. Sleeps never hold the state
/// lock.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Pacing {
    /// Delay after each carve, frontier expansion, or path step.
    pub step: Duration,
    /// Longer pause between the BFS flood fill and the path trace.
    pub phase_pause: Duration,
}

impl Pacing {
    /// No delays at all.
    pub const NONE: Self = Self {
        step: Duration::ZERO,
        phase_pause: Duration::ZERO,
    };
}

impl Default for Pacing {
    /// The animated default: 20 ms per step, half a second between
    /// routing phases.
    fn default() -> Self {
        Self {
            step: Duration::from_millis(20),
            phase_pause: Duration::from_millis(500),
        }
    }
}

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Mutable state behind the grid's mutex.
pub(crate) struct State {
    /// Row-major cell buffer, `width × height` entries.
    pub(crate) cells: Vec<Cell>,
    pub(crate) start: Option<Point>,
    pub(crate) finish: Option<Point>,
    /// Set while a generation or routing worker runs; enforces the
    /// one-algorithm-at-a-time contract.
    busy: bool,
}

struct Inner {
    width: i32,
    height: i32,
    pacing: Pacing,
    state: Mutex<State>,
    notifier: Notifier,
    /// Receiver half of the change feed, handed out once by
    /// [`Grid::updates`].
    updates: Mutex<Option<Receiver<Point>>>,
}

// ---------------------------------------------------------------------------
// Grid
// ---------------------------------------------------------------------------

/// A rectangular maze grid.
///
/// The grid starts fully walled. Passages are carved by the generation
/// algorithms ([`binary_tree`](Grid::binary_tree),
/// [`sidewinder`](Grid::sidewinder)), endpoints are chosen with
/// [`click`](Grid::click), and [`route`](Grid::route) draws the shortest
/// path between them. Every mutation pushes the changed coordinate onto
/// the feed returned by [`updates`](Grid::updates).
#[derive(Clone)]
pub struct Grid {
    inner: Arc<Inner>,
}

impl Grid {
    /// Create a fully walled `width × height` grid with default pacing.
    ///
    /// Dimensions are clamped to at least 1×1.
    pub fn new(width: i32, height: i32) -> Self {
        Self::with_pacing(width, height, Pacing::default())
    }

    /// Create a grid with explicit [`Pacing`].
    pub fn with_pacing(width: i32, height: i32, pacing: Pacing) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let len = (width as usize) * (height as usize);
        let (notifier, rx) = notify::channel(len + 1);
        Self {
            inner: Arc::new(Inner {
                width,
                height,
                pacing,
                state: Mutex::new(State {
                    cells: vec![Cell::default(); len],
                    start: None,
                    finish: None,
                    busy: false,
                }),
                notifier,
                updates: Mutex::new(Some(rx)),
            }),
        }
    }

    /// Width in cells.
    #[inline]
    pub fn width(&self) -> i32 {
        self.inner.width
    }

    /// Height in cells.
    #[inline]
    pub fn height(&self) -> i32 {
        self.inner.height
    }

    /// Whether `p` lies inside the grid.
    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= 0 && p.x < self.inner.width && p.y >= 0 && p.y < self.inner.height
    }

    /// Row-major buffer index of `p`, or `None` outside the grid.
    #[inline]
    pub(crate) fn idx(&self, p: Point) -> Option<usize> {
        if self.contains(p) {
            Some((p.y as usize) * (self.inner.width as usize) + p.x as usize)
        } else {
            None
        }
    }

    /// The adjacent coordinate one step in `dir`, or `None` at the grid
    /// boundary. There is no wraparound.
    #[inline]
    pub fn neighbor(&self, p: Point, dir: Direction) -> Option<Point> {
        if !self.contains(p) {
            return None;
        }
        let n = p.step(dir);
        self.contains(n).then_some(n)
    }

    /// Locked read of the cell at `p`. Returns a snapshot copy, or `None`
    /// outside the grid.
    pub fn cell_at(&self, p: Point) -> Option<Cell> {
        let i = self.idx(p)?;
        let state = self.lock();
        Some(state.cells[i])
    }

    /// The current start endpoint, if chosen.
    pub fn start(&self) -> Option<Point> {
        self.lock().start
    }

    /// The current finish endpoint, if chosen.
    pub fn finish(&self) -> Option<Point> {
        self.lock().finish
    }

    /// Take the receiving end of the change feed.
    ///
    /// The feed yields the coordinate of every mutated cell, in FIFO
    /// order, possibly with duplicates dropped under backpressure. It is
    /// never closed by the grid. Returns `None` on every call after the
    /// first.
    pub fn updates(&self) -> Option<Receiver<Point>> {
        match self.inner.updates.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        }
    }

    /// Append the passage-accessible neighbors of `p` into `buf`.
    /// The caller clears `buf` beforehand.
    pub fn open_neighbors(&self, p: Point, buf: &mut Vec<Point>) {
        let Some(i) = self.idx(p) else { return };
        let passages = self.lock().cells[i].passages;
        for dir in Direction::ALL {
            if passages.is_open(dir) {
                if let Some(n) = self.neighbor(p, dir) {
                    buf.push(n);
                }
            }
        }
    }

    /// Restore the fully walled, unlabeled state.
    ///
    /// Clears every passage flag, every label, and both endpoints, then
    /// notifies every coordinate. The topology is untouched, so repeated
    /// generation runs reuse the same grid.
    pub fn reset(&self) {
        {
            let mut state = self.lock();
            for cell in &mut state.cells {
                *cell = Cell::default();
            }
            state.start = None;
            state.finish = None;
        }
        self.notify_all();
    }

    /// Handle a click-equivalent interaction on the cell at `p`.
    ///
    /// Three-state cycle: with no endpoints the cell becomes the start
    /// ("S"); with only a start it becomes the finish ("F") and routing is
    /// launched on a background thread; with both set, every label is
    /// cleared, the finish is unset, and the clicked cell becomes the new
    /// start. Clicking the start cell again while waiting for a finish is
    /// a no-op, since start and finish are never equal.
    pub fn click(&self, p: Point) {
        let Some(i) = self.idx(p) else { return };
        let mut launch_route = false;
        let mut notify_all = false;
        {
            let mut state = self.lock();
            if state.start.is_none() {
                state.start = Some(p);
                state.cells[i].label = Label::Start;
                log::info!("start = {p}");
            } else if state.finish.is_none() {
                if state.start == Some(p) {
                    return;
                }
                state.finish = Some(p);
                state.cells[i].label = Label::Finish;
                log::info!("finish = {p}");
                launch_route = true;
            } else {
                for cell in &mut state.cells {
                    cell.label = Label::None;
                }
                state.finish = None;
                state.start = Some(p);
                state.cells[i].label = Label::Start;
                log::info!("start = {p}");
                notify_all = true;
            }
        }
        if notify_all {
            self.notify_all();
        } else {
            self.notify(p);
        }
        if launch_route {
            let grid = self.clone();
            thread::spawn(move || {
                if let Err(err) = grid.route() {
                    log::error!("routing failed: {err}");
                }
            });
        }
    }

    // -----------------------------------------------------------------------
    // Crate-internal mutation primitives
    // -----------------------------------------------------------------------

    /// Open the passage from `p` toward `dir`, and the mirrored passage on
    /// the neighbor, as one atomic update under the state lock. A carve
    /// toward the grid boundary is a defined no-op.
    ///
    /// This is the only code path that sets passage flags, which keeps the
    /// symmetry invariant in one place. Each effective carve emits exactly
    /// one notification, for `p`.
    pub(crate) fn carve(&self, p: Point, dir: Direction) {
        let Some(n) = self.neighbor(p, dir) else {
            return;
        };
        let (Some(pi), Some(ni)) = (self.idx(p), self.idx(n)) else {
            return;
        };
        {
            let mut state = self.lock();
            state.cells[pi].passages.open(dir);
            state.cells[ni].passages.open(dir.opposite());
        }
        self.notify(p);
    }

    /// Set the label at `p` and notify. No-op outside the grid.
    pub(crate) fn set_label(&self, p: Point, label: Label) {
        let Some(i) = self.idx(p) else { return };
        {
            self.lock().cells[i].label = label;
        }
        self.notify(p);
    }

    pub(crate) fn notify(&self, p: Point) {
        self.inner.notifier.notify(p);
    }

    fn notify_all(&self) {
        for y in 0..self.inner.height {
            for x in 0..self.inner.width {
                self.notify(Point::new(x, y));
            }
        }
    }

    /// Lock the shared state, recovering from poisoning so that a panicked
    /// worker cannot wedge observers.
    pub(crate) fn lock(&self) -> MutexGuard<'_, State> {
        match self.inner.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    // -----------------------------------------------------------------------
    // Worker dispatch
    // -----------------------------------------------------------------------

    /// Claim the single-worker slot for a generation or routing run.
    ///
    /// At most one mutation algorithm runs at a time; a second claim while
    /// one is live fails with [`Error::Busy`]. The slot is released when
    /// the returned guard drops.
    pub(crate) fn begin_run(&self) -> Result<RunGuard<'_>, Error> {
        let mut state = self.lock();
        if state.busy {
            return Err(Error::Busy);
        }
        state.busy = true;
        Ok(RunGuard { grid: self })
    }

    /// Cooperative per-step sleep. Called with no lock held.
    pub(crate) fn pace(&self) {
        let d = self.inner.pacing.step;
        if !d.is_zero() {
            thread::sleep(d);
        }
    }

    /// The longer pause separating routing phases.
    pub(crate) fn phase_pause(&self) {
        let d = self.inner.pacing.phase_pause;
        if !d.is_zero() {
            thread::sleep(d);
        }
    }
}

impl std::fmt::Debug for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Grid")
            .field("width", &self.inner.width)
            .field("height", &self.inner.height)
            .finish_non_exhaustive()
    }
}

/// RAII claim on the one-algorithm-at-a-time slot.
pub(crate) struct RunGuard<'a> {
    grid: &'a Grid,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.grid.lock().busy = false;
    }
}
