//! Maze generation algorithms: [`Grid::binary_tree`] and
//! [`Grid::sidewinder`].
//!
//! Both carve a perfect maze (a spanning tree of the cells) into a fully
//! walled grid. They differ in structural bias: BinaryTree tends toward
//! long north and east corridors, Sidewinder toward more uniform run
//! lengths. The random source is injected, so a fixed seed reproduces a
//! maze exactly.

use rand::Rng;

use crate::error::Error;
use crate::geom::{Direction, Point};
use crate::grid::Grid;

impl Grid {
    /// Carve a maze with the BinaryTree algorithm.
    ///
    /// Visits every cell in row-major order (x outer, y inner). Cells on
    /// the top row must carve east, cells on the east edge must carve
    /// north, the top-right corner carves nothing, and every other cell
    /// flips an unbiased coin between the two. Each carve feeds the
    /// change channel; pacing sleeps between steps.
    ///
    /// Fails with [`Error::Busy`] if another run is in progress.
    pub fn binary_tree<R: Rng>(&self, rng: &mut R) -> Result<(), Error> {
        let _run = self.begin_run()?;
        log::debug!("binary tree on {}x{}", self.width(), self.height());
        for x in 0..self.width() {
            for y in 0..self.height() {
                self.pace();
                let p = Point::new(x, y);
                let north = self.neighbor(p, Direction::North).is_some();
                let east = self.neighbor(p, Direction::East).is_some();
                match (north, east) {
                    // Top-right corner: nothing to carve.
                    (false, false) => {}
                    (false, true) => self.carve(p, Direction::East),
                    (true, false) => self.carve(p, Direction::North),
                    (true, true) => {
                        if rng.random_bool(0.5) {
                            self.carve(p, Direction::East);
                        } else {
                            self.carve(p, Direction::North);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Carve a maze with the Sidewinder algorithm.
    ///
    /// Works row by row, left to right, accumulating a run of cells
    /// carved together since the last northward carve. At the row's right
    /// edge the run is closed: a uniformly random member carves north (a
    /// no-op on the top row). Cells on the top row must carve east;
    /// elsewhere a coin decides between closing the run and extending it
    /// eastward. Every row therefore ends with its run closed, which
    /// links it to the row above.
    ///
    /// Fails with [`Error::Busy`] if another run is in progress.
    pub fn sidewinder<R: Rng>(&self, rng: &mut R) -> Result<(), Error> {
        let _run = self.begin_run()?;
        log::debug!("sidewinder on {}x{}", self.width(), self.height());
        for y in 0..self.height() {
            let mut run: Vec<Point> = Vec::new();
            for x in 0..self.width() {
                self.pace();
                let p = Point::new(x, y);
                run.push(p);

                if self.neighbor(p, Direction::East).is_none() {
                    self.close_run(&mut run, rng);
                    continue;
                }
                if self.neighbor(p, Direction::North).is_none() {
                    self.carve(p, Direction::East);
                    continue;
                }
                if rng.random_bool(0.5) {
                    self.close_run(&mut run, rng);
                } else {
                    self.carve(p, Direction::East);
                }
            }
        }
        Ok(())
    }

    /// Carve north from a uniformly random member of `run`, then empty it.
    fn close_run<R: Rng>(&self, run: &mut Vec<Point>, rng: &mut R) {
        let p = run[rng.random_range(0..run.len())];
        self.carve(p, Direction::North);
        run.clear();
    }
}
