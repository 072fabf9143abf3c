//! **maze-grid** — rectangular maze generation and shortest-path routing
//! with an incremental change feed.
//!
//! This crate is the computational core of a maze visualizer. It owns the
//! grid, carves passages with two classic perfect-maze algorithms
//! (BinaryTree and Sidewinder), routes between a start and a finish cell
//! with breadth-first search, and publishes "this coordinate changed"
//! events so a rendering front end can animate progress instead of
//! polling the whole grid.
//!
//! The [`Grid`] handle is cheap to clone and safe to share across
//! threads: workers mutate cells under an internal lock while observers
//! read snapshots through [`Grid::cell_at`] and drain the feed from
//! [`Grid::updates`].
//!
//! ```no_run
//! use maze_grid::{Grid, Pacing};
//!
//! let grid = Grid::with_pacing(10, 10, Pacing::NONE);
//! let updates = grid.updates().expect("feed taken once");
//!
//! let worker = grid.clone();
//! std::thread::spawn(move || {
//!     let mut rng = rand::rng();
//!     if let Err(err) = worker.sidewinder(&mut rng) {
//!         log::error!("generation failed: {err}");
//!     }
//! });
//!
//! while let Ok(p) = updates.recv() {
//!     let cell = grid.cell_at(p).expect("feed yields in-bounds points");
//!     println!("{p} changed: {cell:?}");
//! }
//! ```

mod cell;
mod error;
mod geom;
mod grid;
mod mapgen;
mod notify;
mod route;

pub use cell::{Cell, Label, Passages};
pub use error::Error;
pub use geom::{Direction, Point};
pub use grid::{Grid, Pacing};
