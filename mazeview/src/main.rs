//! mazeview — a terminal observer for the maze-grid core.
//!
//! Generates a maze on a worker thread, then clicks the two opposite
//! corners so the core routes between them, while this thread drains the
//! change feed and redraws the ASCII rendition. Usage:
//!
//! ```text
//! mazeview [WIDTH] [HEIGHT] [binarytree|sidewinder]
//! ```

use std::error::Error;
use std::io::{self, Write};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use crossterm::{cursor, execute, terminal};
use maze_grid::{Direction, Grid, Point};

enum Algo {
    BinaryTree,
    Sidewinder,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let width: i32 = args.next().map_or(Ok(10), |a| a.parse())?;
    let height: i32 = args.next().map_or(Ok(10), |a| a.parse())?;
    let algo = match args.next().as_deref() {
        None | Some("sidewinder") => Algo::Sidewinder,
        Some("binarytree") => Algo::BinaryTree,
        Some(other) => return Err(format!("unknown algorithm: {other}").into()),
    };

    let grid = Grid::new(width, height);
    let updates = grid.updates().ok_or("change feed already taken")?;

    let worker = grid.clone();
    thread::spawn(move || {
        let mut rng = rand::rng();
        let result = match algo {
            Algo::BinaryTree => worker.binary_tree(&mut rng),
            Algo::Sidewinder => worker.sidewinder(&mut rng),
        };
        if let Err(err) = result {
            log::error!("generation failed: {err}");
            return;
        }
        // Route between opposite corners once the maze is done.
        worker.click(Point::new(0, worker.height() - 1));
        worker.click(Point::new(worker.width() - 1, 0));
    });

    observe(&grid, &updates)
}

/// Drain the feed and redraw. Bursts of notifications are coalesced into
/// a single redraw per drain.
fn observe(grid: &Grid, updates: &Receiver<Point>) -> Result<(), Box<dyn Error>> {
    let mut stdout = io::stdout();
    execute!(
        stdout,
        terminal::Clear(terminal::ClearType::All),
        cursor::Hide
    )?;
    draw(grid, &mut stdout)?;
    loop {
        match updates.recv_timeout(Duration::from_millis(100)) {
            Ok(_) => {
                while updates.try_recv().is_ok() {}
                draw(grid, &mut stdout)?;
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    execute!(stdout, cursor::Show)?;
    Ok(())
}

/// Render the grid as ASCII walls, labels centered in each cell.
fn draw(grid: &Grid, out: &mut impl Write) -> Result<(), Box<dyn Error>> {
    execute!(out, cursor::MoveTo(0, 0))?;

    // Top border.
    let mut line = String::from("+");
    for _ in 0..grid.width() {
        line.push_str("---+");
    }
    writeln!(out, "{line}\r")?;

    for y in 0..grid.height() {
        let mut body = String::from("|");
        let mut south = String::from("+");
        for x in 0..grid.width() {
            let p = Point::new(x, y);
            let cell = grid.cell_at(p).ok_or("cell out of bounds")?;
            body.push_str(&format!("{:^3}", cell.label.to_string()));
            body.push(if cell.is_open(Direction::East) { ' ' } else { '|' });
            south.push_str(if cell.is_open(Direction::South) {
                "   +"
            } else {
                "---+"
            });
        }
        writeln!(out, "{body}\r")?;
        writeln!(out, "{south}\r")?;
    }
    writeln!(out, "Ctrl-C to quit\r")?;
    out.flush()?;
    Ok(())
}
