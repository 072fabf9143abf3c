//! Shortest-path routing: BFS distance labeling, path reconstruction, and
//! display cleanup.

use std::collections::{HashMap, HashSet};

use crate::cell::Label;
use crate::error::Error;
use crate::geom::Point;
use crate::grid::Grid;

impl Grid {
    /// Compute and draw the shortest path between the start and finish.
    ///
    /// Runs in three phases, each feeding the change channel so an
    /// observer can animate progress:
    ///
    /// 1. An unweighted breadth-first flood fill labels every reachable
    ///    cell with its hop count from the start. The fill runs to
    ///    completion even after the finish is reached, so distances are
    ///    exact for the whole reachable component.
    /// 2. Walking back from the finish along strictly decreasing
    ///    distances draws the path.
    /// 3. Labels that are neither on the path nor an endpoint are
    ///    cleared, restoring a clean display around the drawn route.
    ///
    /// Returns the path from start to finish inclusive.
    ///
    /// # Errors
    ///
    /// [`Error::EndpointsNotSet`] before both endpoints are chosen,
    /// [`Error::UnreachableTarget`] when no open-passage chain links them
    /// (exploration labels are cleared first), and
    /// [`Error::InconsistentDistances`] if the distance map is corrupt —
    /// the walk aborts rather than looping forever. [`Error::Busy`] if
    /// another run holds the worker slot.
    pub fn route(&self) -> Result<Vec<Point>, Error> {
        let _run = self.begin_run()?;
        let (start, finish) = match (self.start(), self.finish()) {
            (Some(s), Some(f)) => (s, f),
            _ => return Err(Error::EndpointsNotSet),
        };
        log::debug!("routing {start} -> {finish}");

        let dist = self.flood_fill(start, finish);
        let Some(&finish_dist) = dist.get(&finish) else {
            self.cleanup(&[]);
            return Err(Error::UnreachableTarget { start, finish });
        };

        self.phase_pause();
        let path = self.backtrack(start, finish, finish_dist, &dist)?;
        self.cleanup(&path);
        log::info!("route complete: {} steps", path.len() - 1);
        Ok(path)
    }

    /// Phase 1: label hop counts outward from `start` until the frontier
    /// empties. The finish keeps its "F" label; every other explored cell
    /// shows its distance.
    fn flood_fill(&self, start: Point, finish: Point) -> HashMap<Point, i32> {
        let mut dist = HashMap::new();
        dist.insert(start, 0);

        // Distances are recorded when a cell is enqueued, so a cell with
        // two same-level parents cannot be enqueued twice.
        let mut nbuf = Vec::new();
        self.open_neighbors(start, &mut nbuf);
        let mut frontier = Vec::new();
        for &n in &nbuf {
            dist.insert(n, 1);
            frontier.push(n);
        }

        let mut d = 0;
        while !frontier.is_empty() {
            d += 1;
            self.pace();
            let mut next = Vec::new();
            for &p in &frontier {
                if p != finish {
                    self.set_label(p, Label::Distance(d));
                }
                nbuf.clear();
                self.open_neighbors(p, &mut nbuf);
                for &n in &nbuf {
                    if !dist.contains_key(&n) {
                        dist.insert(n, d + 1);
                        next.push(n);
                    }
                }
            }
            frontier = next;
        }
        dist
    }

    /// Phase 2: walk from the finish back to the start along neighbors at
    /// exactly one hop less, marking each path cell.
    fn backtrack(
        &self,
        start: Point,
        finish: Point,
        finish_dist: i32,
        dist: &HashMap<Point, i32>,
    ) -> Result<Vec<Point>, Error> {
        let mut path = vec![finish];
        let mut cur = finish;
        let mut here = finish_dist;
        let mut nbuf = Vec::new();
        while cur != start {
            nbuf.clear();
            self.open_neighbors(cur, &mut nbuf);
            let prev = nbuf
                .iter()
                .copied()
                .find(|n| dist.get(n) == Some(&(here - 1)));
            let Some(prev) = prev else {
                return Err(Error::InconsistentDistances {
                    at: cur,
                    expected: here - 1,
                });
            };
            if prev != start {
                self.set_label(prev, Label::Path);
            }
            path.push(prev);
            cur = prev;
            here -= 1;
            self.pace();
        }
        path.reverse();
        Ok(path)
    }

    /// Phase 3: clear every label that is neither on `path` nor an
    /// endpoint, notifying each cleared cell.
    fn cleanup(&self, path: &[Point]) {
        let keep: HashSet<Point> = path.iter().copied().collect();
        let mut cleared = Vec::new();
        {
            let mut state = self.lock();
            for y in 0..self.height() {
                for x in 0..self.width() {
                    let p = Point::new(x, y);
                    let Some(i) = self.idx(p) else { continue };
                    let cell = &mut state.cells[i];
                    if cell.label.is_none() || keep.contains(&p) {
                        continue;
                    }
                    if matches!(cell.label, Label::Start | Label::Finish) {
                        continue;
                    }
                    cell.label = Label::None;
                    cleared.push(p);
                }
            }
        }
        for p in cleared {
            self.notify(p);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Direction;
    use crate::grid::Pacing;
    use std::time::{Duration, Instant};

    fn grid(w: i32, h: i32) -> Grid {
        Grid::with_pacing(w, h, Pacing::NONE)
    }

    /// Carve every interior wall, producing a fully open grid.
    fn open_all(g: &Grid) {
        for y in 0..g.height() {
            for x in 0..g.width() {
                let p = Point::new(x, y);
                g.carve(p, Direction::East);
                g.carve(p, Direction::South);
            }
        }
    }

    /// Install endpoints directly, without the click interaction's
    /// background routing thread.
    fn set_endpoints(g: &Grid, start: Point, finish: Point) {
        let si = g.idx(start).unwrap();
        let fi = g.idx(finish).unwrap();
        let mut state = g.lock();
        state.start = Some(start);
        state.finish = Some(finish);
        state.cells[si].label = Label::Start;
        state.cells[fi].label = Label::Finish;
    }

    fn manhattan(a: Point, b: Point) -> i32 {
        (a.x - b.x).abs() + (a.y - b.y).abs()
    }

    #[test]
    fn fully_open_grid_routes_at_manhattan_distance() {
        let g = grid(3, 3);
        open_all(&g);
        let start = Point::ZERO;
        let finish = Point::new(2, 2);
        set_endpoints(&g, start, finish);

        let path = g.route().unwrap();
        assert_eq!(path.first(), Some(&start));
        assert_eq!(path.last(), Some(&finish));
        // Distance 4, so five cells including both endpoints.
        assert_eq!(manhattan(start, finish), 4);
        assert_eq!(path.len(), 5);
    }

    #[test]
    fn path_steps_are_passage_connected() {
        use rand::SeedableRng;
        use rand::rngs::StdRng;

        let g = grid(8, 8);
        g.sidewinder(&mut StdRng::seed_from_u64(11)).unwrap();
        let start = Point::ZERO;
        let finish = Point::new(7, 7);
        set_endpoints(&g, start, finish);

        let path = g.route().unwrap();
        for pair in path.windows(2) {
            let delta = pair[1] - pair[0];
            let dir = Direction::ALL
                .into_iter()
                .find(|d| d.delta() == delta)
                .expect("path steps are adjacent");
            assert!(g.cell_at(pair[0]).unwrap().is_open(dir));
            assert!(g.cell_at(pair[1]).unwrap().is_open(dir.opposite()));
        }
    }

    #[test]
    fn path_length_matches_bfs_distance() {
        use rand::SeedableRng;
        use rand::rngs::StdRng;

        // In a perfect maze the route is the unique path between the
        // endpoints, so its length equals the finish's hop count; on a
        // fully open grid it equals the Manhattan distance. Both cases:
        let g = grid(6, 4);
        g.binary_tree(&mut StdRng::seed_from_u64(3)).unwrap();
        let start = Point::new(0, 3);
        let finish = Point::new(5, 0);
        set_endpoints(&g, start, finish);
        let path = g.route().unwrap();
        assert!(path.len() as i32 - 1 >= manhattan(start, finish));

        let g = grid(5, 5);
        open_all(&g);
        set_endpoints(&g, Point::new(1, 1), Point::new(4, 3));
        let path = g.route().unwrap();
        assert_eq!(path.len() as i32 - 1, 5);
    }

    #[test]
    fn labels_settle_to_path_and_endpoints_only() {
        let g = grid(3, 3);
        open_all(&g);
        let start = Point::ZERO;
        let finish = Point::new(2, 2);
        set_endpoints(&g, start, finish);
        let path = g.route().unwrap();

        for y in 0..3 {
            for x in 0..3 {
                let p = Point::new(x, y);
                let label = g.cell_at(p).unwrap().label;
                if p == start {
                    assert_eq!(label, Label::Start);
                } else if p == finish {
                    assert_eq!(label, Label::Finish);
                } else if path.contains(&p) {
                    assert_eq!(label, Label::Path);
                } else {
                    assert_eq!(label, Label::None, "{p} kept a stale label");
                }
            }
        }
    }

    #[test]
    fn unreachable_finish_is_an_explicit_error() {
        // 2×1 grid, nothing carved.
        let g = grid(2, 1);
        let start = Point::ZERO;
        let finish = Point::new(1, 0);
        set_endpoints(&g, start, finish);
        assert_eq!(
            g.route().err(),
            Some(Error::UnreachableTarget { start, finish })
        );
        // Endpoint labels survive the failed run.
        assert_eq!(g.cell_at(start).unwrap().label, Label::Start);
        assert_eq!(g.cell_at(finish).unwrap().label, Label::Finish);
    }

    #[test]
    fn unreachable_finish_clears_exploration_labels() {
        // Start's component is explored and labeled, then restored.
        let g = grid(4, 1);
        g.carve(Point::ZERO, Direction::East);
        set_endpoints(&g, Point::ZERO, Point::new(3, 0));
        assert!(matches!(g.route(), Err(Error::UnreachableTarget { .. })));
        assert_eq!(g.cell_at(Point::new(1, 0)).unwrap().label, Label::None);
        assert_eq!(g.cell_at(Point::new(2, 0)).unwrap().label, Label::None);
    }

    #[test]
    fn routing_without_endpoints_fails_fast() {
        let g = grid(3, 3);
        open_all(&g);
        assert_eq!(g.route().err(), Some(Error::EndpointsNotSet));

        g.click(Point::ZERO); // start only
        assert_eq!(g.route().err(), Some(Error::EndpointsNotSet));
    }

    #[test]
    fn corrupt_distance_map_aborts_instead_of_looping() {
        let g = grid(3, 1);
        open_all(&g);
        let start = Point::ZERO;
        let finish = Point::new(2, 0);
        set_endpoints(&g, start, finish);

        // A distance map with a gap: the finish claims distance 5 but no
        // neighbor sits at 4.
        let dist = HashMap::from([(start, 0), (Point::new(1, 0), 1), (finish, 5)]);
        let err = g.backtrack(start, finish, 5, &dist).unwrap_err();
        assert_eq!(
            err,
            Error::InconsistentDistances {
                at: finish,
                expected: 4
            }
        );
    }

    #[test]
    fn click_cycle_drives_routing() {
        let g = grid(3, 3);
        open_all(&g);
        let start = Point::ZERO;
        let finish = Point::new(2, 2);

        g.click(start);
        assert_eq!(g.start(), Some(start));
        assert_eq!(g.cell_at(start).unwrap().label, Label::Start);

        // Clicking the start again must not make it the finish.
        g.click(start);
        assert_eq!(g.finish(), None);

        g.click(finish);
        assert_eq!(g.finish(), Some(finish));

        // Routing runs on a background thread; wait for the drawn path,
        // then for the worker slot to free up (route fully finished).
        let deadline = Instant::now() + Duration::from_secs(5);
        let path_drawn = |g: &Grid| {
            (0..3).any(|y| {
                (0..3).any(|x| g.cell_at(Point::new(x, y)).unwrap().label == Label::Path)
            })
        };
        while !path_drawn(&g) {
            assert!(Instant::now() < deadline, "routing never drew a path");
            std::thread::sleep(Duration::from_millis(5));
        }
        loop {
            if let Ok(guard) = g.begin_run() {
                drop(guard);
                break;
            }
            assert!(Instant::now() < deadline, "routing never released the slot");
            std::thread::sleep(Duration::from_millis(5));
        }

        // Third click: all labels cleared, clicked cell is the new start.
        let restart = Point::new(1, 1);
        g.click(restart);
        assert_eq!(g.start(), Some(restart));
        assert_eq!(g.finish(), None);
        for y in 0..3 {
            for x in 0..3 {
                let p = Point::new(x, y);
                let expected = if p == restart { Label::Start } else { Label::None };
                assert_eq!(g.cell_at(p).unwrap().label, expected);
            }
        }
    }

    #[test]
    fn route_result_is_busy_while_another_run_holds_the_slot() {
        let g = grid(3, 3);
        open_all(&g);
        set_endpoints(&g, Point::ZERO, Point::new(2, 2));
        let guard = g.begin_run().unwrap();
        assert_eq!(g.route().err(), Some(Error::Busy));
        drop(guard);
        assert!(g.route().is_ok());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn routed_grid_snapshot_serializes() {
        use crate::cell::Cell;

        let g = grid(2, 2);
        open_all(&g);
        set_endpoints(&g, Point::ZERO, Point::new(1, 1));
        g.route().unwrap();
        let snapshot: Vec<Cell> = (0..2)
            .flat_map(|y| (0..2).map(move |x| Point::new(x, y)))
            .map(|p| g.cell_at(p).unwrap())
            .collect();
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: Vec<Cell> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }
}
