use core::cmp::Ordering;
use std::collections::BinaryHeap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use soccer_core::{Pathfinder, RobotId, Route, RouteError, Vec2};

/// Axis-aligned rectangle in field coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    /// Normalizes the corners so `min` is bottom-left.
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self {
            min: Vec2::new(a.x.min(b.x), a.y.min(b.y)),
            max: Vec2::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    pub fn around(center: Vec2, half_extent: f32) -> Self {
        let h = Vec2::new(half_extent, half_extent);
        Self::new(center - h, center + h)
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct Cell {
    x: i32,
    y: i32,
}

#[derive(Debug)]
struct OpenNode {
    f: u32,
    g: u32,
    cell: Cell,
    tie: u64,
}

impl OpenNode {
    fn key(&self) -> (u32, u32, Cell, u64) {
        (self.f, self.g, self.cell, self.tie)
    }
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for OpenNode {}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap on (f, g, cell, tie).
        other.key().cmp(&self.key())
    }
}

/// Occupancy grid over the playing field, centered on the field origin.
///
/// Searches with 8-connected A*; diagonal moves may not cut the corner of a blocked cell.
/// Routes keep the exact requested endpoints and use cell centers in between.
#[derive(Debug, Clone)]
pub struct FieldGrid {
    origin: Vec2,
    cols: i32,
    rows: i32,
    cell_size: f32,
    blocked: Vec<bool>,
}

const STRAIGHT: u32 = 10;
const DIAGONAL: u32 = 14;

impl FieldGrid {
    /// Grid covering a `length` x `width` field (meters). Degenerate sizes collapse to one cell.
    pub fn new(length: f32, width: f32, cell_size: f32) -> Self {
        let cell_size = if cell_size > 0.0 { cell_size } else { 0.1 };
        let cols = ((length.max(0.0) / cell_size).ceil() as i32).max(1);
        let rows = ((width.max(0.0) / cell_size).ceil() as i32).max(1);
        Self {
            origin: Vec2::new(-(cols as f32) * cell_size / 2.0, -(rows as f32) * cell_size / 2.0),
            cols,
            rows,
            cell_size,
            blocked: vec![false; (cols * rows) as usize],
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.cols as u32, self.rows as u32)
    }

    /// Field extent as a rectangle.
    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.origin,
            self.origin
                + Vec2::new(
                    self.cols as f32 * self.cell_size,
                    self.rows as f32 * self.cell_size,
                ),
        )
    }

    pub fn contains(&self, p: Vec2) -> bool {
        self.point_to_cell(p).is_some()
    }

    pub fn set_blocked(&mut self, x: i32, y: i32, blocked: bool) {
        if let Some(idx) = self.idx(Cell { x, y }) {
            self.blocked[idx] = blocked;
        }
    }

    /// Block every cell whose center lies inside `rect`.
    pub fn block_rect(&mut self, rect: Rect) {
        for y in 0..self.rows {
            for x in 0..self.cols {
                let cell = Cell { x, y };
                if rect.contains(self.cell_center(cell)) {
                    self.set_blocked(x, y, true);
                }
            }
        }
    }

    pub fn clear(&mut self) {
        self.blocked.iter_mut().for_each(|b| *b = false);
    }

    /// Points outside the field count as blocked.
    pub fn is_blocked_at(&self, p: Vec2) -> bool {
        self.point_to_cell(p)
            .and_then(|cell| self.idx(cell))
            .map(|idx| self.blocked[idx])
            .unwrap_or(true)
    }

    fn in_bounds(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.y >= 0 && cell.x < self.cols && cell.y < self.rows
    }

    fn idx(&self, cell: Cell) -> Option<usize> {
        if !self.in_bounds(cell) {
            return None;
        }
        Some((cell.y * self.cols + cell.x) as usize)
    }

    fn cell_from_idx(&self, idx: usize) -> Cell {
        let idx = idx as i32;
        Cell {
            x: idx % self.cols,
            y: idx / self.cols,
        }
    }

    fn point_to_cell(&self, p: Vec2) -> Option<Cell> {
        let local = p - self.origin;
        let mut cell = Cell {
            x: (local.x / self.cell_size).floor() as i32,
            y: (local.y / self.cell_size).floor() as i32,
        };
        // The far field lines belong to the last row/column.
        if local.x == self.cols as f32 * self.cell_size {
            cell.x -= 1;
        }
        if local.y == self.rows as f32 * self.cell_size {
            cell.y -= 1;
        }
        self.in_bounds(cell).then_some(cell)
    }

    fn cell_center(&self, cell: Cell) -> Vec2 {
        self.origin
            + Vec2::new(
                (cell.x as f32 + 0.5) * self.cell_size,
                (cell.y as f32 + 0.5) * self.cell_size,
            )
    }

    fn is_free(&self, cell: Cell) -> bool {
        self.idx(cell).map(|idx| !self.blocked[idx]).unwrap_or(false)
    }

    fn heuristic(a: Cell, b: Cell) -> u32 {
        let dx = (a.x - b.x).unsigned_abs();
        let dy = (a.y - b.y).unsigned_abs();
        STRAIGHT * dx.max(dy) + (DIAGONAL - STRAIGHT) * dx.min(dy)
    }

    fn neighbors(&self, cell: Cell) -> impl Iterator<Item = (Cell, u32)> + '_ {
        // Fixed order for determinism: N, E, S, W, then diagonals.
        const STEPS: [(i32, i32); 8] = [
            (0, -1),
            (1, 0),
            (0, 1),
            (-1, 0),
            (1, -1),
            (1, 1),
            (-1, 1),
            (-1, -1),
        ];
        STEPS.into_iter().filter_map(move |(dx, dy)| {
            let next = Cell {
                x: cell.x + dx,
                y: cell.y + dy,
            };
            if !self.is_free(next) {
                return None;
            }
            if dx != 0 && dy != 0 {
                let side_a = Cell { x: cell.x + dx, y: cell.y };
                let side_b = Cell { x: cell.x, y: cell.y + dy };
                if !self.is_free(side_a) || !self.is_free(side_b) {
                    return None;
                }
                return Some((next, DIAGONAL));
            }
            Some((next, STRAIGHT))
        })
    }

    fn reconstruct(&self, came_from: &[Option<usize>], mut current: usize) -> Vec<Cell> {
        let mut out = vec![self.cell_from_idx(current)];
        while let Some(prev) = came_from[current] {
            current = prev;
            out.push(self.cell_from_idx(current));
        }
        out.reverse();
        out
    }

    /// The start cell may be blocked so a robot standing in a blocked area can leave it.
    fn a_star(&self, start: Cell, goal: Cell) -> Option<Vec<Cell>> {
        let start_idx = self.idx(start)?;
        let goal_idx = self.idx(goal)?;
        if self.blocked[goal_idx] {
            return None;
        }

        let len = self.blocked.len();
        let mut g_score = vec![u32::MAX; len];
        let mut came_from: Vec<Option<usize>> = vec![None; len];
        let mut open = BinaryHeap::new();
        let mut tie: u64 = 0;

        g_score[start_idx] = 0;
        open.push(OpenNode {
            f: Self::heuristic(start, goal),
            g: 0,
            cell: start,
            tie,
        });

        while let Some(node) = open.pop() {
            if node.cell == goal {
                return Some(self.reconstruct(&came_from, goal_idx));
            }

            let node_idx = self.idx(node.cell)?;
            if node.g != g_score[node_idx] {
                // Stale heap entry.
                continue;
            }

            for (next, cost) in self.neighbors(node.cell) {
                let Some(next_idx) = self.idx(next) else {
                    continue;
                };
                let tentative = node.g.saturating_add(cost);
                if tentative >= g_score[next_idx] {
                    continue;
                }

                came_from[next_idx] = Some(node_idx);
                g_score[next_idx] = tentative;
                tie += 1;
                open.push(OpenNode {
                    f: tentative.saturating_add(Self::heuristic(next, goal)),
                    g: tentative,
                    cell: next,
                    tie,
                });
            }
        }

        None
    }
}

impl Pathfinder for FieldGrid {
    fn find_route(&self, _robot: RobotId, from: Vec2, to: Vec2) -> Result<Route, RouteError> {
        let start = self
            .point_to_cell(from)
            .ok_or(RouteError::OutsideField { point: from })?;
        let goal = self
            .point_to_cell(to)
            .ok_or(RouteError::OutsideField { point: to })?;
        let cells = self
            .a_star(start, goal)
            .ok_or(RouteError::Unreachable { from, to })?;

        let inner = cells.len().saturating_sub(2);
        let mut waypoints = Vec::with_capacity(inner + 2);
        waypoints.push(from);
        waypoints.extend(
            cells
                .into_iter()
                .skip(1)
                .take(inner)
                .map(|cell| self.cell_center(cell)),
        );
        waypoints.push(to);
        Ok(Route::new(waypoints))
    }
}
