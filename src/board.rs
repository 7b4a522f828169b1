//! Board state replayed from a game tree path.
//!
//! A [`Board`] is never stored in the tree. It is recomputed by applying the
//! properties of every node from the root down to the cursor: setup stones,
//! moves with captures, player to move, and the markup of the last node.

use std::fmt;

use crate::constants::{DEFAULT_BOARD_SIZE, DIAGRAM_BLACK, DIAGRAM_EMPTY, DIAGRAM_WHITE};
use crate::property::Property;
use crate::values::{Color, Coord, CoordList, Move};

/// A markup symbol drawn on a point.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mark {
    Circle,
    Cross,
    Selected,
    Square,
    Triangle,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    pub width: usize,
    pub height: usize,
    cells: Vec<Option<Color>>,
    /// Stones captured by Black.
    pub black_captures: usize,
    /// Stones captured by White.
    pub white_captures: usize,
    pub player_turn: Color,
    pub move_number: i64,
    /// Markup on the last node applied.
    pub marks: Vec<(Coord, Mark)>,
}

impl Board {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width * height],
            black_captures: 0,
            white_captures: 0,
            player_turn: Color::Black,
            move_number: 0,
            marks: Vec::new(),
        }
    }

    /// Replay the property lists of a root-to-node path.
    ///
    /// The board size comes from the first `SZ` found on the path, falling
    /// back to the default size.
    pub fn from_path<'a>(path: impl IntoIterator<Item = &'a [Property]>) -> Self {
        let path: Vec<&[Property]> = path.into_iter().collect();
        let size = path
            .iter()
            .flat_map(|props| props.iter())
            .find_map(|p| match p {
                Property::SZ(size) => Some(*size),
                _ => None,
            });
        let mut board = match size {
            Some(size) => Board::new(size.width, size.height),
            None => Board::new(DEFAULT_BOARD_SIZE, DEFAULT_BOARD_SIZE),
        };
        for props in path {
            board.apply_node(props);
        }
        board
    }

    /// Apply one node: setup, then moves, then turn and numbering overrides.
    pub fn apply_node(&mut self, properties: &[Property]) {
        self.marks.clear();
        for p in properties {
            match p {
                Property::AB(list) => self.set_stones(list, Some(Color::Black)),
                Property::AW(list) => self.set_stones(list, Some(Color::White)),
                Property::AE(list) => self.set_stones(list, None),
                _ => {}
            }
        }
        for p in properties {
            if let Some((color, mv)) = p.as_move() {
                if let Move::Play(c) = mv {
                    self.record_move(c, color);
                }
                self.move_number += 1;
                self.player_turn = color.opponent();
            }
        }
        for p in properties {
            match p {
                Property::PL(color) => self.player_turn = *color,
                Property::MN(n) => self.move_number = *n,
                Property::CR(list) => self.add_marks(list, Mark::Circle),
                Property::MA(list) => self.add_marks(list, Mark::Cross),
                Property::SL(list) => self.add_marks(list, Mark::Selected),
                Property::SQ(list) => self.add_marks(list, Mark::Square),
                Property::TR(list) => self.add_marks(list, Mark::Triangle),
                _ => {}
            }
        }
    }

    fn set_stones(&mut self, list: &CoordList, stone: Option<Color>) {
        for c in list.to_coords() {
            if self.contains(c) {
                let i = self.idx(c);
                self.cells[i] = stone;
            }
        }
    }

    fn add_marks(&mut self, list: &CoordList, mark: Mark) {
        self.marks
            .extend(list.to_coords().into_iter().map(|c| (c, mark)));
    }

    pub fn contains(&self, c: Coord) -> bool {
        c.x < self.width && c.y < self.height
    }

    fn idx(&self, c: Coord) -> usize {
        c.y * self.width + c.x
    }

    pub fn get(&self, c: Coord) -> Option<Color> {
        if !self.contains(c) {
            return None;
        }
        self.cells[self.idx(c)]
    }

    pub fn stone_count(&self, color: Color) -> usize {
        self.cells.iter().filter(|s| **s == Some(color)).count()
    }

    pub fn mark_at(&self, c: Coord) -> Option<Mark> {
        self.marks.iter().find(|(m, _)| *m == c).map(|(_, mark)| *mark)
    }

    fn neighbors(&self, c: Coord) -> impl Iterator<Item = Coord> + '_ {
        let mut v = Vec::new();
        if c.x > 0 {
            v.push(Coord::new(c.x - 1, c.y));
        }
        if c.x + 1 < self.width {
            v.push(Coord::new(c.x + 1, c.y));
        }
        if c.y > 0 {
            v.push(Coord::new(c.x, c.y - 1));
        }
        if c.y + 1 < self.height {
            v.push(Coord::new(c.x, c.y + 1));
        }
        v.into_iter()
    }

    /// Place a stone as a record does: occupied points are overwritten and a
    /// group left without liberties is removed and credited to the opponent.
    fn record_move(&mut self, c: Coord, color: Color) {
        if !self.contains(c) {
            return;
        }
        let idx = self.idx(c);
        self.cells[idx] = Some(color);
        let captured = self.remove_dead_neighbors(c, color.opponent());
        self.credit(color, captured);
        if self.group_liberties(c) == 0 {
            let mut own = Vec::new();
            let lost = self.collect_group(c, &mut own);
            for p in own {
                let i = self.idx(p);
                self.cells[i] = None;
            }
            self.credit(color.opponent(), lost);
        }
    }

    fn credit(&mut self, color: Color, stones: usize) {
        match color {
            Color::Black => self.black_captures += stones,
            Color::White => self.white_captures += stones,
        }
    }

    fn remove_dead_neighbors(&mut self, c: Coord, opp: Color) -> usize {
        let mut total_captures = 0;
        let mut to_remove: Vec<Coord> = Vec::new();
        let neighbors: Vec<Coord> = self.neighbors(c).collect();
        for n in neighbors {
            if self.get(n) == Some(opp) && !to_remove.contains(&n) && self.group_liberties(n) == 0 {
                total_captures += self.collect_group(n, &mut to_remove);
            }
        }
        for r in to_remove {
            let i = self.idx(r);
            self.cells[i] = None;
        }
        total_captures
    }

    /// Play a move under the rules: the point must be empty and the move must
    /// not be suicide. Illegal moves leave the board unchanged.
    pub fn play(&mut self, c: Coord, color: Color) -> MoveResult {
        if !self.contains(c) || self.get(c).is_some() {
            return MoveResult::illegal();
        }
        let idx = self.idx(c);
        self.cells[idx] = Some(color);

        let mut trial = self.clone();
        let total_captures = trial.remove_dead_neighbors(c, color.opponent());
        if total_captures == 0 && trial.group_liberties(c) == 0 {
            self.cells[idx] = None; // undo suicidal move
            return MoveResult {
                legal: false,
                captures: 0,
                suicide: true,
            };
        }
        *self = trial;
        self.credit(color, total_captures);
        self.move_number += 1;
        self.player_turn = color.opponent();
        MoveResult {
            legal: true,
            captures: total_captures,
            suicide: false,
        }
    }

    /// Whether `color` may play at `c`: the point is empty and the stone
    /// would have a liberty after captures. Ko is not checked.
    pub fn is_legal_move(&self, color: Color, c: Coord) -> bool {
        self.clone().play(c, color).legal
    }

    fn collect_group(&self, c: Coord, out: &mut Vec<Coord>) -> usize {
        let Some(color) = self.get(c) else {
            return 0;
        };
        let mut stack = vec![c];
        let mut visited = vec![false; self.width * self.height];
        let mut count = 0;
        while let Some(p) = stack.pop() {
            let i = self.idx(p);
            if visited[i] {
                continue;
            }
            visited[i] = true;
            if self.get(p) == Some(color) {
                out.push(p);
                count += 1;
                for n in self.neighbors(p) {
                    let ni = self.idx(n);
                    if !visited[ni] && self.get(n) == Some(color) {
                        stack.push(n);
                    }
                }
            }
        }
        count
    }

    fn group_liberties(&self, c: Coord) -> usize {
        let Some(color) = self.get(c) else {
            return 0;
        };
        let mut stack = vec![c];
        let mut visited = vec![false; self.width * self.height];
        let mut liberties = 0;
        while let Some(p) = stack.pop() {
            let i = self.idx(p);
            if visited[i] {
                continue;
            }
            visited[i] = true;
            if self.get(p) == Some(color) {
                for n in self.neighbors(p) {
                    let ni = self.idx(n);
                    match self.get(n) {
                        None if !visited[ni] => {
                            visited[ni] = true;
                            liberties += 1;
                        }
                        Some(s) if s == color && !visited[ni] => stack.push(n),
                        _ => {}
                    }
                }
            }
        }
        liberties
    }
}

#[derive(Debug)]
pub struct MoveResult {
    pub legal: bool,
    pub captures: usize,
    pub suicide: bool,
}

impl MoveResult {
    fn illegal() -> Self {
        MoveResult {
            legal: false,
            captures: 0,
            suicide: false,
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height {
            for x in 0..self.width {
                let ch = match self.get(Coord::new(x, y)) {
                    Some(Color::Black) => DIAGRAM_BLACK,
                    Some(Color::White) => DIAGRAM_WHITE,
                    None => DIAGRAM_EMPTY,
                };
                write!(f, "{ch} ")?;
            }
            writeln!(f)?;
        }
        writeln!(
            f,
            "move {}, {:?} to play, captures B:{} W:{}",
            self.move_number, self.player_turn, self.black_captures, self.white_captures
        )
    }
}
