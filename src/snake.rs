use crate::board::Point;
use Direction::*;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right
}

impl Direction {
    /// The velocity vector, with y growing downwards.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Up => (0, -1),
            Down => (0, 1),
            Left => (-1, 0),
            Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Up => Down,
            Down => Up,
            Left => Right,
            Right => Left,
        }
    }
}

/// Result of moving the snake one cell.
pub struct Shift {
    pub new_head: Point,
    /// Where the last tail segment was before the move. Growth reattaches here.
    pub tail_end: Point,
}

pub struct Snake {
    head: Point,
    // Index 0 is the segment right behind the head
    tail: Vec<Point>,
}

impl Snake {
    /// Lays out `size` cells ending at `head`, with the body trailing behind
    /// the given heading.
    pub fn new(head: Point, size: usize, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();

        let tail = (1..size as i32)
            .map(|i| Point::new(head.x - dx * i, head.y - dy * i))
            .collect();
        Snake { head, tail }
    }

    pub fn head(&self) -> Point {
        self.head
    }

    pub fn tail(&self) -> &[Point] {
        &self.tail
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.tail.len() + 1
    }

    /// Head first, then the tail in order.
    pub fn cells(&self) -> impl Iterator<Item = Point> + '_ {
        std::iter::once(self.head).chain(self.tail.iter().copied())
    }

    pub fn shift(&mut self, direction: Direction) -> Shift {
        let tail_end = self.tail.last().copied().unwrap_or(self.head);

        // Walk from the tip towards the head so no segment is read after it moved
        for i in (1..self.tail.len()).rev() {
            self.tail[i] = self.tail[i - 1];
        }
        if let Some(first) = self.tail.first_mut() {
            *first = self.head;
        }

        self.head = self.head.offset(direction.delta());
        Shift { new_head: self.head, tail_end }
    }

    pub fn grow(&mut self, at: Point) {
        self.tail.push(at);
    }

    pub fn bites_itself(&self) -> bool {
        self.tail.contains(&self.head)
    }

    #[cfg(test)]
    pub(crate) fn from_parts(head: Point, tail: Vec<Point>) -> Self {
        Snake { head, tail }
    }
}
