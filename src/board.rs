/// A grid coordinate. Border cells sit at -1 and `tile_count`, so it's signed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Point { x, y }
    }

    pub fn offset(self, (dx, dy): (i32, i32)) -> Self {
        Point { x: self.x + dx, y: self.y + dy }
    }
}

/// The playable `tile_count x tile_count` square and the lethal ring around it.
pub struct Board {
    tile_count: i32,
    borders: Vec<Point>,
}

impl Board {
    pub fn new(tile_count: u32) -> Self {
        let tile_count = tile_count as i32;
        Board { tile_count, borders: init_borders(tile_count) }
    }

    pub fn tile_count(&self) -> i32 {
        self.tile_count
    }

    pub fn capacity(&self) -> usize {
        (self.tile_count * self.tile_count) as usize
    }

    pub fn borders(&self) -> &[Point] {
        &self.borders
    }

    pub fn is_border(&self, pos: Point) -> bool {
        self.borders.contains(&pos)
    }

    pub fn is_inside(&self, pos: Point) -> bool {
        (0..self.tile_count).contains(&pos.x) && (0..self.tile_count).contains(&pos.y)
    }

    /// Every playable cell, row by row.
    pub fn cells(&self) -> impl Iterator<Item = Point> + '_ {
        (0..self.tile_count).flat_map(move |y| (0..self.tile_count).map(move |x| Point::new(x, y)))
    }
}

fn init_borders(tile_count: i32) -> Vec<Point> {
    let mut borders = Vec::with_capacity(4 * tile_count as usize + 4);

    // Left column and top row start one step before the corner so the ring closes
    for y in -1..tile_count {
        borders.push(Point::new(-1, y));
    }
    for x in 0..=tile_count {
        borders.push(Point::new(x, -1));
    }
    for y in 0..=tile_count {
        borders.push(Point::new(tile_count, y));
    }
    for x in -1..tile_count {
        borders.push(Point::new(x, tile_count));
    }

    borders
}
