// Mutable 2D terrain bitmap and mask stamping.
//
// The terrain is stored as a flat `Vec<bool>` of solid cells indexed by
// `x + y * width`, with a parallel `Vec<u8>` palette buffer that only the
// external renderer cares about. Out-of-bounds reads return "not solid";
// out-of-bounds writes are no-ops. Nothing here ever panics on coordinates.
//
// Terrain is edited by stamping a `Mask`: a small boolean pattern with an
// offset. Every mask cell marked "clear" clears the matching terrain cell.
// This is the only editing primitive used by bashers, miners and explosions;
// diggers and builders edit single cells.
//
// Masks are immutable and pre-baked per action. A `MaskSet` groups all of
// them; `MaskSet::builtin()` supplies default geometry for headless runs and
// tests, and an asset loader can supply its own.
//
// See also: `action/` for the handlers that edit terrain, `sim.rs` which
// owns the `Terrain` as part of `SimState`.
//
// **Critical constraint: determinism.** Terrain is mutated only from the
// simulation step, in lemming index order. Two lemmings stamping overlapping
// masks in the same tick always apply in the same order.

use serde::{Deserialize, Serialize};

/// Palette index written for bricks laid by builders.
pub const BRICK_PALETTE_INDEX: u8 = 7;

/// Palette index for solid terrain created from a plain bitmap.
pub const DEFAULT_PALETTE_INDEX: u8 = 1;

/// Dense 2D solid/empty grid.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Terrain {
    /// Flat storage: index = x + y * width.
    solid: Vec<bool>,
    /// Renderer palette index per cell; 0 for empty cells.
    palette: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl Terrain {
    /// Create an empty terrain.
    pub fn new(width: u32, height: u32) -> Self {
        let total = (width as usize) * (height as usize);
        Self {
            solid: vec![false; total],
            palette: vec![0; total],
            width,
            height,
        }
    }

    /// Build a terrain from a raw solid bitmap. Returns `None` when the
    /// bitmap length does not match `width * height`.
    pub fn from_bitmap(width: u32, height: u32, solid: Vec<bool>) -> Option<Self> {
        if solid.len() != (width as usize) * (height as usize) {
            return None;
        }
        let palette = solid
            .iter()
            .map(|&s| if s { DEFAULT_PALETTE_INDEX } else { 0 })
            .collect();
        Some(Self {
            solid,
            palette,
            width,
            height,
        })
    }

    /// Build a terrain from ASCII rows: `#` is solid, anything else is empty.
    /// Short rows are padded with empty cells up to the longest row.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Self {
        let width = rows
            .iter()
            .map(|r| r.as_ref().chars().count())
            .max()
            .unwrap_or(0) as u32;
        let mut terrain = Self::new(width, rows.len() as u32);
        for (y, row) in rows.iter().enumerate() {
            for (x, c) in row.as_ref().chars().enumerate() {
                if c == '#' {
                    terrain.set_ground_at(x as i32, y as i32, DEFAULT_PALETTE_INDEX);
                }
            }
        }
        terrain
    }

    /// Convert a coordinate to a flat index. Returns `None` if out of bounds.
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height {
            Some(x as usize + y as usize * self.width as usize)
        } else {
            None
        }
    }

    pub fn has_ground_at(&self, x: i32, y: i32) -> bool {
        self.index(x, y).is_some_and(|i| self.solid[i])
    }

    pub fn set_ground_at(&mut self, x: i32, y: i32, palette_index: u8) {
        if let Some(i) = self.index(x, y) {
            self.solid[i] = true;
            self.palette[i] = palette_index;
        }
    }

    pub fn clear_ground_at(&mut self, x: i32, y: i32) {
        if let Some(i) = self.index(x, y) {
            self.solid[i] = false;
            self.palette[i] = 0;
        }
    }

    /// Palette index at a cell, or 0 outside the grid.
    pub fn palette_at(&self, x: i32, y: i32) -> u8 {
        self.index(x, y).map_or(0, |i| self.palette[i])
    }

    /// True once `y` is below the bottom row.
    pub fn is_out_of_level(&self, y: i32) -> bool {
        y >= self.height as i32
    }

    /// Clear every terrain cell under a "clear" cell of `mask`, with the
    /// mask's own offset applied relative to `(x, y)`. Off-grid cells clip.
    pub fn clear_ground_with_mask(&mut self, mask: &Mask, x: i32, y: i32) {
        let origin_x = x + mask.offset_x;
        let origin_y = y + mask.offset_y;
        for dy in 0..mask.height as i32 {
            for dx in 0..mask.width as i32 {
                if !mask.is_ground(dx, dy) {
                    self.clear_ground_at(origin_x + dx, origin_y + dy);
                }
            }
        }
    }

    /// Number of solid cells.
    pub fn solid_count(&self) -> usize {
        self.solid.iter().filter(|&&s| s).count()
    }
}

// ---------------------------------------------------------------------------
// Masks
// ---------------------------------------------------------------------------

/// A small fixed pattern stamped onto the terrain. `true` keeps ground,
/// `false` clears it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mask {
    pub width: u32,
    pub height: u32,
    pub offset_x: i32,
    pub offset_y: i32,
    cells: Vec<bool>,
}

impl Mask {
    /// Build a mask by evaluating `keep(dx, dy)` for every cell.
    pub fn from_fn(
        width: u32,
        height: u32,
        offset_x: i32,
        offset_y: i32,
        keep: impl Fn(i32, i32) -> bool,
    ) -> Self {
        let mut cells = Vec::with_capacity((width * height) as usize);
        for dy in 0..height as i32 {
            for dx in 0..width as i32 {
                cells.push(keep(dx, dy));
            }
        }
        Self {
            width,
            height,
            offset_x,
            offset_y,
            cells,
        }
    }

    /// Build a mask from ASCII rows: `.` clears, anything else keeps.
    pub fn from_rows<S: AsRef<str>>(rows: &[S], offset_x: i32, offset_y: i32) -> Self {
        let width = rows
            .iter()
            .map(|r| r.as_ref().chars().count())
            .max()
            .unwrap_or(0) as u32;
        let grid: Vec<Vec<char>> = rows.iter().map(|r| r.as_ref().chars().collect()).collect();
        Self::from_fn(width, rows.len() as u32, offset_x, offset_y, |dx, dy| {
            grid[dy as usize].get(dx as usize).is_none_or(|&c| c != '.')
        })
    }

    /// True if the mask keeps ground at `(dx, dy)`. Outside the mask counts
    /// as "keep".
    pub fn is_ground(&self, dx: i32, dy: i32) -> bool {
        if dx < 0 || dy < 0 || dx as u32 >= self.width || dy as u32 >= self.height {
            return true;
        }
        self.cells[dx as usize + dy as usize * self.width as usize]
    }

    /// Mirror horizontally, reflecting the offset around the anchor column.
    pub fn mirrored(&self) -> Self {
        let w = self.width as i32;
        Self::from_fn(
            self.width,
            self.height,
            -(self.offset_x + w - 1),
            self.offset_y,
            |dx, dy| self.is_ground(w - 1 - dx, dy),
        )
    }
}

/// Frame-indexed masks for one action, split by facing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionalMasks {
    pub left: Vec<Mask>,
    pub right: Vec<Mask>,
}

impl DirectionalMasks {
    /// Build from right-facing frames; left frames are their mirror images.
    pub fn from_right(right: Vec<Mask>) -> Self {
        let left = right.iter().map(Mask::mirrored).collect();
        Self { left, right }
    }

    pub fn get(&self, look_right: bool, frame: usize) -> Option<&Mask> {
        if look_right {
            self.right.get(frame)
        } else {
            self.left.get(frame)
        }
    }
}

/// Every mask the action handlers stamp.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskSet {
    /// Four frames per facing, stamped on bash sub-frames 2..=5.
    pub bash: DirectionalMasks,
    /// Two frames per facing, stamped on mine sub-frames 1..=2.
    pub mine: DirectionalMasks,
    /// Crater cleared by an exploding lemming.
    pub explosion: Mask,
}

impl MaskSet {
    /// Default mask geometry, anchored at a lemming's foot pixel.
    ///
    /// Bash frames cut a 10 px tall tunnel that widens by 2 px per frame, up
    /// to 8 px ahead. The tunnel never touches the foot row. Mine frames cut
    /// everything above a 1-in-2 descending diagonal, keeping the cells the
    /// miner will step onto. The explosion is a disc of radius 8 centred
    /// 5 px above the foot.
    pub fn builtin() -> Self {
        let bash = (0..4)
            .map(|frame| {
                let reach = 2 * (frame + 1);
                Mask::from_fn(8, 10, 0, -10, move |dx, dy| {
                    let rounded = (dx == reach - 1) && (dy == 0 || dy == 9);
                    dx >= reach || rounded
                })
            })
            .collect();

        let mine = (0..2)
            .map(|frame| {
                let start = frame * 4;
                Mask::from_fn(9, 13, 0, -10, move |dx, dy| {
                    if dx < start || dx > start + 4 {
                        return true;
                    }
                    let rel_y = dy - 10;
                    let floor = if dx == 0 { -1 } else { (dx - 1) / 2 };
                    rel_y > floor
                })
            })
            .collect();

        let explosion = Mask::from_fn(17, 17, -8, -13, |dx, dy| {
            let cx = dx - 8;
            let cy = dy - 8;
            cx * cx + cy * cy > 64
        });

        Self {
            bash: DirectionalMasks::from_right(bash),
            mine: DirectionalMasks::from_right(mine),
            explosion,
        }
    }
}

impl Default for MaskSet {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full(width: u32, height: u32) -> Terrain {
        let mut t = Terrain::new(width, height);
        for y in 0..height as i32 {
            for x in 0..width as i32 {
                t.set_ground_at(x, y, 1);
            }
        }
        t
    }

    #[test]
    fn new_terrain_is_empty() {
        let t = Terrain::new(8, 4);
        assert_eq!(t.solid_count(), 0);
        assert!(!t.has_ground_at(3, 2));
    }

    #[test]
    fn set_and_clear() {
        let mut t = Terrain::new(8, 8);
        t.set_ground_at(3, 5, 9);
        assert!(t.has_ground_at(3, 5));
        assert_eq!(t.palette_at(3, 5), 9);
        assert!(!t.has_ground_at(3, 4));
        t.clear_ground_at(3, 5);
        assert!(!t.has_ground_at(3, 5));
        assert_eq!(t.palette_at(3, 5), 0);
    }

    #[test]
    fn out_of_bounds_is_silent() {
        let mut t = Terrain::new(4, 4);
        assert!(!t.has_ground_at(-1, 0));
        assert!(!t.has_ground_at(0, -1));
        assert!(!t.has_ground_at(4, 0));
        assert!(!t.has_ground_at(0, 4));
        t.set_ground_at(-1, 0, 1);
        t.set_ground_at(100, 100, 1);
        t.clear_ground_at(-5, -5);
        assert_eq!(t.solid_count(), 0);
    }

    #[test]
    fn from_rows_reads_hashes() {
        let t = Terrain::from_rows(&["..#", "###"]);
        assert_eq!((t.width, t.height), (3, 2));
        assert!(t.has_ground_at(2, 0));
        assert!(!t.has_ground_at(0, 0));
        assert_eq!(t.solid_count(), 4);
    }

    #[test]
    fn from_bitmap_checks_length() {
        assert!(Terrain::from_bitmap(2, 2, vec![true; 3]).is_none());
        let t = Terrain::from_bitmap(2, 2, vec![true, false, false, true]).unwrap();
        assert!(t.has_ground_at(0, 0));
        assert!(t.has_ground_at(1, 1));
        assert_eq!(t.palette_at(0, 0), DEFAULT_PALETTE_INDEX);
    }

    #[test]
    fn stamping_clear_mask_clears_exactly_its_cells() {
        let mut t = full(32, 32);
        let mask = Mask::from_fn(4, 3, 0, 0, |_, _| false);
        t.clear_ground_with_mask(&mask, 10, 10);
        assert_eq!(t.solid_count(), 32 * 32 - 12);
        for y in 10..13 {
            for x in 10..14 {
                assert!(!t.has_ground_at(x, y), "({x},{y}) should be cleared");
            }
        }
        assert!(t.has_ground_at(9, 10));
        assert!(t.has_ground_at(14, 10));
        assert!(t.has_ground_at(10, 13));
    }

    #[test]
    fn stamping_respects_offset_and_kept_cells() {
        let mut t = full(16, 16);
        let mask = Mask::from_rows(&["#.", ".#"], -1, -1);
        t.clear_ground_with_mask(&mask, 5, 5);
        assert!(t.has_ground_at(4, 4));
        assert!(!t.has_ground_at(5, 4));
        assert!(!t.has_ground_at(4, 5));
        assert!(t.has_ground_at(5, 5));
        assert_eq!(t.solid_count(), 16 * 16 - 2);
    }

    #[test]
    fn stamping_partially_off_grid_clips() {
        let mut t = full(8, 8);
        let mask = Mask::from_fn(4, 4, 0, 0, |_, _| false);
        t.clear_ground_with_mask(&mask, 6, -2);
        // Only (6..8, 0..2) is on-grid.
        assert_eq!(t.solid_count(), 64 - 4);
        t.clear_ground_with_mask(&mask, -100, -100);
        assert_eq!(t.solid_count(), 64 - 4);
    }

    #[test]
    fn mirrored_mask_reflects_around_anchor() {
        let mask = Mask::from_rows(&["..##"], 1, 0);
        let m = mask.mirrored();
        // Right-facing clears columns x+1, x+2; mirrored clears x-1, x-2.
        let mut right = full(16, 1);
        right.clear_ground_with_mask(&mask, 8, 0);
        assert!(!right.has_ground_at(9, 0) && !right.has_ground_at(10, 0));
        let mut left = full(16, 1);
        left.clear_ground_with_mask(&m, 8, 0);
        assert!(!left.has_ground_at(7, 0) && !left.has_ground_at(6, 0));
        assert!(left.has_ground_at(8, 0) && left.has_ground_at(5, 0));
        assert_eq!(left.solid_count(), right.solid_count());
    }

    #[test]
    fn builtin_bash_mask_spares_foot_row() {
        let masks = MaskSet::builtin();
        let mut t = full(40, 30);
        for frame in 0..4 {
            t.clear_ground_with_mask(masks.bash.get(true, frame).unwrap(), 10, 20);
        }
        assert!(t.has_ground_at(10, 20));
        assert!(t.has_ground_at(14, 20));
        assert!(!t.has_ground_at(14, 15));
        // Nothing cleared 8 px ahead, where the basher probes for open space.
        assert!(t.has_ground_at(18, 14));
    }

    #[test]
    fn builtin_mine_mask_keeps_next_footholds() {
        let masks = MaskSet::builtin();
        let mut t = full(40, 30);
        for frame in 0..2 {
            t.clear_ground_with_mask(masks.mine.get(true, frame).unwrap(), 10, 20);
        }
        assert!(t.has_ground_at(11, 21));
        assert!(t.has_ground_at(12, 21));
        assert!(!t.has_ground_at(11, 20));
        assert!(!t.has_ground_at(12, 18));
    }

    #[test]
    fn default_terrain_is_zero_sized() {
        let t = Terrain::default();
        assert_eq!((t.width, t.height), (0, 0));
        assert!(!t.has_ground_at(0, 0));
    }
}
