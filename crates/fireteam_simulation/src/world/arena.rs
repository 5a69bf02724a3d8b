//! ArenaWorld — reference backend для `WorldQuery`
//!
//! Статическая геометрия из AABB (платформы + препятствия) и навигационная
//! сетка поверх верхних граней платформ. Сетка разбита на связные группы
//! (flood fill), поиск пути — A* по 8 соседям без срезания углов.
//!
//! Используется headless демо и тестами вместо внешнего navmesh движка.

use bevy::math::bounding::{Aabb3d, RayCast3d};
use bevy::math::Vec3Swizzles;
use bevy::prelude::*;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};

use super::{GroupId, NavNode, RayHit, WorldQuery, ZoneId};

/// Проходимая поверхность: верхняя грань (`max.y`) — пол
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Platform {
    pub min: Vec3,
    pub max: Vec3,
}

impl Platform {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    fn contains_xz(&self, x: f32, z: f32) -> bool {
        x >= self.min.x && x <= self.max.x && z >= self.min.z && z <= self.max.z
    }
}

/// Препятствие: стены, ящики, колонны. Блокирует лучи и nav-ячейки.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Block {
    pub min: Vec3,
    pub max: Vec3,
}

impl Block {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    fn overlaps_column(&self, x: f32, z: f32, margin: f32, floor: f32, height: f32) -> bool {
        x >= self.min.x - margin
            && x <= self.max.x + margin
            && z >= self.min.z - margin
            && z <= self.max.z + margin
            && self.max.y > floor + 0.01
            && self.min.y < floor + height
    }
}

/// Параметры навигационной сетки
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavGridSettings {
    pub cell_size: f32,
    /// Требуемый просвет над полом
    pub agent_height: f32,
    /// Максимальный перепад высот между соседними ячейками
    pub max_step: f32,
    /// Отступ от препятствий
    pub agent_radius: f32,
}

impl Default for NavGridSettings {
    fn default() -> Self {
        Self {
            cell_size: 1.0,
            agent_height: 1.8,
            max_step: 0.5,
            agent_radius: 0.3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct NavCell {
    height: f32,
    group: GroupId,
}

#[derive(Debug, Clone, Default)]
struct NavGrid {
    origin: Vec2,
    cols: usize,
    rows: usize,
    cells: Vec<Option<NavCell>>,
}

const STRAIGHT_COST: u32 = 10;
const DIAGONAL_COST: u32 = 14;

/// Reference world: AABB геометрия + nav grid
#[derive(Debug, Clone)]
pub struct ArenaWorld {
    zone: ZoneId,
    platforms: Vec<Platform>,
    blocks: Vec<Block>,
    settings: NavGridSettings,
    grid: NavGrid,
}

impl ArenaWorld {
    pub fn new(zone: ZoneId, settings: NavGridSettings) -> Self {
        Self {
            zone,
            platforms: Vec::new(),
            blocks: Vec::new(),
            settings,
            grid: NavGrid::default(),
        }
    }

    /// Плоская квадратная арена с полом на y = 0
    pub fn flat(zone: ZoneId, half_extent: f32) -> Self {
        Self::new(zone, NavGridSettings::default()).with_platform(Platform::new(
            Vec3::new(-half_extent, -1.0, -half_extent),
            Vec3::new(half_extent, 0.0, half_extent),
        ))
    }

    /// Арена для headless демо: пол, укрытия и приподнятый помост
    pub fn demo() -> Self {
        Self::flat(ZoneId::default(), 40.0)
            .with_platform(Platform::new(
                Vec3::new(10.0, 0.0, 10.0),
                Vec3::new(20.0, 0.4, 20.0),
            ))
            .with_block(Block::new(Vec3::new(-4.0, 0.0, -1.0), Vec3::new(4.0, 3.0, 1.0)))
            .with_block(Block::new(Vec3::new(-20.0, 0.0, 8.0), Vec3::new(-18.0, 3.0, 18.0)))
            .with_block(Block::new(Vec3::new(15.0, 0.0, -20.0), Vec3::new(17.0, 3.0, -8.0)))
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platforms.push(platform);
        self.rebuild_grid();
        self
    }

    pub fn with_block(mut self, block: Block) -> Self {
        self.blocks.push(block);
        self.rebuild_grid();
        self
    }

    pub fn zone(&self) -> ZoneId {
        self.zone
    }

    pub fn settings(&self) -> &NavGridSettings {
        &self.settings
    }

    /// Высота самой верхней платформы в точке (x, z)
    pub fn surface_at(&self, x: f32, z: f32) -> Option<f32> {
        self.platforms
            .iter()
            .filter(|platform| platform.contains_xz(x, z))
            .map(|platform| platform.max.y)
            .reduce(f32::max)
    }

    fn column_clear(&self, x: f32, z: f32, floor: f32, margin: f32) -> bool {
        !self
            .blocks
            .iter()
            .any(|block| block.overlaps_column(x, z, margin, floor, self.settings.agent_height))
    }

    // ========================================================================
    // Nav grid
    // ========================================================================

    fn rebuild_grid(&mut self) {
        let Some((min, max)) = self
            .platforms
            .iter()
            .map(|platform| (platform.min.xz(), platform.max.xz()))
            .reduce(|(a_min, a_max), (b_min, b_max)| (a_min.min(b_min), a_max.max(b_max)))
        else {
            self.grid = NavGrid::default();
            return;
        };

        let cell = self.settings.cell_size;
        let cols = ((max.x - min.x) / cell).ceil().max(1.0) as usize;
        let rows = ((max.y - min.y) / cell).ceil().max(1.0) as usize;

        let mut grid = NavGrid {
            origin: min,
            cols,
            rows,
            cells: vec![None; cols * rows],
        };

        for row in 0..rows {
            for col in 0..cols {
                let center = grid.origin + Vec2::new(col as f32 + 0.5, row as f32 + 0.5) * cell;
                let Some(height) = self.surface_at(center.x, center.y) else {
                    continue;
                };
                if self.column_clear(center.x, center.y, height, self.settings.agent_radius) {
                    grid.cells[row * cols + col] = Some(NavCell {
                        height,
                        group: GroupId::default(),
                    });
                }
            }
        }

        self.grid = grid;
        self.assign_groups();
    }

    /// Flood fill: каждая связная компонента получает свой GroupId
    fn assign_groups(&mut self) {
        let mut assigned = vec![false; self.grid.cells.len()];
        let mut next_group = 0u32;

        for start in 0..self.grid.cells.len() {
            if assigned[start] || self.grid.cells[start].is_none() {
                continue;
            }

            let group = GroupId(next_group);
            next_group += 1;

            let mut queue = VecDeque::from([start]);
            assigned[start] = true;

            while let Some(index) = queue.pop_front() {
                if let Some(cell) = self.grid.cells[index].as_mut() {
                    cell.group = group;
                }
                for (neighbor, _) in self.neighbors(index) {
                    if !assigned[neighbor] {
                        assigned[neighbor] = true;
                        queue.push_back(neighbor);
                    }
                }
            }
        }
    }

    fn cell_index(&self, point: Vec3) -> Option<usize> {
        let local = (point.xz() - self.grid.origin) / self.settings.cell_size;
        if local.x < 0.0 || local.y < 0.0 {
            return None;
        }
        let (col, row) = (local.x as usize, local.y as usize);
        (col < self.grid.cols && row < self.grid.rows).then(|| row * self.grid.cols + col)
    }

    fn cell(&self, index: usize) -> Option<NavCell> {
        self.grid.cells.get(index).copied().flatten()
    }

    fn coords(&self, index: usize) -> (i64, i64) {
        ((index % self.grid.cols) as i64, (index / self.grid.cols) as i64)
    }

    fn index_at(&self, col: i64, row: i64) -> Option<usize> {
        let in_bounds =
            col >= 0 && row >= 0 && (col as usize) < self.grid.cols && (row as usize) < self.grid.rows;
        in_bounds.then(|| row as usize * self.grid.cols + col as usize)
    }

    fn node_position(&self, index: usize) -> Option<Vec3> {
        let cell = self.cell(index)?;
        let (col, row) = self.coords(index);
        let center =
            self.grid.origin + Vec2::new(col as f32 + 0.5, row as f32 + 0.5) * self.settings.cell_size;
        Some(Vec3::new(center.x, cell.height, center.y))
    }

    fn walkable_between(&self, from: NavCell, to: Option<NavCell>) -> bool {
        to.map(|to| (to.height - from.height).abs() <= self.settings.max_step)
            .unwrap_or(false)
    }

    /// Соседи ячейки со стоимостью перехода (диагональ только при свободных ортогоналях)
    fn neighbors(&self, index: usize) -> Vec<(usize, u32)> {
        let Some(cell) = self.cell(index) else {
            return Vec::new();
        };
        let (col, row) = self.coords(index);
        let mut result = Vec::with_capacity(8);

        let passable = |c: i64, r: i64| {
            self.index_at(c, r)
                .filter(|&i| self.walkable_between(cell, self.cell(i)))
        };

        for (dc, dr) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
            if let Some(neighbor) = passable(col + dc, row + dr) {
                result.push((neighbor, STRAIGHT_COST));
            }
        }

        for (dc, dr) in [(1, 1), (1, -1), (-1, 1), (-1, -1)] {
            let sides_open =
                passable(col + dc, row).is_some() && passable(col, row + dr).is_some();
            if !sides_open {
                continue;
            }
            if let Some(neighbor) = passable(col + dc, row + dr) {
                result.push((neighbor, DIAGONAL_COST));
            }
        }

        result
    }

    fn heuristic(&self, from: usize, to: usize) -> u32 {
        let (ac, ar) = self.coords(from);
        let (bc, br) = self.coords(to);
        let dx = (ac - bc).unsigned_abs() as u32;
        let dz = (ar - br).unsigned_abs() as u32;
        STRAIGHT_COST * dx.max(dz) + (DIAGONAL_COST - STRAIGHT_COST) * dx.min(dz)
    }

    fn walkable_index_in(&self, point: Vec3, zone: ZoneId, group: GroupId) -> Option<usize> {
        if zone != self.zone {
            return None;
        }
        let index = self.cell_index(point)?;
        let cell = self.cell(index)?;
        (cell.group == group).then_some(index)
    }

    fn a_star(&self, start: usize, goal: usize) -> Option<Vec<usize>> {
        let mut g_score = vec![u32::MAX; self.grid.cells.len()];
        let mut came_from: Vec<Option<usize>> = vec![None; self.grid.cells.len()];
        let mut open = BinaryHeap::new();

        g_score[start] = 0;
        open.push(Reverse((self.heuristic(start, goal), 0u32, start)));

        while let Some(Reverse((_, g, current))) = open.pop() {
            if current == goal {
                let mut cells = vec![goal];
                let mut cursor = goal;
                while let Some(previous) = came_from[cursor] {
                    cells.push(previous);
                    cursor = previous;
                }
                cells.reverse();
                return Some(cells);
            }

            if g > g_score[current] {
                continue;
            }

            for (neighbor, cost) in self.neighbors(current) {
                let tentative = g + cost;
                if tentative < g_score[neighbor] {
                    g_score[neighbor] = tentative;
                    came_from[neighbor] = Some(current);
                    open.push(Reverse((
                        tentative + self.heuristic(neighbor, goal),
                        tentative,
                        neighbor,
                    )));
                }
            }
        }

        None
    }

    /// Убирает промежуточные точки на прямых участках
    fn compress(&self, cells: &[usize]) -> Vec<usize> {
        let direction = |a: usize, b: usize| {
            let (ac, ar) = self.coords(a);
            let (bc, br) = self.coords(b);
            (bc - ac, br - ar)
        };

        let mut kept = Vec::new();
        for i in 1..cells.len() {
            let is_last = i + 1 == cells.len();
            if is_last || direction(cells[i - 1], cells[i]) != direction(cells[i], cells[i + 1]) {
                kept.push(cells[i]);
            }
        }
        kept
    }
}

impl WorldQuery for ArenaWorld {
    fn raycast(&self, origin: Vec3, direction: Dir3, max_distance: f32) -> Option<RayHit> {
        let ray = RayCast3d::new(origin, direction, max_distance);
        let boxes = self
            .platforms
            .iter()
            .map(|p| (p.min, p.max))
            .chain(self.blocks.iter().map(|b| (b.min, b.max)));

        boxes
            .filter_map(|(min, max)| {
                ray.aabb_intersection_at(&Aabb3d::new((min + max) * 0.5, (max - min) * 0.5))
            })
            .reduce(f32::min)
            .map(|distance| RayHit {
                distance,
                point: origin + *direction * distance,
            })
    }

    fn find_path(&self, from: Vec3, to: Vec3, zone: ZoneId, group: GroupId) -> Vec<Vec3> {
        let (Some(start), Some(goal)) = (
            self.walkable_index_in(from, zone, group),
            self.walkable_index_in(to, zone, group),
        ) else {
            return Vec::new();
        };

        let Some(cells) = self.a_star(start, goal) else {
            return Vec::new();
        };

        let goal_height = self.cell(goal).map(|cell| cell.height).unwrap_or(to.y);
        let mut path: Vec<Vec3> = self
            .compress(&cells)
            .into_iter()
            .filter_map(|index| self.node_position(index))
            .collect();

        // Последняя точка — сама цель (на высоте пола), а не центр ячейки
        let target = Vec3::new(to.x, goal_height, to.z);
        match path.last_mut() {
            Some(last) => *last = target,
            None => path.push(target),
        }
        path
    }

    fn closest_node(&self, point: Vec3, zone: ZoneId, group: GroupId) -> Option<NavNode> {
        if zone != self.zone {
            return None;
        }

        (0..self.grid.cells.len())
            .filter(|&index| self.cell(index).map(|c| c.group == group).unwrap_or(false))
            .filter_map(|index| {
                self.node_position(index)
                    .map(|position| NavNode { index, position })
            })
            .min_by(|a, b| {
                a.position
                    .distance_squared(point)
                    .total_cmp(&b.position.distance_squared(point))
            })
    }

    fn clamp_to_navigable(
        &self,
        from: Vec3,
        to: Vec3,
        node: NavNode,
        zone: ZoneId,
        group: GroupId,
    ) -> Vec3 {
        let on_mesh = |point: Vec3| -> Option<Vec3> {
            let index = self.walkable_index_in(point, zone, group)?;
            let cell = self.cell(index)?;
            let surface = self.surface_at(point.x, point.z)?;
            let consistent = (surface - cell.height).abs() <= self.settings.max_step;
            (consistent && self.column_clear(point.x, point.z, surface, 0.0))
                .then(|| Vec3::new(point.x, surface, point.z))
        };

        let Some(mut last_valid) = on_mesh(from) else {
            return node.position;
        };

        let planar = Vec3::new(to.x - from.x, 0.0, to.z - from.z);
        let length = planar.length();
        let step = self.settings.cell_size * 0.25;
        let steps = (length / step).ceil() as usize;

        for i in 1..=steps {
            let t = (i as f32 * step / length).min(1.0);
            let Some(candidate) = on_mesh(from + planar * t) else {
                break;
            };
            if (candidate.y - last_valid.y).abs() > self.settings.max_step {
                break;
            }
            last_valid = candidate;
        }

        last_valid
    }

    fn group_of(&self, zone: ZoneId, point: Vec3) -> Option<GroupId> {
        if zone != self.zone {
            return None;
        }
        self.cell_index(point)
            .and_then(|index| self.cell(index))
            .map(|cell| cell.group)
    }
}
