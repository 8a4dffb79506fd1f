//! Grid pathfinding used for route caching and placement validation.

use std::{cmp::Reverse, collections::BinaryHeap};

use glam::Vec2;
use warden_core::CellCoord;

use crate::level::GridMap;

/// Finds the shortest 4-connected route between two cells.
///
/// Blocked tiles, cells outside the grid and cells for which `is_occupied`
/// returns `true` are impassable. The result holds one world-space point per
/// cell from `start` to `goal` inclusive; it is empty when no route exists.
pub fn find_path<F>(
    map: &GridMap,
    start: CellCoord,
    goal: CellCoord,
    mut is_occupied: F,
) -> Vec<Vec2>
where
    F: FnMut(CellCoord) -> bool,
{
    let mut passable = |cell: CellCoord| map.tile_at(cell).is_passable() && !is_occupied(cell);

    let (Some(start_index), Some(goal_index)) = (map.index(start), map.index(goal)) else {
        return Vec::new();
    };
    if !passable(start) || !passable(goal) {
        return Vec::new();
    }
    if start_index == goal_index {
        return vec![map.grid_to_world(start)];
    }

    let cell_count = map.cell_count();
    let mut best_cost = vec![u32::MAX; cell_count];
    let mut came_from = vec![usize::MAX; cell_count];
    let mut open = BinaryHeap::new();

    best_cost[start_index] = 0;
    open.push(Reverse((start.manhattan_distance(goal), 0u32, start_index)));

    while let Some(Reverse((_, cost, current_index))) = open.pop() {
        if current_index == goal_index {
            return reconstruct(map, &came_from, goal_index);
        }
        if cost > best_cost[current_index] {
            continue;
        }

        let current = map.cell_at(current_index);
        for neighbor in neighbors(current) {
            let Some(neighbor_index) = map.index(neighbor) else {
                continue;
            };
            if !passable(neighbor) {
                continue;
            }

            let next_cost = cost + 1;
            if next_cost >= best_cost[neighbor_index] {
                continue;
            }

            best_cost[neighbor_index] = next_cost;
            came_from[neighbor_index] = current_index;
            let estimate = next_cost + neighbor.manhattan_distance(goal);
            open.push(Reverse((estimate, next_cost, neighbor_index)));
        }
    }

    Vec::new()
}

/// Reports whether occupying `proposed` in addition to the existing
/// placements would disconnect the spawn from the exit.
pub fn would_block_path<F>(map: &GridMap, proposed: CellCoord, mut is_occupied: F) -> bool
where
    F: FnMut(CellCoord) -> bool,
{
    find_path(map, map.spawn(), map.exit(), |cell| {
        cell == proposed || is_occupied(cell)
    })
    .is_empty()
}

fn reconstruct(map: &GridMap, came_from: &[usize], goal_index: usize) -> Vec<Vec2> {
    let mut indices = vec![goal_index];
    let mut current = goal_index;
    while let Some(&previous) = came_from.get(current) {
        if previous == usize::MAX {
            break;
        }
        indices.push(previous);
        current = previous;
    }
    indices
        .into_iter()
        .rev()
        .map(|index| map.grid_to_world(map.cell_at(index)))
        .collect()
}

fn neighbors(cell: CellCoord) -> [CellCoord; 4] {
    [
        CellCoord::new(cell.column(), cell.row() - 1),
        CellCoord::new(cell.column() + 1, cell.row()),
        CellCoord::new(cell.column(), cell.row() + 1),
        CellCoord::new(cell.column() - 1, cell.row()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_field_route_has_manhattan_length() {
        let map = GridMap::from_ascii("field", &["S...", "....", "...E"]).expect("layout");
        let route = find_path(&map, map.spawn(), map.exit(), |_| false);
        assert_eq!(route.len(), 6);
        assert_eq!(route.first(), Some(&map.grid_to_world(map.spawn())));
        assert_eq!(route.last(), Some(&map.grid_to_world(map.exit())));
    }

    #[test]
    fn consecutive_points_are_adjacent_cells() {
        let map = GridMap::from_ascii("maze", &["S#..", ".#.#", "...E"]).expect("layout");
        let route = find_path(&map, map.spawn(), map.exit(), |_| false);
        assert!(!route.is_empty());
        for pair in route.windows(2) {
            let a = map.world_to_grid(pair[0]);
            let b = map.world_to_grid(pair[1]);
            assert_eq!(a.manhattan_distance(b), 1);
            assert!(map.tile_at(b).is_passable());
        }
    }

    #[test]
    fn start_equal_to_goal_yields_single_point() {
        let map = GridMap::from_ascii("dot", &["S.E"]).expect("layout");
        let cell = CellCoord::new(1, 0);
        assert_eq!(find_path(&map, cell, cell, |_| false), vec![map.grid_to_world(cell)]);
    }

    #[test]
    fn walls_disconnect_route() {
        let map = GridMap::from_ascii("walled", &["S#E", ".#."]).expect("layout");
        assert!(find_path(&map, map.spawn(), map.exit(), |_| false).is_empty());
    }

    #[test]
    fn out_of_bounds_endpoints_yield_empty_route() {
        let map = GridMap::from_ascii("tiny", &["SE"]).expect("layout");
        assert!(find_path(&map, CellCoord::new(-1, 0), map.exit(), |_| false).is_empty());
    }

    #[test]
    fn occupied_cells_are_avoided() {
        let map = GridMap::from_ascii("detour", &["SBE", "..."]).expect("layout");
        let blocked = CellCoord::new(1, 0);
        let route = find_path(&map, map.spawn(), map.exit(), |cell| cell == blocked);
        assert_eq!(route.len(), 5);
        assert!(!route.contains(&map.grid_to_world(blocked)));
    }

    #[test]
    fn corridor_middle_cell_blocks_path() {
        let map = GridMap::from_ascii("corridor", &["SBE"]).expect("layout");
        assert!(would_block_path(&map, CellCoord::new(1, 0), |_| false));

        let wide = GridMap::from_ascii("wide", &["SBE", "..."]).expect("layout");
        assert!(!would_block_path(&wide, CellCoord::new(1, 0), |_| false));
        assert!(would_block_path(&wide, CellCoord::new(1, 1), |cell| {
            cell == CellCoord::new(1, 0)
        }));
    }
}
