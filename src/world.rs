use crate::constants::{ENTRANCE_CELL, EXIT_CELL, MAZE_SIZE, PICKUP_POSITION};
use crate::grid::Grid;
use crate::rng::Rng;

pub const DEFAULT_NOISE_ATTEMPTS: usize = 15;

const LATTICE_STEPS: [(i32, i32); 4] = [(0, -2), (2, 0), (0, 2), (-2, 0)];

#[derive(Clone, Debug)]
pub struct GeneratedWorld {
    pub seed: u32,
    pub grid: Grid,
    pub entrance: (usize, usize),
    pub exit: (usize, usize),
    pub pickup_cell: (usize, usize),
}

pub fn generate_world(seed: u32) -> GeneratedWorld {
    generate_world_with(seed, DEFAULT_NOISE_ATTEMPTS)
}

pub fn generate_world_with(seed: u32, noise_attempts: usize) -> GeneratedWorld {
    let mut rng = Rng::new(seed);
    let mut grid = Grid::new_solid(MAZE_SIZE);

    carve_passages(&mut grid, ENTRANCE_CELL, &mut rng);
    punch_noise(&mut grid, noise_attempts, &mut rng);

    let (ex, ez) = EXIT_CELL;
    clear_block(&mut grid, ex as i32 - 1, ez as i32 - 1, ex as i32, ez as i32);

    let (px, pz) = grid.world_to_cell(PICKUP_POSITION);
    clear_block(&mut grid, px - 1, pz - 1, px + 1, pz + 1);

    GeneratedWorld {
        seed,
        grid,
        entrance: ENTRANCE_CELL,
        exit: EXIT_CELL,
        pickup_cell: (px.max(0) as usize, pz.max(0) as usize),
    }
}

pub fn carve_passages(grid: &mut Grid, start: (usize, usize), rng: &mut Rng) {
    let size = grid.size() as i32;
    let in_lattice = |x: i32, z: i32| x >= 1 && z >= 1 && x <= size - 2 && z <= size - 2;
    let (sx, sz) = (start.0 as i32, start.1 as i32);
    if !in_lattice(sx, sz) {
        return;
    }

    grid.set_open(start.0, start.1);
    let mut stack = Vec::new();
    let mut current = (sx, sz);

    loop {
        let (x, z) = current;
        let mut candidates = [(0, 0); 4];
        let mut count = 0;
        for (dx, dz) in LATTICE_STEPS {
            let (nx, nz) = (x + dx, z + dz);
            if in_lattice(nx, nz) && !grid.is_open(nx, nz) {
                candidates[count] = (nx, nz);
                count += 1;
            }
        }

        if count == 0 {
            match stack.pop() {
                Some(previous) => {
                    current = previous;
                    continue;
                }
                None => break,
            }
        }

        let (nx, nz) = candidates[rng.pick_index(count)];
        grid.set_open(((x + nx) / 2) as usize, ((z + nz) / 2) as usize);
        grid.set_open(nx as usize, nz as usize);
        stack.push(current);
        current = (nx, nz);
    }
}

/// Opens still-solid interior cells that touch an open cell, giving the perfect
/// maze a few loops and stubs. Never closes anything.
pub fn punch_noise(grid: &mut Grid, attempts: usize, rng: &mut Rng) {
    let size = grid.size() as i32;
    if size < 3 {
        return;
    }
    for _ in 0..attempts {
        let x = rng.int(1, size - 2);
        let z = rng.int(1, size - 2);
        if grid.is_open(x, z) {
            continue;
        }
        let open_sides: Vec<(i32, i32)> = [(-1, 0), (1, 0), (0, -1), (0, 1)]
            .into_iter()
            .filter(|(dx, dz)| grid.is_open(x + dx, z + dz))
            .collect();
        if open_sides.is_empty() {
            continue;
        }
        grid.set_open(x as usize, z as usize);

        let (dx, dz) = open_sides[rng.pick_index(open_sides.len())];
        let (bx, bz) = (x - dx, z - dz);
        let interior = bx >= 1 && bz >= 1 && bx <= size - 2 && bz <= size - 2;
        if interior && !grid.is_open(bx, bz) && rng.bool(0.5) {
            grid.set_open(bx as usize, bz as usize);
        }
    }
}

pub fn clear_block(grid: &mut Grid, x0: i32, z0: i32, x1: i32, z1: i32) {
    let max = grid.size() as i32 - 2;
    for z in z0.max(1)..=z1.min(max) {
        for x in x0.max(1)..=x1.min(max) {
            grid.set_open(x as usize, z as usize);
        }
    }
}
