use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

const MIN_DISTANCE: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub iterations: usize,
    /// Optimal distance between nodes.
    pub k: f64,
    pub seed: u64,
    /// Graphs with more nodes are refused rather than laid out.
    pub max_nodes: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            iterations: 300,
            k: 3.0,
            seed: 42,
            max_nodes: 2000,
        }
    }
}

/// Fruchterman-Reingold layout. Starts from seeded uniform positions,
/// runs exactly `config.iterations` steps while cooling linearly, and
/// rescales the result to fit in `[-1, 1]` around the origin. `edges` are
/// treated as undirected springs.
pub fn spring_layout(n: usize, edges: &[(usize, usize)], config: &LayoutConfig) -> Vec<(f64, f64)> {
    if n == 0 {
        return Vec::new();
    }
    let (mut pos, _) = simulate(n, edges, config);
    rescale(&mut pos);
    pos.into_iter().map(|[x, y]| (x, y)).collect()
}

/// Raw positions and the number of steps taken.
fn simulate(n: usize, edges: &[(usize, usize)], config: &LayoutConfig) -> (Vec<[f64; 2]>, usize) {

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut pos: Vec<[f64; 2]> = (0..n)
        .map(|_| [rng.gen_range(0.0..1.0), rng.gen_range(0.0..1.0)])
        .collect();

    let mut adjacent = vec![vec![false; n]; n];
    for &(a, b) in edges {
        if a != b && a < n && b < n {
            adjacent[a][b] = true;
            adjacent[b][a] = true;
        }
    }

    let k = config.k;
    let mut temperature = span(&pos) * 0.1;
    let cooling = temperature / (config.iterations as f64 + 1.0);
    let mut displacement = vec![[0.0f64; 2]; n];
    let mut steps = 0;

    for _ in 0..config.iterations {
        for (i, disp) in displacement.iter_mut().enumerate() {
            *disp = [0.0, 0.0];
            for j in 0..n {
                if i == j {
                    continue;
                }
                let dx = pos[i][0] - pos[j][0];
                let dy = pos[i][1] - pos[j][1];
                let distance = (dx * dx + dy * dy).sqrt().max(MIN_DISTANCE);
                let attraction = if adjacent[i][j] { distance / k } else { 0.0 };
                let force = k * k / (distance * distance) - attraction;
                disp[0] += dx * force;
                disp[1] += dy * force;
            }
        }

        for (p, disp) in pos.iter_mut().zip(&displacement) {
            let length = (disp[0] * disp[0] + disp[1] * disp[1]).sqrt().max(MIN_DISTANCE);
            p[0] += disp[0] * temperature / length;
            p[1] += disp[1] * temperature / length;
        }

        temperature -= cooling;
        steps += 1;
    }

    (pos, steps)
}

fn span(pos: &[[f64; 2]]) -> f64 {
    (0..2)
        .map(|d| {
            let (lo, hi) = pos.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p[d]), hi.max(p[d]))
            });
            hi - lo
        })
        .fold(0.0, f64::max)
}

/// Center on the mean and scale so the largest coordinate magnitude is 1.
fn rescale(pos: &mut [[f64; 2]]) {
    let n = pos.len() as f64;
    let mean = [
        pos.iter().map(|p| p[0]).sum::<f64>() / n,
        pos.iter().map(|p| p[1]).sum::<f64>() / n,
    ];
    let mut extent: f64 = 0.0;
    for p in pos.iter_mut() {
        p[0] -= mean[0];
        p[1] -= mean[1];
        extent = extent.max(p[0].abs()).max(p[1].abs());
    }
    if extent > 0.0 {
        for p in pos.iter_mut() {
            p[0] /= extent;
            p[1] /= extent;
        }
    }
}
