//! 二维坐标生成（确定性的力导向布局）

use crate::chem::molecule::Molecule;
use crate::chem::{ChemError, ChemResult};

const ITERATIONS: usize = 400;
const BOND_LENGTH: f64 = 1.0;
const SPRING: f64 = 0.15;
const REPULSION: f64 = 0.04;
const MAX_STEP: f64 = 0.2;
/// 不同片段之间的水平间距
const FRAGMENT_GAP: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// 为每个原子计算二维坐标，相同输入总得到相同输出
pub fn compute_2d_coords(mol: &Molecule) -> ChemResult<Vec<Point>> {
    let n = mol.atom_count();
    if n == 0 {
        return Err(ChemError::Layout("molecule has no atoms".into()));
    }

    let components = components(mol);
    let mut coords = vec![Point { x: 0.0, y: 0.0 }; n];
    let mut offset_x = 0.0;

    for members in &components {
        let local = layout_component(mol, members);
        let (min_x, max_x, min_y, max_y) = bounds(&local);
        let center_y = (min_y + max_y) / 2.0;
        for (&atom, p) in members.iter().zip(&local) {
            coords[atom] = Point {
                x: p.x - min_x + offset_x,
                y: p.y - center_y,
            };
        }
        offset_x += (max_x - min_x) + FRAGMENT_GAP;
    }

    if coords.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
        return Err(ChemError::Layout("layout produced non-finite coordinates".into()));
    }
    Ok(coords)
}

/// 连通分量，分量内按原子序号排列（即 SMILES 书写顺序）
fn components(mol: &Molecule) -> Vec<Vec<usize>> {
    let n = mol.atom_count();
    let mut seen = vec![false; n];
    let mut result = Vec::new();
    for start in 0..n {
        if seen[start] {
            continue;
        }
        seen[start] = true;
        let mut order = vec![start];
        let mut head = 0;
        while head < order.len() {
            let current = order[head];
            head += 1;
            for next in mol.neighbors(current) {
                if !seen[next] {
                    seen[next] = true;
                    order.push(next);
                }
            }
        }
        order.sort_unstable();
        result.push(order);
    }
    result
}

fn layout_component(mol: &Molecule, members: &[usize]) -> Vec<Point> {
    let m = members.len();
    if m == 1 {
        return vec![Point { x: 0.0, y: 0.0 }];
    }

    // 全局原子下标 -> 分量内下标
    let mut local_index = vec![usize::MAX; mol.atom_count()];
    for (li, &atom) in members.iter().enumerate() {
        local_index[atom] = li;
    }
    let edges: Vec<(usize, usize)> = mol
        .bonds
        .iter()
        .filter(|b| local_index[b.atom1] != usize::MAX)
        .map(|b| (local_index[b.atom1], local_index[b.atom2]))
        .collect();

    // 初始位置放在圆上，半径随原子数增长
    let radius = BOND_LENGTH * m as f64 / (2.0 * std::f64::consts::PI) + 0.5;
    let mut pos: Vec<Point> = (0..m)
        .map(|i| {
            let angle = 2.0 * std::f64::consts::PI * i as f64 / m as f64;
            Point {
                x: radius * angle.cos(),
                y: radius * angle.sin(),
            }
        })
        .collect();

    for iteration in 0..ITERATIONS {
        let cooling = 1.0 - iteration as f64 / ITERATIONS as f64;
        let mut force = vec![(0.0f64, 0.0f64); m];

        for i in 0..m {
            for j in (i + 1)..m {
                let dx = pos[i].x - pos[j].x;
                let dy = pos[i].y - pos[j].y;
                let dist2 = (dx * dx + dy * dy).max(0.01);
                let f = REPULSION / dist2;
                let dist = dist2.sqrt();
                force[i].0 += f * dx / dist;
                force[i].1 += f * dy / dist;
                force[j].0 -= f * dx / dist;
                force[j].1 -= f * dy / dist;
            }
        }

        for &(a, b) in &edges {
            let dx = pos[b].x - pos[a].x;
            let dy = pos[b].y - pos[a].y;
            let dist = (dx * dx + dy * dy).sqrt().max(1e-6);
            let f = SPRING * (dist - BOND_LENGTH);
            force[a].0 += f * dx / dist;
            force[a].1 += f * dy / dist;
            force[b].0 -= f * dx / dist;
            force[b].1 -= f * dy / dist;
        }

        let limit = MAX_STEP * cooling.max(0.05);
        for (p, (fx, fy)) in pos.iter_mut().zip(force) {
            let len = (fx * fx + fy * fy).sqrt();
            let scale = if len > limit { limit / len } else { 1.0 };
            p.x += fx * scale;
            p.y += fy * scale;
        }
    }

    pos
}

fn bounds(points: &[Point]) -> (f64, f64, f64, f64) {
    points.iter().fold(
        (f64::MAX, f64::MIN, f64::MAX, f64::MIN),
        |(min_x, max_x, min_y, max_y), p| {
            (min_x.min(p.x), max_x.max(p.x), min_y.min(p.y), max_y.max(p.y))
        },
    )
}
