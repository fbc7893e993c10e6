//! 环感知：环计数、环成员判定与最小环枚举

use std::collections::VecDeque;

use crate::chem::molecule::Molecule;

/// 环数（SSSR大小），等于圈复杂度：键数 - 原子数 + 连通分量数
pub fn ring_count(mol: &Molecule) -> usize {
    let rings = mol.bond_count() as isize - mol.atom_count() as isize
        + mol.component_count() as isize;
    rings.max(0) as usize
}

/// 每根键是否位于环上（即不是桥）
pub fn ring_bond_flags(mol: &Molecule) -> Vec<bool> {
    let n = mol.atom_count();
    let mut disc = vec![usize::MAX; n];
    let mut low = vec![0usize; n];
    let mut is_bridge = vec![false; mol.bond_count()];
    let mut timer = 0usize;

    for root in 0..n {
        if disc[root] != usize::MAX {
            continue;
        }
        disc[root] = timer;
        low[root] = timer;
        timer += 1;

        // (atom, 进入该原子所用的键, 下一个待访问的邻接下标)
        let mut stack: Vec<(usize, usize, usize)> = vec![(root, usize::MAX, 0)];
        while let Some(frame) = stack.last_mut() {
            let (node, parent_bond) = (frame.0, frame.1);
            if frame.2 < mol.adjacency[node].len() {
                let (next, bond_idx) = mol.adjacency[node][frame.2];
                frame.2 += 1;
                if bond_idx == parent_bond {
                    continue;
                }
                if disc[next] == usize::MAX {
                    disc[next] = timer;
                    low[next] = timer;
                    timer += 1;
                    stack.push((next, bond_idx, 0));
                } else {
                    low[node] = low[node].min(disc[next]);
                }
            } else {
                stack.pop();
                if let Some(parent) = stack.last() {
                    let p = parent.0;
                    low[p] = low[p].min(low[node]);
                    if low[node] > disc[p] {
                        is_bridge[parent_bond] = true;
                    }
                }
            }
        }
    }

    is_bridge.into_iter().map(|bridge| !bridge).collect()
}

/// 每个原子是否位于环上
pub fn ring_atom_flags(mol: &Molecule) -> Vec<bool> {
    let ring_bonds = ring_bond_flags(mol);
    let mut in_ring = vec![false; mol.atom_count()];
    for (bond, _) in mol.bonds.iter().zip(&ring_bonds).filter(|(_, r)| **r) {
        in_ring[bond.atom1] = true;
        in_ring[bond.atom2] = true;
    }
    in_ring
}

/// 经过每根环键的最小环，去重后按大小排序。
///
/// 每个环是按成环顺序排列的原子下标，相邻两项（以及首尾）之间有键。
pub fn smallest_rings(mol: &Molecule) -> Vec<Vec<usize>> {
    let ring_bonds = ring_bond_flags(mol);
    let mut rings: Vec<Vec<usize>> = Vec::new();
    let mut seen: Vec<Vec<usize>> = Vec::new();

    for (bond_idx, bond) in mol.bonds.iter().enumerate() {
        if !ring_bonds[bond_idx] {
            continue;
        }
        let Some(ring) = shortest_path(mol, bond.atom1, bond.atom2, bond_idx, &ring_bonds) else {
            continue;
        };
        let mut key = ring.clone();
        key.sort_unstable();
        if !seen.contains(&key) {
            seen.push(key);
            rings.push(ring);
        }
    }

    rings.sort_by_key(|r| r.len());
    rings
}

/// 只走环键、不经过 skip_bond 的 BFS 最短路径（含两端）
fn shortest_path(
    mol: &Molecule,
    from: usize,
    to: usize,
    skip_bond: usize,
    ring_bonds: &[bool],
) -> Option<Vec<usize>> {
    let mut parent = vec![usize::MAX; mol.atom_count()];
    parent[from] = from;
    let mut queue = VecDeque::from([from]);

    while let Some(current) = queue.pop_front() {
        if current == to {
            let mut path = vec![to];
            let mut node = to;
            while node != from {
                node = parent[node];
                path.push(node);
            }
            path.reverse();
            return Some(path);
        }
        for &(next, bond_idx) in &mol.adjacency[current] {
            if bond_idx == skip_bond || !ring_bonds[bond_idx] || parent[next] != usize::MAX {
                continue;
            }
            parent[next] = current;
            queue.push_back(next);
        }
    }
    None
}
