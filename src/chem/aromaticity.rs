//! 芳香性感知
//!
//! 对凯库勒式书写的环按 4n+2 规则判断芳香性，使 `C1=CC=CC=C1` 与 `c1ccccc1`
//! 得到同一个分子。环外的 C=O、C=N 等杂原子双键不贡献 π 电子，
//! 这与常见工具包对吡啶酮、嘌呤类的处理一致。

use crate::chem::molecule::{BondOrder, Molecule};
use crate::chem::ring::{ring_atom_flags, smallest_rings};

/// 原子对所在环贡献的 π 电子数；None 表示该原子不能处于芳香环中
fn pi_electrons(mol: &Molecule, idx: usize, in_ring: &[bool]) -> Option<u32> {
    let atom = &mol.atoms[idx];
    let connections = mol.degree(idx) + atom.implicit_hydrogens as usize;

    let mut double_partner = None;
    for (nb, bond) in mol.bonds_of(idx) {
        match bond.order {
            BondOrder::Double if double_partner.is_none() => double_partner = Some(nb),
            BondOrder::Single | BondOrder::Aromatic => {}
            _ => return None,
        }
    }

    if let Some(nb) = double_partner {
        if in_ring[nb] {
            return Some(1);
        }
        let exocyclic_hetero = matches!(mol.atoms[nb].atomic_number, 7 | 8 | 16);
        return (atom.atomic_number == 6 && exocyclic_hetero).then_some(0);
    }

    match (atom.atomic_number, atom.formal_charge) {
        (6, -1) if connections == 3 => Some(2),
        (6, 1) if connections == 3 => Some(0),
        (5, 0) if connections == 3 => Some(0),
        (7 | 15, 0) if connections == 3 => Some(2),
        (8 | 16 | 34, 0) if connections == 2 => Some(2),
        _ => None,
    }
}

fn is_huckel(electrons: u32) -> bool {
    electrons >= 2 && electrons % 4 == 2
}

fn ring_electrons(mol: &Molecule, atoms: &[usize], in_ring: &[bool]) -> Option<u32> {
    atoms
        .iter()
        .map(|&idx| pi_electrons(mol, idx, in_ring))
        .sum()
}

/// 把满足 4n+2 规则的环改写为芳香形式，返回新标记的环数。
///
/// 已含芳香原子的环保持书写者的标记；单环不满足时再尝试两个稠合环的并集（如薁）。
pub fn perceive_aromaticity(mol: &mut Molecule) -> usize {
    let rings: Vec<Vec<usize>> = smallest_rings(mol)
        .into_iter()
        .filter(|ring| ring.iter().all(|&idx| !mol.atoms[idx].is_aromatic))
        .collect();
    if rings.is_empty() {
        return 0;
    }
    let in_ring = ring_atom_flags(mol);

    let mut aromatic = vec![false; rings.len()];
    for (i, ring) in rings.iter().enumerate() {
        aromatic[i] = ring_electrons(mol, ring, &in_ring).is_some_and(is_huckel);
    }

    for i in 0..rings.len() {
        for j in (i + 1)..rings.len() {
            if aromatic[i] || aromatic[j] {
                continue;
            }
            let shared = rings[i].iter().filter(|a| rings[j].contains(a)).count();
            if shared != 2 {
                continue;
            }
            let mut union = rings[i].clone();
            union.extend(rings[j].iter().filter(|a| !rings[i].contains(a)));
            if ring_electrons(mol, &union, &in_ring).is_some_and(is_huckel) {
                aromatic[i] = true;
                aromatic[j] = true;
            }
        }
    }

    let mut marked = 0;
    for (ring, _) in rings.iter().zip(&aromatic).filter(|(_, a)| **a) {
        for (pos, &idx) in ring.iter().enumerate() {
            let next = ring[(pos + 1) % ring.len()];
            mol.atoms[idx].is_aromatic = true;
            if let Some(&(_, bond_idx)) = mol.adjacency[idx].iter().find(|&&(n, _)| n == next) {
                mol.bonds[bond_idx].order = BondOrder::Aromatic;
            }
        }
        marked += 1;
    }
    marked
}
