//! 分子图表示

/// 键级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BondOrder {
    Single,
    Double,
    Triple,
    Quadruple,
    Aromatic,
}

impl BondOrder {
    /// 用于分子量、价态计算的数值键级
    pub fn as_f64(self) -> f64 {
        match self {
            BondOrder::Single => 1.0,
            BondOrder::Double => 2.0,
            BondOrder::Triple => 3.0,
            BondOrder::Quadruple => 4.0,
            BondOrder::Aromatic => 1.5,
        }
    }

    /// sigma骨架上的整数贡献，芳香键计为1（π电子另算）
    pub fn sigma_contribution(self) -> usize {
        match self {
            BondOrder::Single | BondOrder::Aromatic => 1,
            BondOrder::Double => 2,
            BondOrder::Triple => 3,
            BondOrder::Quadruple => 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MolAtom {
    pub atomic_number: u8,
    pub formal_charge: i8,
    pub isotope: Option<u16>,
    pub is_aromatic: bool,
    pub implicit_hydrogens: u8,
    /// 是否以方括号形式书写（氢数由书写者显式给出）
    pub bracket: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bond {
    pub atom1: usize,
    pub atom2: usize,
    pub order: BondOrder,
}

impl Bond {
    pub fn other(&self, atom_idx: usize) -> usize {
        if self.atom1 == atom_idx {
            self.atom2
        } else {
            self.atom1
        }
    }
}

/// 分子图。每次解析新建，不跨调用共享。
#[derive(Debug, Clone)]
pub struct Molecule {
    pub atoms: Vec<MolAtom>,
    pub bonds: Vec<Bond>,
    /// adjacency[atom_idx] = Vec<(neighbor_atom_idx, bond_idx)>
    pub adjacency: Vec<Vec<(usize, usize)>>,
}

impl Molecule {
    pub fn new(atoms: Vec<MolAtom>, bonds: Vec<Bond>) -> Self {
        let mut adjacency = vec![Vec::new(); atoms.len()];
        for (bi, bond) in bonds.iter().enumerate() {
            adjacency[bond.atom1].push((bond.atom2, bi));
            adjacency[bond.atom2].push((bond.atom1, bi));
        }
        Molecule {
            atoms,
            bonds,
            adjacency,
        }
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn bond_count(&self) -> usize {
        self.bonds.len()
    }

    pub fn degree(&self, atom_idx: usize) -> usize {
        self.adjacency[atom_idx].len()
    }

    pub fn neighbors(&self, atom_idx: usize) -> impl Iterator<Item = usize> + '_ {
        self.adjacency[atom_idx].iter().map(|&(n, _)| n)
    }

    /// 与指定原子相连的 (邻居, 键)
    pub fn bonds_of(&self, atom_idx: usize) -> impl Iterator<Item = (usize, &Bond)> + '_ {
        self.adjacency[atom_idx]
            .iter()
            .map(|&(n, bi)| (n, &self.bonds[bi]))
    }

    pub fn get_bond(&self, a1: usize, a2: usize) -> Option<&Bond> {
        self.adjacency[a1]
            .iter()
            .find(|&&(n, _)| n == a2)
            .map(|&(_, bi)| &self.bonds[bi])
    }

    /// 隐式氢与以 [H] 原子写出的显式氢之和
    pub fn total_hydrogens(&self, atom_idx: usize) -> usize {
        let explicit = self
            .neighbors(atom_idx)
            .filter(|&n| self.atoms[n].atomic_number == 1)
            .count();
        self.atoms[atom_idx].implicit_hydrogens as usize + explicit
    }

    /// sigma骨架占用的价态（芳香键计1）
    pub fn sigma_valence(&self, atom_idx: usize) -> usize {
        self.bonds_of(atom_idx)
            .map(|(_, b)| b.order.sigma_contribution())
            .sum()
    }

    /// 总价态（含氢），芳香键计1.5，对应SMARTS中的 `v`
    pub fn total_valence(&self, atom_idx: usize) -> usize {
        let bonds: f64 = self.bonds_of(atom_idx).map(|(_, b)| b.order.as_f64()).sum();
        bonds.round() as usize + self.atoms[atom_idx].implicit_hydrogens as usize
    }

    /// 是否带有非芳香的双键（或更高键级）
    pub fn has_multiple_bond(&self, atom_idx: usize) -> bool {
        self.bonds_of(atom_idx).any(|(_, b)| {
            matches!(
                b.order,
                BondOrder::Double | BondOrder::Triple | BondOrder::Quadruple
            )
        })
    }

    /// 连通分量数（由 `.` 分隔的片段）
    pub fn component_count(&self) -> usize {
        let n = self.atom_count();
        let mut seen = vec![false; n];
        let mut components = 0;
        for start in 0..n {
            if seen[start] {
                continue;
            }
            components += 1;
            let mut stack = vec![start];
            seen[start] = true;
            while let Some(current) = stack.pop() {
                for next in self.neighbors(current) {
                    if !seen[next] {
                        seen[next] = true;
                        stack.push(next);
                    }
                }
            }
        }
        components
    }
}
