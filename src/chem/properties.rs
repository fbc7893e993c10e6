//! 分子描述符：分子量、原子/键/环计数、Lipinski 氢键供体/受体数、logP

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::chem::element::{element_by_number, symbol_of};
use crate::chem::molecule::{BondOrder, Molecule};
use crate::chem::ring::{ring_bond_flags, ring_count};

pub const MOLECULAR_WEIGHT: &str = "molecular_weight";
pub const NUM_ATOMS: &str = "num_atoms";
pub const NUM_BONDS: &str = "num_bonds";
pub const NUM_RINGS: &str = "num_rings";
pub const LIPINSKI_HBD: &str = "lipinski_hbd";
pub const LIPINSKI_HBA: &str = "lipinski_hba";
pub const LOGP: &str = "logp";

const HYDROGEN_WEIGHT: f64 = 1.008;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Count(usize),
    Real(f64),
}

impl PropertyValue {
    pub fn as_f64(&self) -> f64 {
        match *self {
            PropertyValue::Count(n) => n as f64,
            PropertyValue::Real(v) => v,
        }
    }
}

/// 描述符名称到数值的映射；解析失败时为空
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MoleculeProperties(BTreeMap<String, PropertyValue>);

impl MoleculeProperties {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, key: &str) -> Option<PropertyValue> {
        self.0.get(key).copied()
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).map(|v| v.as_f64())
    }

    pub fn get_count(&self, key: &str) -> Option<usize> {
        match self.get(key)? {
            PropertyValue::Count(n) => Some(n),
            PropertyValue::Real(_) => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, PropertyValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    fn insert(&mut self, key: &str, value: PropertyValue) {
        self.0.insert(key.to_string(), value);
    }
}

/// 计算全部描述符
pub fn compute_properties(mol: &Molecule) -> MoleculeProperties {
    let mut props = MoleculeProperties::empty();
    props.insert(MOLECULAR_WEIGHT, PropertyValue::Real(round2(molecular_weight(mol))));
    props.insert(NUM_ATOMS, PropertyValue::Count(mol.atom_count()));
    props.insert(NUM_BONDS, PropertyValue::Count(mol.bond_count()));
    props.insert(NUM_RINGS, PropertyValue::Count(ring_count(mol)));
    props.insert(LIPINSKI_HBD, PropertyValue::Count(hbd_count(mol)));
    props.insert(LIPINSKI_HBA, PropertyValue::Count(hba_count(mol)));
    props.insert(LOGP, PropertyValue::Real(round2(crippen_logp(mol))));
    props
}

/// 保留两位小数，并把 -0.0 规整为 0.0
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0 + 0.0
}

/// 平均分子量（含隐式氢）
pub fn molecular_weight(mol: &Molecule) -> f64 {
    mol.atoms
        .iter()
        .map(|atom| {
            let heavy = match atom.isotope {
                Some(mass) => mass as f64,
                None => element_by_number(atom.atomic_number)
                    .map(|e| e.atomic_weight)
                    .unwrap_or(0.0),
            };
            heavy + atom.implicit_hydrogens as f64 * HYDROGEN_WEIGHT
        })
        .sum()
}

/// Hill 顺序分子式，如 C2H6O
pub fn molecular_formula(mol: &Molecule) -> String {
    let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
    for atom in &mol.atoms {
        *counts.entry(symbol_of(atom.atomic_number)).or_default() += 1;
        if atom.implicit_hydrogens > 0 {
            *counts.entry("H").or_default() += atom.implicit_hydrogens as usize;
        }
    }

    let mut formula = String::new();
    let mut push = |symbol: &str, count: usize| {
        formula.push_str(symbol);
        if count > 1 {
            formula.push_str(&count.to_string());
        }
    };

    if let Some(c) = counts.remove("C") {
        push("C", c);
        if let Some(h) = counts.remove("H") {
            push("H", h);
        }
    }
    for (symbol, count) in counts {
        push(symbol, count);
    }
    formula
}

fn is_element(mol: &Molecule, idx: usize, numbers: &[u8]) -> bool {
    numbers.contains(&mol.atoms[idx].atomic_number)
}

/// Lipinski 氢键供体数（NH 与 OH/SH）
pub fn hbd_count(mol: &Molecule) -> usize {
    (0..mol.atom_count())
        .filter(|&i| {
            let atom = &mol.atoms[i];
            let h = mol.total_hydrogens(i);
            if h == 0 {
                return false;
            }
            match atom.atomic_number {
                7 if atom.is_aromatic => atom.formal_charge == 0,
                7 => {
                    let v = mol.total_valence(i);
                    (atom.formal_charge == 0 && v == 3) || (atom.formal_charge == 1 && v == 4)
                }
                8 | 16 => atom.formal_charge == 0 && h == 1,
                _ => false,
            }
        })
        .count()
}

/// Lipinski 氢键受体数
pub fn hba_count(mol: &Molecule) -> usize {
    let ring_bonds = ring_bond_flags(mol);

    // 是否带有到 O/N/P/S 的双键
    let has_double_to_hetero = |idx: usize, require_non_ring: bool| {
        mol.adjacency[idx].iter().any(|&(nb, bi)| {
            mol.bonds[bi].order == BondOrder::Double
                && is_element(mol, nb, &[7, 8, 15, 16])
                && !(require_non_ring && ring_bonds[bi])
        })
    };

    (0..mol.atom_count())
        .filter(|&i| {
            let atom = &mol.atoms[i];
            match atom.atomic_number {
                8 | 16 => {
                    if atom.formal_charge < 0 {
                        return true;
                    }
                    if atom.formal_charge != 0 || atom.is_aromatic {
                        return atom.is_aromatic && atom.formal_charge == 0;
                    }
                    if mol.total_valence(i) != 2 {
                        return false;
                    }
                    match mol.total_hydrogens(i) {
                        0 => true,
                        // 羧酸、磺酸中的 OH 不计
                        1 => mol
                            .neighbors(i)
                            .filter(|&nb| mol.atoms[nb].atomic_number != 1)
                            .all(|nb| !has_double_to_hetero(nb, false)),
                        _ => false,
                    }
                }
                7 if atom.is_aromatic => {
                    atom.formal_charge == 0 && mol.total_hydrogens(i) == 0
                }
                7 => {
                    // 酰胺、磺酰胺等氮不计
                    mol.total_valence(i) == 3
                        && !mol.bonds_of(i).any(|(nb, b)| {
                            b.order == BondOrder::Single && has_double_to_hetero(nb, true)
                        })
                }
                9 => true,
                _ => false,
            }
        })
        .count()
}

/// Wildman-Crippen 原子类型的 logP 贡献（J. Chem. Inf. Comput. Sci. 1999, 39, 868）
static CRIPPEN_LOGP: &[(&str, f64)] = &[
    ("C1", 0.1441),
    ("C2", 0.0),
    ("C3", -0.2035),
    ("C4", -0.2051),
    ("C5", -0.2783),
    ("C6", 0.1551),
    ("C7", 0.0017),
    ("C8", 0.08452),
    ("C9", -0.1444),
    ("C10", -0.0516),
    ("C11", 0.1193),
    ("C12", -0.0967),
    ("C13", -0.5443),
    ("C14", 0.0),
    ("C15", 0.245),
    ("C16", 0.198),
    ("C17", 0.0),
    ("C18", 0.1581),
    ("C19", 0.2955),
    ("C20", 0.2713),
    ("C21", 0.136),
    ("C22", 0.4619),
    ("C23", 0.5437),
    ("C24", 0.1893),
    ("C25", -0.8186),
    ("C26", 0.264),
    ("C27", 0.2148),
    ("CS", 0.08129),
    ("H1", 0.123),
    ("H2", -0.2677),
    ("H3", 0.2142),
    ("H4", 0.298),
    ("HS", 0.1125),
    ("N1", -1.019),
    ("N2", -0.7096),
    ("N3", -1.027),
    ("N4", -0.5188),
    ("N5", 0.08387),
    ("N6", 0.1836),
    ("N7", -0.3187),
    ("N8", -0.4458),
    ("N9", 0.01508),
    ("N10", -1.95),
    ("N11", -0.3239),
    ("N12", -1.119),
    ("N13", -0.3396),
    ("N14", 0.2578),
    ("NS", -0.4806),
    ("O1", 0.1552),
    ("O2", -0.2893),
    ("O3", -0.0684),
    ("O4", -0.4195),
    ("O5", 0.0335),
    ("O6", -0.3339),
    ("O7", -1.189),
    ("O8", 0.1788),
    ("O9", -0.1526),
    ("O10", 0.1129),
    ("O11", 0.4833),
    ("O12", -1.326),
    ("OS", -0.1188),
    ("F", 0.4202),
    ("Cl", 0.6895),
    ("Br", 0.8456),
    ("I", 0.8857),
    ("Hal", -2.996),
    ("P", 0.8612),
    ("S1", 0.6482),
    ("S2", -0.0024),
    ("S3", 0.6237),
];

/// 没有参数的元素（金属、稀有气体等）
const UNTYPED: &str = "X";

fn crippen_value(label: &str) -> f64 {
    CRIPPEN_LOGP
        .iter()
        .find(|(l, _)| *l == label)
        .map(|(_, v)| *v)
        .unwrap_or(0.0)
}

/// 基于 Wildman-Crippen 原子贡献的 logP 估计
pub fn crippen_logp(mol: &Molecule) -> f64 {
    let mut total = 0.0;
    for i in 0..mol.atom_count() {
        let atom = &mol.atoms[i];
        if atom.atomic_number == 1 {
            let label = match mol.neighbors(i).next() {
                Some(parent) => hydrogen_type(mol, parent),
                None => "HS",
            };
            total += crippen_value(label);
            continue;
        }
        total += crippen_value(crippen_type(mol, i));
        total += atom.implicit_hydrogens as f64 * crippen_value(hydrogen_type(mol, i));
    }
    total
}

/// 非氢邻居及其键级
fn heavy_neighbors(mol: &Molecule, i: usize) -> Vec<(usize, BondOrder)> {
    mol.bonds_of(i)
        .filter(|(nb, _)| mol.atoms[*nb].atomic_number != 1)
        .map(|(nb, b)| (nb, b.order))
        .collect()
}

fn aromatic(mol: &Molecule, i: usize) -> bool {
    mol.atoms[i].is_aromatic
}

fn aliphatic_element(mol: &Molecule, i: usize, numbers: &[u8]) -> bool {
    !aromatic(mol, i) && is_element(mol, i, numbers)
}

/// SMARTS 中未写键符号时匹配单键或芳香键
fn plain(order: BondOrder) -> bool {
    matches!(order, BondOrder::Single | BondOrder::Aromatic)
}

/// 重原子的 Crippen 类型
pub fn crippen_type(mol: &Molecule, i: usize) -> &'static str {
    let atom = &mol.atoms[i];
    match atom.atomic_number {
        6 if atom.is_aromatic => aromatic_carbon_type(mol, i),
        6 => aliphatic_carbon_type(mol, i),
        7 => nitrogen_type(mol, i),
        8 => oxygen_type(mol, i),
        9 | 17 | 35 | 53 => match (atom.atomic_number, atom.formal_charge) {
            (_, c) if c < 0 => "Hal",
            (53, c) if c > 0 => "Hal",
            (9, _) => "F",
            (17, _) => "Cl",
            (35, _) => "Br",
            _ => "I",
        },
        15 => "P",
        16 if atom.is_aromatic => "S3",
        16 if atom.formal_charge == 0 => "S1",
        16 => "S2",
        _ => UNTYPED,
    }
}

fn aliphatic_carbon_type(mol: &Molecule, i: usize) -> &'static str {
    let h = mol.total_hydrogens(i);
    let heavy = heavy_neighbors(mol, i);
    let sp3 = heavy.len() + h == 4 && heavy.iter().all(|(_, o)| *o == BondOrder::Single);
    let all_aliphatic = heavy.iter().all(|(nb, _)| !aromatic(mol, *nb));
    let all_carbon = heavy
        .iter()
        .all(|(nb, o)| plain(*o) && aliphatic_element(mol, *nb, &[6]));
    let any_hetero = heavy
        .iter()
        .any(|(nb, _)| aliphatic_element(mol, *nb, &[7, 8, 15, 16]) || is_element(mol, *nb, &[9, 17, 35, 53]));
    let any_aromatic = heavy.iter().any(|(nb, _)| aromatic(mol, *nb));
    let double_to_carbon = heavy
        .iter()
        .filter(|(nb, o)| *o == BondOrder::Double && aliphatic_element(mol, *nb, &[6]))
        .count();

    if sp3 && all_carbon {
        return if h >= 2 { "C1" } else { "C2" };
    }
    if sp3 && all_aliphatic && any_hetero {
        return if h >= 2 { "C3" } else { "C4" };
    }
    if heavy
        .iter()
        .any(|(nb, o)| *o == BondOrder::Double && !aromatic(mol, *nb) && !is_element(mol, *nb, &[6]))
    {
        return "C5";
    }
    if double_to_carbon == 2 || (double_to_carbon == 1 && all_aliphatic) {
        return "C6";
    }
    if heavy.len() + h == 2 && heavy.iter().any(|(nb, o)| *o == BondOrder::Triple && !aromatic(mol, *nb)) {
        return "C7";
    }
    if sp3 && any_aromatic {
        return match h {
            3 if heavy.iter().any(|(nb, _)| is_element(mol, *nb, &[6])) => "C8",
            3 => "C9",
            2 => "C10",
            1 => "C11",
            _ => "C12",
        };
    }
    let double_to_aromatic = heavy
        .iter()
        .any(|(nb, o)| *o == BondOrder::Double && aromatic(mol, *nb));
    if (double_to_carbon == 1 && any_aromatic) || double_to_aromatic {
        return "C26";
    }
    if sp3
        && heavy
            .iter()
            .any(|(nb, _)| !aromatic(mol, *nb) && !is_element(mol, *nb, &[6, 7, 8, 15, 16, 9, 17, 35, 53]))
    {
        return "C27";
    }
    "CS"
}

fn aromatic_carbon_type(mol: &Molecule, i: usize) -> &'static str {
    let h = mol.total_hydrogens(i);
    let heavy = heavy_neighbors(mol, i);
    let single_to = |numbers: &[u8]| {
        heavy
            .iter()
            .any(|(nb, o)| *o == BondOrder::Single && aliphatic_element(mol, *nb, numbers))
    };

    if h == 0
        && heavy.iter().any(|(nb, o)| {
            *o == BondOrder::Single
                && !aromatic(mol, *nb)
                && !is_element(mol, *nb, &[6, 7, 8, 16, 9, 17, 35, 53])
        })
    {
        return "C13";
    }
    for (number, label) in [(9, "C14"), (17, "C15"), (35, "C16"), (53, "C17")] {
        if heavy.iter().any(|(nb, _)| is_element(mol, *nb, &[number])) {
            return label;
        }
    }
    if h > 0 {
        return "C18";
    }
    let ring_bonds = heavy.iter().filter(|(_, o)| *o == BondOrder::Aromatic).count();
    if ring_bonds >= 3 {
        return "C19";
    }
    if heavy
        .iter()
        .any(|(nb, o)| *o == BondOrder::Single && aromatic(mol, *nb))
    {
        return "C20";
    }
    for (number, label) in [(6, "C21"), (7, "C22"), (8, "C23"), (16, "C24")] {
        if single_to(&[number]) {
            return label;
        }
    }
    if heavy
        .iter()
        .any(|(nb, o)| *o == BondOrder::Double && aliphatic_element(mol, *nb, &[6, 7, 8]))
    {
        return "C25";
    }
    "CS"
}

fn nitrogen_type(mol: &Molecule, i: usize) -> &'static str {
    let atom = &mol.atoms[i];
    if atom.is_aromatic {
        return match atom.formal_charge {
            0 => "N11",
            c if c > 0 => "N12",
            _ => "NS",
        };
    }

    let h = mol.total_hydrogens(i);
    let heavy = heavy_neighbors(mol, i);
    let all_plain = heavy.iter().all(|(_, o)| plain(*o));
    let any_aromatic = heavy.iter().any(|(nb, _)| aromatic(mol, *nb));
    let doubles: Vec<usize> = heavy
        .iter()
        .filter(|(_, o)| *o == BondOrder::Double)
        .map(|(nb, _)| *nb)
        .collect();
    let triple = heavy.iter().any(|(_, o)| *o == BondOrder::Triple);

    match atom.formal_charge {
        0 => match (h, heavy.len()) {
            (2, 1) if all_plain => {
                if any_aromatic { "N3" } else { "N1" }
            }
            (1, 2) if all_plain => {
                if any_aromatic { "N4" } else { "N2" }
            }
            (1, 1) if doubles.len() == 1 => "N5",
            (0, 2) if doubles.len() == 1 => "N6",
            (0, 3) if all_plain => {
                if any_aromatic { "N8" } else { "N7" }
            }
            (0, 1) if triple => "N9",
            _ => "NS",
        },
        c if c > 0 => {
            if h > 0 {
                "N10"
            } else if heavy.len() == 4 && all_plain && !any_aromatic {
                "N13"
            } else if heavy.len() == 3
                && doubles.len() == 1
                && doubles.iter().all(|nb| !aromatic(mol, *nb))
                && heavy
                    .iter()
                    .any(|(nb, o)| *o == BondOrder::Single && !aromatic(mol, *nb))
            {
                "N13"
            } else if doubles.len() == 2 {
                let to_carbon = doubles.iter().any(|nb| is_element(mol, *nb, &[6]));
                let to_nitrogen = doubles.iter().any(|nb| is_element(mol, *nb, &[7]));
                if to_carbon && to_nitrogen {
                    "N13"
                } else if doubles.iter().any(|nb| mol.atoms[*nb].formal_charge < 0) {
                    "N14"
                } else {
                    "NS"
                }
            } else if triple {
                "N14"
            } else {
                "NS"
            }
        }
        _ => "N14",
    }
}

fn oxygen_type(mol: &Molecule, i: usize) -> &'static str {
    let atom = &mol.atoms[i];
    if atom.is_aromatic {
        return "O1";
    }

    let h = mol.total_hydrogens(i);
    let heavy = heavy_neighbors(mol, i);
    if h == 1 || h == 2 {
        return "O2";
    }
    if heavy.len() == 2 && heavy.iter().all(|(_, o)| plain(*o)) {
        return if heavy.iter().any(|(nb, _)| aromatic(mol, *nb)) {
            "O4"
        } else {
            "O3"
        };
    }

    let Some(&(nb, order)) = heavy.first() else {
        return "OS";
    };
    if order == BondOrder::Double && is_element(mol, nb, &[7, 8]) {
        return "O5";
    }
    if atom.formal_charge < 0 {
        return match mol.atoms[nb].atomic_number {
            7 => "O5",
            16 => "O6",
            6 if has_double_to(mol, nb, &[8]) => "O12",
            _ => "O7",
        };
    }
    if order != BondOrder::Double || !is_element(mol, nb, &[6]) {
        return "OS";
    }
    if aromatic(mol, nb) {
        return "O8";
    }
    carbonyl_oxygen_type(mol, nb, i)
}

/// 羰基氧按羰基碳另外两个取代基细分
fn carbonyl_oxygen_type(mol: &Molecule, carbon: usize, oxygen: usize) -> &'static str {
    let h = mol.total_hydrogens(carbon);
    let others: Vec<(usize, BondOrder)> = heavy_neighbors(mol, carbon)
        .into_iter()
        .filter(|(nb, _)| *nb != oxygen)
        .collect();
    let is_c = |nb: usize| aliphatic_element(mol, nb, &[6]);
    let is_arom_c = |nb: usize| aromatic(mol, nb) && is_element(mol, nb, &[6]);

    match others.as_slice() {
        [] if h == 2 => "O9",
        [(nb, _)] if h == 1 && (is_c(*nb) || aliphatic_element(mol, *nb, &[7, 8])) => "O9",
        [(nb, BondOrder::Double)] if is_element(mol, *nb, &[8]) => "O9",
        [(nb, _)] if h == 1 && is_arom_c(*nb) => "O10",
        [(a, _), (b, _)] => {
            let (a, b) = (*a, *b);
            if (is_c(a) && !aromatic(mol, b)) || (is_c(b) && !aromatic(mol, a)) {
                "O9"
            } else if ((is_c(a) || is_arom_c(a)) && aromatic(mol, b))
                || ((is_c(b) || is_arom_c(b)) && aromatic(mol, a))
                || (is_arom_c(a) && !aromatic(mol, b))
                || (is_arom_c(b) && !aromatic(mol, a))
            {
                "O10"
            } else if !is_element(mol, a, &[6]) && !is_element(mol, b, &[6]) {
                "O11"
            } else {
                "OS"
            }
        }
        _ => "OS",
    }
}

fn has_double_to(mol: &Molecule, i: usize, numbers: &[u8]) -> bool {
    mol.bonds_of(i)
        .any(|(nb, b)| b.order == BondOrder::Double && is_element(mol, nb, numbers))
}

/// 氢原子的 Crippen 类型，由其所连重原子决定
pub fn hydrogen_type(mol: &Molecule, parent: usize) -> &'static str {
    match mol.atoms[parent].atomic_number {
        1 | 6 => "H1",
        7 => "H3",
        8 => {
            let Some((nb, _)) = heavy_neighbors(mol, parent).first().copied() else {
                return "H2";
            };
            let carbon = is_element(mol, nb, &[6]);
            let sp3 = mol.degree(nb) + mol.atoms[nb].implicit_hydrogens as usize == 4;
            if (carbon && (aromatic(mol, nb) || sp3)) || !is_element(mol, nb, &[6, 7, 8, 16]) {
                "H2"
            } else if is_element(mol, nb, &[7]) {
                "H3"
            } else if is_element(mol, nb, &[8, 16]) || has_double_to(mol, nb, &[6, 7, 8, 16]) {
                "H4"
            } else {
                "HS"
            }
        }
        _ => "H2",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chem::smiles::parse_smiles;

    fn props(smiles: &str) -> MoleculeProperties {
        compute_properties(&parse_smiles(smiles).unwrap())
    }

    #[test]
    fn ethanol_descriptors() {
        let p = props("CCO");
        assert!((p.get_f64(MOLECULAR_WEIGHT).unwrap() - 46.07).abs() < 0.01);
        assert_eq!(p.get_count(NUM_ATOMS), Some(3));
        assert_eq!(p.get_count(NUM_BONDS), Some(2));
        assert_eq!(p.get_count(NUM_RINGS), Some(0));
        assert_eq!(p.get_count(LIPINSKI_HBD), Some(1));
        assert_eq!(p.get_count(LIPINSKI_HBA), Some(1));
        assert!(p.get_f64(LOGP).unwrap().abs() < 0.05);
    }

    #[test]
    fn benzene_descriptors() {
        let p = props("c1ccccc1");
        assert!((p.get_f64(MOLECULAR_WEIGHT).unwrap() - 78.11).abs() < 0.01);
        assert_eq!(p.get_count(NUM_RINGS), Some(1));
        assert_eq!(p.get_count(LIPINSKI_HBD), Some(0));
        assert_eq!(p.get_count(LIPINSKI_HBA), Some(0));
        assert!(p.get_f64(LOGP).unwrap() > 1.5);
    }

    #[test]
    fn acetic_acid_hydroxyl_is_not_an_acceptor() {
        let p = props("CC(=O)O");
        assert_eq!(p.get_count(LIPINSKI_HBD), Some(1));
        // 只有羰基氧
        assert_eq!(p.get_count(LIPINSKI_HBA), Some(1));
    }

    #[test]
    fn amide_nitrogen_is_not_an_acceptor() {
        let p = props("CC(=O)N");
        assert_eq!(p.get_count(LIPINSKI_HBD), Some(1));
        assert_eq!(p.get_count(LIPINSKI_HBA), Some(1));

        let p = props("CCN");
        assert_eq!(p.get_count(LIPINSKI_HBA), Some(1));
    }

    #[test]
    fn pyridine_and_pyrrole() {
        let pyridine = props("c1ccncc1");
        assert_eq!(pyridine.get_count(LIPINSKI_HBA), Some(1));
        assert_eq!(pyridine.get_count(LIPINSKI_HBD), Some(0));

        let pyrrole = props("c1cc[nH]c1");
        assert_eq!(pyrrole.get_count(LIPINSKI_HBA), Some(0));
        assert_eq!(pyrrole.get_count(LIPINSKI_HBD), Some(1));
    }

    fn logp(smiles: &str) -> f64 {
        props(smiles).get_f64(LOGP).unwrap()
    }

    #[test]
    fn logp_matches_reference_values() {
        // RDKit Crippen.MolLogP
        for (smiles, expected) in [
            ("CCO", 0.0),
            ("c1ccccc1", 1.69),
            ("c1ccncc1", 1.08),
            ("Oc1ccccc1", 1.39),
            ("CC(=O)Oc1ccccc1C(=O)O", 1.31),
            ("Cn1c(=O)c2c(ncn2C)n(C)c1=O", -1.03),
        ] {
            let value = logp(smiles);
            assert!((value - expected).abs() < 0.011, "{smiles}: {value} != {expected}");
        }
    }

    #[test]
    fn nitro_group_uses_charged_types() {
        let mol = parse_smiles("[O-][N+](=O)c1ccccc1").unwrap();
        assert_eq!(crippen_type(&mol, 0), "O5");
        assert_eq!(crippen_type(&mol, 1), "N13");
        assert_eq!(crippen_type(&mol, 2), "O5");
        assert_eq!(crippen_type(&mol, 3), "C22");
        // 参考值 1.81
        let value = logp("[O-][N+](=O)c1ccccc1");
        assert!(value > 1.4 && value < 2.0, "nitrobenzene logP {value}");
    }

    #[test]
    fn kekule_and_aromatic_input_agree() {
        assert_eq!(props("C1=CC=CC=C1"), props("c1ccccc1"));
        assert_eq!(props("C1=CC=NC=C1"), props("c1ccncc1"));
        assert_eq!(
            logp("CN1C=NC2=C1C(=O)N(C(=O)N2C)C"),
            logp("Cn1c(=O)c2c(ncn2C)n(C)c1=O")
        );
    }

    #[test]
    fn crippen_atom_types() {
        let type_of = |smiles: &str, idx: usize| crippen_type(&parse_smiles(smiles).unwrap(), idx);
        // 酰胺、脲
        assert_eq!(type_of("CC(N)=O", 1), "C5");
        assert_eq!(type_of("NC(N)=O", 3), "O11");
        assert_eq!(type_of("CC(N)=O", 3), "O9");
        // 芳香 N-甲基
        assert_eq!(type_of("Cn1ccnc1", 0), "C9");
        assert_eq!(type_of("Cc1ccccc1", 0), "C8");
        // 带电氮、氧
        assert_eq!(type_of("C[N+](C)(C)C", 1), "N13");
        assert_eq!(type_of("[NH4+]", 0), "N10");
        assert_eq!(type_of("CC(=O)[O-]", 3), "O12");
        assert_eq!(type_of("c1cc[nH+]cc1", 3), "N12");
        // 腈
        assert_eq!(type_of("CC#N", 1), "C7");
        assert_eq!(type_of("CC#N", 2), "N9");
        // 无参数的金属
        assert_eq!(type_of("Cl[Pt](Cl)([NH3])[NH3]", 1), UNTYPED);
    }

    #[test]
    fn acid_hydroxyl_hydrogen() {
        let mol = parse_smiles("CC(=O)O").unwrap();
        assert_eq!(hydrogen_type(&mol, 3), "H4");
        let mol = parse_smiles("CCO").unwrap();
        assert_eq!(hydrogen_type(&mol, 2), "H2");
        assert_eq!(hydrogen_type(&mol, 0), "H1");
    }

    #[test]
    fn formula_in_hill_order() {
        assert_eq!(molecular_formula(&parse_smiles("CCO").unwrap()), "C2H6O");
        assert_eq!(molecular_formula(&parse_smiles("[Na+].[Cl-]").unwrap()), "ClNa");
    }

    #[test]
    fn round2_normalizes_negative_zero() {
        assert_eq!(round2(-0.0014), 0.0);
        assert!(round2(-0.0014).is_sign_positive());
        assert_eq!(round2(46.0688), 46.07);
    }

    #[test]
    fn serializes_as_flat_object() {
        let json = serde_json::to_value(props("CCO")).unwrap();
        assert_eq!(json["num_atoms"], 3);
        assert!(json["molecular_weight"].is_f64());
    }
}
