//! SMILES 解析器
//!
//! 支持有机子集原子、方括号原子（同位素、手性标记、氢数、电荷、原子类）、
//! 分支、键符号 `- = # $ : / \`、一位与 `%nn` 两位环闭合以及 `.` 分隔的片段。
//! 解析完成后进行价态检查、芳香原子成环检查与凯库勒化检查，
//! 任一失败都视为无效结构。

use std::collections::BTreeMap;

use crate::chem::aromaticity::perceive_aromaticity;
use crate::chem::element::{element_by_number, element_by_symbol};
use crate::chem::molecule::{Bond, BondOrder, MolAtom, Molecule};
use crate::chem::ring::ring_bond_flags;
use crate::chem::{ChemError, ChemResult};

/// 解析 SMILES 字符串为分子图
pub fn parse_smiles(smiles: &str) -> ChemResult<Molecule> {
    if smiles.is_empty() {
        return Err(ChemError::Parse("empty SMILES string".into()));
    }

    let mut parser = SmilesParser::new(smiles);
    parser.parse()?;
    parser.finish()?;

    let mut molecule = Molecule::new(parser.atoms, parser.bonds);
    demote_aromatic_bridges(&mut molecule);
    assign_implicit_hydrogens(&mut molecule)?;
    check_aromatic_atoms_in_rings(&molecule)?;
    check_kekulization(&molecule)?;

    // 凯库勒式输入按芳香性规则转成芳香形式；结果若无法再凯库勒化则保留原样
    let mut aromatized = molecule.clone();
    if perceive_aromaticity(&mut aromatized) > 0 && check_kekulization(&aromatized).is_ok() {
        molecule = aromatized;
    }
    Ok(molecule)
}

/// 上一个读入的记号，用于语法约束
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Start,
    Atom,
    RingClosure,
    BranchOpen,
    BranchClose,
    Bond,
    Dot,
}

struct SmilesParser<'a> {
    input: &'a [u8],
    pos: usize,
    atoms: Vec<MolAtom>,
    bonds: Vec<Bond>,
    /// ring_closures[label] = (atom_idx, 开环时给出的键级)
    ring_closures: BTreeMap<u16, (usize, Option<BondOrder>)>,
    /// 分支栈
    stack: Vec<usize>,
    prev_atom: Option<usize>,
    pending_bond: Option<BondOrder>,
    last: Token,
}

impl<'a> SmilesParser<'a> {
    fn new(input: &'a str) -> Self {
        SmilesParser {
            input: input.as_bytes(),
            pos: 0,
            atoms: Vec::new(),
            bonds: Vec::new(),
            ring_closures: BTreeMap::new(),
            stack: Vec::new(),
            prev_atom: None,
            pending_bond: None,
            last: Token::Start,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let ch = self.peek();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    fn error(&self, message: impl Into<String>) -> ChemError {
        ChemError::Parse(format!("{} (position {})", message.into(), self.pos))
    }

    fn parse(&mut self) -> ChemResult<()> {
        while let Some(ch) = self.peek() {
            match ch {
                b'(' => {
                    if self.prev_atom.is_none() || self.last == Token::Dot {
                        return Err(self.error("branch without a preceding atom"));
                    }
                    if self.pending_bond.is_some() {
                        return Err(self.error("bond symbol before '('"));
                    }
                    if self.last == Token::BranchOpen {
                        return Err(self.error("branch opened directly inside another '('"));
                    }
                    self.advance();
                    if let Some(prev) = self.prev_atom {
                        self.stack.push(prev);
                    }
                    self.last = Token::BranchOpen;
                }
                b')' => {
                    match self.last {
                        Token::BranchOpen => return Err(self.error("empty branch '()'")),
                        Token::Bond => return Err(self.error("dangling bond before ')'")),
                        _ => {}
                    }
                    self.advance();
                    let Some(branch_root) = self.stack.pop() else {
                        return Err(self.error("unmatched ')'"));
                    };
                    self.prev_atom = Some(branch_root);
                    self.last = Token::BranchClose;
                }
                b'-' | b'=' | b'#' | b'$' | b':' | b'/' | b'\\' => {
                    if self.prev_atom.is_none() || self.last == Token::Dot {
                        return Err(self.error("bond without a preceding atom"));
                    }
                    if self.pending_bond.is_some() {
                        return Err(self.error("two consecutive bond symbols"));
                    }
                    self.advance();
                    self.pending_bond = Some(match ch {
                        b'=' => BondOrder::Double,
                        b'#' => BondOrder::Triple,
                        b'$' => BondOrder::Quadruple,
                        b':' => BondOrder::Aromatic,
                        // '/' '\' 仅表示顺反方向，键级为单键
                        _ => BondOrder::Single,
                    });
                    self.last = Token::Bond;
                }
                b'%' => {
                    self.advance();
                    let label = self.parse_two_digit_label()?;
                    self.handle_ring_closure(label)?;
                }
                b'0'..=b'9' => {
                    self.advance();
                    self.handle_ring_closure((ch - b'0') as u16)?;
                }
                b'[' => self.parse_bracket_atom()?,
                b'.' => {
                    if matches!(self.last, Token::Start | Token::Dot | Token::Bond) {
                        return Err(self.error("empty fragment around '.'"));
                    }
                    self.advance();
                    self.prev_atom = None;
                    self.last = Token::Dot;
                }
                _ if is_organic_atom_start(ch) => self.parse_organic_atom()?,
                _ => {
                    return Err(self.error(format!("unexpected character '{}'", ch as char)));
                }
            }
        }
        Ok(())
    }

    fn finish(&self) -> ChemResult<()> {
        if self.atoms.is_empty() {
            return Err(ChemError::Parse("SMILES contains no atoms".into()));
        }
        if self.pending_bond.is_some() {
            return Err(ChemError::Parse("SMILES ends with a dangling bond".into()));
        }
        if matches!(self.last, Token::Dot) {
            return Err(ChemError::Parse("SMILES ends with '.'".into()));
        }
        if !self.stack.is_empty() {
            return Err(ChemError::Parse(format!(
                "{} unmatched '(' in SMILES",
                self.stack.len()
            )));
        }
        if !self.ring_closures.is_empty() {
            let open: Vec<_> = self.ring_closures.keys().collect();
            return Err(ChemError::Parse(format!(
                "unmatched ring closure(s): {:?}",
                open
            )));
        }
        Ok(())
    }

    fn parse_organic_atom(&mut self) -> ChemResult<()> {
        let Some(ch) = self.advance() else {
            return Err(self.error("unexpected end of SMILES"));
        };
        let is_aromatic = ch.is_ascii_lowercase();

        let symbol = match ch {
            b'B' if self.peek() == Some(b'r') => {
                self.advance();
                "Br"
            }
            b'C' if self.peek() == Some(b'l') => {
                self.advance();
                "Cl"
            }
            b'B' | b'b' => "B",
            b'C' | b'c' => "C",
            b'N' | b'n' => "N",
            b'O' | b'o' => "O",
            b'P' | b'p' => "P",
            b'S' | b's' => "S",
            b'F' => "F",
            b'I' => "I",
            _ => return Err(self.error(format!("unknown organic atom '{}'", ch as char))),
        };

        let element = element_by_symbol(symbol)
            .ok_or_else(|| self.error(format!("unknown element '{symbol}'")))?;

        self.push_atom(MolAtom {
            atomic_number: element.atomic_number,
            formal_charge: 0,
            isotope: None,
            is_aromatic,
            implicit_hydrogens: 0,
            bracket: false,
        })
    }

    fn parse_bracket_atom(&mut self) -> ChemResult<()> {
        self.advance(); // '['

        let isotope = self.parse_optional_number();

        let first = self
            .advance()
            .ok_or_else(|| self.error("unexpected end of SMILES in bracket atom"))?;
        if !first.is_ascii_alphabetic() {
            return Err(self.error(format!("invalid atom symbol '{}'", first as char)));
        }
        let is_aromatic = first.is_ascii_lowercase();

        let symbol = if is_aromatic {
            // 芳香方括号原子：b c n o p s se as
            match (first, self.peek()) {
                (b's', Some(b'e')) => {
                    self.advance();
                    "Se".to_string()
                }
                (b'a', Some(b's')) => {
                    self.advance();
                    "As".to_string()
                }
                (b'b' | b'c' | b'n' | b'o' | b'p' | b's', _) => {
                    (first.to_ascii_uppercase() as char).to_string()
                }
                _ => {
                    return Err(self.error(format!(
                        "'{}' cannot be aromatic",
                        first as char
                    )));
                }
            }
        } else {
            let single = (first as char).to_string();
            match self.peek() {
                Some(next) if next.is_ascii_lowercase() => {
                    let two_letter = format!("{}{}", first as char, next as char);
                    if element_by_symbol(&two_letter).is_some() {
                        self.advance();
                        two_letter
                    } else {
                        single
                    }
                }
                _ => single,
            }
        };

        let element = element_by_symbol(&symbol)
            .ok_or_else(|| self.error(format!("unknown element '{symbol}'")))?;

        // 手性标记 @ / @@，以及 @TH1 / @SP2 之类的扩展写法
        if self.peek() == Some(b'@') {
            while self.peek() == Some(b'@') {
                self.advance();
            }
            let rest = &self.input[self.pos..];
            if [b"TH", b"AL", b"SP", b"TB", b"OH"]
                .iter()
                .any(|class| rest.starts_with(*class))
            {
                self.pos += 2;
                self.parse_optional_number();
            }
        }

        let mut explicit_h = 0u8;
        if self.peek() == Some(b'H') {
            self.advance();
            explicit_h = match self.peek() {
                Some(d) if d.is_ascii_digit() => {
                    self.advance();
                    d - b'0'
                }
                _ => 1,
            };
        }

        let charge = self.parse_charge()?;

        // 原子类 :n
        if self.peek() == Some(b':') {
            self.advance();
            if self.parse_optional_number().is_none() {
                return Err(self.error("atom class ':' without a number"));
            }
        }

        if self.advance() != Some(b']') {
            return Err(self.error("expected ']' in bracket atom"));
        }

        self.push_atom(MolAtom {
            atomic_number: element.atomic_number,
            formal_charge: charge,
            isotope: isotope.map(|n| n as u16),
            is_aromatic,
            implicit_hydrogens: explicit_h,
            bracket: true,
        })
    }

    fn parse_charge(&mut self) -> ChemResult<i8> {
        let sign: i8 = match self.peek() {
            Some(b'+') => 1,
            Some(b'-') => -1,
            _ => return Ok(0),
        };
        let symbol = self.input[self.pos];
        self.advance();

        if let Some(d) = self.peek().filter(|d| d.is_ascii_digit()) {
            self.advance();
            return Ok(sign * (d - b'0') as i8);
        }

        let mut magnitude = 1i8;
        while self.peek() == Some(symbol) {
            self.advance();
            magnitude += 1;
            if magnitude > 8 {
                return Err(self.error("charge out of range"));
            }
        }
        Ok(sign * magnitude)
    }

    fn parse_optional_number(&mut self) -> Option<u32> {
        let mut n: u32 = 0;
        let mut found = false;
        while let Some(ch) = self.peek().filter(|c| c.is_ascii_digit()) {
            self.advance();
            n = n.saturating_mul(10).saturating_add((ch - b'0') as u32);
            found = true;
        }
        found.then_some(n)
    }

    fn parse_two_digit_label(&mut self) -> ChemResult<u16> {
        let d1 = self.advance();
        let d2 = self.advance();
        match (d1, d2) {
            (Some(a), Some(b)) if a.is_ascii_digit() && b.is_ascii_digit() => {
                Ok((a - b'0') as u16 * 10 + (b - b'0') as u16)
            }
            _ => Err(self.error("'%' must be followed by two digits")),
        }
    }

    fn handle_ring_closure(&mut self, label: u16) -> ChemResult<()> {
        if matches!(
            self.last,
            Token::Start | Token::Dot | Token::BranchOpen | Token::BranchClose
        ) {
            return Err(self.error(format!("ring closure {label} does not follow an atom")));
        }
        let current = self
            .prev_atom
            .ok_or_else(|| self.error("ring closure without a preceding atom"))?;

        if let Some((open_atom, open_bond)) = self.ring_closures.remove(&label) {
            if open_atom == current {
                return Err(self.error(format!("ring closure {label} bonds an atom to itself")));
            }
            if self
                .bonds
                .iter()
                .any(|b| (b.atom1 == open_atom && b.atom2 == current) || (b.atom1 == current && b.atom2 == open_atom))
            {
                return Err(self.error(format!("ring closure {label} duplicates an existing bond")));
            }
            let order = match (open_bond, self.pending_bond.take()) {
                (Some(a), Some(b)) if a != b => {
                    return Err(self.error(format!(
                        "conflicting bond orders on ring closure {label}"
                    )));
                }
                (Some(a), _) | (None, Some(a)) => a,
                (None, None) => self.default_order(open_atom, current),
            };
            self.bonds.push(Bond {
                atom1: open_atom,
                atom2: current,
                order,
            });
        } else {
            let pending = self.pending_bond.take();
            self.ring_closures.insert(label, (current, pending));
        }
        self.last = Token::RingClosure;
        Ok(())
    }

    fn push_atom(&mut self, atom: MolAtom) -> ChemResult<()> {
        let atom_idx = self.atoms.len();
        self.atoms.push(atom);
        if let Some(prev) = self.prev_atom {
            let order = self
                .pending_bond
                .take()
                .unwrap_or_else(|| self.default_order(prev, atom_idx));
            self.bonds.push(Bond {
                atom1: prev,
                atom2: atom_idx,
                order,
            });
        }
        self.pending_bond = None;
        self.prev_atom = Some(atom_idx);
        self.last = Token::Atom;
        Ok(())
    }

    /// 未写键符号时的默认键级：两端都是芳香原子则为芳香键
    fn default_order(&self, a1: usize, a2: usize) -> BondOrder {
        if self.atoms[a1].is_aromatic && self.atoms[a2].is_aromatic {
            BondOrder::Aromatic
        } else {
            BondOrder::Single
        }
    }
}

fn is_organic_atom_start(ch: u8) -> bool {
    matches!(
        ch,
        b'B' | b'C' | b'N' | b'O' | b'P' | b'S' | b'F' | b'I' | b'b' | b'c' | b'n' | b'o' | b'p' | b's'
    )
}

/// 两个芳香环之间未写键符号的连接键（如联苯）不在环上，按单键处理
fn demote_aromatic_bridges(mol: &mut Molecule) {
    let ring_bonds = ring_bond_flags(mol);
    for (bond, in_ring) in mol.bonds.iter_mut().zip(ring_bonds) {
        if bond.order == BondOrder::Aromatic && !in_ring {
            bond.order = BondOrder::Single;
        }
    }
}

/// 计算有机子集原子的隐式氢，同时检查价态
fn assign_implicit_hydrogens(mol: &mut Molecule) -> ChemResult<()> {
    for idx in 0..mol.atom_count() {
        let atom = &mol.atoms[idx];
        let Some(element) = element_by_number(atom.atomic_number) else {
            return Err(ChemError::Parse(format!(
                "unknown atomic number {}",
                atom.atomic_number
            )));
        };
        if atom.bracket {
            continue;
        }

        let sigma = mol.sigma_valence(idx);
        let max_valence = element
            .default_valences
            .last()
            .copied()
            .unwrap_or(0) as usize;

        let hydrogens = if atom.is_aromatic {
            // 芳香原子保留一个π电子
            let available = match element.atomic_number {
                6 | 5 => element.default_valences[0] as usize - 1,
                _ => 0,
            };
            let limit = match element.atomic_number {
                7 | 15 => 3,
                8 => 2,
                16 => 3,
                _ => max_valence,
            };
            if sigma > limit {
                return Err(ChemError::Parse(format!(
                    "aromatic atom {} ({}) has too many bonds",
                    idx, element.symbol
                )));
            }
            available.saturating_sub(sigma)
        } else {
            let Some(valence) = element
                .default_valences
                .iter()
                .map(|&v| v as usize)
                .find(|&v| v >= sigma)
            else {
                return Err(ChemError::Parse(format!(
                    "atom {} ({}) exceeds its allowed valence ({} > {})",
                    idx, element.symbol, sigma, max_valence
                )));
            };
            valence - sigma
        };

        mol.atoms[idx].implicit_hydrogens = hydrogens as u8;
    }
    Ok(())
}

fn check_aromatic_atoms_in_rings(mol: &Molecule) -> ChemResult<()> {
    let ring_bonds = ring_bond_flags(mol);
    for (idx, atom) in mol.atoms.iter().enumerate() {
        if !atom.is_aromatic {
            continue;
        }
        let in_ring = mol.adjacency[idx].iter().any(|&(_, bi)| ring_bonds[bi]);
        if !in_ring {
            return Err(ChemError::Parse(format!(
                "non-ring atom {} marked aromatic",
                idx
            )));
        }
    }
    Ok(())
}

/// 芳香原子是否需要一根π双键（在凯库勒式中）
fn needs_pi_bond(mol: &Molecule, idx: usize) -> bool {
    let atom = &mol.atoms[idx];
    let charge = atom.formal_charge as isize;
    let target: isize = match atom.atomic_number {
        6 => 4 - charge.abs(),
        5 => 3 + charge,
        7 | 15 => 3 + charge,
        8 | 16 | 34 => 2 + charge,
        33 => 3 + charge,
        _ => return false,
    };
    let used = (mol.sigma_valence(idx) + atom.implicit_hydrogens as usize) as isize;
    target - used >= 1
}

/// 凯库勒化检查：需要π键的芳香原子之间必须存在完美匹配
fn check_kekulization(mol: &Molecule) -> ChemResult<()> {
    let n = mol.atom_count();
    let needs: Vec<bool> = (0..n)
        .map(|i| mol.atoms[i].is_aromatic && needs_pi_bond(mol, i))
        .collect();

    let candidates: Vec<Vec<usize>> = (0..n)
        .map(|i| {
            if !needs[i] {
                return Vec::new();
            }
            mol.bonds_of(i)
                .filter(|(nb, b)| b.order == BondOrder::Aromatic && needs[*nb])
                .map(|(nb, _)| nb)
                .collect()
        })
        .collect();

    let mut matched: Vec<Option<usize>> = vec![None; n];
    let mut budget = 200_000usize;
    if !match_all(&needs, &candidates, &mut matched, &mut budget) {
        return Err(ChemError::Parse("can't kekulize aromatic system".into()));
    }
    Ok(())
}

/// 回溯求完美匹配，优先处理候选最少的原子
fn match_all(
    needs: &[bool],
    candidates: &[Vec<usize>],
    matched: &mut [Option<usize>],
    budget: &mut usize,
) -> bool {
    if *budget == 0 {
        return false;
    }
    *budget -= 1;

    let next = (0..needs.len())
        .filter(|&i| needs[i] && matched[i].is_none())
        .min_by_key(|&i| {
            candidates[i]
                .iter()
                .filter(|&&j| matched[j].is_none())
                .count()
        });

    let Some(atom) = next else {
        return true;
    };

    for &partner in &candidates[atom] {
        if matched[partner].is_some() {
            continue;
        }
        matched[atom] = Some(partner);
        matched[partner] = Some(atom);
        if match_all(needs, candidates, matched, budget) {
            return true;
        }
        matched[atom] = None;
        matched[partner] = None;
    }
    false
}
