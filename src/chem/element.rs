//! 元素周期表数据

/// 周期表中的一个元素
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Element {
    pub atomic_number: u8,
    pub symbol: &'static str,
    pub atomic_weight: f64,
    /// SMILES有机子集允许的价态（升序），为空表示必须写在方括号内
    pub default_valences: &'static [u8],
}

const NONE: &[u8] = &[];

/// H 到 Og；金属与稀有气体没有默认价态，只能写在方括号内
static ELEMENTS: [Element; 118] = [
    Element { atomic_number: 1, symbol: "H", atomic_weight: 1.008, default_valences: &[1] },
    Element { atomic_number: 2, symbol: "He", atomic_weight: 4.003, default_valences: NONE },
    Element { atomic_number: 3, symbol: "Li", atomic_weight: 6.941, default_valences: NONE },
    Element { atomic_number: 4, symbol: "Be", atomic_weight: 9.012, default_valences: NONE },
    Element { atomic_number: 5, symbol: "B", atomic_weight: 10.812, default_valences: &[3] },
    Element { atomic_number: 6, symbol: "C", atomic_weight: 12.011, default_valences: &[4] },
    Element { atomic_number: 7, symbol: "N", atomic_weight: 14.007, default_valences: &[3, 5] },
    Element { atomic_number: 8, symbol: "O", atomic_weight: 15.999, default_valences: &[2] },
    Element { atomic_number: 9, symbol: "F", atomic_weight: 18.998, default_valences: &[1] },
    Element { atomic_number: 10, symbol: "Ne", atomic_weight: 20.180, default_valences: NONE },
    Element { atomic_number: 11, symbol: "Na", atomic_weight: 22.990, default_valences: NONE },
    Element { atomic_number: 12, symbol: "Mg", atomic_weight: 24.305, default_valences: NONE },
    Element { atomic_number: 13, symbol: "Al", atomic_weight: 26.982, default_valences: NONE },
    Element { atomic_number: 14, symbol: "Si", atomic_weight: 28.086, default_valences: NONE },
    Element { atomic_number: 15, symbol: "P", atomic_weight: 30.974, default_valences: &[3, 5] },
    Element { atomic_number: 16, symbol: "S", atomic_weight: 32.067, default_valences: &[2, 4, 6] },
    Element { atomic_number: 17, symbol: "Cl", atomic_weight: 35.453, default_valences: &[1] },
    Element { atomic_number: 18, symbol: "Ar", atomic_weight: 39.948, default_valences: NONE },
    Element { atomic_number: 19, symbol: "K", atomic_weight: 39.098, default_valences: NONE },
    Element { atomic_number: 20, symbol: "Ca", atomic_weight: 40.078, default_valences: NONE },
    Element { atomic_number: 21, symbol: "Sc", atomic_weight: 44.956, default_valences: NONE },
    Element { atomic_number: 22, symbol: "Ti", atomic_weight: 47.867, default_valences: NONE },
    Element { atomic_number: 23, symbol: "V", atomic_weight: 50.942, default_valences: NONE },
    Element { atomic_number: 24, symbol: "Cr", atomic_weight: 51.996, default_valences: NONE },
    Element { atomic_number: 25, symbol: "Mn", atomic_weight: 54.938, default_valences: NONE },
    Element { atomic_number: 26, symbol: "Fe", atomic_weight: 55.845, default_valences: NONE },
    Element { atomic_number: 27, symbol: "Co", atomic_weight: 58.933, default_valences: NONE },
    Element { atomic_number: 28, symbol: "Ni", atomic_weight: 58.693, default_valences: NONE },
    Element { atomic_number: 29, symbol: "Cu", atomic_weight: 63.546, default_valences: NONE },
    Element { atomic_number: 30, symbol: "Zn", atomic_weight: 65.38, default_valences: NONE },
    Element { atomic_number: 31, symbol: "Ga", atomic_weight: 69.723, default_valences: NONE },
    Element { atomic_number: 32, symbol: "Ge", atomic_weight: 72.63, default_valences: NONE },
    Element { atomic_number: 33, symbol: "As", atomic_weight: 74.922, default_valences: NONE },
    Element { atomic_number: 34, symbol: "Se", atomic_weight: 78.96, default_valences: NONE },
    Element { atomic_number: 35, symbol: "Br", atomic_weight: 79.904, default_valences: &[1] },
    Element { atomic_number: 36, symbol: "Kr", atomic_weight: 83.798, default_valences: NONE },
    Element { atomic_number: 37, symbol: "Rb", atomic_weight: 85.468, default_valences: NONE },
    Element { atomic_number: 38, symbol: "Sr", atomic_weight: 87.62, default_valences: NONE },
    Element { atomic_number: 39, symbol: "Y", atomic_weight: 88.906, default_valences: NONE },
    Element { atomic_number: 40, symbol: "Zr", atomic_weight: 91.224, default_valences: NONE },
    Element { atomic_number: 41, symbol: "Nb", atomic_weight: 92.906, default_valences: NONE },
    Element { atomic_number: 42, symbol: "Mo", atomic_weight: 95.95, default_valences: NONE },
    Element { atomic_number: 43, symbol: "Tc", atomic_weight: 98.0, default_valences: NONE },
    Element { atomic_number: 44, symbol: "Ru", atomic_weight: 101.07, default_valences: NONE },
    Element { atomic_number: 45, symbol: "Rh", atomic_weight: 102.906, default_valences: NONE },
    Element { atomic_number: 46, symbol: "Pd", atomic_weight: 106.42, default_valences: NONE },
    Element { atomic_number: 47, symbol: "Ag", atomic_weight: 107.868, default_valences: NONE },
    Element { atomic_number: 48, symbol: "Cd", atomic_weight: 112.414, default_valences: NONE },
    Element { atomic_number: 49, symbol: "In", atomic_weight: 114.818, default_valences: NONE },
    Element { atomic_number: 50, symbol: "Sn", atomic_weight: 118.710, default_valences: NONE },
    Element { atomic_number: 51, symbol: "Sb", atomic_weight: 121.760, default_valences: NONE },
    Element { atomic_number: 52, symbol: "Te", atomic_weight: 127.60, default_valences: NONE },
    Element { atomic_number: 53, symbol: "I", atomic_weight: 126.904, default_valences: &[1] },
    Element { atomic_number: 54, symbol: "Xe", atomic_weight: 131.293, default_valences: NONE },
    Element { atomic_number: 55, symbol: "Cs", atomic_weight: 132.905, default_valences: NONE },
    Element { atomic_number: 56, symbol: "Ba", atomic_weight: 137.327, default_valences: NONE },
    Element { atomic_number: 57, symbol: "La", atomic_weight: 138.905, default_valences: NONE },
    Element { atomic_number: 58, symbol: "Ce", atomic_weight: 140.116, default_valences: NONE },
    Element { atomic_number: 59, symbol: "Pr", atomic_weight: 140.908, default_valences: NONE },
    Element { atomic_number: 60, symbol: "Nd", atomic_weight: 144.242, default_valences: NONE },
    Element { atomic_number: 61, symbol: "Pm", atomic_weight: 145.0, default_valences: NONE },
    Element { atomic_number: 62, symbol: "Sm", atomic_weight: 150.36, default_valences: NONE },
    Element { atomic_number: 63, symbol: "Eu", atomic_weight: 151.964, default_valences: NONE },
    Element { atomic_number: 64, symbol: "Gd", atomic_weight: 157.25, default_valences: NONE },
    Element { atomic_number: 65, symbol: "Tb", atomic_weight: 158.925, default_valences: NONE },
    Element { atomic_number: 66, symbol: "Dy", atomic_weight: 162.500, default_valences: NONE },
    Element { atomic_number: 67, symbol: "Ho", atomic_weight: 164.930, default_valences: NONE },
    Element { atomic_number: 68, symbol: "Er", atomic_weight: 167.259, default_valences: NONE },
    Element { atomic_number: 69, symbol: "Tm", atomic_weight: 168.934, default_valences: NONE },
    Element { atomic_number: 70, symbol: "Yb", atomic_weight: 173.045, default_valences: NONE },
    Element { atomic_number: 71, symbol: "Lu", atomic_weight: 174.967, default_valences: NONE },
    Element { atomic_number: 72, symbol: "Hf", atomic_weight: 178.49, default_valences: NONE },
    Element { atomic_number: 73, symbol: "Ta", atomic_weight: 180.948, default_valences: NONE },
    Element { atomic_number: 74, symbol: "W", atomic_weight: 183.84, default_valences: NONE },
    Element { atomic_number: 75, symbol: "Re", atomic_weight: 186.207, default_valences: NONE },
    Element { atomic_number: 76, symbol: "Os", atomic_weight: 190.23, default_valences: NONE },
    Element { atomic_number: 77, symbol: "Ir", atomic_weight: 192.217, default_valences: NONE },
    Element { atomic_number: 78, symbol: "Pt", atomic_weight: 195.084, default_valences: NONE },
    Element { atomic_number: 79, symbol: "Au", atomic_weight: 196.967, default_valences: NONE },
    Element { atomic_number: 80, symbol: "Hg", atomic_weight: 200.592, default_valences: NONE },
    Element { atomic_number: 81, symbol: "Tl", atomic_weight: 204.383, default_valences: NONE },
    Element { atomic_number: 82, symbol: "Pb", atomic_weight: 207.2, default_valences: NONE },
    Element { atomic_number: 83, symbol: "Bi", atomic_weight: 208.980, default_valences: NONE },
    Element { atomic_number: 84, symbol: "Po", atomic_weight: 209.0, default_valences: NONE },
    Element { atomic_number: 85, symbol: "At", atomic_weight: 210.0, default_valences: NONE },
    Element { atomic_number: 86, symbol: "Rn", atomic_weight: 222.0, default_valences: NONE },
    Element { atomic_number: 87, symbol: "Fr", atomic_weight: 223.0, default_valences: NONE },
    Element { atomic_number: 88, symbol: "Ra", atomic_weight: 226.0, default_valences: NONE },
    Element { atomic_number: 89, symbol: "Ac", atomic_weight: 227.0, default_valences: NONE },
    Element { atomic_number: 90, symbol: "Th", atomic_weight: 232.038, default_valences: NONE },
    Element { atomic_number: 91, symbol: "Pa", atomic_weight: 231.036, default_valences: NONE },
    Element { atomic_number: 92, symbol: "U", atomic_weight: 238.029, default_valences: NONE },
    Element { atomic_number: 93, symbol: "Np", atomic_weight: 237.0, default_valences: NONE },
    Element { atomic_number: 94, symbol: "Pu", atomic_weight: 244.0, default_valences: NONE },
    Element { atomic_number: 95, symbol: "Am", atomic_weight: 243.0, default_valences: NONE },
    Element { atomic_number: 96, symbol: "Cm", atomic_weight: 247.0, default_valences: NONE },
    Element { atomic_number: 97, symbol: "Bk", atomic_weight: 247.0, default_valences: NONE },
    Element { atomic_number: 98, symbol: "Cf", atomic_weight: 251.0, default_valences: NONE },
    Element { atomic_number: 99, symbol: "Es", atomic_weight: 252.0, default_valences: NONE },
    Element { atomic_number: 100, symbol: "Fm", atomic_weight: 257.0, default_valences: NONE },
    Element { atomic_number: 101, symbol: "Md", atomic_weight: 258.0, default_valences: NONE },
    Element { atomic_number: 102, symbol: "No", atomic_weight: 259.0, default_valences: NONE },
    Element { atomic_number: 103, symbol: "Lr", atomic_weight: 262.0, default_valences: NONE },
    Element { atomic_number: 104, symbol: "Rf", atomic_weight: 267.0, default_valences: NONE },
    Element { atomic_number: 105, symbol: "Db", atomic_weight: 268.0, default_valences: NONE },
    Element { atomic_number: 106, symbol: "Sg", atomic_weight: 269.0, default_valences: NONE },
    Element { atomic_number: 107, symbol: "Bh", atomic_weight: 270.0, default_valences: NONE },
    Element { atomic_number: 108, symbol: "Hs", atomic_weight: 269.0, default_valences: NONE },
    Element { atomic_number: 109, symbol: "Mt", atomic_weight: 278.0, default_valences: NONE },
    Element { atomic_number: 110, symbol: "Ds", atomic_weight: 281.0, default_valences: NONE },
    Element { atomic_number: 111, symbol: "Rg", atomic_weight: 282.0, default_valences: NONE },
    Element { atomic_number: 112, symbol: "Cn", atomic_weight: 285.0, default_valences: NONE },
    Element { atomic_number: 113, symbol: "Nh", atomic_weight: 286.0, default_valences: NONE },
    Element { atomic_number: 114, symbol: "Fl", atomic_weight: 289.0, default_valences: NONE },
    Element { atomic_number: 115, symbol: "Mc", atomic_weight: 290.0, default_valences: NONE },
    Element { atomic_number: 116, symbol: "Lv", atomic_weight: 293.0, default_valences: NONE },
    Element { atomic_number: 117, symbol: "Ts", atomic_weight: 294.0, default_valences: NONE },
    Element { atomic_number: 118, symbol: "Og", atomic_weight: 294.0, default_valences: NONE },
];

/// 按元素符号查找（区分大小写，如 "C"、"Cl"）
pub fn element_by_symbol(symbol: &str) -> Option<&'static Element> {
    ELEMENTS.iter().find(|e| e.symbol == symbol)
}

/// 按原子序数查找
pub fn element_by_number(n: u8) -> Option<&'static Element> {
    if (1..=ELEMENTS.len() as u8).contains(&n) {
        Some(&ELEMENTS[(n - 1) as usize])
    } else {
        None
    }
}

/// 元素符号，未知元素返回 "?"
pub fn symbol_of(n: u8) -> &'static str {
    element_by_number(n).map(|e| e.symbol).unwrap_or("?")
}
