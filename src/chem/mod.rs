//! 进程内化学信息工具包：SMILES 解析、结构校验、描述符计算与结构图渲染。
//!
//! 分子对象只在单次校验或计算中存在，每次调用都会重新解析。

pub mod aromaticity;
pub mod element;
pub mod glyphs;
pub mod layout;
pub mod molecule;
pub mod properties;
pub mod render;
pub mod ring;
pub mod smiles;

use thiserror::Error;

pub use molecule::{Bond, BondOrder, MolAtom, Molecule};
pub use properties::{MoleculeProperties, PropertyValue};
pub use render::{MAX_IMAGE_SIZE, render_png, render_png_base64};
pub use smiles::parse_smiles;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ChemError {
    #[error("invalid SMILES: {0}")]
    Parse(String),
    #[error("layout failed: {0}")]
    Layout(String),
    #[error("rendering failed: {0}")]
    Render(String),
}

pub type ChemResult<T> = Result<T, ChemError>;

/// SMILES 是否可被解析为化学上合理的分子
pub fn validate_smiles(smiles: &str) -> bool {
    parse_smiles(smiles).is_ok()
}

/// 计算分子描述符；无法解析时返回空映射而不是错误
pub fn get_molecule_properties(smiles: &str) -> MoleculeProperties {
    match parse_smiles(smiles) {
        Ok(mol) => properties::compute_properties(&mol),
        Err(_) => MoleculeProperties::empty(),
    }
}
