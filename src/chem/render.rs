//! 结构式渲染：分子图 -> PNG

use base64::{Engine as _, engine::general_purpose};
use tiny_skia::{
    Color, FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, StrokeDash, Transform,
};

use crate::chem::element::symbol_of;
use crate::chem::glyphs::{CAP_HEIGHT, layout_text, text_width};
use crate::chem::layout::{Point, compute_2d_coords};
use crate::chem::molecule::{BondOrder, MolAtom, Molecule};
use crate::chem::smiles::parse_smiles;
use crate::chem::{ChemError, ChemResult};

const MARGIN: f32 = 40.0;
const STROKE_WIDTH: f32 = 2.5;
/// 多重键平行线的间距（像素）
const MULTI_BOND_OFFSET: f32 = 5.0;
const ATOM_RADIUS: f32 = 9.0;
/// 允许的最大键长（像素），避免小分子被放得过大
const MAX_BOND_PIXELS: f32 = 60.0;
/// 标签字高（像素）
const LABEL_HEIGHT: f32 = 13.0;
/// 图像边长上限，超出时拒绝分配画布
pub const MAX_IMAGE_SIZE: u32 = 4096;

/// 解析 SMILES 并渲染为 size x size 的 PNG
pub fn render_png(smiles: &str, size: u32) -> ChemResult<Vec<u8>> {
    let mol = parse_smiles(smiles)?;
    render_molecule(&mol, size)
}

/// 渲染并进行 base64 编码，用于嵌入报告
pub fn render_png_base64(smiles: &str, size: u32) -> ChemResult<String> {
    let png = render_png(smiles, size)?;
    Ok(general_purpose::STANDARD.encode(png))
}

pub fn render_molecule(mol: &Molecule, size: u32) -> ChemResult<Vec<u8>> {
    draw_molecule(mol, size)?
        .encode_png()
        .map_err(|e| ChemError::Render(format!("PNG encoding failed: {e}")))
}

fn draw_molecule(mol: &Molecule, size: u32) -> ChemResult<Pixmap> {
    if size == 0 || size > MAX_IMAGE_SIZE {
        return Err(ChemError::Render(format!(
            "invalid image size {size} (expected 1..={MAX_IMAGE_SIZE})"
        )));
    }
    let mut pixmap = Pixmap::new(size, size)
        .ok_or_else(|| ChemError::Render(format!("invalid image size {size}")))?;
    pixmap.fill(Color::WHITE);

    let coords = compute_2d_coords(mol)?;
    let points = fit_to_canvas(&coords, size as f32);

    let mut paint = Paint::default();
    paint.anti_alias = true;
    paint.set_color_rgba8(30, 30, 30, 255);

    let solid = Stroke {
        width: STROKE_WIDTH,
        line_cap: LineCap::Round,
        ..Stroke::default()
    };
    let dashed = Stroke {
        dash: StrokeDash::new(vec![4.0, 3.0], 0.0),
        ..solid.clone()
    };

    for bond in &mol.bonds {
        let (a, b) = (points[bond.atom1], points[bond.atom2]);
        let lines: Vec<(f32, &Stroke)> = match bond.order {
            BondOrder::Single => vec![(0.0, &solid)],
            BondOrder::Double => vec![(-0.5, &solid), (0.5, &solid)],
            BondOrder::Triple => vec![(-1.0, &solid), (0.0, &solid), (1.0, &solid)],
            BondOrder::Quadruple => vec![
                (-1.5, &solid),
                (-0.5, &solid),
                (0.5, &solid),
                (1.5, &solid),
            ],
            BondOrder::Aromatic => vec![(-0.5, &solid), (0.5, &dashed)],
        };
        for (shift, stroke) in lines {
            draw_line(&mut pixmap, &paint, stroke, a, b, shift * MULTI_BOND_OFFSET)?;
        }
    }

    // 杂原子、孤立原子与带电碳写出元素符号
    for (idx, atom) in mol.atoms.iter().enumerate() {
        let isolated = mol.degree(idx) == 0;
        if atom.atomic_number == 6 && !isolated && atom.formal_charge == 0 {
            continue;
        }
        draw_label(&mut pixmap, atom, points[idx]);
    }

    Ok(pixmap)
}

/// 元素符号加电荷，如 `Cl`、`N+`、`Fe2+`
pub fn label_text(atom: &MolAtom) -> String {
    format!("{}{}", symbol_of(atom.atomic_number), charge_text(atom.formal_charge))
}

fn charge_text(charge: i8) -> String {
    let sign = if charge > 0 { "+" } else { "-" };
    match charge.unsigned_abs() {
        0 => String::new(),
        1 => sign.to_string(),
        n => format!("{n}{sign}"),
    }
}

/// 在原子位置画白底，再用 CPK 颜色写出符号，电荷以上标形式跟在右上方
fn draw_label(pixmap: &mut Pixmap, atom: &MolAtom, (x, y): (f32, f32)) {
    let scale = LABEL_HEIGHT / CAP_HEIGHT;
    let symbol = symbol_of(atom.atomic_number);
    let width = text_width(symbol, scale);

    let mut background = Paint::default();
    background.anti_alias = true;
    background.set_color(Color::WHITE);
    let radius = width.max(LABEL_HEIGHT) / 2.0 + 3.0;
    if let Some(circle) = PathBuilder::from_circle(x, y, radius) {
        pixmap.fill_path(&circle, &background, FillRule::Winding, Transform::identity(), None);
    }

    let (r, g, b) = cpk_color(atom.atomic_number);
    let mut ink = Paint::default();
    ink.anti_alias = true;
    ink.set_color_rgba8(r, g, b, 255);

    let origin = (x - width / 2.0, y - LABEL_HEIGHT / 2.0);
    stroke_text(pixmap, &ink, symbol, origin, scale);

    let charge = charge_text(atom.formal_charge);
    if !charge.is_empty() {
        let small = scale * 0.6;
        let origin = (x + width / 2.0 + 1.0, y - LABEL_HEIGHT / 2.0 - small * 2.0);
        stroke_text(pixmap, &ink, &charge, origin, small);
    }
}

fn stroke_text(pixmap: &mut Pixmap, paint: &Paint, text: &str, origin: (f32, f32), scale: f32) {
    let mut pb = PathBuilder::new();
    for line in layout_text(text, origin, scale) {
        let mut points = line.into_iter();
        if let Some((x, y)) = points.next() {
            pb.move_to(x, y);
            for (x, y) in points {
                pb.line_to(x, y);
            }
        }
    }
    let Some(path) = pb.finish() else { return };
    let stroke = Stroke {
        width: (scale * 0.75).max(1.0),
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Stroke::default()
    };
    pixmap.stroke_path(&path, paint, &stroke, Transform::identity(), None);
}

fn draw_line(
    pixmap: &mut Pixmap,
    paint: &Paint,
    stroke: &Stroke,
    a: (f32, f32),
    b: (f32, f32),
    offset: f32,
) -> ChemResult<()> {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len = (dx * dx + dy * dy).sqrt().max(1e-3);
    // 法向量
    let (nx, ny) = (-dy / len * offset, dx / len * offset);

    let mut pb = PathBuilder::new();
    pb.move_to(a.0 + nx, a.1 + ny);
    pb.line_to(b.0 + nx, b.1 + ny);
    let path = pb
        .finish()
        .ok_or_else(|| ChemError::Render("failed to build bond path".into()))?;
    pixmap.stroke_path(&path, paint, stroke, Transform::identity(), None);
    Ok(())
}

/// 把布局坐标等比缩放进画布并居中，y 轴向下
fn fit_to_canvas(coords: &[Point], size: f32) -> Vec<(f32, f32)> {
    let (min_x, max_x, min_y, max_y) = coords.iter().fold(
        (f64::MAX, f64::MIN, f64::MAX, f64::MIN),
        |(a, b, c, d), p| (a.min(p.x), b.max(p.x), c.min(p.y), d.max(p.y)),
    );
    let width = (max_x - min_x) as f32;
    let height = (max_y - min_y) as f32;
    let available = (size - 2.0 * MARGIN).max(1.0);
    let extent = width.max(height);
    let scale = if extent > 0.0 {
        (available / extent).min(MAX_BOND_PIXELS)
    } else {
        1.0
    };

    let center_x = ((min_x + max_x) / 2.0) as f32;
    let center_y = ((min_y + max_y) / 2.0) as f32;
    coords
        .iter()
        .map(|p| {
            (
                size / 2.0 + (p.x as f32 - center_x) * scale,
                size / 2.0 - (p.y as f32 - center_y) * scale,
            )
        })
        .collect()
}

fn cpk_color(atomic_number: u8) -> (u8, u8, u8) {
    match atomic_number {
        1 => (200, 200, 200),
        6 => (60, 60, 60),
        7 => (48, 80, 248),
        8 => (255, 13, 13),
        9 | 17 => (31, 200, 31),
        15 => (255, 128, 0),
        16 => (220, 200, 40),
        35 => (166, 41, 41),
        53 => (148, 0, 148),
        _ => (221, 119, 255),
    }
}
