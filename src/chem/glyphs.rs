//! 结构图原子标签使用的简易笔画字体
//!
//! 每个字符由若干折线组成，坐标位于宽 4 的网格上：大写字母高 0..6（y 向下），
//! 小写字母从 2 开始，下伸部分到 8。只收录元素符号、数字与电荷符号用到的字符。

/// 字形宽度（网格单位）
pub const GLYPH_WIDTH: f32 = 4.0;
/// 相邻字符起点的间距
pub const ADVANCE: f32 = 5.5;
/// 大写字母高度，也是基线位置
pub const CAP_HEIGHT: f32 = 6.0;

type Polyline = &'static [(f32, f32)];

const O_RING: Polyline = &[
    (1.0, 0.0),
    (3.0, 0.0),
    (4.0, 1.0),
    (4.0, 5.0),
    (3.0, 6.0),
    (1.0, 6.0),
    (0.0, 5.0),
    (0.0, 1.0),
    (1.0, 0.0),
];
const O_SHAPE: &[Polyline] = &[O_RING];
const P_BOWL: Polyline = &[(0.0, 6.0), (0.0, 0.0), (3.0, 0.0), (4.0, 1.0), (4.0, 2.0), (3.0, 3.0), (0.0, 3.0)];
const LOWER_BOWL: Polyline = &[
    (0.0, 3.0),
    (1.0, 2.0),
    (3.0, 2.0),
    (4.0, 3.0),
    (4.0, 5.0),
    (3.0, 6.0),
    (1.0, 6.0),
    (0.0, 5.0),
];
const LOWER_BOWL_LEFT: Polyline = &[
    (4.0, 3.0),
    (3.0, 2.0),
    (1.0, 2.0),
    (0.0, 3.0),
    (0.0, 5.0),
    (1.0, 6.0),
    (3.0, 6.0),
    (4.0, 5.0),
];
const HUMP: Polyline = &[(0.0, 3.0), (1.0, 2.0), (3.0, 2.0), (4.0, 3.0), (4.0, 6.0)];

static GLYPHS: &[(char, &[Polyline])] = &[
    ('A', &[&[(0.0, 6.0), (2.0, 0.0), (4.0, 6.0)], &[(0.7, 4.0), (3.3, 4.0)]]),
    ('B', &[
        &[(0.0, 0.0), (0.0, 6.0), (3.0, 6.0), (4.0, 5.0), (4.0, 4.0), (3.0, 3.0), (0.0, 3.0)],
        &[(0.0, 0.0), (3.0, 0.0), (4.0, 1.0), (4.0, 2.0), (3.0, 3.0)],
    ]),
    ('C', &[&[
        (4.0, 1.0),
        (3.0, 0.0),
        (1.0, 0.0),
        (0.0, 1.0),
        (0.0, 5.0),
        (1.0, 6.0),
        (3.0, 6.0),
        (4.0, 5.0),
    ]]),
    ('D', &[&[(0.0, 0.0), (0.0, 6.0), (2.0, 6.0), (4.0, 4.0), (4.0, 2.0), (2.0, 0.0), (0.0, 0.0)]]),
    ('E', &[&[(4.0, 0.0), (0.0, 0.0), (0.0, 6.0), (4.0, 6.0)], &[(0.0, 3.0), (3.0, 3.0)]]),
    ('F', &[&[(4.0, 0.0), (0.0, 0.0), (0.0, 6.0)], &[(0.0, 3.0), (3.0, 3.0)]]),
    ('G', &[&[
        (4.0, 1.0),
        (3.0, 0.0),
        (1.0, 0.0),
        (0.0, 1.0),
        (0.0, 5.0),
        (1.0, 6.0),
        (3.0, 6.0),
        (4.0, 5.0),
        (4.0, 3.0),
        (2.0, 3.0),
    ]]),
    ('H', &[&[(0.0, 0.0), (0.0, 6.0)], &[(4.0, 0.0), (4.0, 6.0)], &[(0.0, 3.0), (4.0, 3.0)]]),
    ('I', &[&[(1.0, 0.0), (3.0, 0.0)], &[(2.0, 0.0), (2.0, 6.0)], &[(1.0, 6.0), (3.0, 6.0)]]),
    ('J', &[&[(4.0, 0.0), (4.0, 5.0), (3.0, 6.0), (1.0, 6.0), (0.0, 5.0)]]),
    ('K', &[&[(0.0, 0.0), (0.0, 6.0)], &[(4.0, 0.0), (0.0, 4.0)], &[(1.3, 2.7), (4.0, 6.0)]]),
    ('L', &[&[(0.0, 0.0), (0.0, 6.0), (4.0, 6.0)]]),
    ('M', &[&[(0.0, 6.0), (0.0, 0.0), (2.0, 3.0), (4.0, 0.0), (4.0, 6.0)]]),
    ('N', &[&[(0.0, 6.0), (0.0, 0.0), (4.0, 6.0), (4.0, 0.0)]]),
    ('O', O_SHAPE),
    ('0', O_SHAPE),
    ('P', &[P_BOWL]),
    ('Q', &[O_RING, &[(2.5, 4.5), (4.0, 6.0)]]),
    ('R', &[P_BOWL, &[(2.0, 3.0), (4.0, 6.0)]]),
    ('S', &[&[
        (4.0, 1.0),
        (3.0, 0.0),
        (1.0, 0.0),
        (0.0, 1.0),
        (0.0, 2.0),
        (1.0, 3.0),
        (3.0, 3.0),
        (4.0, 4.0),
        (4.0, 5.0),
        (3.0, 6.0),
        (1.0, 6.0),
        (0.0, 5.0),
    ]]),
    ('T', &[&[(0.0, 0.0), (4.0, 0.0)], &[(2.0, 0.0), (2.0, 6.0)]]),
    ('U', &[&[(0.0, 0.0), (0.0, 5.0), (1.0, 6.0), (3.0, 6.0), (4.0, 5.0), (4.0, 0.0)]]),
    ('V', &[&[(0.0, 0.0), (2.0, 6.0), (4.0, 0.0)]]),
    ('W', &[&[(0.0, 0.0), (1.0, 6.0), (2.0, 3.0), (3.0, 6.0), (4.0, 0.0)]]),
    ('X', &[&[(0.0, 0.0), (4.0, 6.0)], &[(4.0, 0.0), (0.0, 6.0)]]),
    ('Y', &[&[(0.0, 0.0), (2.0, 3.0), (4.0, 0.0)], &[(2.0, 3.0), (2.0, 6.0)]]),
    ('Z', &[&[(0.0, 0.0), (4.0, 0.0), (0.0, 6.0), (4.0, 6.0)]]),

    ('a', &[
        &[(0.5, 2.0), (3.0, 2.0), (4.0, 3.0), (4.0, 6.0)],
        &[(4.0, 4.0), (1.0, 4.0), (0.0, 5.0), (1.0, 6.0), (4.0, 6.0)],
    ]),
    ('b', &[&[(0.0, 0.0), (0.0, 6.0)], LOWER_BOWL]),
    ('c', &[&[(4.0, 2.0), (1.0, 2.0), (0.0, 3.0), (0.0, 5.0), (1.0, 6.0), (4.0, 6.0)]]),
    ('d', &[&[(4.0, 0.0), (4.0, 6.0)], LOWER_BOWL_LEFT]),
    ('e', &[&[
        (0.0, 4.0),
        (4.0, 4.0),
        (4.0, 3.0),
        (3.0, 2.0),
        (1.0, 2.0),
        (0.0, 3.0),
        (0.0, 5.0),
        (1.0, 6.0),
        (4.0, 6.0),
    ]]),
    ('f', &[&[(3.5, 0.0), (2.0, 0.0), (1.0, 1.0), (1.0, 6.0)], &[(0.0, 2.0), (3.0, 2.0)]]),
    ('g', &[&[(4.0, 2.0), (4.0, 7.0), (3.0, 8.0), (0.0, 8.0)], LOWER_BOWL_LEFT]),
    ('h', &[&[(0.0, 0.0), (0.0, 6.0)], HUMP]),
    ('i', &[&[(2.0, 2.0), (2.0, 6.0)], &[(2.0, 0.4), (2.0, 0.6)]]),
    ('k', &[&[(0.0, 0.0), (0.0, 6.0)], &[(3.5, 2.0), (0.0, 4.5)], &[(1.2, 3.7), (3.5, 6.0)]]),
    ('l', &[&[(2.0, 0.0), (2.0, 6.0)]]),
    ('m', &[
        &[(0.0, 2.0), (0.0, 6.0)],
        &[(0.0, 3.0), (1.0, 2.0), (2.0, 3.0), (2.0, 6.0)],
        &[(2.0, 3.0), (3.0, 2.0), (4.0, 3.0), (4.0, 6.0)],
    ]),
    ('n', &[&[(0.0, 2.0), (0.0, 6.0)], HUMP]),
    ('o', &[&[
        (1.0, 2.0),
        (3.0, 2.0),
        (4.0, 3.0),
        (4.0, 5.0),
        (3.0, 6.0),
        (1.0, 6.0),
        (0.0, 5.0),
        (0.0, 3.0),
        (1.0, 2.0),
    ]]),
    ('p', &[&[(0.0, 2.0), (0.0, 8.0)], LOWER_BOWL]),
    ('r', &[&[(0.0, 2.0), (0.0, 6.0)], &[(0.0, 4.0), (2.0, 2.0), (4.0, 2.0)]]),
    ('s', &[&[
        (4.0, 2.0),
        (1.0, 2.0),
        (0.0, 3.0),
        (1.0, 4.0),
        (3.0, 4.0),
        (4.0, 5.0),
        (3.0, 6.0),
        (0.0, 6.0),
    ]]),
    ('t', &[&[(2.0, 0.0), (2.0, 5.0), (3.0, 6.0), (4.0, 6.0)], &[(0.0, 2.0), (4.0, 2.0)]]),
    ('u', &[&[(0.0, 2.0), (0.0, 5.0), (1.0, 6.0), (3.0, 6.0), (4.0, 5.0)], &[(4.0, 2.0), (4.0, 6.0)]]),
    ('v', &[&[(0.0, 2.0), (2.0, 6.0), (4.0, 2.0)]]),
    ('y', &[&[(0.0, 2.0), (2.0, 6.0)], &[(4.0, 2.0), (1.0, 8.0)]]),

    ('1', &[&[(1.0, 1.0), (2.0, 0.0), (2.0, 6.0)], &[(1.0, 6.0), (3.0, 6.0)]]),
    ('2', &[&[(0.0, 1.0), (1.0, 0.0), (3.0, 0.0), (4.0, 1.0), (4.0, 2.0), (0.0, 6.0), (4.0, 6.0)]]),
    ('3', &[
        &[
            (0.0, 1.0),
            (1.0, 0.0),
            (3.0, 0.0),
            (4.0, 1.0),
            (4.0, 2.0),
            (3.0, 3.0),
            (4.0, 4.0),
            (4.0, 5.0),
            (3.0, 6.0),
            (1.0, 6.0),
            (0.0, 5.0),
        ],
        &[(1.0, 3.0), (3.0, 3.0)],
    ]),
    ('4', &[&[(3.0, 6.0), (3.0, 0.0), (0.0, 4.0), (4.0, 4.0)]]),
    ('5', &[&[
        (4.0, 0.0),
        (0.0, 0.0),
        (0.0, 3.0),
        (3.0, 3.0),
        (4.0, 4.0),
        (4.0, 5.0),
        (3.0, 6.0),
        (0.0, 6.0),
    ]]),
    ('6', &[&[
        (4.0, 0.0),
        (2.0, 0.0),
        (0.0, 2.0),
        (0.0, 5.0),
        (1.0, 6.0),
        (3.0, 6.0),
        (4.0, 5.0),
        (4.0, 4.0),
        (3.0, 3.0),
        (0.0, 3.0),
    ]]),
    ('7', &[&[(0.0, 0.0), (4.0, 0.0), (1.0, 6.0)]]),
    ('8', &[
        &[
            (1.0, 3.0),
            (0.0, 4.0),
            (0.0, 5.0),
            (1.0, 6.0),
            (3.0, 6.0),
            (4.0, 5.0),
            (4.0, 4.0),
            (3.0, 3.0),
            (1.0, 3.0),
        ],
        &[(1.0, 3.0), (0.0, 2.0), (0.0, 1.0), (1.0, 0.0), (3.0, 0.0), (4.0, 1.0), (4.0, 2.0), (3.0, 3.0)],
    ]),
    ('9', &[&[
        (4.0, 3.0),
        (1.0, 3.0),
        (0.0, 2.0),
        (0.0, 1.0),
        (1.0, 0.0),
        (3.0, 0.0),
        (4.0, 1.0),
        (4.0, 4.0),
        (2.0, 6.0),
        (0.0, 6.0),
    ]]),

    ('+', &[&[(2.0, 1.5), (2.0, 4.5)], &[(0.5, 3.0), (3.5, 3.0)]]),
    ('-', &[&[(0.5, 3.0), (3.5, 3.0)]]),
];

/// 字符的笔画；未收录的字符返回 None
pub fn glyph(c: char) -> Option<&'static [Polyline]> {
    GLYPHS.iter().find(|(ch, _)| *ch == c).map(|(_, strokes)| *strokes)
}

/// 按给定缩放排版后文本的宽度（像素）
pub fn text_width(text: &str, scale: f32) -> f32 {
    match text.chars().count() {
        0 => 0.0,
        n => ((n - 1) as f32 * ADVANCE + GLYPH_WIDTH) * scale,
    }
}

/// 把文本转换成像素坐标下的折线，origin 为左上角
pub fn layout_text(text: &str, origin: (f32, f32), scale: f32) -> Vec<Vec<(f32, f32)>> {
    let mut lines = Vec::new();
    for (i, c) in text.chars().enumerate() {
        let Some(strokes) = glyph(c) else { continue };
        let x0 = origin.0 + i as f32 * ADVANCE * scale;
        for stroke in strokes {
            lines.push(
                stroke
                    .iter()
                    .map(|&(x, y)| (x0 + x * scale, origin.1 + y * scale))
                    .collect(),
            );
        }
    }
    lines
}
