//! SMILES 清洗与环闭合预检

/// SMILES 中允许出现的非字母数字符号
pub const ALLOWED_SYMBOLS: &str = "@+-[]()=#$:/.\\%";

pub fn is_allowed_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || ALLOWED_SYMBOLS.contains(c)
}

/// 过滤掉允许集合之外的字符
pub fn filter_allowed(raw: &str) -> String {
    raw.chars().filter(|&c| is_allowed_char(c)).collect()
}

/// 尽力修复候选 SMILES：去除首尾空白、过滤非法字符、补齐括号。
/// 只防止括号不配对这类低级错误，不保证化学合法。
pub fn sanitize_smiles(raw: &str) -> String {
    let filtered = filter_allowed(raw.trim());
    let open = filtered.matches('(').count();
    let close = filtered.matches(')').count();

    if open > close {
        let mut repaired = filtered;
        repaired.push_str(&")".repeat(open - close));
        repaired
    } else if close > open {
        let mut repaired = "(".repeat(close - open);
        repaired.push_str(&filtered);
        repaired
    } else {
        filtered
    }
}

/// 环闭合标签是否两两配对。
///
/// 方括号原子内的数字（同位素、氢数、电荷、原子类）不是环标签；
/// `%nn` 作为一个两位标签处理。每个标签必须恰好出现两次。
pub fn ring_closures_paired(smiles: &str) -> bool {
    let mut counts = [0u8; 100];
    let mut chars = smiles.chars().peekable();
    let mut in_bracket = false;

    while let Some(c) = chars.next() {
        match c {
            '[' => in_bracket = true,
            ']' => in_bracket = false,
            _ if in_bracket => {}
            '%' => {
                let tens = chars.next().and_then(|d| d.to_digit(10));
                let ones = chars.next().and_then(|d| d.to_digit(10));
                match (tens, ones) {
                    (Some(t), Some(o)) => {
                        let label = (t * 10 + o) as usize;
                        counts[label] = counts[label].saturating_add(1);
                    }
                    _ => return false,
                }
            }
            _ => {
                if let Some(d) = c.to_digit(10) {
                    counts[d as usize] = counts[d as usize].saturating_add(1);
                }
            }
        }
    }

    counts.iter().all(|&n| n == 0 || n == 2)
}

/// 环标签及其出现次数，供错误信息使用
pub fn unpaired_ring_labels(smiles: &str) -> Vec<String> {
    let mut counts = std::collections::BTreeMap::<String, usize>::new();
    let mut chars = smiles.chars();
    let mut in_bracket = false;
    while let Some(c) = chars.next() {
        match c {
            '[' => in_bracket = true,
            ']' => in_bracket = false,
            _ if in_bracket => {}
            '%' => {
                let label: String = chars.by_ref().take(2).collect();
                *counts.entry(format!("%{label}")).or_default() += 1;
            }
            _ if c.is_ascii_digit() => *counts.entry(c.to_string()).or_default() += 1,
            _ => {}
        }
    }
    counts
        .into_iter()
        .filter(|(_, n)| *n != 2)
        .map(|(label, _)| label)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_filters() {
        assert_eq!(sanitize_smiles("  CCO \n"), "CCO");
        assert_eq!(sanitize_smiles("C C O"), "CCO");
        assert_eq!(sanitize_smiles("c1ccccc1*"), "c1ccccc1");
        assert_eq!(sanitize_smiles("F/C=C\\F"), "F/C=C\\F");
        assert_eq!(sanitize_smiles("C%10CC%10"), "C%10CC%10");
    }

    #[test]
    fn balances_parentheses() {
        assert_eq!(sanitize_smiles("c1ccccc("), "c1ccccc()");
        assert_eq!(sanitize_smiles("CC(C(C"), "CC(C(C))");
        assert_eq!(sanitize_smiles("CC)O"), "(CC)O");
    }

    #[test]
    fn ring_labels_must_pair() {
        assert!(ring_closures_paired("c1ccccc1"));
        assert!(ring_closures_paired("CCO"));
        assert!(ring_closures_paired("c1ccc2ccccc2c1"));
        assert!(!ring_closures_paired("c1ccccc"));
        assert!(!ring_closures_paired("C1CC1C1CC1"));
    }

    #[test]
    fn bracket_digits_are_not_ring_labels() {
        assert!(ring_closures_paired("[13CH4]"));
        assert!(ring_closures_paired("[Fe+2]"));
        assert!(ring_closures_paired("[NH3+]C1CC1"));
    }

    #[test]
    fn two_digit_labels() {
        assert!(ring_closures_paired("C%10CCCCCCCCC%10"));
        assert!(!ring_closures_paired("C%10CCC"));
        assert!(!ring_closures_paired("C%1"));
        assert_eq!(unpaired_ring_labels("C%10CCC1"), vec!["%10", "1"]);
    }
}
