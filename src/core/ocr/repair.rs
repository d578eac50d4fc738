//! 确定性文本修复规则
//!
//! OCR 出来的代码文本错误高度机械化（大小写错、空格错、空行堆积），
//! 先用固定规则表便宜地修掉高置信度的错误，再交给 AI 做语义层清理。
//! 规则表是有序的 (pattern, replacement) 列表，逐条独立可测。

use once_cell::sync::Lazy;
use regex::Regex;

const TAB_WIDTH: usize = 4;

/// 规范大小写的 Python 关键字表
const PYTHON_KEYWORDS: [&str; 22] = [
    "def", "class", "import", "from", "if", "elif", "else", "try", "except", "finally", "for",
    "while", "return", "print", "True", "False", "None", "and", "or", "not", "in", "is",
];

static KEYWORD_RULES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    PYTHON_KEYWORDS
        .iter()
        .map(|keyword| {
            let pattern = Regex::new(&format!(r"(?i)\b{}\b", keyword)).unwrap();
            (pattern, *keyword)
        })
        .collect()
});

/// 运算符 / 标点间距规则，按固定顺序应用。
/// 只吃水平空白，不碰换行，否则会破坏行结构和缩进。
static SPACING_RULES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        // = / == / != 两侧各一个空格（交替顺序保证 == 不被拆成两个 =）
        (r"[ \t]*(==|!=|=)[ \t]*", " ${1} "),
        // 冒号前不留空格，后接一个空格
        (r"[ \t]+:", ":"),
        (r":[ \t]*(\S)", ": ${1}"),
        // 逗号前不留空格，后接一个空格
        (r"[ \t]+,", ","),
        (r",[ \t]*(\S)", ", ${1}"),
        // 括号内侧不留空格
        (r"\([ \t]+", "("),
        (r"[ \t]+\)", ")"),
        (r"\[[ \t]+", "["),
        (r"[ \t]+\]", "]"),
    ]
    .iter()
    .map(|(pattern, replacement)| (Regex::new(pattern).unwrap(), *replacement))
    .collect()
});

static EXCESS_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n\s*\n+").unwrap());

/// 完整修复流程：行清理 -> 关键字归一 -> 间距归一 -> 空行折叠
pub fn repair(text: &str) -> String {
    let text = normalize_lines(text);
    let text = canonicalize_keywords(&text);
    let text = normalize_spacing(&text);
    collapse_blank_lines(&text)
}

/// 逐行清理：去掉行尾空白（保留行首缩进），Tab 按 4 列展开
pub fn normalize_lines(text: &str) -> String {
    text.split('\n')
        .map(|line| expand_tabs(line.trim_end()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Tab 展开到下一个 4 的倍数列（与 Python expandtabs(4) 对齐）
fn expand_tabs(line: &str) -> String {
    let mut result = String::with_capacity(line.len());
    let mut column = 0usize;
    for ch in line.chars() {
        if ch == '\t' {
            let pad = TAB_WIDTH - (column % TAB_WIDTH);
            result.extend(std::iter::repeat(' ').take(pad));
            column += pad;
        } else {
            result.push(ch);
            column += 1;
        }
    }
    result
}

/// 大小写不敏感地把关键字换成规范拼写，幂等
pub fn canonicalize_keywords(text: &str) -> String {
    let mut result = text.to_string();
    for (pattern, canonical) in KEYWORD_RULES.iter() {
        result = pattern.replace_all(&result, *canonical).into_owned();
    }
    result
}

/// 按规则表顺序归一运算符 / 标点周围的空格
pub fn normalize_spacing(text: &str) -> String {
    let mut result = text.to_string();
    for (pattern, replacement) in SPACING_RULES.iter() {
        result = pattern.replace_all(&result, *replacement).into_owned();
    }
    result
}

/// 连续空行折叠成一个空行，并去掉整体首尾空白
pub fn collapse_blank_lines(text: &str) -> String {
    EXCESS_BLANK_LINES
        .replace_all(text, "\n\n")
        .trim()
        .to_string()
}
