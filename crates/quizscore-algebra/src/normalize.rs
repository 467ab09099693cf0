//! Rewrite raw learner input into a string the parser accepts.
//!
//! Normalization never fails. Input that is still malformed afterwards comes
//! back as a best-effort string and fails later, at parse time.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::functions::BUILTIN_FUNCTIONS;
use crate::parser::MAX_DEPTH;

static LATEX_SPACING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\[,;:! ]").expect("spacing pattern is valid"));

static LATEX_COMMAND: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\([A-Za-z]+)").expect("command pattern is valid"));

/// Names that stay whole instead of being split into single-letter symbols.
const GREEK_LETTERS: &[&str] = &[
    "alpha", "beta", "gamma", "delta", "epsilon", "theta", "lambda", "mu", "sigma", "phi",
    "omega",
];

/// Operator pairs collapsed when a parse fails.
const OPERATOR_REPAIRS: &[(&str, &str)] = &[
    ("++", "+"),
    ("--", "-"),
    ("**", "*"),
    ("//", "/"),
    ("+-", "-"),
    ("-+", "-"),
];

/// Full normalization: markup and superscripts, then explicit multiplication
/// with all whitespace removed.
///
/// ```
/// use quizscore_algebra::normalize;
///
/// assert_eq!(normalize("2(x+1)"), "2*(x+1)");
/// assert_eq!(normalize(r"\frac{x}{2}"), "(x)/(2)");
/// assert_eq!(normalize("y²"), "y^2");
/// ```
pub fn normalize(raw: &str) -> String {
    insert_implicit_multiplication(&normalize_markup(raw))
}

/// Light normalization: trimming, superscripts and markup only.
pub fn normalize_markup(raw: &str) -> String {
    let text = replace_superscripts(raw.trim());
    if looks_like_markup(&text) {
        convert_markup(&text)
    } else {
        text
    }
}

/// Collapse doubled operators (`++`, `--`, `**`, `//`, `+-`, `-+`).
pub fn repair_operators(input: &str) -> String {
    let mut current = input.to_string();
    loop {
        let mut next = current.clone();
        for (from, to) in OPERATOR_REPAIRS {
            next = next.replace(from, to);
        }
        if next == current {
            return current;
        }
        current = next;
    }
}

fn looks_like_markup(text: &str) -> bool {
    text.contains('\\') || text.contains('{')
}

fn superscript_value(c: char) -> Option<char> {
    Some(match c {
        '⁰' => '0',
        '¹' => '1',
        '²' => '2',
        '³' => '3',
        '⁴' => '4',
        '⁵' => '5',
        '⁶' => '6',
        '⁷' => '7',
        '⁸' => '8',
        '⁹' => '9',
        '⁺' => '+',
        '⁻' => '-',
        _ => return None,
    })
}

/// `x²` becomes `x^2`, `x⁻¹` becomes `x^(-1)`.
fn replace_superscripts(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut run = String::new();
    let flush = |run: &mut String, out: &mut String| {
        if run.is_empty() {
            return;
        }
        if run.chars().all(|c| c.is_ascii_digit()) {
            out.push('^');
            out.push_str(run);
        } else {
            out.push_str("^(");
            out.push_str(run);
            out.push(')');
        }
        run.clear();
    };
    for c in text.chars() {
        match superscript_value(c) {
            Some(v) => run.push(v),
            None => {
                flush(&mut run, &mut out);
                out.push(c);
            }
        }
    }
    flush(&mut run, &mut out);
    out
}

fn convert_markup(text: &str) -> String {
    let text = text
        .replace(r"\left", "")
        .replace(r"\right", "")
        .replace(r"\cdot", "*")
        .replace(r"\times", "*")
        .replace(r"\div", "/");
    let text = LATEX_SPACING.replace_all(&text, "");
    let text = rewrite_commands(&text, 0);
    let text = convert_braces(&text);
    let text = LATEX_COMMAND.replace_all(&text, "$1");
    text.replace('\\', "")
}

/// Read a `{...}` group starting at `start` (leading whitespace allowed).
fn take_group(chars: &[char], start: usize) -> Option<(String, usize)> {
    let mut i = start;
    while i < chars.len() && chars[i].is_whitespace() {
        i += 1;
    }
    if chars.get(i) != Some(&'{') {
        return None;
    }
    let mut depth = 0usize;
    for (offset, &c) in chars[i..].iter().enumerate() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    let end = i + offset;
                    return Some((chars[i + 1..end].iter().collect(), end + 1));
                }
            }
            _ => {}
        }
    }
    None
}

/// `\frac{a}{b}` → `(a)/(b)` and `\sqrt{a}` → `sqrt(a)`, recursively.
///
/// Groups nested past [`MAX_DEPTH`] are left as written; the parser would
/// reject them anyway.
fn rewrite_commands(text: &str, depth: usize) -> String {
    if depth >= MAX_DEPTH {
        return text.to_string();
    }
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '\\' {
            let name: String = chars[i + 1..]
                .iter()
                .take_while(|c| c.is_ascii_alphabetic())
                .collect();
            let after = i + 1 + name.len();
            match name.as_str() {
                "frac" | "dfrac" | "tfrac" => {
                    if let Some((num, j)) = take_group(&chars, after) {
                        if let Some((den, k)) = take_group(&chars, j) {
                            out.push_str(&format!(
                                "({})/({})",
                                rewrite_commands(&num, depth + 1),
                                rewrite_commands(&den, depth + 1)
                            ));
                            i = k;
                            continue;
                        }
                    }
                }
                "sqrt" => {
                    if let Some((arg, j)) = take_group(&chars, after) {
                        out.push_str(&format!("sqrt({})", rewrite_commands(&arg, depth + 1)));
                        i = j;
                        continue;
                    }
                }
                _ => {}
            }
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

/// Braces next to `^` become parentheses; all other braces are dropped.
fn convert_braces(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    // (position in `out`, opened right after a caret)
    let mut open: Vec<(usize, bool)> = Vec::new();
    for (i, &c) in chars.iter().enumerate() {
        match c {
            '{' => open.push((out.len(), out.ends_with('^'))),
            '}' => {
                let Some((pos, after_caret)) = open.pop() else {
                    continue;
                };
                if after_caret || chars.get(i + 1) == Some(&'^') {
                    out.insert(pos, '(');
                    out.push(')');
                }
            }
            _ => out.push(c),
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Piece {
    Number,
    Letter,
    Constant,
    Function,
    Open,
    Close,
    Operator,
}

fn known_word_at(chars: &[char], start: usize) -> Option<(&'static str, Piece)> {
    let rest: String = chars[start..]
        .iter()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect();
    let functions = BUILTIN_FUNCTIONS.iter().map(|f| (f.name, Piece::Function));
    let constants = std::iter::once(("pi", Piece::Constant))
        .chain(GREEK_LETTERS.iter().map(|g| (*g, Piece::Constant)));
    functions
        .chain(constants)
        .filter(|(word, _)| rest.starts_with(word))
        .max_by_key(|(word, _)| word.len())
}

fn scan_number(chars: &[char], start: usize) -> usize {
    let mut i = start;
    while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
        i += 1;
    }
    // Scientific notation: 1e5, 2.5E-3
    if i < chars.len() && matches!(chars[i], 'e' | 'E') {
        let digit_at = |j: usize| chars.get(j).is_some_and(|c| c.is_ascii_digit());
        if digit_at(i + 1) {
            i += 1;
        } else if matches!(chars.get(i + 1), Some('+' | '-')) && digit_at(i + 2) {
            i += 2;
        } else {
            return i;
        }
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }
    }
    i
}

/// Split into pieces, dropping whitespace.
fn pieces(text: &str) -> Vec<(Piece, String)> {
    let chars: Vec<char> = text.chars().collect();
    let mut out = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
        } else if c.is_ascii_digit()
            || (c == '.' && chars.get(i + 1).is_some_and(|n| n.is_ascii_digit()))
        {
            let end = scan_number(&chars, i);
            out.push((Piece::Number, chars[i..end].iter().collect()));
            i = end;
        } else if c.is_ascii_alphabetic() {
            match known_word_at(&chars, i) {
                Some((word, kind)) => {
                    out.push((kind, word.to_string()));
                    i += word.len();
                }
                None => {
                    out.push((Piece::Letter, c.to_string()));
                    i += 1;
                }
            }
        } else {
            let kind = match c {
                '(' => Piece::Open,
                ')' => Piece::Close,
                _ => Piece::Operator,
            };
            out.push((kind, c.to_string()));
            i += 1;
        }
    }
    out
}

fn ends_operand(piece: Piece) -> bool {
    matches!(
        piece,
        Piece::Number | Piece::Letter | Piece::Constant | Piece::Close
    )
}

fn starts_operand(piece: Piece) -> bool {
    matches!(
        piece,
        Piece::Number | Piece::Letter | Piece::Constant | Piece::Function | Piece::Open
    )
}

/// `12x` → `12*x`, `xy` → `x*y`, `2(x+1)` → `2*(x+1)`, `sinx` → `sin(x)`.
fn insert_implicit_multiplication(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    let mut prev: Option<Piece> = None;
    for (piece, lexeme) in pieces(text) {
        if prev == Some(Piece::Function) && piece != Piece::Open {
            // A function applied without parentheses takes the next operand.
            if matches!(piece, Piece::Number | Piece::Letter | Piece::Constant) {
                out.push('(');
                out.push_str(&lexeme);
                out.push(')');
                prev = Some(Piece::Close);
                continue;
            }
        } else if prev.is_some_and(ends_operand) && starts_operand(piece) {
            out.push('*');
        }
        out.push_str(&lexeme);
        prev = Some(piece);
    }
    out
}
