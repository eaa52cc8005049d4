//! pscc-ctp - C++ to pseudocode reverse translation.
//!
//! A line-oriented state machine over a restricted C++ subset (single
//! `main`, scalar variables, no functions). It deliberately builds no
//! AST: the subset is shallow enough that pattern matching each line and
//! tracking the open blocks on a stack is both simpler and faithful to
//! what the teaching workflow feeds it.
//!
//! The stack is an enum of block kinds. Closing braces need one line of
//! lookahead: a `}` whose next non-blank line is `while (C);` closes a
//! `do` block as `cat timp C`, and a `}` followed by `else` keeps the
//! `if` block open for the `altfel` branch.

use once_cell::sync::Lazy;
use regex::Regex;

/// What construct a `{` opened.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BlockKind {
    /// A bare brace with no recognized header.
    Block,
    For,
    While,
    If,
    Do,
}

static FOR_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"for\s*\(\s*(.+?)\s*;\s*(.+?)\s*;\s*(.+?)\s*\)").expect("for pattern"));
static WHILE_COND: Lazy<Regex> = Lazy::new(|| Regex::new(r"while\s*\((.*)\)").expect("while pattern"));
static IF_COND: Lazy<Regex> = Lazy::new(|| Regex::new(r"if\s*\((.*)\)").expect("if pattern"));
static INIT_ASSIGN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\w+)\s*=\s*(.+)").expect("init pattern"));
static COND_BOUND: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\w+)\s*([<>=!]+)\s*(.+)").expect("bound pattern"));
static STEP_AMOUNT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\+=\s*(.+)").expect("step pattern"));
static TYPE_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(long long|int|double|float|bool|string|char)\s+").expect("type prefix"));
static GLOBAL_INIT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(long long|int|double|float|bool|string)\s+(\w+)\s*=\s*(.+?);").expect("global init")
});
static GLOBAL_DECL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(long long|int|double|float|bool|string)\s+(\w+)\s*;").expect("global decl"));
static DECL_ONLY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(long long|int|double|float|bool|string|char)\s+\w+(\s*,\s*\w+)*\s*;").expect("decl only")
});
static CAST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(\s*(long long|int|double|float)\s*\)").expect("cast pattern"));
static BOOL_TRUE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\btrue\b").expect("true pattern"));
static BOOL_FALSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bfalse\b").expect("false pattern"));
static AND_OP: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*&&\s*").expect("and pattern"));
static OR_OP: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\|\|\s*").expect("or pattern"));
static POW_CALL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bpow\s*\(\s*(.+?)\s*,\s*(.+?)\s*\)").expect("pow pattern"));

/// Translate a C++ translation unit to pseudocode.
pub fn transpile(cpp: &str) -> String {
    CppToPseudocode::new().run(cpp)
}

/// The state machine.
pub struct CppToPseudocode {
    output: Vec<String>,
    indent: usize,
    in_main: bool,
    stack: Vec<BlockKind>,
}

impl CppToPseudocode {
    pub fn new() -> Self {
        Self {
            output: Vec::new(),
            indent: 0,
            in_main: false,
            stack: Vec::new(),
        }
    }

    /// Drive the machine over the source lines and return the pseudocode.
    pub fn run(mut self, cpp: &str) -> String {
        let lines: Vec<&str> = cpp.lines().collect();
        let mut index = 0;

        while index < lines.len() {
            let line = lines[index].trim();
            index += 1;

            if line.is_empty() || line.starts_with('#') || line.contains("using namespace") {
                continue;
            }
            if line.starts_with("//") {
                continue;
            }
            if line.contains("int main") || line.contains("void main") {
                self.in_main = true;
                continue;
            }
            if line.starts_with("return") {
                continue;
            }

            // `} while (C);` on one line ends a do-while.
            if line.contains('}') && line.contains("while") {
                if self.stack.last() == Some(&BlockKind::Do) {
                    self.stack.pop();
                }
                self.close_do_while(line);
                continue;
            }

            // `} else {` keeps the if open for its altfel branch.
            if line.starts_with('}') && line.contains("else") {
                self.emit_altfel();
                continue;
            }

            if line == "{" {
                self.stack.push(BlockKind::Block);
                continue;
            }

            if line == "}" {
                index = self.close_block(&lines, index);
                continue;
            }

            if !self.in_main {
                self.handle_global_declaration(line);
                continue;
            }

            if DECL_ONLY.is_match(line) {
                continue;
            }

            self.process_line(line);
        }

        self.output
            .iter()
            .map(|line| rebalance_parens(line))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn add_line(&mut self, text: &str) {
        self.output.push(format!("{}{}", "    ".repeat(self.indent), text));
    }

    /// Close the innermost block for a bare `}`, with one line of
    /// lookahead for `do { ... } while (C);` split across lines and for
    /// `}` followed by `else`. Returns the possibly-advanced line index.
    fn close_block(&mut self, lines: &[&str], index: usize) -> usize {
        let next_nonblank = lines[index..]
            .iter()
            .position(|l| !l.trim().is_empty())
            .map(|offset| index + offset);

        let Some(kind) = self.stack.last().copied() else {
            return index;
        };

        match kind {
            BlockKind::Do => {
                self.stack.pop();
                if let Some(next) = next_nonblank {
                    if lines[next].trim().starts_with("while") {
                        self.close_do_while(lines[next].trim());
                        return next + 1;
                    }
                }
            }
            BlockKind::If => {
                if next_nonblank.map_or(false, |next| lines[next].trim().starts_with("else")) {
                    // The altfel branch continues this block.
                    return index;
                }
                self.stack.pop();
                self.indent = self.indent.saturating_sub(1);
                self.add_line("sfarsit_daca");
            }
            BlockKind::For => {
                self.stack.pop();
                self.indent = self.indent.saturating_sub(1);
                self.add_line("sfarsit_pentru");
            }
            BlockKind::While => {
                self.stack.pop();
                self.indent = self.indent.saturating_sub(1);
                self.add_line("sfarsit_cat_timp");
            }
            BlockKind::Block => {
                self.stack.pop();
            }
        }
        index
    }

    /// `} while (C);` → dedent + `cat timp C` (no `executa`).
    fn close_do_while(&mut self, line: &str) {
        if let Some(caps) = WHILE_COND.captures(line) {
            let cond = translate_expression(&caps[1]);
            self.indent = self.indent.saturating_sub(1);
            self.add_line(&format!("cat timp {cond}"));
        }
    }

    /// `altfel` prints one level out; the branch body stays indented.
    fn emit_altfel(&mut self) {
        let level = self.indent.saturating_sub(1);
        self.output.push(format!("{}altfel", "    ".repeat(level)));
    }

    /// Globals before `main`: initialized ones become assignments,
    /// bare ones get a per-type default.
    fn handle_global_declaration(&mut self, line: &str) {
        if let Some(caps) = GLOBAL_INIT.captures(line) {
            let value = translate_expression(&caps[3]);
            let name = &caps[2];
            self.add_line(&format!("{name} <- {value}"));
            return;
        }
        if let Some(caps) = GLOBAL_DECL.captures(line) {
            let default = default_value(&caps[1]);
            let name = &caps[2];
            self.add_line(&format!("{name} <- {default}"));
        }
    }

    fn process_line(&mut self, line: &str) {
        if line.starts_with("for") {
            self.handle_for(line);
            return;
        }
        if line.starts_with("while") {
            self.handle_while(line);
            return;
        }
        if line.starts_with("do") {
            self.add_line("executa");
            self.indent += 1;
            self.stack.push(BlockKind::Do);
            return;
        }
        if line.starts_with("if") {
            self.handle_if(line);
            return;
        }
        if line.starts_with("else") {
            self.emit_altfel();
            return;
        }
        if line.contains("cin") {
            self.handle_cin(line);
            return;
        }
        if line.contains("cout") {
            self.handle_cout(line);
            return;
        }
        if line.contains('=')
            && !["==", "!=", "<=", ">="].iter().any(|op| line.contains(op))
        {
            self.handle_assignment(line);
            return;
        }
        if line.contains("++") || line.contains("--") {
            self.handle_increment_decrement(line);
        }
    }

    /// `for (i = 1; i <= n; i++)` → `pentru i <- 1, n executa`.
    fn handle_for(&mut self, line: &str) {
        let Some(caps) = FOR_HEADER.captures(line) else {
            return;
        };
        let init = TYPE_PREFIX.replace(caps[1].trim(), "").to_string();
        let condition = caps[2].trim().to_string();
        let increment = caps[3].trim().to_string();

        let Some(init_caps) = INIT_ASSIGN.captures(&init) else {
            return;
        };
        let var = init_caps[1].to_string();
        let start = translate_expression(&init_caps[2]);

        let Some(bound_caps) = COND_BOUND.captures(&condition) else {
            return;
        };
        let stop = translate_expression(&bound_caps[3]);

        let step = if increment.contains("--") {
            "-1".to_string()
        } else if let Some(step_caps) = STEP_AMOUNT.captures(&increment) {
            translate_expression(&step_caps[1])
        } else {
            "1".to_string()
        };

        if step == "1" {
            self.add_line(&format!("pentru {var} <- {start}, {stop} executa"));
        } else {
            self.add_line(&format!("pentru {var} <- {start}, {stop}, {step} executa"));
        }
        self.indent += 1;
        self.stack.push(BlockKind::For);
    }

    fn handle_while(&mut self, line: &str) {
        let Some(caps) = WHILE_COND.captures(line) else {
            return;
        };
        let cond = translate_expression(&caps[1]);
        self.add_line(&format!("cat timp {cond} executa"));
        self.indent += 1;
        self.stack.push(BlockKind::While);
    }

    fn handle_if(&mut self, line: &str) {
        let Some(caps) = IF_COND.captures(line) else {
            return;
        };
        let cond = translate_expression(&caps[1]);
        self.add_line(&format!("daca {cond} atunci"));
        self.indent += 1;
        self.stack.push(BlockKind::If);
    }

    /// `cin >> a >> b;` → `citeste a, b`.
    fn handle_cin(&mut self, line: &str) {
        static NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").expect("name pattern"));
        let variables: Vec<String> = line
            .split(">>")
            .skip(1)
            .filter_map(|part| NAME.find(part).map(|m| m.as_str().to_string()))
            .collect();
        if !variables.is_empty() {
            self.add_line(&format!("citeste {}", variables.join(", ")));
        }
    }

    /// `cout << x << "text" << endl;` → `scrie x, "text"` (endl dropped).
    fn handle_cout(&mut self, line: &str) {
        let expressions: Vec<String> = line
            .split("<<")
            .skip(1)
            .map(str::trim)
            .filter(|part| !part.contains("endl"))
            .map(|part| part.trim_end_matches(';').trim())
            .filter(|part| !part.is_empty())
            .map(translate_expression)
            .collect();
        if !expressions.is_empty() {
            self.add_line(&format!("scrie {}", expressions.join(", ")));
        }
    }

    /// `lhs = rhs;` → `lhs <- rhs`, dropping any leading type keyword.
    fn handle_assignment(&mut self, line: &str) {
        let stripped = line.trim_end_matches(';').trim();
        let stripped = TYPE_PREFIX.replace(stripped, "").to_string();

        let Some(eq) = stripped.find('=') else {
            return;
        };
        let name = stripped[..eq].trim().to_string();
        let value = translate_expression(stripped[eq + 1..].trim());
        self.add_line(&format!("{name} <- {value}"));
    }

    /// `x++;` / `x--;` → `x <- x + 1` / `x <- x - 1`.
    fn handle_increment_decrement(&mut self, line: &str) {
        let stripped = line.trim_end_matches(';').trim();
        if stripped.contains("++") {
            let var = stripped.replace("++", "");
            let var = var.trim();
            self.add_line(&format!("{var} <- {var} + 1"));
        } else if stripped.contains("--") {
            let var = stripped.replace("--", "");
            let var = var.trim();
            self.add_line(&format!("{var} <- {var} - 1"));
        }
    }
}

impl Default for CppToPseudocode {
    fn default() -> Self {
        Self::new()
    }
}

/// Default pseudocode value for an uninitialized global of a given type.
fn default_value(cpp_type: &str) -> &'static str {
    match cpp_type {
        "bool" => "fals",
        "string" => "\"\"",
        _ => "0",
    }
}

/// Translate one C++ expression to pseudocode spelling.
fn translate_expression(expr: &str) -> String {
    let mut expr = CAST.replace_all(expr.trim(), "").to_string();
    expr = clean_parentheses(&expr);

    // A lone division between integral-looking operands is the floor
    // form in the dialect.
    if expr.contains('/')
        && !expr.starts_with('[')
        && !expr.contains('.')
        && expr.matches('/').count() == 1
        && !expr.contains("sqrt")
        && !expr.contains("pow")
    {
        if let Some((left, right)) = expr.split_once('/') {
            let left = left.trim();
            let right = right.trim();
            if !left.starts_with('(') && !right.ends_with(')') {
                expr = format!("[{left} / {right}]");
            }
        }
    }

    expr = BOOL_TRUE.replace_all(&expr, "adevarat").to_string();
    expr = BOOL_FALSE.replace_all(&expr, "fals").to_string();

    expr = expr.replace("==", "=");
    expr = AND_OP.replace_all(&expr, " si ").to_string();
    expr = OR_OP.replace_all(&expr, " sau ").to_string();

    expr = POW_CALL.replace_all(&expr, "$1 ^ $2").to_string();

    expr
}

/// Strip redundant outer parentheses while preserving balance.
fn clean_parentheses(expr: &str) -> String {
    let mut expr = expr.trim().to_string();
    while expr.starts_with("((") && expr.ends_with("))") && outer_parens_removable(&expr) {
        expr = expr[1..expr.len() - 1].trim().to_string();
    }
    if expr.starts_with('(') && expr.ends_with(')') && outer_parens_removable(&expr) {
        expr = expr[1..expr.len() - 1].trim().to_string();
    }
    expr
}

/// True when the first `(` pairs with the final `)`.
fn outer_parens_removable(expr: &str) -> bool {
    let inner = &expr[1..expr.len() - 1];
    let mut depth = 0i32;
    for ch in inner.chars() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

/// Safety net: drop unmatched `)` and close unmatched `(` at line end.
/// Lines carrying string literals are left alone.
fn rebalance_parens(line: &str) -> String {
    if line.contains('"') || line.contains('\'') {
        return line.to_string();
    }
    let mut result = String::with_capacity(line.len() + 2);
    let mut depth = 0i32;
    for ch in line.chars() {
        match ch {
            '(' => {
                depth += 1;
                result.push(ch);
            }
            ')' => {
                if depth > 0 {
                    depth -= 1;
                    result.push(ch);
                }
            }
            _ => result.push(ch),
        }
    }
    for _ in 0..depth {
        result.push(')');
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skips_preprocessor_and_scaffolding() {
        let cpp = "\
#include <iostream>
using namespace std;
int main() {
    // comentariu
    return 0;
}";
        assert_eq!(transpile(cpp), "");
    }

    #[test]
    fn test_assignment_strips_type_and_semicolon() {
        let cpp = "int main() {\n    int a = 10;\n    a = a + 1;\n}";
        assert_eq!(transpile(cpp), "a <- 10\na <- a + 1");
    }

    #[test]
    fn test_cin_and_cout() {
        let cpp = "int main() {\n    cin >> a >> b;\n    cout << a << \" \" << b << endl;\n}";
        assert_eq!(transpile(cpp), "citeste a, b\nscrie a, \" \", b");
    }

    #[test]
    fn test_if_else() {
        let cpp = "\
int main() {
    if (a == b) {
        cout << \"DA\";
    } else {
        cout << \"NU\";
    }
}";
        assert_eq!(
            transpile(cpp),
            "daca a = b atunci\n    scrie \"DA\"\naltfel\n    scrie \"NU\"\nsfarsit_daca"
        );
    }

    #[test]
    fn test_if_without_else() {
        let cpp = "int main() {\n    if (x > 0) {\n        cout << x;\n    }\n}";
        assert_eq!(
            transpile(cpp),
            "daca x > 0 atunci\n    scrie x\nsfarsit_daca"
        );
    }

    #[test]
    fn test_while_loop() {
        let cpp = "int main() {\n    while (n > 0) {\n        n = n - 1;\n    }\n}";
        assert_eq!(
            transpile(cpp),
            "cat timp n > 0 executa\n    n <- n - 1\nsfarsit_cat_timp"
        );
    }

    #[test]
    fn test_do_while_same_line_close() {
        let cpp = "int main() {\n    do {\n        a = a + 1;\n    } while (a < 3);\n}";
        assert_eq!(
            transpile(cpp),
            "executa\n    a <- a + 1\ncat timp a < 3"
        );
    }

    #[test]
    fn test_do_while_split_close() {
        let cpp = "int main() {\n    do {\n        a = a + 1;\n    }\n    while (a < 3);\n}";
        assert_eq!(
            transpile(cpp),
            "executa\n    a <- a + 1\ncat timp a < 3"
        );
    }

    #[test]
    fn test_for_with_increment() {
        let cpp = "int main() {\n    for (i = 1; i <= n; i++) {\n        s = s + i;\n    }\n}";
        assert_eq!(
            transpile(cpp),
            "pentru i <- 1, n executa\n    s <- s + i\nsfarsit_pentru"
        );
    }

    #[test]
    fn test_for_with_decrement() {
        let cpp = "int main() {\n    for (i = 3; i >= 1; i--) {\n        cout << i;\n    }\n}";
        assert_eq!(
            transpile(cpp),
            "pentru i <- 3, 1, -1 executa\n    scrie i\nsfarsit_pentru"
        );
    }

    #[test]
    fn test_for_with_compound_step() {
        let cpp = "int main() {\n    for (i = 0; i <= 10; i += 2) {\n    }\n}";
        assert_eq!(transpile(cpp), "pentru i <- 0, 10, 2 executa\nsfarsit_pentru");
    }

    #[test]
    fn test_for_with_declared_iterator() {
        let cpp = "int main() {\n    for (int i = 1; i <= 5; i++) {\n    }\n}";
        assert_eq!(transpile(cpp), "pentru i <- 1, 5 executa\nsfarsit_pentru");
    }

    #[test]
    fn test_declarations_without_initializer_are_skipped() {
        let cpp = "int main() {\n    int a, b, c;\n    long long s;\n    double x;\n    a = 1;\n}";
        assert_eq!(transpile(cpp), "a <- 1");
    }

    #[test]
    fn test_global_declarations() {
        let cpp = "int x = 5;\nbool ok;\nint main() {\n}";
        assert_eq!(transpile(cpp), "x <- 5\nok <- fals");
    }

    #[test]
    fn test_cast_stripped_and_division_wrapped() {
        let cpp = "int main() {\n    m = (int)x / y;\n}";
        assert_eq!(transpile(cpp), "m <- [x / y]");
    }

    #[test]
    fn test_double_cast_division() {
        let cpp = "int main() {\n    ma = ((double)s / n);\n}";
        assert_eq!(transpile(cpp), "ma <- [s / n]");
    }

    #[test]
    fn test_real_division_not_wrapped() {
        let cpp = "int main() {\n    m = x / 2.5;\n}";
        assert_eq!(transpile(cpp), "m <- x / 2.5");
    }

    #[test]
    fn test_pow_becomes_caret() {
        let cpp = "int main() {\n    y = pow(x, 3);\n}";
        assert_eq!(transpile(cpp), "y <- x ^ 3");
    }

    #[test]
    fn test_boolean_and_logical_operators() {
        let cpp = "int main() {\n    if ((a == 1) && (b != 2) || true) {\n    }\n}";
        assert_eq!(transpile(cpp), "daca (a = 1) si (b != 2) sau adevarat atunci\nsfarsit_daca");
    }

    #[test]
    fn test_increment_statement() {
        let cpp = "int main() {\n    x++;\n    y--;\n}";
        assert_eq!(transpile(cpp), "x <- x + 1\ny <- y - 1");
    }

    #[test]
    fn test_nested_loops() {
        let cpp = "\
int main() {
    for (i = 1; i <= 3; i++) {
        while (j > 0) {
            j = j - 1;
        }
    }
}";
        assert_eq!(
            transpile(cpp),
            "pentru i <- 1, 3 executa\n    cat timp j > 0 executa\n        j <- j - 1\n    sfarsit_cat_timp\nsfarsit_pentru"
        );
    }

    #[test]
    fn test_outer_parens_cleaned() {
        let cpp = "int main() {\n    while (((a == 3))) {\n    }\n}";
        assert_eq!(transpile(cpp), "cat timp a = 3 executa\nsfarsit_cat_timp");
    }

    #[test]
    fn test_rebalance_drops_stray_close() {
        assert_eq!(rebalance_parens("cat timp a = 3) executa"), "cat timp a = 3 executa");
    }

    #[test]
    fn test_rebalance_closes_open_paren() {
        assert_eq!(rebalance_parens("scrie (a + b"), "scrie (a + b)");
    }

    #[test]
    fn test_rebalance_leaves_string_lines_alone() {
        assert_eq!(rebalance_parens("scrie \":)\""), "scrie \":)\"");
    }
}
