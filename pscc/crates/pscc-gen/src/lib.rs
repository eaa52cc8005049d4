//! pscc-gen - C++ code generation.
//!
//! A single-pass walk over the AST producing a self-contained C++17
//! translation unit: preamble, `int main()`, variable declarations
//! grouped by the type collector's verdict, the translated body and
//! `return 0;`. Real division is forced with a `(double)` cast so the
//! generated program agrees with the interpreter on `7 / 2`.

use pscc_par::{BinOp, Block, Expr, ForStmt, LiteralKind, Program, Stmt, UnOp};
use pscc_sem::{collect_types, CppType};

/// Translate a program to C++ source text.
pub fn emit_cpp(program: &Program) -> String {
    CppEmitter::new().emit(program)
}

/// Line-buffer based emitter with indentation tracking.
pub struct CppEmitter {
    lines: Vec<String>,
    indent: usize,
}

impl CppEmitter {
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            indent: 0,
        }
    }

    /// Run the type collector, then walk the AST and build the
    /// translation unit.
    pub fn emit(mut self, program: &Program) -> String {
        let types = collect_types(program);

        self.raw("#include <iostream>");
        self.raw("#include <cmath>");
        self.raw("");
        self.raw("using namespace std;");
        self.raw("");
        self.raw("int main() {");
        self.indent = 1;

        self.emit_declarations(&types);

        for stmt in &program.body {
            self.emit_stmt(stmt);
        }

        self.raw("");
        self.line("return 0;");
        self.indent = 0;
        self.raw("}");

        self.lines.join("\n")
    }

    /// Grouped declarations, one line per type, first-appearance order
    /// within a group.
    fn emit_declarations(&mut self, types: &pscc_sem::TypeMap) {
        if types.is_empty() {
            return;
        }
        for group in [CppType::LongLong, CppType::Double, CppType::Int, CppType::Bool] {
            let names: Vec<&str> = types
                .iter()
                .filter(|(_, ty)| **ty == group)
                .map(|(name, _)| name.as_str())
                .collect();
            if !names.is_empty() {
                self.line(&format!("{group} {};", names.join(", ")));
            }
        }
        self.raw("");
    }

    fn raw(&mut self, text: &str) {
        self.lines.push(text.to_string());
    }

    fn line(&mut self, text: &str) {
        self.lines.push(format!("{}{}", "    ".repeat(self.indent), text));
    }

    fn emit_block(&mut self, block: &Block) {
        for stmt in &block.stmts {
            self.emit_stmt(stmt);
        }
    }

    fn emit_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Assign(assign) => {
                let value = expr_to_cpp(&assign.value);
                self.line(&format!("{} = {};", assign.target.name, value));
            }
            Stmt::Read(read) => {
                let targets = read
                    .targets
                    .iter()
                    .map(|t| t.name.as_str())
                    .collect::<Vec<_>>()
                    .join(" >> ");
                self.line(&format!("cin >> {targets};"));
            }
            Stmt::Write(write) => {
                let parts = write
                    .values
                    .iter()
                    .map(expr_to_cpp)
                    .collect::<Vec<_>>()
                    .join(" << ");
                self.line(&format!("cout << {parts};"));
            }
            Stmt::If(if_stmt) => {
                self.line(&format!("if ({}) {{", expr_to_cpp(&if_stmt.cond)));
                self.indent += 1;
                self.emit_block(&if_stmt.then_block);
                self.indent -= 1;
                if !if_stmt.else_block.stmts.is_empty() {
                    self.line("} else {");
                    self.indent += 1;
                    self.emit_block(&if_stmt.else_block);
                    self.indent -= 1;
                }
                self.line("}");
            }
            Stmt::While(while_stmt) => {
                self.line(&format!("while ({}) {{", expr_to_cpp(&while_stmt.cond)));
                self.indent += 1;
                self.emit_block(&while_stmt.body);
                self.indent -= 1;
                self.line("}");
            }
            Stmt::DoWhile(do_while) => {
                self.line("do {");
                self.indent += 1;
                self.emit_block(&do_while.body);
                self.indent -= 1;
                self.line(&format!("}} while ({});", expr_to_cpp(&do_while.cond)));
            }
            // repeta ... pana cand C is do { ... } while (!(C));
            Stmt::RepeatUntil(repeat) => {
                self.line("do {");
                self.indent += 1;
                self.emit_block(&repeat.body);
                self.indent -= 1;
                self.line(&format!("}} while (!({}));", expr_to_cpp(&repeat.cond)));
            }
            Stmt::For(for_stmt) => self.emit_for(for_stmt),
        }
    }

    fn emit_for(&mut self, for_stmt: &ForStmt) {
        let var = &for_stmt.iterator.name;
        let start = expr_to_cpp(&for_stmt.start);
        let stop = expr_to_cpp(&for_stmt.stop);
        let step = expr_to_cpp(&for_stmt.step);

        // A literal step fixes the comparison direction at compile time;
        // anything else needs the runtime sign test.
        let (cond, inc) = match literal_step_value(&for_stmt.step) {
            Some(value) if value == 1.0 => (format!("{var} <= {stop}"), format!("{var}++")),
            Some(value) if value == -1.0 => (format!("{var} >= {stop}"), format!("{var}--")),
            Some(value) if value < 0.0 => {
                (format!("{var} >= {stop}"), format!("{var} += {step}"))
            }
            Some(_) => (format!("{var} <= {stop}"), format!("{var} += {step}")),
            None => (
                format!("({step} >= 0 ? {var} <= {stop} : {var} >= {stop})"),
                format!("{var} += {step}"),
            ),
        };

        self.line(&format!("for ({var} = {start}; {cond}; {inc}) {{"));
        self.indent += 1;
        self.emit_block(&for_stmt.body);
        self.indent -= 1;
        self.line("}");
    }
}

impl Default for CppEmitter {
    fn default() -> Self {
        Self::new()
    }
}

/// The numeric value of a (possibly negated) numeric literal step.
fn literal_step_value(expr: &Expr) -> Option<f64> {
    match expr {
        Expr::Literal(lit) if matches!(lit.kind, LiteralKind::Int | LiteralKind::Real) => {
            lit.text.parse().ok()
        }
        Expr::Unary(un) if un.op == UnOp::Neg => literal_step_value(&un.operand).map(|v| -v),
        _ => None,
    }
}

/// Translate an expression to C++ text.
pub fn expr_to_cpp(expr: &Expr) -> String {
    match expr {
        Expr::Literal(lit) => match lit.kind {
            LiteralKind::Bool => if lit.text == "adevarat" { "true" } else { "false" }.to_string(),
            LiteralKind::Str => format!("\"{}\"", lit.text.replace('"', "\\\"")),
            LiteralKind::Int | LiteralKind::Real => lit.text.clone(),
        },
        Expr::Var(id) => id.name.clone(),
        Expr::Binary(bin) => {
            let lhs = expr_to_cpp(&bin.lhs);
            let rhs = expr_to_cpp(&bin.rhs);
            match bin.op {
                // Forces real division even for integer operands.
                BinOp::Div => format!("((double){lhs} / {rhs})"),
                BinOp::Pow => format!("pow({lhs}, {rhs})"),
                op => format!("({lhs} {} {rhs})", cpp_operator(op)),
            }
        }
        Expr::Unary(un) => {
            let inner = expr_to_cpp(&un.operand);
            match un.op {
                UnOp::Sqrt => format!("sqrt({inner})"),
                UnOp::Floor => format!("(long long)({inner})"),
                UnOp::Not => format!("!({inner})"),
                UnOp::Neg => format!("-({inner})"),
            }
        }
    }
}

fn cpp_operator(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "+",
        BinOp::Sub => "-",
        BinOp::Mul => "*",
        BinOp::Div => "/",
        BinOp::Mod => "%",
        BinOp::Pow => "^",
        BinOp::Eq => "==",
        BinOp::Ne => "!=",
        BinOp::Lt => "<",
        BinOp::Le => "<=",
        BinOp::Gt => ">",
        BinOp::Ge => ">=",
        BinOp::And => "&&",
        BinOp::Or => "||",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pscc_lex::tokenize;
    use pscc_par::Parser;

    fn emit(source: &str) -> String {
        let program = Parser::new(tokenize(source).expect("lexing failed"))
            .parse_program()
            .expect("parsing failed");
        emit_cpp(&program)
    }

    #[test]
    fn test_preamble_and_postamble() {
        let cpp = emit("a <- 1");
        assert!(cpp.starts_with("#include <iostream>\n#include <cmath>\n"));
        assert!(cpp.contains("using namespace std;"));
        assert!(cpp.contains("int main() {"));
        assert!(cpp.contains("    return 0;"));
        assert!(cpp.ends_with("}"));
    }

    #[test]
    fn test_mean_program_types_and_division() {
        let cpp = emit("s <- 0\npentru i <- 1, n executa\n    s <- s + i\nsfarsit_pentru\nma <- s / n");
        assert!(cpp.contains("double ma;"));
        assert!(cpp.contains("int s, i, n;"));
        assert!(cpp.contains("ma = ((double)s / n);"));
    }

    #[test]
    fn test_declaration_group_order() {
        let cpp = emit("a <- 1.5\nb <- 2\nok <- adevarat");
        let double_pos = cpp.find("double a;").expect("missing double group");
        let int_pos = cpp.find("int b;").expect("missing int group");
        let bool_pos = cpp.find("bool ok;").expect("missing bool group");
        assert!(double_pos < int_pos);
        assert!(int_pos < bool_pos);
    }

    #[test]
    fn test_assignment_and_arithmetic_parenthesized() {
        let cpp = emit("s <- s + i");
        assert!(cpp.contains("s = (s + i);"));
    }

    #[test]
    fn test_read_chains_extraction() {
        let cpp = emit("citeste a, b, c");
        assert!(cpp.contains("cin >> a >> b >> c;"));
    }

    #[test]
    fn test_write_chains_insertion_without_endl() {
        let cpp = emit("scrie \"Suma: \", s");
        assert!(cpp.contains("cout << \"Suma: \" << s;"));
        assert!(!cpp.contains("endl"));
    }

    #[test]
    fn test_if_without_else_omits_else() {
        let cpp = emit("daca a = 1 atunci\n    scrie a\nsfarsit_daca");
        assert!(cpp.contains("if ((a == 1)) {"));
        assert!(!cpp.contains("else"));
    }

    #[test]
    fn test_if_with_else() {
        let cpp = emit("daca a = 1 atunci\n    scrie 1\naltfel\n    scrie 2\nsfarsit_daca");
        assert!(cpp.contains("} else {"));
    }

    #[test]
    fn test_while_loop() {
        let cpp = emit("cat timp n > 0 executa\n    n <- n - 1\nsfarsit_cat_timp");
        assert!(cpp.contains("while ((n > 0)) {"));
        assert!(cpp.contains("n = (n - 1);"));
    }

    #[test]
    fn test_do_while_loop() {
        let cpp = emit("executa\n    a <- a + 1\ncat timp a < 3");
        assert!(cpp.contains("do {"));
        assert!(cpp.contains("} while ((a < 3));"));
    }

    #[test]
    fn test_repeat_until_negates_condition() {
        let cpp = emit("repeta\n    a <- a + 1\npana cand a = 3");
        assert!(cpp.contains("do {"));
        assert!(cpp.contains("} while (!((a == 3)));"));
    }

    #[test]
    fn test_for_step_one_uses_increment() {
        let cpp = emit("pentru i <- 1, n executa\nsfarsit_pentru");
        assert!(cpp.contains("for (i = 1; i <= n; i++) {"));
    }

    #[test]
    fn test_for_step_minus_one_uses_decrement() {
        let cpp = emit("pentru i <- 3, 1, -1 executa\nsfarsit_pentru");
        assert!(cpp.contains("for (i = 3; i >= 1; i--) {"));
    }

    #[test]
    fn test_for_positive_step_uses_compound_add() {
        let cpp = emit("pentru i <- 0, 10, 2 executa\nsfarsit_pentru");
        assert!(cpp.contains("for (i = 0; i <= 10; i += 2) {"));
    }

    #[test]
    fn test_for_non_literal_step_uses_sign_test() {
        let cpp = emit("pentru i <- 1, n, p executa\nsfarsit_pentru");
        assert!(cpp.contains("for (i = 1; (p >= 0 ? i <= n : i >= n); i += p) {"));
    }

    #[test]
    fn test_logical_and_relational_mapping() {
        let cpp = emit("daca a <= b si c ≠ d sau not e atunci\nsfarsit_daca");
        assert!(cpp.contains("(a <= b)"));
        assert!(cpp.contains("(c != d)"));
        assert!(cpp.contains("&&"));
        assert!(cpp.contains("||"));
        assert!(cpp.contains("!("));
    }

    #[test]
    fn test_pow_and_sqrt_and_floor() {
        let cpp = emit("x <- 2 ^ 10\ny <- sqrt(x)\nz <- [x / 3]");
        assert!(cpp.contains("x = pow(2, 10);"));
        assert!(cpp.contains("y = sqrt(x);"));
        assert!(cpp.contains("z = (long long)(((double)x / 3));"));
    }

    #[test]
    fn test_boolean_literals() {
        let cpp = emit("ok <- adevarat\nnu <- fals");
        assert!(cpp.contains("ok = true;"));
        assert!(cpp.contains("nu = false;"));
    }

    #[test]
    fn test_string_quotes_are_escaped() {
        let cpp = emit("scrie \"el a zis \\\"da\\\"\"");
        assert!(cpp.contains(r#"cout << "el a zis \"da\"";"#));
    }

    #[test]
    fn test_nested_indentation() {
        let cpp = emit("cat timp a > 0 executa\n    daca a = 1 atunci\n        scrie a\n    sfarsit_daca\nsfarsit_cat_timp");
        assert!(cpp.contains("\n    while ((a > 0)) {"));
        assert!(cpp.contains("\n        if ((a == 1)) {"));
        assert!(cpp.contains("\n            cout << a;"));
    }
}
