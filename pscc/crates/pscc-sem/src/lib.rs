//! pscc-sem - Variable type inference for C++ code generation.
//!
//! A pre-pass over the AST that assigns every variable the narrowest C++
//! type compatible with all its assignments. The rules are deliberately
//! coarse (this feeds a teaching translator, not a type checker):
//!
//! 1. any assignment target, READ target or FOR iterator starts as `int`;
//! 2. any variable merely used in an expression is introduced at `int`,
//!    so the emitted translation unit declares everything it mentions;
//! 3. assigning from an expression containing `/` or `sqrt` promotes the
//!    target to `double`;
//! 4. assigning a literal with a decimal point promotes to `double`;
//! 5. assigning a boolean literal promotes to `bool`;
//! 6. promotions are one-way; `double` and `bool` never demote.
//!
//! Promotions flow only from an assignment's right-hand side to its
//! target: expressions in conditions or FOR bounds never promote anything,
//! in particular not the iterator.

use indexmap::IndexMap;
use std::fmt;

use pscc_par::{BinOp, Block, Expr, LiteralKind, Program, Stmt, UnOp};

/// The C++ scalar types the emitter can declare.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CppType {
    Int,
    LongLong,
    Double,
    Bool,
}

impl CppType {
    /// Whether this type may still be promoted to `double` or `bool`.
    fn is_promotable(self) -> bool {
        matches!(self, CppType::Int | CppType::LongLong)
    }
}

impl fmt::Display for CppType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CppType::Int => "int",
            CppType::LongLong => "long long",
            CppType::Double => "double",
            CppType::Bool => "bool",
        };
        f.write_str(name)
    }
}

/// Result of the pass: variable name to inferred C++ type, in order of
/// first appearance (the emitter's declaration order).
pub type TypeMap = IndexMap<String, CppType>;

/// The pre-pass itself. Run it via [`collect_types`].
#[derive(Default)]
pub struct TypeCollector {
    vars: TypeMap,
}

/// Run the pass over a program and return the inferred type map.
pub fn collect_types(program: &Program) -> TypeMap {
    let mut collector = TypeCollector::default();
    for stmt in &program.body {
        collector.walk_stmt(stmt);
    }
    collector.vars
}

impl TypeCollector {
    fn walk_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Assign(assign) => {
                self.mark(&assign.target.name, CppType::Int);
                self.check_expr(&assign.value, Some(assign.target.name.as_str()));
            }
            Stmt::Read(read) => {
                for target in &read.targets {
                    self.mark(&target.name, CppType::Int);
                }
            }
            Stmt::For(for_stmt) => {
                self.mark(&for_stmt.iterator.name, CppType::Int);
                self.check_expr(&for_stmt.start, None);
                self.check_expr(&for_stmt.stop, None);
                self.check_expr(&for_stmt.step, None);
                self.walk_block(&for_stmt.body);
            }
            Stmt::If(if_stmt) => {
                self.check_expr(&if_stmt.cond, None);
                self.walk_block(&if_stmt.then_block);
                self.walk_block(&if_stmt.else_block);
            }
            Stmt::While(while_stmt) => {
                self.check_expr(&while_stmt.cond, None);
                self.walk_block(&while_stmt.body);
            }
            Stmt::DoWhile(do_while) => {
                self.walk_block(&do_while.body);
                self.check_expr(&do_while.cond, None);
            }
            Stmt::RepeatUntil(repeat) => {
                self.walk_block(&repeat.body);
                self.check_expr(&repeat.cond, None);
            }
            Stmt::Write(write) => {
                for value in &write.values {
                    self.check_expr(value, None);
                }
            }
        }
    }

    fn walk_block(&mut self, block: &Block) {
        for stmt in &block.stmts {
            self.walk_stmt(stmt);
        }
    }

    /// Register a variable, promoting one way only.
    fn mark(&mut self, name: &str, ty: CppType) {
        match self.vars.get_mut(name) {
            None => {
                self.vars.insert(name.to_string(), ty);
            }
            Some(current) => {
                if matches!(ty, CppType::Double | CppType::Bool) && current.is_promotable() {
                    *current = ty;
                }
            }
        }
    }

    /// Scan an expression: introduce every variable it mentions, and when
    /// `target` is an assignment target, apply the widening rules to it.
    fn check_expr(&mut self, expr: &Expr, target: Option<&str>) {
        match expr {
            Expr::Binary(bin) => {
                if bin.op == BinOp::Div {
                    if let Some(target) = target {
                        self.mark(target, CppType::Double);
                    }
                }
                self.check_expr(&bin.lhs, target);
                self.check_expr(&bin.rhs, target);
            }
            Expr::Unary(un) => {
                if un.op == UnOp::Sqrt {
                    if let Some(target) = target {
                        self.mark(target, CppType::Double);
                    }
                }
                self.check_expr(&un.operand, target);
            }
            Expr::Literal(lit) => {
                let promotion = match lit.kind {
                    LiteralKind::Real => Some(CppType::Double),
                    LiteralKind::Bool => Some(CppType::Bool),
                    LiteralKind::Int | LiteralKind::Str => None,
                };
                if let (Some(ty), Some(target)) = (promotion, target) {
                    self.mark(target, ty);
                }
            }
            Expr::Var(id) => self.mark(&id.name, CppType::Int),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pscc_lex::tokenize;
    use pscc_par::Parser;

    fn types_of(source: &str) -> TypeMap {
        let program = Parser::new(tokenize(source).expect("lexing failed"))
            .parse_program()
            .expect("parsing failed");
        collect_types(&program)
    }

    #[test]
    fn test_default_type_is_int() {
        let types = types_of("a <- 1\nciteste b\npentru i <- 1, 3 executa\nsfarsit_pentru");
        assert_eq!(types["a"], CppType::Int);
        assert_eq!(types["b"], CppType::Int);
        assert_eq!(types["i"], CppType::Int);
    }

    #[test]
    fn test_used_variables_are_declared() {
        let types = types_of("scrie a + b");
        assert_eq!(types["a"], CppType::Int);
        assert_eq!(types["b"], CppType::Int);
    }

    #[test]
    fn test_division_promotes_to_double() {
        let types = types_of("m <- s / n");
        assert_eq!(types["m"], CppType::Double);
        assert_eq!(types["s"], CppType::Int);
        assert_eq!(types["n"], CppType::Int);
    }

    #[test]
    fn test_sqrt_promotes_to_double() {
        let types = types_of("r <- sqrt(x)");
        assert_eq!(types["r"], CppType::Double);
    }

    #[test]
    fn test_real_literal_promotes_to_double() {
        let types = types_of("pi <- 3.14");
        assert_eq!(types["pi"], CppType::Double);
    }

    #[test]
    fn test_nested_division_promotes() {
        let types = types_of("m <- 1 + a * (b / 2)");
        assert_eq!(types["m"], CppType::Double);
    }

    #[test]
    fn test_boolean_literal_promotes_to_bool() {
        let types = types_of("ok <- adevarat");
        assert_eq!(types["ok"], CppType::Bool);
    }

    #[test]
    fn test_promotions_never_demote() {
        let types = types_of("x <- 1.5\nx <- 2");
        assert_eq!(types["x"], CppType::Double);

        let types = types_of("ok <- fals\nok <- 1");
        assert_eq!(types["ok"], CppType::Bool);
    }

    #[test]
    fn test_bool_does_not_overwrite_double() {
        let types = types_of("x <- 1.5\nx <- adevarat");
        assert_eq!(types["x"], CppType::Double);
    }

    #[test]
    fn test_for_bounds_do_not_promote_iterator() {
        let types = types_of("pentru i <- 1, n / 2 executa\nsfarsit_pentru");
        assert_eq!(types["i"], CppType::Int);
        assert_eq!(types["n"], CppType::Int);
    }

    #[test]
    fn test_conditions_do_not_promote() {
        let types = types_of("cat timp a / 2 > 1 executa\nsfarsit_cat_timp");
        assert_eq!(types["a"], CppType::Int);
    }

    #[test]
    fn test_bodies_are_walked() {
        let source = "\
daca a = 1 atunci
    x <- 1.0
altfel
    y <- adevarat
sfarsit_daca
cat timp a > 0 executa
    z <- a / 2
sfarsit_cat_timp";
        let types = types_of(source);
        assert_eq!(types["x"], CppType::Double);
        assert_eq!(types["y"], CppType::Bool);
        assert_eq!(types["z"], CppType::Double);
    }

    #[test]
    fn test_insertion_order_is_first_appearance() {
        let types = types_of("b <- 1\na <- 2\nc <- 3");
        let names: Vec<_> = types.keys().cloned().collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_mean_scenario() {
        // s, n and i stay integral; ma becomes double through the division.
        let source = "\
s <- 0
pentru i <- 1, n executa
    s <- s + i
sfarsit_pentru
ma <- s / n";
        let types = types_of(source);
        assert_eq!(types["s"], CppType::Int);
        assert_eq!(types["n"], CppType::Int);
        assert_eq!(types["i"], CppType::Int);
        assert_eq!(types["ma"], CppType::Double);
    }
}
