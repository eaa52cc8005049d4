//! The tracing visitor.

use serde_json::{json, Map, Value as Json};
use std::fmt::Write as _;

use pscc_par::{
    BinOp, BinaryExpr, Block, DoWhileStmt, Expr, ForStmt, IfStmt, LiteralKind, Program, ReadStmt,
    RepeatUntilStmt, Stmt, WhileStmt, WriteStmt,
};

use crate::error::ExecError;
use crate::input::{InputProvider, StdinInput};
use crate::ops;
use crate::step::{ExecutionStep, VarStore};
use crate::value::Value;

/// Walks the AST, maintains the global variable store and, when tracing
/// is enabled, records one [`ExecutionStep`] per visited node.
///
/// # Examples
///
/// ```
/// use pscc_int::{Interpreter, QueueInput};
/// use pscc_lex::tokenize;
/// use pscc_par::Parser;
///
/// let program = Parser::new(tokenize("a <- 2\nscrie a + 1").unwrap())
///     .parse_program()
///     .unwrap();
/// let mut interp = Interpreter::with_input(QueueInput::default(), true);
/// interp.run(&program).unwrap();
/// assert_eq!(interp.final_output(), "3\n");
/// ```
pub struct Interpreter<'a> {
    globals: VarStore,
    tracing: bool,
    trace: Vec<ExecutionStep>,
    step_counter: usize,
    output: String,
    output_history: Vec<String>,
    input: Box<dyn InputProvider + 'a>,
    step_callback: Option<Box<dyn FnMut(&ExecutionStep) + 'a>>,
    output_sink: Option<Box<dyn FnMut(&str) + 'a>>,
}

impl<'a> Interpreter<'a> {
    /// Interpreter over process stdin. `tracing` toggles step recording;
    /// execution and output happen either way.
    pub fn new(tracing: bool) -> Self {
        Self::with_input(StdinInput, tracing)
    }

    /// Interpreter over a caller-supplied input provider.
    pub fn with_input<I: InputProvider + 'a>(input: I, tracing: bool) -> Self {
        Self {
            globals: VarStore::default(),
            tracing,
            trace: Vec::new(),
            step_counter: 0,
            output: String::new(),
            output_history: Vec::new(),
            input: Box::new(input),
            step_callback: None,
            output_sink: None,
        }
    }

    /// Install a callback invoked synchronously after each recorded step.
    pub fn set_step_callback<F: FnMut(&ExecutionStep) + 'a>(&mut self, callback: F) {
        self.step_callback = Some(Box::new(callback));
    }

    /// Install a sink that receives every WRITE line (without the
    /// trailing newline) as it is produced.
    pub fn set_output_sink<F: FnMut(&str) + 'a>(&mut self, sink: F) {
        self.output_sink = Some(Box::new(sink));
    }

    /// Execute a program. The first runtime error aborts the run; steps
    /// recorded before the failure stay available.
    pub fn run(&mut self, program: &Program) -> Result<(), ExecError> {
        self.record_synthetic("PROGRAM", "Începere program");
        for stmt in &program.body {
            self.exec_stmt(stmt)?;
        }
        self.record_synthetic("PROGRAM", "Terminare program");
        Ok(())
    }

    // --- Final-state accessors ---

    /// The cumulative output buffer, one line per WRITE.
    pub fn final_output(&self) -> &str {
        &self.output
    }

    /// Every WRITE line, in order, without trailing newlines.
    pub fn output_history(&self) -> &[String] {
        &self.output_history
    }

    /// The variable store after the run.
    pub fn globals(&self) -> &VarStore {
        &self.globals
    }

    /// The recorded steps.
    pub fn trace(&self) -> &[ExecutionStep] {
        &self.trace
    }

    /// Export the trace as a JSON array, one object per step with keys
    /// `step, line, type, description, value, variables, output`.
    pub fn export_trace_json(&self) -> String {
        let steps: Vec<Json> = self
            .trace
            .iter()
            .map(|step| {
                json!({
                    "step": step.step_number,
                    "line": step.line,
                    "type": step.node_kind,
                    "description": step.description,
                    "value": step.value.as_ref().map(Value::to_string),
                    "variables": step.snapshot,
                    "output": step.output_so_far,
                })
            })
            .collect();
        serde_json::to_string_pretty(&steps).unwrap_or_else(|_| "[]".to_string())
    }

    /// Render the trace as the human-readable step report.
    pub fn render_trace_report(&self) -> String {
        let mut report = String::new();
        let rule = "=".repeat(80);
        let _ = writeln!(report, "{rule}");
        let _ = writeln!(report, "URMĂRIRE EXECUȚIE PAS CU PAS");
        let _ = writeln!(report, "{rule}");
        let _ = writeln!(report);

        for step in &self.trace {
            let _ = writeln!(
                report,
                "Pasul {} | Linia {} | {}",
                step.step_number, step.line, step.node_kind
            );
            let _ = writeln!(report, "  → {}", step.description);
            if let Some(value) = &step.value {
                let _ = writeln!(report, "  Valoare: {value}");
            }
            if !step.snapshot.is_empty() {
                let vars = step
                    .snapshot
                    .iter()
                    .map(|(name, value)| format!("{name} = {value}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                let _ = writeln!(report, "  Variabile: {{{vars}}}");
            }
            if !step.output_so_far.is_empty() {
                let _ = writeln!(report, "  Output până acum: {:?}", step.output_so_far);
            }
            let _ = writeln!(report);
        }
        report
    }

    // --- Step recording ---

    fn push_step(
        &mut self,
        node_kind: &'static str,
        line: u32,
        node_details: Map<String, Json>,
        description: String,
        value: Option<Value>,
    ) {
        if !self.tracing {
            return;
        }
        self.step_counter += 1;
        let step = ExecutionStep {
            step_number: self.step_counter,
            node_kind,
            line,
            description,
            snapshot: self.globals.clone(),
            value,
            node_details,
            output_so_far: self.output.clone(),
        };
        self.trace.push(step);
        if let (Some(callback), Some(step)) = (self.step_callback.as_mut(), self.trace.last()) {
            callback(step);
        }
    }

    fn record_stmt(&mut self, stmt: &Stmt, description: String, value: Option<Value>) {
        if self.tracing {
            self.push_step(
                stmt.kind_name(),
                stmt.span().line,
                stmt.attrs(),
                description,
                value,
            );
        }
    }

    fn record_expr(&mut self, expr: &Expr, description: String, value: Option<Value>) {
        if self.tracing {
            self.push_step(
                expr.kind_name(),
                expr.span().line,
                expr.attrs(),
                description,
                value,
            );
        }
    }

    fn record_synthetic(&mut self, node_kind: &'static str, description: &str) {
        if self.tracing {
            self.push_step(node_kind, 0, Map::new(), description.to_string(), None);
        }
    }

    // --- Statement execution ---

    fn exec_stmt(&mut self, stmt: &Stmt) -> Result<(), ExecError> {
        match stmt {
            Stmt::Assign(assign) => {
                let value = self.eval(&assign.value)?;
                self.globals
                    .insert(assign.target.name.clone(), value.clone());
                self.record_stmt(
                    stmt,
                    format!("Atribuire: {} ← {}", assign.target.name, value),
                    Some(value),
                );
                Ok(())
            }
            Stmt::If(if_stmt) => self.exec_if(stmt, if_stmt),
            Stmt::While(while_stmt) => self.exec_while(stmt, while_stmt),
            Stmt::DoWhile(do_while) => self.exec_do_while(stmt, do_while),
            Stmt::RepeatUntil(repeat) => self.exec_repeat_until(stmt, repeat),
            Stmt::For(for_stmt) => self.exec_for(stmt, for_stmt),
            Stmt::Read(read) => self.exec_read(stmt, read),
            Stmt::Write(write) => self.exec_write(stmt, write),
        }
    }

    fn exec_block(&mut self, block: &Block) -> Result<(), ExecError> {
        self.record_synthetic("BLOCK", "Intrare în bloc");
        for stmt in &block.stmts {
            self.exec_stmt(stmt)?;
        }
        self.record_synthetic("BLOCK", "Ieșire din bloc");
        Ok(())
    }

    fn exec_if(&mut self, stmt: &Stmt, if_stmt: &IfStmt) -> Result<(), ExecError> {
        let cond = self.eval(&if_stmt.cond)?;
        self.record_stmt(
            stmt,
            format!("Evaluare IF: condiție = {cond}"),
            Some(cond.clone()),
        );

        if cond.is_truthy() {
            self.record_stmt(stmt, "Execuție ramură THEN".to_string(), None);
            self.exec_block(&if_stmt.then_block)
        } else if !if_stmt.else_block.stmts.is_empty() {
            self.record_stmt(stmt, "Execuție ramură ELSE".to_string(), None);
            self.exec_block(&if_stmt.else_block)
        } else {
            self.record_stmt(stmt, "Salt peste IF (condiție falsă)".to_string(), None);
            Ok(())
        }
    }

    fn exec_while(&mut self, stmt: &Stmt, while_stmt: &WhileStmt) -> Result<(), ExecError> {
        self.record_stmt(stmt, "Intrare în bucla WHILE".to_string(), None);

        let mut iterations: usize = 0;
        loop {
            let cond = self.eval(&while_stmt.cond)?;
            self.record_stmt(
                stmt,
                format!("WHILE iterația {}: condiție = {}", iterations + 1, cond),
                Some(cond.clone()),
            );
            if !cond.is_truthy() {
                break;
            }
            self.exec_block(&while_stmt.body)?;
            iterations += 1;
        }

        self.record_stmt(
            stmt,
            format!("Ieșire din WHILE după {iterations} iterații"),
            None,
        );
        Ok(())
    }

    fn exec_do_while(&mut self, stmt: &Stmt, do_while: &DoWhileStmt) -> Result<(), ExecError> {
        self.record_stmt(stmt, "Intrare în DO-WHILE".to_string(), None);

        let mut iterations: usize = 0;
        loop {
            iterations += 1;
            self.record_stmt(stmt, format!("DO-WHILE iterația {iterations}"), None);
            self.exec_block(&do_while.body)?;

            let cond = self.eval(&do_while.cond)?;
            self.record_stmt(stmt, format!("WHILE: condiție = {cond}"), Some(cond.clone()));
            if !cond.is_truthy() {
                break;
            }
        }

        self.record_stmt(
            stmt,
            format!("Ieșire din DO-WHILE după {iterations} iterații"),
            None,
        );
        Ok(())
    }

    fn exec_repeat_until(&mut self, stmt: &Stmt, repeat: &RepeatUntilStmt) -> Result<(), ExecError> {
        self.record_stmt(stmt, "Intrare în REPEAT-UNTIL".to_string(), None);

        let mut iterations: usize = 0;
        loop {
            iterations += 1;
            self.record_stmt(stmt, format!("REPEAT iterația {iterations}"), None);
            self.exec_block(&repeat.body)?;

            let cond = self.eval(&repeat.cond)?;
            self.record_stmt(stmt, format!("UNTIL: condiție = {cond}"), Some(cond.clone()));
            if cond.is_truthy() {
                break;
            }
        }

        self.record_stmt(
            stmt,
            format!("Ieșire din REPEAT după {iterations} iterații"),
            None,
        );
        Ok(())
    }

    fn exec_for(&mut self, stmt: &Stmt, for_stmt: &ForStmt) -> Result<(), ExecError> {
        let line = for_stmt.span.line;
        let start = self.eval(&for_stmt.start)?;
        let stop = self.eval(&for_stmt.stop)?;
        let step = self.eval(&for_stmt.step)?;

        // The loop guard depends on the step sign; a zero step would
        // never terminate.
        let step_positive = match &step {
            Value::Int(0) => return Err(ExecError::ZeroStep { line }),
            Value::Int(i) => *i > 0,
            Value::Real(r) if *r == 0.0 => return Err(ExecError::ZeroStep { line }),
            Value::Real(r) => *r > 0.0,
            Value::Bool(_) | Value::Str(_) => return Err(ExecError::InvalidStep { line }),
        };

        let name = for_stmt.iterator.name.clone();
        self.globals.insert(name.clone(), start.clone());
        self.record_stmt(
            stmt,
            format!("Intrare în FOR: {name} de la {start} la {stop}, pas {step}"),
            None,
        );

        let guard_op = if step_positive { BinOp::Gt } else { BinOp::Lt };
        let mut iterations: usize = 0;
        loop {
            let current = self.lookup(&name, line)?;
            if ops::apply_binop(guard_op, &current, &stop, line)?.is_truthy() {
                break;
            }

            iterations += 1;
            self.record_stmt(
                stmt,
                format!("FOR iterația {iterations}: {name} = {current}"),
                Some(current),
            );
            self.exec_block(&for_stmt.body)?;

            // The increment applies to whatever the body left in the
            // iterator, not the value this iteration started with.
            let after_body = self.lookup(&name, line)?;
            let next = ops::apply_binop(BinOp::Add, &after_body, &step, line)?;
            self.globals.insert(name.clone(), next);
        }

        self.record_stmt(stmt, format!("Ieșire din FOR după {iterations} iterații"), None);
        Ok(())
    }

    fn exec_read(&mut self, stmt: &Stmt, read: &ReadStmt) -> Result<(), ExecError> {
        for target in &read.targets {
            let prompt = format!("Introduceți valoare pentru {}: ", target.name);
            let raw = self
                .input
                .read_line(&prompt)
                .ok_or_else(|| ExecError::InputExhausted {
                    name: target.name.clone(),
                    line: read.span.line,
                })?;
            let value = parse_input_line(&raw);
            self.globals.insert(target.name.clone(), value.clone());
            self.record_stmt(
                stmt,
                format!("Citire: {} ← {} (input)", target.name, value),
                Some(value),
            );
        }
        Ok(())
    }

    fn exec_write(&mut self, stmt: &Stmt, write: &WriteStmt) -> Result<(), ExecError> {
        let mut parts = Vec::with_capacity(write.values.len());
        for expr in &write.values {
            let value = self.eval(expr)?;
            let rendered = match value {
                // String literals carry `\n` textually until this point.
                Value::Str(s) => s.replace("\\n", "\n"),
                other => other.to_string(),
            };
            parts.push(rendered);
        }

        let line_out = parts.concat();
        self.output.push_str(&line_out);
        self.output.push('\n');
        self.output_history.push(line_out.clone());
        if let Some(sink) = self.output_sink.as_mut() {
            sink(&line_out);
        }

        self.record_stmt(
            stmt,
            format!("Scriere: {line_out:?}"),
            Some(Value::Str(line_out)),
        );
        Ok(())
    }

    fn lookup(&self, name: &str, line: u32) -> Result<Value, ExecError> {
        self.globals
            .get(name)
            .cloned()
            .ok_or_else(|| ExecError::UndefinedVariable {
                name: name.to_string(),
                line,
            })
    }

    // --- Expression evaluation ---

    fn eval(&mut self, expr: &Expr) -> Result<Value, ExecError> {
        match expr {
            Expr::Literal(lit) => {
                let line = lit.span.line;
                match lit.kind {
                    LiteralKind::Int => {
                        let parsed: i64 =
                            lit.text
                                .parse()
                                .map_err(|_| ExecError::InvalidLiteral {
                                    text: lit.text.clone(),
                                    line,
                                })?;
                        let value = Value::Int(parsed);
                        self.record_expr(
                            expr,
                            format!("Evaluare literal întreg: {}", lit.text),
                            Some(value.clone()),
                        );
                        Ok(value)
                    }
                    LiteralKind::Real => {
                        let parsed: f64 =
                            lit.text
                                .parse()
                                .map_err(|_| ExecError::InvalidLiteral {
                                    text: lit.text.clone(),
                                    line,
                                })?;
                        let value = Value::Real(parsed);
                        self.record_expr(
                            expr,
                            format!("Evaluare literal real: {}", lit.text),
                            Some(value.clone()),
                        );
                        Ok(value)
                    }
                    LiteralKind::Bool => {
                        let value = Value::Bool(lit.text == "adevarat");
                        self.record_expr(
                            expr,
                            format!("Evaluare literal: {}", lit.text),
                            Some(value.clone()),
                        );
                        Ok(value)
                    }
                    LiteralKind::Str => {
                        let value = Value::Str(lit.text.clone());
                        self.record_expr(
                            expr,
                            format!("Evaluare literal: {}", lit.text),
                            Some(value.clone()),
                        );
                        Ok(value)
                    }
                }
            }
            Expr::Var(id) => {
                let value = self.lookup(&id.name, id.span.line)?;
                self.record_expr(
                    expr,
                    format!("Citire variabilă '{}'", id.name),
                    Some(value.clone()),
                );
                Ok(value)
            }
            Expr::Binary(bin) => self.eval_binary(expr, bin),
            Expr::Unary(un) => {
                let operand = self.eval(&un.operand)?;
                let result = ops::apply_unop(un.op, &operand, un.span.line)?;
                self.record_expr(
                    expr,
                    format!("Operație unară: {}({})", un.op, operand),
                    Some(result.clone()),
                );
                Ok(result)
            }
        }
    }

    /// `si`/`sau` short-circuit and propagate the last-evaluated operand;
    /// everything else evaluates both sides and defers to [`ops`].
    fn eval_binary(&mut self, expr: &Expr, bin: &BinaryExpr) -> Result<Value, ExecError> {
        match bin.op {
            BinOp::And => {
                let left = self.eval(&bin.lhs)?;
                if !left.is_truthy() {
                    self.record_expr(
                        expr,
                        format!("Operație binară: {left} AND (scurtcircuit)"),
                        Some(left.clone()),
                    );
                    return Ok(left);
                }
                let right = self.eval(&bin.rhs)?;
                self.record_expr(
                    expr,
                    format!("Operație binară: {left} AND {right}"),
                    Some(right.clone()),
                );
                Ok(right)
            }
            BinOp::Or => {
                let left = self.eval(&bin.lhs)?;
                if left.is_truthy() {
                    self.record_expr(
                        expr,
                        format!("Operație binară: {left} OR (scurtcircuit)"),
                        Some(left.clone()),
                    );
                    return Ok(left);
                }
                let right = self.eval(&bin.rhs)?;
                self.record_expr(
                    expr,
                    format!("Operație binară: {left} OR {right}"),
                    Some(right.clone()),
                );
                Ok(right)
            }
            op => {
                let left = self.eval(&bin.lhs)?;
                let right = self.eval(&bin.rhs)?;
                let result = ops::apply_binop(op, &left, &right, bin.span.line)?;
                self.record_expr(
                    expr,
                    format!("Operație binară: {left} {op} {right}"),
                    Some(result.clone()),
                );
                Ok(result)
            }
        }
    }
}

/// READ parsing order: integer when there is no decimal point, real when
/// there is one, raw string otherwise.
fn parse_input_line(raw: &str) -> Value {
    let trimmed = raw.trim();
    if trimmed.contains('.') {
        if let Ok(parsed) = trimmed.parse::<f64>() {
            return Value::Real(parsed);
        }
    } else if let Ok(parsed) = trimmed.parse::<i64>() {
        return Value::Int(parsed);
    }
    Value::Str(raw.to_string())
}
