//! Formula expressions.
//!
//! An [`Expr`] is a column-agnostic formula template. Rendering substitutes the
//! current column's letters into every row reference, so the same template
//! produces `=I19*I24`, `=J19*J24`, ... across the sweep. The same tree is
//! evaluated numerically by the offline variant.

use std::ops::{Add, Div, Mul, Sub};

use super::cell_ref::CellAddr;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
}

impl Op {
    fn symbol(self) -> char {
        match self {
            Op::Add => '+',
            Op::Sub => '-',
            Op::Mul => '*',
            Op::Div => '/',
        }
    }

    fn precedence(self) -> u8 {
        match self {
            Op::Add | Op::Sub => 1,
            Op::Mul | Op::Div => 2,
        }
    }

    /// Non-associative on the right: `a-(b-c)` and `a/(b/c)` need parentheses.
    fn strict_right(self) -> bool {
        matches!(self, Op::Sub | Op::Div)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Num(f64),
    /// Another row in the same column.
    Row(u32),
    /// A fixed cell outside the iteration area.
    Anchor(CellAddr),
    Binary(Box<Expr>, Op, Box<Expr>),
    /// Explicit parentheses, kept verbatim when rendering.
    Group(Box<Expr>),
}

/// Same-column reference to `row`.
pub fn row(row: u32) -> Expr {
    Expr::Row(row)
}

pub fn num(value: f64) -> Expr {
    Expr::Num(value)
}

/// Fixed-cell reference, e.g. `anchor(5, 28)` for `E28`.
pub fn anchor(col: usize, row: u32) -> Expr {
    Expr::Anchor(CellAddr::new(col, row))
}

/// Supplies values for references while evaluating one column.
pub trait Resolve {
    fn row(&self, row: u32) -> f64;
    fn anchor(&self, addr: CellAddr) -> f64;
}

impl Expr {
    /// Wrap in explicit parentheses.
    pub fn group(self) -> Expr {
        Expr::Group(Box::new(self))
    }

    /// Formula text for a column, including the leading `=`.
    pub fn formula(&self, column: &str) -> String {
        let mut out = String::from("=");
        self.render_into(column, &mut out);
        out
    }

    fn precedence(&self) -> u8 {
        match self {
            Expr::Binary(_, op, _) => op.precedence(),
            _ => u8::MAX,
        }
    }

    fn render_into(&self, column: &str, out: &mut String) {
        match self {
            Expr::Num(n) => out.push_str(&format_number(*n)),
            Expr::Row(r) => {
                out.push_str(column);
                out.push_str(&r.to_string());
            }
            Expr::Anchor(addr) => out.push_str(&addr.to_string()),
            Expr::Group(inner) => {
                out.push('(');
                inner.render_into(column, out);
                out.push(')');
            }
            Expr::Binary(lhs, op, rhs) => {
                let lhs_parens = lhs.precedence() < op.precedence();
                let rhs_parens = rhs.precedence() < op.precedence()
                    || (rhs.precedence() == op.precedence() && op.strict_right());
                render_operand(lhs, lhs_parens, column, out);
                out.push(op.symbol());
                render_operand(rhs, rhs_parens, column, out);
            }
        }
    }

    /// Same-column rows this expression reads, in first-seen order.
    pub fn rows(&self) -> Vec<u32> {
        let mut rows = Vec::new();
        self.collect_rows(&mut rows);
        rows
    }

    fn collect_rows(&self, rows: &mut Vec<u32>) {
        match self {
            Expr::Row(r) => {
                if !rows.contains(r) {
                    rows.push(*r);
                }
            }
            Expr::Group(inner) => inner.collect_rows(rows),
            Expr::Binary(lhs, _, rhs) => {
                lhs.collect_rows(rows);
                rhs.collect_rows(rows);
            }
            Expr::Num(_) | Expr::Anchor(_) => {}
        }
    }

    /// Evaluate against resolved references. Division by zero is NaN, not
    /// infinity, so a zero divisor poisons only the column it occurs in.
    pub fn eval(&self, env: &impl Resolve) -> f64 {
        match self {
            Expr::Num(n) => *n,
            Expr::Row(r) => env.row(*r),
            Expr::Anchor(addr) => env.anchor(*addr),
            Expr::Group(inner) => inner.eval(env),
            Expr::Binary(lhs, op, rhs) => {
                let a = lhs.eval(env);
                let b = rhs.eval(env);
                match op {
                    Op::Add => a + b,
                    Op::Sub => a - b,
                    Op::Mul => a * b,
                    Op::Div if b == 0.0 => f64::NAN,
                    Op::Div => a / b,
                }
            }
        }
    }
}

fn render_operand(expr: &Expr, parens: bool, column: &str, out: &mut String) {
    if parens {
        out.push('(');
        expr.render_into(column, out);
        out.push(')');
    } else {
        expr.render_into(column, out);
    }
}

/// Render a number the way it should appear in formula text (`5`, `0.35`).
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Expr::Num(value)
    }
}

macro_rules! impl_op {
    ($trait:ident, $method:ident, $op:expr) => {
        impl<T: Into<Expr>> $trait<T> for Expr {
            type Output = Expr;

            fn $method(self, rhs: T) -> Expr {
                Expr::Binary(Box::new(self), $op, Box::new(rhs.into()))
            }
        }
    };
}

impl_op!(Add, add, Op::Add);
impl_op!(Sub, sub, Op::Sub);
impl_op!(Mul, mul, Op::Mul);
impl_op!(Div, div, Op::Div);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct Env(HashMap<u32, f64>);

    impl Resolve for Env {
        fn row(&self, row: u32) -> f64 {
            self.0.get(&row).copied().unwrap_or(f64::NAN)
        }

        fn anchor(&self, _addr: CellAddr) -> f64 {
            0.5
        }
    }

    #[test]
    fn test_render_left_chain_without_parens() {
        let e = row(4) - row(5) - row(6) - row(7) + row(8) - row(9);
        assert_eq!(e.formula("I"), "=I4-I5-I6-I7+I8-I9");
    }

    #[test]
    fn test_render_explicit_groups() {
        let e = (row(4) - row(5) - row(6) - row(7)).group() * row(28);
        assert_eq!(e.formula("J"), "=(J4-J5-J6-J7)*J28");
        let e = (num(1.0) - row(22)).group();
        assert_eq!(e.formula("I"), "=(1-I22)");
    }

    #[test]
    fn test_render_inserts_required_parens() {
        let e = row(22) * (row(6) + row(7));
        assert_eq!(e.formula("I"), "=I22*(I6+I7)");
        let e = row(1) - (row(2) - row(3));
        assert_eq!(e.formula("I"), "=I1-(I2-I3)");
    }

    #[test]
    fn test_render_anchor_and_numbers() {
        assert_eq!(anchor(5, 28).formula("K"), "=E28");
        assert_eq!((row(18) / 5.0).formula("I"), "=I18/5");
        assert_eq!((row(19) * 0.1).formula("I"), "=I19*0.1");
    }

    #[test]
    fn test_rows_deduplicated() {
        let e = row(18) / row(21) * 100.0 + row(18);
        assert_eq!(e.rows(), vec![18, 21]);
    }

    #[test]
    fn test_eval_division_by_zero_is_nan() {
        let env = Env(HashMap::from([(1, 4.0), (2, 0.0)]));
        assert!((row(1) / row(2)).eval(&env).is_nan());
        assert_eq!((row(1) * anchor(5, 28)).eval(&env), 2.0);
        assert!((row(1) + row(3)).eval(&env).is_nan());
    }
}
