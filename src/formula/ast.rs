//! Abstract syntax tree and tree-walking evaluator

/// Binary arithmetic operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinaryOp {
    fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            BinaryOp::Add => lhs + rhs,
            BinaryOp::Sub => lhs - rhs,
            BinaryOp::Mul => lhs * rhs,
            BinaryOp::Div => lhs / rhs,
            BinaryOp::Pow => lhs.powf(rhs),
        }
    }
}

/// Functions callable from a formula
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Sqrt,
    Abs,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Exp,
    Ln,
    Log10,
    Log2,
    Floor,
    Ceil,
    Round,
    Min,
    Max,
    Pow,
    Atan2,
    Hypot,
}

impl Function {
    /// Resolve a function name from the allow-list
    pub fn lookup(name: &str) -> Option<Self> {
        let function = match name {
            "sqrt" => Function::Sqrt,
            "abs" => Function::Abs,
            "sin" => Function::Sin,
            "cos" => Function::Cos,
            "tan" => Function::Tan,
            "asin" => Function::Asin,
            "acos" => Function::Acos,
            "atan" => Function::Atan,
            "sinh" => Function::Sinh,
            "cosh" => Function::Cosh,
            "tanh" => Function::Tanh,
            "exp" => Function::Exp,
            "log" | "ln" => Function::Ln,
            "log10" => Function::Log10,
            "log2" => Function::Log2,
            "floor" => Function::Floor,
            "ceil" => Function::Ceil,
            "round" => Function::Round,
            "min" => Function::Min,
            "max" => Function::Max,
            "pow" => Function::Pow,
            "atan2" => Function::Atan2,
            "hypot" => Function::Hypot,
            _ => return None,
        };
        Some(function)
    }

    /// Number of arguments the function takes
    pub fn arity(self) -> usize {
        match self {
            Function::Min | Function::Max | Function::Pow | Function::Atan2 | Function::Hypot => 2,
            _ => 1,
        }
    }

    /// Apply the function; `args.len()` always equals `arity()`
    fn apply(self, args: &[f64]) -> f64 {
        let x = args[0];
        match self {
            Function::Sqrt => x.sqrt(),
            Function::Abs => x.abs(),
            Function::Sin => x.sin(),
            Function::Cos => x.cos(),
            Function::Tan => x.tan(),
            Function::Asin => x.asin(),
            Function::Acos => x.acos(),
            Function::Atan => x.atan(),
            Function::Sinh => x.sinh(),
            Function::Cosh => x.cosh(),
            Function::Tanh => x.tanh(),
            Function::Exp => x.exp(),
            Function::Ln => x.ln(),
            Function::Log10 => x.log10(),
            Function::Log2 => x.log2(),
            Function::Floor => x.floor(),
            Function::Ceil => x.ceil(),
            Function::Round => x.round(),
            Function::Min | Function::Max if x.is_nan() || args[1].is_nan() => f64::NAN,
            Function::Min => x.min(args[1]),
            Function::Max => x.max(args[1]),
            Function::Pow => x.powf(args[1]),
            Function::Atan2 => x.atan2(args[1]),
            Function::Hypot => x.hypot(args[1]),
        }
    }
}

/// Parsed formula with identifiers resolved to variable slots
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    /// Index into the binding slice passed to `eval`
    Variable(usize),
    Negate(Box<Expr>),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Call {
        function: Function,
        args: Vec<Expr>,
    },
}

impl Expr {
    /// Evaluate against variable bindings (one value per declared variable)
    pub fn eval(&self, bindings: &[f64]) -> f64 {
        match self {
            Expr::Number(n) => *n,
            Expr::Variable(slot) => bindings[*slot],
            Expr::Negate(inner) => -inner.eval(bindings),
            Expr::Binary { op, lhs, rhs } => op.apply(lhs.eval(bindings), rhs.eval(bindings)),
            Expr::Call { function, args } => {
                let mut values = [0.0; 2];
                for (slot, arg) in values.iter_mut().zip(args) {
                    *slot = arg.eval(bindings);
                }
                function.apply(&values[..args.len()])
            }
        }
    }

    /// Collect the variable slots referenced anywhere in the tree
    pub fn variables(&self, out: &mut Vec<usize>) {
        match self {
            Expr::Number(_) => {}
            Expr::Variable(slot) => {
                if !out.contains(slot) {
                    out.push(*slot);
                }
            }
            Expr::Negate(inner) => inner.variables(out),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.variables(out);
                rhs.variables(out);
            }
            Expr::Call { args, .. } => {
                for arg in args {
                    arg.variables(out);
                }
            }
        }
    }
}
