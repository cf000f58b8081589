// Formula DSL - Sandboxed Custom Incentive Formulas
//
// Admin-authored formulas are text in a small expression language:
// - Parsed into a tagged AST (no string/array/object literals, no assignment)
// - Evaluated by a tree-walking interpreter (no dynamic code execution)
// - Cached by text hash so repeated simulate/validate calls parse once
//
// Architecture:
// - types.rs: AST node and operator definitions, variable/function allow-lists
// - lexer.rs: Tokenizer with character positions
// - parser.rs: Recursive-descent parser with length and nesting caps
// - context.rs: Variable bindings built from sales data and profile
// - interpreter.rs: Evaluator
// - cache.rs: Process-wide bounded LRU of parsed formulas

pub mod cache;
pub mod context;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod types;

pub use cache::{formula_key, CacheStats, FormulaCache, FormulaKey, DEFAULT_CACHE_CAPACITY};
pub use context::{BindingError, Bindings};
pub use interpreter::{evaluate, EvalError};
pub use parser::{parse_formula, ParseError, ParseErrorKind, MAX_FORMULA_LENGTH, MAX_NESTING_DEPTH};
pub use types::{is_allowed_variable, BinaryOp, Expr, Function, UnaryOp, ALLOWED_VARIABLES};
