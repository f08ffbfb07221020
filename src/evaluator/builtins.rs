/// Named constants declared in the root frame of every program.
pub const CONSTANTS: [(&str, f64); 2] =
  [("pi", std::f64::consts::PI), ("e", std::f64::consts::E)];

fn arity(name: &str) -> Option<usize> {
  match name {
    "sin" | "cos" | "tan" | "asin" | "acos" | "atan" | "sqrt" | "abs"
    | "ln" | "log" | "exp" | "floor" | "ceil" => Some(1),
    "min" | "max" => Some(2),
    _ => None,
  }
}

/// Apply a builtin to already evaluated numeric arguments.
///
/// Returns `None` when `name` is not a builtin.
pub fn call_builtin(name: &str, args: &[f64]) -> Option<Result<f64, String>> {
  let expected = arity(name)?;
  if args.len() != expected {
    return Some(Err(format!(
      "{name} expects {expected} argument{}; {} given",
      if expected == 1 { "" } else { "s" },
      args.len()
    )));
  }

  let x = args[0];
  let result = match name {
    "sin" => x.sin(),
    "cos" => x.cos(),
    "tan" => x.tan(),
    "asin" => x.asin(),
    "acos" => x.acos(),
    "atan" => x.atan(),
    "sqrt" => x.sqrt(),
    "abs" => x.abs(),
    "ln" => x.ln(),
    "log" => x.log10(),
    "exp" => x.exp(),
    "floor" => x.floor(),
    "ceil" => x.ceil(),
    "min" => x.min(args[1]),
    "max" => x.max(args[1]),
    _ => return None,
  };
  Some(Ok(result))
}
