use super::*;

mod functions {
  use super::*;

  #[test]
  fn expression_body() {
    assert_eq!(interpret("fn f(x) = x + 1\nf(2)").unwrap(), "3");
  }

  #[test]
  fn block_body_with_return() {
    let program = "fn f(x) {\n  let y = x * 2\n  return y + 1\n}\nf(3)";
    assert_eq!(interpret(program).unwrap(), "7");
  }

  #[test]
  fn block_body_yields_last_value() {
    assert_eq!(interpret("fn f(x) {\n  x * 2\n}\nf(4)").unwrap(), "8");
  }

  #[test]
  fn captures_are_a_snapshot() {
    let program = "let a = 10\nfn f(x) = x + a\na = 20\nf(1)";
    assert_eq!(interpret(program).unwrap(), "11");
  }

  #[test]
  fn parameters_shadow_captures() {
    assert_eq!(interpret("let x = 5\nfn f(x) = x * 2\nf(3)").unwrap(), "6");
  }

  #[test]
  fn calls_captured_functions() {
    let program = "fn sq(x) = x * x\nfn g(x) = sq(x) + 1\ng(3)";
    assert_eq!(interpret(program).unwrap(), "10");
  }

  #[test]
  fn function_values_display_their_signature() {
    assert_eq!(interpret("fn f(a, b) = a + b\nf").unwrap(), "fn f(a, b)");
  }

  #[test]
  fn locals_do_not_leak() {
    let program = "fn f(x) {\n  let inner = x\n  inner\n}\nf(1)\ninner";
    assert_eq!(interpret(program).unwrap(), "Error: undefined variable 'inner'");
  }

  #[test]
  fn wrong_argument_count() {
    assert_eq!(
      interpret("fn f(x) = x\nf(1, 2)").unwrap(),
      "Error: f expects 1 argument; 2 given"
    );
  }

  #[test]
  fn calling_a_number() {
    assert_eq!(
      interpret("let a = 1\na(2)").unwrap(),
      "Error: 'a' is not a function"
    );
  }

  #[test]
  fn undefined_function() {
    assert_eq!(
      interpret("nope(1)").unwrap(),
      "Error: undefined function 'nope'"
    );
  }
}
