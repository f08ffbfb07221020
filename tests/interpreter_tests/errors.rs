use super::*;

mod errors {
  use super::*;

  #[test]
  fn division_by_zero() {
    assert_eq!(interpret("1 / 0").unwrap(), "Error: division by zero");
    assert_eq!(interpret("1 % 0").unwrap(), "Error: remainder by zero");
  }

  #[test]
  fn undefined_variable() {
    assert_eq!(
      interpret("y + 1").unwrap(),
      "Error: undefined variable 'y'"
    );
  }

  #[test]
  fn redeclaration() {
    let context = evaluate_program("let x = 1\nlet x = 2").unwrap();
    assert_eq!(context.errors.len(), 1);
    assert_eq!(
      context.errors[0].message,
      "'x' is already declared in this scope"
    );
    assert_eq!(context.errors[0].span.map(|s| s.line), Some(2));
  }

  #[test]
  fn print_inside_function() {
    assert_eq!(
      interpret("fn f(x) {\n  print x\n}\nf(1)").unwrap(),
      "Error: print is only allowed at the top level of a program"
    );
  }

  #[test]
  fn slider_inside_function() {
    assert_eq!(
      interpret("fn f(x) {\n  slider a from 0 to 1\n  x\n}\nf(1)").unwrap(),
      "Error: slider is only allowed at the top level of a program"
    );
  }

  #[test]
  fn slider_step_must_be_positive() {
    let context = evaluate_program("slider a from 0 to 1 step 0 - 1").unwrap();
    assert_eq!(
      context.errors[0].message,
      "slider a needs a positive step, got -1"
    );
  }

  #[test]
  fn evaluation_continues_after_an_error() {
    let context = evaluate_program("let a = 1 / 0\nlet b = 2\nb").unwrap();
    assert_eq!(context.errors.len(), 1);
    assert_eq!(context.program_result.to_string(), "2");
  }

  #[test]
  fn failed_declaration_reports_the_same_error_on_use() {
    let context = evaluate_program("let a = 1 / 0\na + 1").unwrap();
    assert_eq!(context.errors.len(), 2);
    assert_eq!(context.errors[0], context.errors[1]);
    let span = context.errors[0].span.unwrap();
    assert_eq!(span.text(&context.text), "1 / 0");
  }
}
