use super::*;

mod arithmetic {
  use super::*;

  #[test]
  fn addition_and_subtraction() {
    assert_eq!(interpret("1 + 2").unwrap(), "3");
    assert_eq!(interpret("7 - 3 - 1").unwrap(), "3");
    assert_eq!(interpret("-1 + 3").unwrap(), "2");
  }

  #[test]
  fn precedence() {
    assert_eq!(interpret("1 + 2 * 3").unwrap(), "7");
    assert_eq!(interpret("(1 + 2) * 3").unwrap(), "9");
    assert_eq!(interpret("10 - 4 / 2").unwrap(), "8");
  }

  #[test]
  fn power_is_right_associative() {
    assert_eq!(interpret("2 ^ 3 ^ 2").unwrap(), "512");
    assert_eq!(interpret("-2 ^ 2").unwrap(), "-4");
    assert_eq!(interpret("(-2) ^ 2").unwrap(), "4");
  }

  #[test]
  fn division_and_remainder() {
    assert_eq!(interpret("10 / 4").unwrap(), "2.5");
    assert_eq!(interpret("7 % 3").unwrap(), "1");
  }

  #[test]
  fn number_literals() {
    assert_eq!(interpret("1e3").unwrap(), "1000");
    assert_eq!(interpret(".5").unwrap(), "0.5");
    assert_eq!(interpret("2.25").unwrap(), "2.25");
  }

  mod builtins {
    use super::*;

    #[test]
    fn single_argument() {
      assert_eq!(interpret("sqrt(16)").unwrap(), "4");
      assert_eq!(interpret("abs(-3)").unwrap(), "3");
      assert_eq!(interpret("floor(2.7)").unwrap(), "2");
      assert_eq!(interpret("ceil(2.1)").unwrap(), "3");
      assert_eq!(interpret("sin(0)").unwrap(), "0");
      assert_eq!(interpret("exp(0)").unwrap(), "1");
    }

    #[test]
    fn two_arguments() {
      assert_eq!(interpret("max(2, 5)").unwrap(), "5");
      assert_eq!(interpret("min(2, 5)").unwrap(), "2");
    }

    #[test]
    fn constants() {
      assert_eq!(interpret("pi").unwrap(), "3.141592653589793");
      assert_eq!(interpret("e").unwrap(), "2.718281828459045");
    }

    #[test]
    fn constants_can_be_shadowed() {
      assert_eq!(interpret("let pi = 3\npi").unwrap(), "3");
    }

    #[test]
    fn wrong_argument_count() {
      assert_eq!(
        interpret("sin(1, 2)").unwrap(),
        "Error: sin expects 1 argument; 2 given"
      );
    }
  }
}
