use super::*;
use calcplot::evaluator::ProgramResult;
use calcplot::value::Value;

mod statements {
  use super::*;

  #[test]
  fn let_and_assign() {
    assert_eq!(interpret("let x = 2\nx * 3").unwrap(), "6");
    assert_eq!(interpret("let x = 1; x = x + 1; x").unwrap(), "2");
  }

  #[test]
  fn declarations_alone_yield_null() {
    assert_eq!(interpret("let a = 1\nlet b = 2\n").unwrap(), "null");
  }

  #[test]
  fn top_level_return_stops_the_program() {
    assert_eq!(interpret("return 5\n6").unwrap(), "5");
  }

  #[test]
  fn comments_and_blank_lines() {
    assert_eq!(interpret("\n// setup\nlet x = 2 // two\n\nx\n").unwrap(), "2");
  }

  #[test]
  fn print_with_and_without_title() {
    let context = evaluate_program("print 1 + 1 as \"sum\"\nprint 3").unwrap();
    assert_eq!(
      context.results,
      vec![
        ProgramResult::Print {
          title: Some("sum".to_string()),
          value: Value::Number(2.0),
        },
        ProgramResult::Print {
          title: None,
          value: Value::Number(3.0),
        },
      ]
    );
  }

  #[test]
  fn graph_request() {
    let context =
      evaluate_program("fn f(x) = x * x\nfn g(x) = x\ngraph f, g from 0 to 1 + 1")
        .unwrap();
    let ProgramResult::Graph { request: Ok(request) } = &context.results[0] else {
      panic!("expected a graph request, got {:?}", context.results);
    };
    assert_eq!(request.names(), vec!["f", "g"]);
    assert_eq!(request.domain.start(), 0.0);
    assert_eq!(request.domain.end(), 2.0);
  }

  #[test]
  fn graph_of_a_number_fails() {
    let context = evaluate_program("let a = 1\ngraph a from 0 to 1").unwrap();
    let ProgramResult::Graph { request: Err(err) } = &context.results[0] else {
      panic!("expected a failed graph request");
    };
    assert_eq!(err.message, "'a' is not a function");
  }

  #[test]
  fn plot_point_lists() {
    let context = evaluate_program("let t = 1\nplot [0, 0, t, t], [2, 3]").unwrap();
    let ProgramResult::Plot { lists: Ok(lists) } = &context.results[0] else {
      panic!("expected point lists");
    };
    assert_eq!(lists.len(), 2);
    assert_eq!(lists[0].as_slice(), &[0.0, 0.0, 1.0, 1.0]);
    assert_eq!(lists[1].len(), 1);
  }

  #[test]
  fn plot_rejects_odd_lists() {
    let context = evaluate_program("plot [1, 2, 3]").unwrap();
    let ProgramResult::Plot { lists: Err(err) } = &context.results[0] else {
      panic!("expected a failed plot");
    };
    assert!(err.message.contains("x,y pairs"), "{}", err.message);
  }

  #[test]
  fn keywords_are_not_identifiers() {
    assert!(matches!(
      evaluate_program("let let = 1"),
      Err(PlotError::ParseError(_))
    ));
    assert_eq!(interpret("let plotter = 4\nplotter").unwrap(), "4");
  }

  #[test]
  fn slider_declares_its_minimum() {
    let context = evaluate_program("slider a from 1 to 5 step 0.5\na * 2").unwrap();
    assert_eq!(context.program_result, Value::Number(2.0));
    assert_eq!(context.inputs.len(), 1);
    let input = &context.inputs[0];
    assert_eq!((input.min, input.max, input.step), (1.0, 5.0, 0.5));
    assert_eq!(input.to_string(), "a = 1 (1 to 5, step 0.5)");
  }

  #[test]
  fn slider_step_defaults_to_a_thousandth() {
    let context = evaluate_program("slider t from 0 to 1").unwrap();
    assert_eq!(context.inputs[0].step, 0.001);
  }

  #[test]
  fn carried_slider_values_are_kept_by_name() {
    let first = evaluate_program("slider a from 0 to 10 step 1\na").unwrap();
    let mut moved = first.inputs.clone();
    moved[0].set_value(7.0);

    let again =
      evaluate_program_with_inputs("slider a from 0 to 10 step 1\na", &moved).unwrap();
    assert_eq!(again.program_result, Value::Number(7.0));

    // a narrower range snaps the carried value back inside it
    let narrowed =
      evaluate_program_with_inputs("slider a from 0 to 5 step 1\na", &moved).unwrap();
    assert_eq!(narrowed.program_result, Value::Number(5.0));
  }

  #[test]
  fn invalid_slider_binds_an_error() {
    let context = evaluate_program("slider a from 3 to 1\na + 1").unwrap();
    assert!(context.inputs.is_empty());
    assert_eq!(context.errors.len(), 2);
    assert_eq!(context.errors[0].message, "slider a has an empty range: 3 to 1");
    assert_eq!(context.errors[1], context.errors[0]);
  }

  #[test]
  fn empty_input() {
    assert!(matches!(evaluate_program("  \n"), Err(PlotError::EmptyInput)));
  }
}
