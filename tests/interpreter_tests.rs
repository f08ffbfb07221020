use calcplot::{
  PlotError, evaluate_program, evaluate_program_with_inputs, interpret,
};

mod interpreter_tests {
  use super::*;

  mod arithmetic;
  mod errors;
  mod functions;
  mod statements;
}
