use std::rc::Rc;

use pest::iterators::Pair;
use pest::pratt_parser::{Assoc, Op, PrattParser};

use crate::Rule;

/// Location of a node in the program text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
  pub start: usize,
  pub end: usize,
  /// 1-based line of `start`
  pub line: usize,
}

impl Span {
  fn of(pair: &Pair<'_, Rule>) -> Self {
    let span = pair.as_span();
    Span {
      start: span.start(),
      end: span.end(),
      line: span.start_pos().line_col().0,
    }
  }

  /// Smallest span covering both `self` and `other`.
  pub fn to(self, other: Span) -> Span {
    Span {
      start: self.start.min(other.start),
      end: self.end.max(other.end),
      line: if self.start <= other.start {
        self.line
      } else {
        other.line
      },
    }
  }

  /// The program text this span points at.
  pub fn text<'a>(&self, source: &'a str) -> &'a str {
    source.get(self.start..self.end).unwrap_or("")
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
  Plus,
  Minus,
  Times,
  Divide,
  Remainder,
  Power,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
  Number {
    value: f64,
    span: Span,
  },
  Identifier {
    name: String,
    span: Span,
  },
  Call {
    name: String,
    args: Vec<Expr>,
    span: Span,
  },
  Negate {
    operand: Box<Expr>,
    span: Span,
  },
  BinaryOp {
    op: BinaryOperator,
    left: Box<Expr>,
    right: Box<Expr>,
    span: Span,
  },
}

impl Expr {
  pub fn span(&self) -> Span {
    match self {
      Expr::Number { span, .. }
      | Expr::Identifier { span, .. }
      | Expr::Call { span, .. }
      | Expr::Negate { span, .. }
      | Expr::BinaryOp { span, .. } => *span,
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
  Let {
    name: String,
    value: Expr,
  },
  Assign {
    name: String,
    value: Expr,
  },
  FunctionDefinition {
    name: String,
    params: Vec<String>,
    body: Rc<Block>,
  },
  Return(Expr),
  Print {
    value: Expr,
    title: Option<String>,
  },
  /// `graph f, g from a to b`
  Graph {
    functions: Vec<(String, Span)>,
    start: Expr,
    end: Expr,
  },
  /// `plot [x0, y0, ...], [...]`
  Plot {
    lists: Vec<Vec<Expr>>,
  },
  /// `slider a from 0 to 10 step 0.5`
  Slider {
    name: String,
    min: Expr,
    max: Expr,
    step: Option<Expr>,
  },
  Expr(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
  pub kind: StmtKind,
  pub span: Span,
}

/// A sequence of statements: a whole program or a function body.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
  pub statements: Vec<Stmt>,
}

impl Block {
  /// Body of the `fn f(x) = expr` shorthand.
  pub fn from_expr(expr: Expr) -> Self {
    let span = expr.span();
    Block {
      statements: vec![Stmt {
        kind: StmtKind::Expr(expr),
        span,
      }],
    }
  }
}

fn expression_parser() -> PrattParser<Rule> {
  PrattParser::new()
    .op(Op::infix(Rule::Add, Assoc::Left) | Op::infix(Rule::Subtract, Assoc::Left))
    .op(
      Op::infix(Rule::Multiply, Assoc::Left)
        | Op::infix(Rule::Divide, Assoc::Left)
        | Op::infix(Rule::Remainder, Assoc::Left),
    )
    .op(Op::prefix(Rule::Neg))
    .op(Op::infix(Rule::Power, Assoc::Right))
}

fn is_keyword(rule: Rule) -> bool {
  matches!(
    rule,
    Rule::KwLet
      | Rule::KwFn
      | Rule::KwReturn
      | Rule::KwPrint
      | Rule::KwAs
      | Rule::KwGraph
      | Rule::KwFrom
      | Rule::KwTo
      | Rule::KwPlot
      | Rule::KwSlider
      | Rule::KwStep
  )
}

/// Inner pairs of a statement with the keyword tokens dropped.
fn significant<'i>(pair: Pair<'i, Rule>) -> impl Iterator<Item = Pair<'i, Rule>> {
  pair.into_inner().filter(|p| !is_keyword(p.as_rule()))
}

/// Convert a `Program` or `Block` pair into a [`Block`].
pub(crate) fn pair_to_block(pair: Pair<'_, Rule>) -> Block {
  let pratt = expression_parser();
  block_from_pairs(pair, &pratt)
}

fn block_from_pairs(pair: Pair<'_, Rule>, pratt: &PrattParser<Rule>) -> Block {
  let statements = pair
    .into_inner()
    .filter(|p| p.as_rule() != Rule::EOI)
    .map(|p| pair_to_stmt(p, pratt))
    .collect();
  Block { statements }
}

fn identifier(pair: Pair<'_, Rule>) -> String {
  pair.as_str().to_string()
}

fn pair_to_stmt(pair: Pair<'_, Rule>, pratt: &PrattParser<Rule>) -> Stmt {
  let span = Span::of(&pair);
  let rule = pair.as_rule();
  let mut inner = significant(pair);

  let kind = match rule {
    Rule::LetStatement | Rule::Assignment => {
      let name = identifier(inner.next().expect("grammar: name"));
      let value = pair_to_expr(inner.next().expect("grammar: value"), pratt);
      if rule == Rule::LetStatement {
        StmtKind::Let { name, value }
      } else {
        StmtKind::Assign { name, value }
      }
    }
    Rule::FunctionDefinition => {
      let name = identifier(inner.next().expect("grammar: function name"));
      let params = inner
        .next()
        .expect("grammar: parameter list")
        .into_inner()
        .map(identifier)
        .collect();
      let body_pair = inner.next().expect("grammar: function body");
      let body = match body_pair.as_rule() {
        Rule::Block => block_from_pairs(body_pair, pratt),
        _ => Block::from_expr(pair_to_expr(body_pair, pratt)),
      };
      StmtKind::FunctionDefinition {
        name,
        params,
        body: Rc::new(body),
      }
    }
    Rule::ReturnStatement => {
      StmtKind::Return(pair_to_expr(inner.next().expect("grammar: value"), pratt))
    }
    Rule::PrintStatement => {
      let value = pair_to_expr(inner.next().expect("grammar: value"), pratt);
      let title = inner.next().map(|title| {
        title
          .into_inner()
          .next()
          .map(|content| content.as_str().to_string())
          .unwrap_or_default()
      });
      StmtKind::Print { value, title }
    }
    Rule::GraphStatement => {
      let mut functions = Vec::new();
      let mut bounds = Vec::with_capacity(2);
      for p in inner {
        match p.as_rule() {
          Rule::Identifier => functions.push((identifier(p.clone()), Span::of(&p))),
          _ => bounds.push(pair_to_expr(p, pratt)),
        }
      }
      let mut bounds = bounds.into_iter();
      StmtKind::Graph {
        functions,
        start: bounds.next().expect("grammar: domain start"),
        end: bounds.next().expect("grammar: domain end"),
      }
    }
    Rule::PlotStatement => StmtKind::Plot {
      lists: inner
        .map(|list| list.into_inner().map(|e| pair_to_expr(e, pratt)).collect())
        .collect(),
    },
    Rule::SliderStatement => {
      let name = identifier(inner.next().expect("grammar: slider name"));
      let min = pair_to_expr(inner.next().expect("grammar: slider minimum"), pratt);
      let max = pair_to_expr(inner.next().expect("grammar: slider maximum"), pratt);
      let step = inner.next().map(|p| pair_to_expr(p, pratt));
      StmtKind::Slider {
        name,
        min,
        max,
        step,
      }
    }
    _ => StmtKind::Expr(pair_to_expr(inner.next().expect("grammar: expression"), pratt)),
  };

  Stmt { kind, span }
}

fn pair_to_expr(pair: Pair<'_, Rule>, pratt: &PrattParser<Rule>) -> Expr {
  pratt
    .map_primary(|primary| primary_to_expr(primary, pratt))
    .map_prefix(|op, operand| {
      let span = Span::of(&op).to(operand.span());
      Expr::Negate {
        operand: Box::new(operand),
        span,
      }
    })
    .map_infix(|left, op, right| {
      let op = match op.as_rule() {
        Rule::Add => BinaryOperator::Plus,
        Rule::Subtract => BinaryOperator::Minus,
        Rule::Multiply => BinaryOperator::Times,
        Rule::Divide => BinaryOperator::Divide,
        Rule::Remainder => BinaryOperator::Remainder,
        _ => BinaryOperator::Power,
      };
      let span = left.span().to(right.span());
      Expr::BinaryOp {
        op,
        left: Box::new(left),
        right: Box::new(right),
        span,
      }
    })
    .parse(pair.into_inner())
}

fn primary_to_expr(pair: Pair<'_, Rule>, pratt: &PrattParser<Rule>) -> Expr {
  let span = Span::of(&pair);
  match pair.as_rule() {
    Rule::Number => Expr::Number {
      // The grammar only admits valid float literals.
      value: pair.as_str().parse().unwrap_or(f64::NAN),
      span,
    },
    Rule::Identifier => Expr::Identifier {
      name: identifier(pair),
      span,
    },
    Rule::Call => {
      let mut inner = pair.into_inner();
      let name = identifier(inner.next().expect("grammar: callee"));
      let args = inner.map(|arg| pair_to_expr(arg, pratt)).collect();
      Expr::Call { name, args, span }
    }
    _ => pair_to_expr(pair, pratt),
  }
}
