use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use calcplot::output::{
  OutputItem, ProgramSession, SvgOutput, collect_svg_outputs,
};
use calcplot::plot::chart::{ChartSource, ChartView};
use calcplot::plot::export::display_list_to_svg;
use calcplot::theme::Theme;
use calcplot::utils::create_svg_file;
use calcplot::{PlotError, evaluate_program};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Evaluate a program and print its text outputs
  Eval {
    /// The program source
    source: String,
    /// Set a slider before printing, e.g. `a=2.5` (repeatable)
    #[arg(long = "input", value_parser = parse_input)]
    inputs: Vec<(String, f64)>,
  },
  /// Evaluate a program file and export every chart as SVG
  Render {
    file: PathBuf,
    /// Directory for the SVG files (random names in the temp dir otherwise)
    #[arg(long)]
    out_dir: Option<PathBuf>,
    #[arg(long, default_value_t = 640.0)]
    width: f64,
    #[arg(long, default_value_t = 400.0)]
    height: f64,
    /// JSON theme file
    #[arg(long)]
    theme: Option<PathBuf>,
    /// Pan every chart by a pixel delta before exporting, e.g. `-40,0`
    #[arg(long, value_parser = parse_pair, allow_hyphen_values = true)]
    drag: Option<(f64, f64)>,
    /// Set a slider before exporting, e.g. `a=2.5` (repeatable)
    #[arg(long = "input", value_parser = parse_input)]
    inputs: Vec<(String, f64)>,
  },
  /// Render `graph` statements with the fixed-size SVG graph renderer
  GraphSvg {
    file: PathBuf,
    /// Output file (stdout otherwise)
    #[arg(long)]
    out: Option<PathBuf>,
    /// Show the crosshair readout for a mouse position, e.g. `500,250`
    #[arg(long, value_parser = parse_pair)]
    cursor: Option<(f64, f64)>,
  },
}

fn parse_pair(s: &str) -> Result<(f64, f64), String> {
  let (a, b) = s
    .split_once(',')
    .ok_or_else(|| format!("expected two comma separated numbers, got '{s}'"))?;
  let number = |v: &str| {
    v.trim()
      .parse::<f64>()
      .map_err(|e| format!("invalid number '{v}': {e}"))
  };
  Ok((number(a)?, number(b)?))
}

fn parse_input(s: &str) -> Result<(String, f64), String> {
  let (name, value) = s
    .split_once('=')
    .ok_or_else(|| format!("expected NAME=VALUE, got '{s}'"))?;
  let value = value
    .trim()
    .parse::<f64>()
    .map_err(|e| format!("invalid number '{value}': {e}"))?;
  Ok((name.trim().to_string(), value))
}

/// Run `source` and move the given sliders, re-running after each.
fn session(
  source: &str,
  theme: Theme,
  inputs: &[(String, f64)],
) -> Result<ProgramSession> {
  let mut session = ProgramSession::new(source, theme)?;
  for (name, value) in inputs {
    let settled = session.set_input(name, *value)?;
    if settled != *value {
      info!(input = %name, requested = value, settled, "input snapped");
    }
  }
  Ok(session)
}

fn read_program(file: &Path) -> Result<String> {
  std::fs::read_to_string(file)
    .with_context(|| format!("reading {}", file.display()))
}

fn export_chart<C: ChartSource>(
  view: &mut ChartView<C>,
  index: usize,
  out_dir: Option<&Path>,
  (width, height): (f64, f64),
  drag: Option<(f64, f64)>,
) -> Result<Option<PathBuf>, PlotError> {
  view.resize(width, height);
  if let Some((dx, dy)) = drag {
    view.drag_start();
    view.drag(dx, dy);
    view.drag_end();
  }
  if let Some(err) = view.failure() {
    println!("{}: Error: {err}", view.title());
    return Ok(None);
  }

  let svg = display_list_to_svg(view.surface())?;
  let path = create_svg_file(out_dir, &format!("chart-{index}"))?;
  std::fs::write(&path, svg)?;
  println!("{} {}", view.title(), path.display());
  Ok(Some(path))
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("calcplot=info")),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();

  match cli.command {
    Commands::Eval { source, inputs } => {
      let session = session(&source, Theme::default(), &inputs)?;
      for item in session.into_outputs() {
        match item {
          OutputItem::Text(text) => println!("{text}"),
          OutputItem::Input(input) => println!("{input}"),
          chart => println!("{}", chart.title()),
        }
      }
    }
    Commands::Render {
      file,
      out_dir,
      width,
      height,
      theme,
      drag,
      inputs,
    } => {
      let source = read_program(&file)?;
      let theme = match theme {
        Some(path) => Theme::load(&path)
          .with_context(|| format!("loading theme {}", path.display()))?,
        None => Theme::default(),
      };
      if let Some(dir) = &out_dir {
        std::fs::create_dir_all(dir)
          .with_context(|| format!("creating {}", dir.display()))?;
      }

      let session = session(&source, theme, &inputs)?;
      let mut written = 0;
      for (index, item) in session.into_outputs().into_iter().enumerate() {
        let size = (width, height);
        let path = match item {
          OutputItem::Text(text) => {
            println!("{text}");
            None
          }
          OutputItem::Input(input) => {
            println!("{input}");
            None
          }
          OutputItem::Plot(mut view) => {
            export_chart(&mut view, index, out_dir.as_deref(), size, drag)?
          }
          OutputItem::Graph(mut view) => {
            export_chart(&mut view, index, out_dir.as_deref(), size, drag)?
          }
        };
        written += usize::from(path.is_some());
      }
      info!(charts = written, "render finished");
    }
    Commands::GraphSvg { file, out, cursor } => {
      let source = read_program(&file)?;
      let context = evaluate_program(&source)?;

      let mut documents = Vec::new();
      for output in collect_svg_outputs(&context) {
        match output {
          SvgOutput::Text(text) => println!("{text}"),
          SvgOutput::Graph(graph) => {
            println!("{}", graph.title());
            println!("{}", graph.bounds_summary());
            let crosshair = cursor.and_then(|(x, y)| graph.crosshair(x, y));
            documents.push(match &crosshair {
              Some(crosshair) => graph.to_svg_with_crosshair(crosshair),
              None => graph.to_svg(),
            });
          }
        }
      }

      match out {
        Some(path) => std::fs::write(&path, documents.concat())
          .with_context(|| format!("writing {}", path.display()))?,
        None => print!("{}", documents.concat()),
      }
    }
  }

  Ok(())
}
