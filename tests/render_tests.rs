use calcplot::evaluate_program;
use calcplot::evaluator::{GraphRequest, ProgramResult};
use calcplot::plot::chart::{ChartSource, ChartView, GraphChart, PlotChart};
use calcplot::plot::geometry::{Bounds, PointSequence, RenderState};
use calcplot::plot::renderer::{PathRenderer, RenderOptions};
use calcplot::plot::surface::{Color, DrawCommand};
use calcplot::theme::Theme;

const RED: Color = Color::rgb(255, 0, 0);
const CYAN: Color = Color::rgb(0, 255, 255);

fn seq(values: &[f64]) -> PointSequence {
  PointSequence::new(values.to_vec()).unwrap()
}

fn approx(a: f64, b: f64, tolerance: f64) -> bool {
  (a - b).abs() <= tolerance
}

fn graph_request(source: &str) -> GraphRequest {
  let context = evaluate_program(source).unwrap();
  context
    .results
    .into_iter()
    .find_map(|result| match result {
      ProgramResult::Graph { request } => Some(request.unwrap()),
      _ => None,
    })
    .expect("program has a graph statement")
}

mod render_tests {
  use super::*;

  mod renderer {
    use super::*;

    fn render(
      sequences: &[PointSequence],
      size: (f64, f64),
      maintain_aspect_ratio: bool,
    ) -> PathRenderer {
      let mut renderer = PathRenderer::with_display_list(Theme::default());
      renderer.resize(size.0, size.1);
      renderer.render_paths(
        sequences,
        RenderOptions {
          maintain_aspect_ratio,
        },
      );
      renderer
    }

    #[test]
    fn corners_map_to_surface_corners() {
      let renderer = render(
        &[seq(&[0.0, 0.0, 10.0, 10.0]), seq(&[0.0, 0.0, 10.0, 0.0])],
        (100.0, 50.0),
        false,
      );
      let state = renderer.state();
      assert!(approx(state.screen_x(10.0), 100.0, 1.5));
      assert!(approx(state.screen_y(10.0), 0.0, 1.5));
      assert!(approx(state.screen_x(0.0), 0.0, 1.5));
      assert!(approx(state.screen_y(0.0), 50.0, 1.5));

      let diagonal: Vec<_> = renderer.surface().paths_with_color(RED).collect();
      assert_eq!(diagonal.len(), 1);
      let (x, y) = diagonal[0][1];
      assert!(approx(x, 100.0, 1.5) && approx(y, 0.0, 1.5), "{x}, {y}");
    }

    #[test]
    fn sequences_get_evenly_spread_hues() {
      let renderer = render(
        &[seq(&[0.0, 0.0, 1.0, 1.0]), seq(&[0.0, 1.0, 1.0, 0.0])],
        (100.0, 100.0),
        false,
      );
      assert_eq!(renderer.surface().paths_with_color(RED).count(), 1);
      assert_eq!(renderer.surface().paths_with_color(CYAN).count(), 1);
    }

    #[test]
    fn background_is_drawn_first() {
      let theme = Theme::default();
      let renderer = render(&[seq(&[0.0, 0.0, 1.0, 1.0])], (40.0, 30.0), false);
      assert_eq!(
        renderer.surface().commands().first(),
        Some(&DrawCommand::FillRect {
          x: 0.0,
          y: 0.0,
          width: 40.0,
          height: 30.0,
          color: theme.background,
        })
      );
    }

    #[test]
    fn grid_lines_and_labels_cover_the_data() {
      let renderer = render(&[seq(&[0.0, 0.0, 10.0, 10.0])], (100.0, 50.0), false);
      let labels: Vec<&str> = renderer.surface().texts().collect();
      for expected in ["0.0", "5.0", "10.0"] {
        assert!(labels.contains(&expected), "missing {expected} in {labels:?}");
      }
      let gridlines = renderer
        .surface()
        .paths_with_color(Theme::default().gridline)
        .count();
      // eleven vertical and eleven horizontal lines at spacing 1
      assert_eq!(gridlines, 22);
    }

    #[test]
    fn empty_input_draws_a_grid_without_paths() {
      let renderer = render(&[], (100.0, 50.0), true);
      assert_eq!(renderer.state().bounds.min_x, 0.0);
      assert_eq!(renderer.surface().paths_with_color(RED).count(), 0);
      let gridline = Theme::default().gridline;
      assert!(renderer.surface().paths_with_color(gridline).count() > 0);
    }

    #[test]
    fn zero_sized_surface_draws_nothing() {
      let renderer = render(&[seq(&[0.0, 0.0, 1.0, 1.0])], (0.0, 0.0), true);
      assert!(renderer.surface().commands().is_empty());
    }

    #[test]
    fn aspect_correction_matches_the_surface() {
      let renderer = render(&[seq(&[0.0, 0.0, 10.0, 1.0])], (200.0, 100.0), true);
      let state = renderer.state();
      assert!(approx(state.x_span() / state.y_span(), 2.0, 1e-9));
      assert!(approx(state.x_span(), 10.2, 1e-9));
    }

    #[test]
    fn without_aspect_correction_bounds_only_get_padding() {
      let renderer = render(&[seq(&[0.0, 0.0, 10.0, 1.0])], (200.0, 100.0), false);
      let bounds = renderer.state().bounds;
      assert!(approx(bounds.min_y, -0.01, 1e-12));
      assert!(approx(bounds.max_y, 1.01, 1e-12));
    }

    #[test]
    fn non_finite_points_split_the_path() {
      let renderer = render(
        &[seq(&[0.0, 0.0, 1.0, 1.0, 2.0, f64::NAN, 3.0, 3.0, 4.0, 4.0])],
        (100.0, 100.0),
        false,
      );
      assert_eq!(renderer.surface().paths_with_color(RED).count(), 2);
      assert!(approx(renderer.state().bounds.max_y, 4.04, 1e-12));
    }

    #[test]
    fn rendering_again_replaces_the_frame() {
      let mut renderer = render(&[seq(&[0.0, 0.0, 1.0, 1.0])], (50.0, 50.0), false);
      let first = renderer.surface().commands().len();
      renderer.render_paths(&[seq(&[0.0, 0.0, 1.0, 1.0])], RenderOptions::default());
      assert_eq!(renderer.surface().commands().len(), first);
    }
  }

  mod plot_chart {
    use super::*;

    fn mounted(lists: Vec<PointSequence>) -> ChartView<PlotChart> {
      let mut view = ChartView::new(PlotChart::new(1, lists), Theme::default());
      view.resize(100.0, 50.0);
      view
    }

    #[test]
    fn title_and_options() {
      let view = mounted(vec![seq(&[0.0, 0.0, 1.0, 1.0])]);
      assert_eq!(view.title(), "Plot output 1:");
      assert!(view.source().render_options().maintain_aspect_ratio);
    }

    #[test]
    fn half_width_drag_moves_half_the_domain() {
      let mut plot = PlotChart::new(0, Vec::new());
      let mut state = RenderState::new(200.0, 100.0);
      state.bounds = Bounds {
        min_x: 0.0,
        max_x: 100.0,
        min_y: 0.0,
        max_y: 10.0,
      };
      let origin = plot.pan_origin(&state);
      plot.drag_to(&mut state, origin, 100.0, 0.0);
      assert_eq!(state.domain_offset_x, -50.0);
      assert_eq!(state.domain_offset_y, 0.0);
    }

    #[test]
    fn drag_pans_both_axes() {
      let mut view = mounted(vec![seq(&[0.0, 0.0, 10.0, 10.0])]);
      let (x_span, y_span) = (view.state().x_span(), view.state().y_span());
      view.drag_start();
      view.drag(50.0, 25.0);
      assert!(approx(view.state().domain_offset_x, -x_span / 2.0, 1e-9));
      assert!(approx(view.state().domain_offset_y, -y_span / 2.0, 1e-9));
    }

    #[test]
    fn drag_moves_the_content_with_the_pointer() {
      let mut view = mounted(vec![seq(&[0.0, 0.0, 10.0, 10.0])]);
      let before = view.state().screen_x(5.0);
      view.drag_start();
      view.drag(20.0, 0.0);
      assert!(approx(view.state().screen_x(5.0), before + 20.0, 1e-9));
    }

    #[test]
    fn drag_moves_are_absolute_from_the_start() {
      let mut once = mounted(vec![seq(&[0.0, 0.0, 10.0, 10.0])]);
      once.drag_start();
      once.drag(20.0, -5.0);

      let mut stepped = mounted(vec![seq(&[0.0, 0.0, 10.0, 10.0])]);
      stepped.drag_start();
      stepped.drag(5.0, 1.0);
      stepped.drag(12.0, -3.0);
      stepped.drag(20.0, -5.0);

      assert_eq!(once.state(), stepped.state());
    }

    #[test]
    fn consecutive_drags_accumulate() {
      let mut view = mounted(vec![seq(&[0.0, 0.0, 10.0, 10.0])]);
      let x_span = view.state().x_span();
      for _ in 0..2 {
        view.drag_start();
        view.drag(10.0, 0.0);
        view.drag_end();
      }
      assert!(approx(view.state().domain_offset_x, -0.2 * x_span, 1e-9));
    }

    #[test]
    fn set_title_overrides_the_default() {
      let mut view = mounted(Vec::new());
      view.set_title("custom");
      assert_eq!(view.title(), "custom");
    }
  }

  mod graph_chart {
    use super::*;

    #[test]
    fn samples_one_point_per_pixel_column() {
      let request = graph_request("fn f(x) = x * x\ngraph f from -1 to 1");
      let mut view = ChartView::new(GraphChart::new(request), Theme::default());
      view.resize(200.0, 100.0);

      assert_eq!(view.title(), "graph of f");
      assert!(view.failure().is_none());
      let paths: Vec<_> = view.surface().paths_with_color(RED).collect();
      assert_eq!(paths.len(), 1);
      assert_eq!(paths[0].len(), 201);
      assert!(!view.source().render_options().maintain_aspect_ratio);
    }

    #[test]
    fn half_width_drag_shifts_the_domain_by_half_its_span() {
      let request = graph_request("fn f(x) = x\ngraph f from 0 to 100");
      let mut view = ChartView::new(GraphChart::new(request), Theme::default());
      view.resize(200.0, 100.0);
      view.drag_start();
      view.drag(100.0, 40.0);

      assert_eq!(view.source().domain_offset(), -50.0);
      assert_eq!(view.state().domain_offset_x, 0.0);
      assert_eq!(view.state().domain_offset_y, 0.0);
      assert!(approx(view.state().bounds.min_x, -50.0 - 1.0, 1e-9));
    }

    #[test]
    fn multiple_functions_share_the_surface() {
      let request =
        graph_request("fn f(x) = x\nfn g(x) = 0 - x\ngraph f, g from 0 to 1");
      let mut view = ChartView::new(GraphChart::new(request), Theme::default());
      view.resize(50.0, 50.0);
      assert_eq!(view.title(), "graph of f, g");
      assert_eq!(view.source().request().names(), vec!["f", "g"]);
      assert_eq!(view.surface().paths_with_color(RED).count(), 1);
      assert_eq!(view.surface().paths_with_color(CYAN).count(), 1);
    }

    #[test]
    fn sampling_errors_replace_the_chart() {
      let request = graph_request("fn f(x) = 1 / (x - 1)\ngraph f from 0 to 2");
      let mut view = ChartView::new(GraphChart::new(request), Theme::default());
      view.resize(100.0, 50.0);

      let failure = view.failure().expect("sampling should fail at x = 1");
      assert_eq!(failure.message, "division by zero");
      assert!(view.surface().commands().is_empty());
    }

    #[test]
    fn panning_past_a_failure_recovers() {
      let request = graph_request("fn f(x) = 1 / (x - 1)\ngraph f from 2 to 4");
      let mut view = ChartView::new(GraphChart::new(request), Theme::default());
      view.resize(100.0, 50.0);
      assert!(view.failure().is_none());

      view.drag_start();
      view.drag(100.0, 0.0);
      assert!(view.failure().is_some());

      view.drag(0.0, 0.0);
      view.force_rerender();
      assert!(view.failure().is_none());
      assert_eq!(view.surface().paths_with_color(RED).count(), 1);
    }
  }
}
