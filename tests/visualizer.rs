use gpui_visualizer::backend::NATIVE_BACKEND;
use gpui_visualizer::host::FrameContent;
use gpui_visualizer::{
    Aspect, BackendSession, Backends, FigureId, HeadlessHost, Image, NativePlotConfig, PlotOptions,
    SurfaceGrid, Visualizer, VisualizerConfig, VisualizerError,
};
use serde_json::json;

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn visualizer() -> (HeadlessHost, Visualizer<HeadlessHost>) {
    init_logs();
    let host = HeadlessHost::new();
    (host.clone(), Visualizer::new(host))
}

#[test]
fn numeric_and_string_ids_name_the_same_figure() {
    let (host, mut visualizer) = visualizer();
    visualizer.figure(Some(FigureId::from(1_i64)));
    visualizer.figure(Some(FigureId::from("1")));
    let from_json = FigureId::try_from(&json!(1)).expect("integer id");
    visualizer.figure(Some(from_json));
    assert_eq!(visualizer.figures().len(), 1);
    assert_eq!(host.windows()[0].title, "Figure: 1");

    let float = FigureId::try_from(2.0).expect("finite id");
    assert_eq!(float.as_str(), "2.0");
    assert!(matches!(
        FigureId::try_from(f64::NAN),
        Err(VisualizerError::InvalidIdentifier(_))
    ));
    assert!(matches!(
        FigureId::try_from(&json!({"id": 1})),
        Err(VisualizerError::InvalidIdentifier(_))
    ));
}

#[test]
fn omitted_ids_always_create_new_figures() {
    let (_, mut visualizer) = visualizer();
    let first = visualizer.figure(None).id().clone();
    let second = visualizer.figure(None).id().clone();
    assert_ne!(first, second);
    assert_eq!(visualizer.figures().len(), 2);
}

#[test]
fn closing_frees_the_id() {
    let (host, mut visualizer) = visualizer();
    let id = FigureId::from("scope");
    visualizer.figure(Some(id.clone()));
    assert!(visualizer.close(&id));
    assert_eq!(host.live_windows(), 0);

    visualizer.figure(Some(id.clone()));
    assert_eq!(host.windows().len(), 2);
    assert_eq!(host.live_windows(), 1);
}

#[test]
fn imshow_widens_gray_to_rgba() {
    let (host, mut visualizer) = visualizer();
    let image = Image::from_gray(1, 2, vec![10, 200]).expect("valid shape");
    visualizer.imshow("camera", &image);
    let provider = &host.providers()[0];
    assert_eq!(provider.size, [2, 1]);
    assert_eq!(provider.bytes, vec![10, 10, 10, 255, 200, 200, 200, 255]);
    assert_eq!(host.windows()[0].frame, FrameContent::Image(0));
}

#[test]
fn plots_render_at_figure_size() {
    let (host, mut visualizer) = visualizer();
    let id = visualizer
        .plot(&[0.0, 1.0, 2.0], &[1.0, 3.0, 2.0], "r--o", &PlotOptions::new())
        .expect("valid plot");
    assert!(visualizer.figures().contains(&id));
    let provider = &host.providers()[0];
    assert_eq!(provider.size, [640, 480]);
    assert_eq!(provider.bytes.len(), 640 * 480 * 4);
}

#[test]
fn equal_aspect_3d_plot_renders() {
    let (host, mut visualizer) = visualizer();
    let options = PlotOptions::new().with_aspect(Aspect::Equal);
    visualizer
        .plot3d(&[0.0, 10.0], &[0.0, 1.0], &[0.0, 0.5], "", &options)
        .expect("valid 3D line");
    let grid = SurfaceGrid::from_fn(vec![-1.0, 0.0, 1.0], vec![-1.0, 0.0, 1.0], |x, y| x * y)
        .expect("valid grid");
    visualizer
        .plot_surface(&grid, &options)
        .expect("valid surface");
    assert_eq!(visualizer.figures3d().len(), 2);
    assert!(host.providers().iter().all(|p| p.size == [640, 480]));
}

#[test]
fn native_plots_stream_without_rebuilding() {
    let (host, mut visualizer) = visualizer();
    let figure = visualizer.native_figure(Some(FigureId::from("telemetry")));
    let handle = figure
        .add_plot(
            NativePlotConfig::new()
                .with_uid("speed")
                .with_lines(2)
                .with_window_size(Some(3)),
        )
        .expect("valid plot");
    assert_eq!(host.windows()[0].frame, FrameContent::NativePlots(1));
    assert_eq!(host.windows()[0].rebuilds, 1);

    handle.add_data(&[1.0, 4.0]).expect("one sample per line");
    assert_eq!(handle.lines(), vec![vec![0.0, 0.0, 1.0], vec![0.0, 0.0, 4.0]]);
    assert_eq!(handle.labels(), ("0.0".to_string(), "4.0".to_string()));
    assert!(matches!(
        handle.add_data(&[1.0]),
        Err(VisualizerError::InvalidSeriesLength {
            expected: 2,
            actual: 1
        })
    ));

    handle
        .set_data(&[vec![1.0, 2.0, 3.0, 4.0], vec![-0.5, 0.25]])
        .expect("two lines");
    assert_eq!(handle.lines()[0], vec![2.0, 3.0, 4.0]);
    assert_eq!(handle.labels(), ("-0.5".to_string(), "4.0".to_string()));
    assert_eq!(host.windows()[0].rebuilds, 1);
    assert!(host.native_plots(0)[0].ptr_eq(&handle));
}

#[test]
fn session_redirects_imshow_until_released() {
    init_logs();
    let host = HeadlessHost::new();
    let mut backends = Backends::new("agg");
    let config = VisualizerConfig::from_json_str(r#"{"default_backend_if_agg": "QtAgg"}"#)
        .expect("valid settings");
    {
        let mut session = BackendSession::acquire(&mut backends, &host, "ext-1", &config);
        assert_eq!(session.backends().plotting_backend(), NATIVE_BACKEND);
        let frame = Image::from_rgb(2, 2, vec![0; 12]).expect("valid shape");
        session
            .backends()
            .imshow("preview", &frame)
            .expect("shown in a window");
        assert_eq!(host.live_windows(), 1);
        session.release();
    }
    assert_eq!(host.live_windows(), 0);
    assert_eq!(backends.plotting_backend(), "QtAgg");
    assert_eq!(backends.display().name(), "headless");
}

#[test]
fn json_calls_cover_every_kind() {
    let (_, mut visualizer) = visualizer();
    visualizer
        .call("hist", &json!({"values": [1, 2, 2, 3, 3, 3], "bins": 3}))
        .expect("valid hist");
    visualizer
        .call("pie", &json!({"values": [1, 2, 3]}))
        .expect("valid pie");
    visualizer
        .call3d("plot_wireframe", &json!({
            "x": [0, 1],
            "y": [0, 1],
            "matrix": [[0, 1], [1, 2]]
        }))
        .expect("valid wireframe");
    assert_eq!(visualizer.figures().len(), 2);
    assert_eq!(visualizer.figures3d().len(), 1);
    visualizer.close_all();
    assert!(visualizer.figures().is_empty());
}

#[test]
fn native_lines_keep_their_order_and_colors() {
    let (_, mut visualizer) = visualizer();
    let figure = visualizer.native_figure(None);
    let handle = figure
        .add_plot(
            NativePlotConfig::new()
                .with_lines(3)
                .with_colors(["pink", "lime", "skyblue"]),
        )
        .expect("valid plot");
    assert_eq!(handle.colors(), vec![0xFFCBC0FF, 0xFF00FF00, 0xFFEBCE87]);

    handle.add_data(&[1.0, 2.0, 3.0]).expect("one sample per line");
    handle.add_data(&[4.0, 5.0, 6.0]).expect("one sample per line");
    let lines = handle.lines();
    let last: Vec<f64> = lines.iter().map(|line| line[line.len() - 1]).collect();
    let before: Vec<f64> = lines.iter().map(|line| line[line.len() - 2]).collect();
    assert_eq!(last, vec![4.0, 5.0, 6.0]);
    assert_eq!(before, vec![1.0, 2.0, 3.0]);
}

#[test]
fn bounded_window_evicts_the_oldest_sample() {
    let (_, mut visualizer) = visualizer();
    let figure = visualizer.native_figure(None);
    let handle = figure
        .add_plot(NativePlotConfig::new().with_window_size(Some(4)))
        .expect("valid plot");
    for value in 1..=5 {
        handle.add_value(f64::from(value)).expect("single line");
    }
    assert_eq!(handle.lines(), vec![vec![2.0, 3.0, 4.0, 5.0]]);

    handle.add_value(6.0).expect("single line");
    assert_eq!(handle.lines()[0].len(), 4);
    assert_eq!(handle.lines()[0][0], 3.0);
}

#[test]
fn rendering_twice_reuses_the_window_and_provider() {
    let (host, mut visualizer) = visualizer();
    let frame = Image::zeros(100, 100, 3).expect("valid shape");
    visualizer.figure(Some(FigureId::from("w1"))).render(&frame);
    visualizer.figure(Some(FigureId::from("w1"))).render(&frame);

    assert_eq!(visualizer.figures().len(), 1);
    assert_eq!(host.windows().len(), 1);
    let providers = host.providers();
    assert_eq!(providers.len(), 1);
    assert_eq!(providers[0].updates, 2);
    assert_eq!(providers[0].size, [100, 100]);
    assert!(providers[0]
        .bytes
        .chunks_exact(4)
        .all(|px| px == [0, 0, 0, 255]));
}

#[test]
fn scatter_accepts_per_point_sizes_and_values() {
    let (host, mut visualizer) = visualizer();
    let options = PlotOptions::new()
        .with_sizes(vec![20.0, 80.0, 320.0])
        .with_color_values(vec![0.1, 0.5, 0.9])
        .with_alpha(0.5);
    visualizer
        .scatter(&[0.0, 1.0, 2.0], &[2.0, 0.0, 1.0], &options)
        .expect("valid scatter");
    assert_eq!(host.providers()[0].size, [640, 480]);

    visualizer
        .call("scatter", &json!({"x": [0, 1], "y": [1, 0], "s": [10, 40], "c": [1, 2]}))
        .expect("valid scatter call");
    assert!(matches!(
        visualizer.scatter(&[0.0, 1.0], &[0.0, 1.0], &PlotOptions::new().with_sizes(vec![1.0])),
        Err(VisualizerError::InvalidArgument(_))
    ));
}

#[test]
fn plots_sharing_a_uid_are_both_kept() {
    let (host, mut visualizer) = visualizer();
    let figure = visualizer.native_figure(Some(FigureId::from("dup")));
    let first = figure
        .add_plot(NativePlotConfig::new().with_uid("x"))
        .expect("valid plot");
    figure
        .add_plot(NativePlotConfig::new().with_uid("x"))
        .expect("valid plot");
    assert_eq!(figure.plots().len(), 2);
    assert!(figure.plot("x").expect("plot exists").ptr_eq(&first));
    assert_eq!(host.windows()[0].frame, FrameContent::NativePlots(2));
}
