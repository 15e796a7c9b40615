//! Draws a few figures into the recording host and prints what it saw.

use gpui_visualizer::{
    Aspect, FigureId, HeadlessHost, NativePlotConfig, PlotOptions, SurfaceGrid, Visualizer,
};

fn main() -> gpui_visualizer::Result<()> {
    env_logger::init();
    let host = HeadlessHost::new();
    let mut visualizer = Visualizer::new(host.clone());

    let x: Vec<f64> = (0..100).map(|i| i as f64 * 0.1).collect();
    let y: Vec<f64> = x.iter().map(|x| x.sin()).collect();
    visualizer.plot(&x, &y, "b-", &PlotOptions::new().with_title("sin"))?;
    visualizer.hist(&y, &PlotOptions::new().with_bins(20))?;

    let samples: Vec<f64> = (-10..=10).map(|i| i as f64 * 0.2).collect();
    let grid = SurfaceGrid::from_fn(samples.clone(), samples, |x, y| (x * x + y * y).sqrt().cos())?;
    visualizer.plot_surface(&grid, &PlotOptions::new().with_aspect(Aspect::Equal))?;

    let native = visualizer.native_figure(Some(FigureId::from("telemetry")));
    let handle = native.add_plot(
        NativePlotConfig::new()
            .with_title("speed")
            .with_lines(2)
            .with_colors(["r", "tab:blue"]),
    )?;
    for i in 0..500 {
        let t = i as f64 * 0.05;
        handle.add_data(&[t.sin(), (t * 0.5).cos()])?;
    }
    let (min, max) = handle.labels();
    println!("native scale: {min} .. {max}");

    for window in host.windows() {
        println!(
            "{:<32} {}x{} {:?}",
            window.title, window.width, window.height, window.frame
        );
    }
    visualizer.close_all();
    println!("live windows after close_all: {}", host.live_windows());
    Ok(())
}
