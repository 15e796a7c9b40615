use std::time::Duration;

use gpui::{Application, AsyncApp, Timer};

use gpui_visualizer::{
    FigureId, GpuiHost, Image, NativePlotConfig, PlotOptions, Theme, Visualizer,
};

fn main() {
    env_logger::init();
    Application::new().run(|cx| {
        let host = GpuiHost::new();
        let mut visualizer = Visualizer::new(host.clone());

        let x: Vec<f64> = (0..200).map(|i| i as f64 * 0.05).collect();
        let y: Vec<f64> = x.iter().map(|x| (x * 1.3).sin() * (-x * 0.1).exp()).collect();
        if let Err(err) = visualizer.plot(&x, &y, "g-", &PlotOptions::new().with_title("decay")) {
            log::error!("plot failed: {err}");
        }

        let gradient: Vec<u8> = (0..64 * 64).map(|i| (i % 64 * 4) as u8).collect();
        match Image::from_gray(64, 64, gradient) {
            Ok(image) => visualizer.imshow("gradient", &image),
            Err(err) => log::error!("bad image: {err}"),
        }

        let native = visualizer.native_figure(Some(FigureId::from("live")));
        let handle = match native.add_plot(
            NativePlotConfig::new()
                .with_title("signal")
                .with_theme(Theme::Dark),
        ) {
            Ok(handle) => handle,
            Err(err) => {
                log::error!("native plot failed: {err}");
                return;
            }
        };

        host.start(cx, Duration::from_millis(16));

        cx.spawn(move |_: &mut AsyncApp| {
            async move {
                // Keeps every figure alive for as long as the stream runs.
                let _visualizer = visualizer;
                let mut phase = 0.0_f64;
                loop {
                    Timer::after(Duration::from_millis(16)).await;
                    phase += 0.05;
                    if handle.add_value(phase.sin()).is_err() {
                        break;
                    }
                }
            }
        })
        .detach();
    });
}
