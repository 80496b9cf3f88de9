use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;
use std::time::Duration;

use anyhow::{Context, Result};
use cadence_engine::frame::FrameLoop;
use cadence_engine::logging::{init_logging, LoggingConfig};
use cadence_engine::time::SystemClock;

const BAR_WIDTH: usize = 24;

/// Progress of each concurrently running bar, indexed by slot.
type Bars = Rc<RefCell<Vec<(String, f64)>>>;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    #[cfg(feature = "window")]
    if std::env::args().any(|a| a == "--window") {
        return window_demo();
    }

    terminal_demo()
}

/// Two bars with different durations sharing one frame loop.
fn terminal_demo() -> Result<()> {
    let frames = FrameLoop::new(SystemClock);
    let scheduler = frames.scheduler();

    let bars: Bars = Rc::new(RefCell::new(vec![
        ("fade ".to_string(), 0.0),
        ("slide".to_string(), 0.0),
    ]));

    let draw = |bars: Bars| {
        move |progress: f64, slot: &usize| {
            bars.borrow_mut()[*slot].1 = progress;
            render(&bars.borrow());
        }
    };

    let fade = scheduler.run(draw(Rc::clone(&bars)), Duration::from_millis(800), 0usize);
    let slide = scheduler.run(draw(Rc::clone(&bars)), Duration::from_millis(2000), 1usize);

    let (fade, slide) = frames
        .block_on(futures::future::join(fade, slide))
        .context("frame loop stopped early")?;
    fade.context("fade animation failed")?;
    slide.context("slide animation failed")?;

    // The terminal frame does not report 1.0; show the finished state.
    for bar in bars.borrow_mut().iter_mut() {
        bar.1 = 1.0;
    }
    render(&bars.borrow());
    println!();

    log::info!("all animations complete");
    Ok(())
}

fn render(bars: &[(String, f64)]) {
    let mut line = String::from("\r");
    for (label, progress) in bars {
        let filled = (progress * BAR_WIDTH as f64).round() as usize;
        line.push_str(&format!(
            "  {label} [{}{}] {:>3.0}%",
            "#".repeat(filled),
            ".".repeat(BAR_WIDTH - filled.min(BAR_WIDTH)),
            progress * 100.0
        ));
    }

    let mut out = std::io::stdout().lock();
    let _ = out.write_all(line.as_bytes());
    let _ = out.flush();
}

/// Animates the window title from 0% to 100%.
#[cfg(feature = "window")]
fn window_demo() -> Result<()> {
    use cadence_engine::window::{WindowConfig, WindowRuntime};

    let config = WindowConfig {
        title: "cadence window demo".to_string(),
        ..WindowConfig::default()
    };

    let result = WindowRuntime::run(config, |scheduler, window| {
        scheduler.run(
            move |progress, prefix: &&str| {
                window.set_title(&format!("{prefix} {:>3.0}%", progress * 100.0));
            },
            Duration::from_secs(3),
            "cadence",
        )
    })?;

    result.context("window animation did not finish")?;
    log::info!("window animation complete");
    Ok(())
}
