//! Counter Example - button, slider, checkbox and text field
//!
//! Four rows, each a label describing some state next to the widget that
//! changes it. Every widget writes a signal from its callback; the
//! component re-renders and the change shows up on the next frame.
//!
//! Esc or Ctrl+C quits. Set RUST_LOG (e.g. `RUST_LOG=spark_mu=debug`) to
//! write a trace to `spark-mu.log`.
//!
//! Run with: cargo run --example counter

use std::fs::File;
use std::sync::Mutex;

use spark_mu::{
    button, checkbox, fragment, input, label, render, row, slider, Element, RenderConfig,
    TerminalEngine, Value,
};
use spark_signals::{signal, Signal};
use tracing_subscriber::EnvFilter;

#[derive(Clone)]
struct State {
    count: Signal<i32>,
    slider: Signal<f64>,
    checked: Signal<bool>,
    text: Signal<String>,
}

fn field_row(description: String, widget: Element) -> Element {
    row()
        .prop("widths", vec![20, -1])
        .prop("height", 1)
        .child(label(description))
        .child(widget)
}

fn app(state: &State) -> Element {
    let count = state.count.clone();
    let slider_value = state.slider.clone();
    let checked = state.checked.clone();
    let text = state.text.clone();

    fragment([
        field_row(
            format!("Clicked ({})", state.count.get()),
            button("Click").on_click(move || { count.set(count.get() + 1); }),
        ),
        field_row(
            format!("Slider value: {:.2}", state.slider.get()),
            slider(0.0, 10.0, state.slider.get()).on_change(move |v: &Value| {
                if let Some(n) = v.as_f64() {
                    slider_value.set(n);
                }
            }),
        ),
        field_row(
            format!(
                "Checkbox is {}",
                if state.checked.get() { "checked" } else { "unchecked" }
            ),
            checkbox("Check me!", state.checked.get()).on_change(move |v: &Value| {
                if let Some(b) = v.as_bool() {
                    checked.set(b);
                }
            }),
        ),
        field_row(
            format!("Input value: {}", state.text.get()),
            input(state.text.get()).on_change(move |v: &Value| {
                if let Some(s) = v.as_str() {
                    text.set(s.to_string());
                }
            }),
        ),
    ])
}

fn init_logging() -> anyhow::Result<()> {
    if std::env::var_os("RUST_LOG").is_none() {
        return Ok(());
    }
    // The terminal belongs to the engine; logs go to a file.
    let file = File::create("spark-mu.log")?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    init_logging()?;

    let state = State {
        count: signal(0),
        slider: signal(0.0),
        checked: signal(true),
        text: signal("x".to_string()),
    };

    let config = RenderConfig::from_env();
    let engine = TerminalEngine::new(&config);
    render(engine, move || app(&state))?;
    Ok(())
}
