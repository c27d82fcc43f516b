//! Shallow render a counter, click it, and print the snapshots

use render_tree::{Callback, Component, ComponentClass, ComponentView, Element, Props, Value};
use shallow::{ProviderValues, ShallowRenderEngine};

struct Counter;

impl Component for Counter {
    fn initial_state(&self) -> Option<Props> {
        Some(Props::new().with("count", 0))
    }

    fn render(&self, view: &ComponentView<'_>) -> Value {
        let count = view
            .state
            .and_then(|state| state.get("count"))
            .and_then(Value::as_number)
            .unwrap_or(0.0);

        let updater = view.updater.clone();
        let on_click = Callback::new(move |_| {
            updater.set_state(Props::new().with("count", count + 1.0));
            Value::Null
        });

        let title = view.props.get("label").and_then(Value::as_str).unwrap_or("Count");
        let label = format!("{}: {}", title, count);
        Value::from(Element::new(
            "button",
            Props::new().with("onClick", on_click).with("children", label),
        ))
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let class = ComponentClass::new("Counter", |_| Box::new(Counter));
    let element = Element::new(class, Props::new().with("label", "Clicks"));

    let mut engine = ShallowRenderEngine::new();
    engine.render(&element, &Props::new(), &mut ProviderValues::default())?;

    let root = engine.get_node()?.ok_or("nothing rendered")?;
    println!("Before: {}", root.to_json()?);

    // Click the button twice
    for _ in 0..2 {
        let button = engine
            .get_node()?
            .and_then(|root| root.rendered.as_node().cloned())
            .ok_or("no button")?;
        engine.simulate_event(&button, "click", &[])?;
    }

    let root = engine.get_node()?.ok_or("nothing rendered")?;
    println!("After: {}", root.to_json()?);

    Ok(())
}
