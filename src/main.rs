use dioxus::prelude::*;
use rmp_counter::{tags, Action, RmpModel, ViewModel};
use std::{rc::Rc, sync::Mutex};

const MAIN_CSS: Asset = asset!("/assets/main.css");

fn main() {
    dioxus::launch(App);
}

/// ViewModel shared between components. Equal when it is the same instance.
#[derive(Clone)]
struct SharedViewModel(Rc<ViewModel>);

impl PartialEq for SharedViewModel {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

fn start_view_model() -> anyhow::Result<ViewModel> {
    let data_dir = rmp_counter::default_data_dir()?;
    let view_model = ViewModel::<RmpModel>::new(data_dir.to_string_lossy())?;
    Ok(view_model)
}

#[component]
fn App() -> Element {
    // one view model per session, created before the counter first renders
    let session = use_hook(|| {
        start_view_model()
            .map(|view_model| SharedViewModel(Rc::new(view_model)))
            .map_err(|e| {
                log::error!("app: failed to start: {e:#}");
                format!("{e:#}")
            })
    });

    let content = match session {
        Ok(view_model) => rsx! { Counter { view_model } },
        Err(error) => rsx! {
            p { class: "error", "Failed to start: {error}" }
        },
    };

    rsx! {
        document::Link { rel: "stylesheet", href: MAIN_CSS }
        {content}
    }
}

#[component]
fn Counter(view_model: SharedViewModel) -> Element {
    let count = use_signal_sync(|| view_model.0.count().read());

    // updates arrive on the model's delivery thread
    use_hook(|| {
        let signal = Mutex::new(count);
        Rc::new(view_model.0.count().subscribe(move |value| {
            signal.lock().unwrap().set(*value);
        }))
    });

    let decrement = view_model.clone();
    let increment = view_model.clone();

    rsx! {
        div { class: "counter",
            button {
                id: tags::DECREMENT_BUTTON,
                class: "decrement",
                onclick: move |_| decrement.0.action(Action::Decrement),
                "-"
            }
            span { id: tags::COUNTER_VALUE, class: "value", "{count}" }
            button {
                id: tags::INCREMENT_BUTTON,
                class: "increment",
                onclick: move |_| increment.0.action(Action::Increment),
                "+"
            }
        }
    }
}
