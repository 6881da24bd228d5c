//! Model output with a close button.

use dioxus::prelude::*;

/// Props for the [`ResultPanel`] component.
#[derive(Props, Clone, PartialEq)]
pub struct ResultPanelProps {
    /// Generated text.
    text: String,
    /// Called when the user dismisses the result.
    on_close: EventHandler<()>,
}

/// Shows the generated text. Closing it resets the whole session.
#[component]
pub fn ResultPanel(props: ResultPanelProps) -> Element {
    let on_close = props.on_close;
    rsx! {
        section { class: "pd-result",
            p { class: "pd-result__text", "{props.text}" }
            button {
                class: "pd-button",
                onclick: move |_| on_close.call(()),
                "Close"
            }
        }
    }
}
