/// Code editor: textarea with a line-number gutter
use web_sys::{HtmlTextAreaElement, KeyboardEvent};
use yew::prelude::*;

const INDENT: &str = "  ";

#[derive(Properties, PartialEq)]
pub struct CodeEditorProps {
    pub value: String,
    #[prop_or_default]
    pub language: String,
    #[prop_or_default]
    pub read_only: bool,
    #[prop_or_default]
    pub on_change: Callback<String>,
}

#[function_component(CodeEditor)]
pub fn code_editor(props: &CodeEditorProps) -> Html {
    let gutter = html! {
        <div class="code-gutter" aria-hidden="true">
            { for (1..=line_count(&props.value)).map(|n| html! { <div>{n}</div> }) }
        </div>
    };

    if props.read_only {
        return html! {
            <div class={classes!("code-editor", "read-only", format!("language-{}", props.language))}>
                {gutter}
                <pre class="code-view"><code>{&props.value}</code></pre>
            </div>
        };
    }

    let oninput = {
        let on_change = props.on_change.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(textarea) = e.target_dyn_into::<HtmlTextAreaElement>() {
                on_change.emit(textarea.value());
            }
        })
    };

    let onkeydown = {
        let on_change = props.on_change.clone();
        Callback::from(move |e: KeyboardEvent| {
            if e.key() != "Tab" || e.shift_key() {
                return;
            }
            let Some(textarea) = e.target_dyn_into::<HtmlTextAreaElement>() else {
                return;
            };
            e.prevent_default();

            let value = textarea.value();
            let start = textarea.selection_start().ok().flatten().unwrap_or(0);
            let end = textarea.selection_end().ok().flatten().unwrap_or(start);
            let (updated, cursor) = insert_indent(&value, start, end);

            textarea.set_value(&updated);
            if let Err(e) = textarea
                .set_selection_start(Some(cursor))
                .and_then(|_| textarea.set_selection_end(Some(cursor)))
            {
                log::warn!("Failed to move cursor: {:?}", e);
            }
            on_change.emit(updated);
        })
    };

    html! {
        <div class={classes!("code-editor", format!("language-{}", props.language))}>
            {gutter}
            <textarea
                class="code-input"
                spellcheck="false"
                placeholder="Paste or type your code..."
                value={props.value.clone()}
                {oninput}
                {onkeydown}
            />
        </div>
    }
}

pub fn line_count(text: &str) -> usize {
    text.split('\n').count()
}

/// Replace the selection with one indent, returning the new text and cursor
///
/// Positions are UTF-16 offsets, as the DOM reports them.
pub fn insert_indent(text: &str, start: u32, end: u32) -> (String, u32) {
    let (start, end) = if start <= end { (start, end) } else { (end, start) };
    let from = utf16_to_byte(text, start);
    let to = utf16_to_byte(text, end);

    let mut updated = String::with_capacity(text.len() + INDENT.len());
    updated.push_str(&text[..from]);
    updated.push_str(INDENT);
    updated.push_str(&text[to..]);

    let cursor = text[..from].encode_utf16().count() + INDENT.len();
    (updated, cursor as u32)
}

fn utf16_to_byte(text: &str, offset: u32) -> usize {
    let mut units = 0u32;
    for (index, ch) in text.char_indices() {
        if units >= offset {
            return index;
        }
        units += ch.len_utf16() as u32;
    }
    text.len()
}
