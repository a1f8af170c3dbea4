use crate::reflect::{EntityId, Reflect};
use crate::renderer::components::*;
use crate::renderer::traits::*;
use crate::walker::Walker;

/// Turns render events into box-drawing tree lines.
pub struct TreeRenderer;

impl TreeRenderer {
    /// One line per event, prefixed according to its ancestry.
    pub fn format(&self, events: &[RenderEvent]) -> Vec<String> {
        let mut stack = PrefixStack::new();
        events
            .iter()
            .map(|event| {
                let mut line = stack.line(event.depth, event.is_last);
                line.push_str(&event.text);
                line
            })
            .collect()
    }

    /// The root label on its own line, then the formatted events. Every line
    /// ends with a newline.
    pub fn render(&self, root_label: &str, events: &[RenderEvent]) -> String {
        let mut output = String::new();
        output.push_str(root_label);
        output.push('\n');
        for line in self.format(events) {
            output.push_str(&line);
            output.push('\n');
        }
        output
    }
}

/// Walks the graph below `root` and renders it under `root_label`.
pub fn render_tree<R: Reflect + ?Sized>(
    adapter: &R,
    root: EntityId,
    root_label: &str,
    options: &TreeOptions,
) -> String {
    let events = Walker::new(adapter, options).walk(root);
    TreeRenderer.render(root_label, &events)
}
