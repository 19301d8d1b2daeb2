use crate::geometry::Rect;

/// Bottoms closer than this are treated as the same text line.
const SAME_LINE_EPSILON: f64 = 0.5;

#[derive(Debug, Clone, PartialEq)]
pub struct TextFragment {
    pub text: String,
    pub rect: Rect,
}

impl TextFragment {
    #[must_use]
    pub fn new(text: impl Into<String>, rect: Rect) -> Self {
        Self {
            text: text.into(),
            rect,
        }
    }
}

/// Renders fragments into plain text in the order they are pushed.
#[derive(Debug, Clone, Default)]
pub struct TextAccumulator {
    text: String,
    last_bottom: Option<f64>,
}

impl TextAccumulator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, fragment: &TextFragment) {
        if fragment.text.is_empty() {
            return;
        }

        let bottom = fragment.rect.min.y;
        if let Some(previous) = self.last_bottom {
            if (previous - bottom).abs() <= SAME_LINE_EPSILON {
                self.text.push(' ');
            } else {
                self.text.push('\n');
            }
        }
        self.text.push_str(&fragment.text);
        self.last_bottom = Some(bottom);
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.text
    }
}

#[must_use]
pub fn render_plain_text(fragments: &[TextFragment]) -> String {
    let mut accumulator = TextAccumulator::new();
    for fragment in fragments {
        accumulator.push(fragment);
    }
    accumulator.into_string()
}
