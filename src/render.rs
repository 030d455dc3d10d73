use std::sync::OnceLock;

use streamdeck_lib::Context;
use streamdeck_render::{Canvas, FontHandle, FontRegistry, TextOptions, WrapOptions, wrap_text};
use tracing::warn;

use crate::counter::{Frame, FrameSink};

// Font is embedded at compile time.
static FONT: OnceLock<FontHandle> = OnceLock::new();

/// Shown when a key's settings cannot produce a valid counter.
pub const FALLBACK_TEXT: &str = "0";

fn font() -> &'static FontHandle {
    FONT.get_or_init(|| {
        let mut reg = FontRegistry::new();
        reg.load_bytes(
            "mono",
            include_bytes!("../icu.veelume.stattile.sdPlugin/fonts/DejaVuSansMono.ttf"),
        )
        .expect("embedded font must load")
    })
}

/// Paints counter frames onto one Stream Deck key.
pub struct KeySink {
    cx: Context,
    ctx_id: String,
}

impl KeySink {
    pub fn new(cx: &Context, ctx_id: &str) -> Self {
        Self { cx: cx.clone(), ctx_id: ctx_id.to_string() }
    }
}

impl FrameSink for KeySink {
    fn show(&mut self, frame: &Frame) {
        render_text(&self.cx, &self.ctx_id, &frame.text);
    }
}

/// Font sizes tried in order; stat strings are at most ~8 glyphs.
const FONT_SIZES: [f32; 5] = [60.0, 48.0, 40.0, 32.0, 24.0];
/// Usable width inside the 144px key.
const MAX_WIDTH: f32 = 132.0;

/// Largest size from [`FONT_SIZES`] at which `text` fits on one line.
/// Falls back to the smallest size.
fn fit_size(font: &FontHandle, text: &str) -> f32 {
    let opts = WrapOptions { max_width: MAX_WIDTH, max_lines: 1 };
    FONT_SIZES
        .into_iter()
        .find(|&size| {
            let lines = wrap_text(font, size, text, &opts);
            lines.len() == 1 && lines[0].width_px <= MAX_WIDTH
        })
        .unwrap_or(FONT_SIZES[FONT_SIZES.len() - 1])
}

/// Paint a stat string centered on a key (144×144 PNG).
pub fn render_text(cx: &Context, ctx_id: &str, text: &str) {
    let font = font();
    let size = fit_size(font, text);
    let lines = wrap_text(font, size, text, &WrapOptions { max_width: MAX_WIDTH, max_lines: 1 });

    let mut canvas = Canvas::key_icon();
    if !lines.is_empty() {
        canvas.draw_text(&lines, &TextOptions::new(font.clone(), size)).ok();
    }
    match canvas.finish().to_data_url() {
        Ok(data_url) => cx.sd().set_image(ctx_id, Some(data_url), None, None),
        Err(_) => warn!(context = ctx_id, text, "cannot encode key image"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_values_use_the_largest_size() {
        assert_eq!(fit_size(font(), "0"), FONT_SIZES[0]);
    }

    #[test]
    fn longer_values_never_get_a_bigger_font() {
        let short = fit_size(font(), "87%");
        let long = fit_size(font(), "$12345.6M");
        assert!(long <= short);
        assert!(FONT_SIZES.contains(&long));
    }
}
