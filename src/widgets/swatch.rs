use hypertext::prelude::*;

/// The colours a team plays in.
pub struct ColorSwatch<'r> {
    pub primary: &'r str,
    pub secondary: Option<&'r str>,
}

impl Renderable for ColorSwatch<'_> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        maud! {
            span class="d-inline-flex gap-1 align-middle" {
                span class="d-inline-block border rounded"
                     style=(format!("width: 1rem; height: 1rem; background-color: {};", self.primary))
                     title=(self.primary) {}
                @if let Some(secondary) = self.secondary {
                    span class="d-inline-block border rounded"
                         style=(format!("width: 1rem; height: 1rem; background-color: {};", secondary))
                         title=(secondary) {}
                }
            }
        }
        .render_to(buffer)
    }
}
