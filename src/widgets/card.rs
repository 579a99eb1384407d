use hypertext::prelude::*;

/// A single figure on the dashboard.
pub struct StatCard<'r, V: ToString> {
    pub label: &'r str,
    pub value: V,
    pub href: &'r str,
}

impl<V: ToString> Renderable for StatCard<'_, V> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        maud! {
            div class="col-sm-6 col-lg-3 mb-3" {
                div class="card h-100 text-center" {
                    div class="card-body" {
                        p class="display-6 mb-1" { (self.value.to_string()) }
                        a href=(self.href) class="stretched-link text-decoration-none" {
                            (self.label)
                        }
                    }
                }
            }
        }
        .render_to(buffer)
    }
}
