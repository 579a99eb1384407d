//! Form controls which know how to display the field-level error attached to
//! them.

use hypertext::prelude::*;

use crate::validation::FormErrors;

pub struct TextInput<'r> {
    pub label: &'r str,
    pub name: &'r str,
    pub value: &'r str,
    pub errors: &'r FormErrors,
    /// The `type` attribute (`text`, `date`, `number`, ...).
    pub kind: &'r str,
    pub help: Option<&'r str>,
}

impl<'r> TextInput<'r> {
    pub fn new(
        label: &'r str,
        name: &'r str,
        value: &'r str,
        errors: &'r FormErrors,
    ) -> Self {
        Self {
            label,
            name,
            value,
            errors,
            kind: "text",
            help: None,
        }
    }

    pub fn kind(mut self, kind: &'r str) -> Self {
        self.kind = kind;
        self
    }

    pub fn help(mut self, help: &'r str) -> Self {
        self.help = Some(help);
        self
    }
}

impl Renderable for TextInput<'_> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        let error = self.errors.get(self.name);
        let class = if error.is_some() {
            "form-control is-invalid"
        } else {
            "form-control"
        };

        maud! {
            div class="mb-3" {
                label for=(self.name) class="form-label" { (self.label) }
                input type=(self.kind)
                      class=(class)
                      id=(self.name)
                      name=(self.name)
                      value=(self.value);
                @if let Some(error) = error {
                    div class="invalid-feedback" { (error) }
                }
                @if let Some(help) = self.help {
                    div class="form-text" { (help) }
                }
            }
        }
        .render_to(buffer);
    }
}

pub struct Select<'r> {
    pub label: &'r str,
    pub name: &'r str,
    /// `(value, label)` pairs.
    pub options: &'r [(String, String)],
    pub selected: &'r str,
    pub errors: &'r FormErrors,
    /// Adds a leading empty option, for optional references.
    pub allow_empty: bool,
}

impl Renderable for Select<'_> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        let error = self.errors.get(self.name);
        let class = if error.is_some() {
            "form-select is-invalid"
        } else {
            "form-select"
        };

        maud! {
            div class="mb-3" {
                label for=(self.name) class="form-label" { (self.label) }
                select class=(class) id=(self.name) name=(self.name) {
                    @if self.allow_empty {
                        option value="" selected[self.selected.is_empty()] { "-----" }
                    }
                    @for (value, label) in self.options {
                        option value=(value) selected[value == self.selected] {
                            (label)
                        }
                    }
                }
                @if let Some(error) = error {
                    div class="invalid-feedback" { (error) }
                }
            }
        }
        .render_to(buffer);
    }
}

pub struct Checkbox<'r> {
    pub label: &'r str,
    pub name: &'r str,
    pub checked: bool,
}

impl Renderable for Checkbox<'_> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        maud! {
            div class="form-check mb-3" {
                input type="checkbox"
                      class="form-check-input"
                      id=(self.name)
                      name=(self.name)
                      checked[self.checked];
                label class="form-check-label" for=(self.name) { (self.label) }
            }
        }
        .render_to(buffer);
    }
}

/// Errors which do not belong to a single input (e.g. "both teams are the
/// same").
pub struct FormErrorSummary<'r> {
    pub errors: &'r FormErrors,
}

impl Renderable for FormErrorSummary<'_> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        maud! {
            @if let Some(error) = self.errors.get(FormErrors::GENERAL) {
                div class="alert alert-danger" role="alert" { (error) }
            }
        }
        .render_to(buffer);
    }
}
