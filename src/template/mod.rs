//! Templating code.
//!
//! This defines the [`Page`] item, which wraps the body of every page in the
//! shared document head and navigation bar.

use hypertext::prelude::*;

use crate::{auth::User, permission::Permission};

pub mod form;

/// The top-level navigation entries. Used to highlight the current section.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Section {
    Dashboard,
    Tournaments,
    Teams,
    Players,
    Matches,
    Finances,
    Users,
}

pub struct Page<R1: Renderable, R2: Renderable> {
    body: Option<R1>,
    user: Option<User>,
    extra_head: Option<R2>,
    section: Option<Section>,
}

// unfortunate generic argument shenanigans
impl<R1: Renderable> Page<R1, String> {
    pub fn new() -> Self {
        Default::default()
    }
}

impl<R1: Renderable, R2: Renderable> Page<R1, R2> {
    pub fn new_full() -> Self {
        Default::default()
    }

    pub fn body(mut self, body: R1) -> Self {
        self.body = Some(body);
        self
    }

    pub fn user(mut self, user: User) -> Self {
        self.user = Some(user);
        self
    }

    pub fn user_opt(mut self, user: Option<User>) -> Self {
        self.user = user;
        self
    }

    pub fn extra_head(mut self, content: R2) -> Page<R1, R2> {
        self.extra_head = Some(content);
        self
    }

    pub fn section(mut self, section: Section) -> Self {
        self.section = Some(section);
        self
    }

    fn nav_link_class(&self, section: Section) -> &'static str {
        if self.section == Some(section) {
            "nav-link text-white active fw-semibold"
        } else {
            "nav-link text-white"
        }
    }
}

impl<R1: Renderable, R2: Renderable> Renderable for Page<R1, R2> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        let can_see_users = self
            .user
            .as_ref()
            .is_some_and(|user| user.role().grants(Permission::ManageUsers));

        maud! {
            html {
                head {
                    title { "Cancha" }
                    link
                        href="https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/css/bootstrap.min.css"
                        rel="stylesheet"
                        crossorigin="anonymous";
                    meta
                        name="viewport"
                        content="width=device-width, initial-scale=1";
                    @if let Some(extra) = &self.extra_head {
                        (extra)
                    }
                }
                body class="d-flex flex-column vh-100" {
                    nav class="navbar navbar-expand"
                        style="background-color: #14532d;"
                        data-bs-theme="dark" {
                        div class="container-fluid" {
                            a class="navbar-brand text-white" href="/" {
                                "Cancha"
                            }
                            @if self.user.is_some() {
                                ul class="navbar-nav me-auto" {
                                    li class="nav-item" {
                                        a class=(self.nav_link_class(Section::Tournaments)) href="/tournaments" {
                                            "Tournaments"
                                        }
                                    }
                                    li class="nav-item" {
                                        a class=(self.nav_link_class(Section::Teams)) href="/teams" {
                                            "Teams"
                                        }
                                    }
                                    li class="nav-item" {
                                        a class=(self.nav_link_class(Section::Players)) href="/players" {
                                            "Players"
                                        }
                                    }
                                    li class="nav-item" {
                                        a class=(self.nav_link_class(Section::Matches)) href="/matches" {
                                            "Matches"
                                        }
                                    }
                                    li class="nav-item" {
                                        a class=(self.nav_link_class(Section::Finances)) href="/finances" {
                                            "Finances"
                                        }
                                    }
                                    @if can_see_users {
                                        li class="nav-item" {
                                            a class=(self.nav_link_class(Section::Users)) href="/admin/users" {
                                                "Users"
                                            }
                                        }
                                    }
                                }
                            }
                            ul class="navbar-nav ms-auto" {
                                @if let Some(user) = &self.user {
                                    li class="nav-item" {
                                        span class="navbar-text text-white me-3" {
                                            (user.username) " (" (user.role().as_str()) ")"
                                        }
                                    }
                                    li class="nav-item" {
                                        form method="post" action="/logout" {
                                            button type="submit" class="btn btn-sm btn-outline-light" {
                                                "Log out"
                                            }
                                        }
                                    }
                                } @else {
                                    li class="nav-item" {
                                        a class="nav-link text-white" href="/login" {
                                            "Login"
                                        }
                                    }
                                    li class="nav-item" {
                                        a class="nav-link text-white" href="/register" {
                                            "Register"
                                        }
                                    }
                                }
                            }
                        }
                    }
                    div class="flex-grow-1" {
                        div class="container py-3" {
                            @if let Some(body) = &self.body {
                                (body)
                            }
                        }
                    }
                }
            }
        }.render_to(buffer)
    }
}

impl<R1: Renderable, R2: Renderable> Default for Page<R1, R2> {
    fn default() -> Self {
        Self {
            body: Default::default(),
            user: Default::default(),
            extra_head: Default::default(),
            section: Default::default(),
        }
    }
}
