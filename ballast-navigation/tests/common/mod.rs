#![allow(dead_code)]

use ballast_navigation::{Annotation, Route, RouteMatcher};
use std::sync::LazyLock;

// ============================================================================
// Test Routes
// ============================================================================

macro_rules! matcher {
    ($format:expr) => {{
        static MATCHER: LazyLock<RouteMatcher> =
            LazyLock::new(|| RouteMatcher::create($format).unwrap());
        &*MATCHER
    }};
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppRoute {
    Home,
    Posts,
    NewPost,
    Post,
    PostTab,
    Files,
    Search,
    Example,
    Dialog,
}

pub const MODAL: Annotation = Annotation::new("Modal");

impl AppRoute {
    pub const ALL: [AppRoute; 9] = [
        AppRoute::Home,
        AppRoute::Posts,
        AppRoute::NewPost,
        AppRoute::Post,
        AppRoute::PostTab,
        AppRoute::Files,
        AppRoute::Search,
        AppRoute::Example,
        AppRoute::Dialog,
    ];
}

impl Route for AppRoute {
    fn matcher(&self) -> &RouteMatcher {
        match self {
            AppRoute::Home => matcher!("/"),
            AppRoute::Posts => matcher!("/posts?page={?}"),
            AppRoute::NewPost => matcher!("/posts/new"),
            AppRoute::Post => matcher!("/posts/:id"),
            AppRoute::PostTab => matcher!("/posts/:id/:tab?{...}"),
            AppRoute::Files => matcher!("/files/{path...}"),
            AppRoute::Search => matcher!("/search?q={!}&tag={[?]}"),
            AppRoute::Example => matcher!("/one/:two/{three?}?one=two"),
            AppRoute::Dialog => matcher!("/dialog/:name"),
        }
    }

    fn annotations(&self) -> &[Annotation] {
        const FLOATING_MODAL: &[Annotation] = &[Annotation::floating(), MODAL];
        match self {
            AppRoute::Dialog => FLOATING_MODAL,
            _ => &[],
        }
    }
}
