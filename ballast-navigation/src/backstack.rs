//! Navigation history.

use crate::{
    destination::Destination,
    route::{Annotation, Route},
};

/// An ordered stack of destinations, oldest first.
///
/// A [`Destination::Mismatch`] can only ever be the top entry: navigating
/// anywhere from a "not found" page replaces it. A destination whose route is
/// annotated [`Annotation::floating`] is likewise replaced by whatever is
/// pushed on top of it.
#[derive(Debug, Clone, PartialEq)]
pub struct Backstack<T> {
    entries: Vec<Destination<T>>,
}

impl<T> Default for Backstack<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T: Route> Backstack<T> {
    /// An empty backstack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries from the bottom of the stack to the top.
    pub fn entries(&self) -> &[Destination<T>] {
        &self.entries
    }

    /// The visible destination.
    pub fn top(&self) -> Option<&Destination<T>> {
        self.entries.last()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Push `destination`, first popping a mismatched or floating top.
    pub fn go_to_destination(&mut self, destination: Destination<T>) {
        if self
            .top()
            .is_some_and(|top| !top.is_match() || top.has_annotation(&Annotation::floating()))
        {
            self.entries.pop();
        }
        self.entries.push(destination);
    }

    /// Pop the top entry.
    pub fn go_back(&mut self) -> Option<Destination<T>> {
        self.entries.pop()
    }

    /// Swap the top entry for `destination`.
    pub fn replace_top_destination(&mut self, destination: Destination<T>) {
        self.entries.pop();
        self.entries.push(destination);
    }

    /// Drop every entry, then push `destination`.
    pub fn clear_and_go_to_destination(&mut self, destination: Destination<T>) {
        self.entries.clear();
        self.entries.push(destination);
    }

    /// Pop until the topmost entry for `route` is on top.
    ///
    /// Returns `false`, leaving the stack untouched, when `route` is not in it.
    pub fn pop_until_route(&mut self, route: &T) -> bool {
        self.pop_until(|destination| destination.route() == Some(route))
    }

    /// Pop until the topmost entry annotated with `annotation` is on top.
    ///
    /// Returns `false`, leaving the stack untouched, when no entry carries it.
    pub fn pop_until_annotation(&mut self, annotation: &Annotation) -> bool {
        self.pop_until(|destination| destination.has_annotation(annotation))
    }

    fn pop_until(&mut self, found: impl Fn(&Destination<T>) -> bool) -> bool {
        match self.entries.iter().rposition(found) {
            Some(index) => {
                self.entries.truncate(index + 1);
                true
            }
            None => false,
        }
    }
}
