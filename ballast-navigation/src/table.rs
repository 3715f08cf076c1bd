//! Weight-ordered route lookup.

use crate::{
    destination::{Destination, DestinationMatch, UnmatchedDestination},
    matcher::RouteMatch,
    route::Route,
};

/// A set of routes, tried from the highest weight down.
///
/// # Example
///
/// ```rust,ignore
/// let table = RoutingTable::from_routes([AppRoute::Home, AppRoute::Post]);
/// match table.find_match("/posts/42") {
///     Destination::Match(matched) => assert_eq!(matched.path_parameter("id")?, "42"),
///     Destination::Mismatch(_) => unreachable!(),
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RoutingTable<T> {
    routes: Vec<T>,
}

impl<T: Route> RoutingTable<T> {
    /// Build a table, ordering `routes` by descending weight.
    ///
    /// Routes of equal weight keep no particular order relative to each other.
    pub fn from_routes(routes: impl IntoIterator<Item = T>) -> Self {
        let mut routes: Vec<T> = routes.into_iter().collect();
        routes.sort_by_key(|route| std::cmp::Reverse(route.matcher().weight()));
        Self { routes }
    }

    /// Routes in the order they are tried.
    pub fn routes(&self) -> &[T] {
        &self.routes
    }

    /// Resolve `url` to the first route that matches it completely.
    pub fn find_match(&self, url: &str) -> Destination<T> {
        self.find_match_for(UnmatchedDestination::parse(url))
    }

    /// Resolve an already-parsed destination.
    pub fn find_match_for(&self, destination: UnmatchedDestination) -> Destination<T> {
        for route in &self.routes {
            if let RouteMatch::CompleteMatch {
                path_parameters,
                query_parameters,
            } = route.matcher().match_destination(&destination)
            {
                return Destination::Match(DestinationMatch::new(
                    route.clone(),
                    destination.original_url().to_string(),
                    path_parameters,
                    query_parameters,
                ));
            }
        }
        Destination::Mismatch(destination)
    }
}
