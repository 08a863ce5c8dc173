//! Arbitrarily nested collections of handles and their flattening.
//!
//! Composite circuits return their neurons as trees mirroring their own
//! structure (an AND array of classic AND gates yields one list per gate).
//! Flattening turns such a tree into the ordered list expected by wiring calls.

use serde::{Deserialize, Serialize};

/// An item or an ordered list of nested items.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub enum Nested<T> {
    Item(T),
    List(Vec<Nested<T>>),
}

impl<T> Nested<T> {
    /// An empty list.
    pub fn empty() -> Self {
        Nested::List(Vec::new())
    }

    /// A flat list of items.
    pub fn items<I: IntoIterator<Item = T>>(items: I) -> Self {
        Nested::List(items.into_iter().map(Nested::Item).collect())
    }

    /// A list of nested values.
    pub fn list<I: IntoIterator<Item = Nested<T>>>(values: I) -> Self {
        Nested::List(values.into_iter().collect())
    }

    /// Returns true if the tree holds no item at any depth.
    pub fn is_empty(&self) -> bool {
        match self {
            Nested::Item(_) => false,
            Nested::List(values) => values.iter().all(|value| value.is_empty()),
        }
    }
}

impl<T: Clone> Nested<T> {
    /// Returns the items of the tree in depth-first order.
    pub fn flatten(&self) -> Vec<T> {
        let mut items = Vec::new();
        self.collect_into(&mut items);
        items
    }

    fn collect_into(&self, items: &mut Vec<T>) {
        match self {
            Nested::Item(item) => items.push(item.clone()),
            Nested::List(values) => values.iter().for_each(|value| value.collect_into(items)),
        }
    }
}

/// Flattens a list of nested values into one ordered list (depth-first).
pub fn flatten<T: Clone>(values: &[Nested<T>]) -> Vec<T> {
    let mut items = Vec::new();
    values.iter().for_each(|value| value.collect_into(&mut items));
    items
}
