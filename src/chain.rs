//! Ordered, named, observable registry.
//!
//! A [`Chain`] is a plain ordered list with two extras: elements that carry a
//! name can be looked up by it, and every insertion notifies a listener. The
//! router keeps its bindings in one (the listener drops the compiled route
//! table) and the processor keeps its middlewares in another.

use std::borrow::Cow;
use std::fmt;
use std::ops::Index;

use crate::error::Error;

/// Elements that can be looked up by name in a [`Chain`].
pub trait Named {
    fn name(&self) -> Cow<'_, str>;
}

type Listener<T> = Box<dyn Fn(&[T]) + Send + Sync + 'static>;

/// An ordered collection with positional insertion, lookup by index or name,
/// and a mutation callback.
///
/// The listener runs synchronously after every [`add`](Chain::add), once per
/// call, and sees the chain contents *after* the insertion. It must not try
/// to add to the chain it observes.
pub struct Chain<T> {
    items: Vec<T>,
    listener: Listener<T>,
}

impl<T> Chain<T> {
    pub fn new(listener: impl Fn(&[T]) + Send + Sync + 'static) -> Self {
        Self { items: Vec::new(), listener: Box::new(listener) }
    }

    /// Inserts `value` at `place`, shifting later elements right, or appends
    /// when `place` is `None`. A place past the end appends.
    pub fn add(&mut self, value: T, place: Option<usize>) {
        match place {
            Some(index) if index < self.items.len() => self.items.insert(index, value),
            _ => self.items.push(value),
        }
        (self.listener)(&self.items);
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// The most recently appended element, unless something was since
    /// inserted after it.
    pub fn last(&self) -> Option<&T> {
        self.items.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}

impl<T: Named> Chain<T> {
    /// Returns the first element whose name equals `name`.
    pub fn get_by_name(&self, name: &str) -> Result<&T, Error> {
        self.items
            .iter()
            .find(|item| item.name() == name)
            .ok_or_else(|| Error::NotFound(name.to_owned()))
    }
}

impl<T> Default for Chain<T> {
    fn default() -> Self {
        Self::new(|_| {})
    }
}

impl<T> Index<usize> for Chain<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.items[index]
    }
}

impl<'a, T> IntoIterator for &'a Chain<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: fmt::Debug> fmt::Debug for Chain<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.items).finish()
    }
}
