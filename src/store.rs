use {
    crate::Person,
    log::debug,
    std::{fmt, mem},
};

/// What changed in a [`ContactStore`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StoreEvent {
    /// The whole list was swapped out.
    Replaced,
    Added(usize),
    Updated(usize),
    Removed(usize),
}

type Observer = Box<dyn FnMut(StoreEvent, &[Person])>;

/// The ordered list of persons the application works on.
///
/// Order is insertion order and duplicates are allowed. Every mutation is reported
/// to the subscribed observers after it has been applied.
#[derive(Default)]
pub struct ContactStore {
    persons: Vec<Person>,
    observers: Vec<Observer>,
}

impl ContactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn persons(&self) -> &[Person] {
        &self.persons
    }

    pub fn get(&self, index: usize) -> Option<&Person> {
        self.persons.get(index)
    }

    pub fn len(&self) -> usize {
        self.persons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.persons.is_empty()
    }

    /// Register a callback that is invoked after every change.
    pub fn subscribe<F>(&mut self, observer: F)
    where
        F: FnMut(StoreEvent, &[Person]) + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    /// Discard the current list and take `persons`, in order.
    pub fn replace_all<I: IntoIterator<Item = Person>>(&mut self, persons: I) {
        self.persons.clear();
        self.persons.extend(persons);
        self.notify(StoreEvent::Replaced);
    }

    /// Append a person and return its index.
    pub fn push(&mut self, person: Person) -> usize {
        self.persons.push(person);
        let index = self.persons.len() - 1;
        self.notify(StoreEvent::Added(index));
        index
    }

    /// Put `person` at `index`, returning the person that was there.
    pub fn set(&mut self, index: usize, person: Person) -> Option<Person> {
        let slot = self.persons.get_mut(index)?;
        let previous = mem::replace(slot, person);
        self.notify(StoreEvent::Updated(index));
        Some(previous)
    }

    /// Mutate the person at `index` in place.
    pub fn update<F, R>(&mut self, index: usize, edit: F) -> Option<R>
    where
        F: FnOnce(&mut Person) -> R,
    {
        let result = edit(self.persons.get_mut(index)?);
        self.notify(StoreEvent::Updated(index));
        Some(result)
    }

    pub fn remove(&mut self, index: usize) -> Option<Person> {
        if index >= self.persons.len() {
            return None;
        }
        let removed = self.persons.remove(index);
        self.notify(StoreEvent::Removed(index));
        Some(removed)
    }

    fn notify(&mut self, event: StoreEvent) {
        debug!("{event:?}, {} contacts in store", self.persons.len());
        let persons = &self.persons;
        for observer in &mut self.observers {
            observer(event, persons);
        }
    }
}

impl fmt::Debug for ContactStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContactStore")
            .field("persons", &self.persons)
            .field("observers", &self.observers.len())
            .finish()
    }
}
