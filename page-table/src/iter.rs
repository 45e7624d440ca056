use std::slice;

use crate::{PageTableEntry, SecondaryPageTable};

/// Walks every entry of a master table, secondary table by secondary table.
pub struct Entries<'a> {
    tables: slice::Iter<'a, SecondaryPageTable>,
    current: slice::Iter<'a, PageTableEntry>,
}

impl<'a> Entries<'a> {
    pub(crate) fn new(tables: &'a [SecondaryPageTable]) -> Self {
        Self {
            tables: tables.iter(),
            current: Default::default(),
        }
    }
}

impl<'a> Iterator for Entries<'a> {
    type Item = &'a PageTableEntry;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.current.next() {
                return Some(entry);
            }
            self.current = self.tables.next()?.entries().iter();
        }
    }
}

pub struct EntriesMut<'a> {
    tables: slice::IterMut<'a, SecondaryPageTable>,
    current: slice::IterMut<'a, PageTableEntry>,
}

impl<'a> EntriesMut<'a> {
    pub(crate) fn new(tables: &'a mut [SecondaryPageTable]) -> Self {
        Self {
            tables: tables.iter_mut(),
            current: Default::default(),
        }
    }
}

impl<'a> Iterator for EntriesMut<'a> {
    type Item = &'a mut PageTableEntry;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.current.next() {
                return Some(entry);
            }
            self.current = self.tables.next()?.entries_mut().iter_mut();
        }
    }
}
