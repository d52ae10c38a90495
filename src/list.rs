//! # Pooled doubly linked lists
//!
//! Chains, node-split paths and node expansions are ordered sequences that
//! are cut, concatenated and edited in the middle all the time, while other
//! structures hold on to the position of single elements. A [`ListPool`]
//! stores the entries of any number of lists; a [`List`] is the small
//! descriptor (head, tail, length) kept by the owner of one sequence.
//!
//! Because all lists of a pool share one entry store, moving a run of
//! elements from one list to another ([`ListPool::append`],
//! [`ListPool::split_after`]) keeps every [`ListPos`] valid. A handle only
//! dies when its element is removed.

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ListPos(usize);

#[derive(Clone, Debug)]
struct ListEntry<T> {
    value: Option<T>,
    prev: Option<ListPos>,
    next: Option<ListPos>,
}

/// Descriptor of one list living in a [`ListPool`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct List {
    head: Option<ListPos>,
    tail: Option<ListPos>,
    len: usize,
}

impl List {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn head(&self) -> Option<ListPos> {
        self.head
    }

    pub fn tail(&self) -> Option<ListPos> {
        self.tail
    }
}

/// Entry storage shared by many [`List`]s.
#[derive(Clone, Debug)]
pub struct ListPool<T> {
    entries: Vec<ListEntry<T>>,
    free: Vec<ListPos>,
}

impl<T: Copy> Default for ListPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy> ListPool<T> {
    pub fn new() -> Self {
        ListPool {
            entries: Vec::new(),
            free: Vec::new(),
        }
    }

    fn alloc(&mut self, value: T) -> ListPos {
        let entry = ListEntry {
            value: Some(value),
            prev: None,
            next: None,
        };
        if let Some(pos) = self.free.pop() {
            self.entries[pos.0] = entry;
            pos
        } else {
            self.entries.push(entry);
            ListPos(self.entries.len() - 1)
        }
    }

    /// Whether `pos` refers to a live element.
    pub fn contains(&self, pos: ListPos) -> bool {
        self.entries
            .get(pos.0)
            .is_some_and(|entry| entry.value.is_some())
    }

    pub fn get(&self, pos: ListPos) -> T {
        match self.entries[pos.0].value {
            Some(v) => v,
            None => panic!("stale list position {pos:?}"),
        }
    }

    pub fn set(&mut self, pos: ListPos, value: T) {
        debug_assert!(self.contains(pos));
        self.entries[pos.0].value = Some(value);
    }

    pub fn next(&self, pos: ListPos) -> Option<ListPos> {
        self.entries[pos.0].next
    }

    pub fn prev(&self, pos: ListPos) -> Option<ListPos> {
        self.entries[pos.0].prev
    }

    pub fn front(&self, list: &List) -> Option<T> {
        list.head.map(|p| self.get(p))
    }

    pub fn back(&self, list: &List) -> Option<T> {
        list.tail.map(|p| self.get(p))
    }

    pub fn push_back(&mut self, list: &mut List, value: T) -> ListPos {
        let pos = self.alloc(value);
        match list.tail {
            Some(tail) => {
                self.entries[tail.0].next = Some(pos);
                self.entries[pos.0].prev = Some(tail);
            }
            None => list.head = Some(pos),
        }
        list.tail = Some(pos);
        list.len += 1;
        pos
    }

    pub fn push_front(&mut self, list: &mut List, value: T) -> ListPos {
        let pos = self.alloc(value);
        match list.head {
            Some(head) => {
                self.entries[head.0].prev = Some(pos);
                self.entries[pos.0].next = Some(head);
            }
            None => list.tail = Some(pos),
        }
        list.head = Some(pos);
        list.len += 1;
        pos
    }

    pub fn insert_after(&mut self, list: &mut List, at: ListPos, value: T) -> ListPos {
        let pos = self.alloc(value);
        let next = self.entries[at.0].next;
        self.entries[pos.0].prev = Some(at);
        self.entries[pos.0].next = next;
        self.entries[at.0].next = Some(pos);
        match next {
            Some(n) => self.entries[n.0].prev = Some(pos),
            None => list.tail = Some(pos),
        }
        list.len += 1;
        pos
    }

    pub fn insert_before(&mut self, list: &mut List, at: ListPos, value: T) -> ListPos {
        let pos = self.alloc(value);
        let prev = self.entries[at.0].prev;
        self.entries[pos.0].next = Some(at);
        self.entries[pos.0].prev = prev;
        self.entries[at.0].prev = Some(pos);
        match prev {
            Some(p) => self.entries[p.0].next = Some(pos),
            None => list.head = Some(pos),
        }
        list.len += 1;
        pos
    }

    /// Unlinks the element at `pos` from `list` and frees its slot.
    pub fn remove(&mut self, list: &mut List, pos: ListPos) -> T {
        let value = self.get(pos);
        let ListEntry { prev, next, .. } = self.entries[pos.0].clone();
        match prev {
            Some(p) => self.entries[p.0].next = next,
            None => list.head = next,
        }
        match next {
            Some(n) => self.entries[n.0].prev = prev,
            None => list.tail = prev,
        }
        list.len -= 1;
        self.entries[pos.0] = ListEntry {
            value: None,
            prev: None,
            next: None,
        };
        self.free.push(pos);
        value
    }

    /// Appends all of `other` to `list` in constant time.
    pub fn append(&mut self, list: &mut List, other: List) {
        let (Some(o_head), Some(o_tail)) = (other.head, other.tail) else {
            return;
        };
        match list.tail {
            Some(tail) => {
                self.entries[tail.0].next = Some(o_head);
                self.entries[o_head.0].prev = Some(tail);
            }
            None => list.head = Some(o_head),
        }
        list.tail = Some(o_tail);
        list.len += other.len;
    }

    /// Cuts `list` behind `pos`: `list` keeps everything up to and including
    /// `pos`, the returned list holds the rest. Takes time linear in the
    /// shorter of the two parts.
    pub fn split_after(&mut self, list: &mut List, pos: ListPos) -> List {
        let Some(first) = self.entries[pos.0].next else {
            return List::new();
        };
        let moved = self.count_behind(list, pos, first);
        self.entries[pos.0].next = None;
        self.entries[first.0].prev = None;
        let rest = List {
            head: Some(first),
            tail: list.tail,
            len: moved,
        };
        list.tail = Some(pos);
        list.len -= moved;
        rest
    }

    /// Cuts `list` in front of `pos`: the returned list holds everything
    /// before `pos`, `list` keeps `pos` and the rest.
    pub fn split_off_before(&mut self, list: &mut List, pos: ListPos) -> List {
        match self.entries[pos.0].prev {
            None => List::new(),
            Some(prev) => {
                let mut front = list.clone();
                let rest = self.split_after(&mut front, prev);
                *list = rest;
                front
            }
        }
    }

    /// Length of the part of `list` from `first = next(pos)` on, walking
    /// away from the cut in both directions until one side runs out.
    fn count_behind(&self, list: &List, pos: ListPos, first: ListPos) -> usize {
        let (mut ahead, mut behind) = (first, pos);
        let mut steps = 1;
        loop {
            match self.entries[ahead.0].next {
                None => return steps,
                Some(next) => ahead = next,
            }
            match self.entries[behind.0].prev {
                None => return list.len - steps,
                Some(prev) => behind = prev,
            }
            steps += 1;
        }
    }

    /// Frees every element of `list`.
    pub fn clear(&mut self, list: &mut List) {
        while let Some(head) = list.head {
            self.remove(list, head);
        }
    }

    /// Position of the first element equal to `value`.
    pub fn position(&self, list: &List, value: T) -> Option<ListPos>
    where
        T: PartialEq,
    {
        self.positions(list).find(|p| self.get(*p) == value)
    }

    pub fn iter<'a>(&'a self, list: &List) -> ListIter<'a, T> {
        ListIter {
            pool: self,
            front: list.head,
            back: list.tail,
            remaining: list.len,
        }
    }

    pub fn positions<'a>(&'a self, list: &List) -> ListPositions<'a, T> {
        ListPositions {
            pool: self,
            current: list.head,
        }
    }

    pub fn to_vec(&self, list: &List) -> Vec<T> {
        self.iter(list).collect()
    }
}

/// Double ended iterator over the values of a [`List`].
pub struct ListIter<'a, T> {
    pool: &'a ListPool<T>,
    front: Option<ListPos>,
    back: Option<ListPos>,
    remaining: usize,
}

impl<T: Copy> Iterator for ListIter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let pos = self.front?;
        self.front = self.pool.next(pos);
        self.remaining -= 1;
        Some(self.pool.get(pos))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T: Copy> DoubleEndedIterator for ListIter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let pos = self.back?;
        self.back = self.pool.prev(pos);
        self.remaining -= 1;
        Some(self.pool.get(pos))
    }
}

impl<T: Copy> ExactSizeIterator for ListIter<'_, T> {}

pub struct ListPositions<'a, T> {
    pool: &'a ListPool<T>,
    current: Option<ListPos>,
}

impl<T: Copy> Iterator for ListPositions<'_, T> {
    type Item = ListPos;

    fn next(&mut self) -> Option<Self::Item> {
        let pos = self.current?;
        self.current = self.pool.next(pos);
        Some(pos)
    }
}
