//! LRU List Module
//!
//! Recency-ordered doubly-linked list stored in an arena of slots.
//!
//! Nodes link to each other by slot index instead of by reference, so the
//! key index can hold plain `usize` locators that stay valid until the node
//! is removed. Freed slots are recycled through a free list.

// == Node ==
/// Slot payload plus its neighbours in recency order.
#[derive(Debug)]
struct Node<T> {
    value: T,
    prev: Option<usize>,
    next: Option<usize>,
}

// == LRU List ==
/// Arena-backed list ordered by recency.
///
/// - Front (head) = Most recently used
/// - Back (tail) = Least recently used
#[derive(Debug)]
pub struct LruList<T> {
    nodes: Vec<Option<Node<T>>>,
    head: Option<usize>,
    tail: Option<usize>,
    free_list: Vec<usize>,
    len: usize,
}

impl<T> Default for LruList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LruList<T> {
    // == Constructor ==
    /// Creates a new empty list.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            head: None,
            tail: None,
            free_list: Vec::new(),
            len: 0,
        }
    }

    // == Push Front ==
    /// Inserts a value at the most recently used position.
    ///
    /// Returns the slot the value lives in until it is removed.
    pub fn push_front(&mut self, value: T) -> usize {
        let node = Node {
            value,
            prev: None,
            next: None,
        };
        let slot = match self.free_list.pop() {
            Some(slot) => {
                self.nodes[slot] = Some(node);
                slot
            }
            None => {
                self.nodes.push(Some(node));
                self.nodes.len() - 1
            }
        };
        self.link_front(slot);
        self.len += 1;
        slot
    }

    // == Move To Front ==
    /// Promotes a resident slot to the most recently used position.
    ///
    /// Unknown or vacant slots are ignored.
    pub fn move_to_front(&mut self, slot: usize) {
        if self.head == Some(slot) || !self.is_occupied(slot) {
            return;
        }
        self.unlink(slot);
        self.link_front(slot);
    }

    // == Remove ==
    /// Removes a slot and returns its value.
    pub fn remove(&mut self, slot: usize) -> Option<T> {
        if !self.is_occupied(slot) {
            return None;
        }
        self.unlink(slot);
        let node = self.nodes[slot].take()?;
        self.free_list.push(slot);
        self.len -= 1;
        Some(node.value)
    }

    // == Pop Back ==
    /// Removes and returns the least recently used value.
    pub fn pop_back(&mut self) -> Option<T> {
        let tail = self.tail?;
        self.remove(tail)
    }

    // == Accessors ==
    /// Returns the value in a slot.
    pub fn get(&self, slot: usize) -> Option<&T> {
        self.nodes.get(slot)?.as_ref().map(|node| &node.value)
    }

    /// Returns the value in a slot mutably.
    pub fn get_mut(&mut self, slot: usize) -> Option<&mut T> {
        self.nodes.get_mut(slot)?.as_mut().map(|node| &mut node.value)
    }

    /// Returns the most recently used value.
    pub fn front(&self) -> Option<&T> {
        self.get(self.head?)
    }

    /// Returns the least recently used value.
    pub fn back(&self) -> Option<&T> {
        self.get(self.tail?)
    }

    /// Returns the slot at the least recently used position.
    pub fn back_slot(&self) -> Option<usize> {
        self.tail
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    // == Iter ==
    /// Iterates values from most to least recently used.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cursor: self.head,
            remaining: self.len,
        }
    }

    // == Clear ==
    /// Drops every node and releases the arena.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free_list.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    fn is_occupied(&self, slot: usize) -> bool {
        matches!(self.nodes.get(slot), Some(Some(_)))
    }

    fn link_front(&mut self, slot: usize) {
        let old_head = self.head;
        if let Some(node) = self.nodes[slot].as_mut() {
            node.prev = None;
            node.next = old_head;
        }
        match old_head {
            Some(head) => {
                if let Some(head_node) = self.nodes[head].as_mut() {
                    head_node.prev = Some(slot);
                }
            }
            None => self.tail = Some(slot),
        }
        self.head = Some(slot);
    }

    fn unlink(&mut self, slot: usize) {
        let (prev, next) = match self.nodes[slot].as_mut() {
            Some(node) => (node.prev.take(), node.next.take()),
            None => return,
        };

        match prev {
            Some(prev_slot) => {
                if let Some(prev_node) = self.nodes[prev_slot].as_mut() {
                    prev_node.next = next;
                }
            }
            None => self.head = next,
        }

        match next {
            Some(next_slot) => {
                if let Some(next_node) = self.nodes[next_slot].as_mut() {
                    next_node.prev = prev;
                }
            }
            None => self.tail = prev,
        }
    }
}

// == Iterator ==
/// Front-to-back iterator over an [`LruList`].
pub struct Iter<'a, T> {
    list: &'a LruList<T>,
    cursor: Option<usize>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.cursor?;
        let node = self.list.nodes[slot].as_ref()?;
        self.cursor = node.next;
        self.remaining -= 1;
        Some(&node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
