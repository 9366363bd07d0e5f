use crate::errs::SkipSetError;

/// A successor reference: the arena slot of the next node, or `None` for the
/// tail sentinel.
pub(crate) type Link = Option<usize>;

/// A place in the list a search can stop at. The head never holds a value, so
/// it is kept apart from the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Position {
    Head,
    Node(usize),
}

/// A value plus its tower of successor links. `next.len()` is the number of
/// levels the node participates in and is never zero.
#[derive(Debug, Clone)]
pub(crate) struct SkipNode<T> {
    pub(crate) value: T,
    pub(crate) next: Vec<Link>,
}

impl<T> SkipNode<T> {
    pub(crate) fn new(value: T, levels: usize) -> Self {
        debug_assert!(levels >= 1);
        SkipNode {
            value,
            next: vec![None; levels],
        }
    }

    /// Build a node with `levels` unlinked successor slots. Allocation failure
    /// is reported instead of aborting.
    pub(crate) fn try_new(value: T, levels: usize) -> Result<Self, SkipSetError> {
        debug_assert!(levels >= 1);
        let mut next = Vec::new();
        next.try_reserve_exact(levels)?;
        next.resize(levels, None);
        Ok(SkipNode { value, next })
    }

    #[inline]
    pub(crate) fn levels(&self) -> usize {
        self.next.len()
    }
}

#[cfg(test)]
mod tests {
    use super::SkipNode;

    #[test]
    fn test_try_new_sizes_tower() {
        let node = SkipNode::try_new("a", 3).unwrap();
        assert_eq!(node.levels(), 3);
        assert!(node.next.iter().all(Option::is_none));
    }
}
