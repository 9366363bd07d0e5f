use std::{
    fmt,
    iter::FusedIterator,
    mem,
};

use tracing::{
    debug,
    instrument,
};

use crate::{
    config::Config,
    errs::SkipSetError,
    skiplist::{
        level_generator::{
            GeometricalLevelGenerator,
            LevelGenerator,
        },
        skipnode::{
            Link,
            Position,
            SkipNode,
        },
    },
};

/// An ordered multiset backed by a skiplist.
///
/// ```text
/// <head> ----------> [2] ----------------------------------> [9] --> <tail>
/// <head> ----------> [2] ------------------> [7] ----------> [9] --> <tail>
/// <head> --> [1] --> [2] --> [4] --> [5] --> [7] --> [8] --> [9] --> <tail>
/// ```
///
/// Every element lives on level 0; each higher level is a random subset of the
/// level below it, chosen by the level generator `G`. Searching starts on the
/// top level and drops down whenever the next element would overshoot, giving
/// expected `O(log n)` lookups, insertions and removals.
///
/// Nodes are kept in an arena and linked by slot index, so the set owns every
/// node outright and erasing one can never leave a dangling link. Vacated
/// slots are reused by later insertions.
///
/// Equal elements are allowed and sit next to each other on level 0 in the
/// order they were inserted.
#[derive(Clone)]
pub struct LeveledOrderedSet<T, G = GeometricalLevelGenerator> {
    /// The head sentinel's successors, one per level.
    head: Vec<Link>,
    nodes: Vec<Option<SkipNode<T>>>,
    free: Vec<usize>,
    len: usize,
    generator: G,
    /// Scratch space for per-level predecessors, kept to avoid allocating on
    /// every mutation.
    preds: Vec<Position>,
}

impl<T: Ord> LeveledOrderedSet<T> {
    /// An empty set with `p = 0.5`, 12 levels and an entropy-seeded generator.
    pub fn new() -> Self {
        Self::with_generator(GeometricalLevelGenerator::default())
    }

    /// An empty set built from `config`. Invalid parameters are rejected, never
    /// clamped.
    pub fn with_config(config: Config) -> Result<Self, SkipSetError> {
        config.validate()?;
        let generator = match config.seed() {
            | Some(seed) => {
                GeometricalLevelGenerator::seeded(config.max_levels(), config.p(), seed)?
            },
            | None => GeometricalLevelGenerator::new(config.max_levels(), config.p())?,
        };
        debug!(
            p = config.p(),
            max_levels = config.max_levels(),
            seeded = config.seed().is_some(),
            "created leveled ordered set"
        );
        Ok(Self::with_generator(generator))
    }

    pub fn with_params(p: f64, max_levels: usize) -> Result<Self, SkipSetError> {
        Self::with_config(Config::new(p, max_levels))
    }

    /// The continuation probability used for level sampling.
    pub fn probability(&self) -> f64 {
        self.generator.p()
    }
}

impl<T: Ord> Default for LeveledOrderedSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Ord, G: LevelGenerator> LeveledOrderedSet<T, G> {
    /// An empty set whose node heights come from `generator`. The number of
    /// levels is `generator.total()`.
    pub fn with_generator(generator: G) -> Self {
        let levels = generator.total();
        LeveledOrderedSet {
            head: vec![None; levels],
            nodes: Vec::new(),
            free: Vec::new(),
            len: 0,
            generator,
            preds: vec![Position::Head; levels],
        }
    }

    /// Number of elements, counting duplicates.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Alias for [`LeveledOrderedSet::len`].
    #[inline]
    pub fn size(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The most levels any node can take part in.
    #[inline]
    pub fn max_levels(&self) -> usize {
        self.head.len()
    }

    /// Reseed the level generator. Only heights of future insertions change.
    pub fn reseed(&mut self, seed: u64) {
        debug!(seed, "reseeding level generator");
        self.generator.reseed(seed);
    }

    /// The first element equal to `value`, if any.
    pub fn find(&self, value: &T) -> Option<&T> {
        let prev = self.search_prev(value);
        match self.next_of(prev, 0) {
            | Some(idx) if self.node(idx).value == *value => Some(&self.node(idx).value),
            | _ => None,
        }
    }

    pub fn contains(&self, value: &T) -> bool {
        self.find(value).is_some()
    }

    /// The smallest element.
    pub fn first(&self) -> Option<&T> {
        self.head[0].map(|idx| &self.node(idx).value)
    }

    /// The largest element, found by running down the express lanes.
    pub fn last(&self) -> Option<&T> {
        match self.descend(|_| true, |_, _| {}) {
            | Position::Head => None,
            | Position::Node(idx) => Some(&self.node(idx).value),
        }
    }

    /// Insert one more instance of `value`. Equal elements already present
    /// stay in front of it.
    #[instrument(level = "trace", skip_all, fields(len = self.len))]
    pub fn insert(&mut self, value: T) {
        let levels = self.generator.random();
        self.find_predecessors(|v| *v <= value);
        self.link(SkipNode::new(value, levels));
    }

    /// Like [`LeveledOrderedSet::insert`], but reports allocation failure
    /// instead of aborting. On error the set is left untouched.
    #[instrument(level = "trace", skip_all, fields(len = self.len))]
    pub fn try_insert(&mut self, value: T) -> Result<(), SkipSetError> {
        if self.free.is_empty() {
            self.nodes.try_reserve(1)?;
        }
        let node = SkipNode::try_new(value, self.generator.random())?;
        self.find_predecessors(|v| *v <= node.value);
        self.link(node);
        Ok(())
    }

    /// Insert `value` unless an equal element is already present. Returns
    /// whether an insertion happened.
    #[instrument(level = "trace", skip_all, fields(len = self.len))]
    pub fn insert_if_absent(&mut self, value: T) -> bool {
        self.find_predecessors(|v| *v < value);
        if let Some(idx) = self.next_of(self.preds[0], 0) {
            if self.node(idx).value == value {
                return false;
            }
        }
        // the predecessors found with `<` are also the `<=` ones when no
        // equal element exists
        let levels = self.generator.random();
        self.link(SkipNode::new(value, levels));
        true
    }

    /// Remove the first element equal to `value`. Returns whether one was
    /// found.
    pub fn erase(&mut self, value: &T) -> bool {
        self.remove(value).is_some()
    }

    /// Remove the first element equal to `value` and hand it back.
    #[instrument(level = "trace", skip_all, fields(len = self.len))]
    pub fn remove(&mut self, value: &T) -> Option<T> {
        self.find_predecessors(|v| v < value);
        let target = self.next_of(self.preds[0], 0)?;
        if self.node(target).value != *value {
            return None;
        }

        let node = match self.nodes[target].take() {
            | Some(node) => node,
            | None => unreachable!("link to vacant slot {target}"),
        };
        for (level, &next) in node.next.iter().enumerate() {
            let pred = self.preds[level];
            debug_assert_eq!(self.next_of(pred, level), Some(target));
            self.set_next(pred, level, next);
        }
        self.free.push(target);
        self.len -= 1;
        Some(node.value)
    }

    /// Drop every element. Calling it on an empty set is a no-op.
    #[instrument(level = "trace", skip_all, fields(len = self.len))]
    pub fn clear(&mut self) {
        debug!(dropped = self.len, "clearing set");
        self.nodes.clear();
        self.free.clear();
        self.head.fill(None);
        self.len = 0;
    }

    /// Iterate over the elements in non-decreasing order.
    ///
    /// The iterator borrows the set, so it cannot be mutated mid-iteration.
    pub fn iter(&self) -> Iter<'_, T, G> {
        Iter {
            set: self,
            link: self.head[0],
            remaining: self.len,
        }
    }

    /// Iterate over the elements that take part in `level`. Level 0 yields
    /// the same sequence as [`LeveledOrderedSet::iter`].
    ///
    /// # Panics
    ///
    /// Panics if `level >= self.max_levels()`.
    pub fn iter_level(&self, level: usize) -> LevelIter<'_, T, G> {
        assert!(
            level < self.max_levels(),
            "level {level} out of range for {} levels",
            self.max_levels()
        );
        LevelIter {
            set: self,
            link: self.head[level],
            level,
        }
    }

    /// Number of elements taking part in `level`.
    ///
    /// # Panics
    ///
    /// Panics if `level >= self.max_levels()`.
    pub fn level_len(&self, level: usize) -> usize {
        self.iter_level(level).count()
    }

    /// The last position holding a value strictly less than `target`, the
    /// head if there is none.
    fn search_prev(&self, target: &T) -> Position {
        self.descend(|v| v < target, |_, _| {})
    }

    /// Fill `self.preds` with the last position on each level for which
    /// `advance` holds.
    fn find_predecessors<F>(&mut self, advance: F)
    where
        F: FnMut(&T) -> bool,
    {
        let mut preds = mem::take(&mut self.preds);
        self.descend(advance, |level, pos| preds[level] = pos);
        self.preds = preds;
    }

    /// Walk from the head, top level first, moving right while `advance`
    /// accepts the next value and dropping a level otherwise. `record` sees
    /// where the walk ended on every level.
    fn descend<F, R>(&self, mut advance: F, mut record: R) -> Position
    where
        F: FnMut(&T) -> bool,
        R: FnMut(usize, Position),
    {
        let mut curr = Position::Head;
        for level in (0..self.max_levels()).rev() {
            while let Some(next) = self.next_of(curr, level) {
                if !advance(&self.node(next).value) {
                    break;
                }
                curr = Position::Node(next);
            }
            record(level, curr);
        }
        curr
    }

    /// Splice `node` in after the positions in `self.preds`.
    fn link(&mut self, mut node: SkipNode<T>) {
        for level in 0..node.levels() {
            node.next[level] = self.next_of(self.preds[level], level);
        }
        let levels = node.levels();
        let idx = match self.free.pop() {
            | Some(idx) => {
                self.nodes[idx] = Some(node);
                idx
            },
            | None => {
                self.nodes.push(Some(node));
                self.nodes.len() - 1
            },
        };
        for level in 0..levels {
            self.set_next(self.preds[level], level, Some(idx));
        }
        self.len += 1;
    }

    #[inline]
    fn node(&self, idx: usize) -> &SkipNode<T> {
        match &self.nodes[idx] {
            | Some(node) => node,
            | None => unreachable!("link to vacant slot {idx}"),
        }
    }

    #[inline]
    fn next_of(&self, pos: Position, level: usize) -> Link {
        match pos {
            | Position::Head => self.head[level],
            | Position::Node(idx) => self.node(idx).next[level],
        }
    }

    #[inline]
    fn set_next(&mut self, pos: Position, level: usize, link: Link) {
        match pos {
            | Position::Head => self.head[level] = link,
            | Position::Node(idx) => match &mut self.nodes[idx] {
                | Some(node) => node.next[level] = link,
                | None => unreachable!("link to vacant slot {idx}"),
            },
        }
    }
}

impl<T: fmt::Debug, G> fmt::Debug for LeveledOrderedSet<T, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut set = f.debug_set();
        let mut link = self.head[0];
        while let Some(idx) = link {
            match &self.nodes[idx] {
                | Some(node) => {
                    set.entry(&node.value);
                    link = node.next[0];
                },
                | None => break,
            }
        }
        set.finish()
    }
}

impl<T: Ord> FromIterator<T> for LeveledOrderedSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = LeveledOrderedSet::new();
        set.extend(iter);
        set
    }
}

impl<T: Ord, G: LevelGenerator> Extend<T> for LeveledOrderedSet<T, G> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<'a, T: Ord, G: LevelGenerator> IntoIterator for &'a LeveledOrderedSet<T, G> {
    type IntoIter = Iter<'a, T, G>;
    type Item = &'a T;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T, G> IntoIterator for LeveledOrderedSet<T, G> {
    type IntoIter = IntoIter<T>;
    type Item = T;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            link: self.head[0],
            nodes: self.nodes,
            remaining: self.len,
        }
    }
}

/// Sorted iterator over a [`LeveledOrderedSet`], following level 0 from head
/// to tail.
pub struct Iter<'a, T, G> {
    set: &'a LeveledOrderedSet<T, G>,
    link: Link,
    remaining: usize,
}

impl<'a, T: Ord, G: LevelGenerator> Iterator for Iter<'a, T, G> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.set.node(self.link?);
        self.link = node.next[0];
        self.remaining -= 1;
        Some(&node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T: Ord, G: LevelGenerator> ExactSizeIterator for Iter<'_, T, G> {}

impl<T: Ord, G: LevelGenerator> FusedIterator for Iter<'_, T, G> {}

/// Iterator over the elements taking part in a single level.
pub struct LevelIter<'a, T, G> {
    set: &'a LeveledOrderedSet<T, G>,
    link: Link,
    level: usize,
}

impl<'a, T: Ord, G: LevelGenerator> Iterator for LevelIter<'a, T, G> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.set.node(self.link?);
        self.link = node.next[self.level];
        Some(&node.value)
    }
}

impl<T: Ord, G: LevelGenerator> FusedIterator for LevelIter<'_, T, G> {}

/// Owning sorted iterator, produced by `into_iter` on the set itself.
pub struct IntoIter<T> {
    nodes: Vec<Option<SkipNode<T>>>,
    link: Link,
    remaining: usize,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.nodes[self.link?].take()?;
        self.link = node.next[0];
        self.remaining -= 1;
        Some(node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}
