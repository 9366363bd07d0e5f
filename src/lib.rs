//! An ordered multiset built on a [`skip list`].
//!
//! ```
//! use skipset::{
//!     config::Config,
//!     skiplist::LeveledOrderedSet,
//! };
//!
//! let mut set = LeveledOrderedSet::with_config(Config::default().with_seed(7)).unwrap();
//! set.insert(3);
//! set.insert(1);
//! set.insert(3);
//! assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec![1, 3, 3]);
//! assert!(set.erase(&3));
//! assert_eq!(set.size(), 2);
//! ```
//!
//! [`skip list`]: https://en.wikipedia.org/wiki/Skip_list

pub mod config;
pub mod errs;
pub mod skiplist;

pub use errs::SkipSetError;
pub use skiplist::LeveledOrderedSet;
