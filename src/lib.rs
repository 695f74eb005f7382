//! # lazy-streams
//!
//! Lazily-evaluated stream pipelines built by connecting stages.
//!
//! A pipeline starts at any iterable, passes through stages, and usually
//! ends in a terminal consumer. Connecting stages pulls nothing; values are
//! computed only when a consumer forces some or all of the evaluation.
//!
//! ## Overview
//!
//! - **Sources**: [`seq`], [`gseq`], [`repeatcall`], [`chaincall`], or
//!   anything iterable
//! - **Position selectors**: [`take`], [`drop`], [`takei`], [`dropi`]
//! - **Functional stages**: [`map`], [`filter`], [`takewhile`],
//!   [`dropwhile`], [`apply`], [`mapmethod`], [`cut`], [`reduce`],
//!   [`generate`]
//! - **Combinators**: [`prepend`], [`append`], [`tee`], [`flatten`]
//! - **Terminals**: [`item`], [`last`], [`items`], [`sink`], or plain
//!   `Iterator` methods such as `collect` and `sum`
//!
//! ## Example
//!
//! ```
//! use lazy_streams::{Pipe, drop, gseq, items, reduce, seq, take};
//!
//! let evens: Vec<i64> = seq(0, 2).pipe(drop(1)).pipe(take(5)).collect();
//! assert_eq!(evens, vec![2, 4, 6, 8, 10]);
//!
//! // partial sums of 1 + 1/2 + 1/4 + ...
//! let sums = gseq(&[0.5])
//!     .unwrap()
//!     .pipe(reduce(|a: f64, b: f64| a + b))
//!     .pipe(items(5));
//! assert_eq!(sums, vec![1.0, 1.5, 1.75, 1.875, 1.9375]);
//! ```

pub mod combine;
pub mod error;
pub mod filter;
pub mod index;
pub mod methods;
pub mod nested;
pub mod pipeline;
pub mod select;
pub mod source;
pub mod stage;
pub mod window;

pub use combine::{Concat, Flatten, Tee, append, flatten, prepend, tee, tee_of};
pub use error::{PipelineError, Result};
pub use filter::{
    Apply, Cut, CutAt, Filter, Generate, Map, MapMethod, Reduce, apply, apply1, apply2, apply3,
    cut, cut_at, dropwhile, filter, generate, map, mapmethod, reduce, reduce_from, takewhile,
};
pub use index::{DropI, TakeI, dropi, takei};
pub use methods::{Methods, Sliceable};
pub use nested::{IntoNested, Nested};
pub use pipeline::{Pipe, Stream, connect};
pub use select::{Item, Items, Skip, Take, drop, item, items, last, take, take_all};
pub use source::{ChainCall, GSeq, RepeatCall, Seq, chaincall, gseq, repeatcall, seq};
pub use stage::{Connect, Sink, Stage, Transform, sink, transform};
pub use window::Window;
