//! The XDM value model and sequence algebra (spec §3): atomic types, the
//! promotion/subtype lattice, the tree-adapter node trait, maps and arrays,
//! and the flat heterogeneous [`sequence::Sequence`] every expression
//! produces.

pub mod atomic;
pub mod cast;
pub mod duration;
pub mod function_item;
pub mod map_array;
pub mod node;
pub mod sequence;
pub mod types;

pub use atomic::AtomicValue;
pub use function_item::FunctionItem;
pub use map_array::{MergePolicy, XArray, XMap};
pub use node::{DocumentPosition, NodeKind, XdmNode};
pub use sequence::{Item, Sequence};
pub use types::{AtomicTypeTag, ItemType, OccurrenceIndicator, QName, SequenceType};
