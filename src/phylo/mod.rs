mod collapse;
mod load;
mod raw;
mod search;
mod signature;
mod subtree;
mod tree;

#[cfg(test)]
pub(crate) mod testing;

pub use collapse::apply_initial_collapse;
pub use load::{Dataset, DatasetPaths, load_dataset};
pub use raw::RawNode;
pub use search::{SearchScope, order_by_position, search};
pub use signature::{MutationKind, accumulate, annotate};
pub use subtree::extract_subtree;
pub use tree::{NodeId, PhyloTree, RenderId};
