//! Scalable container primitives the graph engine is built on.

pub mod binary_heap;
pub mod bucketed_set;
pub mod chunked_list;
pub mod edge_list;
pub mod sharded_map;

pub use binary_heap::BinaryHeap;
pub use bucketed_set::BucketedHashSet;
pub use chunked_list::ChunkedList;
pub use edge_list::EdgeList;
pub use sharded_map::ShardedMap;
