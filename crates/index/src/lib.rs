//! Named-graph persistence for approved extractions: an in-memory store and
//! a SPARQL 1.1 endpoint client behind one trait.

pub mod error;
pub mod memory;
pub mod sparql;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sparql::{METADATA_GRAPH, SparqlStore};
pub use store::{
    GRAPH_BASE, GraphInfo, GraphStore, StoreHealth, StoreReport, decode_statement,
    default_graph_name, graph_iri,
};
