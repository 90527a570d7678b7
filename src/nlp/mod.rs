pub mod claims;
pub mod entities;

pub use claims::{claim_query, leading_sentences};
pub use entities::{EntityTagger, HeuristicEntityTagger};
