pub mod block;
pub mod error;
pub mod fetch;
pub mod frame;
pub mod hsp;
pub mod partition;
pub mod pipeline;
pub mod resolve;
pub mod segment;
pub mod sub_matrix;
pub mod translate;
pub mod twobit;
