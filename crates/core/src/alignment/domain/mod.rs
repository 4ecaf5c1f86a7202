pub mod block_aligner;
