pub mod sma_cross;
