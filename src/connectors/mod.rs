pub mod bybit;
pub mod envelope;
pub mod traits;
