pub mod candle_repository;
pub mod pair_repository;
pub mod ta_repository;

pub use candle_repository::CandleRepository;
pub use pair_repository::PairRegistry;
pub use ta_repository::TaRepository;
