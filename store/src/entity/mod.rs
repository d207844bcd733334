pub mod ohlcv;
pub mod ta_moving_average;
pub mod trading_pairs;
