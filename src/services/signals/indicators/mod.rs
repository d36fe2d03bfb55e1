//! Technical indicator implementations.

pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod stochastic;

pub use bollinger::BollingerBands;
pub use ema::{Ema, EmaState};
pub use macd::{Macd, MacdState};
pub use rsi::{Rsi, RsiState};
pub use sma::Sma;
pub use stochastic::Stochastic;
