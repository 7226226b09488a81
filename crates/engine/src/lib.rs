// In crates/engine/src/lib.rs

pub mod bot;
pub mod market_data;
pub mod strategy_factory;

pub use bot::TradingBot;
pub use market_data::MarketData;
pub use strategy_factory::create_strategy;
