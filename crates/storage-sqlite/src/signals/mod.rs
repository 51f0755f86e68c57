mod model;
mod repository;

pub use model::TradeSignalDB;
pub use repository::SignalRepository;
