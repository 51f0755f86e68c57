//! Trade signals: technical scoring, optional advisor opinion, persistence.

mod signals_model;
mod signals_scoring;
mod signals_service;
mod signals_traits;

pub use signals_model::{
    signal_expiry, AdvisorOpinion, AdvisorRequest, DerivativesContext, Direction, SignalLevels,
    SignalScore, SignalSource, TradeSignal,
};
pub use signals_scoring::{direction_for, pivot_levels, score_signal, NEUTRAL_BAND};
pub use signals_service::SignalService;
pub use signals_traits::{SignalAdvisor, SignalRepositoryTrait, SignalServiceTrait};
