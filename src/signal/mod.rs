// The decision core: classification types, the staged classifier, and the
// typed evaluation errors
pub mod classifier;
pub mod error;

pub use classifier::{
    ClassifierInputs, CrossDirection, SignalCategory, SignalClassification, SignalClassifier,
    TradeAction, TradePlan,
};
pub use error::EvalError;
