pub mod config;
pub mod domain;
pub mod ratecard;
pub mod rating;

pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, SchemeLimits};
pub use domain::fact::{
    FactorResolution, MonthlySummary, PolicyFact, PolicyPremium, RatedFact,
};
pub use domain::source::PolicyBook;
pub use domain::{Factor, PetType, RateEntry, RateKey, DECLINE_RATE};
pub use ratecard::{NestedRateTable, RateCardError, RateTable, Sheet};
