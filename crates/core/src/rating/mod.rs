pub mod assemble;
pub mod bands;
pub mod calculator;
pub mod engine;

pub use assemble::assemble_facts;
pub use calculator::{quote, CalculatorQuote, CalculatorRequest};
pub use engine::{filter_rated, monthly_summary, policy_premiums, rate_all, rate_fact};
