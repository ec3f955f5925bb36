pub mod assess;
pub mod emi;
pub mod languages;
