pub mod audit;
pub mod dto;
pub mod use_cases;
