pub mod eligibility_service;
pub mod import_service;
pub mod prize_service;
pub mod ranking_service;
pub mod scoring_service;
pub mod settlement_service;

pub use eligibility_service::*;
pub use import_service::*;
pub use prize_service::*;
pub use ranking_service::*;
pub use scoring_service::*;
pub use settlement_service::*;
