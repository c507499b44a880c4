pub mod combination_repo;
pub mod option_repo;
pub mod override_repo;
pub mod rule_repo;
pub mod segment_order_repo;

pub use combination_repo::CombinationRepo;
pub use option_repo::OptionRepo;
pub use override_repo::OverrideRepo;
pub use rule_repo::RuleRepo;
pub use segment_order_repo::SegmentOrderRepo;
