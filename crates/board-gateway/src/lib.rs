pub mod relay;
pub mod topic;
