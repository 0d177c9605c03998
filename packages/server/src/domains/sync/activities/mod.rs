pub mod proposal_actions;

pub use proposal_actions::{
    approve_batch, approve_proposal, reject_batch, reject_proposal, stage_proposals,
    ProposalHandler, ProposedOperation, StageResult,
};
