pub mod invitation;
pub mod membership;
pub mod organization;
pub mod problem;

pub use invitation::{Invitation, NewInvitation};
pub use membership::{Membership, MembershipSummary};
pub use organization::{NewOrganization, Organization};
pub use problem::{NewOption, NewProblem, Problem, ProblemBody, ProblemOption};
