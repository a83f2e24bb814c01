pub mod anonymous_voting;
pub mod divination;
pub mod key_publicize;
pub mod role_assignment;
pub mod winning_judgement;

pub use anonymous_voting::*;
pub use divination::*;
pub use key_publicize::*;
pub use role_assignment::*;
pub use winning_judgement::*;
