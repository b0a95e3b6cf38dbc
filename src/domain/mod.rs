//! Domain layer - users, their trading parameters and lifecycle transitions.
//!
//! Nothing here touches storage or HTTP.

pub mod password;
pub mod trading;
pub mod user;
pub mod verification;

pub use password::Password;
pub use trading::{TradingBound, TradingProfile, UNLIMITED};
pub use user::{
    ApprovalParameters, ApprovedUserEdit, Credentials, LifecycleState, Profile, Registration,
    User, UserResponse, UserRole,
};
pub use verification::VerificationToken;
