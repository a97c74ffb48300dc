// Auth flow module
// Public interface for the login/register/OTP state machine

mod flow;

pub use flow::{otp_ready, sanitize_otp, AuthFlow, AuthStage};
