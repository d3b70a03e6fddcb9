pub mod analysis_handlers;
pub mod business_handlers;
pub mod job_handlers;
pub mod jobseeker_handlers;
mod ownership;
pub mod profile_handlers;
pub mod system_handlers;
pub mod user_handlers;

pub use analysis_handlers::*;
pub use business_handlers::*;
pub use job_handlers::*;
pub use jobseeker_handlers::*;
pub use profile_handlers::*;
pub use system_handlers::*;
pub use user_handlers::*;
