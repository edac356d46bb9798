pub mod context;
pub mod middleware;

pub use context::{ActorContext, X_ACTOR_ID};
pub use middleware::RequireActor;
