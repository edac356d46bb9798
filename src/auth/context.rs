use uuid::Uuid;

/// Header carrying the caller's already-authenticated user id.
pub const X_ACTOR_ID: &str = "x-actor-id";

/// Actor identity handed to the engine.
/// Authentication happens upstream; this only carries the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActorContext {
    pub user_id: Uuid,
}

impl ActorContext {
    pub fn from_header(value: &str) -> Result<Self, &'static str> {
        let user_id = Uuid::parse_str(value.trim()).map_err(|_| "Invalid actor id")?;
        if user_id.is_nil() {
            return Err("Invalid actor id");
        }

        Ok(Self { user_id })
    }
}
