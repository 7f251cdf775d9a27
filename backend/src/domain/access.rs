//! Actor lookups and permission checks shared by the domain services.

use crate::domain::ports::UserRepository;
use crate::domain::{Error, User, UserId};

/// Message returned for every role or ownership refusal.
pub const PERMISSION_DENIED: &str = "You do not have permission to perform this action.";

/// Load the acting user. A session pointing at a deleted account is treated
/// as unauthenticated.
pub(crate) async fn load_actor(users: &dyn UserRepository, actor: &UserId) -> Result<User, Error> {
    users
        .find_by_id(actor)
        .await?
        .ok_or_else(|| Error::unauthorized("Authentication credentials were not provided."))
}

/// Load the acting user and require the admin flag.
pub(crate) async fn require_admin(users: &dyn UserRepository, actor: &UserId) -> Result<User, Error> {
    let user = load_actor(users, actor).await?;
    if !user.is_admin {
        return Err(Error::forbidden(PERMISSION_DENIED));
    }
    Ok(user)
}

/// Load the acting user and require the instructor role.
pub(crate) async fn require_instructor(
    users: &dyn UserRepository,
    actor: &UserId,
) -> Result<User, Error> {
    let user = load_actor(users, actor).await?;
    if !user.is_instructor() {
        return Err(Error::forbidden(PERMISSION_DENIED));
    }
    Ok(user)
}
