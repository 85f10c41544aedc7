// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authentication and authorization types and services.
//!
//! Authentication itself happens elsewhere in the product; the actor id and
//! role arrive with each request and are only checked for shape here.

use crate::error::AuthError;
use paddock_audit::Actor;
use paddock_domain::{ActorId, ProviderId, Role};
use std::str::FromStr;

/// An authenticated actor with an associated role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// The unique identifier for this actor.
    pub id: ActorId,
    /// The role assigned to this actor.
    pub role: Role,
}

impl AuthenticatedActor {
    /// Creates a new authenticated actor.
    ///
    /// # Arguments
    ///
    /// * `id` - The unique identifier for this actor
    /// * `role` - The role assigned to this actor
    #[must_use]
    pub const fn new(id: ActorId, role: Role) -> Self {
        Self { id, role }
    }

    /// Converts this authenticated actor into an audit Actor.
    #[must_use]
    pub fn to_audit_actor(&self) -> Actor {
        Actor::new(self.id.clone(), self.role)
    }
}

/// Authorization service for enforcing role-based access control.
///
/// Per-transition guards live in the state machine; this service covers
/// the operations outside it.
pub struct AuthorizationService;

impl AuthorizationService {
    /// Builds an actor from the identity supplied with a request.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is blank or the role is unknown.
    pub fn authenticate(actor_id: &str, role: &str) -> Result<AuthenticatedActor, AuthError> {
        let id: ActorId = ActorId::new(actor_id);
        if id.value().is_empty() {
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("missing actor id"),
            });
        }
        let role: Role = Role::from_str(role).map_err(|e| AuthError::AuthenticationFailed {
            reason: e.to_string(),
        })?;
        Ok(AuthenticatedActor::new(id, role))
    }

    /// Checks if an actor may replace a provider's availability.
    ///
    /// Admins may edit any provider; coaches only their own calendar.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is neither an admin nor the provider.
    pub fn authorize_set_availability(
        actor: &AuthenticatedActor,
        provider_id: &ProviderId,
    ) -> Result<(), AuthError> {
        match actor.role {
            Role::Admin => Ok(()),
            Role::Coach if actor.id.value() == provider_id.value() => Ok(()),
            Role::Coach | Role::Staff | Role::Client => Err(AuthError::Unauthorized {
                action: String::from("set_availability"),
                required_role: String::from("admin or the provider coach"),
            }),
        }
    }

    /// Checks if an actor may bulk-assign tasks.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is not admin or staff.
    pub fn authorize_bulk_assign(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        match actor.role {
            Role::Admin | Role::Staff => Ok(()),
            Role::Coach | Role::Client => Err(AuthError::Unauthorized {
                action: String::from("bulk_assign"),
                required_role: String::from("admin or staff"),
            }),
        }
    }

    /// Checks if an actor may read an item's audit timeline.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is not admin or staff.
    pub fn authorize_audit_timeline(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        match actor.role {
            Role::Admin | Role::Staff => Ok(()),
            Role::Coach | Role::Client => Err(AuthError::Unauthorized {
                action: String::from("audit_timeline"),
                required_role: String::from("admin or staff"),
            }),
        }
    }
}
