//! Access policy.
//!
//! Every endpoint resolves one [`Rule`] from the `(Resource, Action)` table below. The
//! route half runs before anything is loaded; the object half runs after the target
//! row is resolved, because ownership is decided by a foreign key (the project author,
//! or the author of the project owning a position).
//!
//! Anonymous callers hitting an authenticated rule get `TOKEN_MISSING`, authenticated
//! callers that fail a rule get `PERMISSION_DENIED`.

use uuid::Uuid;

use crate::error::AppError;
use crate::extractors::auth::AuthUser;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resource {
    User,
    Skill,
    Stack,
    Project,
    Position,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    List,
    Retrieve,
    /// Listing scoped to the actor (`/projects/mine`, `/users/me`).
    Mine,
    Create,
    Update,
    /// Replace-on-write of a child collection.
    SetCollection,
    Destroy,
}

impl Action {
    pub fn is_read(self) -> bool {
        matches!(self, Action::List | Action::Retrieve | Action::Mine)
    }
}

/// Check performed before the target is loaded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteRule {
    AllowAny,
    Authenticated,
    Admin,
}

/// Check performed against the resolved target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectRule {
    None,
    /// Owner is `project.author`.
    AuthorOrReadOnly,
    /// Owner is `position.project.author`.
    ProjectAuthorOrReadOnly,
    /// Owner is the user record itself.
    SelfOrReadOnly,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rule {
    pub action: Action,
    pub route: RouteRule,
    pub object: ObjectRule,
}

/// The permission table.
pub const fn rule(resource: Resource, action: Action) -> Rule {
    use Action::*;
    use ObjectRule as O;
    use RouteRule as R;

    let (route, object) = match (resource, action) {
        (Resource::Skill, _) => (R::Admin, O::None),

        (Resource::Stack, List | Retrieve) => (R::AllowAny, O::None),
        (Resource::Stack, _) => (R::Admin, O::None),

        (Resource::User, Create) => (R::AllowAny, O::None),
        (Resource::User, List | Mine) => (R::Authenticated, O::None),
        (Resource::User, _) => (R::Authenticated, O::SelfOrReadOnly),

        (Resource::Project, List | Retrieve) => (R::AllowAny, O::AuthorOrReadOnly),
        (Resource::Project, Mine | Create) => (R::Authenticated, O::None),
        (Resource::Project, _) => (R::Authenticated, O::AuthorOrReadOnly),

        (Resource::Position, List | Retrieve) => (R::AllowAny, O::ProjectAuthorOrReadOnly),
        (Resource::Position, _) => (R::Authenticated, O::ProjectAuthorOrReadOnly),
    };

    Rule {
        action,
        route,
        object,
    }
}

impl Rule {
    /// Route-level check. Returns the actor so handlers can keep using it.
    pub fn authorize<'a>(
        &self,
        actor: Option<&'a AuthUser>,
    ) -> Result<Option<&'a AuthUser>, AppError> {
        match self.route {
            RouteRule::AllowAny => Ok(actor),
            RouteRule::Authenticated => actor.map(Some).ok_or(AppError::TokenMissing),
            RouteRule::Admin => {
                let actor = actor.ok_or(AppError::TokenMissing)?;
                is_admin(actor)?;
                Ok(Some(actor))
            }
        }
    }

    /// Like [`Rule::authorize`] for rules that always need an actor.
    pub fn authorize_actor<'a>(
        &self,
        actor: Option<&'a AuthUser>,
    ) -> Result<&'a AuthUser, AppError> {
        self.authorize(actor)?.ok_or(AppError::TokenMissing)
    }

    /// Object-level check against the owner of the resolved target.
    pub fn authorize_object(
        &self,
        actor: Option<&AuthUser>,
        owner_id: Uuid,
    ) -> Result<(), AppError> {
        match self.object {
            ObjectRule::None => Ok(()),
            ObjectRule::AuthorOrReadOnly => is_author_or_read_only(actor, self.action, owner_id),
            ObjectRule::ProjectAuthorOrReadOnly => {
                is_project_author_or_read_only(actor, self.action, owner_id)
            }
            ObjectRule::SelfOrReadOnly => is_self_or_read_only(actor, self.action, owner_id),
        }
    }
}

fn owner_only(actor: Option<&AuthUser>, owner_id: Uuid) -> Result<(), AppError> {
    let actor = actor.ok_or(AppError::TokenMissing)?;
    if actor.user_id == owner_id {
        Ok(())
    } else {
        Err(AppError::PermissionDenied)
    }
}

/// Reads for anyone; writes only by the project's author.
pub fn is_author_or_read_only(
    actor: Option<&AuthUser>,
    action: Action,
    author_id: Uuid,
) -> Result<(), AppError> {
    if action.is_read() {
        return Ok(());
    }
    owner_only(actor, author_id)
}

/// Reads for anyone; writes to a position only by the author of its project.
pub fn is_project_author_or_read_only(
    actor: Option<&AuthUser>,
    action: Action,
    project_author_id: Uuid,
) -> Result<(), AppError> {
    if action.is_read() {
        return Ok(());
    }
    owner_only(actor, project_author_id)
}

/// Reads for any authenticated actor; writes only to one's own record.
pub fn is_self_or_read_only(
    actor: Option<&AuthUser>,
    action: Action,
    target_id: Uuid,
) -> Result<(), AppError> {
    if action.is_read() {
        return actor.map(|_| ()).ok_or(AppError::TokenMissing);
    }
    owner_only(actor, target_id)
}

pub fn is_admin(actor: &AuthUser) -> Result<(), AppError> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(AppError::PermissionDenied)
    }
}
