//! Endpoint guard: the single place handlers consult the authorization engine.
//!
//! Denials are uniform: the caller sees 403 whatever the internal reason.

use quillpost_auth::{OwnedResource, RoleRequirement};

use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

/// Allow the request through or produce the 403 response.
pub async fn require(
    services: &AppServices,
    principal: &PrincipalContext,
    requirement: RoleRequirement,
    resource: Option<&(dyn OwnedResource + Sync)>,
) -> Result<(), axum::response::Response> {
    let decision = services
        .authorizer
        .authorize(principal.principal(), requirement, resource)
        .await;

    if decision.is_allowed() {
        Ok(())
    } else {
        Err(errors::forbidden())
    }
}

/// Guard for an operation on a resource that may not exist.
///
/// A missing resource is reported as 404 only to callers who pass the
/// role-only check, so anonymous callers cannot probe for existence.
pub async fn require_existing<T>(
    services: &AppServices,
    principal: &PrincipalContext,
    requirement: RoleRequirement,
    resource: Option<T>,
) -> Result<T, axum::response::Response>
where
    T: OwnedResource + Sync,
{
    match resource {
        Some(resource) => {
            require(services, principal, requirement, Some(&resource)).await?;
            Ok(resource)
        }
        None => {
            require(services, principal, requirement, None).await?;
            Err(errors::not_found())
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use quillpost_auth::{Principal, Role};
    use quillpost_infra::NewUser;
    use quillpost_infra::content::Article;

    use super::*;

    async fn register(services: &AppServices, name: &str, role: Role) -> quillpost_core::UserId {
        let user = services
            .directory
            .register(NewUser {
                username: name.to_string(),
                password_hash: "x".to_string(),
            })
            .await
            .unwrap();
        services.directory.set_role(user.id, role).await.unwrap();
        user.id
    }

    fn article_owned_by(owner: quillpost_core::UserId) -> Article {
        Article {
            id: quillpost_core::ArticleId::new(),
            title: "A title".to_string(),
            content: "body".to_string(),
            owner_id: owner,
            published_on: chrono::Utc::now().date_naive(),
            modified_on: None,
        }
    }

    #[tokio::test]
    async fn denial_is_forbidden() {
        let services = AppServices::in_memory();
        let admin = register(&services, "admin", Role::Admin).await;
        let ctx = PrincipalContext::new(Principal::Authenticated(admin));

        let res = require(&services, &ctx, RoleRequirement::SUPER_ADMIN, None)
            .await
            .unwrap_err();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn owner_passes_and_stranger_is_denied() {
        let services = AppServices::in_memory();
        let alice = register(&services, "alice", Role::User).await;
        let bob = register(&services, "bob", Role::User).await;
        let article = article_owned_by(alice);

        let alice_ctx = PrincipalContext::new(Principal::Authenticated(alice));
        let bob_ctx = PrincipalContext::new(Principal::Authenticated(bob));

        assert!(require(&services, &alice_ctx, RoleRequirement::USER, Some(&article))
            .await
            .is_ok());
        assert!(require(&services, &bob_ctx, RoleRequirement::USER, Some(&article))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn missing_resource_hides_behind_role_check() {
        let services = AppServices::in_memory();
        let alice = register(&services, "alice", Role::User).await;

        let anon = require_existing::<Article>(
            &services,
            &PrincipalContext::anonymous(),
            RoleRequirement::USER,
            None,
        )
        .await
        .unwrap_err();
        assert_eq!(anon.status(), StatusCode::FORBIDDEN);

        let user = require_existing::<Article>(
            &services,
            &PrincipalContext::new(Principal::Authenticated(alice)),
            RoleRequirement::USER,
            None,
        )
        .await
        .unwrap_err();
        assert_eq!(user.status(), StatusCode::NOT_FOUND);
    }
}
