use super::handlers::{comments, health, posts, reactions, users};
use utoipa::openapi::{
    security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Components, Contact, InfoBuilder, License, OpenApiBuilder, Tag,
};
use utoipa_axum::{router::OpenApiRouter, routes};

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    // Reuse the same router wiring and only return the generated OpenAPI spec.
    let (_router, openapi) = api_router().split_for_parts();
    openapi
}

/// Build the router that also drives the `OpenAPI` document.
///
/// Add new endpoints here via `.routes(routes!(...))` so they are both served
/// and included in the generated `OpenAPI` spec.
/// Routes added outside (like `/` or `OPTIONS /health`) are intentionally not documented.
pub(crate) fn api_router() -> OpenApiRouter {
    // `routes!` reads #[utoipa::path] to bind HTTP method + path and add the route to OpenAPI.
    let mut router = OpenApiRouter::with_openapi(cargo_openapi())
        .routes(routes!(health::health))
        .routes(routes!(users::register))
        .routes(routes!(users::login))
        .routes(routes!(users::update_access_token))
        .routes(routes!(users::logout_from_all_devices))
        .routes(routes!(users::me))
        .routes(routes!(users::update_user))
        .routes(routes!(users::change_password))
        .routes(routes!(posts::topics::create_topic, posts::topics::list_topics))
        .routes(routes!(posts::create_post, posts::list_posts))
        .routes(routes!(
            posts::get_post,
            posts::update_post,
            posts::delete_post
        ))
        .routes(routes!(comments::create_comment, comments::list_comments))
        .routes(routes!(comments::update_comment, comments::delete_comment))
        .routes(routes!(comments::create_reply))
        .routes(routes!(comments::update_reply, comments::delete_reply))
        .routes(routes!(
            reactions::create_reaction,
            reactions::delete_reaction
        ));

    let mut skribo_tag = Tag::new("skribo");
    skribo_tag.description = Some("Blogging platform API".to_string());

    let mut users_tag = Tag::new("users");
    users_tag.description = Some("Registration, login, and account management".to_string());

    let mut posts_tag = Tag::new("posts");
    posts_tag.description = Some("Posts and their visibility".to_string());

    let mut topics_tag = Tag::new("topics");
    topics_tag.description = Some("Topics posts are filed under".to_string());

    let mut comments_tag = Tag::new("comments");
    comments_tag.description = Some("Comments and embedded replies".to_string());

    let mut reactions_tag = Tag::new("reactions");
    reactions_tag.description = Some("Per-post reactions".to_string());

    let mut openapi = router.to_openapi();
    openapi.tags = Some(vec![
        skribo_tag,
        users_tag,
        posts_tag,
        topics_tag,
        comments_tag,
        reactions_tag,
    ]);

    // Referenced by the #[utoipa::path] security attributes on guarded routes.
    openapi
        .components
        .get_or_insert_with(Components::new)
        .add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );

    OpenApiRouter::with_openapi(openapi).merge(router)
}

fn cargo_openapi() -> utoipa::openapi::OpenApi {
    // Use Cargo.toml metadata instead of the utoipa-axum crate info defaults.
    let mut info = InfoBuilder::new()
        .title(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .description(optional_str(env!("CARGO_PKG_DESCRIPTION")))
        .build();

    info.contact = cargo_contact();
    info.license = cargo_license();

    OpenApiBuilder::new().info(info).build()
}

fn cargo_contact() -> Option<Contact> {
    // Cargo authors are `;` separated and may include "Name <email>".
    let authors = env!("CARGO_PKG_AUTHORS");
    let primary = authors.split(';').next().map(str::trim)?;
    if primary.is_empty() {
        return None;
    }

    let (name, email) = parse_author(primary);
    if name.is_none() && email.is_none() {
        return None;
    }

    let mut contact = Contact::new();
    contact.name = name.map(str::to_string);
    contact.email = email.map(str::to_string);
    Some(contact)
}

fn cargo_license() -> Option<License> {
    let identifier = optional_str(env!("CARGO_PKG_LICENSE"))?;
    let mut license = License::new(identifier);
    license.identifier = Some(identifier.to_string());
    Some(license)
}

fn optional_str(value: &'static str) -> Option<&'static str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

fn parse_author(author: &str) -> (Option<&str>, Option<&str>) {
    if let Some(start) = author.find('<') {
        let name = author[..start].trim();
        let email = author[start + 1..].trim_end_matches('>').trim();
        let name = if name.is_empty() { None } else { Some(name) };
        let email = if email.is_empty() { None } else { Some(email) };
        (name, email)
    } else {
        let name = author.trim();
        (if name.is_empty() { None } else { Some(name) }, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_info_from_cargo() {
        let spec = openapi();
        assert_eq!(spec.info.title, env!("CARGO_PKG_NAME"));
        assert_eq!(spec.info.version, env!("CARGO_PKG_VERSION"));
        assert_eq!(
            spec.info.description.as_deref(),
            Some(env!("CARGO_PKG_DESCRIPTION"))
        );

        let contact = spec.info.contact;
        assert!(contact.is_some());
        if let Some(contact) = contact {
            assert_eq!(contact.name.as_deref(), Some("Team Skribo"));
            assert_eq!(contact.email.as_deref(), Some("team@skribo.dev"));
        }

        let license = spec.info.license;
        assert!(license.is_some());
        if let Some(license) = license {
            assert_eq!(license.name, "BSD-3-Clause");
            assert_eq!(license.identifier.as_deref(), Some("BSD-3-Clause"));
        }
    }

    #[test]
    fn openapi_tags_and_paths() {
        let spec = openapi();
        let tags = spec.tags.clone().unwrap_or_default();
        assert!(tags.iter().any(|tag| tag.name == "skribo"));
        assert!(tags.iter().any(|tag| tag.name == "users"));
        assert!(tags.iter().any(|tag| tag.name == "reactions"));

        assert!(spec.paths.paths.contains_key("/api/v1/registration"));
        assert!(spec.paths.paths.contains_key("/api/v1/token"));
        assert!(spec.paths.paths.contains_key("/api/v1/posts/{post}"));
        assert!(spec
            .paths
            .paths
            .contains_key("/api/v1/posts/{post}/comments/{comment_id}/replies/{reply_id}"));
        assert!(spec.paths.paths.contains_key("/api/v1/posts/{post}/reactions"));
    }

    #[test]
    fn parse_author_variants() {
        assert_eq!(
            parse_author("Team Skribo <team@skribo.dev>"),
            (Some("Team Skribo"), Some("team@skribo.dev"))
        );
        assert_eq!(parse_author("Solo Author"), (Some("Solo Author"), None));
        assert_eq!(parse_author("<only@email.dev>"), (None, Some("only@email.dev")));
    }
}
