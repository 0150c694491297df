use axum::{
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use forgewms_core::{TenantId, UserId};

use crate::context::{ActorContext, TenantContext};

/// Header carrying the tenant UUID. Required on every protected route.
pub const TENANT_HEADER: &str = "x-tenant-id";

/// Header carrying the acting operator's UUID. Required on every protected
/// route; mutating handlers record it in the journal and the audit trail.
pub const ACTOR_HEADER: &str = "x-actor-id";

pub async fn identity_middleware(
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let tenant_id: TenantId = parse_header(req.headers(), TENANT_HEADER)?;
    let actor: UserId = parse_header(req.headers(), ACTOR_HEADER)?;

    req.extensions_mut().insert(TenantContext::new(tenant_id));
    req.extensions_mut().insert(ActorContext::new(actor));

    Ok(next.run(req).await)
}

fn parse_header<T>(headers: &HeaderMap, name: &str) -> Result<T, StatusCode>
where
    T: std::str::FromStr,
{
    let header = headers.get(name).ok_or(StatusCode::UNAUTHORIZED)?;

    let header = header.to_str().map_err(|_| StatusCode::UNAUTHORIZED)?;

    header
        .trim()
        .parse()
        .map_err(|_| StatusCode::UNAUTHORIZED)
}
