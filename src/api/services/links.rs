//! Owner-scoped link management handlers
//!
//! Every route here sits behind [`OwnerAuth`](crate::api::middleware::OwnerAuth).

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Responder, Result as ActixResult, web};
use chrono::Utc;
use tracing::{info, trace};

use super::error_code::ErrorCode;
use super::helpers::{error_from_linkpulse, json_response, success_response};
use super::types::{
    CreatedLinkResponse, DeleteLinkResponse, GetLinksQuery, LinkResponse, PageQuery, PatchLink,
    PostNewLink, SingleLinkResponse, VisitEventResponse,
};
use crate::api::middleware::AuthenticatedOwner;
use crate::services::{
    AnalyticsService, DEFAULT_PAGE_SIZE, DeleteOutcome, LinkService, Page,
};
use crate::storage::LinkFilter;

/// GET /links
pub async fn list_links(
    owner: AuthenticatedOwner,
    query: web::Query<GetLinksQuery>,
    service: web::Data<LinkService>,
) -> ActixResult<impl Responder> {
    trace!("API: list links for {} with {:?}", owner.id(), query);
    let query = query.into_inner();
    let filter = LinkFilter {
        search: query.search,
        page: query.page.unwrap_or(1),
        page_size: query.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
    };

    Ok(match service.list_by_owner(owner.id(), filter).await {
        Ok(page) => success_response(Page {
            items: page.items.into_iter().map(LinkResponse::from).collect(),
            total_count: page.total_count,
            total_pages: page.total_pages,
            current_page: page.current_page,
        }),
        Err(e) => error_from_linkpulse(&e),
    })
}

/// POST /links
pub async fn post_link(
    owner: AuthenticatedOwner,
    body: web::Json<PostNewLink>,
    service: web::Data<LinkService>,
) -> ActixResult<impl Responder> {
    Ok(
        match service.create(owner.id(), body.into_inner().into()).await {
            Ok(link) => {
                info!("API: owner {} created {}", owner.id(), link.short_link);
                json_response(
                    StatusCode::CREATED,
                    ErrorCode::Success,
                    "Created",
                    Some(CreatedLinkResponse {
                        short_link: link.short_link.clone(),
                        link: LinkResponse::at(link, Utc::now()),
                    }),
                )
            }
            Err(e) => error_from_linkpulse(&e),
        },
    )
}

/// GET /links/{id}
pub async fn get_link(
    owner: AuthenticatedOwner,
    path: web::Path<i64>,
    service: web::Data<LinkService>,
) -> ActixResult<impl Responder> {
    Ok(match service.get(owner.id(), path.into_inner()).await {
        Ok(link) => success_response(SingleLinkResponse {
            link: LinkResponse::at(link, Utc::now()),
        }),
        Err(e) => error_from_linkpulse(&e),
    })
}

/// PATCH /links/{id}
pub async fn patch_link(
    owner: AuthenticatedOwner,
    path: web::Path<i64>,
    body: web::Json<PatchLink>,
    service: web::Data<LinkService>,
) -> ActixResult<impl Responder> {
    let id = path.into_inner();
    Ok(
        match service.update(owner.id(), id, body.into_inner().into()).await {
            Ok(link) => success_response(SingleLinkResponse {
                link: LinkResponse::at(link, Utc::now()),
            }),
            Err(e) => error_from_linkpulse(&e),
        },
    )
}

/// DELETE /links/{id}
///
/// 200 whether or not the link existed.
pub async fn delete_link(
    owner: AuthenticatedOwner,
    path: web::Path<i64>,
    service: web::Data<LinkService>,
) -> ActixResult<impl Responder> {
    Ok(match service.delete(owner.id(), path.into_inner()).await {
        Ok(outcome) => success_response(DeleteLinkResponse {
            deleted: outcome == DeleteOutcome::Deleted,
        }),
        Err(e) => error_from_linkpulse(&e),
    })
}

/// GET /links/{id}/analytics
pub async fn get_link_analytics(
    owner: AuthenticatedOwner,
    path: web::Path<i64>,
    query: web::Query<PageQuery>,
    service: web::Data<AnalyticsService>,
) -> ActixResult<HttpResponse> {
    let page = query.page.unwrap_or(1);
    let page_size = query.page_size.unwrap_or(DEFAULT_PAGE_SIZE);

    Ok(
        match service
            .list_visits(owner.id(), path.into_inner(), page, page_size)
            .await
        {
            Ok(visits) => success_response(Page {
                items: visits
                    .items
                    .into_iter()
                    .map(VisitEventResponse::from)
                    .collect(),
                total_count: visits.total_count,
                total_pages: visits.total_pages,
                current_page: visits.current_page,
            }),
            Err(e) => error_from_linkpulse(&e),
        },
    )
}

/// 链接管理路由 `/links`
///
/// - GET /links - 分页列表
/// - POST /links - 创建
/// - GET/PATCH/DELETE /links/{id}
/// - GET /links/{id}/analytics - 访问记录
pub fn links_routes() -> actix_web::Scope {
    web::scope("/links")
        .route("", web::get().to(list_links))
        .route("", web::post().to(post_link))
        .route("/{id}/analytics", web::get().to(get_link_analytics))
        .route("/{id}", web::get().to(get_link))
        .route("/{id}", web::patch().to(patch_link))
        .route("/{id}", web::delete().to(delete_link))
}
