//! 组织相关端点
//!
//! 公开浏览：列表、详情、某天时段、日期区间状态。
//! 组织自管理（`/me/...`）：营业时间设置与锁定日期。

use actix_web::{HttpResponse, Result as ActixResult, web};
use std::sync::Arc;
use uuid::Uuid;

use crate::errors::SlotbookError;
use crate::scheduling::OrganizationSettings;
use crate::services::{AuthUser, ScheduleService, UserService};
use crate::storage::Role;

use super::helpers::{api_result, parse_date, require_date, require_role, success_response};
use super::types::{
    LockDayBody, LockedDaysView, OrganizationDetail, OrganizationSummary, SlotsQuery,
    StatusQuery, StatusRangeView,
};

/// GET /api/organizations
pub async fn list_organizations(users: web::Data<Arc<UserService>>) -> ActixResult<HttpResponse> {
    let orgs: Vec<OrganizationSummary> = users
        .list_organizations()
        .iter()
        .map(OrganizationSummary::from)
        .collect();
    Ok(success_response(orgs))
}

/// GET /api/organizations/{id}
pub async fn get_organization(
    users: web::Data<Arc<UserService>>,
    schedule: web::Data<Arc<ScheduleService>>,
    path: web::Path<Uuid>,
) -> ActixResult<HttpResponse> {
    let id = path.into_inner();
    let result = users.get_organization(id).and_then(|org| {
        Ok(OrganizationDetail {
            organization: OrganizationSummary::from(&org),
            settings: schedule.get_settings(id)?,
        })
    });
    Ok(api_result(result))
}

/// GET /api/organizations/{id}/slots?date=YYYY-MM-DD
pub async fn get_slots(
    schedule: web::Data<Arc<ScheduleService>>,
    path: web::Path<Uuid>,
    query: web::Query<SlotsQuery>,
) -> ActixResult<HttpResponse> {
    let result = require_date("date", query.date.as_deref())
        .and_then(|date| schedule.slots_for_date(path.into_inner(), date));
    Ok(api_result(result))
}

/// GET /api/organizations/{id}/status?from=YYYY-MM-DD&to=YYYY-MM-DD
pub async fn get_status(
    schedule: web::Data<Arc<ScheduleService>>,
    path: web::Path<Uuid>,
    query: web::Query<StatusQuery>,
) -> ActixResult<HttpResponse> {
    let result = (|| {
        let from = require_date("from", query.from.as_deref())?;
        let to = require_date("to", query.to.as_deref())?;
        let days = schedule.status_range(path.into_inner(), from, to)?;
        Ok::<_, SlotbookError>(StatusRangeView { from, to, days })
    })();
    Ok(api_result(result))
}

/// GET /api/organizations/me/settings
pub async fn get_my_settings(
    caller: AuthUser,
    schedule: web::Data<Arc<ScheduleService>>,
) -> ActixResult<HttpResponse> {
    let result =
        require_role(caller, Role::Organization).and_then(|_| schedule.get_settings(caller.id));
    Ok(api_result(result))
}

/// PUT /api/organizations/me/settings
pub async fn update_my_settings(
    caller: AuthUser,
    schedule: web::Data<Arc<ScheduleService>>,
    body: web::Json<OrganizationSettings>,
) -> ActixResult<HttpResponse> {
    let result = require_role(caller, Role::Organization)
        .and_then(|_| schedule.update_settings(caller.id, body.into_inner()));
    Ok(api_result(result))
}

/// GET /api/organizations/me/locked-days
pub async fn list_locked_days(
    caller: AuthUser,
    schedule: web::Data<Arc<ScheduleService>>,
) -> ActixResult<HttpResponse> {
    let result = require_role(caller, Role::Organization)
        .and_then(|_| schedule.locked_days(caller.id))
        .map(|dates| LockedDaysView { dates });
    Ok(api_result(result))
}

/// POST /api/organizations/me/locked-days
pub async fn lock_day(
    caller: AuthUser,
    schedule: web::Data<Arc<ScheduleService>>,
    body: web::Json<LockDayBody>,
) -> ActixResult<HttpResponse> {
    let result = require_role(caller, Role::Organization)
        .and_then(|_| parse_date("date", &body.date))
        .and_then(|date| schedule.lock_day(caller.id, date))
        .map(|dates| LockedDaysView { dates });
    Ok(api_result(result))
}

/// DELETE /api/organizations/me/locked-days/{date}
pub async fn unlock_day(
    caller: AuthUser,
    schedule: web::Data<Arc<ScheduleService>>,
    path: web::Path<String>,
) -> ActixResult<HttpResponse> {
    let result = require_role(caller, Role::Organization)
        .and_then(|_| parse_date("date", &path))
        .and_then(|date| schedule.unlock_day(caller.id, date))
        .map(|dates| LockedDaysView { dates });
    Ok(api_result(result))
}
