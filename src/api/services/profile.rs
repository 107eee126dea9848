//! 个人资料端点

use actix_web::{HttpResponse, Result as ActixResult, web};
use std::sync::Arc;

use crate::services::{AuthUser, UpdateProfileRequest, UserService};

use super::helpers::api_result;
use super::types::{UpdateProfileBody, UserView};

/// GET /api/profile
pub async fn get_profile(
    caller: AuthUser,
    users: web::Data<Arc<UserService>>,
) -> ActixResult<HttpResponse> {
    Ok(api_result(
        users.get_profile(caller.id).map(|u| UserView::from(&u)),
    ))
}

/// PUT /api/profile
pub async fn update_profile(
    caller: AuthUser,
    users: web::Data<Arc<UserService>>,
    body: web::Json<UpdateProfileBody>,
) -> ActixResult<HttpResponse> {
    let body = body.into_inner();
    let result = users.update_profile(
        caller.id,
        UpdateProfileRequest {
            name: body.name,
            email: body.email,
            password: body.password,
        },
    );
    Ok(api_result(result.map(|u| UserView::from(&u))))
}
