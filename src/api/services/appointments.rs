//! 预约端点

use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpResponse, Result as ActixResult, web};
use std::sync::Arc;
use uuid::Uuid;

use crate::errors::SlotbookError;
use crate::services::{
    AppointmentFilter, AppointmentService, AuthUser, BookingRequest, ExportFormat,
};

use super::helpers::{api_result, created_response, error_from_slotbook, optional_date, parse_date};
use super::types::{AppointmentListQuery, BookAppointmentBody, ExportQuery, UpdateStatusBody};

/// GET /api/appointments?status=&from=&to=
pub async fn list_appointments(
    caller: AuthUser,
    appointments: web::Data<Arc<AppointmentService>>,
    query: web::Query<AppointmentListQuery>,
) -> ActixResult<HttpResponse> {
    let result = (|| {
        let filter = AppointmentFilter {
            status: query.status,
            from: optional_date("from", query.from.as_deref())?,
            to: optional_date("to", query.to.as_deref())?,
        };
        Ok::<_, SlotbookError>(appointments.list_for_user(caller, filter))
    })();
    Ok(api_result(result))
}

/// POST /api/appointments
pub async fn book_appointment(
    caller: AuthUser,
    appointments: web::Data<Arc<AppointmentService>>,
    body: web::Json<BookAppointmentBody>,
) -> ActixResult<HttpResponse> {
    let body = body.into_inner();
    let result = parse_date("date", &body.date).and_then(|date| {
        appointments.book(
            caller,
            BookingRequest {
                organization_id: body.organization_id,
                date,
                start: body.time_slot.start,
                end: body.time_slot.end,
                notes: body.notes,
            },
        )
    });

    Ok(match result {
        Ok(appointment) => created_response(appointment),
        Err(e) => error_from_slotbook(&e),
    })
}

/// GET /api/appointments/{id}
pub async fn get_appointment(
    caller: AuthUser,
    appointments: web::Data<Arc<AppointmentService>>,
    path: web::Path<Uuid>,
) -> ActixResult<HttpResponse> {
    Ok(api_result(appointments.get(caller, path.into_inner())))
}

/// PATCH /api/appointments/{id}/status
pub async fn update_appointment_status(
    caller: AuthUser,
    appointments: web::Data<Arc<AppointmentService>>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateStatusBody>,
) -> ActixResult<HttpResponse> {
    Ok(api_result(appointments.update_status(
        caller,
        path.into_inner(),
        body.status,
    )))
}

/// DELETE /api/appointments/{id}
pub async fn cancel_appointment(
    caller: AuthUser,
    appointments: web::Data<Arc<AppointmentService>>,
    path: web::Path<Uuid>,
) -> ActixResult<HttpResponse> {
    Ok(api_result(appointments.cancel(caller, path.into_inner())))
}

/// GET /api/appointments/export?format=json|csv
///
/// 直接返回文件内容（不包信封），以附件形式下载
pub async fn export_appointments(
    caller: AuthUser,
    appointments: web::Data<Arc<AppointmentService>>,
    query: web::Query<ExportQuery>,
) -> ActixResult<HttpResponse> {
    let format = match query.format.as_deref() {
        Some(f) => match f.parse::<ExportFormat>() {
            Ok(format) => format,
            Err(e) => return Ok(error_from_slotbook(&e)),
        },
        None => ExportFormat::default(),
    };

    let body = match appointments.export(caller, format) {
        Ok(body) => body,
        Err(e) => return Ok(error_from_slotbook(&e)),
    };

    let filename = format!(
        "appointments_{}.{}",
        chrono::Utc::now().format("%Y%m%d_%H%M%S"),
        format.extension()
    );

    Ok(HttpResponse::Ok()
        .content_type(format.content_type())
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(filename)],
        })
        .body(body))
}
