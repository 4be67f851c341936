use crate::{
    error::EventHubError,
    shared::{
        auth::protect_route,
        usecase::{execute, UseCase},
    },
};
use actix_web::{web, HttpRequest, HttpResponse};
use eventhub_api_structs::get_reminders::*;
use eventhub_domain::{Reminder, ID};
use eventhub_infra::EventHubContext;

pub async fn get_reminders_controller(
    http_req: HttpRequest,
    path_params: web::Path<PathParams>,
    ctx: web::Data<EventHubContext>,
) -> Result<HttpResponse, EventHubError> {
    let user = protect_route(&http_req, &ctx).await?;

    let usecase = GetRemindersUseCase {
        user_id: user.id,
        event_id: path_params.event_id.clone(),
    };

    execute(usecase, &ctx)
        .await
        .map(|reminders| HttpResponse::Ok().json(APIResponse::new(reminders)))
        .map_err(|e| match e {
            UseCaseErrors::StorageError => EventHubError::InternalError,
        })
}

/// The `Reminder`s a `User` has set for an `Event`, earliest first
#[derive(Debug)]
pub struct GetRemindersUseCase {
    pub user_id: ID,
    pub event_id: ID,
}

#[derive(Debug)]
pub enum UseCaseErrors {
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetRemindersUseCase {
    type Response = Vec<Reminder>;

    type Errors = UseCaseErrors;

    const NAME: &'static str = "GetReminders";

    async fn execute(&mut self, ctx: &EventHubContext) -> Result<Self::Response, Self::Errors> {
        ctx.repos
            .reminders
            .find_by_user_and_event(&self.user_id, &self.event_id)
            .await
            .map_err(|_| UseCaseErrors::StorageError)
    }
}
