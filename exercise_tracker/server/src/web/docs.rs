use utoipa::OpenApi;

use crate::user::api;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Exercise Tracker API",
        version = env!("CARGO_PKG_VERSION"),
        description = "Register users, log exercises and query date-filtered exercise logs."
    ),
    paths(
        api::create_user_handler,
        api::list_users_handler,
        api::add_exercise_handler,
        api::get_log_handler,
    ),
    components(schemas(
        api::CreateUserRequest,
        api::UserJson,
        api::ExerciseJson,
        api::LogEntryJson,
        api::LogJson,
        crate::user::ExerciseForm,
        crate::user::DurationInput,
        crate::web::api::ErrorResponse,
    )),
    tags(
        (name = "Users", description = "Create and list users"),
        (name = "Exercises", description = "Log exercises and read exercise logs")
    )
)]
pub struct ApiDoc;
