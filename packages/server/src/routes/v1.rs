use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers::{auth, position, project, skill, stack, user};
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/auth", auth_routes())
        .nest("/users", user_routes())
        .nest("/skills", skill_routes())
        .nest("/stacks", stack_routes())
        .nest("/projects", project_routes())
        .nest("/positions", position_routes())
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(auth::register))
        .routes(routes!(auth::login))
        .routes(routes!(auth::refresh))
}

fn user_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(user::list_users))
        .routes(routes!(user::get_me, user::update_me))
        .routes(routes!(user::set_my_skills))
        .routes(routes!(user::set_my_experience))
        .routes(routes!(user::get_user, user::update_user, user::delete_user))
}

fn skill_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(skill::list_skills, skill::create_skill))
        .routes(routes!(skill::get_skill, skill::update_skill, skill::delete_skill))
}

fn stack_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(stack::list_stacks, stack::create_stack))
        .routes(routes!(stack::get_stack, stack::update_stack, stack::delete_stack))
}

fn project_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(project::list_projects, project::create_project))
        .routes(routes!(project::list_my_projects))
        .routes(routes!(
            project::get_project,
            project::update_project,
            project::delete_project
        ))
        .routes(routes!(project::set_project_positions))
        .routes(routes!(project::set_project_stacks))
}

fn position_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(position::list_positions, position::create_position))
        .routes(routes!(
            position::get_position,
            position::update_position,
            position::delete_position
        ))
}
