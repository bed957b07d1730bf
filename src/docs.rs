use crate::api::attendance::{MarkAttendance, MarkResponse};
use crate::api::bank::{AccountWithUser, BankListResponse, BankQuery, CreateBankAccount, UserSummary};
use crate::api::user::{UserListResponse, UserProfile};
use crate::auth::handlers::LoginResponse;
use crate::model::bank::BankAccount;
use crate::model::role::Role;
use crate::models::{LoginReqDto, ResetPasswordDto, ResetRequestDto, SignupReq};
use crate::shift::window::ShiftLabel;
use crate::utils::pagination::{PageMeta, PageQuery};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Garment Factory Operations API",
        version = "1.0.0",
        description = r#"
## Garment factory operations

API powering the factory floor app.

- **Users**: sign up, login, password reset, profiles
- **Attendance**: shift-window attendance marking by scanners
- **Bank**: bank accounts of workers

Most endpoints need a **JWT Bearer** token from `/user/login`.
Shift windows are evaluated on the factory clock (UTC+05:30):
morning 08:00-09:00, evening 17:00-18:00, night 22:00-23:00.
"#,
    ),
    paths(
        crate::auth::handlers::signup,
        crate::auth::handlers::login,
        crate::auth::handlers::request_reset_password,
        crate::auth::handlers::reset_password,

        crate::api::user::get_own_profile,
        crate::api::user::get_user,
        crate::api::user::list_users,
        crate::api::user::delete_user,

        crate::api::attendance::mark_present,

        crate::api::bank::create_bank_account,
        crate::api::bank::list_bank_accounts,
        crate::api::bank::delete_bank_account
    ),
    components(
        schemas(
            SignupReq,
            LoginReqDto,
            LoginResponse,
            ResetRequestDto,
            ResetPasswordDto,
            Role,
            UserProfile,
            UserListResponse,
            PageMeta,
            PageQuery,
            MarkAttendance,
            MarkResponse,
            ShiftLabel,
            BankAccount,
            CreateBankAccount,
            BankQuery,
            UserSummary,
            AccountWithUser,
            BankListResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "user", description = "User related endpoints for the app."),
        (name = "attendance", description = "Attendance marking."),
        (name = "bank", description = "Bank accounts of workers."),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
