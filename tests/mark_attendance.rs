use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{App, test, web};
use chrono::{DateTime, TimeZone, Utc};
use rstest::rstest;
use serde_json::{Value, json};

use garment_ops::api::attendance::AttendanceDesk;
use garment_ops::auth::jwt::generate_token;
use garment_ops::config::Config;
use garment_ops::model::attendance::{NewAttendance, UserShiftFlags};
use garment_ops::model::role::Role;
use garment_ops::routes;
use garment_ops::shift::{Clock, FixedClock, ShiftCalendar, ShiftLabel};
use garment_ops::store::{AttendanceStore, InMemoryAttendanceStore};

const SECRET: &str = "integration-secret";
const WORKER: u64 = 12;

fn config() -> Config {
    Config {
        database_url: String::new(),
        jwt_secret: SECRET.into(),
        server_addr: "127.0.0.1:0".into(),
        jwt_ttl: 3600,
        base_url: "http://localhost:8080".into(),
        api_prefix: "/api".into(),
        utc_offset_minutes: 330,
        shift_cache_ttl_secs: 60,
        rate_login_per_min: 60,
        rate_protected_per_min: 1000,
        log_dir: "logs".into(),
        log_level: tracing::Level::DEBUG,
        run_migrations: false,
    }
}

/// UTC instant for a wall-clock time at the factory on 2024-03-01.
fn factory_time(hour: u32, minute: u32) -> DateTime<Utc> {
    let config = config();
    config
        .factory_offset()
        .unwrap()
        .with_ymd_and_hms(2024, 3, 1, hour, minute, 0)
        .unwrap()
        .with_timezone(&Utc)
}

fn desk(now: DateTime<Utc>, flags: UserShiftFlags) -> (Arc<InMemoryAttendanceStore>, AttendanceDesk) {
    let clock: Arc<dyn Clock> = Arc::new(FixedClock(now));
    let store = Arc::new(InMemoryAttendanceStore::new(clock.clone()).with_user(WORKER, flags));
    let desk = AttendanceDesk {
        store: store.clone(),
        clock,
        calendar: ShiftCalendar::standard(config().factory_offset().unwrap()),
    };
    (store, desk)
}

fn bearer(role: Role) -> String {
    let token = generate_token(1, role, true, SECRET, 3600).unwrap();
    format!("Bearer {token}")
}

fn day_shifts() -> UserShiftFlags {
    UserShiftFlags {
        morning: true,
        evening: true,
        night: false,
    }
}

macro_rules! app {
    ($desk:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(config()))
                .app_data(web::Data::new($desk))
                .configure(routes::extractor_config)
                .service(web::scope("/api").configure(routes::attendance_routes)),
        )
        .await
    };
}

fn mark(user_id: u64, role: Role) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/api/attendance")
        .insert_header((AUTHORIZATION, bearer(role)))
        .set_json(json!({ "userId": user_id, "comment": "gate 2" }))
}

#[actix_web::test]
async fn scanner_marks_morning_shift_once() {
    let (store, desk) = desk(factory_time(8, 30), day_shifts());
    let app = app!(desk);

    let resp = test::call_service(&app, mark(WORKER, Role::Scanner).to_request()).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "success": true, "shift": "morning" }));

    let resp = test::call_service(&app, mark(WORKER, Role::Scanner).to_request()).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Attendance already marked for morning shift");

    assert_eq!(store.len(), 1);
}

#[rstest]
#[case::before_morning(7, 59)]
#[case::morning_start(8, 0)]
#[case::morning_end(9, 0)]
#[case::midday(13, 15)]
#[case::after_evening(18, 0)]
#[actix_web::test]
async fn outside_open_windows_is_rejected(#[case] hour: u32, #[case] minute: u32) {
    let (store, desk) = desk(factory_time(hour, minute), day_shifts());
    let app = app!(desk);

    let resp = test::call_service(&app, mark(WORKER, Role::PlantHead).to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Cannot mark you present");
    assert!(store.is_empty());
}

#[actix_web::test]
async fn night_only_worker_cannot_mark_in_evening() {
    let flags = UserShiftFlags {
        night: true,
        ..UserShiftFlags::default()
    };
    let (store, desk) = desk(factory_time(17, 30), flags);
    let app = app!(desk);

    let resp = test::call_service(&app, mark(WORKER, Role::Md).to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(store.is_empty());
}

#[actix_web::test]
async fn worker_without_shifts_is_not_eligible() {
    let (_, desk) = desk(factory_time(8, 30), UserShiftFlags::default());
    let app = app!(desk);

    let resp = test::call_service(&app, mark(WORKER, Role::Scanner).to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "User is not assigned to any shift");
}

#[actix_web::test]
async fn unknown_worker_is_rejected() {
    let (_, desk) = desk(factory_time(8, 30), day_shifts());
    let app = app!(desk);

    let resp = test::call_service(&app, mark(404, Role::Scanner).to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "User not found");
}

#[rstest]
#[case::accounts(Role::Accounts)]
#[case::shift_in_charge(Role::ShiftInCharge)]
#[case::staff(Role::Staff)]
#[actix_web::test]
async fn only_markers_may_mark(#[case] role: Role) {
    let (store, desk) = desk(factory_time(8, 30), day_shifts());
    let app = app!(desk);

    let resp = test::call_service(&app, mark(WORKER, role).to_request()).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert!(store.is_empty());
}

#[actix_web::test]
async fn missing_token_is_unauthorized() {
    let (_, desk) = desk(factory_time(8, 30), day_shifts());
    let app = app!(desk);

    let req = test::TestRequest::post()
        .uri("/api/attendance")
        .set_json(json!({ "userId": WORKER }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn malformed_body_gets_message() {
    let (_, desk) = desk(factory_time(8, 30), day_shifts());
    let app = app!(desk);

    let req = test::TestRequest::post()
        .uri("/api/attendance")
        .insert_header((AUTHORIZATION, bearer(Role::Scanner)))
        .set_json(json!({ "userId": "twelve" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["message"].is_string());
}

#[actix_web::test]
async fn yesterdays_morning_mark_does_not_block_today() {
    let now = factory_time(8, 30);
    let (store, desk) = desk(now, day_shifts());
    store.seed(
        NewAttendance {
            user_id: WORKER,
            shift: ShiftLabel::Morning,
            attendance_date: now.date_naive().pred_opt().unwrap(),
            comment: None,
        },
        now - chrono::Duration::days(1),
    );
    let app = app!(desk);

    let resp = test::call_service(&app, mark(WORKER, Role::Scanner).to_request()).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(store.len(), 2);

    let (from, to) = ShiftCalendar::standard(config().factory_offset().unwrap()).day_bounds(now);
    let today = store.records_between(WORKER, from, to).await.unwrap();
    assert_eq!(today.len(), 1);
    assert_eq!(today[0].comment.as_deref(), Some("gate 2"));
}

#[actix_web::test]
async fn same_day_mark_outside_window_still_conflicts_on_insert() {
    let now = factory_time(8, 30);
    let (store, desk) = desk(now, day_shifts());
    // created before the window opened, so only the unique day index catches it
    store.seed(
        NewAttendance {
            user_id: WORKER,
            shift: ShiftLabel::Morning,
            attendance_date: desk.calendar.local_date(now),
            comment: None,
        },
        factory_time(7, 0),
    );
    let app = app!(desk);

    let resp = test::call_service(&app, mark(WORKER, Role::Scanner).to_request()).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Attendance already marked for morning shift");
    assert_eq!(store.len(), 1);
}

#[rstest]
#[case::at_limit(100, StatusCode::CREATED)]
#[case::over_limit(101, StatusCode::BAD_REQUEST)]
#[actix_web::test]
async fn comment_length_is_bounded(#[case] chars: usize, #[case] expected: StatusCode) {
    let (store, desk) = desk(factory_time(8, 30), day_shifts());
    let app = app!(desk);

    let req = test::TestRequest::post()
        .uri("/api/attendance")
        .insert_header((AUTHORIZATION, bearer(Role::Scanner)))
        .set_json(json!({ "userId": WORKER, "comment": "க".repeat(chars) }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), expected);
    assert_eq!(store.len(), usize::from(expected == StatusCode::CREATED));
}
