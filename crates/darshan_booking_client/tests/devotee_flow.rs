use darshan_booking_client::http_client::ReqwestBookingClient;
use darshan_booking_client::models::Companion;
use darshan_booking_client::{
    AppointmentFilter, BookingClient, DarshanKind, Role, VipAppointmentPayload, WorkflowState,
};
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DEVOTEE: &str =
    "/api/method/mahakaal.darshan_booking.doctype.darshan_devoteee_profile.darshan_devoteee_profile.";

#[tokio::test]
async fn login_keeps_session_cookie_for_later_calls() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/method/login"))
        .and(body_json(json!({"usr": "9876543210", "pwd": "pw"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"message": "Logged In", "home_page": "/app", "full_name": "Asha"}))
                .append_header("set-cookie", "sid=abc123; Path=/; HttpOnly")
                .append_header("set-cookie", "full_name=Asha; Path=/"),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("{DEVOTEE}get_profile")))
        .and(header("cookie", "sid=abc123"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"message": {"full_name": "Asha"}})),
        )
        .mount(&server)
        .await;

    let client = ReqwestBookingClient::new(&server.uri(), Role::Devotee);
    let login = client
        .login("9876543210", &SecretString::new("pw".into()))
        .await
        .expect("login");
    assert_eq!(login.message, "Logged In");
    assert_eq!(login.full_name.as_deref(), Some("Asha"));
    assert!(client.session().is_authenticated().await);

    let profile = client.get_profile().await.expect("profile");
    assert_eq!(profile["full_name"], "Asha");
}

#[tokio::test]
async fn failed_login_leaves_session_empty() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/method/login"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"message": "Invalid Login. Try again."}))
                .append_header("set-cookie", "sid=Guest; Path=/"),
        )
        .mount(&server)
        .await;

    let client = ReqwestBookingClient::new(&server.uri(), Role::Devotee);
    let err = client
        .login("1", &SecretString::new("wrong".into()))
        .await
        .expect_err("should fail");
    assert!(matches!(err, darshan_booking_client::BookingError::Auth(_)));
    assert!(!client.session().is_authenticated().await);
}

#[tokio::test]
async fn appointment_list_posts_filter_and_decodes_bookings() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{DEVOTEE}get_appointment_list")))
        .and(body_json(json!({
            "limitStart": 0,
            "pageLength": 10,
            "darshan_type": "Shigra Darshan",
            "workflow_state": null
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": [
                {
                    "name": "APT-1",
                    "darshan_type": "Shigra Darshan",
                    "darshan_time": "10:00:00",
                    "workflow_state": "Approved",
                    "darshan_date": "2024-01-15"
                },
                {"name": "APT-broken"}
            ]
        })))
        .mount(&server)
        .await;

    let client = ReqwestBookingClient::new(&server.uri(), Role::Devotee);
    let filter = AppointmentFilter::page(0, 10).with_kind(&DarshanKind::Shigra);
    let bookings = client.get_bookings(&filter).await.expect("bookings");
    assert_eq!(bookings.len(), 1);
    let b = &bookings[0];
    assert_eq!(b.workflow_state, WorkflowState::Approved);
    assert_eq!(b.slot_label(), "10:00 AM");
    assert_eq!(b.canonical_date().as_deref(), Some("2024-01-15T00:00:00.000Z"));
}

#[tokio::test]
async fn vip_appointment_is_wrapped_in_info() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{DEVOTEE}create_appointment")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"message": {"name": "APT-77"}})),
        )
        .mount(&server)
        .await;

    let client = ReqwestBookingClient::new(&server.uri(), Role::Devotee);
    let companions = vec![Companion {
        companion_name: "Ravi".into(),
        companion_phone: "9000000000".into(),
        companion_age: "40".into(),
    }];
    let payload =
        VipAppointmentPayload::new("2024-01-15", "10:00 AM", "MLA", "letter.pdf", companions);
    let created = client
        .create_vip_appointment(&payload)
        .await
        .expect("create");
    assert_eq!(created["name"], "APT-77");

    let received = server.received_requests().await.unwrap();
    let sent: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
    assert_eq!(sent["info"]["details"]["darshan_time"], "10:00:00");
    assert_eq!(sent["info"]["details"]["darshan_type"], "Vip Darshan");
    assert_eq!(sent["info"]["details"]["darshan_companion"][0]["companion_age"], "40");
    assert_eq!(sent["info"]["save_as_draft"], false);
}

#[tokio::test]
async fn otp_request_and_registration_send_phone() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{DEVOTEE}login_request")))
        .and(body_json(json!({"phone": 9876543210_u64})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "OTP sent"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{DEVOTEE}create_devoteee_user")))
        .and(body_json(json!({"phone": 9876543210_u64})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "created"})))
        .mount(&server)
        .await;

    let client = ReqwestBookingClient::new(&server.uri(), Role::Devotee);
    assert_eq!(
        client.login_request("9876543210").await.expect("otp"),
        json!("OTP sent")
    );
    assert_eq!(
        client.register_devotee("9876543210").await.expect("register"),
        json!("created")
    );
}
