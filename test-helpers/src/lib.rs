pub mod mock;
pub mod routes;
pub mod telemetry;

use actix_cors::Cors;
use actix_web::dev::Server;
use actix_web::{App, HttpServer, web};
use payloads::requests::LoginCredentials;
use reqwest::StatusCode;
use std::net::TcpListener;

use crate::mock::{ADMIN_EMAIL, ADMIN_PASSWORD, MockBackend};

pub struct TestApp {
    pub port: u16,
    pub client: payloads::APIClient,
    pub backend: MockBackend,
}

impl TestApp {
    pub fn address(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Log the shared client in as the seeded administrator.
    pub async fn login_admin(&self) -> anyhow::Result<()> {
        self.client
            .login(&LoginCredentials {
                email: ADMIN_EMAIL.into(),
                password: ADMIN_PASSWORD.into(),
            })
            .await?;
        Ok(())
    }

    /// A fresh client for the same backend, already holding the admin token.
    pub fn admin_client(&self) -> payloads::APIClient {
        payloads::APIClient::new(self.address()).with_token(mock::TEST_TOKEN)
    }
}

/// Build the mock backend server, but not await it.
///
/// Returns the port that the server has bound to. The OS assigns the port if
/// binding to 0.
pub fn build(
    ip: &str,
    port: u16,
    backend: MockBackend,
) -> std::io::Result<(Server, u16)> {
    let listener = TcpListener::bind(format!("{ip}:{port}"))?;
    let port = listener.local_addr()?.port();
    let backend = web::Data::new(backend);
    let server = HttpServer::new(move || {
        // the web UI is served by trunk from another origin
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .expose_headers([payloads::TOTAL_COUNT_HEADER, "x-request-id"]);
        App::new()
            .wrap(cors)
            .service(routes::api_services())
            .app_data(backend.clone())
    })
    .workers(1)
    .listen(listener)?
    .run();
    Ok((server, port))
}

pub async fn spawn_app_on_port(port: u16) -> TestApp {
    telemetry::init_test_subscriber();

    let backend = MockBackend::default();
    let (server, port) = build("127.0.0.1", port, backend.clone())
        .expect("Failed to bind the mock backend");
    tokio::spawn(server);

    TestApp {
        port,
        client: payloads::APIClient::new(format!("http://127.0.0.1:{port}")),
        backend,
    }
}

/// Use OS-assigned port for parallel testing.
pub async fn spawn_app() -> TestApp {
    spawn_app_on_port(0).await
}

/// Assert that the result of an API action results in a specific status code.
pub fn assert_status_code<T>(
    result: Result<T, payloads::ClientError>,
    expected: StatusCode,
) {
    match result {
        Err(e) => assert_eq!(e.status(), Some(expected), "{e}"),
        Ok(_) => panic!("Expected an error with status {expected}"),
    };
}
